use api_resource_loader::{Binder, Resource, ResourceConfigBuilder, Schema, StoreResource, Table};

#[derive(Debug, Default)]
pub struct Author;

impl Resource for Author {
    fn configure(&self, config: ResourceConfigBuilder) -> ResourceConfigBuilder {
        config.except(["email"]).has_many_with(
            "posts",
            Binder::new(|relation| {
                relation.bind("blog-posts").foreign_key("author_id");
            }),
        )
    }

    fn schema(&self, schema: &mut Schema) {
        schema.increments("id").primary();
        schema.string("name");
        schema.string("email");
    }
}

impl StoreResource for Author {
    fn model(&self, table: &mut Table) {
        table.text("bio").nullable();
    }
}

#[derive(Debug, Default)]
pub struct Comment;

impl Resource for Comment {
    fn configure(&self, config: ResourceConfigBuilder) -> ResourceConfigBuilder {
        config.belongs_to_with(
            "post",
            Binder::new(|relation| {
                relation.bind("blog-posts").local_key("blog_post_id");
            }),
        )
    }

    fn schema(&self, schema: &mut Schema) {
        schema.increments("id").primary();
        schema.integer("blog_post_id");
        schema.text("body");
    }
}

impl StoreResource for Comment {}
