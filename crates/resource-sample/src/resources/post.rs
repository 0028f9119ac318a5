use crate::decorators::{Audited, Publishable};
use api_resource_loader::{
    Binder, Decorator, ListenerRef, ModelEvent, Resource, ResourceConfigBuilder, Schema,
    StoreResource,
};

/// Blog posts. Soft-deleted, audited, slugged on create.
#[derive(Debug, Default)]
pub struct BlogPost;

impl Resource for BlogPost {
    fn configure(&self, config: ResourceConfigBuilder) -> ResourceConfigBuilder {
        config
            .soft_deletes(true)
            .belongs_to("author")
            .has_many("comments")
            .except(["internal_notes"])
            .decorate(Decorator::resource(Publishable))
            .decorate(Decorator::store(Audited))
            .listen(ModelEvent::Creating, ListenerRef::named("slugger"))
    }

    fn schema(&self, schema: &mut Schema) {
        schema.table("blog_posts");
        schema.increments("id").primary();
        schema.integer("author_id");
        schema.string("title");
        schema.string("slug").nullable();
        schema.text("body");
        schema.text("internal_notes").nullable();
    }

    fn relation_binder(&self, key: &str) -> Option<Binder> {
        match key {
            "hasManyComments" => Some(Binder::new(|relation| {
                relation.bind("comments").foreign_key("blog_post_id");
            })),
            _ => None,
        }
    }
}

impl StoreResource for BlogPost {}
