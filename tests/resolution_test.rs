use api_resource_loader::{
    Collaborators, Decorator, Definition, DefinitionDecorator, RelationKind, Resource,
    ResourceConfig, ResourceConfigBuilder, ResourceDecorator, ResourceDefinition, SchemaCatalog,
    Schema,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

#[derive(Default)]
struct BlogPost {
    schema_calls: Arc<AtomicUsize>,
}

impl Resource for BlogPost {
    fn configure(&self, config: ResourceConfigBuilder) -> ResourceConfigBuilder {
        config
            .belongs_to("author")
            .has_many("comments")
            .except(["draft_notes"])
    }

    fn schema(&self, schema: &mut Schema) {
        self.schema_calls.fetch_add(1, Ordering::SeqCst);
        schema.increments("id").primary();
        schema.string("title");
        schema.text("draft_notes");
    }
}

#[test]
fn test_make_returns_the_same_resource() {
    let definition = ResourceDefinition::new(BlogPost::default());
    let first = definition.make(None).unwrap();
    let second = definition.make(None).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(
        &definition.resolve_schema().unwrap(),
        first.schema()
    ));
}

#[test]
fn test_default_endpoint_and_relations() {
    let definition = ResourceDefinition::new(BlogPost::default());
    assert_eq!(definition.endpoint(), "blog-posts");

    let resource = definition.make(None).unwrap();
    let author = resource.relation(RelationKind::BelongsTo, "author").unwrap();
    assert_eq!(author.binding().unwrap().target.as_deref(), Some("authors"));
    let comments = resource.relation(RelationKind::HasMany, "comments").unwrap();
    assert!(comments.binding().is_none());
}

#[test]
fn test_except_hides_fields() {
    let resource = ResourceDefinition::new(BlogPost::default()).make(None).unwrap();
    assert_eq!(resource.fields(), ["id", "title"]);
    assert_eq!(resource.excluded(), ["draft_notes"]);
    assert!(resource.included().is_empty());
}

#[test]
fn test_no_repository_is_valid() {
    let definition = ResourceDefinition::new(BlogPost::default());
    assert!(definition.resolve_repository(None).unwrap().is_none());
    assert!(definition.make(None).unwrap().repository().is_none());
}

#[test]
fn test_schema_factory_takes_precedence() {
    let calls = Arc::new(AtomicUsize::new(0));
    let catalog = SchemaCatalog::new().with("blogPost", |schema: &mut Schema| {
        schema.string("headline");
    });
    let definition = ResourceDefinition::new(BlogPost {
        schema_calls: Arc::clone(&calls),
    })
    .with_collaborators(Collaborators::new().with_schema_factory(catalog));

    let schema = definition.resolve_schema().unwrap();
    assert_eq!(schema.names(), ["headline"]);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_concurrent_resolution_runs_the_hook_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let definition = Arc::new(ResourceDefinition::new(BlogPost {
        schema_calls: Arc::clone(&calls),
    }));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let definition = Arc::clone(&definition);
            thread::spawn(move || definition.make(None).unwrap())
        })
        .collect();
    let resources: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(resources.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
}

struct Titled;

impl DefinitionDecorator for Titled {
    fn decorate(&self, config: &mut ResourceConfig) {
        config.set_endpoint("titled");
    }
}

impl ResourceDecorator for Titled {
    fn decorate_schema(&self, schema: &mut Schema) {
        schema.string("title").nullable();
    }
}

struct Stamped;

impl DefinitionDecorator for Stamped {}

impl ResourceDecorator for Stamped {
    fn decorate_schema(&self, schema: &mut Schema) {
        // Sees what `Titled` did.
        if schema.get("title").is_some_and(|p| p.is_nullable()) {
            schema.string("stamped");
        }
    }
}

#[derive(Default)]
struct Note;

impl Resource for Note {
    fn configure(&self, config: ResourceConfigBuilder) -> ResourceConfigBuilder {
        config
            .decorate(Decorator::resource(Titled))
            .decorate(Decorator::resource(Stamped))
    }

    fn schema(&self, schema: &mut Schema) {
        schema.string("title");
    }
}

#[test]
fn test_decorators_run_in_order_after_the_hook() {
    let definition = ResourceDefinition::new(Note);
    assert_eq!(definition.endpoint(), "titled");

    let schema = definition.resolve_schema().unwrap();
    assert_eq!(schema.names(), ["title", "stamped"]);
    assert!(schema.get("title").unwrap().is_nullable());
}
