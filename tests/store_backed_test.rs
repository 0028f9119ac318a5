use api_resource_loader::mock::MockStore;
use api_resource_loader::{
    Collaborators, Database, Definition, Event, Listener, ListenerRef, ModelEvent, Query,
    ResolveError, Resource, ResourceConfigBuilder, Schema, StoreDefinition, StoreError,
    StoreRepository, StoreResource,
};
use serde_json::{json, Value};

#[derive(Debug)]
struct Shout;

impl Listener for Shout {
    fn creating(&self, event: &mut Event) {
        if let Some(record) = event.record_mut() {
            let title = record.get("title").and_then(Value::as_str).map(str::to_uppercase);
            if let Some(title) = title {
                record.set_attribute("title", title);
            }
        }
    }
}

#[derive(Default)]
struct Post;

impl Resource for Post {
    fn configure(&self, config: ResourceConfigBuilder) -> ResourceConfigBuilder {
        config
            .soft_deletes(true)
            .listen(ModelEvent::Creating, ListenerRef::instance(Shout))
    }

    fn schema(&self, schema: &mut Schema) {
        schema.increments("id").primary();
        schema.string("title");
    }
}

impl StoreResource for Post {}

fn attributes(value: Value) -> api_resource_loader::Attributes {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected an object"),
    }
}

#[test]
fn test_model_and_schema_are_derived_together() {
    let definition = StoreDefinition::new(Post);
    let model = definition.resolve_model().unwrap();
    assert_eq!(model.table().table_name(), "posts");
    assert!(model.table().has_column("created_at"));
    assert!(model.table().has_column("deleted_at"));

    let schema = definition.resolve_schema().unwrap();
    assert_eq!(
        schema.names(),
        ["id", "title", "created_at", "updated_at", "deleted_at"]
    );

    let creating: Vec<String> = model
        .listeners(ModelEvent::Creating)
        .iter()
        .map(|l| l.label())
        .collect();
    assert_eq!(creating, ["HandleTimestamps", "Shout"]);
}

#[test]
fn test_store_backed_without_database_fails() {
    let definition = StoreDefinition::new(Post);
    let err = definition.make(None).unwrap_err();
    assert!(matches!(err, ResolveError::MissingDatabase(endpoint) if endpoint == "posts"));
    // The failure is not cached.
    assert!(matches!(
        definition.resolve_repository(None),
        Err(ResolveError::MissingDatabase(_))
    ));
}

#[tokio::test]
async fn test_soft_delete_round_trip() {
    let (database, handle) = Database::start(16);
    let definition = StoreDefinition::new(Post)
        .with_collaborators(Collaborators::new().with_database(database.clone()));
    let resource = definition.make(None).unwrap();
    let repository = resource.repository().unwrap();

    let kept = repository
        .create(attributes(json!({ "title": "kept" })))
        .await
        .unwrap();
    assert_eq!(kept.get("title"), Some(&json!("KEPT")));
    assert!(kept.is_set("created_at"));

    let gone = repository
        .create(attributes(json!({ "title": "gone" })))
        .await
        .unwrap();
    let gone_id = gone.get("id").cloned().unwrap();
    repository.delete(gone_id.clone()).await.unwrap();

    let visible = repository.fetch(Query::new()).await.unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].get("title"), Some(&json!("KEPT")));

    let direct = repository.find(gone_id).await.unwrap().unwrap();
    assert!(direct.is_set("deleted_at"));

    let related = StoreRepository::new(definition.resolve_model().unwrap(), database.client().clone());
    assert_eq!(related.fetch_related(Query::new()).await.unwrap().len(), 2);

    drop(related);
    drop(resource);
    drop(definition);
    drop(database);
    handle.await.unwrap();
}

#[tokio::test]
async fn test_store_errors_reach_the_caller() {
    let mut mock = MockStore::new();
    mock.expect_update()
        .return_err(StoreError::NotFound("9".to_string()));

    let definition = StoreDefinition::new(Post)
        .with_collaborators(Collaborators::new().with_database(mock.database()));
    let resource = definition.make(None).unwrap();

    let err = resource
        .repository()
        .unwrap()
        .update(json!(9), attributes(json!({ "title": "x" })))
        .await
        .unwrap_err();
    assert_eq!(err, StoreError::NotFound("9".to_string()));
    mock.verify();
}
