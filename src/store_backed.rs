//! # Store-Backed Definitions
//!
//! A [`StoreResource`] is backed by the reference store, so besides the
//! generic artifacts it derives a storage [`Model`]. Schema and model seed
//! each other; resolution is two-phase to keep that finite:
//!
//! 1. The *declared* schema (factory entry, or `schema` hook plus
//!    `decorate_schema`) is resolved and cached on its own.
//! 2. The model is derived from the declared schema: one column per field,
//!    then timestamps, the deletion marker, `decorate_model`, the `model`
//!    hook, and finally the listeners.
//! 3. The final schema is rebuilt from the model's table and overlaid with
//!    the declared properties, so columns added by the table (timestamps,
//!    decorator columns) appear in the schema too.
//!
//! Every hook runs once per definition, whichever artifact is asked for first.

use crate::cache::ResolvedCache;
use crate::config::ResourceConfig;
use crate::convention::table_name;
use crate::decorator::apply_model;
use crate::definition::{
    build_config, declared_schema, factory_populator, populate, registry_repository, Definition,
    Resource,
};
use crate::error::{ResolveError, ResolveResult};
use crate::factory::Collaborators;
use crate::listener::ListenerRegistry;
use crate::model::Model;
use crate::repository::{Repository, Sentinel, StoreRepository};
use crate::schema::Schema;
use crate::table::Table;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// A resource backed by the reference store.
pub trait StoreResource: Resource {
    /// Last edit of the derived table, after decorators.
    fn model(&self, _table: &mut Table) {}
}

pub struct StoreDefinition<R: StoreResource> {
    resource: R,
    config: ResourceConfig,
    collaborators: Collaborators,
    cache: ResolvedCache,
    /// Set when the model factory supplied the model; no listeners are attached then.
    factory_model: AtomicBool,
}

impl<R: StoreResource> StoreDefinition<R> {
    pub fn new(resource: R) -> Self {
        let config = build_config(&resource);
        Self {
            resource,
            config,
            collaborators: Collaborators::default(),
            cache: ResolvedCache::default(),
            factory_model: AtomicBool::new(false),
        }
    }

    pub fn with_collaborators(mut self, collaborators: Collaborators) -> Self {
        self.collaborators = collaborators;
        self
    }

    /// The schema the model is derived from.
    fn declared_schema(&self) -> ResolveResult<Arc<Schema>> {
        self.cache.declared_schema.get_or_try_init(|| {
            if let Some(populator) = factory_populator(&self.config, &self.collaborators) {
                return Ok(populate(&populator));
            }
            Ok(Arc::new(declared_schema(&self.resource, &self.config)))
        })
    }

    /// Resolves the storage model: model factory entry, else derived.
    pub fn resolve_model(&self) -> ResolveResult<Arc<Model>> {
        self.cache.model.get_or_try_init(|| {
            let endpoint = self.endpoint();
            let key = self.config.model_key();
            if let Some(model) = self
                .collaborators
                .model_factory
                .as_ref()
                .and_then(|factory| factory.lookup(&key))
            {
                info!(%endpoint, source = "factory", %key, "Model resolved");
                self.factory_model.store(true, Ordering::Release);
                return Ok(Arc::new(model));
            }

            let declared = self.declared_schema()?;
            let mut table = derive_table(&declared, &endpoint);
            if self.config.timestamps() {
                table.timestamps();
            }
            if self.config.soft_deletes() {
                table.soft_deletes();
            }
            apply_model(self.config.decorators(), &mut table);
            self.resource.model(&mut table);

            let mut model = Model::new(table);
            self.listener_registry()
                .attach(&mut model, &self.collaborators.registry)?;
            info!(
                %endpoint,
                source = "derived",
                table = model.table().table_name(),
                columns = model.table().columns().len(),
                "Model resolved"
            );
            Ok(Arc::new(model))
        })
    }

    fn listener_registry(&self) -> ListenerRegistry {
        ListenerRegistry::resolve(
            self.config.timestamps(),
            self.config.soft_deletes(),
            self.config.listeners(),
        )
    }
}

/// One column per schema property. The table is named after the schema's
/// table, else the snake-cased endpoint.
fn derive_table(schema: &Schema, endpoint: &str) -> Table {
    let mut table = Table::new();
    table.name(
        schema
            .table_name()
            .map(str::to_string)
            .unwrap_or_else(|| table_name(endpoint)),
    );
    for property in schema.properties() {
        let source = property.get_column();
        let column = table.column(source.column_type(), source.name());
        if source.is_primary() {
            column.primary();
        }
        if property.is_nullable() {
            column.nullable();
        }
    }
    table
}

impl<R: StoreResource> Definition for StoreDefinition<R> {
    fn resource(&self) -> &dyn Resource {
        &self.resource
    }

    fn config(&self) -> &ResourceConfig {
        &self.config
    }

    fn collaborators(&self) -> &Collaborators {
        &self.collaborators
    }

    fn cache(&self) -> &ResolvedCache {
        &self.cache
    }

    fn resolve_schema(&self) -> ResolveResult<Arc<Schema>> {
        self.cache.schema.get_or_try_init(|| {
            let endpoint = self.endpoint();
            if factory_populator(&self.config, &self.collaborators).is_some() {
                info!(%endpoint, source = "factory", key = %self.config.schema_key(), "Schema resolved");
                return self.declared_schema();
            }
            let model = self.resolve_model()?;
            let mut schema = Schema::from_table(model.table());
            let declared = self.declared_schema()?;
            schema.overlay(&declared);
            info!(%endpoint, source = "model", fields = schema.properties().len(), "Schema resolved");
            Ok(Arc::new(schema))
        })
    }

    fn resolve_repository(
        &self,
        sentinel: Option<&Sentinel>,
    ) -> ResolveResult<Option<Arc<dyn Repository>>> {
        self.cache.repository.get_or_try_init(|| {
            let endpoint = self.endpoint();
            if let Some(repository) = registry_repository(&self.config, &self.collaborators, sentinel)? {
                return Ok(Some(repository));
            }
            if let Some(repository) = self.resource.repository(sentinel) {
                info!(%endpoint, source = "hook", "Repository resolved");
                return Ok(Some(repository));
            }

            let database = self
                .collaborators
                .database
                .as_ref()
                .ok_or_else(|| ResolveError::MissingDatabase(endpoint.clone()))?;
            let model = self.resolve_model()?;
            let repository = StoreRepository::new(model, database.client().clone());
            debug!(%endpoint, source = "store", "Repository resolved");
            Ok(Some(Arc::new(repository) as Arc<dyn Repository>))
        })
    }

    /// Bindings of the derived model. A factory-supplied model carries its
    /// own wiring, so nothing is reported for it.
    fn listener_bindings(&self) -> ResolveResult<Option<ListenerRegistry>> {
        self.resolve_model()?;
        if self.factory_model.load(Ordering::Acquire) {
            return Ok(None);
        }
        Ok(Some(self.listener_registry()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResourceConfigBuilder;
    use crate::decorator::{Decorator, DefinitionDecorator, ResourceDecorator, StoreDecorator};
    use crate::factory::{ModelCatalog, SchemaCatalog};
    use crate::listener::{HandleSoftDeletes, HandleTimestamps, Listener, ListenerRef};
    use crate::model::ModelEvent;
    use crate::table::{ColumnType, CREATED_AT, DELETED_AT, UPDATED_AT};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Audited;
    impl DefinitionDecorator for Audited {}
    impl ResourceDecorator for Audited {}
    impl StoreDecorator for Audited {
        fn decorate_model(&self, table: &mut Table) {
            table.string("audited_by").nullable();
        }
    }

    struct Notify;
    impl Listener for Notify {}

    #[derive(Default)]
    struct Article {
        hook_calls: AtomicUsize,
    }

    impl Resource for Article {
        fn configure(&self, config: ResourceConfigBuilder) -> ResourceConfigBuilder {
            config
                .soft_deletes(true)
                .decorate(Decorator::store(Audited))
                .listen(ModelEvent::Creating, ListenerRef::instance(Notify))
        }

        fn schema(&self, schema: &mut Schema) {
            self.hook_calls.fetch_add(1, Ordering::SeqCst);
            schema.increments("id").primary();
            schema.string("headline").column("title");
        }
    }

    impl StoreResource for Article {
        fn model(&self, table: &mut Table) {
            table.integer("views");
        }
    }

    #[test]
    fn test_model_derived_from_declared_schema() {
        let definition = StoreDefinition::new(Article::default());
        let model = definition.resolve_model().unwrap();
        let table = model.table();

        assert_eq!(table.table_name(), "articles");
        let names: Vec<_> = table.columns().iter().map(|c| c.name()).collect();
        assert_eq!(
            names,
            ["id", "title", CREATED_AT, UPDATED_AT, DELETED_AT, "audited_by", "views"]
        );
        assert_eq!(table.primary_key().map(|c| c.name()), Some("id"));
        assert_eq!(model.listeners(ModelEvent::Creating).len(), 2);
        assert_eq!(model.listeners(ModelEvent::Fetching).len(), 1);
    }

    #[test]
    fn test_schema_and_model_share_one_hook_run() {
        let definition = StoreDefinition::new(Article::default());
        let schema = definition.resolve_schema().unwrap();
        let model = definition.resolve_model().unwrap();
        assert_eq!(definition.resource.hook_calls.load(Ordering::SeqCst), 1);

        // Declared names survive, table-only columns are appended.
        assert_eq!(schema.get("headline").unwrap().get_column().name(), "title");
        assert!(schema.has("audited_by"));
        assert!(schema.has(DELETED_AT));
        assert_eq!(schema.table_name(), Some(model.table().table_name()));
        assert!(Arc::ptr_eq(&schema, &definition.resolve_schema().unwrap()));
        assert!(Arc::ptr_eq(&model, &definition.resolve_model().unwrap()));
    }

    #[derive(Default)]
    struct Photo;

    impl Resource for Photo {
        fn schema(&self, schema: &mut Schema) {
            schema.increments("id").primary();
            schema.string("caption");
            schema.integer("rating");
        }
    }

    impl StoreResource for Photo {
        fn model(&self, table: &mut Table) {
            table.text("caption").nullable();
            table.float("rating");
        }
    }

    #[test]
    fn test_model_hook_retypes_resolved_schema() {
        let definition = StoreDefinition::new(Photo);
        let schema = definition.resolve_schema().unwrap();

        let caption = schema.get("caption").unwrap();
        assert_eq!(caption.get_column().column_type(), ColumnType::Text);
        assert!(caption.is_nullable());
        assert_eq!(
            schema.get("rating").map(|p| p.get_column().column_type()),
            Some(ColumnType::Float)
        );
        assert_eq!(schema.primary_key().map(|p| p.name()), Some("id"));
    }

    #[test]
    fn test_listener_order() {
        let definition = StoreDefinition::new(Article::default());
        let registry = definition.listener_bindings().unwrap().unwrap();
        let labels: Vec<_> = registry.ordered().iter().map(|l| l.label()).collect();
        assert_eq!(
            labels,
            [
                HandleTimestamps.label(),
                HandleSoftDeletes.label(),
                "Notify".to_string()
            ]
        );
    }

    #[test]
    fn test_model_factory_bypasses_derivation() {
        let definition = StoreDefinition::new(Article::default()).with_collaborators(
            Collaborators::new().with_model_factory(ModelCatalog::new().with("article", || {
                Model::make(|table| {
                    table.name("legacy_articles");
                    table.increments("article_id").primary();
                })
            })),
        );
        let model = definition.resolve_model().unwrap();
        assert_eq!(model.table().table_name(), "legacy_articles");
        assert!(model.listeners(ModelEvent::Creating).is_empty());
        assert_eq!(definition.resource.hook_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_factory_model_reports_no_listener_bindings() {
        let definition = StoreDefinition::new(Article::default()).with_collaborators(
            Collaborators::new().with_model_factory(ModelCatalog::new().with("article", || {
                Model::make(|table| {
                    table.name("legacy_articles");
                    table.increments("article_id").primary();
                })
            })),
        );
        assert!(definition.listener_bindings().unwrap().is_none());

        let model = definition.resolve_model().unwrap();
        assert!(model.listeners(ModelEvent::Deleting).is_empty());
        assert!(model.listeners(ModelEvent::Fetching).is_empty());
    }

    #[test]
    fn test_derived_model_reports_attached_bindings() {
        let definition = StoreDefinition::new(Article::default());
        let bindings = definition.listener_bindings().unwrap().unwrap();
        let model = definition.resolve_model().unwrap();
        for event in ModelEvent::ALL {
            assert_eq!(bindings.for_event(event).len(), model.listeners(event).len(), "{event}");
        }
    }

    #[test]
    fn test_schema_factory_seeds_model() {
        let definition = StoreDefinition::new(Article::default()).with_collaborators(
            Collaborators::new().with_schema_factory(SchemaCatalog::new().with("article", |s| {
                s.table("posts");
                s.increments("id").primary();
                s.json("body");
            })),
        );
        let schema = definition.resolve_schema().unwrap();
        assert_eq!(schema.names(), ["id", "body"]);

        let model = definition.resolve_model().unwrap();
        assert_eq!(model.table().table_name(), "posts");
        assert_eq!(
            model.table().get("body").map(|c| c.column_type()),
            Some(ColumnType::Json)
        );
        assert_eq!(definition.resource.hook_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_default_repository_needs_database() {
        let definition = StoreDefinition::new(Article::default());
        let result = definition.resolve_repository(None);
        assert!(matches!(result, Err(ResolveError::MissingDatabase(e)) if e == "articles"));
    }
}
