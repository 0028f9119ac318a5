//! # Collaborators
//!
//! Values a loader hands to every definition it builds:
//!
//! - a [`SchemaFactory`] and a [`ModelFactory`], consulted by lookup key
//!   before any convention applies. A missing key is a miss, not an error.
//! - a [`Registry`] of named repository, transformer and listener factories,
//!   the targets of the `repository(..)`, `transformer(..)` and
//!   [`ListenerRef::Named`](crate::listener::ListenerRef::Named) overrides.
//! - the [`Database`] backing store-resources, and the current request.

use crate::lifecycle::host::RequestContext;
use crate::listener::Listener;
use crate::model::Model;
use crate::repository::{Repository, Sentinel};
use crate::schema::Schema;
use crate::store::Database;
use crate::transformer::Transformer;
use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::sync::Arc;

/// Populates a fresh schema.
pub type SchemaPopulator = Arc<dyn Fn(&mut Schema) + Send + Sync>;

pub trait SchemaFactory: Send + Sync {
    fn lookup(&self, key: &str) -> Option<SchemaPopulator>;
}

pub trait ModelFactory: Send + Sync {
    fn lookup(&self, key: &str) -> Option<Model>;
}

/// Map-backed [`SchemaFactory`].
#[derive(Clone, Default)]
pub struct SchemaCatalog {
    entries: HashMap<String, SchemaPopulator>,
}

impl SchemaCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(
        mut self,
        key: impl Into<String>,
        populate: impl Fn(&mut Schema) + Send + Sync + 'static,
    ) -> Self {
        self.entries.insert(key.into(), Arc::new(populate));
        self
    }
}

impl SchemaFactory for SchemaCatalog {
    fn lookup(&self, key: &str) -> Option<SchemaPopulator> {
        self.entries.get(key).cloned()
    }
}

/// Map-backed [`ModelFactory`]. Each lookup builds a new model.
#[derive(Clone, Default)]
pub struct ModelCatalog {
    entries: HashMap<String, Arc<dyn Fn() -> Model + Send + Sync>>,
}

impl ModelCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(
        mut self,
        key: impl Into<String>,
        make: impl Fn() -> Model + Send + Sync + 'static,
    ) -> Self {
        self.entries.insert(key.into(), Arc::new(make));
        self
    }
}

impl ModelFactory for ModelCatalog {
    fn lookup(&self, key: &str) -> Option<Model> {
        self.entries.get(key).map(|make| make())
    }
}

pub type RepositoryFactory = Arc<dyn Fn(Option<Sentinel>) -> Arc<dyn Repository> + Send + Sync>;
pub type TransformerFactory = Arc<dyn Fn(Arc<Schema>) -> Arc<dyn Transformer> + Send + Sync>;
pub type ListenerFactory = Arc<dyn Fn() -> Arc<dyn Listener> + Send + Sync>;

/// Named factories, resolved when a definition first needs them.
#[derive(Clone, Default)]
pub struct Registry {
    repositories: HashMap<String, RepositoryFactory>,
    transformers: HashMap<String, TransformerFactory>,
    listeners: HashMap<String, ListenerFactory>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repository(
        mut self,
        name: impl Into<String>,
        factory: impl Fn(Option<Sentinel>) -> Arc<dyn Repository> + Send + Sync + 'static,
    ) -> Self {
        self.repositories.insert(name.into(), Arc::new(factory));
        self
    }

    pub fn with_transformer(
        mut self,
        name: impl Into<String>,
        factory: impl Fn(Arc<Schema>) -> Arc<dyn Transformer> + Send + Sync + 'static,
    ) -> Self {
        self.transformers.insert(name.into(), Arc::new(factory));
        self
    }

    pub fn with_listener(
        mut self,
        name: impl Into<String>,
        factory: impl Fn() -> Arc<dyn Listener> + Send + Sync + 'static,
    ) -> Self {
        self.listeners.insert(name.into(), Arc::new(factory));
        self
    }

    pub fn repository(&self, name: &str) -> Option<&RepositoryFactory> {
        self.repositories.get(name)
    }

    pub fn transformer(&self, name: &str) -> Option<&TransformerFactory> {
        self.transformers.get(name)
    }

    pub fn listener(&self, name: &str) -> Option<&ListenerFactory> {
        self.listeners.get(name)
    }
}

impl Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("repositories", &sorted_keys(&self.repositories))
            .field("transformers", &sorted_keys(&self.transformers))
            .field("listeners", &sorted_keys(&self.listeners))
            .finish()
    }
}

fn sorted_keys<V>(map: &HashMap<String, V>) -> Vec<&str> {
    let mut keys: Vec<_> = map.keys().map(String::as_str).collect();
    keys.sort_unstable();
    keys
}

/// Everything a definition may consult beyond its own declaration.
#[derive(Clone, Default)]
pub struct Collaborators {
    pub schema_factory: Option<Arc<dyn SchemaFactory>>,
    pub model_factory: Option<Arc<dyn ModelFactory>>,
    pub registry: Arc<Registry>,
    pub database: Option<Database>,
    pub request: Option<RequestContext>,
}

impl Collaborators {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema_factory(mut self, factory: impl SchemaFactory + 'static) -> Self {
        self.schema_factory = Some(Arc::new(factory));
        self
    }

    pub fn with_model_factory(mut self, factory: impl ModelFactory + 'static) -> Self {
        self.model_factory = Some(Arc::new(factory));
        self
    }

    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    pub fn with_database(mut self, database: Database) -> Self {
        self.database = Some(database);
        self
    }

    pub fn with_request(mut self, request: RequestContext) -> Self {
        self.request = Some(request);
        self
    }
}

impl Debug for Collaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators")
            .field("schema_factory", &self.schema_factory.is_some())
            .field("model_factory", &self.model_factory.is_some())
            .field("registry", &self.registry)
            .field("database", &self.database.is_some())
            .field("request", &self.request)
            .finish()
    }
}
