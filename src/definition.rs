//! # Resource Definitions
//!
//! A [`Resource`] is what an API author writes: a type whose provided hooks
//! declare configuration, schema fields, and optional repository, transformer
//! and relation overrides. Every hook has a default, so implementing only
//! what differs from convention is enough.
//!
//! A [`Definition`] wraps a resource with its built [`ResourceConfig`], the
//! loader's [`Collaborators`] and a [`ResolvedCache`], and resolves each
//! artifact lazily, at most once:
//!
//! | Artifact | Tiers, first hit wins |
//! |----------|-----------------------|
//! | schema | schema factory, resource `schema` hook plus decorators |
//! | repository | named registry entry, resource `repository` hook, none |
//! | transformer | named registry entry, resource `transformer` hook, identity |
//! | relation binder | explicit binder, `relation_binder` override, convention |
//!
//! [`ResourceDefinition`] is the plain variant. Store-backed resources use
//! [`StoreDefinition`](crate::store_backed::StoreDefinition), which also
//! derives a storage model.

use crate::cache::ResolvedCache;
use crate::config::{ResourceConfig, ResourceConfigBuilder};
use crate::convention::type_basename;
use crate::decorator::{apply_definition, apply_schema};
use crate::error::{ResolveError, ResolveResult};
use crate::factory::{Collaborators, SchemaPopulator};
use crate::lifecycle::host::RequestContext;
use crate::listener::ListenerRegistry;
use crate::relation::{resolve_relation, Binder, RelationEntry, RelationKind, ResolvedRelation};
use crate::repository::{Repository, Sentinel};
use crate::resource::{ApiResource, ResourceShape};
use crate::schema::Schema;
use crate::transformer::{IdentityTransformer, Transformer};
use std::sync::Arc;
use tracing::{debug, info};

/// Author-facing hooks of a resource.
pub trait Resource: Send + Sync + 'static {
    /// Declares endpoint, overrides, projection, relations, listeners and
    /// decorators.
    fn configure(&self, config: ResourceConfigBuilder) -> ResourceConfigBuilder {
        config
    }

    /// Declares schema fields. Skipped when the schema factory has an entry.
    fn schema(&self, _schema: &mut Schema) {}

    fn repository(&self, _sentinel: Option<&Sentinel>) -> Option<Arc<dyn Repository>> {
        None
    }

    fn transformer(&self, _schema: &Arc<Schema>) -> Option<Arc<dyn Transformer>> {
        None
    }

    /// Binder override for a relation, keyed `kind + UpperCamel(name)`,
    /// e.g. `belongsToAuthor`.
    fn relation_binder(&self, _key: &str) -> Option<Binder> {
        None
    }
}

/// A resource bound to its configuration, collaborators and cache.
pub trait Definition: Send + Sync {
    fn resource(&self) -> &dyn Resource;

    fn config(&self) -> &ResourceConfig;

    fn collaborators(&self) -> &Collaborators;

    fn cache(&self) -> &ResolvedCache;

    fn resolve_schema(&self) -> ResolveResult<Arc<Schema>>;

    /// Resolves the repository. The first call's sentinel is the one the
    /// cached repository was built with.
    fn resolve_repository(
        &self,
        sentinel: Option<&Sentinel>,
    ) -> ResolveResult<Option<Arc<dyn Repository>>>;

    fn endpoint(&self) -> String {
        self.config().endpoint()
    }

    fn request(&self) -> Option<&RequestContext> {
        self.collaborators().request.as_ref()
    }

    fn resolve_transformer(&self, schema: &Arc<Schema>) -> ResolveResult<Arc<dyn Transformer>> {
        self.cache().transformer.get_or_try_init(|| {
            let endpoint = self.endpoint();
            if let Some(name) = self.config().transformer_ref() {
                let factory = self
                    .collaborators()
                    .registry
                    .transformer(name)
                    .ok_or_else(|| ResolveError::UnknownTransformer(name.to_string()))?;
                info!(%endpoint, source = "registry", entry = name, "Transformer resolved");
                return Ok(factory(Arc::clone(schema)));
            }
            if let Some(transformer) = self.resource().transformer(schema) {
                info!(%endpoint, source = "hook", "Transformer resolved");
                return Ok(transformer);
            }
            debug!(%endpoint, source = "identity", "Transformer resolved");
            Ok(Arc::new(IdentityTransformer::new(Arc::clone(schema))) as Arc<dyn Transformer>)
        })
    }

    fn resolve_relation(&self, kind: RelationKind, entry: &RelationEntry) -> ResolvedRelation {
        resolve_relation(kind, entry, &self.endpoint(), |key| {
            self.resource().relation_binder(key)
        })
    }

    /// All declared relations, in kind order then declaration order.
    fn resolve_relations(&self) -> Vec<ResolvedRelation> {
        self.config()
            .relations()
            .iter()
            .map(|(kind, entry)| self.resolve_relation(kind, entry))
            .collect()
    }

    /// Listener wiring; only store-backed definitions have any.
    fn listener_bindings(&self) -> ResolveResult<Option<ListenerRegistry>> {
        Ok(None)
    }

    /// Wires every artifact into an [`ApiResource`].
    fn make(&self, sentinel: Option<&Sentinel>) -> ResolveResult<Arc<ApiResource>> {
        self.cache().resource.get_or_try_init(|| {
            let config = self.config();
            let schema = self.resolve_schema()?;
            let repository = self.resolve_repository(sentinel)?;
            let transformer = self.resolve_transformer(&schema)?;
            let shape = if config.singleton() {
                ResourceShape::Singleton
            } else {
                ResourceShape::Collection
            };

            let mut resource =
                ApiResource::new(self.endpoint(), shape, schema, repository, transformer);
            if !config.only().is_empty() {
                resource = resource.only(config.only().iter().cloned());
            }
            if !config.except().is_empty() {
                resource = resource.except(config.except().iter().cloned());
            }
            for relation in self.resolve_relations() {
                resource = resource.relate(relation);
            }
            if let Some(listeners) = self.listener_bindings()? {
                resource = resource.with_listeners(listeners);
            }

            info!(
                endpoint = resource.endpoint(),
                shape = ?resource.shape(),
                fields = resource.fields().len(),
                relations = resource.relations().len(),
                "Resource wired"
            );
            Ok(Arc::new(resource))
        })
    }
}

/// Builds the config of `resource` and runs every decorator's `decorate`.
pub(crate) fn build_config<R: Resource>(resource: &R) -> ResourceConfig {
    let mut config = resource
        .configure(ResourceConfig::builder(type_basename::<R>()))
        .build();
    apply_definition(&mut config);
    debug!(
        endpoint = %config.endpoint(),
        decorators = config.decorators().len(),
        "Definition decorated"
    );
    config
}

/// Schema factory entry for this definition, if any.
pub(crate) fn factory_populator(
    config: &ResourceConfig,
    collaborators: &Collaborators,
) -> Option<SchemaPopulator> {
    collaborators
        .schema_factory
        .as_ref()
        .and_then(|factory| factory.lookup(&config.schema_key()))
}

pub(crate) fn populate(populator: &SchemaPopulator) -> Arc<Schema> {
    let mut schema = Schema::new();
    populator(&mut schema);
    Arc::new(schema)
}

/// Runs the resource's `schema` hook, then each decorator's `decorate_schema`.
pub(crate) fn declared_schema(resource: &dyn Resource, config: &ResourceConfig) -> Schema {
    let mut schema = Schema::new();
    resource.schema(&mut schema);
    apply_schema(config.decorators(), &mut schema);
    schema
}

/// Named registry repository. The sentinel is given to the factory and,
/// when the repository accepts one, set again through its setter.
pub(crate) fn registry_repository(
    config: &ResourceConfig,
    collaborators: &Collaborators,
    sentinel: Option<&Sentinel>,
) -> ResolveResult<Option<Arc<dyn Repository>>> {
    let Some(name) = config.repository_ref() else {
        return Ok(None);
    };
    let factory = collaborators
        .registry
        .repository(name)
        .ok_or_else(|| ResolveError::UnknownRepository(name.to_string()))?;
    let repository = factory(sentinel.cloned());
    if let Some(aware) = repository.sentinel_aware() {
        aware.set_sentinel(sentinel.cloned());
    }
    info!(endpoint = %config.endpoint(), source = "registry", entry = name, "Repository resolved");
    Ok(Some(repository))
}

/// Definition of a resource that is not store-backed.
pub struct ResourceDefinition<R: Resource> {
    resource: R,
    config: ResourceConfig,
    collaborators: Collaborators,
    cache: ResolvedCache,
}

impl<R: Resource> ResourceDefinition<R> {
    /// Builds the config and applies decorators.
    pub fn new(resource: R) -> Self {
        let config = build_config(&resource);
        Self {
            resource,
            config,
            collaborators: Collaborators::default(),
            cache: ResolvedCache::default(),
        }
    }

    pub fn with_collaborators(mut self, collaborators: Collaborators) -> Self {
        self.collaborators = collaborators;
        self
    }
}

impl<R: Resource> Definition for ResourceDefinition<R> {
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
            if let Some(populator) = factory_populator(&self.config, &self.collaborators) {
                info!(%endpoint, source = "factory", key = %self.config.schema_key(), "Schema resolved");
                return Ok(populate(&populator));
            }
            let schema = declared_schema(&self.resource, &self.config);
            info!(%endpoint, source = "declared", fields = schema.properties().len(), "Schema resolved");
            Ok(Arc::new(schema))
        })
    }

    fn resolve_repository(
        &self,
        sentinel: Option<&Sentinel>,
    ) -> ResolveResult<Option<Arc<dyn Repository>>> {
        self.cache.repository.get_or_try_init(|| {
            if let Some(repository) = registry_repository(&self.config, &self.collaborators, sentinel)? {
                return Ok(Some(repository));
            }
            if let Some(repository) = self.resource.repository(sentinel) {
                info!(endpoint = %self.endpoint(), source = "hook", "Repository resolved");
                return Ok(Some(repository));
            }
            debug!(endpoint = %self.endpoint(), "Resource has no repository");
            Ok(None)
        })
    }
}
