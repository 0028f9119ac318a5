//! # Loader
//!
//! Registers resource types with a host. Each registration stores a build
//! function; every call of it creates a fresh definition carrying the
//! loader's collaborators and wires the resource for that request.
//!
//! ```rust
//! use api_resource_loader::{Api, HostContainer, Loader, Resource, Schema};
//!
//! #[derive(Default)]
//! struct BlogPost;
//!
//! impl Resource for BlogPost {
//!     fn schema(&self, schema: &mut Schema) {
//!         schema.increments("id").primary();
//!         schema.string("title");
//!     }
//! }
//!
//! let mut api = Api::new();
//! let endpoint = Loader::new().register::<BlogPost>(&mut api);
//! assert_eq!(endpoint, "blog-posts");
//!
//! let resource = api.build("blog-posts", &HostContainer::new()).unwrap();
//! assert_eq!(resource.fields(), ["id", "title"]);
//! ```

use super::host::{BuildFn, HostContainer, HostRegistrar, RequestContext};
use crate::convention::type_basename;
use crate::definition::{Definition, Resource, ResourceDefinition};
use crate::error::ResolveResult;
use crate::factory::{Collaborators, ModelFactory, Registry, SchemaFactory};
use crate::resource::ApiResource;
use crate::store::Database;
use crate::store_backed::{StoreDefinition, StoreResource};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct Loader {
    collaborators: Collaborators,
}

impl Loader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema_factory(mut self, factory: impl SchemaFactory + 'static) -> Self {
        self.collaborators = self.collaborators.with_schema_factory(factory);
        self
    }

    pub fn model_factory(mut self, factory: impl ModelFactory + 'static) -> Self {
        self.collaborators = self.collaborators.with_model_factory(factory);
        self
    }

    pub fn registry(mut self, registry: Registry) -> Self {
        self.collaborators = self.collaborators.with_registry(registry);
        self
    }

    pub fn database(mut self, database: Database) -> Self {
        self.collaborators = self.collaborators.with_database(database);
        self
    }

    pub fn request(mut self, request: RequestContext) -> Self {
        self.collaborators = self.collaborators.with_request(request);
        self
    }

    pub fn collaborators(&self) -> &Collaborators {
        &self.collaborators
    }

    /// Registers `R` at its endpoint and returns the endpoint.
    pub fn register<R: Resource + Default>(&self, host: &mut impl HostRegistrar) -> String {
        let endpoint = ResourceDefinition::new(R::default()).endpoint();
        let collaborators = self.collaborators.clone();
        let build: BuildFn = Arc::new(move |container: &HostContainer| {
            let definition =
                ResourceDefinition::new(R::default()).with_collaborators(collaborators.clone());
            build_resource(&definition, container)
        });
        host.register(&endpoint, build);
        info!(%endpoint, resource = type_basename::<R>(), "Resource registered");
        endpoint
    }

    /// Registers a store-backed `R` at its endpoint and returns the endpoint.
    pub fn register_store<R: StoreResource + Default>(
        &self,
        host: &mut impl HostRegistrar,
    ) -> String {
        let endpoint = StoreDefinition::new(R::default()).endpoint();
        let collaborators = self.collaborators.clone();
        let build: BuildFn = Arc::new(move |container: &HostContainer| {
            let definition =
                StoreDefinition::new(R::default()).with_collaborators(collaborators.clone());
            build_resource(&definition, container)
        });
        host.register(&endpoint, build);
        info!(%endpoint, resource = type_basename::<R>(), store = true, "Resource registered");
        endpoint
    }
}

#[tracing::instrument(
    name = "build",
    skip_all,
    fields(
        endpoint = %definition.endpoint(),
        method = definition.request().map(RequestContext::method),
        path = definition.request().map(RequestContext::path),
    )
)]
fn build_resource(
    definition: &dyn Definition,
    container: &HostContainer,
) -> ResolveResult<Arc<ApiResource>> {
    definition.make(container.sentinel())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResourceConfigBuilder;
    use crate::lifecycle::host::Api;
    use crate::schema::Schema;

    #[derive(Default)]
    struct Profile;
    impl Resource for Profile {
        fn configure(&self, config: ResourceConfigBuilder) -> ResourceConfigBuilder {
            config.endpoint("me").singleton()
        }

        fn schema(&self, schema: &mut Schema) {
            schema.string("name");
        }
    }

    #[test]
    fn test_each_build_is_a_fresh_definition() {
        let mut api = Api::new();
        let endpoint = Loader::new()
            .request(RequestContext::new("GET", "/me"))
            .register::<Profile>(&mut api);
        assert_eq!(endpoint, "me");
        assert_eq!(api.endpoints(), ["me"]);

        let first = api.build("me", &HostContainer::new()).unwrap();
        let second = api.build("me", &HostContainer::new()).unwrap();
        assert!(first.is_singleton());
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_configured_request_reaches_definitions() {
        let loader = Loader::new().request(RequestContext::new("GET", "/me"));
        let definition =
            ResourceDefinition::new(Profile).with_collaborators(loader.collaborators().clone());

        let request = definition.request().unwrap();
        assert_eq!(request.method(), "GET");
        assert_eq!(request.path(), "/me");
        assert!(ResourceDefinition::new(Profile).request().is_none());
    }
}
