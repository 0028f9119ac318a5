use crate::listeners::Slugger;
use crate::resources::{Author, BlogPost, Comment, Order, OrderItem, Stats};
use api_resource_loader::{
    Api, ApiResource, Attributes, Database, HostContainer, Listener, Loader, Query, Registry,
    Repository, ResolveError, StoreError,
};
use serde_json::Value;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Errors surfaced by [`BlogSystem`] operations.
#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Resource has no repository: {0}")]
    MissingRepository(String),
    #[error("Store task failed: {0}")]
    Task(String),
}

/// The sample blog API: a running store plus every resource registered with
/// the host.
///
/// Each call to [`BlogSystem::resource`] builds a fresh definition, the way a
/// host builds one per request. Records persist across builds because the
/// store keys its tables by name.
///
/// # Example
///
/// ```ignore
/// let system = BlogSystem::new();
/// let post = system.create("blog-posts", attributes).await?;
/// system.shutdown().await?;
/// ```
pub struct BlogSystem {
    pub api: Api,
    database: Database,
    handle: JoinHandle<()>,
}

impl BlogSystem {
    /// Starts the store and registers all resources.
    pub fn new() -> Self {
        let (database, handle) = Database::start(64);

        let registry = Registry::new().with_listener("slugger", || -> Arc<dyn Listener> {
            Arc::new(Slugger)
        });
        let loader = Loader::new().database(database.clone()).registry(registry);

        let mut api = Api::new();
        loader.register_store::<Author>(&mut api);
        loader.register_store::<BlogPost>(&mut api);
        loader.register_store::<Comment>(&mut api);
        loader.register_store::<Order>(&mut api);
        loader.register_store::<OrderItem>(&mut api);
        loader.register::<Stats>(&mut api);
        info!(endpoints = ?api.endpoints(), "Blog system ready");

        Self {
            api,
            database,
            handle,
        }
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Builds the resource at `endpoint` for one request.
    pub fn resource(&self, endpoint: &str) -> Result<Arc<ApiResource>, SystemError> {
        Ok(self.api.build(endpoint, &HostContainer::new())?)
    }

    /// Creates a record and returns its projected attributes.
    pub async fn create(
        &self,
        endpoint: &str,
        attributes: Attributes,
    ) -> Result<Attributes, SystemError> {
        let resource = self.resource(endpoint)?;
        let record = repository(&resource)?.create(attributes).await?;
        Ok(resource.project(&record))
    }

    /// Lists the records visible at `endpoint`, projected.
    pub async fn list(&self, endpoint: &str) -> Result<Vec<Attributes>, SystemError> {
        let resource = self.resource(endpoint)?;
        let records = repository(&resource)?.fetch(Query::new()).await?;
        Ok(records.iter().map(|r| resource.project(r)).collect())
    }

    pub async fn delete(&self, endpoint: &str, key: Value) -> Result<(), SystemError> {
        let resource = self.resource(endpoint)?;
        repository(&resource)?.delete(key).await?;
        Ok(())
    }

    /// Drops every handle on the store, then waits for it to stop.
    ///
    /// Resources built by the caller hold store clients too; drop them first
    /// or this waits forever.
    pub async fn shutdown(self) -> Result<(), SystemError> {
        info!("Shutting down blog system...");
        drop(self.api);
        drop(self.database);

        if let Err(e) = self.handle.await {
            error!(error = %e, "Store task failed");
            return Err(SystemError::Task(e.to_string()));
        }

        info!("Blog system shutdown complete.");
        Ok(())
    }
}

impl Default for BlogSystem {
    fn default() -> Self {
        Self::new()
    }
}

fn repository(resource: &ApiResource) -> Result<&Arc<dyn Repository>, SystemError> {
    resource
        .repository()
        .ok_or_else(|| SystemError::MissingRepository(resource.endpoint().to_string()))
}
