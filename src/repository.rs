//! # Repositories
//!
//! A [`Repository`] is the data-access object behind a resource. Resources
//! without one are valid; their resolved repository is `None`.
//!
//! A repository can opt into receiving the per-build [`Sentinel`] by
//! returning itself from [`Repository::sentinel_aware`]. The capability is
//! declared by the repository itself.

use crate::error::StoreError;
use crate::model::Model;
use crate::record::{Attributes, Query, Record};
use crate::store::StoreClient;
use async_trait::async_trait;
use serde_json::Value;
use std::any::Any;
use std::fmt::{self, Debug};
use std::sync::Arc;

/// Opaque per-build context supplied by the host, e.g. the current request.
#[derive(Clone)]
pub struct Sentinel(Arc<dyn Any + Send + Sync>);

impl Sentinel {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

impl Debug for Sentinel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Sentinel(..)")
    }
}

/// Receives the sentinel of the build that produced the repository.
pub trait SentinelAware {
    fn set_sentinel(&self, sentinel: Option<Sentinel>);
}

/// Data-access contract of a resource.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn find(&self, key: Value) -> Result<Option<Record>, StoreError>;

    async fn fetch(&self, query: Query) -> Result<Vec<Record>, StoreError>;

    async fn create(&self, attributes: Attributes) -> Result<Record, StoreError>;

    async fn update(&self, key: Value, attributes: Attributes) -> Result<Record, StoreError>;

    async fn delete(&self, key: Value) -> Result<(), StoreError>;

    /// Returns `Some` when this repository wants the build sentinel.
    fn sentinel_aware(&self) -> Option<&dyn SentinelAware> {
        None
    }
}

/// Repository over the reference store, bound to one model. It does not
/// take the build sentinel.
pub struct StoreRepository {
    model: Arc<Model>,
    client: StoreClient,
}

impl StoreRepository {
    pub fn new(model: Arc<Model>, client: StoreClient) -> Self {
        Self { model, client }
    }

    pub fn model(&self) -> &Arc<Model> {
        &self.model
    }

    /// Fetch on behalf of a relation; soft-deleted rows are not filtered.
    pub async fn fetch_related(&self, query: Query) -> Result<Vec<Record>, StoreError> {
        self.client.fetch(self.model.clone(), query, true).await
    }
}

impl Debug for StoreRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreRepository")
            .field("table", &self.model.table().table_name())
            .finish()
    }
}

#[async_trait]
impl Repository for StoreRepository {
    async fn find(&self, key: Value) -> Result<Option<Record>, StoreError> {
        self.client.find(self.model.clone(), key).await
    }

    async fn fetch(&self, query: Query) -> Result<Vec<Record>, StoreError> {
        self.client.fetch(self.model.clone(), query, false).await
    }

    async fn create(&self, attributes: Attributes) -> Result<Record, StoreError> {
        self.client
            .insert(self.model.clone(), Record::from_attributes(attributes))
            .await
    }

    async fn update(&self, key: Value, attributes: Attributes) -> Result<Record, StoreError> {
        self.client.update(self.model.clone(), key, attributes).await
    }

    async fn delete(&self, key: Value) -> Result<(), StoreError> {
        self.client.delete(self.model.clone(), key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{create_mock_store, expect_fetch};
    use serde_json::json;

    fn users() -> Arc<Model> {
        Arc::new(Model::make(|table| {
            table.name("users");
            table.increments("id").primary();
        }))
    }

    #[test]
    fn test_sentinel_downcast() {
        let sentinel = Sentinel::new(String::from("request-1"));
        assert_eq!(sentinel.downcast_ref::<String>().unwrap(), "request-1");
        assert!(sentinel.downcast_ref::<u32>().is_none());
    }

    #[tokio::test]
    async fn test_store_repository_declines_sentinel() {
        let (client, _receiver) = create_mock_store(1);
        let repository = StoreRepository::new(users(), client);
        assert!(repository.sentinel_aware().is_none());
    }

    #[tokio::test]
    async fn test_related_fetch_is_flagged() {
        let (client, mut receiver) = create_mock_store(1);
        let repository = StoreRepository::new(users(), client);

        let handle = tokio::spawn(async move { repository.fetch_related(Query::new()).await });

        let (_, via_relation, respond_to) = expect_fetch(&mut receiver).await.unwrap();
        assert!(via_relation);
        let mut row = Record::new();
        row.set_attribute("id", 1);
        let _ = respond_to.send(Ok(vec![row]));

        let rows = handle.await.unwrap().unwrap();
        assert_eq!(rows[0].get("id"), Some(&json!(1)));
    }
}
