//! # Store Client
//!
//! Cloneable handle used to talk to a running [`StoreActor`](super::StoreActor).

use super::message::StoreRequest;
use crate::error::StoreError;
use crate::model::Model;
use crate::record::{Attributes, Query, Record};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Async API over the store actor's channel. Holds only a sender, so cloning is cheap.
#[derive(Clone, Debug)]
pub struct StoreClient {
    sender: mpsc::Sender<StoreRequest>,
}

impl StoreClient {
    pub fn new(sender: mpsc::Sender<StoreRequest>) -> Self {
        Self { sender }
    }

    pub async fn insert(&self, model: Arc<Model>, record: Record) -> Result<Record, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Insert {
                model,
                record,
                respond_to,
            })
            .await
            .map_err(|_| StoreError::StoreClosed)?;
        response.await.map_err(|_| StoreError::StoreDropped)?
    }

    pub async fn find(&self, model: Arc<Model>, key: Value) -> Result<Option<Record>, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Find {
                model,
                key,
                respond_to,
            })
            .await
            .map_err(|_| StoreError::StoreClosed)?;
        response.await.map_err(|_| StoreError::StoreDropped)?
    }

    pub async fn fetch(
        &self,
        model: Arc<Model>,
        query: Query,
        via_relation: bool,
    ) -> Result<Vec<Record>, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Fetch {
                model,
                query,
                via_relation,
                respond_to,
            })
            .await
            .map_err(|_| StoreError::StoreClosed)?;
        response.await.map_err(|_| StoreError::StoreDropped)?
    }

    pub async fn update(
        &self,
        model: Arc<Model>,
        key: Value,
        attributes: Attributes,
    ) -> Result<Record, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Update {
                model,
                key,
                attributes,
                respond_to,
            })
            .await
            .map_err(|_| StoreError::StoreClosed)?;
        response.await.map_err(|_| StoreError::StoreDropped)?
    }

    pub async fn delete(&self, model: Arc<Model>, key: Value) -> Result<(), StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Delete {
                model,
                key,
                respond_to,
            })
            .await
            .map_err(|_| StoreError::StoreClosed)?;
        response.await.map_err(|_| StoreError::StoreDropped)?
    }
}
