//! # Store Messages
//!
//! Requests sent from a [`StoreClient`](super::StoreClient) to the
//! [`StoreActor`](super::StoreActor). Each carries the [`Model`] it targets, so
//! one actor serves every table and fires that model's listeners.

use crate::error::StoreError;
use crate::model::Model;
use crate::record::{Attributes, Query, Record};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::oneshot;

/// One-shot response channel used by the store actor.
pub type Response<T> = oneshot::Sender<Result<T, StoreError>>;

/// Storage operations understood by the store actor.
///
/// - **Insert** fires `creating` and stores the record.
/// - **Find** is a direct key lookup; it fires no listeners.
/// - **Fetch** fires `fetching` and returns records matching the query.
/// - **Update** merges attributes, fires `updating` and stores the result.
/// - **Delete** fires `deleting` and removes the record unless a listener
///   prevented it.
#[derive(Debug)]
pub enum StoreRequest {
    Insert {
        model: Arc<Model>,
        record: Record,
        respond_to: Response<Record>,
    },
    Find {
        model: Arc<Model>,
        key: Value,
        respond_to: Response<Option<Record>>,
    },
    Fetch {
        model: Arc<Model>,
        query: Query,
        via_relation: bool,
        respond_to: Response<Vec<Record>>,
    },
    Update {
        model: Arc<Model>,
        key: Value,
        attributes: Attributes,
        respond_to: Response<Record>,
    },
    Delete {
        model: Arc<Model>,
        key: Value,
        respond_to: Response<()>,
    },
}
