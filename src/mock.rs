//! # Mock Store & Testing Guide
//!
//! [`MockStore`] hands out a real [`StoreClient`] whose requests are answered
//! from a queue of expectations instead of a running store actor. Use it to
//! test repository logic and failure handling deterministically.
//!
//! | Feature | MockStore | Database |
//! |---------|-----------|----------|
//! | **State** | None (expectations) | Real tables |
//! | **Listeners** | Never fired | Fired per request |
//! | **Error injection** | `return_err` | Hard |
//! | **Use case** | Code *around* a repository | The store itself or full builds |
//!
//! ## Fluent expectations
//!
//! ```rust
//! use api_resource_loader::mock::MockStore;
//! use api_resource_loader::{Model, Repository, StoreError, StoreRepository};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut mock = MockStore::new();
//!     mock.expect_find().return_ok(None);
//!     mock.expect_delete().return_err(StoreError::NotFound("7".into()));
//!
//!     let model = Arc::new(Model::make(|table| {
//!         table.name("posts");
//!         table.increments("id").primary();
//!     }));
//!     let repository = StoreRepository::new(model, mock.client());
//!
//!     assert!(repository.find(json!(7)).await.unwrap().is_none());
//!     assert!(repository.delete(json!(7)).await.is_err());
//!     mock.verify();
//! }
//! ```
//!
//! ## Raw requests
//!
//! [`create_mock_store`] returns a client and the receiving end of its
//! channel. The `expect_*` helpers pop the next request, returning its
//! payload and the responder, so a test can assert on what was sent.

use crate::error::StoreError;
use crate::record::{Query, Record};
use crate::store::{Database, StoreClient, StoreRequest};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{mpsc, oneshot};

enum Expectation {
    Insert(Result<Record, StoreError>),
    Find(Result<Option<Record>, StoreError>),
    Fetch(Result<Vec<Record>, StoreError>),
    Update(Result<Record, StoreError>),
    Delete(Result<(), StoreError>),
}

type Expectations = Arc<Mutex<VecDeque<Expectation>>>;

fn lock(expectations: &Expectations) -> std::sync::MutexGuard<'_, VecDeque<Expectation>> {
    expectations.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A store stand-in answering requests from queued expectations, in order.
pub struct MockStore {
    client: StoreClient,
    expectations: Expectations,
    _handle: tokio::task::JoinHandle<()>,
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockStore {
    /// Must be called inside a Tokio runtime.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<StoreRequest>(100);
        let expectations: Expectations = Arc::new(Mutex::new(VecDeque::new()));
        let queue = Arc::clone(&expectations);

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let expectation = lock(&queue).pop_front();
                match (request, expectation) {
                    (StoreRequest::Insert { respond_to, .. }, Some(Expectation::Insert(r))) => {
                        let _ = respond_to.send(r);
                    }
                    (StoreRequest::Find { respond_to, .. }, Some(Expectation::Find(r))) => {
                        let _ = respond_to.send(r);
                    }
                    (StoreRequest::Fetch { respond_to, .. }, Some(Expectation::Fetch(r))) => {
                        let _ = respond_to.send(r);
                    }
                    (StoreRequest::Update { respond_to, .. }, Some(Expectation::Update(r))) => {
                        let _ = respond_to.send(r);
                    }
                    (StoreRequest::Delete { respond_to, .. }, Some(Expectation::Delete(r))) => {
                        let _ = respond_to.send(r);
                    }
                    (request, _) => panic!("Unexpected store request: {request:?}"),
                }
            }
        });

        Self {
            client: StoreClient::new(sender),
            expectations,
            _handle: handle,
        }
    }

    pub fn client(&self) -> StoreClient {
        self.client.clone()
    }

    /// A [`Database`] over the mock client, for loaders and definitions.
    pub fn database(&self) -> Database {
        Database::new(self.client())
    }

    pub fn expect_insert(&mut self) -> ExpectationBuilder<Record> {
        self.builder(Expectation::Insert)
    }

    pub fn expect_find(&mut self) -> ExpectationBuilder<Option<Record>> {
        self.builder(Expectation::Find)
    }

    pub fn expect_fetch(&mut self) -> ExpectationBuilder<Vec<Record>> {
        self.builder(Expectation::Fetch)
    }

    pub fn expect_update(&mut self) -> ExpectationBuilder<Record> {
        self.builder(Expectation::Update)
    }

    pub fn expect_delete(&mut self) -> ExpectationBuilder<()> {
        self.builder(Expectation::Delete)
    }

    fn builder<T>(&self, wrap: fn(Result<T, StoreError>) -> Expectation) -> ExpectationBuilder<T> {
        ExpectationBuilder {
            expectations: Arc::clone(&self.expectations),
            wrap,
        }
    }

    /// Panics if any expectation is still queued.
    pub fn verify(&self) {
        let remaining = lock(&self.expectations).len();
        if remaining > 0 {
            panic!("Not all expectations were met. {} remaining", remaining);
        }
    }
}

/// Queues the response for one expected request.
pub struct ExpectationBuilder<T> {
    expectations: Expectations,
    wrap: fn(Result<T, StoreError>) -> Expectation,
}

impl<T> ExpectationBuilder<T> {
    pub fn return_ok(self, value: T) {
        lock(&self.expectations).push_back((self.wrap)(Ok(value)));
    }

    pub fn return_err(self, error: StoreError) {
        lock(&self.expectations).push_back((self.wrap)(Err(error)));
    }
}

/// Creates a store client and the receiver its requests arrive on.
pub fn create_mock_store(buffer_size: usize) -> (StoreClient, mpsc::Receiver<StoreRequest>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (StoreClient::new(sender), receiver)
}

/// Next request, if it is a `Find`.
pub async fn expect_find(
    receiver: &mut mpsc::Receiver<StoreRequest>,
) -> Option<(Value, oneshot::Sender<Result<Option<Record>, StoreError>>)> {
    match receiver.recv().await {
        Some(StoreRequest::Find {
            key, respond_to, ..
        }) => Some((key, respond_to)),
        _ => None,
    }
}

/// Next request, if it is a `Fetch`: the query, the relation flag and the responder.
pub async fn expect_fetch(
    receiver: &mut mpsc::Receiver<StoreRequest>,
) -> Option<(Query, bool, oneshot::Sender<Result<Vec<Record>, StoreError>>)> {
    match receiver.recv().await {
        Some(StoreRequest::Fetch {
            query,
            via_relation,
            respond_to,
            ..
        }) => Some((query, via_relation, respond_to)),
        _ => None,
    }
}

/// Next request, if it is a `Delete`.
pub async fn expect_delete(
    receiver: &mut mpsc::Receiver<StoreRequest>,
) -> Option<(Value, oneshot::Sender<Result<(), StoreError>>)> {
    match receiver.recv().await {
        Some(StoreRequest::Delete {
            key, respond_to, ..
        }) => Some((key, respond_to)),
        _ => None,
    }
}
