//! # Reference Store
//!
//! In-memory storage engine backing store-resources. It follows the actor
//! pattern: one [`StoreActor`] task owns every table, [`StoreClient`] handles
//! send [`StoreRequest`]s and await a oneshot reply.
//!
//! Each request carries the [`Model`](crate::model::Model) it targets, so the
//! actor fires that model's listeners (timestamps, soft deletes, user
//! listeners) around the write.

pub mod actor;
pub mod client;
pub mod message;

pub use actor::StoreActor;
pub use client::StoreClient;
pub use message::{Response, StoreRequest};

use tokio::task::JoinHandle;
use tracing::info;

/// Handle to a running store, handed to definitions as a collaborator.
#[derive(Clone, Debug)]
pub struct Database {
    client: StoreClient,
}

impl Database {
    /// Wraps an existing client, e.g. one produced by
    /// [`create_mock_store`](crate::mock::create_mock_store).
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    /// Spawns a store actor on the current Tokio runtime.
    pub fn start(buffer_size: usize) -> (Self, JoinHandle<()>) {
        let (actor, client) = StoreActor::new(buffer_size);
        let handle = tokio::spawn(actor.run());
        info!(buffer_size, "Database started");
        (Self { client }, handle)
    }

    pub fn client(&self) -> &StoreClient {
        &self.client
    }
}
