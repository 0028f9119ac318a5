//! # Lifecycle
//!
//! Starts the store, wires the loader and registers the sample's resources
//! with the host. [`BlogSystem`] owns all of it and shuts it down in order:
//! host registrations and the database handle are dropped, which closes the
//! store's channel, then the store task is awaited.
//!
//! ```bash
//! RUST_LOG=info cargo run      # Registration and store lifecycle
//! RUST_LOG=debug cargo run     # Every resolution step and store request
//! ```

pub mod blog_system;

pub use blog_system::{BlogSystem, SystemError};
