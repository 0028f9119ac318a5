//! # Lifecycle
//!
//! Where definitions meet the host. The [`Loader`] holds the collaborators,
//! registers resource types with a [`HostRegistrar`], and its build functions
//! create one definition per request.
//!
//! - [`host`]: the host boundary ([`BuildFn`], [`HostContainer`], [`Api`]).
//! - [`loader`]: registration and per-request builds.
//! - [`tracing`]: subscriber setup.

pub mod host;
pub mod loader;
pub mod tracing;

pub use host::{Api, BuildFn, HostContainer, HostRegistrar, RequestContext};
pub use loader::Loader;
