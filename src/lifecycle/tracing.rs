//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing_subscriber` formatter driven
//! by `RUST_LOG`. Module paths are hidden; events carry structured fields
//! instead (`endpoint`, `source`, `table`, `key`).
//!
//! ## What Gets Traced
//!
//! - **Resolution**: which tier produced each artifact, as a `source` field
//!   (`"factory"`, `"registry"`, `"hook"`, `"declared"`, `"derived"`,
//!   `"model"`, `"store"` or `"identity"`).
//! - **Decorators**: every hook a decorator ran, at `debug`.
//! - **Store**: actor startup and shutdown, creates, updates and deletes at
//!   `info`, lookups and fetches at `debug`, failures at `warn`.
//! - **Builds**: each per-request build runs inside a `build{endpoint=..}` span,
//!   which also carries `method` and `path` when the loader has a request.
//!
//! ## Usage
//!
//! ```bash
//! # Registrations, wired resources and writes
//! RUST_LOG=info cargo run -p resource-sample
//!
//! # Every tier decision and store lookup
//! RUST_LOG=debug cargo run -p resource-sample
//!
//! # Only the store
//! RUST_LOG=api_resource_loader::store=debug cargo run -p resource-sample
//! ```
//!
//! With `RUST_LOG=info` a build reads:
//!
//! ```text
//! INFO build: Schema resolved endpoint="blog-posts" source="model" fields=7
//! INFO build: Resource wired endpoint="blog-posts" shape=Collection fields=6 relations=2
//! ```

pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
