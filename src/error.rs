//! # Errors
//!
//! Resolution and storage error types. Convention misses (no factory entry, no
//! override) are not errors; they select the next fallback tier and surface as
//! `None` internally. What remains here are declaration defects, reported once
//! at the point of first resolution, and failures of the reference store.

use crate::cache::Artifact;

/// Errors raised while resolving a resource definition.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Re-entrant resolution of {0}")]
    Reentrant(Artifact),
    #[error("Unknown repository: {0}")]
    UnknownRepository(String),
    #[error("Unknown transformer: {0}")]
    UnknownTransformer(String),
    #[error("Unknown listener: {0}")]
    UnknownListener(String),
    #[error("No database configured for store-backed resource: {0}")]
    MissingDatabase(String),
    #[error("No resource registered at endpoint: {0}")]
    UnknownEndpoint(String),
}

/// Errors raised by the reference storage engine.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum StoreError {
    #[error("Store closed")]
    StoreClosed,
    #[error("Store dropped response channel")]
    StoreDropped,
    #[error("Record not found: {0}")]
    NotFound(String),
    #[error("Table has no primary key: {0}")]
    MissingPrimaryKey(String),
    #[error("Invalid key for table {table}: {key}")]
    InvalidKey { table: String, key: String },
    #[error("Duplicate key for table {table}: {key}")]
    DuplicateKey { table: String, key: String },
}

pub type ResolveResult<T> = Result<T, ResolveError>;
