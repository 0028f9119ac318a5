//! # Host Boundary
//!
//! The serving framework is external. What the loader needs from it is a
//! [`HostRegistrar`] accepting `(endpoint, build)` pairs, and a
//! [`HostContainer`] handed to each build carrying the request's sentinel.
//!
//! [`Api`] is an in-memory registrar: enough to drive builds from tests and
//! the sample application.

use crate::error::{ResolveError, ResolveResult};
use crate::repository::Sentinel;
use crate::resource::ApiResource;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::{self, Debug};
use std::sync::Arc;
use tracing::debug;

/// Produces the wired resource for one request.
pub type BuildFn = Arc<dyn Fn(&HostContainer) -> ResolveResult<Arc<ApiResource>> + Send + Sync>;

pub trait HostRegistrar {
    fn register(&mut self, endpoint: &str, build: BuildFn);
}

/// Per-request values the host passes to a build.
#[derive(Debug, Clone, Default)]
pub struct HostContainer {
    sentinel: Option<Sentinel>,
}

impl HostContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sentinel(mut self, sentinel: Sentinel) -> Self {
        self.sentinel = Some(sentinel);
        self
    }

    pub fn sentinel(&self) -> Option<&Sentinel> {
        self.sentinel.as_ref()
    }
}

/// The request a loader was configured for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestContext {
    method: String,
    path: String,
}

impl RequestContext {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// In-memory registrar keyed by endpoint.
#[derive(Default)]
pub struct Api {
    routes: BTreeMap<String, BuildFn>,
}

impl Api {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn endpoints(&self) -> Vec<&str> {
        self.routes.keys().map(String::as_str).collect()
    }

    pub fn contains(&self, endpoint: &str) -> bool {
        self.routes.contains_key(endpoint)
    }

    /// Runs the build registered at `endpoint`.
    pub fn build(&self, endpoint: &str, container: &HostContainer) -> ResolveResult<Arc<ApiResource>> {
        let build = self
            .routes
            .get(endpoint)
            .ok_or_else(|| ResolveError::UnknownEndpoint(endpoint.to_string()))?;
        build(container)
    }
}

impl HostRegistrar for Api {
    fn register(&mut self, endpoint: &str, build: BuildFn) {
        if self.routes.insert(endpoint.to_string(), build).is_some() {
            debug!(endpoint, "Replaced existing route");
        }
    }
}

impl Debug for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Api")
            .field("endpoints", &self.endpoints())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_endpoint() {
        let api = Api::new();
        let result = api.build("ghosts", &HostContainer::new());
        assert!(matches!(result, Err(ResolveError::UnknownEndpoint(e)) if e == "ghosts"));
    }

    #[test]
    fn test_container_carries_sentinel() {
        let container = HostContainer::new().with_sentinel(Sentinel::new(String::from("user-1")));
        let value = container.sentinel().and_then(|s| s.downcast_ref::<String>());
        assert_eq!(value.map(String::as_str), Some("user-1"));
    }
}
