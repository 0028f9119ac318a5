#![doc(html_logo_url = "https://www.rust-lang.org/logos/rust-logo-128x128.png")]
#![doc(html_favicon_url = "https://www.rust-lang.org/favicon.ico")]
//! # API Resource Loader
//!
//! > **Declarative API resources, resolved once and wired consistently.**
//!
//! An API author describes a resource by implementing [`Resource`]: its
//! configuration, schema fields, and whichever collaborators differ from
//! convention. The engine resolves that description into a wired
//! [`ApiResource`]: schema, repository, transformer, relations and listener
//! bindings.
//!
//! ## 🏗️ Design
//!
//! ### Convention first, override anywhere
//!
//! Every artifact resolves through ordered tiers; the first hit wins and a
//! miss simply selects the next tier:
//!
//! - **Schema**: schema factory, then the resource's `schema` hook plus
//!   decorators.
//! - **Repository**: named [`Registry`] entry, then the resource's
//!   `repository` hook, then (store-backed only) a [`StoreRepository`] over
//!   the derived model. A resource without one is valid.
//! - **Transformer**: named registry entry, then the `transformer` hook,
//!   then [`IdentityTransformer`].
//! - **Relations**: explicit binder, then a `relation_binder` override keyed
//!   like `belongsToAuthor`, then the convention for the relation kind.
//!
//! ### Resolved at most once
//!
//! Each definition owns a [`ResolvedCache`]. An artifact moves from vacant to
//! resolving to ready and never back, so asking twice returns the identical
//! `Arc`. Concurrent callers wait for the first; a resolver that re-enters
//! its own slot gets [`ResolveError::Reentrant`].
//!
//! ### Decorators
//!
//! A [`Decorator`] edits the configuration at construction, then the schema
//! and (for store decorators) the derived table during resolution, always in
//! declaration order.
//!
//! ### Store-backed resources
//!
//! A [`StoreResource`] is backed by the reference store in [`store`], an
//! actor owning every table. Its [`StoreDefinition`] derives a [`Model`]
//! from the declared schema, attaches timestamp, soft-delete and user
//! [`Listener`]s in that order, and rebuilds the final schema from the
//! model's table.
//!
//! ## 🚀 Quick Start
//!
//! ```rust
//! use api_resource_loader::{Definition, Resource, ResourceConfigBuilder, ResourceDefinition, Schema};
//!
//! struct BlogPost;
//!
//! impl Resource for BlogPost {
//!     fn configure(&self, config: ResourceConfigBuilder) -> ResourceConfigBuilder {
//!         config.belongs_to("author").except(["draft_notes"])
//!     }
//!
//!     fn schema(&self, schema: &mut Schema) {
//!         schema.increments("id").primary();
//!         schema.string("title");
//!         schema.text("draft_notes");
//!     }
//! }
//!
//! let definition = ResourceDefinition::new(BlogPost);
//! assert_eq!(definition.endpoint(), "blog-posts");
//!
//! let resource = definition.make(None).unwrap();
//! assert_eq!(resource.fields(), ["id", "title"]);
//! assert!(resource.repository().is_none());
//!
//! let author = resource.relations()[0].binding().unwrap();
//! assert_eq!(author.target.as_deref(), Some("authors"));
//! ```
//!
//! ## 👩‍💻 Modules
//!
//! - [`definition`] / [`store_backed`]: the resolution engine.
//! - [`config`], [`decorator`], [`relation`], [`listener`]: declaration parts.
//! - [`factory`]: collaborators supplied by the loader.
//! - [`lifecycle`]: loader, host boundary and tracing setup.
//! - [`store`], [`model`], [`table`], [`record`]: the reference store.
//! - [`mock`]: a store stand-in for tests.

pub mod cache;
pub mod config;
pub mod convention;
pub mod decorator;
pub mod definition;
pub mod error;
pub mod factory;
pub mod lifecycle;
pub mod listener;
pub mod mock;
pub mod model;
pub mod pluralize;
pub mod record;
pub mod relation;
pub mod repository;
pub mod resource;
pub mod schema;
pub mod store;
pub mod store_backed;
pub mod table;
pub mod transformer;

// Re-export core types for convenience
pub use cache::{Artifact, ResolvedCache};
pub use config::{ResourceConfig, ResourceConfigBuilder};
pub use decorator::{Decorator, DefinitionDecorator, ResourceDecorator, StoreDecorator};
pub use definition::{Definition, Resource, ResourceDefinition};
pub use error::{ResolveError, ResolveResult, StoreError};
pub use factory::{Collaborators, ModelCatalog, ModelFactory, Registry, SchemaCatalog, SchemaFactory};
pub use lifecycle::{Api, BuildFn, HostContainer, HostRegistrar, Loader, RequestContext};
pub use listener::{HandleSoftDeletes, HandleTimestamps, Listener, ListenerRef, ListenerRegistry};
pub use model::{Event, Model, ModelEvent};
pub use record::{Attributes, Query, Record};
pub use relation::{Binder, RelationBinding, RelationBuilder, RelationKind};
pub use repository::{Repository, Sentinel, SentinelAware, StoreRepository};
pub use resource::{ApiResource, ResourceDescriptor, ResourceShape};
pub use schema::Schema;
pub use store::Database;
pub use store_backed::{StoreDefinition, StoreResource};
pub use table::{ColumnType, Table};
pub use transformer::{IdentityTransformer, Transformer};
