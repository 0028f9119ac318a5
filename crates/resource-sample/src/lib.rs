//! # Resource Sample
//!
//! A small blog API declared with `api_resource_loader`.
//!
//! - **[resources]**: resource declarations (`BlogPost`, `Author`, `Comment`,
//!   `Order`, `OrderItem`, `Stats`).
//! - **[decorators]**: `Audited` (store) and `Publishable` (schema).
//! - **[listeners]**: `Slugger`, registered by name.
//! - **[lifecycle]**: [`BlogSystem`](lifecycle::BlogSystem), which starts the
//!   store and registers everything with the host.

pub mod decorators;
pub mod lifecycle;
pub mod listeners;
pub mod resources;
