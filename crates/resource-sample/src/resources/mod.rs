//! # Resources
//!
//! Concrete resource definitions of the sample. Store-backed resources
//! implement [`StoreResource`](api_resource_loader::StoreResource); `Stats`
//! is computed and has no repository.

pub mod author;
pub mod order;
pub mod post;
pub mod stats;

pub use author::{Author, Comment};
pub use order::{Order, OrderItem};
pub use post::BlogPost;
pub use stats::{Stats, StatsTransformer};
