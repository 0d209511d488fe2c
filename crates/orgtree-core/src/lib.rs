//! Orgtree Core — domain models, error types and the [`TreeStore`]
//! contract shared by every backend.
//!
//! [`TreeStore`]: repository::TreeStore

pub mod error;
pub mod models;
pub mod repository;

pub use error::{TreeError, TreeResult};
pub use repository::TreeStore;
