//! Owned KV - An in-memory key-value server with per-key ownership
//!
//! Keys belong to the identity that created them; only that owner or the
//! administrator may change or delete them. The store is bounded by an LRU
//! depth and every operation is serialized through a single worker task.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod server;
pub mod store;
pub mod tracer;
pub mod users;

pub use api::{create_router, AppState};
pub use config::Config;
pub use error::{Result, StoreError};
pub use store::{KvStore, StoreHandle};
pub use users::{UserDatabase, UserStorage};
