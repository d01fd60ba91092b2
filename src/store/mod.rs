//! Store Module
//!
//! In-memory key-value storage with per-key ownership and LRU retention,
//! served by a single worker task.

mod actor;
mod entry;
mod lru;
pub mod requests;
#[allow(clippy::module_inception)]
mod store;


// Re-export public types
pub use actor::{StoreHandle, SHUTDOWN_GRACE};
pub use entry::Entry;
pub use lru::LruEntryList;
pub use requests::{shutdown_channel, ShutdownListener, ShutdownNotifier, StoreRequest};
pub use store::KvStore;
