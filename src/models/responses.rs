//! Response DTOs for the key-value server API
//!
//! Defines the structure of outgoing JSON bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::Entry;

/// Listing of a single key (GET /list/ and GET /list/:key)
///
/// The stored value is deliberately absent: listings expose metadata only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryResponse {
    /// The key
    pub key: String,
    /// Identity that created the key
    pub owner: String,
    /// Counted reads so far
    pub reads: u64,
    /// Writes so far, creation included
    pub writes: u64,
    /// Milliseconds since the last read or write
    pub age: u64,
    /// Time of the last read or write
    pub last_touched: DateTime<Utc>,
}

impl From<&Entry> for EntryResponse {
    fn from(entry: &Entry) -> Self {
        Self {
            key: entry.key().to_string(),
            owner: entry.owner().to_string(),
            reads: entry.reads(),
            writes: entry.writes(),
            age: entry.age_ms(),
            last_touched: entry.touched_at(),
        }
    }
}

impl From<Entry> for EntryResponse {
    fn from(entry: Entry) -> Self {
        Self::from(&entry)
    }
}
