//! Entry Module
//!
//! A stored value together with its owner and access metadata.

use std::time::Instant;

use chrono::{DateTime, Utc};

// == Entry ==
/// A single stored key.
///
/// `reads`, `writes` and the last-touch time only move on counted accesses
/// (`read_value` / `write_value`). Snapshots taken for listing carry a
/// freshly computed `age_ms` and never alter the live entry.
#[derive(Debug, Clone)]
pub struct Entry {
    key: String,
    value: String,
    owner: String,
    reads: u64,
    writes: u64,
    last_touched: Instant,
    touched_at: DateTime<Utc>,
    age_ms: u64,
}

impl Entry {
    // == Constructor ==
    /// Creates an entry owned by `owner`. Creation counts as the first write.
    pub fn new(key: impl Into<String>, value: impl Into<String>, owner: impl Into<String>) -> Self {
        let mut entry = Self {
            key: key.into(),
            value: String::new(),
            owner: owner.into(),
            reads: 0,
            writes: 0,
            last_touched: Instant::now(),
            touched_at: Utc::now(),
            age_ms: 0,
        };
        entry.write_value(value);
        entry
    }

    // == Counted Access ==
    /// Returns the value, counting a read and refreshing the touch time.
    pub fn read_value(&mut self) -> String {
        self.reads += 1;
        self.touch();
        self.value.clone()
    }

    /// Replaces the value, counting a write. The owner never changes.
    pub fn write_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.writes += 1;
        self.touch();
    }

    // == Snapshot ==
    /// Inspection copy with `age_ms` computed from the last touch.
    pub fn snapshot(&self) -> Entry {
        let mut copy = self.clone();
        copy.age_ms = self.last_touched.elapsed().as_millis() as u64;
        copy
    }

    fn touch(&mut self) {
        self.last_touched = Instant::now();
        self.touched_at = Utc::now();
    }

    // == Accessors ==
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn reads(&self) -> u64 {
        self.reads
    }

    pub fn writes(&self) -> u64 {
        self.writes
    }

    /// Wall-clock time of the last counted access.
    pub fn touched_at(&self) -> DateTime<Utc> {
        self.touched_at
    }

    /// Milliseconds since the last counted access, as of the snapshot.
    /// Always 0 on a live entry.
    pub fn age_ms(&self) -> u64 {
        self.age_ms
    }

    /// Returns true if `identity` created this entry.
    pub fn is_owned_by(&self, identity: &str) -> bool {
        self.owner == identity
    }
}

impl std::fmt::Display for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "key: {} value: {} owner: {}", self.key, self.value, self.owner)
    }
}
