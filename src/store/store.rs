//! KV Store Module
//!
//! Ownership policy layered over the LRU entry list. This type is not
//! thread-safe on purpose: it is owned by the store actor's worker and only
//! ever touched from there.

use std::sync::Arc;

use crate::error::{Result, StoreError};
use crate::store::{Entry, LruEntryList};
use crate::tracer::SharedTracer;
use crate::users::UserDatabase;

// == KV Store ==
pub struct KvStore {
    entries: LruEntryList,
    users: Arc<dyn UserDatabase>,
    tracer: SharedTracer,
}

impl KvStore {
    // == Constructor ==
    /// Creates a store bounded to `depth` entries (0 = unbounded).
    pub fn new(tracer: SharedTracer, users: Arc<dyn UserDatabase>, depth: usize) -> Self {
        Self {
            entries: LruEntryList::new(tracer.clone(), depth),
            users,
            tracer,
        }
    }

    // == Put ==
    /// Creates the key for `owner`, or updates it if `owner` owns it or is
    /// an administrator. The owner of an existing key never changes.
    pub fn put(&mut self, key: &str, value: &str, owner: &str) -> Result<()> {
        require_key(key)?;

        let authorized = match self.entries.find_entry(key) {
            Err(_) => {
                self.entries.add_entry(key, value, owner);
                return Ok(());
            }
            Ok(entry) => self.may_mutate(entry, owner),
        };

        if !authorized {
            self.tracer
                .log_error(&format!("User {} cannot update key {}", owner, key));
            return Err(StoreError::UnauthorizedOwner(owner.to_string()));
        }
        self.entries.update_entry(key, value)
    }

    // == Get ==
    /// Counted read.
    pub fn get(&mut self, key: &str) -> Result<String> {
        require_key(key)?;
        self.entries.read_entry(key)
    }

    // == List ==
    /// Uncounted inspection of a single key.
    pub fn list(&self, key: &str) -> Result<Entry> {
        require_key(key)?;
        self.entries.find_entry(key).map(Entry::snapshot)
    }

    // == List All ==
    /// Snapshots of every key, least recently touched first.
    pub fn list_all(&self) -> Vec<Entry> {
        self.entries.list_all()
    }

    // == Delete ==
    /// Removes the key if `owner` owns it or is an administrator.
    pub fn delete(&mut self, key: &str, owner: &str) -> Result<()> {
        require_key(key)?;

        let entry = self.entries.find_entry(key)?;
        if !self.may_mutate(entry, owner) {
            self.tracer
                .log_error(&format!("User {} cannot delete key {}", owner, key));
            return Err(StoreError::UnauthorizedOwner(owner.to_string()));
        }
        self.entries.delete_entry(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn may_mutate(&self, entry: &Entry, identity: &str) -> bool {
        entry.is_owned_by(identity) || self.users.is_admin(identity)
    }
}

fn require_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(StoreError::KeyNotSpecified);
    }
    Ok(())
}
