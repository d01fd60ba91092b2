//! LRU Entry List Module
//!
//! Bounded key-value storage ordered by recency of access.

use std::collections::HashMap;

use crate::error::{Result, StoreError};
use crate::store::Entry;
use crate::tracer::SharedTracer;

// == Node ==
/// A slot in the recency list. `prev` points towards the most recent end,
/// `next` towards the least recent end.
#[derive(Debug)]
struct Node {
    entry: Entry,
    prev: Option<usize>,
    next: Option<usize>,
}

// == LRU Entry List ==
/// Key lookup plus recency ordering, both O(1).
///
/// Entries live in a slab of nodes linked into a doubly linked list:
/// - Head = Most recently touched
/// - Tail = Least recently touched
///
/// The index maps every key to its slot, so `index.len()` always equals the
/// number of linked nodes. With `depth > 0`, insertion evicts from the tail
/// until the list holds at most `depth` entries. Nothing else evicts.
pub struct LruEntryList {
    index: HashMap<String, usize>,
    slots: Vec<Option<Node>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    depth: usize,
    tracer: SharedTracer,
}

impl LruEntryList {
    // == Constructor ==
    /// Creates an empty list. `depth == 0` means unbounded.
    pub fn new(tracer: SharedTracer, depth: usize) -> Self {
        Self {
            index: HashMap::new(),
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            depth,
            tracer,
        }
    }

    // == Add Entry ==
    /// Inserts a fresh entry at the most recent end, replacing any entry
    /// already stored under `key`.
    ///
    /// Returns the keys evicted to bring the list back within `depth`.
    pub fn add_entry(&mut self, key: &str, value: &str, owner: &str) -> Vec<String> {
        if let Some(idx) = self.index.remove(key) {
            self.release(idx);
        }

        let idx = self.push_front(Entry::new(key, value, owner));
        self.index.insert(key.to_string(), idx);
        self.tracer.log_info(&format!("Key {} added", key));

        let mut evicted = Vec::new();
        if self.depth == 0 {
            return evicted;
        }

        while self.index.len() > self.depth {
            let Some(last) = self.tail else { break };
            let entry = self.release(last);
            self.index.remove(entry.key());
            self.tracer.log_info(&format!("Key {} dropped", entry.key()));
            evicted.push(entry.key().to_string());
        }

        evicted
    }

    // == Update Entry ==
    /// Writes a new value and moves the key to the most recent end.
    pub fn update_entry(&mut self, key: &str, value: &str) -> Result<()> {
        let idx = self.slot_of(key)?;
        self.node_mut(idx).entry.write_value(value);
        self.move_to_front(idx);

        self.tracer.log_info(&format!("Key {} updated", key));
        Ok(())
    }

    // == Read Entry ==
    /// Counted read; moves the key to the most recent end.
    pub fn read_entry(&mut self, key: &str) -> Result<String> {
        let idx = self.slot_of(key)?;
        let value = self.node_mut(idx).entry.read_value();
        self.move_to_front(idx);

        self.tracer.log_info(&format!("Key {} accessed", key));
        Ok(value)
    }

    // == Delete Entry ==
    /// Removes the key from both the index and the recency list.
    pub fn delete_entry(&mut self, key: &str) -> Result<()> {
        let idx = self.slot_of(key)?;
        self.index.remove(key);
        self.release(idx);

        self.tracer.log_info(&format!("Key {} deleted", key));
        Ok(())
    }

    // == Find Entry ==
    /// Pure lookup: no counters, no reordering.
    pub fn find_entry(&self, key: &str) -> Result<&Entry> {
        let idx = self.slot_of(key)?;
        Ok(&self.node(idx).entry)
    }

    // == List All ==
    /// Snapshots of every entry, least recently touched first.
    pub fn list_all(&self) -> Vec<Entry> {
        let mut entries = Vec::with_capacity(self.index.len());
        let mut cursor = self.tail;
        while let Some(idx) = cursor {
            let node = self.node(idx);
            entries.push(node.entry.snapshot());
            cursor = node.prev;
        }
        entries
    }

    // == Length ==
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Configured maximum entry count (0 = unbounded).
    pub fn depth(&self) -> usize {
        self.depth
    }

    // == Slab Internals ==
    fn slot_of(&self, key: &str) -> Result<usize> {
        match self.index.get(key) {
            Some(idx) => Ok(*idx),
            None => {
                self.tracer.log_error(&format!("Key {} not found", key));
                Err(StoreError::KeyNotFound(key.to_string()))
            }
        }
    }

    fn node(&self, idx: usize) -> &Node {
        self.slots[idx]
            .as_ref()
            .expect("index points at an occupied slot")
    }

    fn node_mut(&mut self, idx: usize) -> &mut Node {
        self.slots[idx]
            .as_mut()
            .expect("index points at an occupied slot")
    }

    fn push_front(&mut self, entry: Entry) -> usize {
        let node = Node {
            entry,
            prev: None,
            next: None,
        };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                idx
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };
        self.link_front(idx);
        idx
    }

    fn link_front(&mut self, idx: usize) {
        let old_head = self.head;
        {
            let node = self.node_mut(idx);
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(h) => self.node_mut(h).prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = {
            let node = self.node(idx);
            (node.prev, node.next)
        };
        match prev {
            Some(p) => self.node_mut(p).next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.node_mut(n).prev = prev,
            None => self.tail = prev,
        }
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }
        self.unlink(idx);
        self.link_front(idx);
    }

    /// Unlinks the slot and returns its entry. The caller fixes the index.
    fn release(&mut self, idx: usize) -> Entry {
        self.unlink(idx);
        self.free.push(idx);
        self.slots[idx]
            .take()
            .expect("index points at an occupied slot")
            .entry
    }
}

impl std::fmt::Debug for LruEntryList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LruEntryList")
            .field("len", &self.index.len())
            .field("depth", &self.depth)
            .finish()
    }
}
