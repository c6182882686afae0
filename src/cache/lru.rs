// src/cache/lru.rs

use std::collections::HashMap;

use crate::error::{PipelineError, Result};

/// Sentinel index marking the end of the recency list
const NIL: usize = usize::MAX;

/// A node in the arena-backed recency list
#[derive(Debug)]
struct Node<V> {
    key: String,
    value: V,
    prev: usize,
    next: usize,
}

/// Fixed-capacity key/value store with least-recently-used eviction.
///
/// Entries live in a slab (`nodes`) threaded into a doubly linked list by
/// index, with a hash map giving O(1) lookup. `head` is the most recently
/// used entry, `tail` the eviction candidate. Touching an entry through
/// [`get`](Self::get) or [`put`](Self::put) moves it to the head;
/// [`contains`](Self::contains) deliberately does not.
#[derive(Debug)]
pub struct LruCache<V> {
    map: HashMap<String, usize>,
    nodes: Vec<Node<V>>,
    free: Vec<usize>,
    head: usize,
    tail: usize,
    capacity: usize,
}

impl<V> LruCache<V> {
    /// Creates a cache holding at most `capacity` entries.
    ///
    /// A capacity of zero is rejected rather than silently evicting every
    /// insert.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(PipelineError::Config(
                "cache capacity must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            map: HashMap::with_capacity(capacity),
            nodes: Vec::with_capacity(capacity),
            free: Vec::new(),
            head: NIL,
            tail: NIL,
            capacity,
        })
    }

    /// Returns the stored value and marks the entry most-recently-used.
    /// A miss has no side effect.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        let idx = *self.map.get(key)?;
        self.promote(idx);
        Some(&self.nodes[idx].value)
    }

    /// Inserts or overwrites an entry, leaving it most-recently-used.
    ///
    /// Overwriting an existing key never evicts any other key. Inserting a
    /// new key at capacity evicts the least-recently-used entry first.
    /// Returns the evicted key, if any.
    pub fn put(&mut self, key: String, value: V) -> Option<String> {
        if let Some(&idx) = self.map.get(&key) {
            self.nodes[idx].value = value;
            self.promote(idx);
            return None;
        }

        let evicted = if self.map.len() >= self.capacity {
            self.evict_lru()
        } else {
            None
        };

        let idx = self.alloc(key.clone(), value);
        self.push_front(idx);
        self.map.insert(key, idx);
        evicted
    }

    /// Membership check without touching recency order.
    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// Current entry count, always `<= capacity`.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Removes and returns the least-recently-used key.
    fn evict_lru(&mut self) -> Option<String> {
        let idx = self.tail;
        if idx == NIL {
            return None;
        }

        self.detach(idx);
        let key = std::mem::take(&mut self.nodes[idx].key);
        self.map.remove(&key);
        self.free.push(idx);
        Some(key)
    }

    /// Moves an attached node to the head of the recency list.
    fn promote(&mut self, idx: usize) {
        if self.head == idx {
            return;
        }
        self.detach(idx);
        self.push_front(idx);
    }

    /// Unlinks a node from the recency list, fixing head/tail.
    fn detach(&mut self, idx: usize) {
        let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);

        if prev != NIL {
            self.nodes[prev].next = next;
        } else {
            self.head = next;
        }

        if next != NIL {
            self.nodes[next].prev = prev;
        } else {
            self.tail = prev;
        }
    }

    /// Links a detached node in as the most-recently-used entry.
    fn push_front(&mut self, idx: usize) {
        self.nodes[idx].prev = NIL;
        self.nodes[idx].next = self.head;

        if self.head != NIL {
            self.nodes[self.head].prev = idx;
        }
        self.head = idx;

        if self.tail == NIL {
            self.tail = idx;
        }
    }

    /// Claims a slab slot for a new detached node.
    fn alloc(&mut self, key: String, value: V) -> usize {
        let node = Node {
            key,
            value,
            prev: NIL,
            next: NIL,
        };

        match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = node;
                idx
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }
}
