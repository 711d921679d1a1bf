//! In-memory LRU cache of deserialised objects.
//!
//! Keyed by hex id rather than the raw `ObjectId` bytes so that cache
//! behaviour is independent of the on-disk id representation. Capacity is
//! bounded by entry count; once insertion would exceed it, 25% of the
//! least-recently-used entries are evicted in a single pass rather than
//! one at a time, to amortise the cost of repeated evictions under
//! sustained cache pressure.

use lru::LruCache;
use std::num::NonZeroUsize;

use git_hash::ObjectId;
use git_object::Object;

/// Default capacity, in entries, used when a repository does not override it.
pub const DEFAULT_CAPACITY: usize = 4096;

/// LRU cache of deserialised objects, keyed by hex object id.
pub struct ObjectCache {
    entries: LruCache<String, Object>,
    capacity: usize,
}

impl ObjectCache {
    /// Create a cache with the given capacity (in entries).
    ///
    /// A capacity of 0 is treated as 1, since `LruCache` requires a
    /// non-zero bound.
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::new(1).unwrap());
        Self {
            entries: LruCache::new(cap),
            capacity: cap.get(),
        }
    }

    /// Look up an object by id, marking it most-recently-used on hit.
    pub fn get(&mut self, oid: &ObjectId) -> Option<&Object> {
        self.entries.get(&oid.to_hex())
    }

    /// Insert an object, evicting 25% of the least-recently-used entries
    /// in one pass if this insertion would exceed capacity.
    pub fn insert(&mut self, oid: ObjectId, obj: Object) {
        let key = oid.to_hex();
        if self.entries.len() >= self.capacity && !self.entries.contains(&key) {
            let evict_count = (self.capacity / 4).max(1);
            for _ in 0..evict_count {
                if self.entries.pop_lru().is_none() {
                    break;
                }
            }
        }
        self.entries.put(key, obj);
    }

    /// Number of entries currently cached.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git_object::ObjectType;

    fn make_blob(content: &[u8]) -> (ObjectId, Object) {
        let oid = git_hash::hasher::Hasher::hash_object("blob", content).unwrap();
        let obj = Object::parse_content(ObjectType::Blob, content).unwrap();
        (oid, obj)
    }

    #[test]
    fn insert_and_get() {
        let mut cache = ObjectCache::new(10);
        let (oid, obj) = make_blob(b"hello");
        cache.insert(oid, obj);
        assert!(cache.get(&oid).is_some());
    }

    #[test]
    fn miss_on_unknown_oid() {
        let mut cache = ObjectCache::new(10);
        let (oid, _) = make_blob(b"hello");
        assert!(cache.get(&oid).is_none());
    }

    #[test]
    fn bulk_eviction_on_overflow() {
        let mut cache = ObjectCache::new(4);
        let oids: Vec<ObjectId> = (0..4)
            .map(|i| {
                let (oid, obj) = make_blob(format!("item {i}").as_bytes());
                cache.insert(oid, obj);
                oid
            })
            .collect();
        assert_eq!(cache.len(), 4);

        // Fifth insert should trigger a bulk eviction of 25% (1 entry),
        // not just a single LRU pop.
        let (oid5, obj5) = make_blob(b"item 5");
        cache.insert(oid5, obj5);

        assert!(cache.get(&oid5).is_some());
        assert!(cache.get(&oids[0]).is_none(), "oldest entry should be evicted");
    }

    #[test]
    fn zero_capacity_is_treated_as_one() {
        let mut cache = ObjectCache::new(0);
        let (oid, obj) = make_blob(b"hello");
        cache.insert(oid, obj);
        assert_eq!(cache.len(), 1);
    }
}
