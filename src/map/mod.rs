//! This module contains the concurrent hashmap facade and its two flavors.

mod coarse_map;
mod striped_map;

pub use coarse_map::CoarseMap;
pub use striped_map::StripedHashMap;

use std::borrow::Borrow;
use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hash, Hasher};

use crate::entry::Entry;
use crate::strategy::LockStrategy;
use crate::table::BucketTable;
use crate::INITIAL_BUCKETS;

/// The contract load generators and other clients program against.
pub trait ConcurrentMap {
    /// Key type for a HashMap implementation.
    type Key: Hash + Eq;
    /// Value type for a HashMap implementation.
    type Val;

    /// Emplaces a key-value pair into the map, overwriting the value of an
    /// existing pair with an equal key. Returns whether the pair was accepted,
    /// which is always the case for a present key.
    fn put(&self, key: Self::Key, value: Self::Val) -> bool;

    /// Get a copy of the value associated with a key, if it exists.
    fn get(&self, key: &Self::Key) -> Option<Self::Val>;

    /// Attempts to remove a key-value pair based on the provided key, returning
    /// whether a key-value pair was found and removed.
    fn remove(&self, key: &Self::Key) -> bool;

    /// Check whether the map contains a value mapped to the given key.
    fn contains(&self, key: &Self::Key) -> bool {
        self.get(key).is_some()
    }

    /// [`put`](ConcurrentMap::put) for callers whose key may be missing.
    /// A missing key is rejected without touching the map.
    fn put_opt(&self, key: Option<Self::Key>, value: Self::Val) -> bool {
        match key {
            Some(key) => self.put(key, value),
            None => false,
        }
    }

    /// [`get`](ConcurrentMap::get) for callers whose key may be missing.
    fn get_opt(&self, key: Option<&Self::Key>) -> Option<Self::Val> {
        key.and_then(|key| self.get(key))
    }

    /// [`remove`](ConcurrentMap::remove) for callers whose key may be missing.
    fn remove_opt(&self, key: Option<&Self::Key>) -> bool {
        key.map_or(false, |key| self.remove(key))
    }
}

/// A hash map made of a [`BucketTable`] and a [`LockStrategy`] deciding how
/// threads share it.
///
/// Every operation takes the strategy's guard for the key's hash, works on
/// the key's bucket, and drops the guard. A `put` that pushes the average
/// chain length to [`MAX_LOAD_FACTOR`](crate::MAX_LOAD_FACTOR) then asks the
/// strategy to double the table.
pub struct LockMap<K, V, L, S = RandomState> {
    table: BucketTable<K, V>,
    strategy: L,
    state: S,
}

impl<K, V, L> Default for LockMap<K, V, L, RandomState>
where
    K: Hash + Eq,
    L: LockStrategy,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, L> LockMap<K, V, L, RandomState>
where
    K: Hash + Eq,
    L: LockStrategy,
{
    pub fn new() -> Self {
        LockMap::with_hasher(RandomState::default())
    }
}

impl<K, V, L, S> LockMap<K, V, L, S>
where
    K: Hash + Eq,
    L: LockStrategy,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        LockMap {
            table: BucketTable::with_buckets(INITIAL_BUCKETS),
            strategy: L::for_buckets(INITIAL_BUCKETS),
            state: hasher,
        }
    }

    fn hash<Q: Hash + ?Sized>(&self, key: &Q) -> u64 {
        let mut hasher = self.state.build_hasher();
        key.hash(&mut hasher);
        hasher.finish()
    }

    /// Upserts `key`, returning the value it replaced.
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        let entry = Entry::new(self.hash(&key), key, value);
        let replaced = {
            let _guard = self.strategy.acquire(entry.key_hash());
            // SAFETY: `_guard` covers the entry's hash.
            unsafe { self.table.upsert(entry) }
        };

        if self.strategy.should_resize(&self.table) {
            self.strategy.resize(&self.table);
        }
        replaced.map(|entry| entry.into_parts().1)
    }

    pub fn put(&self, key: K, value: V) -> bool {
        self.insert(key, value);
        true
    }

    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.with_entry(key, |entry| entry.value().clone())
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.with_entry(key, |_| ()).is_some()
    }

    pub fn remove<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash(key);
        let _guard = self.strategy.acquire(hash);
        // SAFETY: `_guard` covers `hash`.
        unsafe { self.table.remove(hash, key) }.is_some()
    }

    fn with_entry<Q, F, R>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        F: FnOnce(&Entry<K, V>) -> R,
    {
        let hash = self.hash(key);
        let _guard = self.strategy.acquire(hash);
        // SAFETY: `_guard` covers `hash` and outlives the borrowed entry.
        unsafe { self.table.find(hash, key) }.map(f)
    }

    /// Copies every pair out of the map while holding the whole table, so the
    /// result is a consistent cut even with writers running.
    pub fn snapshot(&self) -> Vec<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        let _exclusive = self.strategy.acquire_all();
        // SAFETY: `_exclusive` shuts out every other guard.
        unsafe { self.table.entries() }
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Number of entries. Approximate while other threads are writing.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn bucket_count(&self) -> usize {
        self.table.bucket_count()
    }

    pub fn strategy(&self) -> &L {
        &self.strategy
    }
}

impl<K, V, L, S> ConcurrentMap for LockMap<K, V, L, S>
where
    K: Hash + Eq,
    V: Clone,
    L: LockStrategy,
    S: BuildHasher,
{
    type Key = K;
    type Val = V;

    fn put(&self, key: K, value: V) -> bool {
        LockMap::put(self, key, value)
    }

    fn get(&self, key: &K) -> Option<V> {
        LockMap::get(self, key)
    }

    fn remove(&self, key: &K) -> bool {
        LockMap::remove(self, key)
    }

    fn contains(&self, key: &K) -> bool {
        LockMap::contains(self, key)
    }
}
