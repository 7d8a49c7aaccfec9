use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A key-value pair stored in a bucket.
///
/// Equality and hashing only look at the key, so two entries with equal keys
/// are the same entry no matter what values they carry. Entries are never
/// mutated in place: an upsert swaps in a fresh entry.
pub struct Entry<K, V> {
    hash: u64,
    key: K,
    value: V,
}

impl<K, V> Entry<K, V> {
    /// `hash` must be the hash of `key` under the owning map's hasher.
    pub(crate) fn new(hash: u64, key: K, value: V) -> Self {
        Self { hash, key, value }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    /// The cached key hash. Resizing re-addresses entries with this instead
    /// of hashing the key again.
    pub fn key_hash(&self) -> u64 {
        self.hash
    }

    pub fn into_parts(self) -> (K, V) {
        (self.key, self.value)
    }

    /// Whether this entry is the one a lookup for `key` is probing for.
    pub(crate) fn matches<Q>(&self, hash: u64, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.hash == hash && self.key.borrow() == key
    }
}

impl<K: PartialEq, V> PartialEq for Entry<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<K: Eq, V> Eq for Entry<K, V> {}

impl<K: Hash, V> Hash for Entry<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Entry<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("key", &self.key)
            .field("value", &self.value)
            .finish()
    }
}
