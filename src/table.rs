use std::borrow::Borrow;
use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::cfg::trace;
use crate::entry::Entry;
use crate::MAX_LOAD_FACTOR;

type Bucket<K, V> = UnsafeCell<Vec<Entry<K, V>>>;

/// The bucket array shared by every map flavor.
///
/// The table does no locking of its own. Every method that touches bucket
/// contents is `unsafe` and requires the caller to hold whatever lock its
/// [`LockStrategy`](crate::LockStrategy) hands out for the hash in question
/// (or the exclusive guard, for whole-table operations).
///
/// `size` and `bucket_count` are atomics so they can be read without any lock
/// for the resize trigger. Both are only written while the relevant lock is
/// held, so readers under that lock see exact values.
pub struct BucketTable<K, V> {
    buckets: UnsafeCell<Box<[Bucket<K, V>]>>,
    bucket_count: AtomicUsize,
    size: AtomicUsize,
}

// SAFETY: entries are only reached through the strategy's locks, which give
// a single thread access to a bucket at a time, same as `Mutex<T>`.
unsafe impl<K: Send, V: Send> Sync for BucketTable<K, V> {}

impl<K, V> BucketTable<K, V> {
    pub(crate) fn with_buckets(num_buckets: usize) -> Self {
        assert!(num_buckets > 0, "a bucket table needs at least one bucket");
        BucketTable {
            buckets: UnsafeCell::new(empty_buckets(num_buckets)),
            bucket_count: AtomicUsize::new(num_buckets),
            size: AtomicUsize::new(0),
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.size.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn bucket_count(&self) -> usize {
        self.bucket_count.load(Ordering::Relaxed)
    }

    /// Whether the average chain length has reached [`MAX_LOAD_FACTOR`].
    ///
    /// Without a lock this is only an estimate: concurrent writers may move
    /// either counter between the two loads.
    pub fn over_threshold(&self) -> bool {
        self.len() / self.bucket_count() >= MAX_LOAD_FACTOR
    }

    /// # Safety
    ///
    /// The caller must hold the lock covering `hash`.
    #[allow(clippy::mut_from_ref)]
    unsafe fn bucket_mut(&self, hash: u64) -> &mut Vec<Entry<K, V>> {
        let buckets = &*self.buckets.get();
        let index = (hash as usize) % buckets.len();
        &mut *buckets[index].get()
    }

    /// Stores `entry`, replacing an entry with an equal key if there is one.
    /// Returns the replaced entry.
    ///
    /// # Safety
    ///
    /// The caller must hold the lock covering `entry.key_hash()`.
    pub(crate) unsafe fn upsert(&self, entry: Entry<K, V>) -> Option<Entry<K, V>>
    where
        K: Eq,
    {
        let bucket = self.bucket_mut(entry.key_hash());
        match bucket.iter().position(|e| *e == entry) {
            Some(i) => Some(std::mem::replace(&mut bucket[i], entry)),
            None => {
                bucket.push(entry);
                self.size.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// # Safety
    ///
    /// The caller must hold the lock covering `hash` for as long as the
    /// returned reference is alive.
    pub(crate) unsafe fn find<Q>(&self, hash: u64, key: &Q) -> Option<&Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        let bucket = &*self.bucket_mut(hash);
        bucket.iter().find(|e| e.matches(hash, key))
    }

    /// # Safety
    ///
    /// The caller must hold the lock covering `hash`.
    pub(crate) unsafe fn remove<Q>(&self, hash: u64, key: &Q) -> Option<Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        let bucket = self.bucket_mut(hash);
        let i = bucket.iter().position(|e| e.matches(hash, key))?;
        let removed = bucket.remove(i);
        self.size.fetch_sub(1, Ordering::Relaxed);
        Some(removed)
    }

    /// Doubles the bucket array and moves every entry to its new bucket.
    ///
    /// # Safety
    ///
    /// The caller must have exclusive access to the whole table.
    pub(crate) unsafe fn grow(&self) {
        let buckets = &mut *self.buckets.get();
        let doubled = buckets.len() * 2;
        let mut grown = empty_buckets(doubled);

        for bucket in std::mem::take(buckets).into_vec() {
            for entry in bucket.into_inner() {
                let index = (entry.key_hash() as usize) % doubled;
                grown[index].get_mut().push(entry);
            }
        }

        *buckets = grown;
        self.bucket_count.store(doubled, Ordering::Relaxed);
        trace!("grew table to {} buckets holding {} entries", doubled, self.len());
    }

    /// Iterates over every entry.
    ///
    /// # Safety
    ///
    /// The caller must have exclusive access to the whole table for as long as
    /// the iterator is alive.
    pub(crate) unsafe fn entries(&self) -> impl Iterator<Item = &Entry<K, V>> + '_ {
        let buckets = &*self.buckets.get();
        buckets.iter().flat_map(|bucket| (*bucket.get()).iter())
    }
}

fn empty_buckets<K, V>(num_buckets: usize) -> Box<[Bucket<K, V>]> {
    (0..num_buckets).map(|_| UnsafeCell::new(Vec::new())).collect()
}
