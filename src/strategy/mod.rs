//! Locking disciplines a [`LockMap`](crate::LockMap) can be built with.

mod global;
mod striped;

pub use global::GlobalLock;
pub use striped::{AllStripes, StripedLock};

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::cfg::trace;
use crate::table::BucketTable;

/// Decides which lock(s) guard which part of a [`BucketTable`].
///
/// A map asks its strategy for a guard covering a key's hash before touching
/// that key's bucket, and drops the guard (the "release") once it is done.
/// Resizing needs the whole table and goes through [`acquire_all`].
///
/// # Safety
///
/// Implementations must guarantee that:
///
/// * two guards returned by [`acquire`] for hashes that can land in the same
///   bucket are never held at the same time. Bucket counts are always the
///   initial count passed to [`for_buckets`] times a power of two.
/// * while the guard returned by [`acquire_all`] is held, no other guard
///   from either method exists.
///
/// [`acquire`]: LockStrategy::acquire
/// [`acquire_all`]: LockStrategy::acquire_all
/// [`for_buckets`]: LockStrategy::for_buckets
pub unsafe trait LockStrategy: Send + Sync {
    /// Held while operating on a single key.
    type Guard<'a>
    where
        Self: 'a;

    /// Held while operating on the whole table.
    type Exclusive<'a>
    where
        Self: 'a;

    /// Builds the locks for a table that starts out with `initial_buckets`
    /// buckets.
    fn for_buckets(initial_buckets: usize) -> Self;

    /// Blocks until the lock covering `hash` is available.
    fn acquire(&self, hash: u64) -> Self::Guard<'_>;

    /// Blocks until every lock is held.
    fn acquire_all(&self) -> Self::Exclusive<'_>;

    /// Lock-free resize trigger. May be stale under concurrent writers.
    fn should_resize<K, V>(&self, table: &BucketTable<K, V>) -> bool {
        table.over_threshold()
    }

    /// Doubles `table` under exclusive access.
    ///
    /// The threshold is checked again once every lock is held, so racing
    /// callers that all saw [`should_resize`](LockStrategy::should_resize)
    /// return `true` only grow the table once.
    fn resize<K, V>(&self, table: &BucketTable<K, V>) {
        let _exclusive = self.acquire_all();
        if !table.over_threshold() {
            trace!("skipping resize, table already has {} buckets", table.bucket_count());
            return;
        }
        // SAFETY: `_exclusive` shuts out every other guard until it drops.
        unsafe { table.grow() };
    }
}

/// Stripes and the global lock guard no data of their own, so a panic while
/// one is held cannot leave anything half-written behind it.
fn lock(mutex: &Mutex<()>) -> MutexGuard<'_, ()> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
