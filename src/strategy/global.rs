use std::sync::{Mutex, MutexGuard};

use super::{lock, LockStrategy};

/// Coarse-grained locking: one mutex serializes every operation on every key,
/// resizes included.
#[derive(Default)]
pub struct GlobalLock {
    lock: Mutex<()>,
}

// SAFETY: every guard is a guard of the same mutex.
unsafe impl LockStrategy for GlobalLock {
    type Guard<'a> = MutexGuard<'a, ()>
    where
        Self: 'a;
    type Exclusive<'a> = MutexGuard<'a, ()>
    where
        Self: 'a;

    fn for_buckets(_initial_buckets: usize) -> Self {
        Self::default()
    }

    fn acquire(&self, _hash: u64) -> Self::Guard<'_> {
        lock(&self.lock)
    }

    fn acquire_all(&self) -> Self::Exclusive<'_> {
        lock(&self.lock)
    }
}
