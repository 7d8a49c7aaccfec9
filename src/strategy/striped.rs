use std::sync::{Mutex, MutexGuard};

use crossbeam::utils::CachePadded;

use super::{lock, LockStrategy};

/// Lock striping: a fixed array of mutexes, one per hash residue.
///
/// The stripe count is fixed at the table's initial bucket count and never
/// changes, while the bucket array keeps doubling. Because the bucket count
/// stays a multiple of the stripe count, all entries of one bucket share a
/// stripe, so holding that stripe is enough to touch the bucket.
pub struct StripedLock {
    stripes: Box<[CachePadded<Mutex<()>>]>,
}

impl StripedLock {
    pub fn stripe_count(&self) -> usize {
        self.stripes.len()
    }

    /// Index of the stripe guarding `hash`.
    pub fn stripe_for(&self, hash: u64) -> usize {
        (hash as usize) % self.stripes.len()
    }
}

/// Every stripe of a [`StripedLock`], taken in ascending order.
///
/// Dropping it releases them all.
pub struct AllStripes<'a> {
    _guards: Vec<MutexGuard<'a, ()>>,
}

// SAFETY: a bucket index and a stripe index are the same hash modulo the
// bucket count and stripe count, and the stripe count divides every bucket
// count the table can reach. So one bucket maps to exactly one stripe.
// `acquire_all` holds every stripe.
unsafe impl LockStrategy for StripedLock {
    type Guard<'a> = MutexGuard<'a, ()>
    where
        Self: 'a;
    type Exclusive<'a> = AllStripes<'a>
    where
        Self: 'a;

    fn for_buckets(initial_buckets: usize) -> Self {
        assert!(initial_buckets > 0, "a striped lock needs at least one stripe");
        let stripes = (0..initial_buckets)
            .map(|_| CachePadded::new(Mutex::new(())))
            .collect();
        StripedLock { stripes }
    }

    fn acquire(&self, hash: u64) -> Self::Guard<'_> {
        lock(&self.stripes[self.stripe_for(hash)])
    }

    // Only whole-table operations hold more than one stripe, and they all
    // walk the stripes in ascending order, so two of them can't deadlock.
    fn acquire_all(&self) -> Self::Exclusive<'_> {
        let guards = self.stripes.iter().map(|stripe| lock(stripe)).collect();
        AllStripes { _guards: guards }
    }
}
