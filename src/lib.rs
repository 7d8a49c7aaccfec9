//! Concurrent hash maps sharing one bucket-table implementation under two
//! locking disciplines.
//!
//! [`CoarseMap`] serializes everything behind a single mutex.
//! [`StripedHashMap`] spreads keys over a fixed array of mutexes so
//! operations on different stripes run in parallel. Both are
//! [`LockMap`]s and differ only in their [`LockStrategy`].
//!
//! ```
//! use lockmap::StripedHashMap;
//!
//! let map = StripedHashMap::new();
//! assert!(map.put("hello", 1));
//! assert!(map.put("hello", 2));
//! assert_eq!(map.get("hello"), Some(2));
//! assert!(map.remove("hello"));
//! assert_eq!(map.get("hello"), None);
//! ```

mod cfg;
mod entry;
mod map;
mod strategy;
mod table;

pub use entry::Entry;
pub use map::{CoarseMap, ConcurrentMap, LockMap, StripedHashMap};
pub use strategy::{AllStripes, GlobalLock, LockStrategy, StripedLock};
pub use table::BucketTable;

/// Buckets in a freshly built table, and stripes in a [`StripedLock`].
pub const INITIAL_BUCKETS: usize = 100;

/// Average chain length at which a table doubles.
pub const MAX_LOAD_FACTOR: usize = 5;
