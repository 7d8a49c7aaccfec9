use std::collections::hash_map::RandomState;

use super::LockMap;
use crate::strategy::StripedLock;

/// A concurrent hashmap implemented with lock striping.
///
/// Keys whose hashes fall on different stripes never wait on each other.
/// Resizing takes every stripe.
pub type StripedHashMap<K, V, S = RandomState> = LockMap<K, V, StripedLock, S>;
