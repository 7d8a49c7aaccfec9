use std::collections::hash_map::RandomState;

use super::LockMap;
use crate::strategy::GlobalLock;

/// A concurrent hashmap implemented with coarse-grained locking.
pub type CoarseMap<K, V, S = RandomState> = LockMap<K, V, GlobalLock, S>;
