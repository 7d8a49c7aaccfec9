use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

use lockmap::{
    CoarseMap, ConcurrentMap, GlobalLock, LockMap, LockStrategy, StripedHashMap, StripedLock,
    INITIAL_BUCKETS,
};
use rand::Rng;

fn concurrent_distinct_puts<L: LockStrategy + 'static>() {
    let map: Arc<LockMap<usize, usize, L>> = Arc::new(LockMap::new());
    let n_threads = 8;
    let per_thread = 2_000;
    let barrier = Arc::new(Barrier::new(n_threads));

    let mut handles = Vec::new();
    for t in 0..n_threads {
        let b = barrier.clone();
        let map = map.clone();
        handles.push(thread::spawn(move || {
            b.wait();
            for i in 0..per_thread {
                let k = t * per_thread + i;
                assert!(map.put(k, 0));
                assert!(map.put(k, k));
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    let n = n_threads * per_thread;
    assert_eq!(map.len(), n);
    assert!(map.bucket_count() > INITIAL_BUCKETS);
    for k in 0..n {
        assert_eq!(map.get(&k), Some(k));
    }
}

#[test]
fn concurrent_distinct_puts_coarse() {
    concurrent_distinct_puts::<GlobalLock>();
}

#[test]
fn concurrent_distinct_puts_striped() {
    concurrent_distinct_puts::<StripedLock>();
}

// Each thread owns a key range: it inserts all of it, then removes the odd
// keys, while the other threads are forcing resizes. Afterwards the map must
// hold exactly the even keys, each once.
fn resize_under_load_keeps_every_entry<L: LockStrategy + 'static>() {
    let map: Arc<LockMap<u64, u64, L>> = Arc::new(LockMap::new());
    let n_threads = 6;
    let per_thread = 3_000u64;
    let barrier = Arc::new(Barrier::new(n_threads));

    let mut handles = Vec::new();
    for t in 0..n_threads as u64 {
        let b = barrier.clone();
        let map = map.clone();
        handles.push(thread::spawn(move || {
            b.wait();
            let keys = t * per_thread..(t + 1) * per_thread;
            for k in keys.clone() {
                map.put(k, k * 10);
                assert_eq!(map.get(&k), Some(k * 10));
            }
            for k in keys.filter(|k| k % 2 == 1) {
                assert!(map.remove(&k));
                assert_eq!(map.get(&k), None);
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    let snapshot = map.snapshot();
    let expected: HashSet<u64> = (0..n_threads as u64 * per_thread)
        .filter(|k| k % 2 == 0)
        .collect();
    assert_eq!(snapshot.len(), expected.len());
    let seen: HashSet<u64> = snapshot.iter().map(|(k, _)| *k).collect();
    assert_eq!(seen, expected);
    assert!(snapshot.iter().all(|(k, v)| *v == k * 10));
    assert_eq!(map.len(), expected.len());
}

#[test]
fn resize_under_load_keeps_every_entry_coarse() {
    resize_under_load_keeps_every_entry::<GlobalLock>();
}

#[test]
fn resize_under_load_keeps_every_entry_striped() {
    resize_under_load_keeps_every_entry::<StripedLock>();
}

// Random put/get/remove traffic over a small shared key universe, the same
// mix a throughput driver would generate. Once every key is removed again the
// size counter must be back at zero.
fn random_mixed_workload<M>(map: Arc<M>)
where
    M: ConcurrentMap<Key = String, Val = String> + Send + Sync + 'static,
{
    let keys: Arc<Vec<String>> = Arc::new((1..=100).map(|i| format!("key{}", i)).collect());
    let n_threads = 8;
    let barrier = Arc::new(Barrier::new(n_threads));

    let mut handles = Vec::new();
    for _ in 0..n_threads {
        let b = barrier.clone();
        let map = map.clone();
        let keys = keys.clone();
        handles.push(thread::spawn(move || {
            let mut rng = rand::thread_rng();
            b.wait();
            for _ in 0..5_000 {
                let key = &keys[rng.gen_range(0..keys.len())];
                match rng.gen_range(0..3) {
                    0 => assert!(map.put(key.clone(), "value".to_string())),
                    1 => {
                        if let Some(value) = map.get(key) {
                            assert_eq!(value, "value");
                        }
                    }
                    _ => {
                        map.remove(key);
                    }
                }
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    for k in keys.iter() {
        map.remove(k);
    }
    assert!(keys.iter().all(|k| !map.contains(k)));
}

#[test]
fn random_mixed_workload_coarse() {
    let map: Arc<CoarseMap<String, String>> = Arc::new(CoarseMap::new());
    random_mixed_workload(map.clone());
    assert!(map.is_empty());
}

#[test]
fn random_mixed_workload_striped() {
    let map: Arc<StripedHashMap<String, String>> = Arc::new(StripedHashMap::new());
    random_mixed_workload(map.clone());
    assert!(map.is_empty());
}

// Threads hammering one key on one stripe; upserts must never leave a second
// entry behind.
#[test]
fn contended_key_has_single_entry() {
    let map: Arc<StripedHashMap<&'static str, usize>> = Arc::new(StripedHashMap::new());
    let n_threads = 4;
    let barrier = Arc::new(Barrier::new(n_threads));

    let handles: Vec<_> = (0..n_threads)
        .map(|t| {
            let b = barrier.clone();
            let map = map.clone();
            thread::spawn(move || {
                b.wait();
                for i in 0..1_000 {
                    map.put("hot", t * 1_000 + i);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(map.len(), 1);
    assert_eq!(map.snapshot().len(), 1);
    let last = map.get("hot").unwrap();
    assert_eq!(last % 1_000, 999);
}
