//! Bucketed map with one lock per bucket.
//!
//! Writers touching different buckets never contend. A key always lands in
//! bucket `key mod bucket_count`, so two updates to the same key serialize on
//! that bucket's lock.

use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};
use std::collections::BTreeMap;

/// Keys usable for bucket selection.
pub trait BucketKey: Copy + Ord {
    fn bucket_hash(&self) -> u64;
}

impl BucketKey for i32 {
    fn bucket_hash(&self) -> u64 {
        self.unsigned_abs() as u64
    }
}

impl BucketKey for u32 {
    fn bucket_hash(&self) -> u64 {
        *self as u64
    }
}

impl BucketKey for u64 {
    fn bucket_hash(&self) -> u64 {
        *self
    }
}

impl BucketKey for usize {
    fn bucket_hash(&self) -> u64 {
        *self as u64
    }
}

pub struct ConcurrentMap<K, V> {
    buckets: Vec<Mutex<BTreeMap<K, V>>>,
}

impl<K: BucketKey, V: Default> ConcurrentMap<K, V> {
    /// A zero bucket count is raised to one.
    pub fn new(bucket_count: usize) -> Self {
        let buckets = (0..bucket_count.max(1)).map(|_| Mutex::new(BTreeMap::new())).collect();
        Self { buckets }
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    fn bucket_of(&self, key: &K) -> usize {
        (key.bucket_hash() % self.buckets.len() as u64) as usize
    }

    /// Lock the bucket owning `key` and hand out its value, default-inserted
    /// when absent. The bucket stays locked until the guard drops.
    pub fn access(&self, key: K) -> MappedMutexGuard<'_, V> {
        let guard = self.buckets[self.bucket_of(&key)].lock();
        MutexGuard::map(guard, |bucket| bucket.entry(key).or_default())
    }

    /// Merge every bucket into one ordered map. Buckets are locked one at a time.
    pub fn build_ordinary_map(&self) -> BTreeMap<K, V>
    where
        V: Clone,
    {
        let mut result = BTreeMap::new();
        for bucket in &self.buckets {
            let guard = bucket.lock();
            result.extend(guard.iter().map(|(k, v)| (*k, v.clone())));
        }
        result
    }

    /// Consume the map, moving every entry into one ordered map.
    pub fn into_ordinary_map(self) -> BTreeMap<K, V> {
        let mut result = BTreeMap::new();
        for bucket in self.buckets {
            result.append(&mut bucket.into_inner());
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;

    #[test]
    fn access_inserts_default() {
        let map: ConcurrentMap<i32, f64> = ConcurrentMap::new(3);
        *map.access(5) += 1.5;
        *map.access(5) += 1.0;
        *map.access(2) += 4.0;
        let ordinary = map.build_ordinary_map();
        assert_eq!(ordinary.len(), 2);
        assert_eq!(ordinary[&5], 2.5);
        assert_eq!(ordinary[&2], 4.0);
    }

    #[test]
    fn zero_buckets_is_one() {
        let map: ConcurrentMap<u32, u32> = ConcurrentMap::new(0);
        assert_eq!(map.bucket_count(), 1);
        *map.access(9) += 1;
        assert_eq!(map.into_ordinary_map()[&9], 1);
    }

    #[test]
    fn drain_is_ordered_across_buckets() {
        let map: ConcurrentMap<u64, u64> = ConcurrentMap::new(4);
        for k in (0..20).rev() {
            *map.access(k) = k * 10;
        }
        let keys: Vec<u64> = map.into_ordinary_map().into_keys().collect();
        assert_eq!(keys, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn parallel_increments_are_not_lost() {
        let map: ConcurrentMap<usize, u64> = ConcurrentMap::new(7);
        (0..10_000usize).into_par_iter().for_each(|i| {
            *map.access(i % 100) += 1;
        });
        let ordinary = map.into_ordinary_map();
        assert_eq!(ordinary.len(), 100);
        assert!(ordinary.values().all(|&v| v == 100));
    }
}
