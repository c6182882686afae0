// src/cache/mod.rs

pub mod lru;

#[cfg(test)]
mod tests;

pub use lru::LruCache;

/// A single operation in a recorded cache trace
#[derive(Debug, Clone)]
pub enum CacheOp<V> {
    Put { key: String, value: V },
    Get { key: String },
}

/// Replays a put/get trace against a fresh capacity-10 cache and returns the
/// hit percentage over the gets (0.0 when the trace contains no gets).
pub fn cache_hit_rate<V>(operations: &[CacheOp<V>]) -> f64
where
    V: Clone,
{
    let mut cache = LruCache::new(10).expect("capacity is non-zero");
    let mut hits = 0u64;
    let mut total_gets = 0u64;

    for op in operations {
        match op {
            CacheOp::Put { key, value } => {
                cache.put(key.clone(), value.clone());
            }
            CacheOp::Get { key } => {
                total_gets += 1;
                if cache.get(key).is_some() {
                    hits += 1;
                }
            }
        }
    }

    if total_gets == 0 {
        return 0.0;
    }

    (hits as f64 / total_gets as f64) * 100.0
}
