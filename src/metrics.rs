//! Operational counters
//!
//! Counters live in an explicit object shared by `Arc` between the fetcher,
//! the cache and the analyzer. Updates are relaxed atomics; readers take a
//! point-in-time `MetricsSnapshot`.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct XrayMetrics {
    api_calls: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    cache_read_errors: AtomicU64,
    cache_write_errors: AtomicU64,
    errors: AtomicU64,
    fallbacks: AtomicU64,
}

impl XrayMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// An outbound provider call was attempted
    #[inline]
    pub fn record_api_call(&self) {
        self.api_calls.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_cache_read_error(&self) {
        self.cache_read_errors.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_cache_write_error(&self) {
        self.cache_write_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Timeout or provider failure, including a failed timelock expansion
    #[inline]
    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_fallback(&self) {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            api_calls: self.api_calls.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            cache_read_errors: self.cache_read_errors.load(Ordering::Relaxed),
            cache_write_errors: self.cache_write_errors.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            fallbacks: self.fallbacks.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub api_calls: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub cache_read_errors: u64,
    pub cache_write_errors: u64,
    pub errors: u64,
    pub fallbacks: u64,
}

impl MetricsSnapshot {
    /// Fraction of cache lookups served from cache (0.0 to 1.0)
    pub fn hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }
}
