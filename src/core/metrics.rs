//! Counters for pool and writer observability
//!
//! Pools count fresh allocations separately from reuses so tests and
//! operators can check that steady-state logging recycles its buffers.
//! Queued writers count what their worker wrote, what failed and what was
//! abandoned when a drain timed out.

use std::sync::atomic::{AtomicU64, Ordering};

/// Allocation and reuse counters for a pool
///
/// # Example
///
/// ```
/// use nlog::PoolMetrics;
///
/// let metrics = PoolMetrics::new();
/// metrics.record_allocated();
/// metrics.record_reused();
/// metrics.record_reused();
///
/// assert_eq!(metrics.allocated(), 1);
/// assert_eq!(metrics.reused(), 2);
/// assert!(metrics.reuse_rate() > 60.0);
/// ```
#[derive(Debug)]
pub struct PoolMetrics {
    /// Objects created because the free list was empty
    allocated: AtomicU64,

    /// Objects served from the free list
    reused: AtomicU64,

    /// Objects returned to the free list
    released: AtomicU64,

    /// Objects dropped on return (oversized or free list full)
    discarded: AtomicU64,
}

impl PoolMetrics {
    pub const fn new() -> Self {
        Self {
            allocated: AtomicU64::new(0),
            reused: AtomicU64::new(0),
            released: AtomicU64::new(0),
            discarded: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn allocated(&self) -> u64 {
        self.allocated.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn reused(&self) -> u64 {
        self.reused.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn released(&self) -> u64 {
        self.released.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn discarded(&self) -> u64 {
        self.discarded.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_allocated(&self) -> u64 {
        self.allocated.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_reused(&self) -> u64 {
        self.reused.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_released(&self) -> u64 {
        self.released.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_discarded(&self) -> u64 {
        self.discarded.fetch_add(1, Ordering::Relaxed)
    }

    /// Share of acquisitions served from the free list (0.0 - 100.0)
    ///
    /// Returns 0.0 if nothing has been acquired yet.
    pub fn reuse_rate(&self) -> f64 {
        let reused = self.reused() as f64;
        let total = self.allocated() as f64 + reused;
        if total == 0.0 {
            0.0
        } else {
            (reused / total) * 100.0
        }
    }

    pub fn reset(&self) {
        self.allocated.store(0, Ordering::Relaxed);
        self.reused.store(0, Ordering::Relaxed);
        self.released.store(0, Ordering::Relaxed);
        self.discarded.store(0, Ordering::Relaxed);
    }
}

impl Default for PoolMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for PoolMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            allocated: AtomicU64::new(self.allocated()),
            reused: AtomicU64::new(self.reused()),
            released: AtomicU64::new(self.released()),
            discarded: AtomicU64::new(self.discarded()),
        }
    }
}

/// Throughput counters for a queued writer
#[derive(Debug)]
pub struct WriterMetrics {
    /// Lines accepted into the queue
    enqueued: AtomicU64,

    /// Lines the worker handed to the sink successfully
    written: AtomicU64,

    /// Lines the sink rejected
    failed: AtomicU64,

    /// Lines left in the queue when the drain deadline passed
    abandoned: AtomicU64,
}

impl WriterMetrics {
    pub const fn new() -> Self {
        Self {
            enqueued: AtomicU64::new(0),
            written: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            abandoned: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn enqueued(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn written(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn abandoned(&self) -> u64 {
        self.abandoned.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_enqueued(&self) -> u64 {
        self.enqueued.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_written(&self) -> u64 {
        self.written.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_failed(&self) -> u64 {
        self.failed.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_abandoned(&self, count: u64) -> u64 {
        self.abandoned.fetch_add(count, Ordering::Relaxed)
    }
}

impl Default for WriterMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_metrics_new() {
        let metrics = PoolMetrics::new();
        assert_eq!(metrics.allocated(), 0);
        assert_eq!(metrics.reused(), 0);
        assert_eq!(metrics.released(), 0);
        assert_eq!(metrics.discarded(), 0);
        assert_eq!(metrics.reuse_rate(), 0.0);
    }

    #[test]
    fn test_pool_metrics_record_returns_previous() {
        let metrics = PoolMetrics::new();
        assert_eq!(metrics.record_allocated(), 0);
        assert_eq!(metrics.record_allocated(), 1);
        assert_eq!(metrics.allocated(), 2);
    }

    #[test]
    fn test_reuse_rate() {
        let metrics = PoolMetrics::new();
        metrics.record_allocated();
        for _ in 0..9 {
            metrics.record_reused();
        }
        let rate = metrics.reuse_rate();
        assert!((rate - 90.0).abs() < 1e-9, "Reuse rate was {}", rate);
    }

    #[test]
    fn test_pool_metrics_snapshot_and_reset() {
        let metrics = PoolMetrics::new();
        metrics.record_released();
        metrics.record_discarded();

        let snapshot = metrics.clone();
        metrics.reset();

        assert_eq!(snapshot.released(), 1);
        assert_eq!(snapshot.discarded(), 1);
        assert_eq!(metrics.released(), 0);
    }

    #[test]
    fn test_writer_metrics() {
        let metrics = WriterMetrics::new();
        metrics.record_enqueued();
        metrics.record_enqueued();
        metrics.record_written();
        metrics.record_failed();
        metrics.record_abandoned(3);

        assert_eq!(metrics.enqueued(), 2);
        assert_eq!(metrics.written(), 1);
        assert_eq!(metrics.failed(), 1);
        assert_eq!(metrics.abandoned(), 3);
    }
}
