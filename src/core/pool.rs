//! Object pools for buffers and item field sets
//!
//! Both pools sit on a lock-free `SegQueue` free list. Acquiring pops a
//! recycled object or allocates a new one; releasing resets the object and
//! pushes it back. The free list is capped and oversized buffers are dropped
//! instead of retained, so a burst of huge lines does not pin memory forever.
//!
//! Anything handed out is already empty. Once released, an object belongs to
//! the pool again and the previous owner has no handle left to touch it.

use super::buffer::{Buffer, DEFAULT_BUFFER_CAPACITY};
use super::item::Item;
use super::level::Level;
use super::metrics::PoolMetrics;
use crate::formatters::{Caller, Formatter};
use crossbeam_queue::SegQueue;
use std::sync::Arc;

/// Maximum idle buffers kept by default
pub const DEFAULT_MAX_IDLE: usize = 1024;

/// Buffers that grew beyond this are dropped on release
pub const DEFAULT_MAX_RETAINED_CAPACITY: usize = 64 * 1024;

#[derive(Debug)]
pub struct BufferPool {
    free: SegQueue<Buffer>,
    max_idle: usize,
    max_retained_capacity: usize,
    metrics: PoolMetrics,
}

impl BufferPool {
    #[must_use]
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_MAX_IDLE, DEFAULT_MAX_RETAINED_CAPACITY)
    }

    /// Pool keeping at most `max_idle` buffers, none larger than `max_retained_capacity`
    #[must_use]
    pub fn with_limits(max_idle: usize, max_retained_capacity: usize) -> Self {
        Self {
            free: SegQueue::new(),
            max_idle,
            max_retained_capacity,
            metrics: PoolMetrics::new(),
        }
    }

    /// Take an empty buffer
    pub fn get(&self) -> Buffer {
        match self.free.pop() {
            Some(mut buf) => {
                buf.reset();
                self.metrics.record_reused();
                buf
            }
            None => {
                self.metrics.record_allocated();
                Buffer::with_capacity(DEFAULT_BUFFER_CAPACITY)
            }
        }
    }

    /// Hand a buffer back
    pub fn put(&self, mut buf: Buffer) {
        if buf.capacity() > self.max_retained_capacity || self.free.len() >= self.max_idle {
            self.metrics.record_discarded();
            return;
        }
        buf.reset();
        self.free.push(buf);
        self.metrics.record_released();
    }

    /// Number of buffers currently waiting on the free list
    pub fn idle(&self) -> usize {
        self.free.len()
    }

    pub fn metrics(&self) -> &PoolMetrics {
        &self.metrics
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}

/// Pool of per-item field sets.
///
/// An [`Item`] itself lives on the caller's stack; what is worth recycling is
/// the vector holding one field buffer per formatter. Its buffers come from
/// (and go back to) the shared [`BufferPool`].
#[derive(Debug)]
pub struct ItemPool {
    free: SegQueue<Vec<Buffer>>,
    buffers: Arc<BufferPool>,
    max_idle: usize,
    metrics: PoolMetrics,
}

impl ItemPool {
    #[must_use]
    pub fn new(buffers: Arc<BufferPool>) -> Self {
        Self {
            free: SegQueue::new(),
            buffers,
            max_idle: DEFAULT_MAX_IDLE,
            metrics: PoolMetrics::new(),
        }
    }

    /// Start an item for one log statement
    pub fn get<'a>(
        &'a self,
        level: Level,
        prefix: &'a str,
        caller: Caller,
        formatters: &'a [Box<dyn Formatter>],
    ) -> Item<'a> {
        Item::enabled(self, formatters, level, prefix, caller)
    }

    pub fn buffers(&self) -> &Arc<BufferPool> {
        &self.buffers
    }

    pub fn metrics(&self) -> &PoolMetrics {
        &self.metrics
    }

    pub fn idle(&self) -> usize {
        self.free.len()
    }

    /// One empty buffer per formatter
    pub(crate) fn acquire_fields(&self, count: usize) -> Vec<Buffer> {
        let mut set = match self.free.pop() {
            Some(set) => {
                self.metrics.record_reused();
                set
            }
            None => {
                self.metrics.record_allocated();
                Vec::with_capacity(count)
            }
        };
        for _ in 0..count {
            set.push(self.buffers.get());
        }
        set
    }

    pub(crate) fn release_fields(&self, mut set: Vec<Buffer>) {
        for buf in set.drain(..) {
            self.buffers.put(buf);
        }
        if self.free.len() >= self.max_idle {
            self.metrics.record_discarded();
            return;
        }
        self.free.push(set);
        self.metrics.record_released();
    }
}
