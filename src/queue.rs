//! The unbounded, multi-producer check-in queue.
//!
//! Many producer threads push; the coordinator is the sole consumer and
//! polls it non-blockingly. Backed by `crossbeam::queue::SegQueue`, the
//! unbounded lock-free MPMC queue — the unbounded sibling of the
//! `ArrayQueue` this codebase's own `ShadowLogger` uses for its (bounded,
//! backpressured) record queue. This facility's queue must never apply
//! backpressure, so the unbounded queue is the fitting primitive here.

use crossbeam::queue::SegQueue;

use crate::writer::Writer;

#[derive(Default)]
pub struct CheckinQueue {
    inner: SegQueue<Writer>,
}

impl CheckinQueue {
    pub fn new() -> Self {
        Self {
            inner: SegQueue::new(),
        }
    }

    /// Never fails, never blocks, totally ordered with other pushes.
    pub fn push(&self, w: Writer) {
        self.inner.push(w);
    }

    /// Non-blocking; returns `None` iff the queue is empty at the instant of
    /// the call.
    pub fn try_pop(&self) -> Option<Writer> {
        self.inner.pop()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
