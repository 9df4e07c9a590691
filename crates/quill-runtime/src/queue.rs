//! Priority queue feeding the scheduler.
//!
//! Multiple producers (plugin observation, deferred requeue) push while a
//! single consumer (the scheduler tick) pops. Highest priority first; within
//! a priority band strict FIFO, enforced by a monotonic sequence number.

use parking_lot::Mutex;
use std::collections::BinaryHeap;

struct Entry<T> {
    priority: u32,
    seq: u64,
    item: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Max-heap: higher priority wins, older sequence breaks ties.
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

struct Inner<T> {
    heap: BinaryHeap<Entry<T>>,
    next_seq: u64,
}

/// A thread-safe max-priority queue. `try_dequeue` never blocks.
pub struct PriorityQueue<T> {
    inner: Mutex<Inner<T>>,
}

impl<T> PriorityQueue<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                heap: BinaryHeap::new(),
                next_seq: 0,
            }),
        }
    }

    pub fn enqueue(&self, item: T, priority: u32) {
        let mut inner = self.inner.lock();
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.heap.push(Entry {
            priority,
            seq,
            item,
        });
    }

    /// Pop the highest-priority item, or `None` when the queue is empty.
    pub fn try_dequeue(&self) -> Option<T> {
        self.inner.lock().heap.pop().map(|e| e.item)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().heap.is_empty()
    }

    pub fn clear(&self) {
        self.inner.lock().heap.clear();
    }
}

impl<T> Default for PriorityQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
