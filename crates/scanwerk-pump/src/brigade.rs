// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Scanwerk — The brigade: a bounded blocking queue of buckets.
//
// The brigade is the only state shared between the pump's two workers.
// Buckets come out in exactly the order they went in; a single mutex
// serializes all access, with one condition variable per direction.
//
// The queue is capacity-bounded: a full brigade blocks the pusher, so a
// slow consumer exerts backpressure on acquisition instead of letting it
// buffer scans unboundedly in memory.  `close` releases both sides so
// neither worker can block against a peer that already exited.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard};

use crate::bucket::Bucket;

struct BrigadeState {
    queue: VecDeque<Bucket>,
    closed: bool,
}

/// Bounded FIFO connecting the acquiring worker to the processing worker.
pub struct Brigade {
    state: Mutex<BrigadeState>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: usize,
}

impl Brigade {
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(BrigadeState {
                queue: VecDeque::new(),
                closed: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BrigadeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Push a bucket, blocking while the brigade is full.
    ///
    /// Returns `false` when the brigade is closed; the bucket is dropped,
    /// since nobody will ever pop it.
    pub fn push(&self, bucket: Bucket) -> bool {
        let mut state = self.lock();
        while state.queue.len() >= self.capacity && !state.closed {
            state = self
                .not_full
                .wait(state)
                .unwrap_or_else(|e| e.into_inner());
        }
        if state.closed {
            return false;
        }
        state.queue.push_back(bucket);
        self.not_empty.notify_one();
        true
    }

    /// Pop the oldest bucket, blocking while the brigade is empty.
    ///
    /// Returns `None` only once the brigade is closed and drained.
    pub fn pop(&self) -> Option<Bucket> {
        let mut state = self.lock();
        loop {
            if let Some(bucket) = state.queue.pop_front() {
                self.not_full.notify_one();
                return Some(bucket);
            }
            if state.closed {
                return None;
            }
            state = self
                .not_empty
                .wait(state)
                .unwrap_or_else(|e| e.into_inner());
        }
    }

    /// Number of buckets currently outstanding.
    pub fn len(&self) -> usize {
        self.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Release both sides: pushes start failing, pops drain then return
    /// `None`.
    pub fn close(&self) {
        let mut state = self.lock();
        state.closed = true;
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    /// Drop any leftover buckets and reopen for the next run.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.queue.clear();
        state.closed = false;
    }
}

// -- Tests --------------------------------------------------------------------
