//! Concurrent FIFO queue with a closeable lifecycle.
//!
//! Multi-producer/multi-consumer under one mutex and condition variable.
//! `close` is one-shot: later pushes are silently dropped so producers can
//! race shutdown without checking, while already-queued items stay drainable.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

struct QueueInner<T> {
    items: VecDeque<T>,
    closed: bool,
}

pub struct ConcurrentQueue<T> {
    inner: Mutex<QueueInner<T>>,
    not_empty: Condvar,
}

impl<T> ConcurrentQueue<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(QueueInner {
                items: VecDeque::new(),
                closed: false,
            }),
            not_empty: Condvar::new(),
        }
    }

    /// Append to the tail and wake one waiter. Dropped silently if closed.
    pub fn push(&self, value: T) {
        {
            let mut inner = self.inner.lock().unwrap();
            if inner.closed {
                return;
            }
            inner.items.push_back(value);
        }
        self.not_empty.notify_one();
    }

    /// Blocking pop. Returns `None` only once the queue is closed and empty.
    pub fn pop(&self) -> Option<T> {
        let mut inner = self.inner.lock().unwrap();
        loop {
            if let Some(value) = inner.items.pop_front() {
                return Some(value);
            }
            if inner.closed {
                return None;
            }
            inner = self.not_empty.wait(inner).unwrap();
        }
    }

    /// Non-blocking pop. Returns `None` immediately when empty, closed or not.
    pub fn try_pop(&self) -> Option<T> {
        self.inner.lock().unwrap().items.pop_front()
    }

    /// Mark closed and wake all waiters. Idempotent.
    pub fn close(&self) {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.closed = true;
        }
        self.not_empty.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().unwrap().closed
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().items.is_empty()
    }
}

impl<T> Default for ConcurrentQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
