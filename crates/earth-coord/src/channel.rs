//! Fixed-capacity FIFO hand-off between the two roles.

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::fmt;

/// The channel was closed; no further items will be accepted or delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Closed;

impl fmt::Display for Closed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("channel closed")
    }
}

impl std::error::Error for Closed {}

/// Why a non-blocking enqueue was refused. The item is handed back.
pub enum OfferError<T> {
    Full(T),
    Closed(T),
}

impl<T> OfferError<T> {
    pub fn into_inner(self) -> T {
        match self {
            OfferError::Full(item) | OfferError::Closed(item) => item,
        }
    }

    pub fn is_full(&self) -> bool {
        matches!(self, OfferError::Full(_))
    }
}

impl<T> fmt::Debug for OfferError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OfferError::Full(_) => f.write_str("Full(..)"),
            OfferError::Closed(_) => f.write_str("Closed(..)"),
        }
    }
}

/// Why a non-blocking dequeue returned nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollError {
    Empty,
    Closed,
}

struct Inner<T> {
    queue: VecDeque<T>,
    closed: bool,
}

/// A bounded, blocking FIFO.
///
/// Closing the channel wakes every blocked caller. Items already queued
/// can still be taken after a close; only [`BoundedChannel::clear`] drops
/// them.
pub struct BoundedChannel<T> {
    inner: Mutex<Inner<T>>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: usize,
}

impl<T> BoundedChannel<T> {
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0, "channel capacity must be positive");
        let capacity = capacity.max(1);
        Self {
            inner: Mutex::new(Inner {
                queue: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.inner.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().queue.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.inner.lock().queue.len() >= self.capacity
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    /// Enqueue, waiting for space
    pub fn put(&self, item: T) -> Result<(), Closed> {
        let mut inner = self.inner.lock();
        while inner.queue.len() >= self.capacity && !inner.closed {
            self.not_full.wait(&mut inner);
        }
        if inner.closed {
            return Err(Closed);
        }

        inner.queue.push_back(item);
        drop(inner);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Dequeue, waiting for an item
    pub fn take(&self) -> Result<T, Closed> {
        let mut inner = self.inner.lock();
        loop {
            if let Some(item) = inner.queue.pop_front() {
                drop(inner);
                self.not_full.notify_one();
                return Ok(item);
            }
            if inner.closed {
                return Err(Closed);
            }
            self.not_empty.wait(&mut inner);
        }
    }

    /// Enqueue without waiting
    pub fn offer(&self, item: T) -> Result<(), OfferError<T>> {
        let mut inner = self.inner.lock();
        if inner.closed {
            return Err(OfferError::Closed(item));
        }
        if inner.queue.len() >= self.capacity {
            return Err(OfferError::Full(item));
        }

        inner.queue.push_back(item);
        drop(inner);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Dequeue without waiting
    pub fn poll(&self) -> Result<T, PollError> {
        let mut inner = self.inner.lock();
        match inner.queue.pop_front() {
            Some(item) => {
                drop(inner);
                self.not_full.notify_one();
                Ok(item)
            }
            None if inner.closed => Err(PollError::Closed),
            None => Err(PollError::Empty),
        }
    }

    /// Drop every queued item, returning how many were discarded
    pub fn clear(&self) -> usize {
        let dropped = {
            let mut inner = self.inner.lock();
            let dropped = inner.queue.len();
            inner.queue.clear();
            dropped
        };
        self.not_full.notify_all();
        dropped
    }

    /// Refuse further puts and wake every waiter
    pub fn close(&self) {
        self.inner.lock().closed = true;
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }
}

impl<T> fmt::Debug for BoundedChannel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("BoundedChannel")
            .field("capacity", &self.capacity)
            .field("len", &inner.queue.len())
            .field("closed", &inner.closed)
            .finish()
    }
}
