//! Contains the [`Handler`] trait through which every analysis pass reports
//! its errors.
//!
//! Passes never print or abort on their own: they hand each error to a
//! [`Handler`] and carry on with the next unrelated entity. The caller decides
//! whether the errors are collected, counted, ignored or fatal.

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::{Mutex, MutexGuard};

/// Represents a sink that receives the errors produced by an analysis pass.
pub trait Handler<T>: Send + Sync {
    /// Receives an error and handles it.
    fn receive(&self, error: T);
}

/// Collects every received error in a vector, in the order received.
#[derive(Debug)]
pub struct Storage<T: Send> {
    errors: Mutex<Vec<T>>,
}

impl<T: Send> Storage<T> {
    /// Creates a new empty [`Storage`].
    #[must_use]
    pub const fn new() -> Self { Self { errors: Mutex::new(Vec::new()) } }

    /// Consumes the [`Storage`] and returns the collected errors.
    pub fn into_vec(self) -> Vec<T> { self.errors.into_inner() }

    /// Returns a guard over the collected errors.
    pub fn as_vec(&self) -> MutexGuard<Vec<T>> { self.errors.lock() }

    /// Returns `true` if no error has been received so far.
    pub fn is_empty(&self) -> bool { self.errors.lock().is_empty() }

    /// Moves every collected error into the given handler, converting each
    /// one on the way.
    pub fn propagate<U: From<T>, H: ?Sized + Handler<U>>(&self, handler: &H) {
        let errors = std::mem::take(&mut *self.errors.lock());

        for error in errors {
            handler.receive(error.into());
        }
    }
}

impl<T: Send> Default for Storage<T> {
    fn default() -> Self { Self::new() }
}

impl<T: Send, U: Into<T>> Handler<U> for Storage<T> {
    fn receive(&self, error: U) { self.errors.lock().push(error.into()); }
}

/// Discards every received error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Dummy;

impl<T> Handler<T> for Dummy {
    fn receive(&self, _error: T) {}
}

/// Counts the received errors without keeping them.
#[derive(Debug, Default)]
pub struct Counter {
    counter: AtomicUsize,
}

impl Counter {
    /// Returns the number of errors received.
    #[must_use]
    pub fn count(&self) -> usize { self.counter.load(Ordering::Relaxed) }
}

impl<T> Handler<T> for Counter {
    fn receive(&self, _error: T) {
        self.counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Panics on the first received error. Used by tests that expect a clean
/// input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Panic;

impl<T: std::fmt::Debug> Handler<T> for Panic {
    fn receive(&self, error: T) {
        panic!("unexpected error: {error:?}");
    }
}

#[cfg(test)]
mod test;
