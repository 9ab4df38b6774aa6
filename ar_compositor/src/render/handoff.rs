/// One-shot values handed from producer threads to the render thread
///
/// Producers overwrite, the render thread reads-and-clears at the start of
/// the next frame. One mutex per slot.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::config::SurfaceSize;

/// Latest-value-wins slot consumed by a single reader
#[derive(Debug)]
pub struct Handoff<T> {
    slot: Mutex<Option<T>>,
}

impl<T> Default for Handoff<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Handoff<T> {
    pub fn new() -> Self {
        Self { slot: Mutex::new(None) }
    }

    /// Store `value`, replacing any value not yet taken
    pub fn post(&self, value: T) {
        *self.lock() = Some(value);
    }

    /// Take the pending value, leaving the slot empty
    pub fn take(&self) -> Option<T> {
        self.lock().take()
    }

    pub fn is_pending(&self) -> bool {
        self.lock().is_some()
    }

    // A panicking producer cannot leave an Option half-written
    fn lock(&self) -> MutexGuard<'_, Option<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Notifications the host surface posts from outside the render thread
#[derive(Debug, Default)]
pub struct SurfaceSignals {
    resize: Handoff<SurfaceSize>,
}

impl SurfaceSignals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report a new surface size; applied before the next frame is drawn
    pub fn post_resize(&self, size: impl Into<SurfaceSize>) {
        self.resize.post(size.into());
    }

    pub fn take_resize(&self) -> Option<SurfaceSize> {
        self.resize.take()
    }
}

#[cfg(test)]
#[path = "handoff_tests.rs"]
mod tests;
