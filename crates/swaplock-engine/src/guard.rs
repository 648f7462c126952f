//! Reentrancy guard.
//!
//! The venue call is the one point where control leaves the engine. A venue
//! that calls back into a guarded operation runs on the same thread, finds
//! the flag held, and is rejected with [`SwaplockError::Reentrancy`]. Calls
//! from other threads wait for the region instead. The flag is cleared when
//! the [`Entered`] token drops, so every exit path releases it, including
//! early returns through `?`.

use std::cell::Cell;

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use swaplock_types::{Result, SwaplockError};

/// Flag held for the duration of a guarded operation.
#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    region: ReentrantMutex<Cell<bool>>,
}

impl ReentrancyGuard {
    /// Create a new unlocked guard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter the guarded region, waiting while another thread holds it.
    ///
    /// # Errors
    /// Returns [`SwaplockError::Reentrancy`] if this thread already holds it.
    pub fn enter(&self) -> Result<Entered<'_>> {
        let region = self.region.lock();
        if region.replace(true) {
            return Err(SwaplockError::Reentrancy);
        }
        Ok(Entered { region })
    }

    /// Whether a guarded operation is in progress on any thread.
    #[must_use]
    pub fn is_entered(&self) -> bool {
        self.region.try_lock().is_none_or(|region| region.get())
    }
}

/// Proof of being inside the guarded region. Releases it on drop.
#[derive(Debug)]
#[must_use = "the guarded region ends as soon as this is dropped"]
pub struct Entered<'a> {
    region: ReentrantMutexGuard<'a, Cell<bool>>,
}

impl Drop for Entered<'_> {
    fn drop(&mut self) {
        self.region.set(false);
    }
}
