//! External venue contracts and the registry that locates them.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use swaplock_types::{Address, Bytes, Result, SwaplockError};
use thiserror::Error;

/// One call into a venue.
#[derive(Debug, Clone, Copy)]
pub struct VenueCall<'a> {
    /// The caller, always the engine's custody address.
    pub sender: Address,
    /// The venue's own address.
    pub venue: Address,
    /// Instruction bytes, exactly as the swap request carried them.
    pub data: &'a [u8],
}

/// A venue call reverted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("venue reverted: {reason}")]
pub struct VenueRevert {
    pub reason: String,
}

impl VenueRevert {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Ledger failures inside a venue bubble up as reverts.
impl From<SwaplockError> for VenueRevert {
    fn from(err: SwaplockError) -> Self {
        Self::new(err.to_string())
    }
}

/// An external exchange contract accepting arbitrary call data.
///
/// Implementations are untrusted: they may draw less than they were
/// allowed, misreport what they did, or try to call back into the engine.
pub trait Venue: Send + Sync {
    /// Execute `call`. The returned bytes are informational only.
    fn execute(&self, call: &VenueCall<'_>) -> std::result::Result<Bytes, VenueRevert>;
}

/// Address → deployed venue.
#[derive(Default)]
pub struct VenueRegistry {
    venues: RwLock<HashMap<Address, Arc<dyn Venue>>>,
}

impl VenueRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deploy `venue` at `address`, replacing whatever was there.
    ///
    /// # Errors
    /// Returns [`SwaplockError::Configuration`] for the zero address.
    pub fn deploy(&self, address: Address, venue: Arc<dyn Venue>) -> Result<()> {
        if address.is_zero() {
            return Err(SwaplockError::Configuration(
                "cannot deploy a venue at the zero address".into(),
            ));
        }
        self.venues.write().insert(address, venue);
        tracing::debug!(%address, "Venue deployed");
        Ok(())
    }

    /// Remove the venue at `address`, if any.
    pub fn undeploy(&self, address: Address) -> Option<Arc<dyn Venue>> {
        self.venues.write().remove(&address)
    }

    /// Look up the venue at `address`.
    ///
    /// Returns a cloned handle so the registry lock is not held while the
    /// venue runs.
    #[must_use]
    pub fn get(&self, address: Address) -> Option<Arc<dyn Venue>> {
        self.venues.read().get(&address).cloned()
    }

    #[must_use]
    pub fn is_deployed(&self, address: Address) -> bool {
        self.venues.read().contains_key(&address)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.venues.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.venues.read().is_empty()
    }
}
