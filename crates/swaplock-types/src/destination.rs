//! Bridge destination metadata.
//!
//! A swap may name where a relayer should deliver the proceeds on another
//! chain. The engine does not act on it; it is validated, copied into the
//! receipt, and published in the [`crate::SwapExecuted`] event for relayers
//! to pick up.

use alloy_primitives::Bytes;
use serde::{Deserialize, Serialize};

use crate::{Result, SwaplockError, constants};

/// Off-chain delivery target attached to a swap.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BridgeDestination {
    /// Destination chain identifier, in the relayer's encoding.
    pub chain: Bytes,
    /// Token to deliver on the destination chain.
    pub token: String,
    /// Recipient address on the destination chain, in its native format.
    pub recipient: String,
}

impl BridgeDestination {
    #[must_use]
    pub fn new(
        chain: impl Into<Bytes>,
        token: impl Into<String>,
        recipient: impl Into<String>,
    ) -> Self {
        Self {
            chain: chain.into(),
            token: token.into(),
            recipient: recipient.into(),
        }
    }

    /// Check that every field is present and bounded.
    ///
    /// # Errors
    /// Returns [`SwaplockError::MalformedRequest`] naming the bad field.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("chain", self.chain.len()),
            ("token", self.token.len()),
            ("recipient", self.recipient.len()),
        ];
        for (name, len) in fields {
            if len == 0 {
                return Err(SwaplockError::malformed(format!(
                    "destination {name} is empty"
                )));
            }
            if len > constants::MAX_DESTINATION_FIELD_LEN {
                return Err(SwaplockError::malformed(format!(
                    "destination {name} is {len} bytes, limit {}",
                    constants::MAX_DESTINATION_FIELD_LEN
                )));
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for BridgeDestination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}:{}", self.recipient, self.chain, self.token)
    }
}
