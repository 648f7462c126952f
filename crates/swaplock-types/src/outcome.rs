//! Swap outcome classification and receipts.

use alloy_primitives::{Address, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{BridgeDestination, SwapId};

/// How a swap call resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwapOutcome {
    /// The venue executed; proceeds went to the recipient. Any undrawn
    /// remainder of the declared amount is retained.
    Settled,
    /// The venue did not execute; the whole declared amount is retained.
    Locked,
}

impl std::fmt::Display for SwapOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Settled => write!(f, "SETTLED"),
            Self::Locked => write!(f, "LOCKED"),
        }
    }
}

/// Why the exchange gateway reported failure.
///
/// These are degradations, not errors: every one of them resolves to the
/// Locked outcome and the swap call itself succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VenueFailure {
    /// The instruction blob was empty; the venue was not called.
    EmptyInstructions,
    /// No venue is configured; the venue was not called.
    VenueUnset,
    /// Nothing is deployed at the venue address.
    NoContract { venue: Address },
    /// The venue call reverted. All of its ledger effects were undone.
    Reverted { reason: String },
}

impl std::fmt::Display for VenueFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyInstructions => write!(f, "EMPTY_INSTRUCTIONS"),
            Self::VenueUnset => write!(f, "VENUE_UNSET"),
            Self::NoContract { venue } => write!(f, "NO_CONTRACT({venue})"),
            Self::Reverted { reason } => write!(f, "REVERTED({reason})"),
        }
    }
}

/// Result of one `execute_swap` call, returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapReceipt {
    /// Identifier of this swap.
    pub swap_id: SwapId,
    /// Who paid the declared amount.
    pub caller: Address,
    /// Who received the proceeds (if any).
    pub recipient: Address,
    /// Token pulled from the caller.
    pub sell_token: Address,
    /// Token delivered to the recipient on settlement.
    pub buy_token: Address,
    /// Amount pulled from the caller.
    pub declared_amount: U256,
    /// Amount of `sell_token` the venue actually drew, by balance delta.
    pub consumed: U256,
    /// Amount of `buy_token` forwarded to the recipient.
    pub proceeds: U256,
    /// Amount added to the retained ledger for `sell_token`.
    pub retained_delta: U256,
    /// Settled or Locked.
    pub outcome: SwapOutcome,
    /// Why the gateway failed, when the outcome is Locked.
    pub venue_failure: Option<VenueFailure>,
    /// Where a relayer should forward the proceeds, if anywhere.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<BridgeDestination>,
    /// When the swap completed.
    pub executed_at: DateTime<Utc>,
}

impl SwapReceipt {
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.outcome == SwapOutcome::Settled
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.outcome == SwapOutcome::Locked
    }
}
