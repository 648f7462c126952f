//! Contract events emitted by engine operations.
//!
//! Events are immutable records appended to the engine's audit log. A swap
//! call never fails on venue problems, so [`SwapExecuted`] is how a caller
//! tells a Settled swap from a Locked one.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::{BridgeDestination, SwapId, SwapOutcome, SwapReceipt, VenueFailure};

/// The engine was initialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Initialized {
    pub deployer: Address,
    pub administrator: Address,
    pub venue: Address,
}

/// A swap completed, either settled or locked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapExecuted {
    pub swap_id: SwapId,
    pub sell_token: Address,
    pub buy_token: Address,
    pub caller: Address,
    pub recipient: Address,
    pub declared_amount: U256,
    pub consumed: U256,
    pub proceeds: U256,
    pub retained_delta: U256,
    pub outcome: SwapOutcome,
    pub venue_failure: Option<VenueFailure>,
    /// Bridge delivery target for relayers, when the caller named one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<BridgeDestination>,
}

impl From<&SwapReceipt> for SwapExecuted {
    fn from(receipt: &SwapReceipt) -> Self {
        Self {
            swap_id: receipt.swap_id,
            sell_token: receipt.sell_token,
            buy_token: receipt.buy_token,
            caller: receipt.caller,
            recipient: receipt.recipient,
            declared_amount: receipt.declared_amount,
            consumed: receipt.consumed,
            proceeds: receipt.proceeds,
            retained_delta: receipt.retained_delta,
            outcome: receipt.outcome,
            venue_failure: receipt.venue_failure.clone(),
            destination: receipt.destination.clone(),
        }
    }
}

/// The administrator replaced the venue address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueChanged {
    pub previous: Address,
    pub current: Address,
}

/// The administrator swept a retained balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetainedSwept {
    pub token: Address,
    pub destination: Address,
    pub amount: U256,
}

/// The administrator paid part of a retained balance out to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Released {
    pub token: Address,
    pub user: Address,
    pub amount: U256,
    /// Still retained for `token` afterwards.
    pub remaining: U256,
}

/// The administrator role moved to a new identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdministrationTransferred {
    pub previous: Address,
    pub current: Address,
}

/// Enum wrapper for all contract events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractEvent {
    Initialized(Initialized),
    SwapExecuted(SwapExecuted),
    VenueChanged(VenueChanged),
    RetainedSwept(RetainedSwept),
    Released(Released),
    AdministrationTransferred(AdministrationTransferred),
}

impl ContractEvent {
    /// Stable event name, used as the log target field.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Initialized(_) => "INITIALIZED",
            Self::SwapExecuted(_) => "SWAP_EXECUTED",
            Self::VenueChanged(_) => "VENUE_CHANGED",
            Self::RetainedSwept(_) => "RETAINED_SWEPT",
            Self::Released(_) => "RELEASED",
            Self::AdministrationTransferred(_) => "ADMINISTRATION_TRANSFERRED",
        }
    }
}
