//! Error types for the SwapLock escrow engine.
//!
//! All errors use the `SL_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Request decoding / validation errors
//! - 2xx: Custody (token ledger) errors
//! - 3xx: Administration errors
//! - 4xx: Recovery errors
//! - 8xx: Security errors
//! - 9xx: General / internal errors
//!
//! Every variant is fatal to the call that produced it: the call is aborted
//! and all of its state changes are rolled back. Venue-side problems are
//! *not* errors; they are [`crate::VenueFailure`] values absorbed into the
//! Locked outcome.

use alloy_primitives::{Address, U256};
use thiserror::Error;

/// Central error enum for all SwapLock operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SwaplockError {
    // =================================================================
    // Request Errors (1xx)
    // =================================================================
    /// The request blob did not decode into a well-formed swap request.
    #[error("SL_ERR_100: Malformed request: {reason}")]
    MalformedRequest { reason: String },

    // =================================================================
    // Custody Errors (2xx)
    // =================================================================
    /// The owner's allowance to the spender is smaller than the amount
    /// being drawn.
    #[error("SL_ERR_200: Insufficient authorization on {token}: need {needed}, authorized {authorized}")]
    InsufficientAuthorization {
        token: Address,
        needed: U256,
        authorized: U256,
    },

    /// The holder's token balance is smaller than the amount being moved.
    #[error("SL_ERR_201: Insufficient balance on {token}: need {needed}, have {available}")]
    InsufficientBalance {
        token: Address,
        needed: U256,
        available: U256,
    },

    /// A credit would overflow 256 bits.
    #[error("SL_ERR_202: Balance overflow on {token}")]
    BalanceOverflow { token: Address },

    /// Tokens cannot be sent to, or approved for, the zero address.
    #[error("SL_ERR_203: Zero address used as {role} on {token}")]
    ZeroAddress { token: Address, role: &'static str },

    // =================================================================
    // Administration Errors (3xx)
    // =================================================================
    /// The caller is not the configured administrator.
    #[error("SL_ERR_300: Unauthorized caller: {caller}")]
    Unauthorized { caller: Address },

    /// The engine has not been initialized yet.
    #[error("SL_ERR_301: Engine not initialized")]
    NotInitialized,

    /// `initialize` was called a second time.
    #[error("SL_ERR_302: Engine already initialized")]
    AlreadyInitialized,

    /// The proposed administrator identity is unusable.
    #[error("SL_ERR_303: Invalid administrator: {reason}")]
    InvalidAdministrator { reason: String },

    // =================================================================
    // Recovery Errors (4xx)
    // =================================================================
    /// There is nothing retained for this token to sweep.
    #[error("SL_ERR_400: Nothing retained for {token}")]
    NothingRetained { token: Address },

    /// A release asked for more than is retained for the token.
    #[error("SL_ERR_401: Release of {requested} exceeds retained {retained} for {token}")]
    ReleaseExceedsRetained {
        token: Address,
        requested: U256,
        retained: U256,
    },

    // =================================================================
    // Security Errors (8xx)
    // =================================================================
    /// A guarded operation was entered while another one was in progress.
    #[error("SL_ERR_800: Reentrant call rejected")]
    Reentrancy,

    /// The retained ledger claims more than the engine actually holds.
    #[error("SL_ERR_801: Custody invariant violation on {token}: retained {retained} > custody {custody}")]
    CustodyInvariantViolation {
        token: Address,
        retained: U256,
        custody: U256,
    },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("SL_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("SL_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config file, missing fields, etc.).
    #[error("SL_ERR_902: Configuration error: {0}")]
    Configuration(String),

    /// I/O error.
    #[error("SL_ERR_903: I/O error: {0}")]
    Io(String),
}

/// Coarse classification of an error, used by callers to decide whom to
/// blame and by logs to group failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// The caller sent a bad request or lacks funds/authorization.
    Caller,
    /// The caller is not permitted to perform an administrative action.
    Authorization,
    /// A recovery (sweep or release) could not be served.
    Recovery,
    /// Reentrancy or a broken custody invariant.
    Security,
    /// Everything else.
    Internal,
}

impl SwaplockError {
    /// Classify this error.
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::MalformedRequest { .. }
            | Self::InsufficientAuthorization { .. }
            | Self::InsufficientBalance { .. }
            | Self::ZeroAddress { .. } => ErrorClass::Caller,
            Self::Unauthorized { .. }
            | Self::NotInitialized
            | Self::AlreadyInitialized
            | Self::InvalidAdministrator { .. } => ErrorClass::Authorization,
            Self::NothingRetained { .. } | Self::ReleaseExceedsRetained { .. } => {
                ErrorClass::Recovery
            }
            Self::Reentrancy | Self::CustodyInvariantViolation { .. } => ErrorClass::Security,
            Self::BalanceOverflow { .. }
            | Self::Internal(_)
            | Self::Serialization(_)
            | Self::Configuration(_)
            | Self::Io(_) => ErrorClass::Internal,
        }
    }

    /// Shorthand for a [`SwaplockError::MalformedRequest`].
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedRequest {
            reason: reason.into(),
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, SwaplockError>;

impl From<std::io::Error> for SwaplockError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SwaplockError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
