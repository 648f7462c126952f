//! Swap Decision Engine.
//!
//! `execute_swap` pulls the declared amount into custody, hands the
//! instructions to the gateway, and classifies the measured result:
//!
//! - **Settled**: proceeds go to the recipient, the undrawn remainder is
//!   retained.
//! - **Locked**: nothing went through, the whole declared amount is retained.
//!
//! Venue failures never fail the call. Decoding and pull failures do, and
//! any fatal error after the pull undoes the swap's own ledger writes. The
//! ledger session opened for the swap keeps other threads off the ledger
//! until the swap returns.

use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use swaplock_custody::{CustodyAdapter, TokenLedger};
use swaplock_gateway::{ExchangeGateway, ForwardRequest, VenueRegistry};
use swaplock_types::{
    Address, BridgeDestination, ContractEvent, EventDigest, ExchangeConfig, Result,
    SwapExecuted, SwapId, SwapOutcome, SwapReceipt, SwapRequest, SwaplockError, U256,
};

use crate::audit::{AuditLog, AuditRecord};
use crate::guard::ReentrancyGuard;
use crate::retained::RetainedLedger;

/// Mutable engine state. Never locked across the venue call.
#[derive(Debug, Default)]
pub(crate) struct EngineState {
    pub(crate) config: Option<ExchangeConfig>,
    pub(crate) retained: RetainedLedger,
    pub(crate) audit: AuditLog,
}

impl EngineState {
    pub(crate) fn config(&self) -> Result<&ExchangeConfig> {
        self.config.as_ref().ok_or(SwaplockError::NotInitialized)
    }
}

/// The custodial swap-and-lock engine.
pub struct SwapEngine<L: TokenLedger> {
    pub(crate) custody: CustodyAdapter<L>,
    pub(crate) gateway: ExchangeGateway<L>,
    pub(crate) guard: ReentrancyGuard,
    pub(crate) state: Mutex<EngineState>,
}

impl<L: TokenLedger> SwapEngine<L> {
    /// Create an uninitialized engine holding custody at `engine_address`.
    #[must_use]
    pub fn new(ledger: Arc<L>, engine_address: Address, registry: Arc<VenueRegistry>) -> Self {
        let custody = CustodyAdapter::new(ledger, engine_address);
        let gateway = ExchangeGateway::new(custody.clone(), registry);
        Self {
            custody,
            gateway,
            guard: ReentrancyGuard::new(),
            state: Mutex::new(EngineState::default()),
        }
    }

    /// The engine's custody address.
    #[must_use]
    pub fn address(&self) -> Address {
        self.custody.custodian()
    }

    /// Venue registry the gateway resolves venue addresses against.
    #[must_use]
    pub fn registry(&self) -> &Arc<VenueRegistry> {
        self.gateway.registry()
    }

    /// Execute one swap on behalf of `caller`.
    ///
    /// `request_blob` is the ABI encoding of
    /// `(address sellToken, address buyToken, uint256 declaredAmount, bytes instructions)`.
    /// The caller must have authorized the engine for at least
    /// `declaredAmount` of `sellToken`.
    ///
    /// Another thread's guarded call in progress makes this one wait.
    ///
    /// # Errors
    /// - `Reentrancy` if called back from inside a guarded operation.
    /// - `NotInitialized` before [`SwapEngine::initialize`].
    /// - `MalformedRequest` for an undecodable or invalid request, or a zero
    ///   recipient.
    /// - `InsufficientAuthorization` / `InsufficientBalance` if the declared
    ///   amount cannot be pulled from `caller`.
    ///
    /// Every error leaves balances, the retained ledger, and the event log
    /// exactly as they were.
    pub fn execute_swap(
        &self,
        caller: Address,
        request_blob: &[u8],
        recipient: Address,
    ) -> Result<SwapReceipt> {
        self.execute_swap_to(caller, request_blob, recipient, None)
    }

    /// [`SwapEngine::execute_swap`], tagging the receipt and event with a
    /// bridge destination for relayers.
    ///
    /// # Errors
    /// As [`SwapEngine::execute_swap`]; an incomplete `destination` is
    /// `MalformedRequest`.
    pub fn execute_swap_to(
        &self,
        caller: Address,
        request_blob: &[u8],
        recipient: Address,
        destination: Option<BridgeDestination>,
    ) -> Result<SwapReceipt> {
        let _entered = self.guard.enter()?;
        let config = self.state.lock().config()?.clone();

        let request = SwapRequest::parse(request_blob)?;
        if recipient.is_zero() {
            return Err(SwaplockError::malformed("recipient is the zero address"));
        }
        if let Some(destination) = &destination {
            destination.validate()?;
        }

        let checkpoint = self.custody.checkpoint();
        let result = self
            .run_swap(caller, &request, recipient, &config)
            .and_then(|mut receipt| {
                receipt.destination = destination;
                self.commit_swap(&receipt)?;
                Ok(receipt)
            });

        match &result {
            Ok(_) => drop(checkpoint),
            Err(err) => {
                self.custody.restore(checkpoint);
                tracing::warn!(
                    %caller,
                    sell_token = %request.sell_token,
                    declared = %request.declared_amount,
                    error = %err,
                    "Swap rejected; ledger restored"
                );
            }
        }
        result
    }

    /// Ledger side of a swap: pull, forward, pay out.
    fn run_swap(
        &self,
        caller: Address,
        request: &SwapRequest,
        recipient: Address,
        config: &ExchangeConfig,
    ) -> Result<SwapReceipt> {
        let declared = request.declared_amount;
        self.custody.pull(request.sell_token, caller, declared)?;

        let forwarded = self.gateway.forward(&ForwardRequest {
            venue: config.venue,
            sell_token: request.sell_token,
            buy_token: request.buy_token,
            instructions: request.instructions.clone(),
            max_spend: declared,
        })?;

        let (outcome, consumed, proceeds, retained_delta) = if forwarded.success() {
            let remainder = declared.checked_sub(forwarded.consumed).ok_or_else(|| {
                SwaplockError::Internal(format!(
                    "consumed {} exceeds declared {declared}",
                    forwarded.consumed
                ))
            })?;
            if !forwarded.proceeds.is_zero() {
                self.custody
                    .push(request.buy_token, recipient, forwarded.proceeds)?;
            }
            (
                SwapOutcome::Settled,
                forwarded.consumed,
                forwarded.proceeds,
                remainder,
            )
        } else {
            (SwapOutcome::Locked, U256::ZERO, U256::ZERO, declared)
        };

        Ok(SwapReceipt {
            swap_id: SwapId::new(),
            caller,
            recipient,
            sell_token: request.sell_token,
            buy_token: request.buy_token,
            declared_amount: declared,
            consumed,
            proceeds,
            retained_delta,
            outcome,
            venue_failure: forwarded.failure,
            destination: None,
            executed_at: Utc::now(),
        })
    }

    /// Engine-state side of a swap: retained credit and the event.
    fn commit_swap(&self, receipt: &SwapReceipt) -> Result<()> {
        let mut state = self.state.lock();
        let retained = state
            .retained
            .preview_credit(receipt.sell_token, receipt.retained_delta)?;
        let custody = self.custody.balance(receipt.sell_token);
        if retained > custody {
            return Err(SwaplockError::CustodyInvariantViolation {
                token: receipt.sell_token,
                retained,
                custody,
            });
        }

        state
            .audit
            .append(ContractEvent::SwapExecuted(SwapExecuted::from(receipt)))?;
        state
            .retained
            .credit(receipt.sell_token, receipt.retained_delta)?;

        match &receipt.venue_failure {
            None => tracing::info!(
                swap_id = %receipt.swap_id,
                outcome = %receipt.outcome,
                sell_token = %receipt.sell_token,
                declared = %receipt.declared_amount,
                consumed = %receipt.consumed,
                proceeds = %receipt.proceeds,
                retained_delta = %receipt.retained_delta,
                destination = ?receipt.destination.as_ref().map(ToString::to_string),
                "Swap settled"
            ),
            Some(failure) => tracing::warn!(
                swap_id = %receipt.swap_id,
                outcome = %receipt.outcome,
                sell_token = %receipt.sell_token,
                declared = %receipt.declared_amount,
                %failure,
                "Swap locked"
            ),
        }
        Ok(())
    }

    // -----------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------

    /// Amount of `token` retained and awaiting a sweep.
    #[must_use]
    pub fn retained_balance(&self, token: Address) -> U256 {
        self.state.lock().retained.get(token)
    }

    /// Every retained entry, swept ones included.
    #[must_use]
    pub fn retained_entries(&self) -> Vec<(Address, U256)> {
        self.state.lock().retained.iter().collect()
    }

    /// Current venue.
    ///
    /// # Errors
    /// Returns `NotInitialized` before initialization.
    pub fn venue(&self) -> Result<Address> {
        Ok(self.state.lock().config()?.venue)
    }

    /// Current administrator.
    ///
    /// # Errors
    /// Returns `NotInitialized` before initialization.
    pub fn administrator(&self) -> Result<Address> {
        Ok(self.state.lock().config()?.administrator)
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.state.lock().config.is_some()
    }

    /// The engine's own balance of `token` on the ledger.
    #[must_use]
    pub fn custody_balance(&self, token: Address) -> U256 {
        self.custody.balance(token)
    }

    /// Check that custody of `token` covers what the retained ledger owes.
    ///
    /// # Errors
    /// Returns `CustodyInvariantViolation` when it does not.
    pub fn verify_custody(&self, token: Address) -> Result<()> {
        let retained = self.retained_balance(token);
        let custody = self.custody_balance(token);
        if retained > custody {
            tracing::error!(%token, %retained, %custody, "Custody invariant violated");
            return Err(SwaplockError::CustodyInvariantViolation {
                token,
                retained,
                custody,
            });
        }
        Ok(())
    }

    /// Every event emitted so far, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<ContractEvent> {
        self.state.lock().audit.events().cloned().collect()
    }

    /// Full audit records, with digests.
    #[must_use]
    pub fn audit_records(&self) -> Vec<AuditRecord> {
        self.state.lock().audit.records().to_vec()
    }

    /// Digest of the latest audit record.
    #[must_use]
    pub fn audit_head(&self) -> EventDigest {
        self.state.lock().audit.head()
    }

    /// Recompute the audit hash chain.
    ///
    /// # Errors
    /// Returns `Internal` if any record fails to verify.
    pub fn verify_audit(&self) -> Result<()> {
        self.state.lock().audit.verify_chain()
    }
}
