//! Custody adapter: token operations from the engine's own address.
//!
//! The engine never touches the ledger with an arbitrary identity: every
//! call goes through a [`CustodyAdapter`] bound to the engine's custody
//! address, so "who is acting" is fixed at construction.

use std::sync::Arc;

use swaplock_types::{Address, Result, U256};

use crate::ledger::TokenLedger;

/// Engine-side view of the token ledger.
pub struct CustodyAdapter<L: TokenLedger> {
    ledger: Arc<L>,
    custodian: Address,
}

impl<L: TokenLedger> CustodyAdapter<L> {
    /// Bind an adapter to `custodian` on `ledger`.
    #[must_use]
    pub fn new(ledger: Arc<L>, custodian: Address) -> Self {
        Self { ledger, custodian }
    }

    /// The custody address (the engine itself).
    #[must_use]
    pub fn custodian(&self) -> Address {
        self.custodian
    }

    /// The underlying ledger.
    #[must_use]
    pub fn ledger(&self) -> &Arc<L> {
        &self.ledger
    }

    /// Pull `amount` of `token` from `from` into custody, drawing on the
    /// allowance `from` granted to the custodian.
    ///
    /// # Errors
    /// `InsufficientAuthorization` if the allowance is short,
    /// `InsufficientBalance` if `from` does not hold `amount`.
    pub fn pull(&self, token: Address, from: Address, amount: U256) -> Result<()> {
        self.ledger
            .transfer_from(token, self.custodian, from, self.custodian, amount)?;
        tracing::debug!(%token, %from, %amount, "Pulled into custody");
        Ok(())
    }

    /// Send `amount` of `token` out of custody to `to`.
    pub fn push(&self, token: Address, to: Address, amount: U256) -> Result<()> {
        self.ledger.transfer(token, self.custodian, to, amount)?;
        tracing::debug!(%token, %to, %amount, "Pushed out of custody");
        Ok(())
    }

    /// Let `spender` draw up to `amount` of custodied `token`.
    pub fn grant(&self, token: Address, spender: Address, amount: U256) -> Result<()> {
        self.ledger.approve(token, self.custodian, spender, amount)
    }

    /// Withdraw any allowance `spender` holds over custodied `token`.
    pub fn revoke(&self, token: Address, spender: Address) -> Result<()> {
        self.ledger
            .approve(token, self.custodian, spender, U256::ZERO)
    }

    /// Allowance `spender` currently holds over custodied `token`.
    #[must_use]
    pub fn granted(&self, token: Address, spender: Address) -> U256 {
        self.ledger.allowance(token, self.custodian, spender)
    }

    /// Custodied balance of `token`, measured directly on the ledger.
    #[must_use]
    pub fn balance(&self, token: Address) -> U256 {
        self.ledger.balance_of(token, self.custodian)
    }

    /// Open a rollback session on the ledger.
    #[must_use]
    pub fn checkpoint(&self) -> L::Checkpoint<'_> {
        self.ledger.checkpoint()
    }

    /// Undo this session's writes since `checkpoint`.
    pub fn restore(&self, checkpoint: L::Checkpoint<'_>) {
        self.ledger.restore(checkpoint);
    }
}

impl<L: TokenLedger> Clone for CustodyAdapter<L> {
    fn clone(&self) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
            custodian: self.custodian,
        }
    }
}
