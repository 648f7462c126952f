//! Scoped venue allowance.
//!
//! The venue may only draw custodied funds while it is being called. The
//! allowance is granted right before the call and revoked on every exit
//! path: explicitly through [`ScopedAllowance::release`], or from `Drop`
//! if the scope is left early.

use swaplock_custody::{CustodyAdapter, TokenLedger};
use swaplock_types::{Address, Result, U256};

/// Allowance held by a venue for the lifetime of this guard.
pub struct ScopedAllowance<'a, L: TokenLedger> {
    custody: &'a CustodyAdapter<L>,
    token: Address,
    spender: Address,
    released: bool,
}

impl<'a, L: TokenLedger> ScopedAllowance<'a, L> {
    /// Grant `spender` up to `amount` of custodied `token`.
    ///
    /// # Errors
    /// Propagates the ledger's `approve` failure (e.g. zero spender).
    pub fn grant(
        custody: &'a CustodyAdapter<L>,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<Self> {
        custody.grant(token, spender, amount)?;
        Ok(Self {
            custody,
            token,
            spender,
            released: false,
        })
    }

    /// Revoke whatever remains of the allowance.
    ///
    /// # Errors
    /// Propagates the ledger's `approve` failure.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        self.custody.revoke(self.token, self.spender)
    }

    /// Allowance left right now.
    #[must_use]
    pub fn remaining(&self) -> U256 {
        self.custody.granted(self.token, self.spender)
    }
}

impl<L: TokenLedger> Drop for ScopedAllowance<'_, L> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(err) = self.custody.revoke(self.token, self.spender) {
            tracing::error!(
                token = %self.token,
                spender = %self.spender,
                error = %err,
                "Failed to revoke scoped venue allowance"
            );
        }
    }
}
