//! Retained balance ledger.
//!
//! Per-token amounts the engine holds because a swap locked or left an
//! undrawn remainder. Entries are created on first credit and never removed;
//! a swept entry stays at zero.

use std::collections::BTreeMap;

use swaplock_types::{Address, Result, SwaplockError, U256};

/// token -> amount retained in custody, awaiting an administrator sweep.
#[derive(Debug, Clone, Default)]
pub struct RetainedLedger {
    balances: BTreeMap<Address, U256>,
}

impl RetainedLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Amount retained for `token` (zero if never credited).
    #[must_use]
    pub fn get(&self, token: Address) -> U256 {
        self.balances.get(&token).copied().unwrap_or(U256::ZERO)
    }

    /// The total `token` would reach after crediting `amount`, without
    /// applying it.
    ///
    /// # Errors
    /// Returns `BalanceOverflow` if the total exceeds 256 bits.
    pub fn preview_credit(&self, token: Address, amount: U256) -> Result<U256> {
        self.get(token)
            .checked_add(amount)
            .ok_or(SwaplockError::BalanceOverflow { token })
    }

    fn set(&mut self, token: Address, amount: U256) {
        self.balances.insert(token, amount);
    }

    /// Add `amount` to `token`'s entry, creating it if needed.
    ///
    /// # Errors
    /// Returns `BalanceOverflow` if the total exceeds 256 bits.
    pub fn credit(&mut self, token: Address, amount: U256) -> Result<()> {
        let total = self.preview_credit(token, amount)?;
        self.set(token, total);
        Ok(())
    }

    /// Remove `amount` from `token`'s entry and return what is left.
    ///
    /// # Errors
    /// `NothingRetained` if the entry is absent or zero,
    /// `ReleaseExceedsRetained` if it holds less than `amount`.
    pub fn debit(&mut self, token: Address, amount: U256) -> Result<U256> {
        let held = self.get(token);
        if held.is_zero() {
            return Err(SwaplockError::NothingRetained { token });
        }
        let remaining = held
            .checked_sub(amount)
            .ok_or(SwaplockError::ReleaseExceedsRetained {
                token,
                requested: amount,
                retained: held,
            })?;
        self.set(token, remaining);
        Ok(remaining)
    }

    /// Zero `token`'s entry and return what it held.
    ///
    /// # Errors
    /// Returns `NothingRetained` if the entry is absent or already zero.
    pub fn take(&mut self, token: Address) -> Result<U256> {
        let amount = self.get(token);
        self.debit(token, amount)?;
        Ok(amount)
    }

    /// All entries in token order, zero entries included.
    pub fn iter(&self) -> impl Iterator<Item = (Address, U256)> + '_ {
        self.balances.iter().map(|(token, amount)| (*token, *amount))
    }
}
