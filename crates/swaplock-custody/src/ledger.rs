//! Token ledger: the external fungible-token contracts the engine custodies.
//!
//! Every operation is atomic: either it fully applies or the ledger is
//! unchanged. `transfer_from` checks the allowance before the balance, so an
//! authorization shortfall is always reported as such.
//!
//! A checkpoint opens a session. While it is alive the owning thread has the
//! ledger to itself (nested calls from that thread, such as a venue's, go
//! through), other threads wait, and every write is journaled so `restore`
//! undoes exactly the writes made since the checkpoint.

use std::collections::HashMap;

use parking_lot::{Mutex, ReentrantMutex, ReentrantMutexGuard};
use swaplock_types::{Address, Result, SwaplockError, U256};

/// Surface of an ERC-20 style multi-token ledger.
///
/// The acting identity is always passed explicitly: `from` for a transfer,
/// `owner` for an approval, `spender` for a delegated transfer.
pub trait TokenLedger: Send + Sync {
    /// Open rollback session. Ends, keeping its writes, when dropped.
    type Checkpoint<'a>
    where
        Self: 'a;

    /// Balance of `holder` in `token`.
    fn balance_of(&self, token: Address, holder: Address) -> U256;

    /// Amount `spender` may still draw from `owner` in `token`.
    fn allowance(&self, token: Address, owner: Address, spender: Address) -> U256;

    /// Move `amount` of `token` from `from` to `to`, authorized by `from`.
    fn transfer(&self, token: Address, from: Address, to: Address, amount: U256) -> Result<()>;

    /// Set `spender`'s allowance over `owner`'s `token` to exactly `amount`.
    fn approve(&self, token: Address, owner: Address, spender: Address, amount: U256)
    -> Result<()>;

    /// Move `amount` of `token` from `from` to `to`, authorized by an
    /// allowance `from` previously granted to `spender`.
    fn transfer_from(
        &self,
        token: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<()>;

    /// Start recording writes so they can be undone.
    ///
    /// Blocks while another thread holds a checkpoint.
    fn checkpoint(&self) -> Self::Checkpoint<'_>;

    /// Undo every write made since `checkpoint` was taken.
    fn restore(&self, checkpoint: Self::Checkpoint<'_>);
}

/// Value a key held before a journaled write. `None` means absent.
#[derive(Debug, Clone, Copy)]
enum JournalEntry {
    Balance {
        key: (Address, Address),
        previous: Option<U256>,
    },
    Allowance {
        key: (Address, Address, Address),
        previous: Option<U256>,
    },
}

#[derive(Debug, Default)]
struct LedgerState {
    /// (token, holder) -> balance
    balances: HashMap<(Address, Address), U256>,
    /// (token, owner, spender) -> allowance
    allowances: HashMap<(Address, Address, Address), U256>,
    /// Undo records, oldest first. Only kept while a session is open.
    journal: Vec<JournalEntry>,
    /// Open checkpoints on the session thread.
    sessions: usize,
}

impl LedgerState {
    fn balance(&self, token: Address, holder: Address) -> U256 {
        self.balances
            .get(&(token, holder))
            .copied()
            .unwrap_or(U256::ZERO)
    }

    fn allowance(&self, token: Address, owner: Address, spender: Address) -> U256 {
        self.allowances
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or(U256::ZERO)
    }

    fn set_balance(&mut self, token: Address, holder: Address, amount: U256) {
        let key = (token, holder);
        let previous = self.balances.insert(key, amount);
        if self.sessions > 0 {
            self.journal.push(JournalEntry::Balance { key, previous });
        }
    }

    fn set_allowance(&mut self, token: Address, owner: Address, spender: Address, amount: U256) {
        let key = (token, owner, spender);
        let previous = self.allowances.insert(key, amount);
        if self.sessions > 0 {
            self.journal.push(JournalEntry::Allowance { key, previous });
        }
    }

    /// Replay the journal backwards down to `mark`.
    fn rollback(&mut self, mark: usize) {
        let mark = mark.min(self.journal.len());
        for entry in self.journal.drain(mark..).rev() {
            match entry {
                JournalEntry::Balance { key, previous } => match previous {
                    Some(amount) => {
                        self.balances.insert(key, amount);
                    }
                    None => {
                        self.balances.remove(&key);
                    }
                },
                JournalEntry::Allowance { key, previous } => match previous {
                    Some(amount) => {
                        self.allowances.insert(key, amount);
                    }
                    None => {
                        self.allowances.remove(&key);
                    }
                },
            }
        }
    }

    /// Debit `from`, credit `to`. Validates everything before mutating.
    fn move_tokens(&mut self, token: Address, from: Address, to: Address, amount: U256) -> Result<()> {
        if to.is_zero() {
            return Err(SwaplockError::ZeroAddress {
                token,
                role: "recipient",
            });
        }

        let from_balance = self.balance(token, from);
        if from_balance < amount {
            return Err(SwaplockError::InsufficientBalance {
                token,
                needed: amount,
                available: from_balance,
            });
        }
        if from == to || amount.is_zero() {
            return Ok(());
        }

        let to_balance = self
            .balance(token, to)
            .checked_add(amount)
            .ok_or(SwaplockError::BalanceOverflow { token })?;

        self.set_balance(token, from, from_balance - amount);
        self.set_balance(token, to, to_balance);
        Ok(())
    }
}

/// In-process multi-token ledger.
///
/// Stands in for the token contracts of a real chain. Interior mutability
/// lets the engine, the venues, and test harnesses share one instance.
#[derive(Debug, Default)]
pub struct MemoryTokenLedger {
    /// Held by the checkpointing thread for the life of a session, and
    /// briefly by every operation.
    session: ReentrantMutex<()>,
    state: Mutex<LedgerState>,
}

/// Open session on a [`MemoryTokenLedger`].
#[derive(Debug)]
#[must_use = "dropping a checkpoint keeps every write made since it was taken"]
pub struct LedgerCheckpoint<'a> {
    ledger: &'a MemoryTokenLedger,
    mark: usize,
    _session: ReentrantMutexGuard<'a, ()>,
}

impl Drop for LedgerCheckpoint<'_> {
    fn drop(&mut self) {
        let mut state = self.ledger.state.lock();
        state.sessions = state.sessions.saturating_sub(1);
        if state.sessions == 0 {
            state.journal.clear();
        }
    }
}

impl MemoryTokenLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `amount` new units of `token` for `to`.
    ///
    /// # Errors
    /// Returns `BalanceOverflow` if the credit would exceed 256 bits, or
    /// `ZeroAddress` when minting to the zero address.
    pub fn mint(&self, token: Address, to: Address, amount: U256) -> Result<()> {
        if to.is_zero() {
            return Err(SwaplockError::ZeroAddress {
                token,
                role: "recipient",
            });
        }
        let _session = self.session.lock();
        let mut state = self.state.lock();
        let credited = state
            .balance(token, to)
            .checked_add(amount)
            .ok_or(SwaplockError::BalanceOverflow { token })?;
        state.set_balance(token, to, credited);
        Ok(())
    }

    /// Sum of all balances of `token`.
    #[must_use]
    pub fn total_supply(&self, token: Address) -> U256 {
        let _session = self.session.lock();
        self.state
            .lock()
            .balances
            .iter()
            .filter(|((t, _), _)| *t == token)
            .fold(U256::ZERO, |acc, (_, amount)| acc.saturating_add(*amount))
    }
}

impl TokenLedger for MemoryTokenLedger {
    type Checkpoint<'a>
        = LedgerCheckpoint<'a>
    where
        Self: 'a;

    fn balance_of(&self, token: Address, holder: Address) -> U256 {
        let _session = self.session.lock();
        self.state.lock().balance(token, holder)
    }

    fn allowance(&self, token: Address, owner: Address, spender: Address) -> U256 {
        let _session = self.session.lock();
        self.state.lock().allowance(token, owner, spender)
    }

    fn transfer(&self, token: Address, from: Address, to: Address, amount: U256) -> Result<()> {
        let _session = self.session.lock();
        self.state.lock().move_tokens(token, from, to, amount)
    }

    fn approve(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Result<()> {
        if spender.is_zero() {
            return Err(SwaplockError::ZeroAddress {
                token,
                role: "spender",
            });
        }
        let _session = self.session.lock();
        self.state
            .lock()
            .set_allowance(token, owner, spender, amount);
        Ok(())
    }

    fn transfer_from(
        &self,
        token: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<()> {
        let _session = self.session.lock();
        let mut state = self.state.lock();
        let allowed = state.allowance(token, from, spender);
        if allowed < amount {
            return Err(SwaplockError::InsufficientAuthorization {
                token,
                needed: amount,
                authorized: allowed,
            });
        }

        state.move_tokens(token, from, to, amount)?;

        // An unlimited allowance is never drawn down.
        if allowed != U256::MAX {
            state.set_allowance(token, from, spender, allowed - amount);
        }
        Ok(())
    }

    fn checkpoint(&self) -> LedgerCheckpoint<'_> {
        let session = self.session.lock();
        let mut state = self.state.lock();
        state.sessions += 1;
        LedgerCheckpoint {
            ledger: self,
            mark: state.journal.len(),
            _session: session,
        }
    }

    fn restore(&self, checkpoint: LedgerCheckpoint<'_>) {
        self.state.lock().rollback(checkpoint.mark);
        tracing::debug!(mark = checkpoint.mark, "Ledger restored to checkpoint");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::time::Duration;

    use super::*;

    fn token() -> Address {
        Address::repeat_byte(0x77)
    }

    fn alice() -> Address {
        Address::repeat_byte(0xa1)
    }

    fn bob() -> Address {
        Address::repeat_byte(0xb0)
    }

    fn units(n: u64) -> U256 {
        U256::from(n)
    }

    #[test]
    fn mint_credits_balance() {
        let ledger = MemoryTokenLedger::new();
        ledger.mint(token(), alice(), units(100)).unwrap();
        assert_eq!(ledger.balance_of(token(), alice()), units(100));
        assert_eq!(ledger.total_supply(token()), units(100));
    }

    #[test]
    fn transfer_moves_balance() {
        let ledger = MemoryTokenLedger::new();
        ledger.mint(token(), alice(), units(100)).unwrap();
        ledger.transfer(token(), alice(), bob(), units(40)).unwrap();
        assert_eq!(ledger.balance_of(token(), alice()), units(60));
        assert_eq!(ledger.balance_of(token(), bob()), units(40));
        assert_eq!(ledger.total_supply(token()), units(100));
    }

    #[test]
    fn transfer_insufficient_balance_fails_unchanged() {
        let ledger = MemoryTokenLedger::new();
        ledger.mint(token(), alice(), units(10)).unwrap();
        let err = ledger
            .transfer(token(), alice(), bob(), units(11))
            .unwrap_err();
        assert!(matches!(err, SwaplockError::InsufficientBalance { .. }));
        assert_eq!(ledger.balance_of(token(), alice()), units(10));
        assert_eq!(ledger.balance_of(token(), bob()), U256::ZERO);
    }

    #[test]
    fn transfer_to_zero_address_fails() {
        let ledger = MemoryTokenLedger::new();
        ledger.mint(token(), alice(), units(10)).unwrap();
        let err = ledger
            .transfer(token(), alice(), Address::ZERO, units(1))
            .unwrap_err();
        assert!(matches!(err, SwaplockError::ZeroAddress { .. }));
    }

    #[test]
    fn self_transfer_is_noop() {
        let ledger = MemoryTokenLedger::new();
        ledger.mint(token(), alice(), units(10)).unwrap();
        ledger.transfer(token(), alice(), alice(), units(10)).unwrap();
        assert_eq!(ledger.balance_of(token(), alice()), units(10));
    }

    #[test]
    fn transfer_from_draws_allowance() {
        let ledger = MemoryTokenLedger::new();
        ledger.mint(token(), alice(), units(100)).unwrap();
        ledger.approve(token(), alice(), bob(), units(30)).unwrap();
        ledger
            .transfer_from(token(), bob(), alice(), bob(), units(20))
            .unwrap();
        assert_eq!(ledger.allowance(token(), alice(), bob()), units(10));
        assert_eq!(ledger.balance_of(token(), bob()), units(20));
    }

    #[test]
    fn transfer_from_checks_allowance_before_balance() {
        let ledger = MemoryTokenLedger::new();
        // Alice has nothing at all AND has granted too little.
        ledger.approve(token(), alice(), bob(), units(1)).unwrap();
        let err = ledger
            .transfer_from(token(), bob(), alice(), bob(), units(5))
            .unwrap_err();
        assert!(matches!(
            err,
            SwaplockError::InsufficientAuthorization { .. }
        ));
    }

    #[test]
    fn transfer_from_insufficient_balance_keeps_allowance() {
        let ledger = MemoryTokenLedger::new();
        ledger.mint(token(), alice(), units(3)).unwrap();
        ledger.approve(token(), alice(), bob(), units(5)).unwrap();
        let err = ledger
            .transfer_from(token(), bob(), alice(), bob(), units(5))
            .unwrap_err();
        assert!(matches!(err, SwaplockError::InsufficientBalance { .. }));
        assert_eq!(ledger.allowance(token(), alice(), bob()), units(5));
    }

    #[test]
    fn unlimited_allowance_not_drawn_down() {
        let ledger = MemoryTokenLedger::new();
        ledger.mint(token(), alice(), units(100)).unwrap();
        ledger.approve(token(), alice(), bob(), U256::MAX).unwrap();
        ledger
            .transfer_from(token(), bob(), alice(), bob(), units(50))
            .unwrap();
        assert_eq!(ledger.allowance(token(), alice(), bob()), U256::MAX);
    }

    #[test]
    fn approve_zero_spender_fails() {
        let ledger = MemoryTokenLedger::new();
        let err = ledger
            .approve(token(), alice(), Address::ZERO, units(1))
            .unwrap_err();
        assert!(matches!(err, SwaplockError::ZeroAddress { .. }));
    }

    #[test]
    fn mint_overflow_fails() {
        let ledger = MemoryTokenLedger::new();
        ledger.mint(token(), alice(), U256::MAX).unwrap();
        let err = ledger.mint(token(), alice(), units(1)).unwrap_err();
        assert!(matches!(err, SwaplockError::BalanceOverflow { .. }));
    }

    #[test]
    fn restore_undoes_everything_since_checkpoint() {
        let ledger = MemoryTokenLedger::new();
        ledger.mint(token(), alice(), units(100)).unwrap();
        let checkpoint = ledger.checkpoint();

        ledger.transfer(token(), alice(), bob(), units(70)).unwrap();
        ledger.approve(token(), alice(), bob(), units(9)).unwrap();
        ledger.restore(checkpoint);

        assert_eq!(ledger.balance_of(token(), alice()), units(100));
        assert_eq!(ledger.balance_of(token(), bob()), U256::ZERO);
        assert_eq!(ledger.allowance(token(), alice(), bob()), U256::ZERO);
    }

    #[test]
    fn nested_restore_undoes_only_inner_writes() {
        let ledger = MemoryTokenLedger::new();
        ledger.mint(token(), alice(), units(100)).unwrap();

        let outer = ledger.checkpoint();
        ledger.transfer(token(), alice(), bob(), units(10)).unwrap();
        let inner = ledger.checkpoint();
        ledger.transfer(token(), alice(), bob(), units(20)).unwrap();
        ledger.approve(token(), alice(), bob(), units(5)).unwrap();

        ledger.restore(inner);
        assert_eq!(ledger.balance_of(token(), bob()), units(10));
        assert_eq!(ledger.allowance(token(), alice(), bob()), U256::ZERO);

        ledger.restore(outer);
        assert_eq!(ledger.balance_of(token(), alice()), units(100));
        assert_eq!(ledger.balance_of(token(), bob()), U256::ZERO);
    }

    #[test]
    fn dropped_checkpoint_keeps_writes() {
        let ledger = MemoryTokenLedger::new();
        ledger.mint(token(), alice(), units(100)).unwrap();

        let checkpoint = ledger.checkpoint();
        ledger.transfer(token(), alice(), bob(), units(30)).unwrap();
        drop(checkpoint);

        // A later session has nothing of its own to undo.
        let later = ledger.checkpoint();
        ledger.restore(later);
        assert_eq!(ledger.balance_of(token(), bob()), units(30));
        assert_eq!(ledger.total_supply(token()), units(100));
    }

    #[test]
    fn other_threads_wait_for_session_and_survive_restore() {
        let ledger = MemoryTokenLedger::new();
        let carol = Address::repeat_byte(0xc0);
        ledger.mint(token(), alice(), units(100)).unwrap();
        ledger.mint(token(), bob(), units(10)).unwrap();
        let (started_tx, started_rx) = mpsc::channel();
        let (done_tx, done_rx) = mpsc::channel();

        std::thread::scope(|s| {
            let checkpoint = ledger.checkpoint();
            ledger.transfer(token(), alice(), carol, units(70)).unwrap();

            s.spawn(|| {
                started_tx.send(()).unwrap();
                done_tx
                    .send(ledger.transfer(token(), bob(), carol, units(10)))
                    .unwrap();
            });
            started_rx.recv().unwrap();
            // Parked on the session, not rejected.
            assert!(done_rx.recv_timeout(Duration::from_millis(50)).is_err());

            ledger.restore(checkpoint);
            done_rx.recv().unwrap().unwrap();
        });

        assert_eq!(ledger.balance_of(token(), alice()), units(100));
        assert_eq!(ledger.balance_of(token(), bob()), U256::ZERO);
        assert_eq!(ledger.balance_of(token(), carol), units(10));
    }

    #[test]
    fn tokens_are_isolated() {
        let ledger = MemoryTokenLedger::new();
        let other = Address::repeat_byte(0xe1);
        ledger.mint(token(), alice(), units(5)).unwrap();
        assert_eq!(ledger.balance_of(other, alice()), U256::ZERO);
        assert_eq!(ledger.total_supply(other), U256::ZERO);
    }

    #[test]
    fn random_transfers_conserve_supply() {
        let ledger = MemoryTokenLedger::new();
        let holders: Vec<Address> = (1u8..=5).map(Address::repeat_byte).collect();
        for holder in &holders {
            ledger.mint(token(), *holder, units(1_000)).unwrap();
        }
        let (mut applied, mut refused) = (0u32, 0u32);
        for _ in 0..500 {
            let from = holders[rand::random::<usize>() % holders.len()];
            let to = holders[rand::random::<usize>() % holders.len()];
            let amount = units(rand::random::<u64>() % 400);
            match ledger.transfer(token(), from, to, amount) {
                Ok(()) => applied += 1,
                Err(SwaplockError::InsufficientBalance { .. }) => refused += 1,
                Err(err) => panic!("unexpected transfer error: {err}"),
            }
        }
        assert!(applied > 0, "no transfer applied ({refused} refused)");
        assert_eq!(applied + refused, 500);
        assert_eq!(ledger.total_supply(token()), units(5_000));
    }
}
