//! # swaplock-custody
//!
//! **Token Custody Adapter**: the leaf layer between the engine and the
//! external fungible-token ledger.
//!
//! ## Architecture
//!
//! 1. **TokenLedger**: the token contracts' surface (`transfer`,
//!    `transfer_from`, `approve`, `allowance`, `balance_of`) plus
//!    checkpoint/restore sessions so a reverted external call leaves no
//!    trace of its own writes
//! 2. **MemoryTokenLedger**: in-process multi-token ledger implementing it
//! 3. **CustodyAdapter**: the same operations seen from the engine's own
//!    custody address (pull from caller, push to recipient, grant/revoke)
//!
//! ```text
//! caller --approve--> engine --pull--> custody --grant--> venue
//!                                      custody --push--> recipient
//! ```

pub mod adapter;
pub mod ledger;

pub use adapter::CustodyAdapter;
pub use ledger::{LedgerCheckpoint, MemoryTokenLedger, TokenLedger};
