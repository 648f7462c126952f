//! # swaplock-engine
//!
//! The **SwapLock** custodial swap-and-lock engine.
//!
//! A caller authorizes the engine for some amount of a sell token and hands
//! it an ABI-encoded request. The engine pulls the declared amount into
//! custody, lets the configured venue try to trade it, and then either
//! settles (proceeds to the recipient) or locks (funds stay in custody for
//! the administrator to recover). Venue trouble never fails the call.
//!
//! - [`SwapEngine`]: swap execution, reads, administration, initialization
//! - [`RetainedLedger`]: per-token amounts held back from settled or locked
//!   swaps
//! - [`AuditLog`]: hash-chained record of every emitted event
//! - [`ReentrancyGuard`]: rejects calls back into the engine while a guarded
//!   operation is running
//!
//! ## Swap Lifecycle
//!
//! ```text
//!   decode ──▶ pull ──▶ gateway.forward ──┬─ success ─▶ SETTLED
//!     │          │                        │             proceeds → recipient
//!   fatal      fatal                      │             declared − consumed → retained
//!                                         └─ failure ─▶ LOCKED
//!                                                       declared → retained
//! ```
//!
//! Fatal errors restore the token ledger to its state at entry.

mod admin;
pub mod audit;
pub mod engine;
pub mod guard;
pub mod retained;

pub use audit::{AuditLog, AuditRecord};
pub use engine::SwapEngine;
pub use guard::{Entered, ReentrancyGuard};
pub use retained::RetainedLedger;
