//! # swaplock-types
//!
//! Shared types, errors, and configuration for the **SwapLock** escrow engine.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`SwapId`], [`EventDigest`], and the re-exported
//!   [`Address`] / [`U256`] / [`Bytes`] primitives
//! - **Request model**: [`SwapRequest`] and its ABI wire codec
//! - **Outcome model**: [`SwapOutcome`], [`SwapReceipt`], [`VenueFailure`]
//! - **Events**: [`ContractEvent`] and its payloads
//! - **Bridging**: [`BridgeDestination`] metadata carried by swaps
//! - **Configuration**: [`ExchangeConfig`], [`EngineConfig`]
//! - **Errors**: [`SwaplockError`] with `SL_ERR_` prefix codes
//! - **Constants**: system-wide names and defaults

pub mod config;
pub mod constants;
pub mod destination;
pub mod error;
pub mod event;
pub mod ids;
pub mod outcome;
pub mod request;

// Re-export all primary types at crate root for ergonomic imports:
//   use swaplock_types::{SwapRequest, SwapOutcome, ContractEvent, ...};

pub use config::*;
pub use destination::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use outcome::*;
pub use request::*;

pub use alloy_primitives::{Address, Bytes, U256};

// Constants are accessed via `swaplock_types::constants::FOO`
// (not re-exported to avoid name collisions).
