//! # swaplock-gateway
//!
//! **Exchange Gateway**: forwards an opaque instruction blob to the external
//! venue and reports what actually happened.
//!
//! ## Architecture
//!
//! 1. **VenueRegistry**: which venue contract is deployed at which address
//! 2. **ScopedAllowance**: grants the venue a spending allowance and always
//!    revokes it on exit
//! 3. **ExchangeGateway**: short-circuits empty instructions and unset
//!    venues, isolates reverts, and derives `consumed` / `proceeds` from
//!    balance deltas rather than from anything the venue says
//!
//! ```text
//! checkpoint → measure → grant → venue.execute() → (restore on revert)
//!         → revoke → measure → GatewayResult
//! ```

pub mod allowance;
pub mod gateway;
#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;
pub mod venue;

pub use allowance::ScopedAllowance;
pub use gateway::{ExchangeGateway, ForwardRequest, GatewayResult};
pub use venue::{Venue, VenueCall, VenueRegistry, VenueRevert};
