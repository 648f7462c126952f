//! Exchange gateway. Forwards instructions to the venue and measures the
//! result.
//!
//! The gateway never trusts the venue's return data. `consumed` and
//! `proceeds` are the custody balance deltas of the sell and buy tokens
//! across the call. A reverted call is rolled back on the ledger and
//! reported as a [`VenueFailure`], never as an error, so the engine can
//! apply lock semantics.

use std::sync::Arc;

use swaplock_custody::{CustodyAdapter, TokenLedger};
use swaplock_types::{Address, Bytes, Result, SwaplockError, U256, VenueFailure};

use crate::allowance::ScopedAllowance;
use crate::venue::{VenueCall, VenueRegistry};

/// What to forward, and to whom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardRequest {
    /// Venue address from the current exchange config.
    pub venue: Address,
    /// Custodied token the venue may draw.
    pub sell_token: Address,
    /// Token the venue is expected to deliver.
    pub buy_token: Address,
    /// Opaque instruction bytes.
    pub instructions: Bytes,
    /// Allowance granted to the venue for the duration of the call.
    pub max_spend: U256,
}

/// Measured result of one forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayResult {
    /// Sell-token balance that left custody during the call.
    pub consumed: U256,
    /// Buy-token balance that arrived in custody during the call.
    pub proceeds: U256,
    /// Why the forward failed. `None` means the venue executed.
    pub failure: Option<VenueFailure>,
}

impl GatewayResult {
    #[must_use]
    pub fn executed(consumed: U256, proceeds: U256) -> Self {
        Self {
            consumed,
            proceeds,
            failure: None,
        }
    }

    #[must_use]
    pub fn failed(failure: VenueFailure) -> Self {
        Self {
            consumed: U256::ZERO,
            proceeds: U256::ZERO,
            failure: Some(failure),
        }
    }

    /// Whether the venue executed successfully.
    #[must_use]
    pub fn success(&self) -> bool {
        self.failure.is_none()
    }
}

/// Forwards instruction blobs to venues on behalf of the engine's custody.
pub struct ExchangeGateway<L: TokenLedger> {
    custody: CustodyAdapter<L>,
    registry: Arc<VenueRegistry>,
}

impl<L: TokenLedger> ExchangeGateway<L> {
    #[must_use]
    pub fn new(custody: CustodyAdapter<L>, registry: Arc<VenueRegistry>) -> Self {
        Self { custody, registry }
    }

    /// The registry used to locate venues.
    #[must_use]
    pub fn registry(&self) -> &Arc<VenueRegistry> {
        &self.registry
    }

    /// Forward `request.instructions` to `request.venue`.
    ///
    /// Venue-side problems are reported inside the [`GatewayResult`].
    ///
    /// # Errors
    /// Only ledger failures on the engine's own allowance bookkeeping, or a
    /// venue drawing more than it was allowed, surface as errors. Both are
    /// internal faults.
    pub fn forward(&self, request: &ForwardRequest) -> Result<GatewayResult> {
        if request.instructions.is_empty() {
            tracing::warn!(venue = %request.venue, "Empty instructions; venue not called");
            return Ok(GatewayResult::failed(VenueFailure::EmptyInstructions));
        }
        if request.venue.is_zero() {
            tracing::warn!("Venue unset; venue not called");
            return Ok(GatewayResult::failed(VenueFailure::VenueUnset));
        }
        let Some(venue) = self.registry.get(request.venue) else {
            tracing::warn!(venue = %request.venue, "No contract deployed at venue");
            return Ok(GatewayResult::failed(VenueFailure::NoContract {
                venue: request.venue,
            }));
        };

        // Other threads stay off the ledger until the deltas are measured.
        let checkpoint = self.custody.checkpoint();
        let sell_before = self.custody.balance(request.sell_token);
        let buy_before = self.custody.balance(request.buy_token);

        let allowance = ScopedAllowance::grant(
            &self.custody,
            request.sell_token,
            request.venue,
            request.max_spend,
        )?;

        let call = VenueCall {
            sender: self.custody.custodian(),
            venue: request.venue,
            data: &request.instructions,
        };
        let outcome = venue.execute(&call);

        let session = if outcome.is_err() {
            self.custody.restore(checkpoint);
            None
        } else {
            Some(checkpoint)
        };
        allowance.release()?;

        // Control is back from untrusted code: re-measure.
        let sell_after = self.custody.balance(request.sell_token);
        let buy_after = self.custody.balance(request.buy_token);
        drop(session);
        let consumed = sell_before.saturating_sub(sell_after);
        let proceeds = buy_after.saturating_sub(buy_before);

        match outcome {
            Ok(returned) => {
                if consumed > request.max_spend {
                    return Err(SwaplockError::Internal(format!(
                        "venue {} drew {consumed} with an allowance of {}",
                        request.venue, request.max_spend
                    )));
                }
                tracing::debug!(
                    venue = %request.venue,
                    %consumed,
                    %proceeds,
                    returned_len = returned.len(),
                    "Venue executed"
                );
                Ok(GatewayResult::executed(consumed, proceeds))
            }
            Err(revert) => {
                tracing::warn!(
                    venue = %request.venue,
                    reason = %revert.reason,
                    "Venue reverted; ledger effects rolled back"
                );
                Ok(GatewayResult::failed(VenueFailure::Reverted {
                    reason: revert.reason,
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FixedRateVenue, MisreportingVenue, RevertingVenue, fill_quote};
    use crate::venue::{Venue, VenueRevert};
    use swaplock_custody::MemoryTokenLedger;

    const SELL: Address = Address::repeat_byte(0x77);
    const BUY: Address = Address::repeat_byte(0xe1);
    const ENGINE: Address = Address::repeat_byte(0xee);
    const VENUE: Address = Address::repeat_byte(0xde);

    struct Fixture {
        ledger: Arc<MemoryTokenLedger>,
        gateway: ExchangeGateway<MemoryTokenLedger>,
    }

    fn fixture() -> Fixture {
        let ledger = Arc::new(MemoryTokenLedger::new());
        ledger.mint(SELL, ENGINE, U256::from(100u64)).unwrap();
        ledger.mint(BUY, VENUE, U256::from(1_000u64)).unwrap();
        let custody = CustodyAdapter::new(Arc::clone(&ledger), ENGINE);
        let gateway = ExchangeGateway::new(custody, Arc::new(VenueRegistry::new()));
        Fixture { ledger, gateway }
    }

    fn request(instructions: Bytes, max_spend: u64) -> ForwardRequest {
        ForwardRequest {
            venue: VENUE,
            sell_token: SELL,
            buy_token: BUY,
            instructions,
            max_spend: U256::from(max_spend),
        }
    }

    fn deploy(fx: &Fixture, venue: Arc<dyn Venue>) {
        fx.gateway.registry().deploy(VENUE, venue).unwrap();
    }

    #[test]
    fn empty_instructions_short_circuit() {
        let fx = fixture();
        let result = fx.gateway.forward(&request(Bytes::new(), 10)).unwrap();
        assert_eq!(result.failure, Some(VenueFailure::EmptyInstructions));
        assert_eq!(fx.ledger.allowance(SELL, ENGINE, VENUE), U256::ZERO);
    }

    #[test]
    fn unset_venue_short_circuits() {
        let fx = fixture();
        let mut req = request(fill_quote(SELL, BUY, 10, 5), 10);
        req.venue = Address::ZERO;
        let result = fx.gateway.forward(&req).unwrap();
        assert_eq!(result.failure, Some(VenueFailure::VenueUnset));
    }

    #[test]
    fn missing_contract_fails() {
        let fx = fixture();
        let result = fx
            .gateway
            .forward(&request(fill_quote(SELL, BUY, 10, 5), 10))
            .unwrap();
        assert_eq!(result.failure, Some(VenueFailure::NoContract { venue: VENUE }));
    }

    #[test]
    fn executed_measures_deltas_and_revokes() {
        let fx = fixture();
        deploy(&fx, Arc::new(FixedRateVenue::new(VENUE, Arc::clone(&fx.ledger))));

        let result = fx
            .gateway
            .forward(&request(fill_quote(SELL, BUY, 10, 5), 10))
            .unwrap();
        assert!(result.success());
        assert_eq!(result.consumed, U256::from(10u64));
        assert_eq!(result.proceeds, U256::from(5u64));
        assert_eq!(fx.ledger.allowance(SELL, ENGINE, VENUE), U256::ZERO);
    }

    #[test]
    fn partial_draw_leaves_allowance_revoked() {
        let fx = fixture();
        deploy(&fx, Arc::new(FixedRateVenue::new(VENUE, Arc::clone(&fx.ledger))));

        let result = fx
            .gateway
            .forward(&request(fill_quote(SELL, BUY, 10, 5), 40))
            .unwrap();
        assert!(result.success());
        assert_eq!(result.consumed, U256::from(10u64));
        assert_eq!(fx.ledger.allowance(SELL, ENGINE, VENUE), U256::ZERO);
    }

    #[test]
    fn over_draw_attempt_reverts_and_rolls_back() {
        let fx = fixture();
        deploy(&fx, Arc::new(FixedRateVenue::new(VENUE, Arc::clone(&fx.ledger))));

        // Instructions target 30 but only 10 is allowed.
        let result = fx
            .gateway
            .forward(&request(fill_quote(SELL, BUY, 30, 5), 10))
            .unwrap();
        assert!(matches!(result.failure, Some(VenueFailure::Reverted { .. })));
        assert_eq!(result.consumed, U256::ZERO);
        assert_eq!(fx.ledger.balance_of(SELL, ENGINE), U256::from(100u64));
        assert_eq!(fx.ledger.allowance(SELL, ENGINE, VENUE), U256::ZERO);
    }

    #[test]
    fn revert_after_partial_effects_rolls_back() {
        let fx = fixture();
        // Venue has no BUY inventory for this amount: the sell leg applies,
        // then the buy leg fails and the whole call reverts.
        deploy(&fx, Arc::new(FixedRateVenue::new(VENUE, Arc::clone(&fx.ledger))));

        let result = fx
            .gateway
            .forward(&request(fill_quote(SELL, BUY, 10, 5_000), 10))
            .unwrap();
        assert!(!result.success());
        assert_eq!(fx.ledger.balance_of(SELL, ENGINE), U256::from(100u64));
        assert_eq!(fx.ledger.balance_of(SELL, VENUE), U256::ZERO);
        assert_eq!(fx.ledger.balance_of(BUY, VENUE), U256::from(1_000u64));
    }

    #[test]
    fn reverting_venue_reports_reason() {
        let fx = fixture();
        deploy(&fx, Arc::new(RevertingVenue::new("paused")));

        let result = fx
            .gateway
            .forward(&request(fill_quote(SELL, BUY, 10, 5), 10))
            .unwrap();
        assert_eq!(
            result.failure,
            Some(VenueFailure::Reverted {
                reason: "paused".into()
            })
        );
    }

    #[test]
    fn misreported_figures_are_ignored() {
        let fx = fixture();
        deploy(
            &fx,
            Arc::new(MisreportingVenue::new(
                FixedRateVenue::new(VENUE, Arc::clone(&fx.ledger)),
                U256::from(1u64),
                U256::from(999u64),
            )),
        );

        let result = fx
            .gateway
            .forward(&request(fill_quote(SELL, BUY, 10, 5), 10))
            .unwrap();
        assert_eq!(result.consumed, U256::from(10u64));
        assert_eq!(result.proceeds, U256::from(5u64));
    }

    struct GarbageVenue;

    impl Venue for GarbageVenue {
        fn execute(&self, _call: &VenueCall<'_>) -> std::result::Result<Bytes, VenueRevert> {
            Ok(Bytes::new())
        }
    }

    #[test]
    fn idle_venue_consumes_nothing() {
        let fx = fixture();
        deploy(&fx, Arc::new(GarbageVenue));

        let result = fx
            .gateway
            .forward(&request(Bytes::from(vec![0x01]), 10))
            .unwrap();
        assert!(result.success());
        assert_eq!(result.consumed, U256::ZERO);
        assert_eq!(result.proceeds, U256::ZERO);
    }
}
