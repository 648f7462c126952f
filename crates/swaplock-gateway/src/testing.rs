//! Venue contracts for tests and simulations.
//!
//! Instruction blobs for these venues are ABI-encoded `fillQuote` calls,
//! shaped like the call data an off-chain quote service would return.

use std::sync::Arc;

use alloy_sol_types::{SolCall, sol};
use swaplock_custody::TokenLedger;
use swaplock_types::{Address, Bytes, U256};

use crate::venue::{Venue, VenueCall, VenueRevert};

sol! {
    /// Sell exactly `amountIn` of `sellToken` for exactly `amountOut` of `buyToken`.
    function fillQuote(
        address sellToken,
        address buyToken,
        uint256 amountIn,
        uint256 amountOut
    ) external returns (uint256 amountInUsed, uint256 amountOutSent);
}

/// Encode a `fillQuote` instruction blob.
#[must_use]
pub fn fill_quote(sell_token: Address, buy_token: Address, amount_in: u64, amount_out: u64) -> Bytes {
    fill_quote_exact(
        sell_token,
        buy_token,
        U256::from(amount_in),
        U256::from(amount_out),
    )
}

/// Encode a `fillQuote` instruction blob with full-width amounts.
#[must_use]
pub fn fill_quote_exact(
    sell_token: Address,
    buy_token: Address,
    amount_in: U256,
    amount_out: U256,
) -> Bytes {
    fillQuoteCall {
        sellToken: sell_token,
        buyToken: buy_token,
        amountIn: amount_in,
        amountOut: amount_out,
    }
    .abi_encode()
    .into()
}

/// Fills a quote at exactly the encoded amounts, paying out of its own
/// inventory. Reverts if either leg cannot be completed.
pub struct FixedRateVenue<L: TokenLedger> {
    address: Address,
    ledger: Arc<L>,
}

impl<L: TokenLedger> FixedRateVenue<L> {
    #[must_use]
    pub fn new(address: Address, ledger: Arc<L>) -> Self {
        Self { address, ledger }
    }

    /// Run the quote and return the amounts actually moved.
    fn fill(&self, call: &VenueCall<'_>) -> Result<(U256, U256), VenueRevert> {
        let quote = fillQuoteCall::abi_decode(call.data, true)
            .map_err(|e| VenueRevert::new(format!("bad calldata: {e}")))?;

        self.ledger.transfer_from(
            quote.sellToken,
            self.address,
            call.sender,
            self.address,
            quote.amountIn,
        )?;
        self.ledger
            .transfer(quote.buyToken, self.address, call.sender, quote.amountOut)?;

        Ok((quote.amountIn, quote.amountOut))
    }
}

impl<L: TokenLedger> Venue for FixedRateVenue<L> {
    fn execute(&self, call: &VenueCall<'_>) -> Result<Bytes, VenueRevert> {
        let (used, sent) = self.fill(call)?;
        Ok(fillQuoteCall::abi_encode_returns(&(used, sent)).into())
    }
}

/// Always reverts with a fixed reason.
pub struct RevertingVenue {
    reason: String,
}

impl RevertingVenue {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Venue for RevertingVenue {
    fn execute(&self, _call: &VenueCall<'_>) -> Result<Bytes, VenueRevert> {
        Err(VenueRevert::new(self.reason.clone()))
    }
}

/// Fills like [`FixedRateVenue`] but returns made-up figures.
pub struct MisreportingVenue<L: TokenLedger> {
    inner: FixedRateVenue<L>,
    claimed_in: U256,
    claimed_out: U256,
}

impl<L: TokenLedger> MisreportingVenue<L> {
    #[must_use]
    pub fn new(inner: FixedRateVenue<L>, claimed_in: U256, claimed_out: U256) -> Self {
        Self {
            inner,
            claimed_in,
            claimed_out,
        }
    }
}

impl<L: TokenLedger> Venue for MisreportingVenue<L> {
    fn execute(&self, call: &VenueCall<'_>) -> Result<Bytes, VenueRevert> {
        self.inner.fill(call)?;
        Ok(fillQuoteCall::abi_encode_returns(&(self.claimed_in, self.claimed_out)).into())
    }
}
