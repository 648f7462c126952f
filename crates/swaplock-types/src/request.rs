//! Swap request model and its wire codec.
//!
//! A request arrives as the Solidity ABI *parameter* encoding of
//!
//! ```text
//! (address sellToken, address buyToken, uint256 declaredAmount, bytes instructions)
//! ```
//!
//! which is exactly what an off-chain quote collaborator produces with
//! `AbiCoder.encode([...types], [...values])`. Field order is significant.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{SolType, sol_data};
use serde::{Deserialize, Serialize};

use crate::{Result, SwaplockError, constants};

/// ABI shape of the request blob.
type RequestParams = (
    sol_data::Address,
    sol_data::Address,
    sol_data::Uint<256>,
    sol_data::Bytes,
);

/// A decoded swap request. Lives only for the duration of one swap call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRequest {
    /// Token the caller is offering.
    pub sell_token: Address,
    /// Token the caller expects to receive.
    pub buy_token: Address,
    /// Amount of `sell_token` pulled from the caller.
    pub declared_amount: U256,
    /// Opaque venue call data, forwarded verbatim. May be empty.
    pub instructions: Bytes,
}

impl SwapRequest {
    /// Build a request from its four fields.
    #[must_use]
    pub fn new(
        sell_token: Address,
        buy_token: Address,
        declared_amount: U256,
        instructions: impl Into<Bytes>,
    ) -> Self {
        Self {
            sell_token,
            buy_token,
            declared_amount,
            instructions: instructions.into(),
        }
    }

    /// Decode a request blob without semantic validation.
    ///
    /// Decoding is strict: dirty padding or an out-of-range offset is
    /// rejected.
    ///
    /// # Errors
    /// Returns [`SwaplockError::MalformedRequest`] if the blob is not a valid
    /// encoding of the four request fields.
    pub fn decode(blob: &[u8]) -> Result<Self> {
        if blob.len() < constants::MIN_REQUEST_BLOB_LEN {
            return Err(SwaplockError::malformed(format!(
                "request blob is {} bytes, need at least {}",
                blob.len(),
                constants::MIN_REQUEST_BLOB_LEN
            )));
        }

        let (sell_token, buy_token, declared_amount, instructions) =
            RequestParams::abi_decode_params(blob, true)
                .map_err(|e| SwaplockError::malformed(format!("abi decode failed: {e}")))?;

        Ok(Self {
            sell_token,
            buy_token,
            declared_amount,
            instructions,
        })
    }

    /// Decode and validate a request blob.
    ///
    /// # Errors
    /// Returns [`SwaplockError::MalformedRequest`] on any decoding or
    /// validation failure.
    pub fn parse(blob: &[u8]) -> Result<Self> {
        let request = Self::decode(blob)?;
        request.validate()?;
        Ok(request)
    }

    /// Semantic checks that the ABI layer cannot express.
    ///
    /// # Errors
    /// Returns [`SwaplockError::MalformedRequest`] for a zero token address,
    /// identical sell/buy tokens, or a zero declared amount.
    pub fn validate(&self) -> Result<()> {
        if self.sell_token.is_zero() {
            return Err(SwaplockError::malformed("sell token is the zero address"));
        }
        if self.buy_token.is_zero() {
            return Err(SwaplockError::malformed("buy token is the zero address"));
        }
        if self.sell_token == self.buy_token {
            return Err(SwaplockError::malformed(
                "sell token and buy token are identical",
            ));
        }
        if self.declared_amount.is_zero() {
            return Err(SwaplockError::malformed("declared amount is zero"));
        }
        Ok(())
    }

    /// Encode this request into its wire form.
    #[must_use]
    pub fn encode(&self) -> Bytes {
        RequestParams::abi_encode_params(&(
            self.sell_token,
            self.buy_token,
            self.declared_amount,
            self.instructions.clone(),
        ))
        .into()
    }

    /// Whether the instruction blob is empty (an automatic venue no-op).
    #[must_use]
    pub fn has_instructions(&self) -> bool {
        !self.instructions.is_empty()
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl SwapRequest {
    /// A well-formed request between two fixed dummy tokens carrying random
    /// instruction bytes.
    #[must_use]
    pub fn dummy(declared_amount: U256) -> Self {
        let instructions: Vec<u8> = (0..36).map(|_| rand::random::<u8>()).collect();
        Self::new(
            Address::repeat_byte(0x11),
            Address::repeat_byte(0x22),
            declared_amount,
            instructions,
        )
    }
}
