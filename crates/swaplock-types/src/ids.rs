//! Identifiers used throughout SwapLock.
//!
//! Swaps use UUIDv7 for time-ordered lexicographic sorting. Audit records
//! are identified by the SHA-256 digest that links them into the log chain.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// SwapId
// ---------------------------------------------------------------------------

/// Unique identifier for one `execute_swap` invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct SwapId(pub Uuid);

impl SwapId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Extract the embedded timestamp (milliseconds since UNIX epoch) from UUIDv7.
    #[must_use]
    pub fn timestamp_ms(&self) -> u64 {
        let bytes = self.0.as_bytes();
        u64::from_be_bytes([
            0, 0, bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5],
        ])
    }
}

impl Default for SwapId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SwapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "swap:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// EventDigest
// ---------------------------------------------------------------------------

/// SHA-256 digest linking an audit record to its predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventDigest(pub [u8; 32]);

impl EventDigest {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// First four bytes, hex encoded. Handy in log lines.
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for EventDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_ids_are_unique() {
        let a = SwapId::new();
        let b = SwapId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn swap_ids_are_time_ordered() {
        let a = SwapId::new();
        let b = SwapId::new();
        assert!(a <= b);
        assert!(a.timestamp_ms() > 0);
    }

    #[test]
    fn swap_id_display_has_prefix() {
        assert!(SwapId::new().to_string().starts_with("swap:"));
    }

    #[test]
    fn digest_display_is_hex() {
        let digest = EventDigest([0xab; 32]);
        assert_eq!(digest.to_string().len(), 64);
        assert_eq!(digest.short(), "abababab");
    }
}
