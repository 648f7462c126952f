//! System-wide constants for the SwapLock escrow engine.

/// Number of fields in an ABI-encoded swap request.
pub const REQUEST_FIELD_COUNT: usize = 4;

/// Size of one ABI word in bytes.
pub const ABI_WORD_SIZE: usize = 32;

/// Smallest well-formed request blob: four head words plus the length word
/// of the (possibly empty) instruction bytes.
pub const MIN_REQUEST_BLOB_LEN: usize = (REQUEST_FIELD_COUNT + 1) * ABI_WORD_SIZE;

/// Digest that seeds the audit log hash chain.
pub const AUDIT_GENESIS_DIGEST: [u8; 32] = [0u8; 32];

/// Initial capacity reserved for the in-memory audit log.
pub const DEFAULT_AUDIT_CAPACITY: usize = 1024;

/// Longest accepted bridge destination field, in bytes.
pub const MAX_DESTINATION_FIELD_LEN: usize = 128;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "SwapLock";
