//! Size limit constants for input validation

/// Maximum length for a signed statement string (64KB)
/// Statements embed a certificate chain in the header, typically 5-10KB
pub(crate) const MAX_STATEMENT_LENGTH: usize = 64 * 1024;

/// Maximum length for the verification endpoint URL (2048 characters)
pub(crate) const MAX_ENDPOINT_URL_LENGTH: usize = 2048;

/// Default maximum size for a verification response body (64KB)
pub(crate) const DEFAULT_MAX_RESPONSE_SIZE: usize = 64 * 1024;

// ============================================================================
// Decoded segment size limits
// ============================================================================

/// Maximum size for decoded statement header JSON (32KB)
/// Headers carry the `x5c` certificate chain, so they are larger than plain JWT headers
pub(crate) const MAX_DECODED_HEADER_SIZE: usize = 32 * 1024;

/// Maximum size for decoded statement payload JSON (32KB)
pub(crate) const MAX_DECODED_PAYLOAD_SIZE: usize = 32 * 1024;

/// Maximum size for decoded signature bytes (1KB)
/// RSA signatures are typically 256-512 bytes
pub(crate) const MAX_DECODED_SIGNATURE_SIZE: usize = 1024;

// ============================================================================
// Claim field limits
// ============================================================================

/// Maximum size for any decoded Base64 claim field (4KB)
pub(crate) const MAX_DECODED_FIELD_SIZE: usize = 4 * 1024;

// ============================================================================
// Validation bounds
// ============================================================================

/// Maximum clock skew tolerance (300000 ms = 5 minutes)
pub(crate) const MAX_CLOCK_SKEW_MS: u64 = 5 * 60 * 1000;

/// Maximum statement age (86400000 ms = 1 day)
pub(crate) const MAX_MAX_AGE_MS: u64 = 24 * 60 * 60 * 1000;

// ============================================================================
// Nonce sizes
// ============================================================================

/// Random bytes in a request nonce by default
pub(crate) const DEFAULT_NONCE_RANDOM_LEN: usize = 24;

/// Minimum random bytes accepted for a request nonce
pub(crate) const MIN_NONCE_RANDOM_LEN: usize = 16;
