//! Errors for safetynet-verify

use std::fmt;

use thiserror::Error;

/// Errors raised while verifying an attestation statement
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // ============================================================================
    // Network Errors
    // ============================================================================
    #[error("Network error while connecting to {endpoint}: {reason}")]
    Network { endpoint: String, reason: String },

    #[error("Verification response from {endpoint} too large: {size} bytes (maximum: {max} bytes)")]
    NetworkResponseTooLarge {
        endpoint: String,
        size: usize,
        max: usize,
    },

    // ============================================================================
    // Service Errors
    // ============================================================================
    #[error("The verification service encountered an error processing this request: {0}")]
    Service(String),

    // ============================================================================
    // Signature Errors
    // ============================================================================
    #[error("The cryptographic signature of the attestation statement couldn't be verified")]
    SignatureInvalid,

    // ============================================================================
    // Format Errors
    // ============================================================================
    #[error("Statement too large: {size} bytes (maximum: {max} bytes)")]
    FormatTooLarge { size: usize, max: usize },

    #[error("Illegal statement format: expected 3 segments separated by '.', found {found}")]
    FormatSegmentCount { found: usize },

    #[error("Illegal statement format: {segment} segment is empty")]
    FormatEmptySegment { segment: Segment },

    #[error("Base64URL decoding of {segment} segment failed: {reason}")]
    FormatInvalidBase64 { segment: Segment, reason: String },

    #[error("Decoded {segment} segment too large: {size} bytes (maximum: {max} bytes)")]
    FormatSegmentTooLarge {
        segment: Segment,
        size: usize,
        max: usize,
    },

    // ============================================================================
    // Parse Errors
    // ============================================================================
    #[error("Failed to parse the {0}")]
    ParseInvalidJson(String),

    #[error("Missing required field: {0}")]
    ParseMissingField(String),

    #[error("Field '{field}' has the wrong type: expected {expected}")]
    ParseInvalidField {
        field: String,
        expected: &'static str,
    },

    #[error("Base64 decoding of field '{field}' failed: {reason}")]
    ParseInvalidBase64 { field: String, reason: String },

    // ============================================================================
    // Validation Errors
    // ============================================================================
    #[error("Statement nonce does not match the request nonce")]
    ValidationNonceMismatch,

    #[error("Package name mismatch: expected '{expected}', found {found:?}")]
    ValidationPackageMismatch {
        expected: String,
        found: Option<String>,
    },

    #[error("APK digest does not match the expected digest")]
    ValidationApkDigestMismatch,

    #[error("None of the {found} APK certificate digests is allowed")]
    ValidationCertificateNotAllowed { found: usize },

    #[error("Statement too old: issued at {timestamp_ms} ms, max age {max_age_ms} ms (now: {now_ms} ms)")]
    ValidationTooOld {
        timestamp_ms: i64,
        now_ms: i64,
        max_age_ms: u64,
    },

    #[error("Statement issued in future at {timestamp_ms} ms (now: {now_ms} ms, skew: {skew_ms} ms)")]
    ValidationIssuedInFuture {
        timestamp_ms: i64,
        now_ms: i64,
        skew_ms: u64,
    },

    #[error("Device does not match a compatible CTS profile")]
    ValidationCtsProfileMismatch,

    #[error("Device failed basic integrity checks")]
    ValidationBasicIntegrity,

    #[error("Clock skew too large: {value} ms (maximum: {max} ms)")]
    ValidationClockSkewTooLarge { value: u64, max: u64 },

    #[error("Max age too large: {value} ms (maximum: {max} ms)")]
    ValidationMaxAgeTooLarge { value: u64, max: u64 },

    #[error("Integer overflow in timestamp arithmetic")]
    ValidationTimestampOverflow,

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Invalid configuration: {0}")]
    ConfigurationInvalid(String),
}

impl Error {
    /// The failure category a caller can branch on
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Network { .. } | Error::NetworkResponseTooLarge { .. } => ErrorKind::Network,
            Error::Service(_) => ErrorKind::Service,
            Error::SignatureInvalid => ErrorKind::InvalidSignature,
            Error::FormatTooLarge { .. }
            | Error::FormatSegmentCount { .. }
            | Error::FormatEmptySegment { .. }
            | Error::FormatInvalidBase64 { .. }
            | Error::FormatSegmentTooLarge { .. } => ErrorKind::Format,
            Error::ParseInvalidJson(_)
            | Error::ParseMissingField(_)
            | Error::ParseInvalidField { .. }
            | Error::ParseInvalidBase64 { .. } => ErrorKind::Parse,
            Error::ValidationNonceMismatch
            | Error::ValidationPackageMismatch { .. }
            | Error::ValidationApkDigestMismatch
            | Error::ValidationCertificateNotAllowed { .. }
            | Error::ValidationTooOld { .. }
            | Error::ValidationIssuedInFuture { .. }
            | Error::ValidationCtsProfileMismatch
            | Error::ValidationBasicIntegrity
            | Error::ValidationClockSkewTooLarge { .. }
            | Error::ValidationMaxAgeTooLarge { .. }
            | Error::ValidationTimestampOverflow => ErrorKind::Validation,
            Error::ConfigurationInvalid(_) => ErrorKind::Configuration,
        }
    }
}

/// Tagged failure reason of a verification attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Endpoint unreachable or response not usable
    Network,
    /// Endpoint explicitly reported a processing error
    Service,
    /// Endpoint reported the signature as not valid
    InvalidSignature,
    /// Statement is not three Base64URL segments
    Format,
    /// Payload is missing fields or has mismatched types
    Parse,
    /// Claims were rejected by a `StatementValidation`
    Validation,
    /// Verifier configuration is unusable
    Configuration,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Network => "NetworkError",
            ErrorKind::Service => "ServiceError",
            ErrorKind::InvalidSignature => "InvalidSignature",
            ErrorKind::Format => "FormatError",
            ErrorKind::Parse => "ParseError",
            ErrorKind::Validation => "ValidationError",
            ErrorKind::Configuration => "ConfigurationError",
        };
        f.write_str(name)
    }
}

/// Segment of a compact signed statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Header,
    Payload,
    Signature,
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Header => f.write_str("header"),
            Segment::Payload => f.write_str("payload"),
            Segment::Signature => f.write_str("signature"),
        }
    }
}

/// Result type alias for safetynet-verify operations
pub type Result<T> = std::result::Result<T, Error>;
