//! Validation of decoded attestation claims
//!
//! A valid signature only proves the statement came from the attestation
//! service. Whether it answers *this* request is up to the caller: compare
//! the nonce, package name, timestamp and digests against what was expected.

use std::time::{SystemTime, UNIX_EPOCH};

use constant_time_eq::constant_time_eq;

use crate::error::{Error, Result};
use crate::limits::{MAX_CLOCK_SKEW_MS, MAX_MAX_AGE_MS};
use crate::statement::AttestationClaims;

/// Configuration for claims validation
///
/// The default performs no checks.
#[derive(Debug, Clone, Default)]
pub struct StatementValidation {
    expected_nonce: Option<Vec<u8>>,
    expected_package_name: Option<String>,
    expected_apk_digest: Option<Vec<u8>>,
    allowed_certificate_digests: Vec<Vec<u8>>,
    max_age_ms: Option<u64>,
    clock_skew_ms: u64,
    require_cts_profile_match: bool,
    require_basic_integrity: bool,
}

impl StatementValidation {
    /// Create a new validation config with no checks
    pub fn new() -> Self {
        Self::default()
    }

    /// Require the statement nonce to equal the request nonce
    pub fn expect_nonce(mut self, nonce: impl AsRef<[u8]>) -> Self {
        self.expected_nonce = Some(nonce.as_ref().to_vec());
        self
    }

    /// Require a specific calling package
    pub fn expect_package_name(mut self, name: impl Into<String>) -> Self {
        self.expected_package_name = Some(name.into());
        self
    }

    /// Require the SHA-256 digest of the calling APK
    pub fn expect_apk_digest(mut self, digest: impl AsRef<[u8]>) -> Self {
        self.expected_apk_digest = Some(digest.as_ref().to_vec());
        self
    }

    /// Allow an APK signing certificate by its SHA-256 digest
    ///
    /// Once any digest is allowed, at least one of the reported certificate
    /// digests must be in the allowed set.
    pub fn allow_certificate_digest(mut self, digest: impl AsRef<[u8]>) -> Self {
        self.allowed_certificate_digests
            .push(digest.as_ref().to_vec());
        self
    }

    /// Set maximum statement age
    ///
    /// Enables timestamp checks: statements older than `ms`, or stamped in
    /// the future beyond the clock skew, are rejected.
    ///
    /// # Security
    /// Limited to one day; larger values are rejected during validation.
    pub fn max_age_ms(mut self, ms: u64) -> Self {
        self.max_age_ms = Some(ms);
        self
    }

    /// Set clock skew tolerance for statements stamped in the future
    ///
    /// Only used together with [`Self::max_age_ms`].
    ///
    /// # Security
    /// Limited to five minutes; larger values are rejected during validation.
    pub fn clock_skew_ms(mut self, ms: u64) -> Self {
        self.clock_skew_ms = ms;
        self
    }

    /// Reject devices without a CTS profile match
    pub fn require_cts_profile_match(mut self) -> Self {
        self.require_cts_profile_match = true;
        self
    }

    /// Reject devices that failed basic integrity
    pub fn require_basic_integrity(mut self) -> Self {
        self.require_basic_integrity = true;
        self
    }
}

/// Validate claims according to configuration
pub(crate) fn validate_statement(
    claims: &AttestationClaims,
    config: &StatementValidation,
) -> Result<()> {
    validate_statement_at(claims, config, current_timestamp_ms())
}

fn validate_statement_at(
    claims: &AttestationClaims,
    config: &StatementValidation,
    now_ms: i64,
) -> Result<()> {
    // Validate configuration bounds to prevent security bypass
    if config.clock_skew_ms > MAX_CLOCK_SKEW_MS {
        return Err(Error::ValidationClockSkewTooLarge {
            value: config.clock_skew_ms,
            max: MAX_CLOCK_SKEW_MS,
        });
    }
    if let Some(max_age) = config.max_age_ms {
        if max_age > MAX_MAX_AGE_MS {
            return Err(Error::ValidationMaxAgeTooLarge {
                value: max_age,
                max: MAX_MAX_AGE_MS,
            });
        }
    }

    if let Some(expected) = &config.expected_nonce {
        let nonce = claims.nonce()?;
        if !constant_time_eq(&nonce, expected) {
            return Err(Error::ValidationNonceMismatch);
        }
    }

    if let Some(expected) = &config.expected_package_name {
        if claims.apk_package_name() != Some(expected.as_str()) {
            return Err(Error::ValidationPackageMismatch {
                expected: expected.clone(),
                found: claims.apk_package_name().map(ToString::to_string),
            });
        }
    }

    if let Some(expected) = &config.expected_apk_digest {
        match claims.apk_digest_sha256()? {
            Some(digest) if constant_time_eq(&digest, expected) => {}
            _ => return Err(Error::ValidationApkDigestMismatch),
        }
    }

    if !config.allowed_certificate_digests.is_empty() {
        let reported = claims.apk_certificate_digests_sha256()?;
        let allowed = reported.iter().any(|digest| {
            config
                .allowed_certificate_digests
                .iter()
                .any(|candidate| constant_time_eq(digest, candidate))
        });
        if !allowed {
            return Err(Error::ValidationCertificateNotAllowed {
                found: reported.len(),
            });
        }
    }

    if let Some(max_age) = config.max_age_ms {
        let timestamp_ms = claims.timestamp_ms();

        let now_with_skew = now_ms
            .checked_add(config.clock_skew_ms as i64)
            .ok_or(Error::ValidationTimestampOverflow)?;
        if timestamp_ms > now_with_skew {
            return Err(Error::ValidationIssuedInFuture {
                timestamp_ms,
                now_ms,
                skew_ms: config.clock_skew_ms,
            });
        }

        let expires_at = timestamp_ms
            .checked_add(max_age as i64)
            .ok_or(Error::ValidationTimestampOverflow)?;
        if now_ms > expires_at {
            return Err(Error::ValidationTooOld {
                timestamp_ms,
                now_ms,
                max_age_ms: max_age,
            });
        }
    }

    if config.require_cts_profile_match && !claims.cts_profile_match() {
        return Err(Error::ValidationCtsProfileMismatch);
    }

    if config.require_basic_integrity && !claims.basic_integrity() {
        return Err(Error::ValidationBasicIntegrity);
    }

    Ok(())
}

/// Get current Unix timestamp in milliseconds
fn current_timestamp_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
