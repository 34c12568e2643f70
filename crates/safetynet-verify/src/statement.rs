//! Attestation statement claims
//!
//! The payload of a verified statement is a JSON object:
//!
//! ```json
//! {
//!   "nonce": "R2Rra24vRmVtWVJW...",
//!   "timestampMs": 9860437986543,
//!   "apkPackageName": "com.package.name.of.requesting.app",
//!   "apkCertificateDigestSha256": ["base64 encoded, SHA-256 hash of the certificate"],
//!   "apkDigestSha256": "base64 encoded, SHA-256 hash of the APK",
//!   "ctsProfileMatch": true,
//!   "basicIntegrity": true,
//!   "evaluationType": "BASIC"
//! }
//! ```
//!
//! Base64 fields are kept in their encoded form and decoded on access, so a
//! malformed digest only fails the caller that actually reads it.

use miniserde::json::{Number, Object, Value};

use crate::error::{Error, Result};
use crate::limits::MAX_DECODED_FIELD_SIZE;
use crate::utils::base64url;

/// Types that can be decoded from a statement payload
///
/// Decoding a payload says nothing about its authenticity. The verification
/// pipeline only calls this after the remote verifier accepted the signature.
pub trait FromPayload: Sized {
    /// Decode from the raw payload JSON bytes
    fn from_payload(payload: &[u8]) -> Result<Self>;
}

/// Claims of a device attestation statement
#[derive(Debug, Clone, PartialEq)]
pub struct AttestationClaims {
    nonce: String,
    timestamp_ms: i64,
    apk_package_name: Option<String>,
    apk_digest_sha256: Option<String>,
    apk_certificate_digest_sha256: Vec<String>,
    cts_profile_match: bool,
    basic_integrity: bool,
    evaluation_type: Option<String>,
    advice: Option<String>,
}

impl FromPayload for AttestationClaims {
    fn from_payload(payload: &[u8]) -> Result<Self> {
        let json = std::str::from_utf8(payload)
            .map_err(|e| Error::ParseInvalidJson(format!("payload: invalid UTF-8: {e}")))?;

        let value: Value = miniserde::json::from_str(json)
            .map_err(|_| Error::ParseInvalidJson("payload: not valid JSON".into()))?;

        let Value::Object(mut object) = value else {
            return Err(Error::ParseInvalidJson(
                "payload: expected a JSON object".into(),
            ));
        };

        Ok(Self {
            nonce: required(&mut object, "nonce", string)?,
            timestamp_ms: required(&mut object, "timestampMs", integer)?,
            apk_package_name: optional(&mut object, "apkPackageName", string)?,
            apk_digest_sha256: optional(&mut object, "apkDigestSha256", string)?,
            apk_certificate_digest_sha256: optional(
                &mut object,
                "apkCertificateDigestSha256",
                string_array,
            )?
            .unwrap_or_default(),
            cts_profile_match: required(&mut object, "ctsProfileMatch", boolean)?,
            basic_integrity: required(&mut object, "basicIntegrity", boolean)?,
            evaluation_type: optional(&mut object, "evaluationType", string)?,
            advice: optional(&mut object, "advice", string)?,
        })
    }
}

impl AttestationClaims {
    /// Decode a statement payload
    pub fn parse(payload: &[u8]) -> Result<Self> {
        Self::from_payload(payload)
    }

    /// The nonce submitted with the attestation request
    pub fn nonce(&self) -> Result<Vec<u8>> {
        decode_field("nonce", &self.nonce)
    }

    /// The nonce as it appears in the payload
    pub fn nonce_base64(&self) -> &str {
        &self.nonce
    }

    /// Milliseconds since the Unix epoch at which the attestation was made
    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp_ms
    }

    /// Package name of the calling APK, if the service could determine it
    pub fn apk_package_name(&self) -> Option<&str> {
        self.apk_package_name.as_deref()
    }

    /// SHA-256 digest of the calling APK
    pub fn apk_digest_sha256(&self) -> Result<Option<Vec<u8>>> {
        self.apk_digest_sha256
            .as_deref()
            .map(|digest| decode_field("apkDigestSha256", digest))
            .transpose()
    }

    /// SHA-256 digests of every certificate that signed the APK
    pub fn apk_certificate_digests_sha256(&self) -> Result<Vec<Vec<u8>>> {
        self.apk_certificate_digest_sha256
            .iter()
            .map(|digest| decode_field("apkCertificateDigestSha256", digest))
            .collect()
    }

    /// SHA-256 digest of the first signing certificate
    ///
    /// Devices may report several signing certificates. This only surfaces
    /// the first one; use [`Self::apk_certificate_digests_sha256`] to see all.
    pub fn apk_certificate_digest_sha256(&self) -> Result<Option<Vec<u8>>> {
        self.apk_certificate_digest_sha256
            .first()
            .map(|digest| decode_field("apkCertificateDigestSha256", digest))
            .transpose()
    }

    /// Whether the device matches a known-good compatibility profile
    pub fn cts_profile_match(&self) -> bool {
        self.cts_profile_match
    }

    /// Whether the device passed baseline integrity checks
    pub fn basic_integrity(&self) -> bool {
        self.basic_integrity
    }

    /// Evaluation kinds used to produce the verdict, e.g. `BASIC`, `HARDWARE_BACKED`
    pub fn evaluation_types(&self) -> impl Iterator<Item = &str> {
        split_list(self.evaluation_type.as_deref())
    }

    /// Suggested remediation when a check failed, e.g. `RESTORE_TO_FACTORY_ROM`
    pub fn advice(&self) -> impl Iterator<Item = &str> {
        split_list(self.advice.as_deref())
    }
}

fn split_list(value: Option<&str>) -> impl Iterator<Item = &str> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
}

fn decode_field(field: &str, value: &str) -> Result<Vec<u8>> {
    base64url::decode_field(value, MAX_DECODED_FIELD_SIZE).map_err(|e| {
        Error::ParseInvalidBase64 {
            field: field.to_string(),
            reason: e.to_string(),
        }
    })
}

// ============================================================================
// Field extraction
// ============================================================================

type Extract<T> = fn(&str, Value) -> Result<T>;

fn required<T>(object: &mut Object, field: &str, extract: Extract<T>) -> Result<T> {
    optional(object, field, extract)?.ok_or_else(|| Error::ParseMissingField(field.to_string()))
}

fn optional<T>(object: &mut Object, field: &str, extract: Extract<T>) -> Result<Option<T>> {
    match object.remove(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => extract(field, value).map(Some),
    }
}

fn mismatch(field: &str, expected: &'static str) -> Error {
    Error::ParseInvalidField {
        field: field.to_string(),
        expected,
    }
}

fn string(field: &str, value: Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s),
        _ => Err(mismatch(field, "string")),
    }
}

fn boolean(field: &str, value: Value) -> Result<bool> {
    match value {
        Value::Bool(b) => Ok(b),
        _ => Err(mismatch(field, "boolean")),
    }
}

fn integer(field: &str, value: Value) -> Result<i64> {
    match value {
        Value::Number(Number::I64(n)) => Ok(n),
        Value::Number(Number::U64(n)) => i64::try_from(n).map_err(|_| mismatch(field, "integer")),
        _ => Err(mismatch(field, "integer")),
    }
}

fn string_array(field: &str, value: Value) -> Result<Vec<String>> {
    let Value::Array(items) = value else {
        return Err(mismatch(field, "array of strings"));
    };
    items
        .into_iter()
        .map(|item| match item {
            Value::String(s) => Ok(s),
            _ => Err(mismatch(field, "array of strings")),
        })
        .collect()
}
