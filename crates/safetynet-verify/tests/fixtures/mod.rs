//! Statement construction for tests
//!
//! Statements are assembled from JSON and Base64URL segments. The signature
//! segment is opaque bytes: the mock verification endpoint decides whether
//! it is valid.

#![allow(dead_code)]

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use serde_json::{Value, json};
use std::time::{SystemTime, UNIX_EPOCH};

pub const PACKAGE_NAME: &str = "com.example.attest";

/// Current time in milliseconds since the Unix epoch
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_millis() as i64
}

/// Builder for signed statements
#[derive(Debug, Clone)]
pub struct StatementBuilder {
    header: Value,
    claims: Value,
    signature: Vec<u8>,
}

impl StatementBuilder {
    /// A statement from a device passing every integrity check
    pub fn new(nonce: &[u8]) -> Self {
        Self {
            header: json!({ "alg": "RS256", "x5c": ["MIIFkjCCBHqgAwIBAgIR"] }),
            claims: json!({
                "nonce": STANDARD.encode(nonce),
                "timestampMs": now_ms(),
                "apkPackageName": PACKAGE_NAME,
                "apkDigestSha256": STANDARD.encode([0xAAu8; 32]),
                "apkCertificateDigestSha256": [STANDARD.encode([0xBBu8; 32])],
                "ctsProfileMatch": true,
                "basicIntegrity": true,
                "evaluationType": "BASIC,HARDWARE_BACKED",
            }),
            signature: b"signature-bytes".to_vec(),
        }
    }

    /// Set the timestamp claim
    pub fn timestamp_ms(mut self, ms: i64) -> Self {
        self.claims["timestampMs"] = json!(ms);
        self
    }

    /// Set the calling package
    pub fn package_name(mut self, name: &str) -> Self {
        self.claims["apkPackageName"] = json!(name);
        self
    }

    /// Replace the certificate digests
    pub fn certificate_digests(mut self, digests: &[&[u8]]) -> Self {
        let encoded: Vec<String> = digests.iter().map(|d| STANDARD.encode(d)).collect();
        self.claims["apkCertificateDigestSha256"] = json!(encoded);
        self
    }

    /// Device failed the compatibility check
    pub fn cts_failed(mut self) -> Self {
        self.claims["ctsProfileMatch"] = json!(false);
        self.claims["advice"] = json!("RESTORE_TO_FACTORY_ROM,LOCK_BOOTLOADER");
        self
    }

    /// Set an arbitrary claim
    pub fn claim(mut self, name: &str, value: Value) -> Self {
        self.claims[name] = value;
        self
    }

    /// Remove a claim
    pub fn without(mut self, name: &str) -> Self {
        if let Some(object) = self.claims.as_object_mut() {
            object.remove(name);
        }
        self
    }

    /// Assemble the compact statement
    pub fn build(&self) -> String {
        format!(
            "{}.{}.{}",
            encode_json(&self.header),
            encode_json(&self.claims),
            URL_SAFE_NO_PAD.encode(&self.signature)
        )
    }
}

fn encode_json(value: &Value) -> String {
    URL_SAFE_NO_PAD.encode(value.to_string())
}

/// Replace the payload segment of a statement
pub fn with_payload_segment(statement: &str, payload: &str) -> String {
    let mut segments: Vec<&str> = statement.split('.').collect();
    segments[1] = payload;
    segments.join(".")
}

/// Response body of the verification endpoint
pub fn verdict(valid: bool) -> String {
    json!({ "isValidSignature": valid }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_produces_three_segments() {
        let statement = StatementBuilder::new(b"nonce").build();
        assert_eq!(statement.split('.').count(), 3);
        assert!(!statement.contains('='));
    }
}
