//! Request nonce generation
//!
//! The device includes the request nonce in the signed payload, which binds a
//! statement to a single request. A nonce is random bytes followed by
//! caller-chosen binding data (for example a user id and a timestamp).

use base64::{Engine, engine::general_purpose::STANDARD};
use rand::RngCore;
use rand::rngs::OsRng;

use crate::error::{Error, Result};
use crate::limits::{DEFAULT_NONCE_RANDOM_LEN, MIN_NONCE_RANDOM_LEN};

/// Nonce for a single attestation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestNonce {
    bytes: Vec<u8>,
}

impl RequestNonce {
    /// 24 random bytes followed by `binding`
    pub fn generate(binding: &[u8]) -> Self {
        Self::random(DEFAULT_NONCE_RANDOM_LEN, binding)
    }

    /// `random_len` random bytes followed by `binding`
    pub fn with_random_len(random_len: usize, binding: &[u8]) -> Result<Self> {
        if random_len < MIN_NONCE_RANDOM_LEN {
            return Err(Error::ConfigurationInvalid(format!(
                "nonce needs at least {MIN_NONCE_RANDOM_LEN} random bytes, got {random_len}"
            )));
        }
        Ok(Self::random(random_len, binding))
    }

    fn random(random_len: usize, binding: &[u8]) -> Self {
        let mut bytes = vec![0u8; random_len + binding.len()];
        OsRng.fill_bytes(&mut bytes[..random_len]);
        bytes[random_len..].copy_from_slice(binding);
        Self { bytes }
    }

    /// Raw nonce bytes, as passed to the on-device attestation request
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Standard Base64, the encoding used by the statement's `nonce` claim
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}

impl AsRef<[u8]> for RequestNonce {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}
