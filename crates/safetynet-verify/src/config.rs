//! Verifier configuration

use std::fmt;

use crate::error::{Error, Result};
use crate::limits::DEFAULT_MAX_RESPONSE_SIZE;
use crate::url::validate_endpoint_url;

/// Default verification endpoint of the Android Device Verification API
pub const DEFAULT_ENDPOINT: &str = "https://www.googleapis.com/androidcheck/v1/attestations/verify";

/// Environment variable holding the API key
pub const ENV_API_KEY: &str = "SAFETYNET_API_KEY";

/// Environment variable overriding the verification endpoint
pub const ENV_ENDPOINT: &str = "SAFETYNET_VERIFY_ENDPOINT";

/// Where and how statements are sent for verification
#[derive(Clone)]
pub struct VerifierConfig {
    endpoint: url::Url,
    api_key: String,
    max_response_size: usize,
}

impl VerifierConfig {
    /// Configuration for the default endpoint
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_endpoint(DEFAULT_ENDPOINT, api_key)
    }

    /// Configuration for a custom endpoint
    ///
    /// The endpoint must be an http(s) URL without a `key` query parameter.
    pub fn with_endpoint(endpoint: &str, api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::ConfigurationInvalid("API key cannot be empty".into()));
        }

        Ok(Self {
            endpoint: validate_endpoint_url(endpoint)?,
            api_key,
            max_response_size: DEFAULT_MAX_RESPONSE_SIZE,
        })
    }

    /// Read `SAFETYNET_API_KEY` and optionally `SAFETYNET_VERIFY_ENDPOINT`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`Self::from_env`], with a custom variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(ENV_API_KEY)
            .ok_or_else(|| Error::ConfigurationInvalid(format!("{ENV_API_KEY} is not set")))?;

        match lookup(ENV_ENDPOINT) {
            Some(endpoint) => Self::with_endpoint(&endpoint, api_key),
            None => Self::new(api_key),
        }
    }

    /// Limit the accepted response body size
    pub fn max_response_size(mut self, bytes: usize) -> Self {
        self.max_response_size = bytes;
        self
    }

    /// The endpoint, without the API key
    pub fn endpoint(&self) -> &url::Url {
        &self.endpoint
    }

    pub(crate) fn api_key(&self) -> &str {
        &self.api_key
    }

    pub(crate) fn response_limit(&self) -> usize {
        self.max_response_size
    }
}

impl fmt::Debug for VerifierConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerifierConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &"<redacted>")
            .field("max_response_size", &self.max_response_size)
            .finish()
    }
}
