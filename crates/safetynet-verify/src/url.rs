//! URL validation utilities
//!
//! The verification endpoint is configured once and every statement is sent
//! to it, so it is checked up front for scheme, host and length.

use crate::error::{Error, Result};
use crate::limits::MAX_ENDPOINT_URL_LENGTH;

/// Parse and validate the verification endpoint URL
pub(crate) fn validate_endpoint_url(endpoint: &str) -> Result<url::Url> {
    if endpoint.trim().is_empty() {
        return Err(Error::ConfigurationInvalid(
            "endpoint URL cannot be empty".into(),
        ));
    }

    if endpoint.len() > MAX_ENDPOINT_URL_LENGTH {
        return Err(Error::ConfigurationInvalid(format!(
            "endpoint URL too long: {} characters (maximum: {MAX_ENDPOINT_URL_LENGTH} characters)",
            endpoint.len()
        )));
    }

    let parsed = endpoint
        .parse::<url::Url>()
        .map_err(|e| Error::ConfigurationInvalid(format!("invalid endpoint URL: {e}")))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(Error::ConfigurationInvalid(
            "endpoint URL must use http or https scheme".into(),
        ));
    }

    if parsed.host_str().is_none() {
        return Err(Error::ConfigurationInvalid(
            "endpoint URL must have a valid host".into(),
        ));
    }

    // The API key is appended per request; a key baked into the URL would leak into logs
    if parsed.query_pairs().any(|(name, _)| name == "key") {
        return Err(Error::ConfigurationInvalid(
            "endpoint URL must not carry the API key".into(),
        ));
    }

    Ok(parsed)
}

/// Build the request URL with the API key as `key` query parameter
pub(crate) fn with_api_key(endpoint: &url::Url, api_key: &str) -> url::Url {
    let mut url = endpoint.clone();
    url.query_pairs_mut().append_pair("key", api_key);
    url
}
