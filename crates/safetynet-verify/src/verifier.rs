//! Remote verification client
//!
//! Sends a signed statement to the verification service and interprets the
//! verdict. One network round trip per call; no retries, no verdict cache.

use miniserde::json::{Object, Value};
use miniserde::{Deserialize, Serialize};

use crate::config::VerifierConfig;
use crate::error::{Error, Result};
use crate::token::{VerifiedStatement, check_statement_length};
use crate::transport::{Transport, TransportError};
use crate::url::with_api_key;

/// Request body sent to the verification endpoint
#[derive(Debug, Clone, Serialize)]
pub(crate) struct VerificationRequest {
    #[serde(rename = "signedAttestation")]
    pub signed_attestation: String,
}

/// Response body of the verification endpoint
///
/// Unknown fields are ignored. `error` is either a plain message or an
/// object with a `message` field.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct VerificationResponse {
    #[serde(rename = "isValidSignature")]
    pub is_valid_signature: Option<bool>,

    pub error: Option<Value>,
}

impl VerificationResponse {
    /// Error message reported by the service, if any
    pub fn error_message(&self) -> Option<String> {
        let error = self.error.as_ref()?;
        let message = match error {
            Value::Null => return None,
            Value::String(message) => message.clone(),
            Value::Object(object) => object_message(object)
                .unwrap_or_else(|| miniserde::json::to_string(error)),
            other => miniserde::json::to_string(other),
        };
        Some(message)
    }
}

fn object_message(object: &Object) -> Option<String> {
    match object.get("message") {
        Some(Value::String(message)) if !message.is_empty() => Some(message.clone()),
        _ => None,
    }
}

/// Client for the remote verification service
///
/// Holds no mutable state; clones share the transport handle and can verify
/// independent statements concurrently.
#[derive(Debug, Clone)]
pub struct RemoteVerifier<T = reqwest::Client> {
    transport: T,
    config: VerifierConfig,
}

impl<T: Transport> RemoteVerifier<T> {
    /// Create a verifier from a caller-owned transport handle
    pub fn new(transport: T, config: VerifierConfig) -> Self {
        Self { transport, config }
    }

    /// The configuration this verifier sends requests with
    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Ask the verification service whether the statement's signature is valid
    ///
    /// Returns `Ok(false)` when the service rejects the signature without
    /// reporting an error. A reported error is `Error::Service` regardless of
    /// the verdict that came with it.
    pub async fn verify(&self, token: &str) -> Result<bool> {
        check_statement_length(token)?;

        let endpoint = self.config.endpoint().as_str();
        let request = VerificationRequest {
            signed_attestation: token.to_string(),
        };
        let body = miniserde::json::to_string(&request).into_bytes();
        let url = with_api_key(self.config.endpoint(), self.config.api_key());

        tracing::debug!(endpoint, "sending statement for verification");

        let limit = self.config.response_limit();
        let response = self
            .transport
            .post_json(&url, body, limit)
            .await
            .map_err(|e| match e {
                TransportError::Failed(reason) => network_error(endpoint, reason),
                TransportError::TooLarge { size } => too_large(endpoint, size, limit),
            })?;

        // Transports are asked to enforce the limit; not all of them do
        if response.body.len() > limit {
            return Err(too_large(endpoint, response.body.len(), limit));
        }

        let parsed = std::str::from_utf8(&response.body)
            .ok()
            .and_then(|body| miniserde::json::from_str::<VerificationResponse>(body).ok());

        let Some(parsed) = parsed else {
            return Err(network_error(
                endpoint,
                format!("http: status {}, unparsable response body", response.status),
            ));
        };

        if let Some(message) = parsed.error_message() {
            tracing::warn!(endpoint, status = response.status, %message, "verification service reported an error");
            return Err(Error::Service(message));
        }

        if !response.is_success() {
            return Err(network_error(
                endpoint,
                format!("http: status {}", response.status),
            ));
        }

        let verdict = parsed.is_valid_signature.unwrap_or(false);
        tracing::debug!(endpoint, verdict, "verification service responded");
        Ok(verdict)
    }

    /// Verify and hand out the statement only if its signature is valid
    pub async fn verify_statement(&self, token: &str) -> Result<VerifiedStatement> {
        if self.verify(token).await? {
            Ok(VerifiedStatement::new(token))
        } else {
            Err(Error::SignatureInvalid)
        }
    }
}

fn network_error(endpoint: &str, reason: String) -> Error {
    Error::Network {
        endpoint: endpoint.to_string(),
        reason,
    }
}

fn too_large(endpoint: &str, size: usize, max: usize) -> Error {
    Error::NetworkResponseTooLarge {
        endpoint: endpoint.to_string(),
        size,
        max,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{TransportFuture, TransportResponse};
    use std::sync::{Arc, Mutex};

    // Mock transport for testing
    #[derive(Clone, Default)]
    struct MockTransport {
        response: Option<TransportResponse>,
        requests: Arc<Mutex<Vec<(String, String)>>>,
        limits: Arc<Mutex<Vec<usize>>>,
    }

    impl MockTransport {
        fn replying(status: u16, body: &str) -> Self {
            Self {
                response: Some(TransportResponse {
                    status,
                    body: body.as_bytes().to_vec(),
                }),
                requests: Arc::default(),
                limits: Arc::default(),
            }
        }

        fn failing() -> Self {
            Self::default()
        }

        fn requests(&self) -> Vec<(String, String)> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl Transport for MockTransport {
        fn post_json<'a>(
            &'a self,
            url: &'a url::Url,
            body: Vec<u8>,
            max_body: usize,
        ) -> TransportFuture<'a> {
            self.requests
                .lock()
                .unwrap()
                .push((url.to_string(), String::from_utf8(body).unwrap()));
            self.limits.lock().unwrap().push(max_body);
            let response = self.response.clone();
            Box::pin(async move {
                response.ok_or_else(|| {
                    TransportError::Failed("network: connection refused".to_string())
                })
            })
        }
    }

    fn verifier(transport: MockTransport) -> RemoteVerifier<MockTransport> {
        let config = VerifierConfig::with_endpoint("https://verify.example.com/v1", "test-key").unwrap();
        RemoteVerifier::new(transport, config)
    }

    #[tokio::test]
    async fn test_valid_signature() {
        let transport = MockTransport::replying(200, r#"{"isValidSignature":true}"#);
        let verifier = verifier(transport.clone());

        assert_eq!(verifier.verify("a.b.c").await, Ok(true));

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, "https://verify.example.com/v1?key=test-key");
        assert_eq!(requests[0].1, r#"{"signedAttestation":"a.b.c"}"#);
    }

    #[tokio::test]
    async fn test_invalid_signature() {
        let verifier = verifier(MockTransport::replying(200, r#"{"isValidSignature":false}"#));
        assert_eq!(verifier.verify("a.b.c").await, Ok(false));
        assert_eq!(
            verifier.verify_statement("a.b.c").await,
            Err(Error::SignatureInvalid)
        );
    }

    #[tokio::test]
    async fn test_missing_verdict_is_invalid() {
        let verifier = verifier(MockTransport::replying(200, r#"{}"#));
        assert_eq!(verifier.verify("a.b.c").await, Ok(false));
    }

    #[tokio::test]
    async fn test_error_overrides_verdict() {
        let verifier = verifier(MockTransport::replying(
            200,
            r#"{"isValidSignature":true,"error":"invalid nonce"}"#,
        ));
        assert_eq!(
            verifier.verify("a.b.c").await,
            Err(Error::Service("invalid nonce".into()))
        );
    }

    #[tokio::test]
    async fn test_error_object_message() {
        let verifier = verifier(MockTransport::replying(
            400,
            r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT"}}"#,
        ));
        assert_eq!(
            verifier.verify("a.b.c").await,
            Err(Error::Service("API key not valid.".into()))
        );
    }

    #[tokio::test]
    async fn test_null_error_is_ignored() {
        let verifier = verifier(MockTransport::replying(
            200,
            r#"{"isValidSignature":true,"error":null,"extra":[1,2]}"#,
        ));
        assert_eq!(verifier.verify("a.b.c").await, Ok(true));
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let verifier = verifier(MockTransport::failing());
        let result = verifier.verify("a.b.c").await;
        assert_eq!(
            result,
            Err(Error::Network {
                endpoint: "https://verify.example.com/v1".into(),
                reason: "network: connection refused".into(),
            })
        );
    }

    #[tokio::test]
    async fn test_unparsable_body() {
        let verifier = verifier(MockTransport::replying(502, "<html>Bad Gateway</html>"));
        let result = verifier.verify("a.b.c").await;
        assert!(matches!(
            result,
            Err(Error::Network { reason, .. }) if reason.contains("502")
        ));
    }

    #[tokio::test]
    async fn test_non_success_without_error() {
        let verifier = verifier(MockTransport::replying(503, r#"{"isValidSignature":true}"#));
        let result = verifier.verify("a.b.c").await;
        assert!(matches!(
            result,
            Err(Error::Network { reason, .. }) if reason == "http: status 503"
        ));
    }

    #[tokio::test]
    async fn test_oversized_response() {
        let body = format!(r#"{{"isValidSignature":true,"pad":"{}"}}"#, "a".repeat(200));
        let config = VerifierConfig::with_endpoint("https://verify.example.com/v1", "test-key")
            .unwrap()
            .max_response_size(100);
        let verifier = RemoteVerifier::new(MockTransport::replying(200, &body), config);

        assert!(matches!(
            verifier.verify("a.b.c").await,
            Err(Error::NetworkResponseTooLarge { max: 100, .. })
        ));
    }

    #[tokio::test]
    async fn test_oversized_statement_not_sent() {
        let transport = MockTransport::replying(200, r#"{"isValidSignature":true}"#);
        let verifier = verifier(transport.clone());
        let token = "a".repeat(crate::limits::MAX_STATEMENT_LENGTH + 1);

        assert!(matches!(
            verifier.verify(&token).await,
            Err(Error::FormatTooLarge { .. })
        ));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_response_limit_passed_to_transport() {
        let transport = MockTransport::replying(200, r#"{"isValidSignature":true}"#);
        let config = VerifierConfig::with_endpoint("https://verify.example.com/v1", "test-key")
            .unwrap()
            .max_response_size(2048);
        let verifier = RemoteVerifier::new(transport.clone(), config);

        assert_eq!(verifier.config().response_limit(), 2048);
        assert_eq!(verifier.config().endpoint().as_str(), "https://verify.example.com/v1");

        verifier.verify("a.b.c").await.unwrap();
        assert_eq!(*transport.limits.lock().unwrap(), vec![2048]);
    }

    #[tokio::test]
    async fn test_transport_size_rejection() {
        struct Oversized;

        impl Transport for Oversized {
            fn post_json<'a>(
                &'a self,
                _url: &'a url::Url,
                _body: Vec<u8>,
                _max_body: usize,
            ) -> TransportFuture<'a> {
                Box::pin(async { Err(TransportError::TooLarge { size: 1_000_000 }) })
            }
        }

        let config = VerifierConfig::with_endpoint("https://verify.example.com/v1", "test-key")
            .unwrap()
            .max_response_size(100);
        let verifier = RemoteVerifier::new(Oversized, config);

        assert_eq!(
            verifier.verify("a.b.c").await,
            Err(Error::NetworkResponseTooLarge {
                endpoint: "https://verify.example.com/v1".into(),
                size: 1_000_000,
                max: 100,
            })
        );
    }

    #[test]
    fn test_request_serialization() {
        let request = VerificationRequest {
            signed_attestation: "x.y.z".into(),
        };
        assert_eq!(
            miniserde::json::to_string(&request),
            r#"{"signedAttestation":"x.y.z"}"#
        );
    }
}
