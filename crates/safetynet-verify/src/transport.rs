//! HTTP transport for the verification endpoint
//!
//! The verifier does not own a global client. Callers pass a transport handle
//! into [`RemoteVerifier::new`](crate::RemoteVerifier::new); `reqwest::Client`
//! implements [`Transport`] out of the box, and tests can substitute their own.

use std::future::Future;
use std::pin::Pin;

use reqwest::header::CONTENT_TYPE;
use thiserror::Error;

/// Raw HTTP response from the verification endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body bytes
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Whether the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Why a transport could not produce a response
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Request could not be sent or the body could not be read
    ///
    /// Messages follow the pattern `"component: error description"` (e.g.
    /// `"network: connection refused"`) and must not contain the request
    /// URL, which carries the API key.
    #[error("{0}")]
    Failed(String),

    /// Response body exceeds the accepted size; `size` is the declared
    /// length or the number of bytes read before giving up
    #[error("response body too large: {size} bytes")]
    TooLarge { size: usize },
}

/// Future returned by [`Transport::post_json`]
pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = Result<TransportResponse, TransportError>> + Send + 'a>>;

/// Sends a JSON body to a URL and returns the raw response
pub trait Transport: Send + Sync {
    /// POST `body` as `application/json` to `url`
    ///
    /// Bodies larger than `max_body` bytes should be rejected with
    /// [`TransportError::TooLarge`] without reading them to the end.
    fn post_json<'a>(
        &'a self,
        url: &'a url::Url,
        body: Vec<u8>,
        max_body: usize,
    ) -> TransportFuture<'a>;
}

impl Transport for reqwest::Client {
    fn post_json<'a>(
        &'a self,
        url: &'a url::Url,
        body: Vec<u8>,
        max_body: usize,
    ) -> TransportFuture<'a> {
        Box::pin(async move {
            let mut response = self
                .post(url.clone())
                .header(CONTENT_TYPE, "application/json")
                .body(body)
                .send()
                .await
                .map_err(network)?;

            let status = response.status().as_u16();

            // Reject on the declared length before reading anything
            if let Some(length) = response.content_length() {
                if length > max_body as u64 {
                    return Err(TransportError::TooLarge {
                        size: usize::try_from(length).unwrap_or(usize::MAX),
                    });
                }
            }

            let mut body = Vec::new();
            while let Some(chunk) = response.chunk().await.map_err(network)? {
                body.extend_from_slice(&chunk);
                if body.len() > max_body {
                    return Err(TransportError::TooLarge { size: body.len() });
                }
            }

            Ok(TransportResponse { status, body })
        })
    }
}

fn network(e: reqwest::Error) -> TransportError {
    TransportError::Failed(format!("network: {}", e.without_url()))
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn post_json<'a>(
        &'a self,
        url: &'a url::Url,
        body: Vec<u8>,
        max_body: usize,
    ) -> TransportFuture<'a> {
        (**self).post_json(url, body, max_body)
    }
}
