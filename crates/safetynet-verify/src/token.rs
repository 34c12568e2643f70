//! Compact signed statement handling
//!
//! A signed attestation statement is a JSON Web Signature in compact form:
//!
//! ```text
//! <Base64URL header>.<Base64URL JSON payload>.<Base64URL signature>
//! ```
//!
//! Splitting never checks the signature. Inside the verification pipeline
//! it is only reached through a [`VerifiedStatement`], which the remote
//! verifier hands out after the endpoint accepted the signature.

use miniserde::Deserialize;

use crate::error::{Error, Result, Segment};
use crate::limits::{
    MAX_DECODED_HEADER_SIZE, MAX_DECODED_PAYLOAD_SIZE, MAX_DECODED_SIGNATURE_SIZE,
    MAX_STATEMENT_LENGTH,
};
use crate::statement::FromPayload;
use crate::utils::base64url::{self, DecodeError};

/// The three decoded segments of a signed statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementParts {
    header: Vec<u8>,
    payload: Vec<u8>,
    signature: Vec<u8>,
}

impl StatementParts {
    /// Decoded header JSON bytes
    pub fn header_bytes(&self) -> &[u8] {
        &self.header
    }

    /// Decoded payload JSON bytes
    pub fn payload_bytes(&self) -> &[u8] {
        &self.payload
    }

    /// Raw signature bytes
    pub fn signature_bytes(&self) -> &[u8] {
        &self.signature
    }

    /// Parse the header JSON
    pub fn header(&self) -> Result<StatementHeader> {
        let json = std::str::from_utf8(&self.header)
            .map_err(|e| Error::ParseInvalidJson(format!("header: invalid UTF-8: {e}")))?;
        miniserde::json::from_str(json)
            .map_err(|_| Error::ParseInvalidJson("header: not a valid JWS header".into()))
    }

    /// Decode the payload into a claims type
    pub fn claims<C: FromPayload>(&self) -> Result<C> {
        C::from_payload(&self.payload)
    }

    /// Split into `(header, payload, signature)`
    pub fn into_inner(self) -> (Vec<u8>, Vec<u8>, Vec<u8>) {
        (self.header, self.payload, self.signature)
    }
}

/// JWS header of a signed statement
///
/// The signing certificate chain (`x5c`) is informational here: the remote
/// verification service is the authority on whether the signature holds.
#[derive(Debug, Clone, Deserialize)]
pub struct StatementHeader {
    /// Signature algorithm, e.g. `RS256`
    #[serde(rename = "alg")]
    pub algorithm: String,

    /// Base64 DER certificates, leaf first
    #[serde(rename = "x5c")]
    pub certificate_chain: Option<Vec<String>>,
}

/// Split a compact signed statement into its three decoded segments
pub fn split(token: &str) -> Result<StatementParts> {
    check_statement_length(token)?;

    let segments: Vec<&str> = token.split('.').collect();
    let [header_b64, payload_b64, signature_b64] = segments[..] else {
        return Err(Error::FormatSegmentCount {
            found: segments.len(),
        });
    };

    Ok(StatementParts {
        header: decode(Segment::Header, header_b64, MAX_DECODED_HEADER_SIZE)?,
        payload: decode(Segment::Payload, payload_b64, MAX_DECODED_PAYLOAD_SIZE)?,
        signature: decode(Segment::Signature, signature_b64, MAX_DECODED_SIGNATURE_SIZE)?,
    })
}

/// Reject statements longer than the accepted maximum
pub(crate) fn check_statement_length(token: &str) -> Result<()> {
    if token.len() > MAX_STATEMENT_LENGTH {
        return Err(Error::FormatTooLarge {
            size: token.len(),
            max: MAX_STATEMENT_LENGTH,
        });
    }
    Ok(())
}

fn decode(segment: Segment, input: &str, max_size: usize) -> Result<Vec<u8>> {
    if input.is_empty() {
        return Err(Error::FormatEmptySegment { segment });
    }

    base64url::decode_segment(input, max_size).map_err(|e| match e {
        DecodeError::Invalid(reason) => Error::FormatInvalidBase64 { segment, reason },
        DecodeError::TooLarge { size, max } => Error::FormatSegmentTooLarge {
            segment,
            size,
            max,
        },
    })
}

/// A statement whose signature the verification service accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedStatement {
    token: String,
}

impl VerifiedStatement {
    /// Only the remote verifier constructs verified statements
    pub(crate) fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
        }
    }

    /// The statement as sent to the verification service
    pub fn as_str(&self) -> &str {
        &self.token
    }

    /// Split the verified statement into its segments
    pub fn split(&self) -> Result<StatementParts> {
        split(&self.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "aGVhZGVy.eyJub25jZSI6ImFXOVFXUT09IiwidGltZXN0YW1wTXMiOjE2MDAwMDAwMDAwMDAsImN0c1Byb2ZpbGVNYXRjaCI6dHJ1ZSwiYmFzaWNJbnRlZ3JpdHkiOnRydWV9.c2lnbmF0dXJl";

    #[test]
    fn test_split_valid() {
        let parts = split(SAMPLE).unwrap();
        assert_eq!(parts.header_bytes(), b"header");
        assert_eq!(parts.signature_bytes(), b"signature");
        assert!(parts.payload_bytes().starts_with(br#"{"nonce":"aW9QWQ==""#));
    }

    #[test]
    fn test_split_segment_counts() {
        for (token, found) in [
            ("", 1),
            ("abc", 1),
            ("a.b", 2),
            ("a.b.c.d", 4),
            ("a.b.c.d.e", 5),
            ("....", 5),
        ] {
            assert_eq!(
                split(token),
                Err(Error::FormatSegmentCount { found }),
                "token {token:?}"
            );
        }
    }

    #[test]
    fn test_split_empty_segment() {
        assert_eq!(
            split(".cGF5bG9hZA.c2ln"),
            Err(Error::FormatEmptySegment {
                segment: Segment::Header
            })
        );
        assert_eq!(
            split("aGVhZGVy..c2ln"),
            Err(Error::FormatEmptySegment {
                segment: Segment::Payload
            })
        );
        assert_eq!(
            split("aGVhZGVy.cGF5bG9hZA."),
            Err(Error::FormatEmptySegment {
                segment: Segment::Signature
            })
        );
    }

    #[test]
    fn test_split_invalid_base64() {
        let result = split("aGVhZGVy.!!!.c2ln");
        assert!(matches!(
            result,
            Err(Error::FormatInvalidBase64 {
                segment: Segment::Payload,
                ..
            })
        ));
    }

    #[test]
    fn test_split_too_large() {
        let token = format!("aGVhZGVy.{}.c2ln", "A".repeat(MAX_STATEMENT_LENGTH));
        assert!(matches!(split(&token), Err(Error::FormatTooLarge { .. })));
    }

    #[test]
    fn test_split_segment_too_large() {
        // Fits the statement limit but decodes past the signature limit
        let signature = "A".repeat(4 * MAX_DECODED_SIGNATURE_SIZE);
        let token = format!("aGVhZGVy.cGF5bG9hZA.{signature}");
        assert!(matches!(
            split(&token),
            Err(Error::FormatSegmentTooLarge {
                segment: Segment::Signature,
                ..
            })
        ));
    }

    #[test]
    fn test_header_parsing() {
        let header = base64url_encode(r#"{"alg":"RS256","x5c":["MIIB","MIIC"]}"#);
        let token = format!("{header}.cGF5bG9hZA.c2ln");
        let header = split(&token).unwrap().header().unwrap();
        assert_eq!(header.algorithm, "RS256");
        assert_eq!(
            header.certificate_chain,
            Some(vec!["MIIB".to_string(), "MIIC".to_string()])
        );
    }

    #[test]
    fn test_header_not_json() {
        let parts = split(SAMPLE).unwrap();
        assert!(matches!(parts.header(), Err(Error::ParseInvalidJson(_))));
    }

    #[test]
    fn test_into_inner() {
        let (header, payload, signature) = split(SAMPLE).unwrap().into_inner();
        assert_eq!(header, b"header");
        assert!(payload.starts_with(b"{\"nonce\""));
        assert_eq!(signature, b"signature");
    }

    #[test]
    fn test_verified_statement_split() {
        let verified = VerifiedStatement::new(SAMPLE);
        assert_eq!(verified.as_str(), SAMPLE);
        assert_eq!(verified.split().unwrap(), split(SAMPLE).unwrap());
    }

    fn base64url_encode(input: &str) -> String {
        use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
        URL_SAFE_NO_PAD.encode(input)
    }
}
