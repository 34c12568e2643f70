//! Verification of signed device attestation statements.
//!
//! A statement is a compact JWS produced on the device. Its signature is
//! checked by a remote verification service; only after a positive verdict
//! is the payload decoded into [`AttestationClaims`] and validated.
//!
//! ```ignore
//! use safetynet_verify::{RemoteVerifier, StatementValidation, StatementVerifier, VerifierConfig};
//!
//! let remote = RemoteVerifier::new(reqwest::Client::new(), VerifierConfig::from_env()?);
//! let verifier = StatementVerifier::new(remote)
//!     .validate(StatementValidation::new().expect_nonce(&nonce).max_age_ms(60_000))
//!     .build();
//!
//! let claims = verifier.verify(&statement).await?;
//! ```

mod config;
mod error;
mod nonce;
mod statement;
mod token;
mod transport;
mod validation;
mod validator;
mod verifier;

// Internal modules
pub(crate) mod url;
pub(crate) mod utils;

// Public Interface
pub use config::{DEFAULT_ENDPOINT, ENV_API_KEY, ENV_ENDPOINT, VerifierConfig};
pub use error::{Error, ErrorKind, Result, Segment};
pub use nonce::RequestNonce;
pub use statement::{AttestationClaims, FromPayload};
pub use token::{StatementHeader, StatementParts, VerifiedStatement, split};
pub use transport::{Transport, TransportError, TransportFuture, TransportResponse};
pub use validation::StatementValidation;
pub use validator::StatementVerifier;
pub use verifier::RemoteVerifier;

pub(crate) mod limits;
