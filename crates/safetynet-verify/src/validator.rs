use crate::error::Result;
use crate::statement::{AttestationClaims, FromPayload};
use crate::transport::Transport;
use crate::validation::{StatementValidation, validate_statement};
use crate::verifier::RemoteVerifier;

/// Attestation statement verifier
///
/// Runs the full pipeline for one statement:
///
/// ```text
/// RECEIVED ── remote verdict ──▶ VERIFIED ── split ──▶ SPLIT ── parse ──▶ PARSED ── validate ──▶ claims
/// ```
///
/// Every failure is terminal and no claims escape a failed run. The
/// verifier is configured once and can be reused for many statements.
#[derive(Debug, Clone)]
pub struct StatementVerifier<T = reqwest::Client> {
    remote: RemoteVerifier<T>,
    config_validation: StatementValidation,
}

impl<T: Transport> StatementVerifier<T> {
    /// Create a verifier that performs no claim validation
    pub fn new(remote: RemoteVerifier<T>) -> Self {
        Self {
            remote,
            config_validation: StatementValidation::default(),
        }
    }

    /// Configure claims validation
    pub fn validate(&mut self, config: StatementValidation) -> &mut Self {
        self.config_validation = config;
        self
    }

    /// Finish configuration
    pub fn build(&mut self) -> Self
    where
        T: Clone,
    {
        self.clone()
    }

    /// The remote verification client
    pub fn remote(&self) -> &RemoteVerifier<T> {
        &self.remote
    }

    /// Verify a signed statement and return its validated claims
    pub async fn verify(&self, token: &str) -> Result<AttestationClaims> {
        let claims = self.verify_with_custom::<AttestationClaims>(token).await?;

        validate_statement(&claims, &self.config_validation).inspect_err(|e| {
            tracing::warn!(kind = %e.kind(), error = %e, "statement rejected by validation");
        })?;

        Ok(claims)
    }

    /// Verify a signed statement and decode its payload into a custom type
    ///
    /// Claims validation is not applied; the payload type is the caller's.
    pub async fn verify_with_custom<C: FromPayload>(&self, token: &str) -> Result<C> {
        tracing::debug!(stage = "received", "verifying attestation statement");

        // 1. Remote verdict; nothing below runs unless the signature is valid
        let verified = self
            .remote
            .verify_statement(token)
            .await
            .inspect_err(|e| {
                tracing::warn!(kind = %e.kind(), error = %e, "statement verification failed");
            })?;
        tracing::debug!(stage = "verified", "signature accepted by verification service");

        // 2. Split into segments
        let parts = verified.split().inspect_err(|e| {
            tracing::warn!(kind = %e.kind(), error = %e, "verified statement has invalid format");
        })?;
        tracing::debug!(stage = "split", payload_size = parts.payload_bytes().len());

        // 3. Decode the payload
        let claims = parts.claims::<C>().inspect_err(|e| {
            tracing::warn!(kind = %e.kind(), error = %e, "statement payload could not be parsed");
        })?;
        tracing::debug!(stage = "parsed", "statement claims decoded");

        Ok(claims)
    }
}
