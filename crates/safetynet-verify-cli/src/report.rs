//! Human-readable rendering of verified claims

use std::fmt;

use safetynet_verify::{AttestationClaims, Result};

/// Display adapter printing the content of a verified statement
pub struct ClaimsReport<'a>(pub &'a AttestationClaims);

impl fmt::Display for ClaimsReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let claims = self.0;

        writeln!(f, "Successfully verified the signature of the attestation statement.")?;
        writeln!(f, "The content of the attestation statement is:")?;
        writeln!(f, "Nonce: {}", bytes(claims.nonce()))?;
        writeln!(f, "Timestamp: {} ms", claims.timestamp_ms())?;

        if let Some(package) = claims.apk_package_name() {
            writeln!(f, "APK package name: {package}")?;
            writeln!(f, "APK digest SHA256: {}", optional(claims.apk_digest_sha256()))?;
            writeln!(
                f,
                "APK certificate digest SHA256: {}",
                optional(claims.apk_certificate_digest_sha256())
            )?;
        }

        writeln!(f, "CTS profile match: {}", claims.cts_profile_match())?;
        writeln!(f, "Basic integrity match: {}", claims.basic_integrity())?;

        let evaluation: Vec<&str> = claims.evaluation_types().collect();
        if !evaluation.is_empty() {
            writeln!(f, "Evaluation type: {}", evaluation.join(", "))?;
        }
        let advice: Vec<&str> = claims.advice().collect();
        if !advice.is_empty() {
            writeln!(f, "Advice: {}", advice.join(", "))?;
        }

        writeln!(f)?;
        write!(
            f,
            "** Only the authenticity of the statement has been verified. Compare the \
             nonce, package name, timestamp and APK digests against the values \
             expected for this request before trusting the verdict. **"
        )
    }
}

fn bytes(value: Result<Vec<u8>>) -> String {
    match value {
        Ok(bytes) => hex::encode(bytes),
        Err(e) => format!("<{e}>"),
    }
}

fn optional(value: Result<Option<Vec<u8>>>) -> String {
    match value {
        Ok(Some(bytes)) => hex::encode(bytes),
        Ok(None) => "<absent>".to_string(),
        Err(e) => format!("<{e}>"),
    }
}
