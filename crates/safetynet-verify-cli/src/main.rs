//! Command line verifier for signed attestation statements
//!
//! ```text
//! SAFETYNET_API_KEY=... safetynet-verify <signed attestation statement>
//! ```

mod report;

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use safetynet_verify::{RemoteVerifier, StatementVerifier, VerifierConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::report::ClaimsReport;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Verify a signed attestation statement with the Android Device Verification API
///
/// The API key is read from SAFETYNET_API_KEY; SAFETYNET_VERIFY_ENDPOINT
/// overrides the verification endpoint.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Signed attestation statement (compact JWS)
    statement: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "safetynet_verify=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    match run(&args.statement).await {
        Ok(report) => {
            println!("{report}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failure: {}: {e}", e.kind());
            ExitCode::FAILURE
        }
    }
}

async fn run(statement: &str) -> safetynet_verify::Result<String> {
    let config = VerifierConfig::from_env()?;
    tracing::debug!(?config, "loaded configuration");

    let client = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| {
            safetynet_verify::Error::ConfigurationInvalid(format!("http client: {e}"))
        })?;

    let verifier = StatementVerifier::new(RemoteVerifier::new(client, config));
    let claims = verifier.verify(statement).await?;

    Ok(ClaimsReport(&claims).to_string())
}
