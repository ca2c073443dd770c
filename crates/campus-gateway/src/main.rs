//! Gateway binary.
//!
//! All settings come from environment variables; see
//! `campus_common::AppConfig` for the full list.

use std::process::ExitCode;

use campus_common::{try_init_tracing, AppConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = try_init_tracing() {
        eprintln!("tracing init failed: {e}");
    }

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Configuration is invalid, refusing to start");
            return ExitCode::FAILURE;
        }
    };

    info!(
        env = ?config.app.env,
        addr = %config.gateway.address(),
        "Starting campus gateway"
    );

    if let Err(e) = campus_gateway::run(config).await {
        error!(error = %e, "Gateway exited with an error");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
