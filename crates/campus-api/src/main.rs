//! REST API binary.
//!
//! Reads its configuration from the environment (a `.env` file is picked
//! up if present) and serves until the process is stopped.

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
        addr = %config.api.address(),
        "Starting campus API"
    );

    if let Err(e) = campus_api::run(config).await {
        error!(error = %e, "API exited with an error");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
