//! Headless variant for cron jobs: same charts, written to a fixed directory.

use std::process::ExitCode;
use tibber_prices::{Config, Error};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const OUTPUT_DIR: &str = "/var/lib/tibber-prices";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tibber_prices=info")),
        )
        .with_ansi(false)
        .init();

    let config = match Config::from_env() {
        Ok(config) => config.with_output_dir(OUTPUT_DIR),
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match tibber_prices::run(&config).await {
        Ok(paths) => {
            info!("{} chart(s) written to {}", paths.len(), OUTPUT_DIR);
            ExitCode::SUCCESS
        }
        Err(Error::ApiStatus { status, body }) => {
            error!(status, body = %body, "api request failed");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
