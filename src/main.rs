use std::process::ExitCode;
use tibber_prices::{Config, Error};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tibber_prices=info")),
        )
        .with_target(false)
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match tibber_prices::run(&config).await {
        Ok(paths) => {
            for path in paths {
                info!("wrote {}", path.display());
            }
            ExitCode::SUCCESS
        }
        Err(Error::ApiStatus { status, body }) => {
            error!("Fehler bei der API-Anfrage. Statuscode: {}", status);
            error!("{}", body);
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
