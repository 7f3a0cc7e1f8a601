//! Charts of today's and tomorrow's hourly Tibber electricity prices, with the
//! cheapest four hour window of each day highlighted.

use chrono::{DateTime, Local, TimeZone};
use std::path::PathBuf;
use tracing::{debug, info};

pub mod chart;
pub mod config;
pub mod model;
pub mod tibber;
pub mod window;

pub use chart::{DayChart, CHEAPEST_WINDOW_HOURS};
pub use config::Config;
pub use model::{DailyPrices, DayLabel, PriceBounds, PricePoint, ScaleStrategy};
pub use tibber::TibberClient;
pub use window::{find_minimal_sum_window, WindowError};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("API key not found, set the environment variable {}", config::API_KEY_VAR)]
    MissingApiKey,
    #[error("http request error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("api request failed with status {status}: {body}")]
    ApiStatus { status: u16, body: String },
    #[error("decoding api response failed: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("api returned errors: {0}")]
    GraphQl(String),
    #[error("api responded with an unsupported response: {0}")]
    UnsupportedResponse(String),
    #[error(transparent)]
    Window(#[from] WindowError),
    #[error("rendering chart failed: {0}")]
    Chart(String),
    #[error("writing chart failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Builds one chart per day with prices. Tomorrow gets a chart only once its
/// prices are published.
pub fn plan_charts<TZ: TimeZone>(
    prices: &DailyPrices,
    scale: ScaleStrategy,
    now: &DateTime<TZ>,
) -> Result<Vec<DayChart>, Error> {
    let combined = PriceBounds::of(prices.days().flat_map(|(_, points)| points));

    prices
        .days()
        .map(|(label, points)| {
            let bounds = match scale {
                ScaleStrategy::Combined => combined,
                ScaleStrategy::PerDay => PriceBounds::of(points),
            }
            .ok_or_else(|| Error::UnsupportedResponse(format!("no prices for {label}")))?;

            DayChart::new(label, points, bounds, now)
        })
        .collect()
}

/// Renders the charts of `prices` into the configured output directory and
/// returns the paths written.
pub fn render_charts<TZ: TimeZone>(
    config: &Config,
    prices: &DailyPrices,
    now: &DateTime<TZ>,
) -> Result<Vec<PathBuf>, Error> {
    let charts = plan_charts(prices, config.scale, now)?;
    std::fs::create_dir_all(&config.output_dir)?;

    charts
        .iter()
        .map(|chart| {
            let (start, end) = chart.cheapest_span();
            info!(
                "cheapest {}h {}: {}-{}, avg {:.1}",
                CHEAPEST_WINDOW_HOURS,
                chart.label,
                start.format("%H:%M"),
                end.format("%H:%M"),
                100.0 * chart.cheapest_average()
            );

            let path = config.output_dir.join(chart.file_name());
            chart.render(&path)?;
            debug!(path = %path.display(), "chart written");
            Ok(path)
        })
        .collect()
}

/// Fetches the current prices and renders their charts.
pub async fn run(config: &Config) -> Result<Vec<PathBuf>, Error> {
    let prices = TibberClient::new(config.api_key.clone())
        .fetch_prices()
        .await?;

    if prices.tomorrow.is_none() {
        info!("prices for tomorrow not published yet");
    }

    render_charts(config, &prices, &Local::now())
}
