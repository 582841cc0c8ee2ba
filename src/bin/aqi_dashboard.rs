//! Interactive single-city AQI dashboard.
//!
//! Usage: `aqi-dashboard [city] [catalog.csv]` (requires the `dashboard`
//! feature). Renders the summary cards to the console and opens the PM2.5
//! trend and pollutant breakdown charts in the browser. Unknown cities and
//! empty upstreams print an inline message instead of aborting.
//!
//! Provider selection matches `aqi-report` (`AQIMON_PROVIDER`, default
//! `open-meteo` here since it needs no credential).

use aqimon::{AqiMonitor, AqimonError, CityCatalog, DashboardModel, ProviderKind};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let city = args.next().unwrap_or_else(|| "New Delhi".to_string());
    let catalog_path = args.next().unwrap_or_else(|| "India_Cities.csv".to_string());
    let provider = std::env::var("AQIMON_PROVIDER")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(ProviderKind::OpenMeteo);

    let catalog = CityCatalog::load(&catalog_path);
    let monitor = match AqiMonitor::new(provider, catalog) {
        Ok(monitor) => monitor,
        Err(e) => {
            // Configuration errors are fatal for the session.
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("Fetching real-time AQI data for {}...", city);
    match DashboardModel::build(&monitor, &city).await {
        Ok(model) => {
            println!();
            for card in model.summary_cards() {
                println!("  {}", card);
            }
            println!();
            if let Err(e) = model.render() {
                eprintln!("Could not render charts: {}", e);
                return ExitCode::FAILURE;
            }
            println!("Charts opened in browser.");
            ExitCode::SUCCESS
        }
        Err(e @ (AqimonError::UnknownCity(_) | AqimonError::NoData(_))) => {
            // Inline per-page error: the dashboard stays usable for other cities.
            println!("  {}", e);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
