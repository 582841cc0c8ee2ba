//! Batch AQI report: one snapshot row per catalog city, written to CSV.
//!
//! Usage: `aqi-report [catalog.csv] [output.csv]`
//!
//! The provider is selected with the `AQIMON_PROVIDER` environment variable
//! (`openweather`, `open-meteo` or `openaq`; default `openweather`, which
//! requires `OPENWEATHER_API_KEY` to be set).

use aqimon::{AqiMonitor, AqimonError, BatchReporter, CityCatalog, ProviderKind};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<ExitCode, AqimonError> {
    let mut args = std::env::args().skip(1);
    let catalog_path = args.next().unwrap_or_else(|| "India_Cities.csv".to_string());
    let output_path = args
        .next()
        .unwrap_or_else(|| "India_All_Cities_AQI.csv".to_string());
    let provider = provider_from_env();

    println!("Loading cities...");
    let catalog = CityCatalog::load(&catalog_path);
    let monitor = AqiMonitor::new(provider, catalog)?;

    let summary = BatchReporter::new(&monitor, &output_path).run().await?;
    if summary.rows == 0 {
        return Ok(ExitCode::FAILURE);
    }
    println!(
        "Done: {} rows written, {} of {} cities skipped.",
        summary.rows, summary.skipped, summary.cities_total
    );
    Ok(ExitCode::SUCCESS)
}

fn provider_from_env() -> ProviderKind {
    std::env::var("AQIMON_PROVIDER")
        .ok()
        .and_then(|s| match s.parse() {
            Ok(kind) => Some(kind),
            Err(e) => {
                eprintln!("{}; falling back to openweather", e);
                None
            }
        })
        .unwrap_or(ProviderKind::OpenWeather)
}
