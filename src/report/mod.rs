//! The batch reporter: one snapshot row per catalog city, written to CSV and
//! summarized as ranked console tables.

pub mod error;

use crate::error::AqimonError;
use crate::monitor::{AqiMonitor, LatLon};
use crate::report::error::ReportError;
use crate::types::history::History;
use crate::types::reading::Snapshot;
use chrono::Duration;
use log::{info, warn};
use polars::prelude::*;
use std::path::{Path, PathBuf};

/// Pause between successive upstream calls, to respect provider rate limits.
/// This pacing is the reason the batch loop is strictly sequential.
const PACING: std::time::Duration = std::time::Duration::from_millis(200);

/// One assembled report row: a city plus its sanitized, classified snapshot.
#[derive(Debug, Clone, PartialEq)]
struct ReportRow {
    city: String,
    location: LatLon,
    snapshot: Snapshot,
}

/// Outcome of a batch run.
///
/// `output` is `None` exactly when no city produced a row ("no data"); the
/// run then writes nothing and is still a clean termination, not an error.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSummary {
    pub cities_total: usize,
    pub rows: usize,
    pub skipped: usize,
    pub output: Option<PathBuf>,
}

/// Iterates the city catalog, fetches a short history per city and emits the
/// snapshot table as a CSV report plus ranked console tables.
///
/// A city whose upstream call fails or returns nothing contributes no row and
/// never aborts the run.
pub struct BatchReporter<'a> {
    monitor: &'a AqiMonitor,
    output_path: PathBuf,
}

impl<'a> BatchReporter<'a> {
    /// Creates a reporter writing to `output_path` (overwriting any prior file).
    pub fn new(monitor: &'a AqiMonitor, output_path: impl Into<PathBuf>) -> BatchReporter<'a> {
        BatchReporter {
            monitor,
            output_path: output_path.into(),
        }
    }

    /// Runs the batch: fetch, sanitize, classify and collect one row per city,
    /// then write the CSV and print the two top-10 tables.
    pub async fn run(&self) -> Result<ReportSummary, AqimonError> {
        let cities = self.monitor.catalog().cities();
        if cities.is_empty() {
            println!("No cities found. Exiting.");
            return Ok(ReportSummary {
                cities_total: 0,
                rows: 0,
                skipped: 0,
                output: None,
            });
        }
        println!("Found {} cities. Fetching AQI data...", cities.len());

        let mut rows = Vec::new();
        let mut skipped = 0usize;
        for (i, city) in cities.iter().enumerate() {
            println!("[{}/{}] Fetching data for {}...", i + 1, cities.len(), city.name);
            // Just 1 day, enough to obtain the latest reading.
            let history = self
                .monitor
                .location_history()
                .location(city.location)
                .lookback(Duration::days(1))
                .call()
                .await;
            match history {
                Ok(history) => match snapshot_row(&city.name, city.location, &history) {
                    Some(row) => rows.push(row),
                    None => {
                        info!("No data for {}, skipping", city.name);
                        skipped += 1;
                    }
                },
                Err(e) => {
                    warn!("Skipping {}: {}", city.name, e);
                    skipped += 1;
                }
            }
            if i + 1 < cities.len() {
                tokio::time::sleep(PACING).await;
            }
        }
        println!("Data fetching complete.");

        if rows.is_empty() {
            println!("No data fetched.");
            return Ok(ReportSummary {
                cities_total: cities.len(),
                rows: 0,
                skipped,
                output: None,
            });
        }

        let mut df = rows_to_frame(&rows)?;
        write_csv(&mut df, &self.output_path)?;
        println!("Results saved to {}", self.output_path.display());

        print_ranked_tables(&df)?;

        Ok(ReportSummary {
            cities_total: cities.len(),
            rows: rows.len(),
            skipped,
            output: Some(self.output_path.clone()),
        })
    }
}

/// Builds a row from a history, or `None` when the history is empty.
fn snapshot_row(city: &str, location: LatLon, history: &History) -> Option<ReportRow> {
    history.snapshot().map(|snapshot| ReportRow {
        city: city.to_string(),
        location,
        snapshot,
    })
}

/// Assembles the snapshot table with the fixed report schema:
/// `city, lat, lon, timestamp, pm2_5, pm10, no2, o3, so2, co, aqi_category`.
fn rows_to_frame(rows: &[ReportRow]) -> Result<DataFrame, ReportError> {
    let strings = |f: &dyn Fn(&ReportRow) -> String| -> Vec<String> {
        rows.iter().map(f).collect()
    };
    let floats = |f: &dyn Fn(&ReportRow) -> f64| -> Vec<f64> { rows.iter().map(f).collect() };

    let df = DataFrame::new(vec![
        Series::new("city".into(), strings(&|r| r.city.clone())).into_column(),
        Series::new("lat".into(), floats(&|r| r.location.0)).into_column(),
        Series::new("lon".into(), floats(&|r| r.location.1)).into_column(),
        Series::new(
            "timestamp".into(),
            strings(&|r| r.snapshot.datetime.format("%Y-%m-%d %H:%M:%S").to_string()),
        )
        .into_column(),
        Series::new("pm2_5".into(), floats(&|r| r.snapshot.pm2_5)).into_column(),
        Series::new("pm10".into(), floats(&|r| r.snapshot.pm10)).into_column(),
        Series::new("no2".into(), floats(&|r| r.snapshot.no2)).into_column(),
        Series::new("o3".into(), floats(&|r| r.snapshot.o3)).into_column(),
        Series::new("so2".into(), floats(&|r| r.snapshot.so2)).into_column(),
        Series::new("co".into(), floats(&|r| r.snapshot.co)).into_column(),
        Series::new(
            "aqi_category".into(),
            strings(&|r| r.snapshot.category.label().to_string()),
        )
        .into_column(),
    ])?;
    Ok(df)
}

fn write_csv(df: &mut DataFrame, path: &Path) -> Result<(), ReportError> {
    let mut file = std::fs::File::create(path)
        .map_err(|e| ReportError::FileCreate(path.to_path_buf(), e))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .map_err(|e| ReportError::CsvWrite(path.to_path_buf(), e))?;
    Ok(())
}

fn print_ranked_tables(df: &DataFrame) -> Result<(), ReportError> {
    let ranked = df.select(["city", "pm2_5", "aqi_category"])?;

    println!("\n--- Top 10 Most Polluted Cities (by PM2.5) ---");
    let most = ranked
        .sort(["pm2_5"], SortMultipleOptions::default().with_order_descending(true))?
        .head(Some(10));
    println!("{}", most);

    println!("\n--- Top 10 Cleanest Cities (by PM2.5) ---");
    let least = ranked
        .sort(["pm2_5"], SortMultipleOptions::default())?
        .head(Some(10));
    println!("{}", least);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::category::AqiCategory;
    use crate::types::reading::Reading;
    use chrono::{TimeZone, Utc};
    use polars::prelude::CsvReadOptions;

    fn history_with_pm25(values: &[f64]) -> History {
        let start = Utc.with_ymd_and_hms(2024, 11, 4, 0, 0, 0).unwrap();
        History::new(
            values
                .iter()
                .enumerate()
                .map(|(i, v)| Reading {
                    pm2_5: Some(*v),
                    ..Reading::empty(start + Duration::hours(i as i64))
                })
                .collect(),
        )
    }

    fn sample_rows() -> Vec<ReportRow> {
        let cities = [
            ("New Delhi", LatLon(28.6139, 77.2090), 180.0),
            ("Shillong", LatLon(25.5788, 91.8933), 12.0),
        ];
        cities
            .iter()
            .map(|(name, loc, pm)| {
                snapshot_row(name, *loc, &history_with_pm25(&[*pm])).unwrap()
            })
            .collect()
    }

    #[test]
    fn empty_history_contributes_no_row() {
        assert!(snapshot_row("Nowhere", LatLon(0.0, 0.0), &History::empty()).is_none());
    }

    #[test]
    fn one_empty_upstream_of_three_gives_two_rows() {
        let histories = [
            history_with_pm25(&[40.0]),
            History::empty(),
            history_with_pm25(&[80.0]),
        ];
        let rows: Vec<ReportRow> = histories
            .iter()
            .enumerate()
            .filter_map(|(i, h)| snapshot_row(&format!("city-{}", i), LatLon(0.0, 0.0), h))
            .collect();
        assert_eq!(rows.len(), 2);
        let df = rows_to_frame(&rows).unwrap();
        assert_eq!(df.height(), 2);
    }

    #[test]
    fn frame_has_the_report_schema() {
        let df = rows_to_frame(&sample_rows()).unwrap();
        assert_eq!(
            df.get_column_names_str(),
            [
                "city",
                "lat",
                "lon",
                "timestamp",
                "pm2_5",
                "pm10",
                "no2",
                "o3",
                "so2",
                "co",
                "aqi_category"
            ]
        );
        let categories = df.column("aqi_category").unwrap().str().unwrap();
        assert_eq!(categories.get(0), Some("Very Poor"));
        assert_eq!(categories.get(1), Some("Good"));
    }

    #[test]
    fn csv_round_trips_city_pm25_and_category() {
        let rows = sample_rows();
        let mut df = rows_to_frame(&rows).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        write_csv(&mut df, &path).unwrap();

        let read_back = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.clone()))
            .unwrap()
            .finish()
            .unwrap();
        assert_eq!(read_back.height(), rows.len());
        let cities = read_back.column("city").unwrap().str().unwrap();
        let pm = read_back
            .column("pm2_5")
            .unwrap()
            .cast(&DataType::Float64)
            .unwrap();
        let pm = pm.f64().unwrap();
        let categories = read_back.column("aqi_category").unwrap().str().unwrap();
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(cities.get(i), Some(row.city.as_str()));
            assert_eq!(pm.get(i), Some(row.snapshot.pm2_5));
            assert_eq!(
                categories.get(i).and_then(AqiCategory::from_label),
                Some(row.snapshot.category)
            );
        }
    }

    #[test]
    fn overwrites_a_prior_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        std::fs::write(&path, "stale contents").unwrap();
        let mut df = rows_to_frame(&sample_rows()).unwrap();
        write_csv(&mut df, &path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("city,"));
        assert!(!contents.contains("stale"));
    }
}
