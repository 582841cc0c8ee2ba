use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to create report file '{0}'")]
    FileCreate(PathBuf, #[source] std::io::Error),

    #[error("Failed to write CSV report to '{0}'")]
    CsvWrite(PathBuf, #[source] PolarsError),

    #[error("Failed to assemble the report table")]
    Frame(#[from] PolarsError),
}
