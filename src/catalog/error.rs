use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog file '{0}' does not exist")]
    FileNotFound(PathBuf),

    #[error("Failed to read catalog file '{0}'")]
    CsvRead(PathBuf, #[source] PolarsError),

    #[error("Catalog file '{path}' is missing required column '{column}'")]
    MissingColumn { path: PathBuf, column: String },

    #[error("Catalog column '{column}' has an unexpected type")]
    ColumnType {
        column: String,
        #[source]
        source: PolarsError,
    },
}
