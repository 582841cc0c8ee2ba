use crate::catalog::error::CatalogError;
use crate::providers::error::ProviderError;
use crate::report::error::ReportError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AqimonError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("City '{0}' is not in the loaded catalog")]
    UnknownCity(String),

    #[error("No air quality data available for '{0}'")]
    NoData(String),

    #[error("Failed to prepare dashboard data")]
    Dashboard(#[source] polars::error::PolarsError),
}
