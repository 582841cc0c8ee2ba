mod catalog;
mod dashboard;
mod error;
mod monitor;
mod providers;
mod report;
mod sanitize;
mod types;

pub use error::AqimonError;
pub use monitor::*;

pub use catalog::city_catalog::{City, CityCatalog};
pub use dashboard::DashboardModel;
pub use providers::fetcher::HistoryFetcher;
pub use providers::kind::ProviderKind;
pub use report::{BatchReporter, ReportSummary};
pub use sanitize::{json_number, sanitize, sanitize_json, sanitize_or};
pub use types::category::{health_recommendation, AqiCategory};
pub use types::history::{History, POLLUTANT_COLUMNS};
pub use types::reading::{Reading, Snapshot};

pub use catalog::error::CatalogError;
pub use providers::error::ProviderError;
pub use report::error::ReportError;
