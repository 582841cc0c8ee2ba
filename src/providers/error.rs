use crate::providers::kind::ProviderKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("API key for provider '{provider}' is not set (environment variable {env})")]
    MissingApiKey {
        provider: ProviderKind,
        env: &'static str,
    },

    #[error("Failed to construct HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to read response body from {0}")]
    BodyRead(String, #[source] reqwest::Error),

    #[error("Failed to parse {provider} payload")]
    PayloadParse {
        provider: ProviderKind,
        #[source]
        source: serde_json::Error,
    },
}
