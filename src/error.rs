//! Error types for fetching, exporting and configuration.

use thiserror::Error;

/// Why a single identifier could not be resolved.
///
/// These never escape [`crate::cadastre::ParcelFetcher::fetch_all`]; they are
/// logged and the identifier is reported as missing.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no features returned for {0}")]
    NotFound(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Failure while building or materializing an export payload.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("invalid colour {0:?}, expected #rrggbb")]
    InvalidColor(String),

    #[error("opacity must be between 0 and 100, got {0}")]
    InvalidOpacity(u8),

    #[error("line weight must be positive, got {0}")]
    InvalidLineWeight(f64),

    #[error("failed to serialize feature collection: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid endpoint url {url:?}: {source}")]
    InvalidEndpoint {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to build http client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
