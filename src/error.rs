use reqwest::StatusCode;
use thiserror::Error;

/// Failure reported by the device location capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("no location capability is available on this device")]
    Unsupported,
    #[error("permission to read the device location was denied")]
    PermissionDenied,
    #[error("the device position is unavailable")]
    PositionUnavailable,
    #[error("timed out waiting for the device position")]
    Timeout,
}

/// Failure of a reverse-geocoding provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("geocoding request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("geocoding provider answered with HTTP {0}")]
    Status(StatusCode),
    #[error("geocoding provider rejected the request: {0}")]
    Rejected(String),
    #[error("malformed geocoding response: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for ProviderError {
    fn from(e: serde_json::Error) -> Self {
        ProviderError::Malformed(e.to_string())
    }
}

/// Why a resolution attempt could not complete.
///
/// A directory miss is not an error; see [`crate::resolver::Resolution::NoMatch`].
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("location capability unavailable: {0}")]
    CapabilityUnavailable(#[from] LocationError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Failure talking to the metrics backend.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: StatusCode },
    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Listing districts or a district's history failed.
#[derive(Debug, Error)]
#[error("failed to fetch {what}: {source}")]
pub struct BackendFetchError {
    pub what: String,
    #[source]
    pub source: FetchError,
}

/// The comparison request failed.
#[derive(Debug, Error)]
#[error("failed to fetch comparison data: {0}")]
pub struct ComparisonFetchError(#[from] pub FetchError);

/// Everything that can stop the binary from starting.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read configuration: {0}")]
    Configuration(#[from] config::ConfigError),
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
    #[error("push channel error: {0}")]
    Notifications(#[from] lapin::Error),
}
