use thiserror::Error;

/// Everything that can go wrong between us and the catalog service
///
/// Timeouts and refused connections get their own variants so callers can log
/// them differently, but nobody upstream retries on any of them.
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    #[error("Connection failed: {0}")]
    Connection(#[source] reqwest::Error),

    #[error("Request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Catalog returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Response is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl NetworkError {
    /// Sort a transport error into the right bucket
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            NetworkError::Timeout(err)
        } else if err.is_connect() {
            NetworkError::Connection(err)
        } else {
            NetworkError::Request(err)
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, NetworkError::Status { status: 404, .. })
    }
}

pub type Result<T> = std::result::Result<T, NetworkError>;
