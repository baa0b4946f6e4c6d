use thiserror::Error;

use crate::normalize::NormalizationError;

/// All the ways things can go wrong in NutriScout
///
/// Most of these never reach a caller: the repository and the favorite store
/// log them and fall back to "absent" / empty / the previous state.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Network error: {0}")]
    Network(#[from] nutriscout_api::NetworkError),

    #[error("Malformed catalog payload: {0}")]
    Normalization(#[from] NormalizationError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] nutriscout_store::StoreError),

    #[error("Product not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Background task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}
