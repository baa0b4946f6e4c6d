// Remote catalog access - one client, one host, one timeout
pub mod client;
pub mod error;

pub use client::{product_path, search_path, CatalogClient, DEFAULT_BASE_URL, REQUEST_TIMEOUT};
pub use error::{NetworkError, Result};
