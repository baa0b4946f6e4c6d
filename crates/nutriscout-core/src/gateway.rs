// Gateway seam - bridges the HTTP client with everything that needs catalog data
use async_trait::async_trait;
use nutriscout_api::{CatalogClient, NetworkError};
use serde_json::Value;

/// Read access to the catalog service
///
/// The real thing is `CatalogClient`; tests swap in mocks or fakes so nothing
/// has to touch the network.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    async fn get(&self, path: &str) -> Result<Value, NetworkError>;
}

#[async_trait]
impl CatalogGateway for CatalogClient {
    async fn get(&self, path: &str) -> Result<Value, NetworkError> {
        CatalogClient::get(self, path).await
    }
}
