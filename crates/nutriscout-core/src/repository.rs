// Product repository - crash-free access to catalog products
use std::sync::Arc;

use nutriscout_api::{product_path, search_path};
use tracing::{debug, info, warn};

use crate::{
    gateway::CatalogGateway,
    models::Product,
    normalize::{normalize_product, normalize_search_results, unwrap_product_payload},
    Error, Result,
};

/// Translates gateway responses into Products
///
/// Nothing here returns an error to the caller. A broken lookup becomes
/// `None`, a broken search becomes an empty list, and the reason goes to the
/// log. One bad barcode must not take down a whole batch of lookups.
pub struct ProductRepository {
    gateway: Arc<dyn CatalogGateway>,
}

impl ProductRepository {
    pub fn new(gateway: Arc<dyn CatalogGateway>) -> Self {
        Self { gateway }
    }

    /// Look up one product by barcode
    pub async fn get_product_by_barcode(&self, code: &str) -> Option<Product> {
        match self.fetch_product(code).await {
            Ok(product) => Some(product),
            Err(Error::Network(e)) if e.is_not_found() => {
                debug!("Product {} not in catalog", code);
                None
            }
            Err(e) => {
                warn!("Error fetching product {}: {}", code, e);
                None
            }
        }
    }

    /// Free-text search, French results
    pub async fn search_products(&self, query: &str) -> Vec<Product> {
        match self.fetch_search(query).await {
            Ok(products) => {
                info!("Search '{}' returned {} products", query, products.len());
                products
            }
            Err(e) => {
                warn!("Error searching products for '{}': {}", query, e);
                Vec::new()
            }
        }
    }

    async fn fetch_product(&self, code: &str) -> Result<Product> {
        let code = code.trim();
        if code.is_empty() {
            return Err(Error::NotFound("empty barcode".into()));
        }

        let payload = self.gateway.get(&product_path(code)).await?;
        let product = normalize_product(unwrap_product_payload(&payload)?)?;

        // The barcode is the identity; an answer for some other code is no answer
        if product.code != code {
            return Err(Error::NotFound(format!(
                "{} (catalog answered with '{}')",
                code, product.code
            )));
        }

        Ok(product)
    }

    async fn fetch_search(&self, query: &str) -> Result<Vec<Product>> {
        let payload = self.gateway.get(&search_path(query)).await?;
        Ok(normalize_search_results(&payload)?)
    }
}
