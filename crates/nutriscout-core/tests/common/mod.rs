// Shared fake catalog for the integration tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use nutriscout_api::{product_path, search_path, NetworkError};
use nutriscout_core::{CatalogGateway, ProductRepository};
use serde_json::Value;

#[derive(Clone)]
enum Reply {
    Json(Value),
    Status(u16),
}

/// In-memory catalog with per-path latency
#[derive(Default)]
pub struct FakeCatalog {
    replies: Mutex<HashMap<String, (Duration, Reply)>>,
    calls: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn search(&self, query: &str, delay: Duration, payload: Value) {
        self.insert(search_path(query), delay, Reply::Json(payload));
    }

    pub fn product(&self, code: &str, payload: Value) {
        self.insert(product_path(code), Duration::ZERO, Reply::Json(payload));
    }

    pub fn failing(&self, path: String, status: u16) {
        self.insert(path, Duration::ZERO, Reply::Status(status));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn repository(self: &Arc<Self>) -> Arc<ProductRepository> {
        Arc::new(ProductRepository::new(self.clone()))
    }

    fn insert(&self, path: String, delay: Duration, reply: Reply) {
        self.replies.lock().unwrap().insert(path, (delay, reply));
    }
}

#[async_trait]
impl CatalogGateway for FakeCatalog {
    async fn get(&self, path: &str) -> Result<Value, NetworkError> {
        self.calls.lock().unwrap().push(path.to_string());
        let reply = self.replies.lock().unwrap().get(path).cloned();

        match reply {
            Some((delay, reply)) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                match reply {
                    Reply::Json(value) => Ok(value),
                    Reply::Status(status) => Err(NetworkError::Status {
                        status,
                        body: String::new(),
                    }),
                }
            }
            None => Err(NetworkError::Status {
                status: 404,
                body: String::new(),
            }),
        }
    }
}
