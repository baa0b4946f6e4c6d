// Catalog service client - the only thing in the workspace that touches the network
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{NetworkError, Result};

pub const DEFAULT_BASE_URL: &str = "http://88.182.27.68:40000";

/// Fixed for every request; there is no per-call override on purpose
pub const REQUEST_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Search results come back localized for this language
const SEARCH_LANG: &str = "fr";

/// Path for a single product lookup
pub fn product_path(barcode: &str) -> String {
    format!("/products/code/{}", urlencoding::encode(barcode))
}

/// Path for a free-text product search
pub fn search_path(query: &str) -> String {
    format!(
        "/products/search?query={}&lang={}",
        urlencoding::encode(query),
        SEARCH_LANG
    )
}

/// HTTP client bound to a single catalog host
///
/// Build it once at startup and share it. No retries, no caching, and the
/// payload is handed back exactly as the server sent it (parsed as JSON).
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: reqwest::Client,
    base_url: String,
}

impl CatalogClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, REQUEST_TIMEOUT)
    }

    pub(crate) fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("NutriScout/", env!("CARGO_PKG_VERSION"))),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(NetworkError::Client)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue a GET against `{base_url}{path}`
    ///
    /// An empty body comes back as `Value::Null` so callers can treat it as
    /// "nothing there" instead of a decode failure.
    pub async fn get(&self, path: &str) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(NetworkError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("GET {} returned {}", url, status);
            return Err(NetworkError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(NetworkError::from_reqwest)?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve exactly one canned HTTP response and return the base url
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let mut read = 0;
            loop {
                let n = socket.read(&mut buf[read..]).await.unwrap();
                read += n;
                if n == 0 || buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        format!("http://{}", addr)
    }

    #[test]
    fn test_paths_are_encoded() {
        assert_eq!(product_path("3017620422003"), "/products/code/3017620422003");
        assert_eq!(
            search_path("pâte à tartiner"),
            "/products/search?query=p%C3%A2te%20%C3%A0%20tartiner&lang=fr"
        );
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = CatalogClient::new("http://localhost:40000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:40000");
    }

    #[tokio::test]
    async fn test_get_returns_json_payload() {
        let base = serve_once("200 OK", r#"{"code":"123","calories":50}"#).await;
        let client = CatalogClient::new(base).unwrap();

        let value = client.get(&product_path("123")).await.unwrap();
        assert_eq!(value["code"], "123");
        assert_eq!(value["calories"], 50);
    }

    #[tokio::test]
    async fn test_empty_body_is_null() {
        let base = serve_once("200 OK", "").await;
        let client = CatalogClient::new(base).unwrap();

        let value = client.get("/products/code/0").await.unwrap();
        assert!(value.is_null());
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let base = serve_once("404 Not Found", r#"{"status_verbose":"product not found"}"#).await;
        let client = CatalogClient::new(base).unwrap();

        let err = client.get("/products/code/0").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(matches!(err, NetworkError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_garbage_body_is_decode_error() {
        let base = serve_once("200 OK", "<html>oops</html>").await;
        let client = CatalogClient::new(base).unwrap();

        let err = client.get("/products/search?query=ab&lang=fr").await.unwrap_err();
        assert!(matches!(err, NetworkError::Decode(_)));
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            // Accept and then say nothing at all
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let client =
            CatalogClient::with_timeout(format!("http://{}", addr), Duration::from_millis(100))
                .unwrap();
        let err = client.get("/products/code/1").await.unwrap_err();
        assert!(matches!(err, NetworkError::Timeout(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_refused_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = CatalogClient::new(format!("http://{}", addr)).unwrap();
        let err = client.get("/products/code/1").await.unwrap_err();
        assert!(matches!(err, NetworkError::Connection(_)), "got {:?}", err);
    }
}
