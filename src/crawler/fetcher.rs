//! HTTP fetching and error classification
//!
//! Every failure is classified as transient (worth retrying) or permanent
//! (retrying cannot help). The controller's retry loop keys off that
//! distinction alone, so the classification table lives here in one place:
//!
//! | Condition            | Classification |
//! |----------------------|----------------|
//! | Timeout              | Transient      |
//! | Connection error     | Transient      |
//! | HTTP 429             | Transient      |
//! | HTTP 5xx             | Transient      |
//! | HTTP 404 / 410       | Permanent      |
//! | Other HTTP 4xx       | Permanent      |
//! | Body read failure    | Transient      |

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// A fetch failure, classified by whether a retry could succeed
#[derive(Error, Debug, Clone)]
pub enum FetchError {
    #[error("transient fetch failure: {reason}")]
    Transient { reason: String },

    #[error("permanent fetch failure: {reason}")]
    Permanent { reason: String },
}

impl FetchError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}

/// Seam for page fetching, so the crawl logic can be driven by a stub
/// transport in tests
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Builds the HTTP client used for all catalog requests
///
/// # Arguments
///
/// * `user_agent` - Identifying User-Agent string sent with every request
/// * `timeout_ms` - Per-request timeout in milliseconds
pub fn build_http_client(user_agent: &str, timeout_ms: u64) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_millis(timeout_ms))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Production fetcher backed by reqwest
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await.map_err(classify_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_status(status));
        }

        response.text().await.map_err(|e| FetchError::Transient {
            reason: format!("failed reading body: {}", e),
        })
    }
}

fn classify_reqwest(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Transient {
            reason: "request timeout".to_string(),
        }
    } else if e.is_connect() {
        FetchError::Transient {
            reason: format!("connection error: {}", e),
        }
    } else {
        FetchError::Permanent {
            reason: e.to_string(),
        }
    }
}

fn classify_status(status: StatusCode) -> FetchError {
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        FetchError::Transient {
            reason: format!("HTTP {}", status.as_u16()),
        }
    } else {
        FetchError::Permanent {
            reason: format!("HTTP {}", status.as_u16()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client("hearth/0.1 (test)", 30_000).is_ok());
    }

    #[test]
    fn test_status_classification() {
        assert!(classify_status(StatusCode::TOO_MANY_REQUESTS).is_transient());
        assert!(classify_status(StatusCode::INTERNAL_SERVER_ERROR).is_transient());
        assert!(classify_status(StatusCode::BAD_GATEWAY).is_transient());
        assert!(!classify_status(StatusCode::NOT_FOUND).is_transient());
        assert!(!classify_status(StatusCode::GONE).is_transient());
        assert!(!classify_status(StatusCode::FORBIDDEN).is_transient());
    }

    #[tokio::test]
    async fn test_fetch_classifies_server_errors() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(build_http_client("hearth-test", 5_000).unwrap());

        let err = fetcher.fetch(&format!("{}/flaky", server.uri())).await.unwrap_err();
        assert!(err.is_transient());

        let err = fetcher.fetch(&format!("{}/gone", server.uri())).await.unwrap_err();
        assert!(!err.is_transient());
    }
}
