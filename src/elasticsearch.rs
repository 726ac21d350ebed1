//! Blocking Elasticsearch document client.
//!
//! Writes each record with `POST {base_url}/{index}/_doc`. Anything beyond
//! the URL (TLS roots, credentials, proxies, timeouts) is configured on the
//! `reqwest` client passed to [`ElasticsearchClient::with_http_client`].
//!
//! The blocking `reqwest` client runs its own runtime and must not be called
//! from inside an async runtime's worker thread.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;

use crate::error::IndexError;
use crate::sink::IndexClient;

/// `log` targets of the HTTP stack. Their records are emitted on the client's
/// runtime thread while a document is in flight, so they are never indexed.
const TRANSPORT_TARGETS: &[&str] = &["reqwest", "hyper", "h2", "rustls", "tokio", "mio", "want"];

/// [`IndexClient`] for an Elasticsearch (or OpenSearch) cluster.
///
/// # Examples
///
/// ```no_run
/// # use std::sync::Arc;
/// # use elastic_logger::{ElasticsearchClient, Logger};
/// let client = ElasticsearchClient::new("http://localhost:9200")?;
/// let logger = Logger::new();
/// logger.set_client(Arc::new(client));
/// logger.error("indexed and printed");
/// # Ok::<(), elastic_logger::IndexError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ElasticsearchClient {
    http: Client,
    base_url: String,
}

impl ElasticsearchClient {
    /// Creates a client for `base_url` with no request timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self, IndexError> {
        let http = Client::builder().timeout(None::<Duration>).build()?;
        Ok(Self::with_http_client(base_url, http))
    }

    /// Uses a caller-configured HTTP client.
    pub fn with_http_client(base_url: impl Into<String>, http: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The endpoint documents for `index` are posted to.
    pub fn document_url(&self, index: &str) -> String {
        format!("{}/{}/_doc", self.base_url, index)
    }
}

impl IndexClient for ElasticsearchClient {
    fn index(&self, index: &str, document: &[u8]) -> Result<(), IndexError> {
        let response = self
            .http
            .post(self.document_url(index))
            .header(CONTENT_TYPE, "application/json")
            .body(document.to_vec())
            .send()?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().unwrap_or_default();
        Err(IndexError::Rejected {
            index: index.to_string(),
            status: status.as_u16(),
            body,
        })
    }

    fn forwards_target(&self, target: &str) -> bool {
        let krate = target.split("::").next().unwrap_or(target);
        !TRANSPORT_TARGETS.contains(&krate)
    }
}

impl From<reqwest::Error> for IndexError {
    fn from(err: reqwest::Error) -> Self {
        IndexError::Transport(Box::new(err))
    }
}
