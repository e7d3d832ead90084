//! Elasticsearch client implementation.

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use elasticsearch::auth::Credentials;
use elasticsearch::cert::CertificateValidation;
use elasticsearch::http::transport::{SingleNodeConnectionPool, TransportBuilder};
use elasticsearch::indices::IndicesExistsParts;
use elasticsearch::{Elasticsearch, SearchParts};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{RawSearchResponse, SearchClient};
use crate::error::BackendError;

const BACKEND_NAME: &str = "elasticsearch";

/// Authentication configuration for Elasticsearch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElasticsearchAuth {
    /// Basic username/password authentication.
    Basic {
        /// The username for basic auth.
        username: String,
        /// The password for basic auth.
        password: String,
    },
    /// Bearer token authentication.
    Bearer {
        /// The bearer token.
        token: String,
    },
}

/// Configuration for the Elasticsearch client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElasticsearchConfig {
    /// Elasticsearch node URLs (e.g., `["http://localhost:9200"]`).
    /// Currently uses the first node (single-node connection pool).
    #[serde(default = "default_nodes")]
    pub nodes: Vec<String>,

    /// Index name prefix (default: `"quarry"`).
    /// Indices are named `{prefix}_{collection_lowercase}`; an empty prefix
    /// uses the collection name alone.
    #[serde(default = "default_index_prefix")]
    pub index_prefix: String,

    /// Request timeout in milliseconds (default: 30000).
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Optional authentication.
    #[serde(default)]
    pub auth: Option<ElasticsearchAuth>,

    /// Whether to disable certificate validation (default: false).
    /// Only use for development/testing.
    #[serde(default)]
    pub disable_certificate_validation: bool,
}

fn default_nodes() -> Vec<String> {
    vec!["http://localhost:9200".to_string()]
}

fn default_index_prefix() -> String {
    "quarry".to_string()
}

fn default_request_timeout_ms() -> u64 {
    30000
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        Self {
            nodes: default_nodes(),
            index_prefix: default_index_prefix(),
            request_timeout_ms: default_request_timeout_ms(),
            auth: None,
            disable_certificate_validation: false,
        }
    }
}

/// [`SearchClient`] backed by an Elasticsearch cluster.
pub struct ElasticsearchClient {
    client: Elasticsearch,
    config: ElasticsearchConfig,
}

impl Debug for ElasticsearchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElasticsearchClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ElasticsearchClient {
    /// Creates a client with the given configuration. No request is made
    /// until the first search.
    pub fn new(config: ElasticsearchConfig) -> Result<Self, BackendError> {
        let client = Self::build_client(&config)?;
        Ok(Self { client, config })
    }

    fn build_client(config: &ElasticsearchConfig) -> Result<Elasticsearch, BackendError> {
        let url = config
            .nodes
            .first()
            .cloned()
            .unwrap_or_else(|| "http://localhost:9200".to_string());

        let parsed_url: elasticsearch::http::Url =
            url.parse().map_err(|e| BackendError::ConnectionFailed {
                backend_name: BACKEND_NAME.to_string(),
                message: format!("Invalid URL '{}': {}", url, e),
            })?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);

        let mut builder = TransportBuilder::new(conn_pool)
            .timeout(Duration::from_millis(config.request_timeout_ms));

        if config.disable_certificate_validation {
            builder = builder.cert_validation(CertificateValidation::None);
        }

        if let Some(ref auth) = config.auth {
            builder = match auth {
                ElasticsearchAuth::Basic { username, password } => {
                    builder.auth(Credentials::Basic(username.clone(), password.clone()))
                }
                ElasticsearchAuth::Bearer { token } => {
                    builder.auth(Credentials::Bearer(token.clone()))
                }
            };
        }

        let transport = builder.build().map_err(|e| BackendError::ConnectionFailed {
            backend_name: BACKEND_NAME.to_string(),
            message: format!("Failed to build transport: {}", e),
        })?;

        Ok(Elasticsearch::new(transport))
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &ElasticsearchConfig {
        &self.config
    }

    /// Returns the index name for a collection.
    pub fn index_name(&self, collection: &str) -> String {
        index_name(&self.config.index_prefix, collection)
    }
}

pub(crate) fn index_name(prefix: &str, collection: &str) -> String {
    let collection = collection.to_lowercase();
    if prefix.is_empty() {
        collection
    } else {
        format!("{}_{}", prefix, collection)
    }
}

/// Wraps a response decoding failure, keeping the cause as the source.
fn decode_error<E>(e: E) -> BackendError
where
    E: std::error::Error + Send + Sync + 'static,
{
    BackendError::Internal {
        backend_name: BACKEND_NAME.to_string(),
        message: format!("Failed to parse search response: {}", e),
        source: Some(Box::new(e)),
    }
}

#[async_trait]
impl SearchClient for ElasticsearchClient {
    async fn search(&self, index: &str, body: Value) -> Result<RawSearchResponse, BackendError> {
        let response = self
            .client
            .search(SearchParts::Index(&[index]))
            .body(body)
            .send()
            .await
            .map_err(|e| BackendError::Unavailable {
                backend_name: BACKEND_NAME.to_string(),
                message: format!("Search request failed: {}", e),
            })?;

        let status = response.status_code();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                backend_name: BACKEND_NAME.to_string(),
                status: status.as_u16(),
                message: text,
            });
        }

        let body: Value = response.json().await.map_err(decode_error)?;

        Ok(RawSearchResponse::new(body))
    }

    async fn index_exists(&self, index: &str) -> Result<bool, BackendError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| BackendError::Unavailable {
                backend_name: BACKEND_NAME.to_string(),
                message: format!("Failed to check index existence: {}", e),
            })?;

        match response.status_code().as_u16() {
            200 => Ok(true),
            404 => Ok(false),
            status => Err(BackendError::Status {
                backend_name: BACKEND_NAME.to_string(),
                status,
                message: format!("Unexpected status checking index {}", index),
            }),
        }
    }
}
