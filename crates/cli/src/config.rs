//! Command line configuration.
//!
//! Every option can also be set through an environment variable.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `QUARRY_COLLECTION` | | Collection to search |
//! | `QUARRY_SEARCH` | | Free-text search terms |
//! | `QUARRY_FILTER` | | Filter expression |
//! | `QUARRY_SORT` | | Sort list, e.g. `name asc, age desc` |
//! | `QUARRY_PAGE` | 0 | Zero-based page number |
//! | `QUARRY_SIZE` | default page size | Page size |
//! | `QUARRY_SCOPE_FILTER` | | Filter AND-ed onto every search |
//! | `QUARRY_ELASTICSEARCH_NODES` | http://localhost:9200 | Comma-separated node URLs |
//! | `QUARRY_ELASTICSEARCH_INDEX_PREFIX` | quarry | Index name prefix |
//! | `QUARRY_ELASTICSEARCH_USERNAME` | | Basic auth username |
//! | `QUARRY_ELASTICSEARCH_PASSWORD` | | Basic auth password |
//! | `QUARRY_ELASTICSEARCH_TIMEOUT_MS` | 30000 | Request timeout (milliseconds) |
//! | `QUARRY_LOG_LEVEL` | warn | Log level |
//! | `QUARRY_DEFAULT_PAGE_SIZE` | 10 | Page size when none is given |
//! | `QUARRY_MAX_PAGE_SIZE` | 1000 | Upper bound for the page size |

use clap::Parser;

use quarry_search::core::SearchContext;
use quarry_search::types::SearchCriteria;

#[cfg(feature = "elasticsearch")]
use quarry_search::backends::elasticsearch::{ElasticsearchAuth, ElasticsearchConfig};

/// Configuration for one `quarry` invocation.
#[derive(Debug, Clone, Parser)]
#[command(name = "quarry")]
#[command(about = "Search a document collection with a filter expression")]
pub struct QuarryConfig {
    /// Collection to search. Resolved to an index name with the index prefix.
    #[arg(env = "QUARRY_COLLECTION")]
    pub collection: String,

    /// Free-text search terms.
    #[arg(short = 'q', long, env = "QUARRY_SEARCH")]
    pub search: Option<String>,

    /// Filter expression, e.g. "age gt 18 and status eq 'active'".
    #[arg(short, long, env = "QUARRY_FILTER")]
    pub filter: Option<String>,

    /// Sort list, e.g. "name asc, age desc".
    #[arg(short, long, env = "QUARRY_SORT")]
    pub sort: Option<String>,

    /// Zero-based page number.
    #[arg(short, long, env = "QUARRY_PAGE", default_value = "0", allow_negative_numbers = true)]
    pub page: i64,

    /// Page size. Defaults to the default page size and is capped at the max page size.
    #[arg(long, env = "QUARRY_SIZE", allow_negative_numbers = true)]
    pub size: Option<i64>,

    /// Field to compute value counts for. May be repeated.
    #[arg(long = "facet")]
    pub facets: Vec<String>,

    /// Filter that every result must also match.
    #[arg(long, env = "QUARRY_SCOPE_FILTER")]
    pub scope_filter: Option<String>,

    /// Print the compiled request instead of running it.
    #[arg(long)]
    pub explain: bool,

    /// Elasticsearch node URLs (comma-separated).
    #[arg(
        long,
        env = "QUARRY_ELASTICSEARCH_NODES",
        default_value = "http://localhost:9200"
    )]
    pub elasticsearch_nodes: String,

    /// Elasticsearch index name prefix.
    #[arg(long, env = "QUARRY_ELASTICSEARCH_INDEX_PREFIX", default_value = "quarry")]
    pub elasticsearch_index_prefix: String,

    /// Elasticsearch username for basic auth.
    #[arg(long, env = "QUARRY_ELASTICSEARCH_USERNAME")]
    pub elasticsearch_username: Option<String>,

    /// Elasticsearch password for basic auth.
    #[arg(long, env = "QUARRY_ELASTICSEARCH_PASSWORD")]
    pub elasticsearch_password: Option<String>,

    /// Elasticsearch request timeout in milliseconds.
    #[arg(long, env = "QUARRY_ELASTICSEARCH_TIMEOUT_MS", default_value = "30000")]
    pub elasticsearch_timeout_ms: u64,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "QUARRY_LOG_LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Page size used when --size is not given.
    #[arg(long, env = "QUARRY_DEFAULT_PAGE_SIZE", default_value = "10")]
    pub default_page_size: u32,

    /// Maximum page size.
    #[arg(long, env = "QUARRY_MAX_PAGE_SIZE", default_value = "1000")]
    pub max_page_size: u32,
}

impl Default for QuarryConfig {
    fn default() -> Self {
        Self {
            collection: String::new(),
            search: None,
            filter: None,
            sort: None,
            page: 0,
            size: None,
            facets: Vec::new(),
            scope_filter: None,
            explain: false,
            elasticsearch_nodes: "http://localhost:9200".to_string(),
            elasticsearch_index_prefix: "quarry".to_string(),
            elasticsearch_username: None,
            elasticsearch_password: None,
            elasticsearch_timeout_ms: 30000,
            log_level: "warn".to_string(),
            default_page_size: 10,
            max_page_size: 1000,
        }
    }
}

impl QuarryConfig {
    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.collection.trim().is_empty() {
            errors.push("Collection cannot be empty".to_string());
        }

        if self.node_urls().is_empty() {
            errors.push("At least one Elasticsearch node is required".to_string());
        }

        if self.elasticsearch_timeout_ms == 0 {
            errors.push("Elasticsearch timeout cannot be 0".to_string());
        }

        if self.elasticsearch_username.is_some() != self.elasticsearch_password.is_some() {
            errors.push("Elasticsearch username and password must be given together".to_string());
        }

        if self.default_page_size == 0 {
            errors.push("Default page size cannot be 0".to_string());
        }

        if self.default_page_size > self.max_page_size {
            errors.push("Default page size cannot exceed max page size".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// The node URLs, trimmed, with empty entries dropped.
    pub fn node_urls(&self) -> Vec<String> {
        self.elasticsearch_nodes
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Page size after applying the default and the maximum.
    pub fn effective_size(&self) -> i64 {
        self.size
            .unwrap_or(i64::from(self.default_page_size))
            .min(i64::from(self.max_page_size))
    }

    /// Search criteria for this invocation.
    pub fn criteria(&self) -> SearchCriteria {
        SearchCriteria {
            facet_fields: self.facets.clone(),
            ..SearchCriteria::from_params(
                self.search.as_deref(),
                self.filter.as_deref(),
                self.sort.as_deref(),
                Some(self.page),
                Some(self.effective_size()),
            )
        }
    }

    pub fn search_context(&self) -> SearchContext {
        SearchContext {
            scope_filter: self.scope_filter.clone(),
        }
    }

    /// Elasticsearch client configuration.
    #[cfg(feature = "elasticsearch")]
    pub fn elasticsearch_config(&self) -> ElasticsearchConfig {
        let auth = match (&self.elasticsearch_username, &self.elasticsearch_password) {
            (Some(username), Some(password)) => Some(ElasticsearchAuth::Basic {
                username: username.clone(),
                password: password.clone(),
            }),
            _ => None,
        };

        ElasticsearchConfig {
            nodes: self.node_urls(),
            index_prefix: self.elasticsearch_index_prefix.clone(),
            request_timeout_ms: self.elasticsearch_timeout_ms,
            auth,
            ..Default::default()
        }
    }
}

/// Installs the global tracing subscriber. `RUST_LOG` overrides `level`.
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("quarry={},quarry_search={}", level, level)));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
