//! Service Settings
//!
//! `TigerStyle`: Sensible defaults, builder pattern, explicit over implicit.
//!
//! `ServiceSettings` is an explicit value handed to the
//! [`ClientFactory`](crate::factory::ClientFactory). There is no process-wide
//! settings singleton; tests build the settings they need.

use leibniz_core::constants::{
    BATCH_SIZE_COUNT_DEFAULT, CACHE_PORT_DEFAULT, CACHE_TTL_SECS_DEFAULT, GRAPH_HTTP_PORT_DEFAULT,
    PARSER_PORT_DEFAULT, QUERY_TIMEOUT_MS_DEFAULT, SEARCH_PORT_DEFAULT, VECTOR_HTTP_PORT_DEFAULT,
    WORKERS_COUNT_DEFAULT,
};

use crate::error::{ClientError, ClientResult};

/// Default OpenAI-compatible API base URL
pub const OPENAI_BASE_URL_DEFAULT: &str = "https://api.openai.com/v1";

// =============================================================================
// ServiceSettings
// =============================================================================

/// Endpoints, credentials and performance knobs for every backing service.
///
/// # Example
///
/// ```rust
/// use leibniz_services::settings::ServiceSettings;
///
/// let settings = ServiceSettings::default()
///     .with_redis_url("redis://cache.internal:6379")
///     .with_query_timeout_ms(500);
/// assert!(settings.validate().is_ok());
/// assert_eq!(settings.cache_options().url, "redis://cache.internal:6379");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSettings {
    /// API key for the hosted language model
    pub openai_api_key: String,
    /// Base URL of the OpenAI-compatible API
    pub openai_base_url: String,
    /// Key-value cache URL
    pub redis_url: String,
    /// Graph database HTTP endpoint
    pub neo4j_uri: String,
    /// Graph database user
    pub neo4j_user: String,
    /// Graph database password
    pub neo4j_password: String,
    /// Graph database name
    pub neo4j_database: String,
    /// Vector database host
    pub qdrant_host: String,
    /// Vector database HTTP port
    pub qdrant_port: u16,
    /// Full-text search URL
    pub meilisearch_host: String,
    /// Full-text search API key
    pub meilisearch_key: String,
    /// Document parser URL
    pub grobid_host: String,
    /// Per-request timeout for infrastructure queries
    pub query_timeout_ms: u64,
    /// Default cache TTL
    pub cache_ttl_secs: u64,
    /// Worker pool size for bulk jobs
    pub max_workers: usize,
    /// Batch size for bulk jobs
    pub batch_size: usize,
    /// Verbose diagnostics
    pub debug: bool,
    /// Log filter directive (e.g. "info", "leibniz_services=debug")
    pub log_level: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            openai_api_key: String::new(),
            openai_base_url: OPENAI_BASE_URL_DEFAULT.to_string(),
            redis_url: format!("redis://localhost:{CACHE_PORT_DEFAULT}"),
            neo4j_uri: format!("http://localhost:{GRAPH_HTTP_PORT_DEFAULT}"),
            neo4j_user: "neo4j".to_string(),
            neo4j_password: String::new(),
            neo4j_database: "neo4j".to_string(),
            qdrant_host: "localhost".to_string(),
            qdrant_port: VECTOR_HTTP_PORT_DEFAULT,
            meilisearch_host: format!("http://localhost:{SEARCH_PORT_DEFAULT}"),
            meilisearch_key: String::new(),
            grobid_host: format!("http://localhost:{PARSER_PORT_DEFAULT}"),
            query_timeout_ms: QUERY_TIMEOUT_MS_DEFAULT,
            cache_ttl_secs: CACHE_TTL_SECS_DEFAULT,
            max_workers: WORKERS_COUNT_DEFAULT,
            batch_size: BATCH_SIZE_COUNT_DEFAULT,
            debug: false,
            log_level: "info".to_string(),
        }
    }
}

impl ServiceSettings {
    /// Create settings with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the OpenAI API key.
    #[must_use]
    pub fn with_openai_api_key(mut self, key: impl Into<String>) -> Self {
        self.openai_api_key = key.into();
        self
    }

    /// Set the OpenAI-compatible base URL.
    #[must_use]
    pub fn with_openai_base_url(mut self, url: impl Into<String>) -> Self {
        self.openai_base_url = url.into();
        self
    }

    /// Set the cache URL.
    #[must_use]
    pub fn with_redis_url(mut self, url: impl Into<String>) -> Self {
        self.redis_url = url.into();
        self
    }

    /// Set graph database endpoint and credentials.
    #[must_use]
    pub fn with_neo4j(
        mut self,
        uri: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.neo4j_uri = uri.into();
        self.neo4j_user = user.into();
        self.neo4j_password = password.into();
        self
    }

    /// Set vector database host and port.
    #[must_use]
    pub fn with_qdrant(mut self, host: impl Into<String>, port: u16) -> Self {
        self.qdrant_host = host.into();
        self.qdrant_port = port;
        self
    }

    /// Set full-text search URL and key.
    #[must_use]
    pub fn with_meilisearch(mut self, host: impl Into<String>, key: impl Into<String>) -> Self {
        self.meilisearch_host = host.into();
        self.meilisearch_key = key.into();
        self
    }

    /// Set the document parser URL.
    #[must_use]
    pub fn with_grobid_host(mut self, host: impl Into<String>) -> Self {
        self.grobid_host = host.into();
        self
    }

    /// Set the per-request timeout.
    #[must_use]
    pub fn with_query_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.query_timeout_ms = timeout_ms;
        self
    }

    /// Set the default cache TTL.
    #[must_use]
    pub fn with_cache_ttl_secs(mut self, ttl_secs: u64) -> Self {
        self.cache_ttl_secs = ttl_secs;
        self
    }

    /// Set the log filter directive.
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Enable or disable debug diagnostics.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Check the settings for values no backend could use.
    ///
    /// # Errors
    /// Returns `ClientError::InvalidConfig` naming the first bad field.
    pub fn validate(&self) -> ClientResult<()> {
        let endpoints = [
            ("redis_url", &self.redis_url),
            ("neo4j_uri", &self.neo4j_uri),
            ("qdrant_host", &self.qdrant_host),
            ("meilisearch_host", &self.meilisearch_host),
            ("grobid_host", &self.grobid_host),
            ("openai_base_url", &self.openai_base_url),
        ];
        for (field, value) in endpoints {
            if value.trim().is_empty() {
                return Err(ClientError::invalid_config(format!("{field} must not be empty")));
            }
        }

        if self.qdrant_port == 0 {
            return Err(ClientError::invalid_config("qdrant_port must be non-zero"));
        }
        if self.query_timeout_ms == 0 {
            return Err(ClientError::invalid_config("query_timeout_ms must be positive"));
        }
        if self.max_workers == 0 || self.batch_size == 0 {
            return Err(ClientError::invalid_config(
                "max_workers and batch_size must be positive",
            ));
        }

        Ok(())
    }

    /// Options for the key-value cache client.
    #[must_use]
    pub fn cache_options(&self) -> CacheOptions {
        CacheOptions {
            url: self.redis_url.clone(),
            timeout_ms: self.query_timeout_ms,
        }
    }

    /// Options for the graph database client.
    #[must_use]
    pub fn graph_options(&self) -> GraphOptions {
        GraphOptions {
            uri: self.neo4j_uri.clone(),
            user: self.neo4j_user.clone(),
            password: self.neo4j_password.clone(),
            database: self.neo4j_database.clone(),
            timeout_ms: self.query_timeout_ms,
        }
    }

    /// Options for the vector database client.
    #[must_use]
    pub fn vector_options(&self) -> VectorOptions {
        VectorOptions {
            host: self.qdrant_host.clone(),
            port: self.qdrant_port,
            api_key: None,
            timeout_ms: self.query_timeout_ms,
        }
    }

    /// Options for the full-text search client.
    #[must_use]
    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            url: self.meilisearch_host.clone(),
            api_key: non_empty(&self.meilisearch_key),
            timeout_ms: self.query_timeout_ms,
        }
    }

    /// Options for the language model client.
    #[must_use]
    pub fn language_model_options(&self) -> LanguageModelOptions {
        LanguageModelOptions {
            api_key: self.openai_api_key.clone(),
            base_url: self.openai_base_url.clone(),
            timeout_ms: self.query_timeout_ms,
        }
    }

    /// Options for the document parser.
    #[must_use]
    pub fn document_parser_options(&self) -> DocumentParserOptions {
        DocumentParserOptions {
            base_url: self.grobid_host.clone(),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

// =============================================================================
// Per-service options
// =============================================================================

/// Options forwarded to the real cache client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheOptions {
    /// `redis://host:port[/db]`
    pub url: String,
    /// Connect and command timeout
    pub timeout_ms: u64,
}

impl Default for CacheOptions {
    fn default() -> Self {
        ServiceSettings::default().cache_options()
    }
}

/// Options forwarded to the real graph client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphOptions {
    /// HTTP endpoint of the graph database
    pub uri: String,
    /// User name
    pub user: String,
    /// Password
    pub password: String,
    /// Database name
    pub database: String,
    /// Request timeout
    pub timeout_ms: u64,
}

impl Default for GraphOptions {
    fn default() -> Self {
        ServiceSettings::default().graph_options()
    }
}

/// Options forwarded to the real vector client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorOptions {
    /// Host name
    pub host: String,
    /// HTTP port
    pub port: u16,
    /// Optional API key
    pub api_key: Option<String>,
    /// Request timeout
    pub timeout_ms: u64,
}

impl VectorOptions {
    /// Base URL derived from host and port.
    #[must_use]
    pub fn base_url(&self) -> String {
        if self.host.starts_with("http://") || self.host.starts_with("https://") {
            format!("{}:{}", self.host.trim_end_matches('/'), self.port)
        } else {
            format!("http://{}:{}", self.host, self.port)
        }
    }
}

impl Default for VectorOptions {
    fn default() -> Self {
        ServiceSettings::default().vector_options()
    }
}

/// Options forwarded to the real full-text search client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// Base URL
    pub url: String,
    /// Optional API key
    pub api_key: Option<String>,
    /// Request timeout
    pub timeout_ms: u64,
}

impl Default for SearchOptions {
    fn default() -> Self {
        ServiceSettings::default().search_options()
    }
}

/// Options forwarded to the real language model client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageModelOptions {
    /// API key (required by the real client)
    pub api_key: String,
    /// Base URL of the OpenAI-compatible API
    pub base_url: String,
    /// Request timeout
    pub timeout_ms: u64,
}

impl Default for LanguageModelOptions {
    fn default() -> Self {
        ServiceSettings::default().language_model_options()
    }
}

/// Options for the document parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentParserOptions {
    /// Base URL of the parsing service
    pub base_url: String,
}

impl Default for DocumentParserOptions {
    fn default() -> Self {
        ServiceSettings::default().document_parser_options()
    }
}
