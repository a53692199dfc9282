//! Client Factory - Simulation or Real Backend per Call
//!
//! `TigerStyle`: Fail open to the simulator, never propagate construction
//! errors.
//!
//! # Decision procedure
//!
//! ```text
//! simulation signal set? ──yes──> simulator
//!        │ no
//!        ▼
//! construct real client ──Err──> simulator (warn)
//!        │ Ok
//!        ▼
//!   real client
//! ```
//!
//! The signal is read on every call, so flipping `LEIBNIZ_USE_MOCKS` between
//! calls changes what the next call returns. A real backend whose cargo
//! feature is off counts as a construction error.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use leibniz_services::factory::{ClientFactory, StaticEnv, LEIBNIZ_USE_MOCKS_ENV};
//! use leibniz_services::settings::ServiceSettings;
//!
//! let env = Arc::new(StaticEnv::new());
//! env.set(LEIBNIZ_USE_MOCKS_ENV, "true");
//!
//! let factory = ClientFactory::new(ServiceSettings::default()).with_env(env);
//! let cache = factory.cache_client(&factory.settings().cache_options());
//! assert!(cache.is_simulation());
//! ```

mod env;

pub use env::{
    simulation_requested, EnvSource, ProcessEnv, StaticEnv, CODEX_ENVIRONMENT_ENV,
    LEIBNIZ_USE_MOCKS_ENV,
};

use std::fmt;
use std::sync::Arc;

use crate::cache::{CacheClient, SimCache};
use crate::error::ClientResult;
use crate::graph::{GraphClient, SimGraph};
use crate::llm::{LanguageModelClient, SimLanguageModel};
use crate::parser::{DocumentParser, SimDocumentParser};
use crate::search::{SearchClient, SimSearch};
use crate::settings::{
    CacheOptions, DocumentParserOptions, GraphOptions, LanguageModelOptions, SearchOptions,
    ServiceSettings, VectorOptions,
};
use crate::vector::{SimVectorSearch, VectorSearchClient};

#[cfg(not(all(
    feature = "redis",
    feature = "neo4j",
    feature = "qdrant",
    feature = "meilisearch",
    feature = "openai"
)))]
use crate::error::ClientError;

// =============================================================================
// ServiceKind
// =============================================================================

/// The six service kinds the factory hands out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    /// Key-value cache
    Cache,
    /// Graph database
    Graph,
    /// Vector database
    Vector,
    /// Full-text search
    Search,
    /// Embeddings and chat
    LanguageModel,
    /// PDF parsing
    DocumentParser,
}

impl ServiceKind {
    /// All kinds, in factory method order.
    pub const ALL: [Self; 6] = [
        Self::Cache,
        Self::Graph,
        Self::Vector,
        Self::Search,
        Self::LanguageModel,
        Self::DocumentParser,
    ];

    /// Short name for logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::Graph => "graph",
            Self::Vector => "vector",
            Self::Search => "search",
            Self::LanguageModel => "language_model",
            Self::DocumentParser => "document_parser",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Real constructors
// =============================================================================

fn real_cache(options: &CacheOptions) -> ClientResult<Box<dyn CacheClient>> {
    #[cfg(feature = "redis")]
    {
        Ok(Box::new(crate::cache::RedisCache::new(options)?))
    }
    #[cfg(not(feature = "redis"))]
    {
        let _ = options;
        Err(ClientError::backend_unavailable(
            ServiceKind::Cache.as_str(),
            "feature `redis` not enabled",
        ))
    }
}

fn real_graph(options: &GraphOptions) -> ClientResult<Box<dyn GraphClient>> {
    #[cfg(feature = "neo4j")]
    {
        Ok(Box::new(crate::graph::Neo4jGraph::new(options)?))
    }
    #[cfg(not(feature = "neo4j"))]
    {
        let _ = options;
        Err(ClientError::backend_unavailable(
            ServiceKind::Graph.as_str(),
            "feature `neo4j` not enabled",
        ))
    }
}

fn real_vector(options: &VectorOptions) -> ClientResult<Box<dyn VectorSearchClient>> {
    #[cfg(feature = "qdrant")]
    {
        Ok(Box::new(crate::vector::QdrantClient::new(options)?))
    }
    #[cfg(not(feature = "qdrant"))]
    {
        let _ = options;
        Err(ClientError::backend_unavailable(
            ServiceKind::Vector.as_str(),
            "feature `qdrant` not enabled",
        ))
    }
}

fn real_search(options: &SearchOptions) -> ClientResult<Box<dyn SearchClient>> {
    #[cfg(feature = "meilisearch")]
    {
        Ok(Box::new(crate::search::MeilisearchClient::new(options)?))
    }
    #[cfg(not(feature = "meilisearch"))]
    {
        let _ = options;
        Err(ClientError::backend_unavailable(
            ServiceKind::Search.as_str(),
            "feature `meilisearch` not enabled",
        ))
    }
}

fn real_language_model(
    options: &LanguageModelOptions,
) -> ClientResult<Box<dyn LanguageModelClient>> {
    #[cfg(feature = "openai")]
    {
        Ok(Box::new(crate::llm::OpenAIClient::new(options)?))
    }
    #[cfg(not(feature = "openai"))]
    {
        let _ = options;
        Err(ClientError::backend_unavailable(
            ServiceKind::LanguageModel.as_str(),
            "feature `openai` not enabled",
        ))
    }
}

// =============================================================================
// ClientFactory
// =============================================================================

/// Hands out service clients, simulated or real.
///
/// Each call returns a fresh client. Simulators created by separate calls do
/// not share state.
#[derive(Debug, Clone)]
pub struct ClientFactory {
    settings: ServiceSettings,
    env: Arc<dyn EnvSource>,
}

impl ClientFactory {
    /// Create a factory reading signals from the process environment.
    #[must_use]
    pub fn new(settings: ServiceSettings) -> Self {
        Self {
            settings,
            env: Arc::new(ProcessEnv),
        }
    }

    /// Read signals from another source.
    #[must_use]
    pub fn with_env(mut self, env: Arc<dyn EnvSource>) -> Self {
        self.env = env;
        self
    }

    /// Settings the factory was built with.
    #[must_use]
    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    /// Whether simulators are forced right now.
    #[must_use]
    pub fn simulation_mode(&self) -> bool {
        simulation_requested(self.env.as_ref())
    }

    fn resolve<T: ?Sized>(
        &self,
        kind: ServiceKind,
        real: impl FnOnce() -> ClientResult<Box<T>>,
        sim: impl FnOnce() -> Box<T>,
    ) -> Box<T> {
        if self.simulation_mode() {
            tracing::debug!(service = %kind, "simulation mode, using simulator");
            return sim();
        }

        match real() {
            Ok(client) => {
                tracing::debug!(service = %kind, "using real backend");
                client
            }
            Err(err) => {
                tracing::warn!(
                    service = %kind,
                    error = %err,
                    "real backend unavailable, falling back to simulator"
                );
                sim()
            }
        }
    }

    /// Key-value cache client.
    #[must_use]
    pub fn cache_client(&self, options: &CacheOptions) -> Box<dyn CacheClient> {
        self.resolve::<dyn CacheClient>(
            ServiceKind::Cache,
            || real_cache(options),
            || Box::new(SimCache::new()),
        )
    }

    /// Graph database driver.
    #[must_use]
    pub fn graph_client(&self, options: &GraphOptions) -> Box<dyn GraphClient> {
        self.resolve::<dyn GraphClient>(
            ServiceKind::Graph,
            || real_graph(options),
            || Box::new(SimGraph::new()),
        )
    }

    /// Vector database client.
    #[must_use]
    pub fn vector_client(&self, options: &VectorOptions) -> Box<dyn VectorSearchClient> {
        self.resolve::<dyn VectorSearchClient>(
            ServiceKind::Vector,
            || real_vector(options),
            || Box::new(SimVectorSearch::new()),
        )
    }

    /// Full-text search client.
    #[must_use]
    pub fn search_client(&self, options: &SearchOptions) -> Box<dyn SearchClient> {
        self.resolve::<dyn SearchClient>(
            ServiceKind::Search,
            || real_search(options),
            || Box::new(SimSearch::new()),
        )
    }

    /// Embeddings and chat client.
    #[must_use]
    pub fn language_model_client(
        &self,
        options: &LanguageModelOptions,
    ) -> Box<dyn LanguageModelClient> {
        self.resolve::<dyn LanguageModelClient>(
            ServiceKind::LanguageModel,
            || real_language_model(options),
            || Box::new(SimLanguageModel::new()),
        )
    }

    /// PDF parser. Always the simulator.
    #[must_use]
    pub fn document_parser(&self, options: &DocumentParserOptions) -> Box<dyn DocumentParser> {
        tracing::debug!(
            service = %ServiceKind::DocumentParser,
            base_url = %options.base_url,
            "no real backend, using simulator"
        );
        Box::new(SimDocumentParser::new(options))
    }
}

impl Default for ClientFactory {
    fn default() -> Self {
        Self::new(ServiceSettings::default())
    }
}
