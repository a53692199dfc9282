//! # Leibniz Services
//!
//! Service clients for the Leibniz research pipeline, with an in-process
//! simulator behind every one of them.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use leibniz_services::factory::{StaticEnv, LEIBNIZ_USE_MOCKS_ENV};
//! use leibniz_services::{ClientFactory, ServiceSettings};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let env = Arc::new(StaticEnv::new());
//! env.set(LEIBNIZ_USE_MOCKS_ENV, "true");
//! let factory = ClientFactory::new(ServiceSettings::default()).with_env(env);
//! let settings = factory.settings().clone();
//!
//! let cache = factory.cache_client(&settings.cache_options());
//! cache.setex("query:sparse", 60, "cached").await?;
//! assert_eq!(cache.get("query:sparse").await?.as_deref(), Some("cached"));
//!
//! let search = factory.search_client(&settings.search_options());
//! let response = search.index("papers").search("transformer", 20).await?;
//! assert_eq!(response.hits[0].document.id, "test_p_2");
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      ClientFactory                       │
//! │   CODEX_ENVIRONMENT / LEIBNIZ_USE_MOCKS → simulator      │
//! │   otherwise real adapter, simulator on construction err  │
//! ├──────────────┬───────────────────┬───────────────────────┤
//! │ cache        │ SimCache          │ RedisCache      redis │
//! │ graph        │ SimGraph          │ Neo4jGraph      neo4j │
//! │ vector       │ SimVectorSearch   │ QdrantClient   qdrant │
//! │ search       │ SimSearch         │ Meilisearch... meili. │
//! │ llm          │ SimLanguageModel  │ OpenAIClient   openai │
//! │ parser       │ SimDocumentParser │                       │
//! └──────────────┴───────────────────┴───────────────────────┘
//! ```
//!
//! ## Feature Flags
//!
//! - `redis` - RESP cache adapter over TCP
//! - `neo4j` - Neo4j HTTP transaction API
//! - `qdrant` - Qdrant REST API
//! - `meilisearch` - Meilisearch REST API
//! - `openai` - OpenAI-compatible embeddings and chat
//! - `all-backends` - All of the above

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod cache;
pub mod error;
pub mod factory;
pub mod graph;
pub mod llm;
pub mod parser;
pub mod search;
pub mod settings;
pub mod telemetry;
pub mod vector;

// Re-export common types
pub use cache::{CacheClient, SimCache};
pub use error::{ClientError, ClientResult};
pub use factory::{ClientFactory, ServiceKind};
pub use graph::{GraphClient, GraphRecord, GraphSession, RecordStream, SimGraph};
pub use llm::{
    ChatMessage, ChatRequest, ChatResponse, ChatStream, EmbeddingRequest, LanguageModelClient,
    SimLanguageModel,
};
pub use parser::{DocumentParser, ParsedDocument, SimDocumentParser};
pub use search::{SearchClient, SearchDocument, SearchIndex, SearchResponse, SimSearch};
pub use settings::ServiceSettings;
pub use telemetry::{init_tracing, TelemetryConfig};
pub use vector::{ScoredPoint, SimVectorSearch, VectorSearchClient};
