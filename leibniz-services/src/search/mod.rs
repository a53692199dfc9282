//! Full-Text Search - Index Clients
//!
//! `TigerStyle`: Simulation-first search abstraction.
//!
//! # Architecture
//!
//! ```text
//! SearchClient (trait) ──index(name)──> SearchIndex (trait)
//! ├── SimSearch                         ├── SimSearchIndex
//! └── MeilisearchClient (meilisearch)   └── MeilisearchIndex (meilisearch)
//! ```

mod sim;

#[cfg(feature = "meilisearch")]
mod meilisearch;

pub use sim::{SimSearch, SimSearchIndex};

#[cfg(feature = "meilisearch")]
pub use self::meilisearch::{MeilisearchClient, MeilisearchIndex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ClientResult;

// =============================================================================
// Documents
// =============================================================================

/// A searchable document.
///
/// `title` and `abstract` are the searched text; any other fields ride along
/// in `metadata` and are returned with hits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchDocument {
    /// Document ID
    pub id: String,
    /// Title
    #[serde(default)]
    pub title: String,
    /// Abstract
    #[serde(rename = "abstract", default)]
    pub abstract_text: String,
    /// Remaining fields (year, venue, ...)
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl SearchDocument {
    /// Create a document with no metadata.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        abstract_text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            abstract_text: abstract_text.into(),
            metadata: Map::new(),
        }
    }

    /// Attach a metadata field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A matching document and its relevance score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// The stored document
    #[serde(flatten)]
    pub document: SearchDocument,
    /// Relevance score (higher = more relevant)
    #[serde(rename = "_score", alias = "_rankingScore", default)]
    pub score: f64,
}

/// Result of a search call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    /// Hits sorted by score (highest first)
    pub hits: Vec<SearchHit>,
    /// Engine processing time
    pub processing_time_ms: u64,
    /// The query as received
    pub query: String,
    /// The limit as received
    pub limit: usize,
}

// =============================================================================
// Traits
// =============================================================================

/// Trait for full-text search clients.
pub trait SearchClient: Send + Sync + std::fmt::Debug {
    /// Get a handle to a named index.
    fn index(&self, name: &str) -> Box<dyn SearchIndex>;

    /// Get the client name for logging/debugging.
    fn name(&self) -> &'static str;

    /// Check if this is a simulation client.
    fn is_simulation(&self) -> bool;
}

/// Operations on one index.
#[async_trait]
pub trait SearchIndex: Send + Sync + std::fmt::Debug {
    /// Keyword search.
    async fn search(&self, query: &str, limit: usize) -> ClientResult<SearchResponse>;

    /// Append documents.
    async fn add_documents(&self, documents: Vec<SearchDocument>) -> ClientResult<()>;

    /// Replace index settings (searchable attributes, ranking rules, ...).
    async fn update_settings(&self, settings: Value) -> ClientResult<()>;

    /// Index name.
    fn uid(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_serde_shape() {
        let doc = SearchDocument::new("test_p_1", "Title", "Abstract text")
            .with_field("year", 2023)
            .with_field("venue", "NeurIPS");

        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "test_p_1",
                "title": "Title",
                "abstract": "Abstract text",
                "year": 2023,
                "venue": "NeurIPS"
            })
        );

        let back: SearchDocument = serde_json::from_value(value).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_hit_accepts_ranking_score() {
        let hit: SearchHit = serde_json::from_value(json!({
            "id": "x",
            "title": "t",
            "abstract": "a",
            "_rankingScore": 0.5
        }))
        .unwrap();
        assert!((hit.score - 0.5).abs() < f64::EPSILON);
        assert!(hit.document.metadata.is_empty());
    }

    #[test]
    fn test_response_uses_camel_case() {
        let response = SearchResponse {
            hits: Vec::new(),
            processing_time_ms: 15,
            query: "q".to_string(),
            limit: 20,
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["processingTimeMs"], json!(15));
    }
}
