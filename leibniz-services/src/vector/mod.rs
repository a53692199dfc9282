//! Vector Database - Similarity Search Clients
//!
//! `TigerStyle`: Trait-based abstraction, simulation-first testing.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │            VectorSearchClient Trait          │
//! └─────────────────────────────────────────────┘
//!          ↑                         ↑
//! ┌────────┴────────┐       ┌────────┴────────┐
//! │ SimVectorSearch │       │  QdrantClient   │
//! │   (testing)     │       │ (feature qdrant)│
//! └─────────────────┘       └─────────────────┘
//! ```

mod sim;

#[cfg(feature = "qdrant")]
mod qdrant;

pub use sim::SimVectorSearch;

#[cfg(feature = "qdrant")]
pub use qdrant::QdrantClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ClientResult;

/// Point payload: arbitrary JSON fields.
pub type Payload = Map<String, Value>;

/// Result of a similarity search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPoint {
    /// Point ID
    pub id: String,
    /// Similarity score (higher = more similar)
    pub score: f32,
    /// Stored payload
    #[serde(default)]
    pub payload: Payload,
}

/// A point to upsert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorPoint {
    /// Point ID
    pub id: String,
    /// Embedding
    pub vector: Vec<f32>,
    /// Payload stored alongside the vector
    #[serde(default)]
    pub payload: Payload,
}

/// Distance metric of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Distance {
    /// Cosine similarity
    #[default]
    Cosine,
    /// Dot product
    Dot,
    /// Euclidean distance
    Euclid,
}

/// Trait for vector database clients.
#[async_trait]
pub trait VectorSearchClient: Send + Sync + std::fmt::Debug {
    /// Search a collection for the nearest points.
    ///
    /// # Returns
    /// At most `limit` results sorted by score (highest first). An unknown
    /// collection yields an empty list.
    async fn search(
        &self,
        collection: &str,
        query_vector: &[f32],
        limit: usize,
    ) -> ClientResult<Vec<ScoredPoint>>;

    /// Drop and create a collection.
    async fn recreate_collection(
        &self,
        collection: &str,
        vector_size: usize,
        distance: Distance,
    ) -> ClientResult<()>;

    /// Insert or replace points.
    async fn upsert(&self, collection: &str, points: Vec<VectorPoint>) -> ClientResult<()>;

    /// Get the client name for logging/debugging.
    fn name(&self) -> &'static str;

    /// Check if this is a simulation client.
    fn is_simulation(&self) -> bool;
}
