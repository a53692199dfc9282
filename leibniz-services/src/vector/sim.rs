//! `SimVectorSearch` - Fixed-Rank Vector Search Simulation
//!
//! `TigerStyle`: Deterministic scores, query vector ignored.
//!
//! Collections are seeded once and never change. Search returns the
//! collection in stored order with score `0.95 - 0.10 * rank`, floored at 0.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use leibniz_core::constants::{EMBEDDING_DIMENSIONS_COUNT, VECTOR_SCORE_STEP, VECTOR_SCORE_TOP};
use leibniz_core::dst::DeterministicRng;

use super::{Distance, Payload, ScoredPoint, VectorPoint, VectorSearchClient};
use crate::error::ClientResult;

/// Seed for the stored vectors of the fixture collection
const VECTOR_FIXTURE_SEED: u64 = 42;

/// Name of the seeded collection
pub(crate) const PAPERS_COLLECTION: &str = "papers";

/// Score for the result at `rank` (0-based).
#[must_use]
fn rank_score(rank: usize) -> f32 {
    #[allow(clippy::cast_precision_loss)]
    let score = VECTOR_SCORE_TOP - VECTOR_SCORE_STEP * rank as f32;
    let score = score.max(0.0);

    // Postcondition
    debug_assert!((0.0..=1.0).contains(&score), "score out of range: {score}");
    score
}

fn payload(value: Value) -> Payload {
    match value {
        Value::Object(fields) => fields,
        _ => Payload::new(),
    }
}

fn papers_fixture() -> Vec<VectorPoint> {
    let mut rng = DeterministicRng::new(VECTOR_FIXTURE_SEED);

    let rows = [
        (
            "test_p_1",
            "Efficient Transformers via Sparse Attention",
            "We propose sparse attention mechanisms...",
            2023,
            "NeurIPS",
        ),
        (
            "test_p_2",
            "Quantization Methods for Transformer Models",
            "This paper explores quantization techniques...",
            2023,
            "ICLR",
        ),
        (
            "test_p_3",
            "Knowledge Distillation in Large Language Models",
            "We present a novel distillation approach...",
            2024,
            "ICML",
        ),
    ];

    rows.into_iter()
        .map(|(id, title, abstract_text, year, venue)| VectorPoint {
            id: id.to_string(),
            vector: rng.fork().next_signed_floats(EMBEDDING_DIMENSIONS_COUNT),
            payload: payload(json!({
                "paper_id": id,
                "title": title,
                "abstract": abstract_text,
                "year": year,
                "venue": venue,
            })),
        })
        .collect()
}

// =============================================================================
// SimVectorSearch
// =============================================================================

/// In-process vector database simulation.
///
/// # Example
///
/// ```rust
/// use leibniz_services::vector::{SimVectorSearch, VectorSearchClient};
///
/// #[tokio::main]
/// async fn main() {
///     let client = SimVectorSearch::new();
///     let hits = client.search("papers", &[0.0; 4], 2).await.unwrap();
///     assert_eq!(hits.len(), 2);
///     assert!(hits[0].score > hits[1].score);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SimVectorSearch {
    collections: Arc<HashMap<String, Vec<VectorPoint>>>,
}

impl SimVectorSearch {
    /// Create a simulator with the `papers` collection seeded.
    #[must_use]
    pub fn new() -> Self {
        let mut collections = HashMap::new();
        collections.insert(PAPERS_COLLECTION.to_string(), papers_fixture());
        Self {
            collections: Arc::new(collections),
        }
    }

    /// Number of points in a collection, if it exists.
    #[must_use]
    pub fn collection_len(&self, collection: &str) -> Option<usize> {
        self.collections.get(collection).map(Vec::len)
    }
}

impl Default for SimVectorSearch {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorSearchClient for SimVectorSearch {
    #[tracing::instrument(level = "trace", skip(self, query_vector))]
    async fn search(
        &self,
        collection: &str,
        query_vector: &[f32],
        limit: usize,
    ) -> ClientResult<Vec<ScoredPoint>> {
        let Some(points) = self.collections.get(collection) else {
            tracing::trace!(collection, "unknown collection");
            return Ok(Vec::new());
        };

        let results: Vec<ScoredPoint> = points
            .iter()
            .take(limit)
            .enumerate()
            .map(|(rank, point)| ScoredPoint {
                id: point.id.clone(),
                score: rank_score(rank),
                payload: point.payload.clone(),
            })
            .collect();

        // Postcondition
        debug_assert!(results.len() <= limit, "results exceed limit");
        Ok(results)
    }

    async fn recreate_collection(
        &self,
        collection: &str,
        vector_size: usize,
        distance: Distance,
    ) -> ClientResult<()> {
        tracing::trace!(collection, vector_size, ?distance, "recreate_collection accepted");
        Ok(())
    }

    async fn upsert(&self, collection: &str, points: Vec<VectorPoint>) -> ClientResult<()> {
        tracing::trace!(collection, points = points.len(), "upsert accepted");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "sim-vector"
    }

    fn is_simulation(&self) -> bool {
        true
    }
}

// =============================================================================
// Tests
// =============================================================================
