//! `SimSearch` - Substring-Count Keyword Search
//!
//! `TigerStyle`: Naive, deterministic ranking.
//!
//! # Scoring
//!
//! 1. Lower-case the query and each document's `title + " " + abstract`
//! 2. Split the query on whitespace
//! 3. Score = sum over tokens of non-overlapping substring occurrences
//! 4. Drop zero scores, stable-sort descending, truncate to `limit`
//!
//! Substring counting means `"form"` matches inside `"transformer"`. That is
//! the intended behaviour, not tokenised word matching.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use serde_json::Value;

use leibniz_core::constants::SEARCH_PROCESSING_TIME_MS_SIM;

use super::{SearchClient, SearchDocument, SearchHit, SearchIndex, SearchResponse};
use crate::error::ClientResult;

/// Name of the seeded index
const PAPERS_INDEX: &str = "papers";

type DocumentList = Arc<RwLock<Vec<SearchDocument>>>;

fn papers_fixture() -> Vec<SearchDocument> {
    vec![
        SearchDocument::new(
            "test_p_1",
            "Efficient Transformers via Sparse Attention",
            "We propose sparse attention mechanisms that reduce computational complexity \
             from O(n²) to O(n log n) while maintaining performance.",
        )
        .with_field("year", 2023)
        .with_field("venue", "NeurIPS"),
        SearchDocument::new(
            "test_p_2",
            "Quantization Methods for Transformer Models",
            "This paper explores quantization techniques to compress transformer models \
             to 8-bit and 4-bit representations.",
        )
        .with_field("year", 2023)
        .with_field("venue", "ICLR"),
    ]
}

/// Relevance of one document to pre-lowered query tokens.
fn score_document(document: &SearchDocument, tokens: &[String]) -> usize {
    let text = format!("{} {}", document.title, document.abstract_text).to_lowercase();
    tokens.iter().map(|token| text.matches(token.as_str()).count()).sum()
}

/// Rank documents against a query.
#[allow(clippy::cast_precision_loss)]
fn rank(documents: &[SearchDocument], query: &str, limit: usize) -> Vec<SearchHit> {
    let tokens: Vec<String> = query
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect();
    if tokens.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(usize, &SearchDocument)> = documents
        .iter()
        .map(|document| (score_document(document, &tokens), document))
        .filter(|(score, _)| *score > 0)
        .collect();

    // Stable: equal scores keep insertion order.
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.truncate(limit);

    scored
        .into_iter()
        .map(|(score, document)| SearchHit {
            document: document.clone(),
            score: score as f64,
        })
        .collect()
}

// =============================================================================
// SimSearch
// =============================================================================

/// In-process full-text search simulation.
///
/// Index handles with the same name share one document list, so documents
/// added through one handle are visible through every later handle.
///
/// # Example
///
/// ```rust
/// use leibniz_services::search::{SearchClient, SimSearch};
///
/// #[tokio::main]
/// async fn main() {
///     let client = SimSearch::new();
///     let response = client.index("papers").search("transformer", 20).await.unwrap();
///     assert_eq!(response.hits.len(), 2);
///     assert_eq!(response.hits[0].document.id, "test_p_2");
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SimSearch {
    indexes: Arc<RwLock<HashMap<String, DocumentList>>>,
}

impl SimSearch {
    /// Create a simulator with the `papers` index seeded.
    #[must_use]
    pub fn new() -> Self {
        let mut indexes = HashMap::new();
        indexes.insert(
            PAPERS_INDEX.to_string(),
            Arc::new(RwLock::new(papers_fixture())),
        );
        Self {
            indexes: Arc::new(RwLock::new(indexes)),
        }
    }

    fn documents(&self, name: &str) -> DocumentList {
        if let Some(documents) = self
            .indexes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
        {
            return Arc::clone(documents);
        }

        let mut indexes = self.indexes.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(indexes.entry(name.to_string()).or_default())
    }
}

impl Default for SimSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchClient for SimSearch {
    fn index(&self, name: &str) -> Box<dyn SearchIndex> {
        Box::new(SimSearchIndex {
            uid: name.to_string(),
            documents: self.documents(name),
        })
    }

    fn name(&self) -> &'static str {
        "sim-search"
    }

    fn is_simulation(&self) -> bool {
        true
    }
}

/// Handle to one simulated index.
#[derive(Debug, Clone)]
pub struct SimSearchIndex {
    uid: String,
    documents: DocumentList,
}

impl SimSearchIndex {
    /// Create a standalone index over the given documents.
    #[must_use]
    pub fn with_documents(uid: impl Into<String>, documents: Vec<SearchDocument>) -> Self {
        Self {
            uid: uid.into(),
            documents: Arc::new(RwLock::new(documents)),
        }
    }

    /// Number of stored documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check if the index holds no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SearchIndex for SimSearchIndex {
    #[tracing::instrument(level = "trace", skip(self), fields(index = %self.uid))]
    async fn search(&self, query: &str, limit: usize) -> ClientResult<SearchResponse> {
        let hits = {
            let documents = self.documents.read().unwrap_or_else(PoisonError::into_inner);
            rank(&documents, query, limit)
        };

        // Postconditions
        debug_assert!(hits.len() <= limit, "hits exceed limit");
        debug_assert!(
            hits.windows(2).all(|w| w[0].score >= w[1].score),
            "hits must be sorted by score"
        );

        Ok(SearchResponse {
            hits,
            processing_time_ms: SEARCH_PROCESSING_TIME_MS_SIM,
            query: query.to_string(),
            limit,
        })
    }

    async fn add_documents(&self, documents: Vec<SearchDocument>) -> ClientResult<()> {
        let mut stored = self.documents.write().unwrap_or_else(PoisonError::into_inner);
        stored.extend(documents);
        Ok(())
    }

    async fn update_settings(&self, settings: Value) -> ClientResult<()> {
        tracing::trace!(index = %self.uid, %settings, "update_settings accepted");
        Ok(())
    }

    fn uid(&self) -> &str {
        &self.uid
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn papers() -> SimSearchIndex {
        SimSearchIndex::with_documents(PAPERS_INDEX, papers_fixture())
    }

    #[tokio::test]
    async fn test_transformer_query_ranks_both() {
        let response = papers().search("transformer", 20).await.unwrap();

        assert_eq!(response.hits.len(), 2);
        // test_p_2 mentions "transformer" twice, test_p_1 once.
        assert_eq!(response.hits[0].document.id, "test_p_2");
        assert_eq!(response.hits[1].document.id, "test_p_1");
        assert!((response.hits[0].score - 2.0).abs() < f64::EPSILON);
        assert!((response.hits[1].score - 1.0).abs() < f64::EPSILON);
        assert_eq!(response.processing_time_ms, SEARCH_PROCESSING_TIME_MS_SIM);
        assert_eq!(response.query, "transformer");
        assert_eq!(response.limit, 20);
    }

    #[tokio::test]
    async fn test_no_match_is_empty() {
        let response = papers().search("photosynthesis", 20).await.unwrap();
        assert!(response.hits.is_empty());
    }

    #[tokio::test]
    async fn test_empty_query_is_empty() {
        assert!(papers().search("", 20).await.unwrap().hits.is_empty());
        assert!(papers().search("   ", 20).await.unwrap().hits.is_empty());
    }

    #[tokio::test]
    async fn test_case_insensitive_multi_token() {
        let response = papers().search("SPARSE Quantization", 20).await.unwrap();
        let ids: Vec<_> = response.hits.iter().map(|h| h.document.id.as_str()).collect();
        // test_p_1: "sparse" x2. test_p_2: "quantization" x2.
        assert_eq!(ids, vec!["test_p_1", "test_p_2"]);
    }

    #[tokio::test]
    async fn test_substring_matching() {
        let response = papers().search("form", 20).await.unwrap();
        // "transformers", "performance", "transformer" all contain "form".
        assert_eq!(response.hits.len(), 2);
        assert_eq!(response.hits[0].document.id, "test_p_1");
    }

    #[tokio::test]
    async fn test_limit_truncates() {
        let response = papers().search("transformer", 1).await.unwrap();
        assert_eq!(response.hits.len(), 1);
        assert_eq!(response.hits[0].document.id, "test_p_2");

        assert!(papers().search("transformer", 0).await.unwrap().hits.is_empty());
    }

    #[tokio::test]
    async fn test_hits_carry_metadata() {
        let response = papers().search("quantization", 20).await.unwrap();
        assert_eq!(response.hits[0].document.metadata.get("venue"), Some(&json!("ICLR")));
    }

    #[tokio::test]
    async fn test_add_documents_appends() {
        let index = papers();
        index
            .add_documents(vec![SearchDocument::new(
                "test_p_3",
                "Knowledge Distillation",
                "Distillation for a transformer student.",
            )])
            .await
            .unwrap();

        assert_eq!(index.len(), 3);
        let response = index.search("distillation", 20).await.unwrap();
        assert_eq!(response.hits.len(), 1);
        assert_eq!(response.hits[0].document.id, "test_p_3");
    }

    #[tokio::test]
    async fn test_ties_keep_insertion_order() {
        let index = SimSearchIndex::with_documents(
            "ties",
            vec![
                SearchDocument::new("a", "graph", ""),
                SearchDocument::new("b", "graph", ""),
                SearchDocument::new("c", "graph graph", ""),
            ],
        );

        let response = index.search("graph", 10).await.unwrap();
        let ids: Vec<_> = response.hits.iter().map(|h| h.document.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn test_named_indexes_share_documents() {
        let client = SimSearch::new();

        let fresh = client.index("drafts");
        assert!(fresh.search("anything", 10).await.unwrap().hits.is_empty());

        fresh
            .add_documents(vec![SearchDocument::new("d1", "anything goes", "")])
            .await
            .unwrap();

        let again = client.index("drafts");
        assert_eq!(again.search("anything", 10).await.unwrap().hits.len(), 1);
        assert_eq!(again.uid(), "drafts");

        // The seeded index is untouched.
        let papers = client.index(PAPERS_INDEX);
        assert!(papers.search("anything", 10).await.unwrap().hits.is_empty());
    }

    #[tokio::test]
    async fn test_update_settings_is_noop() {
        let index = papers();
        index
            .update_settings(json!({"searchableAttributes": ["title", "abstract"]}))
            .await
            .unwrap();
        assert_eq!(index.len(), 2);
    }
}
