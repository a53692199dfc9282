//! `SimGraph` - Pattern-Matched Cypher Simulation
//!
//! `TigerStyle`: Fixed seed data, no query planner.
//!
//! The simulator recognises two query shapes by substring and answers each
//! from an immutable bucket of records. Anything else returns no records.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{GraphClient, GraphRecord, GraphSession, QueryParams, RecordStream};
use crate::error::ClientResult;

/// Marker for queries over paper nodes
const PAPER_MATCH_MARKER: &str = "MATCH (p:Paper)";

/// Marker for queries over contradiction edges
const CONTRADICTS_MARKER: &str = "CONTRADICTS";

// =============================================================================
// Seed data
// =============================================================================

#[derive(Debug)]
struct GraphDataset {
    papers: Vec<GraphRecord>,
    contradictions: Vec<GraphRecord>,
}

impl GraphDataset {
    fn seeded() -> Self {
        Self {
            papers: vec![
                record(json!({
                    "p.id": "test_p_1",
                    "p.title": "Efficient Transformers via Sparse Attention",
                    "p.year": 2023,
                    "p.venue": "NeurIPS",
                })),
                record(json!({
                    "p.id": "test_p_2",
                    "p.title": "BERT Performance on SQuAD: A Critical Analysis",
                    "p.year": 2023,
                    "p.venue": "ICLR",
                })),
            ],
            contradictions: vec![record(json!({
                "p1.id": "test_p_1",
                "p2.id": "test_p_2",
                "c.claim": "BERT F1 score on SQuAD",
                "c.delta": 2.8,
            }))],
        }
    }

    fn answer(&self, query: &str) -> &[GraphRecord] {
        if query.contains(PAPER_MATCH_MARKER) && query.contains(CONTRADICTS_MARKER) {
            &self.contradictions
        } else if query.contains(PAPER_MATCH_MARKER) {
            &self.papers
        } else {
            &[]
        }
    }
}

fn record(value: Value) -> GraphRecord {
    match value {
        Value::Object(fields) => GraphRecord::new(fields),
        _ => GraphRecord::default(),
    }
}

// =============================================================================
// SimGraph
// =============================================================================

/// In-process graph driver simulation.
///
/// # Example
///
/// ```rust
/// use leibniz_services::graph::{GraphClient, SimGraph};
///
/// #[tokio::main]
/// async fn main() {
///     let driver = SimGraph::new();
///     let session = driver.session();
///     let records = session
///         .run("MATCH (p:Paper) RETURN p.id", Default::default())
///         .await
///         .unwrap();
///     assert_eq!(records.len(), 2);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SimGraph {
    dataset: Arc<GraphDataset>,
}

impl SimGraph {
    /// Create a driver over the seed dataset.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dataset: Arc::new(GraphDataset::seeded()),
        }
    }
}

impl Default for SimGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GraphClient for SimGraph {
    fn session(&self) -> Box<dyn GraphSession> {
        Box::new(SimGraphSession {
            dataset: Arc::clone(&self.dataset),
        })
    }

    async fn close(&self) -> ClientResult<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "sim-graph"
    }

    fn is_simulation(&self) -> bool {
        true
    }
}

/// Session bound to the simulated dataset.
#[derive(Debug, Clone)]
pub struct SimGraphSession {
    dataset: Arc<GraphDataset>,
}

#[async_trait]
impl GraphSession for SimGraphSession {
    #[tracing::instrument(level = "trace", skip(self, params))]
    async fn run(&self, query: &str, params: QueryParams) -> ClientResult<RecordStream> {
        // Parameters are accepted for interface parity only.
        let _ = params;

        let records = self.dataset.answer(query).to_vec();
        tracing::trace!(records = records.len(), "simulated graph query");
        Ok(RecordStream::new(records))
    }

    async fn close(&self) -> ClientResult<()> {
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
