//! Graph Database - Client Traits and Implementations
//!
//! `TigerStyle`: Simulation-first graph abstraction.
//!
//! # Architecture
//!
//! ```text
//! GraphClient (trait)          GraphSession (trait)
//! ├── SimGraph                 ├── SimGraphSession
//! └── Neo4jGraph (neo4j)       └── Neo4jSession (neo4j)
//! ```
//!
//! A client hands out sessions; a session runs Cypher text and yields a
//! [`RecordStream`] of [`GraphRecord`]s keyed by the query's return aliases
//! (`"p.id"`, `"c.claim"`, ...).

mod sim;

#[cfg(feature = "neo4j")]
mod neo4j;

pub use sim::{SimGraph, SimGraphSession};

#[cfg(feature = "neo4j")]
pub use neo4j::{Neo4jGraph, Neo4jSession};

use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ClientResult;

/// Query parameters, bound by name (`$paper_id`).
pub type QueryParams = Map<String, Value>;

// =============================================================================
// GraphRecord
// =============================================================================

/// One result row: return alias to value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GraphRecord(Map<String, Value>);

impl GraphRecord {
    /// Create a record from a field map.
    #[must_use]
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Look up a field by alias.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Look up a string field.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Field aliases, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume into the underlying map.
    #[must_use]
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for GraphRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

// =============================================================================
// RecordStream
// =============================================================================

/// Asynchronously iterable query result.
///
/// Results are fully buffered; polling never pends.
///
/// # Example
///
/// ```rust
/// use futures::StreamExt;
/// use leibniz_services::graph::{GraphRecord, RecordStream};
///
/// #[tokio::main]
/// async fn main() {
///     let mut stream = RecordStream::new(vec![GraphRecord::default()]);
///     assert_eq!(stream.len(), 1);
///     assert!(stream.next().await.is_some());
///     assert!(stream.next().await.is_none());
/// }
/// ```
#[derive(Debug, Default)]
pub struct RecordStream {
    records: std::vec::IntoIter<GraphRecord>,
}

impl RecordStream {
    /// Wrap buffered records.
    #[must_use]
    pub fn new(records: Vec<GraphRecord>) -> Self {
        Self {
            records: records.into_iter(),
        }
    }

    /// An exhausted stream.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Records not yet yielded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if no records remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.len() == 0
    }

    /// Take the remaining records without polling.
    #[must_use]
    pub fn into_records(self) -> Vec<GraphRecord> {
        self.records.collect()
    }
}

impl Stream for RecordStream {
    type Item = GraphRecord;

    fn poll_next(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Poll::Ready(self.records.next())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.records.size_hint()
    }
}

// =============================================================================
// Traits
// =============================================================================

/// Trait for graph database clients.
#[async_trait]
pub trait GraphClient: Send + Sync + std::fmt::Debug {
    /// Open a query session.
    fn session(&self) -> Box<dyn GraphSession>;

    /// Release client resources. Idempotent.
    async fn close(&self) -> ClientResult<()>;

    /// Get the client name for logging/debugging.
    fn name(&self) -> &'static str;

    /// Check if this is a simulation client.
    fn is_simulation(&self) -> bool;
}

/// A unit of query execution handed out by a [`GraphClient`].
#[async_trait]
pub trait GraphSession: Send + Sync + std::fmt::Debug {
    /// Run a Cypher query and return its records.
    async fn run(&self, query: &str, params: QueryParams) -> ClientResult<RecordStream>;

    /// End the session. Idempotent.
    async fn close(&self) -> ClientResult<()>;
}
