//! `Neo4jGraph` - Neo4j HTTP Transactional API
//!
//! `TigerStyle`: Production client, feature-gated.
//!
//! Each `run` is one auto-commit transaction against
//! `POST {uri}/db/{database}/tx/commit`.
//!
//! Requires `neo4j` feature flag:
//! ```toml
//! leibniz-services = { version = "0.1", features = ["neo4j"] }
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{GraphClient, GraphRecord, GraphSession, QueryParams, RecordStream};
use crate::error::{ClientError, ClientResult};
use crate::settings::GraphOptions;

// =============================================================================
// API Types
// =============================================================================

#[derive(Debug, Serialize)]
struct CommitRequest<'a> {
    statements: [Statement<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Statement<'a> {
    statement: &'a str,
    parameters: &'a QueryParams,
}

#[derive(Debug, Deserialize)]
struct CommitResponse {
    #[serde(default)]
    results: Vec<StatementResult>,
    #[serde(default)]
    errors: Vec<Neo4jError>,
}

#[derive(Debug, Deserialize)]
struct StatementResult {
    columns: Vec<String>,
    #[serde(default)]
    data: Vec<RowData>,
}

#[derive(Debug, Deserialize)]
struct RowData {
    row: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct Neo4jError {
    code: String,
    message: String,
}

// =============================================================================
// Neo4jGraph
// =============================================================================

#[derive(Debug)]
struct Neo4jInner {
    client: reqwest::Client,
    commit_url: String,
    user: String,
    password: String,
}

/// Graph client for a Neo4j server's HTTP endpoint.
#[derive(Debug, Clone)]
pub struct Neo4jGraph {
    inner: Arc<Neo4jInner>,
}

impl Neo4jGraph {
    /// Create a client from graph options. Does not connect.
    ///
    /// # Errors
    /// Returns `ClientError::InvalidConfig` unless the URI is `http(s)://` and
    /// the database name is non-empty.
    pub fn new(options: &GraphOptions) -> ClientResult<Self> {
        let uri = options.uri.trim_end_matches('/');
        if !(uri.starts_with("http://") || uri.starts_with("https://")) {
            return Err(ClientError::invalid_config(format!(
                "graph uri must be http(s), got: {}",
                options.uri
            )));
        }
        if options.database.is_empty() {
            return Err(ClientError::invalid_config("graph database must not be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(options.timeout_ms))
            .build()
            .map_err(|e| ClientError::invalid_config(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(Neo4jInner {
                client,
                commit_url: format!("{uri}/db/{}/tx/commit", options.database),
                user: options.user.clone(),
                password: options.password.clone(),
            }),
        })
    }

    /// Transaction commit endpoint.
    #[must_use]
    pub fn commit_url(&self) -> &str {
        &self.inner.commit_url
    }
}

#[async_trait]
impl GraphClient for Neo4jGraph {
    fn session(&self) -> Box<dyn GraphSession> {
        Box::new(Neo4jSession {
            inner: Arc::clone(&self.inner),
        })
    }

    async fn close(&self) -> ClientResult<()> {
        // HTTP is stateless; pooled connections close with the client.
        Ok(())
    }

    fn name(&self) -> &'static str {
        "neo4j"
    }

    fn is_simulation(&self) -> bool {
        false
    }
}

/// Session against the Neo4j HTTP endpoint.
#[derive(Debug, Clone)]
pub struct Neo4jSession {
    inner: Arc<Neo4jInner>,
}

impl Neo4jSession {
    fn into_records(response: CommitResponse) -> ClientResult<Vec<GraphRecord>> {
        if let Some(err) = response.errors.into_iter().next() {
            return Err(if err.code.contains("Security") {
                ClientError::AuthenticationFailed
            } else {
                ClientError::api(400, format!("{}: {}", err.code, err.message))
            });
        }

        let Some(result) = response.results.into_iter().next() else {
            return Ok(Vec::new());
        };

        let records = result
            .data
            .into_iter()
            .map(|data| {
                let fields: Map<String, Value> =
                    result.columns.iter().cloned().zip(data.row).collect();
                GraphRecord::new(fields)
            })
            .collect();
        Ok(records)
    }
}

#[async_trait]
impl GraphSession for Neo4jSession {
    #[tracing::instrument(skip(self, params), fields(url = %self.inner.commit_url))]
    async fn run(&self, query: &str, params: QueryParams) -> ClientResult<RecordStream> {
        let body = CommitRequest {
            statements: [Statement {
                statement: query,
                parameters: &params,
            }],
        };

        let response = self
            .inner
            .client
            .post(&self.inner.commit_url)
            .basic_auth(&self.inner.user, Some(&self.inner.password))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ClientError::AuthenticationFailed);
        }
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ClientError::api(status.as_u16(), text));
        }

        let parsed: CommitResponse = serde_json::from_str(&text)?;
        Ok(RecordStream::new(Self::into_records(parsed)?))
    }

    async fn close(&self) -> ClientResult<()> {
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
