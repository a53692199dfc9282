//! `QdrantClient` - Qdrant REST API
//!
//! `TigerStyle`: Production client, feature-gated.
//!
//! Requires `qdrant` feature flag:
//! ```toml
//! leibniz-services = { version = "0.1", features = ["qdrant"] }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Distance, Payload, ScoredPoint, VectorPoint, VectorSearchClient};
use crate::error::{ClientError, ClientResult};
use crate::settings::VectorOptions;

// =============================================================================
// API Types
// =============================================================================

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    vector: &'a [f32],
    limit: usize,
    with_payload: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    result: Vec<RawScoredPoint>,
}

#[derive(Debug, Deserialize)]
struct RawScoredPoint {
    id: Value,
    score: f32,
    #[serde(default)]
    payload: Option<Payload>,
}

#[derive(Debug, Serialize)]
struct CreateCollectionRequest {
    vectors: VectorParams,
}

#[derive(Debug, Serialize)]
struct VectorParams {
    size: usize,
    distance: Distance,
}

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    points: &'a [VectorPoint],
}

/// Qdrant ids are either unsigned integers or UUID strings.
fn point_id(id: Value) -> String {
    match id {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

// =============================================================================
// QdrantClient
// =============================================================================

/// Vector client for a Qdrant server.
#[derive(Debug, Clone)]
pub struct QdrantClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl QdrantClient {
    /// Create a client from vector options. Does not connect.
    ///
    /// # Errors
    /// Returns `ClientError::InvalidConfig` for an empty host or port 0.
    pub fn new(options: &VectorOptions) -> ClientResult<Self> {
        if options.host.trim().is_empty() {
            return Err(ClientError::invalid_config("vector host must not be empty"));
        }
        if options.port == 0 {
            return Err(ClientError::invalid_config("vector port must be non-zero"));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(options.timeout_ms))
            .build()
            .map_err(|e| ClientError::invalid_config(e.to_string()))?;

        Ok(Self {
            client,
            base_url: options.base_url(),
            api_key: options.api_key.clone(),
        })
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, format!("{}{path}", self.base_url));
        match &self.api_key {
            Some(key) => builder.header("api-key", key),
            None => builder,
        }
    }

    async fn check(response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ClientError::AuthenticationFailed);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::api(status.as_u16(), body))
    }
}

#[async_trait]
impl VectorSearchClient for QdrantClient {
    #[tracing::instrument(skip(self, query_vector), fields(base_url = %self.base_url))]
    async fn search(
        &self,
        collection: &str,
        query_vector: &[f32],
        limit: usize,
    ) -> ClientResult<Vec<ScoredPoint>> {
        let response = self
            .request(
                reqwest::Method::POST,
                &format!("/collections/{collection}/points/search"),
            )
            .json(&SearchRequest {
                vector: query_vector,
                limit,
                with_payload: true,
            })
            .send()
            .await?;

        // Missing collection reads as no matches.
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }

        let parsed: SearchResponse = Self::check(response).await?.json().await?;
        Ok(parsed
            .result
            .into_iter()
            .map(|raw| ScoredPoint {
                id: point_id(raw.id),
                score: raw.score,
                payload: raw.payload.unwrap_or_default(),
            })
            .collect())
    }

    #[tracing::instrument(skip(self))]
    async fn recreate_collection(
        &self,
        collection: &str,
        vector_size: usize,
        distance: Distance,
    ) -> ClientResult<()> {
        let path = format!("/collections/{collection}");

        let response = self.request(reqwest::Method::DELETE, &path).send().await?;
        if response.status() != reqwest::StatusCode::NOT_FOUND {
            Self::check(response).await?;
        }

        let response = self
            .request(reqwest::Method::PUT, &path)
            .json(&CreateCollectionRequest {
                vectors: VectorParams {
                    size: vector_size,
                    distance,
                },
            })
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self, points), fields(points = points.len()))]
    async fn upsert(&self, collection: &str, points: Vec<VectorPoint>) -> ClientResult<()> {
        let response = self
            .request(
                reqwest::Method::PUT,
                &format!("/collections/{collection}/points?wait=true"),
            )
            .json(&UpsertRequest { points: &points })
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "qdrant"
    }

    fn is_simulation(&self) -> bool {
        false
    }
}

// =============================================================================
// Tests
// =============================================================================
