//! `MeilisearchClient` - Meilisearch REST API
//!
//! `TigerStyle`: Production client, feature-gated.
//!
//! Requires `meilisearch` feature flag:
//! ```toml
//! leibniz-services = { version = "0.1", features = ["meilisearch"] }
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{SearchClient, SearchDocument, SearchHit, SearchIndex, SearchResponse};
use crate::error::{ClientError, ClientResult};
use crate::settings::SearchOptions;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    q: &'a str,
    limit: usize,
    show_ranking_score: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSearchResponse {
    hits: Vec<SearchHit>,
    #[serde(default)]
    processing_time_ms: u64,
}

#[derive(Debug)]
struct MeilisearchInner {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl MeilisearchInner {
    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, format!("{}{path}", self.base_url));
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> ClientResult<reqwest::Response> {
        let response = builder.send().await?;
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

/// Search client for a Meilisearch server.
#[derive(Debug, Clone)]
pub struct MeilisearchClient {
    inner: Arc<MeilisearchInner>,
}

impl MeilisearchClient {
    /// Create a client from search options. Does not connect.
    ///
    /// # Errors
    /// Returns `ClientError::InvalidConfig` unless the URL is `http(s)://`.
    pub fn new(options: &SearchOptions) -> ClientResult<Self> {
        let base_url = options.url.trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::invalid_config(format!(
                "search url must be http(s), got: {}",
                options.url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(options.timeout_ms))
            .build()
            .map_err(|e| ClientError::invalid_config(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(MeilisearchInner {
                client,
                base_url: base_url.to_string(),
                api_key: options.api_key.clone(),
            }),
        })
    }
}

impl SearchClient for MeilisearchClient {
    fn index(&self, name: &str) -> Box<dyn SearchIndex> {
        Box::new(MeilisearchIndex {
            uid: name.to_string(),
            inner: Arc::clone(&self.inner),
        })
    }

    fn name(&self) -> &'static str {
        "meilisearch"
    }

    fn is_simulation(&self) -> bool {
        false
    }
}

/// Handle to one Meilisearch index.
#[derive(Debug, Clone)]
pub struct MeilisearchIndex {
    uid: String,
    inner: Arc<MeilisearchInner>,
}

#[async_trait]
impl SearchIndex for MeilisearchIndex {
    #[tracing::instrument(skip(self), fields(index = %self.uid))]
    async fn search(&self, query: &str, limit: usize) -> ClientResult<SearchResponse> {
        let builder = self
            .inner
            .request(reqwest::Method::POST, &format!("/indexes/{}/search", self.uid))
            .json(&SearchRequest {
                q: query,
                limit,
                show_ranking_score: true,
            });

        let raw: RawSearchResponse = self.inner.send(builder).await?.json().await?;
        Ok(SearchResponse {
            hits: raw.hits,
            processing_time_ms: raw.processing_time_ms,
            query: query.to_string(),
            limit,
        })
    }

    #[tracing::instrument(skip(self, documents), fields(index = %self.uid, documents = documents.len()))]
    async fn add_documents(&self, documents: Vec<SearchDocument>) -> ClientResult<()> {
        let builder = self
            .inner
            .request(reqwest::Method::POST, &format!("/indexes/{}/documents", self.uid))
            .json(&documents);
        // Indexing is asynchronous server-side; the enqueued task is not awaited.
        self.inner.send(builder).await?;
        Ok(())
    }

    async fn update_settings(&self, settings: Value) -> ClientResult<()> {
        let builder = self
            .inner
            .request(reqwest::Method::PATCH, &format!("/indexes/{}/settings", self.uid))
            .json(&settings);
        self.inner.send(builder).await?;
        Ok(())
    }

    fn uid(&self) -> &str {
        &self.uid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_trims_trailing_slash() {
        let options = SearchOptions {
            url: "http://localhost:7700/".to_string(),
            ..SearchOptions::default()
        };
        let client = MeilisearchClient::new(&options).unwrap();
        assert_eq!(client.inner.base_url, "http://localhost:7700");
        assert_eq!(client.index("papers").uid(), "papers");
        assert!(!client.is_simulation());
    }

    #[test]
    fn test_new_rejects_bare_host() {
        let options = SearchOptions {
            url: "localhost:7700".to_string(),
            ..SearchOptions::default()
        };
        assert!(MeilisearchClient::new(&options).is_err());
    }

    #[test]
    fn test_request_body() {
        let body = SearchRequest {
            q: "transformer",
            limit: 20,
            show_ranking_score: true,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"q": "transformer", "limit": 20, "showRankingScore": true})
        );
    }

    #[test]
    fn test_parse_response() {
        let raw: RawSearchResponse = serde_json::from_value(json!({
            "hits": [{"id": "test_p_1", "title": "T", "abstract": "A", "year": 2023, "_rankingScore": 0.9}],
            "processingTimeMs": 3,
            "query": "t",
            "limit": 20
        }))
        .unwrap();

        assert_eq!(raw.processing_time_ms, 3);
        assert_eq!(raw.hits[0].document.id, "test_p_1");
        assert_eq!(raw.hits[0].document.metadata.get("year"), Some(&json!(2023)));
    }
}
