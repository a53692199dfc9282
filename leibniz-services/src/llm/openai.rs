//! `OpenAIClient` - OpenAI API Integration
//!
//! `TigerStyle`: Production client, feature-gated.
//!
//! Requires `openai` feature flag:
//! ```toml
//! leibniz-services = { version = "0.1", features = ["openai"] }
//! ```
//!
//! Also supports OpenAI-compatible APIs (Azure, local models, etc.)
//! through `LanguageModelOptions::base_url`.

use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, BoxStream};
use futures::StreamExt;
use serde::Deserialize;

use super::{
    ChatCompletion, ChatCompletionChunk, ChatRequest, ChatResponse, ChatStream, EmbeddingRequest,
    EmbeddingResponse, LanguageModelClient,
};
use crate::error::{ClientError, ClientResult};
use crate::settings::LanguageModelOptions;

// =============================================================================
// API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct OpenAIError {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
    code: Option<String>,
}

// =============================================================================
// Server-sent events
// =============================================================================

/// Marker closing an OpenAI event stream
const SSE_DONE: &str = "[DONE]";

#[derive(Debug)]
enum SseLine {
    Skip,
    Done,
    Chunk(ClientResult<ChatCompletionChunk>),
}

fn parse_sse_line(line: &[u8]) -> SseLine {
    let line = String::from_utf8_lossy(line);
    let line = line.trim_end_matches(['\r', '\n']);

    let Some(data) = line.strip_prefix("data:") else {
        // Blank separators, comments, `event:` and `id:` fields.
        return SseLine::Skip;
    };
    let data = data.trim_start();

    if data == SSE_DONE {
        return SseLine::Done;
    }
    SseLine::Chunk(serde_json::from_str(data).map_err(ClientError::from))
}

struct SseState {
    body: BoxStream<'static, reqwest::Result<Vec<u8>>>,
    buffer: Vec<u8>,
    done: bool,
}

impl SseState {
    fn next_line(&mut self) -> Option<Vec<u8>> {
        let end = self.buffer.iter().position(|b| *b == b'\n')?;
        let line: Vec<u8> = self.buffer.drain(..=end).collect();
        Some(line)
    }

    /// Bytes left after the body ends, as a final unterminated line.
    fn take_remainder(&mut self) -> Option<Vec<u8>> {
        if self.buffer.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.buffer))
        }
    }
}

fn sse_stream(response: reqwest::Response) -> ChatStream {
    sse_chunks(
        response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()))
            .boxed(),
    )
}

fn sse_chunks(body: BoxStream<'static, reqwest::Result<Vec<u8>>>) -> ChatStream {
    let state = SseState {
        body,
        buffer: Vec::new(),
        done: false,
    };

    let chunks = stream::unfold(state, |mut state| async move {
        loop {
            if state.done {
                return None;
            }

            if let Some(line) = state.next_line() {
                match parse_sse_line(&line) {
                    SseLine::Skip => continue,
                    SseLine::Done => {
                        state.done = true;
                        return None;
                    }
                    SseLine::Chunk(chunk) => return Some((chunk, state)),
                }
            }

            match state.body.next().await {
                Some(Ok(bytes)) => state.buffer.extend_from_slice(&bytes),
                Some(Err(err)) => {
                    state.done = true;
                    return Some((Err(ClientError::from(err)), state));
                }
                None => {
                    state.done = true;
                    return match state.take_remainder().map(|rest| parse_sse_line(&rest)) {
                        Some(SseLine::Chunk(chunk)) => Some((chunk, state)),
                        _ => None,
                    };
                }
            }
        }
    });

    ChatStream::new(chunks)
}

// =============================================================================
// OpenAIClient
// =============================================================================

/// Language model client for the OpenAI HTTP API.
#[derive(Debug, Clone)]
pub struct OpenAIClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAIClient {
    /// Create a client from language model options. Does not connect.
    ///
    /// # Errors
    /// Returns `ClientError::InvalidConfig` if the API key is empty or the
    /// base URL is not `http(s)://`.
    pub fn new(options: &LanguageModelOptions) -> ClientResult<Self> {
        if options.api_key.trim().is_empty() {
            return Err(ClientError::invalid_config("openai api key is required"));
        }
        let base_url = options.base_url.trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::invalid_config(format!(
                "openai base url must be http(s), got: {}",
                options.base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(options.timeout_ms))
            .build()
            .map_err(|e| ClientError::invalid_config(e.to_string()))?;

        Ok(Self {
            client,
            api_key: options.api_key.clone(),
            base_url: base_url.to_string(),
        })
    }

    /// Get the API base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Parse error response.
    fn parse_error(status: reqwest::StatusCode, body: &str) -> ClientError {
        if let Ok(err) = serde_json::from_str::<OpenAIError>(body) {
            let error_type = err.error.error_type.as_deref().unwrap_or("");
            let code = err.error.code.as_deref().unwrap_or("");

            if error_type == "invalid_api_key" || code == "invalid_api_key" {
                return ClientError::AuthenticationFailed;
            }
            return ClientError::api(status.as_u16(), err.error.message);
        }

        match status {
            reqwest::StatusCode::UNAUTHORIZED => ClientError::AuthenticationFailed,
            reqwest::StatusCode::REQUEST_TIMEOUT | reqwest::StatusCode::GATEWAY_TIMEOUT => {
                ClientError::Timeout
            }
            _ => ClientError::api(status.as_u16(), body),
        }
    }

    async fn post<T: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &T,
    ) -> ClientResult<reqwest::Response> {
        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        Err(Self::parse_error(status, &text))
    }
}

#[async_trait]
impl LanguageModelClient for OpenAIClient {
    #[tracing::instrument(skip(self, request), fields(model = %request.model, inputs = request.input.len()))]
    async fn create_embeddings(
        &self,
        request: EmbeddingRequest,
    ) -> ClientResult<EmbeddingResponse> {
        let response = self.post("/embeddings", &request).await?;
        let mut parsed: EmbeddingResponse = response.json().await?;
        parsed.data.sort_by_key(|d| d.index);

        // Postcondition
        debug_assert_eq!(parsed.data.len(), request.input.len(), "one embedding per input");
        Ok(parsed)
    }

    #[tracing::instrument(skip(self, request), fields(model = %request.model, stream = request.stream))]
    async fn create_chat_completion(&self, request: ChatRequest) -> ClientResult<ChatResponse> {
        let response = self.post("/chat/completions", &request).await?;

        if request.stream {
            return Ok(ChatResponse::Stream(sse_stream(response)));
        }

        let completion: ChatCompletion = response.json().await?;
        Ok(ChatResponse::Completion(completion))
    }

    fn name(&self) -> &'static str {
        "openai"
    }

    fn is_simulation(&self) -> bool {
        false
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn options(api_key: &str) -> LanguageModelOptions {
        LanguageModelOptions {
            api_key: api_key.to_string(),
            ..LanguageModelOptions::default()
        }
    }

    #[test]
    fn test_new_requires_key() {
        assert!(matches!(
            OpenAIClient::new(&options("")),
            Err(ClientError::InvalidConfig { .. })
        ));

        let client = OpenAIClient::new(&options("sk-test")).unwrap();
        assert_eq!(client.base_url(), "https://api.openai.com/v1");
        assert_eq!(client.name(), "openai");
        assert!(!client.is_simulation());
    }

    #[test]
    fn test_new_rejects_bad_base_url() {
        let opts = LanguageModelOptions {
            api_key: "sk-test".to_string(),
            base_url: "localhost:11434/v1".to_string(),
            ..LanguageModelOptions::default()
        };
        assert!(OpenAIClient::new(&opts).is_err());
    }

    #[test]
    fn test_parse_sse_lines() {
        assert!(matches!(parse_sse_line(b"\n"), SseLine::Skip));
        assert!(matches!(parse_sse_line(b": keep-alive\n"), SseLine::Skip));
        assert!(matches!(parse_sse_line(b"event: message\n"), SseLine::Skip));
        assert!(matches!(parse_sse_line(b"data: [DONE]\r\n"), SseLine::Done));

        let SseLine::Chunk(Ok(chunk)) =
            parse_sse_line(br#"data: {"choices":[{"delta":{"content":"Hel"}}]}"#)
        else {
            panic!("expected chunk");
        };
        assert_eq!(chunk.content(), Some("Hel"));

        assert!(matches!(
            parse_sse_line(b"data: {not json}\n"),
            SseLine::Chunk(Err(ClientError::Json { .. }))
        ));
    }

    fn body(parts: &[&'static [u8]]) -> BoxStream<'static, reqwest::Result<Vec<u8>>> {
        let parts: Vec<_> = parts.iter().map(|p| Ok(p.to_vec())).collect();
        stream::iter(parts).boxed()
    }

    async fn contents(parts: &[&'static [u8]]) -> Vec<String> {
        sse_chunks(body(parts))
            .map(|chunk| chunk.unwrap().content().unwrap_or_default().to_string())
            .collect()
            .await
    }

    #[tokio::test]
    async fn test_sse_lines_split_across_reads() {
        let text = contents(&[
            b"data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\ndata: {\"cho",
            b"ices\":[{\"delta\":{\"content\":\"lo\"}}]}\n\n",
            b"data: [DONE]\n\n",
        ])
        .await;
        assert_eq!(text, ["Hel", "lo"]);
    }

    #[tokio::test]
    async fn test_sse_final_line_without_newline() {
        let text = contents(&[
            b"data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n",
            b"data: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}",
        ])
        .await;
        assert_eq!(text, ["Hel", "lo"]);

        assert!(contents(&[b"data: [DONE]"]).await.is_empty());
        assert!(contents(&[b": keep-alive"]).await.is_empty());
    }

    #[test]
    fn test_parse_error_mapping() {
        let body = r#"{"error":{"message":"bad key","type":"invalid_request_error","code":"invalid_api_key"}}"#;
        assert!(matches!(
            OpenAIClient::parse_error(reqwest::StatusCode::UNAUTHORIZED, body),
            ClientError::AuthenticationFailed
        ));

        let body = r#"{"error":{"message":"slow down","type":"requests","code":"rate_limit_exceeded"}}"#;
        let err = OpenAIClient::parse_error(reqwest::StatusCode::TOO_MANY_REQUESTS, body);
        assert!(err.is_retryable());

        assert!(matches!(
            OpenAIClient::parse_error(reqwest::StatusCode::GATEWAY_TIMEOUT, "upstream"),
            ClientError::Timeout
        ));
    }
}
