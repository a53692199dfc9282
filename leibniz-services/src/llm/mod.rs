//! Language Model - Embeddings and Chat Clients
//!
//! `TigerStyle`: Simulation-first LLM abstraction.
//!
//! # Architecture
//!
//! ```text
//! LanguageModelClient (trait)
//! ├── SimLanguageModel   (always available, deterministic)
//! └── OpenAIClient       (feature: openai)
//! ```
//!
//! # Usage
//!
//! ```rust
//! use futures::StreamExt;
//! use leibniz_services::llm::{
//!     ChatMessage, ChatRequest, ChatResponse, EmbeddingRequest, LanguageModelClient,
//!     SimLanguageModel,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = SimLanguageModel::new();
//!
//!     let embeddings = client
//!         .create_embeddings(EmbeddingRequest::new("sparse attention"))
//!         .await
//!         .unwrap();
//!     assert_eq!(embeddings.data[0].embedding.len(), 1536);
//!
//!     let request = ChatRequest::new(vec![ChatMessage::user("Summarise")]).streaming();
//!     let ChatResponse::Stream(mut stream) = client.create_chat_completion(request).await.unwrap()
//!     else {
//!         unreachable!()
//!     };
//!     while let Some(chunk) = stream.next().await {
//!         print!("{}", chunk.unwrap().content().unwrap_or_default());
//!     }
//! }
//! ```

mod sim;

#[cfg(feature = "openai")]
mod openai;

pub use sim::SimLanguageModel;

#[cfg(feature = "openai")]
pub use openai::OpenAIClient;

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};

use crate::error::ClientResult;

// =============================================================================
// Constants
// =============================================================================

/// Embedding model used when the request does not name one
pub const EMBEDDING_MODEL_DEFAULT: &str = "text-embedding-ada-002";

/// Chat model used when the request does not name one
pub const CHAT_MODEL_DEFAULT: &str = "gpt-4o";

// =============================================================================
// Embeddings
// =============================================================================

/// One string or a batch of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EmbeddingInput {
    /// A single text
    Single(String),
    /// Several texts, embedded in order
    Batch(Vec<String>),
}

impl EmbeddingInput {
    /// Texts in request order.
    #[must_use]
    pub fn texts(&self) -> &[String] {
        match self {
            Self::Single(text) => std::slice::from_ref(text),
            Self::Batch(texts) => texts,
        }
    }

    /// Number of texts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.texts().len()
    }

    /// Check if the input has no texts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.texts().is_empty()
    }
}

impl From<&str> for EmbeddingInput {
    fn from(text: &str) -> Self {
        Self::Single(text.to_string())
    }
}

impl From<String> for EmbeddingInput {
    fn from(text: String) -> Self {
        Self::Single(text)
    }
}

impl From<Vec<String>> for EmbeddingInput {
    fn from(texts: Vec<String>) -> Self {
        Self::Batch(texts)
    }
}

impl From<Vec<&str>> for EmbeddingInput {
    fn from(texts: Vec<&str>) -> Self {
        Self::Batch(texts.into_iter().map(str::to_string).collect())
    }
}

/// Request to the embeddings endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingRequest {
    /// Text(s) to embed
    pub input: EmbeddingInput,
    /// Model name
    pub model: String,
}

impl EmbeddingRequest {
    /// Create a request with the default model.
    #[must_use]
    pub fn new(input: impl Into<EmbeddingInput>) -> Self {
        Self {
            input: input.into(),
            model: EMBEDDING_MODEL_DEFAULT.to_string(),
        }
    }

    /// Set the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// One embedding in a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingData {
    /// The vector
    pub embedding: Vec<f32>,
    /// Position of the source text in the request
    pub index: usize,
}

/// Token accounting for an embeddings call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingUsage {
    /// Tokens in the input
    pub prompt_tokens: u32,
    /// Tokens billed
    pub total_tokens: u32,
}

/// Response from the embeddings endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingResponse {
    /// One entry per input text, in request order
    pub data: Vec<EmbeddingData>,
    /// Model that produced the vectors
    pub model: String,
    /// Token accounting
    pub usage: EmbeddingUsage,
}

// =============================================================================
// Chat
// =============================================================================

/// A chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// `system`, `user` or `assistant`
    pub role: String,
    /// Message text
    pub content: String,
}

impl ChatMessage {
    /// Create a message with an explicit role.
    #[must_use]
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    /// A `system` message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }

    /// A `user` message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    /// An `assistant` message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }
}

/// Request to the chat completions endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model name
    pub model: String,
    /// Conversation so far
    pub messages: Vec<ChatMessage>,
    /// Ask for incremental chunks
    #[serde(default)]
    pub stream: bool,
}

impl ChatRequest {
    /// Create a non-streaming request with the default model.
    #[must_use]
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            model: CHAT_MODEL_DEFAULT.to_string(),
            messages,
            stream: false,
        }
    }

    /// Set the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Request a streamed response.
    #[must_use]
    pub fn streaming(mut self) -> Self {
        self.stream = true;
        self
    }
}

/// One completion choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatChoice {
    /// The generated message
    pub message: ChatMessage,
}

/// Token accounting for a chat call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatUsage {
    /// Tokens billed
    pub total_tokens: u32,
}

/// A complete, non-streamed chat response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatCompletion {
    /// Generated choices
    pub choices: Vec<ChatChoice>,
    /// Token accounting
    #[serde(default)]
    pub usage: ChatUsage,
}

impl ChatCompletion {
    /// Text of the first choice.
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        self.choices.first().map(|c| c.message.content.as_str())
    }
}

/// Incremental content in a streamed chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkDelta {
    /// New text, absent on role-only or final chunks
    #[serde(default)]
    pub content: Option<String>,
}

/// One choice in a streamed chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkChoice {
    /// Incremental content
    #[serde(default)]
    pub delta: ChunkDelta,
}

/// One streamed piece of a chat response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatCompletionChunk {
    /// Choices carrying deltas
    pub choices: Vec<ChunkChoice>,
}

impl ChatCompletionChunk {
    /// A single-choice chunk carrying `content`.
    #[must_use]
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            choices: vec![ChunkChoice {
                delta: ChunkDelta {
                    content: Some(content.into()),
                },
            }],
        }
    }

    /// Delta text of the first choice.
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        self.choices.first().and_then(|c| c.delta.content.as_deref())
    }
}

/// Finite, single-pass stream of chat chunks.
///
/// Polling after the end keeps returning `None`.
pub struct ChatStream {
    inner: Pin<Box<dyn Stream<Item = ClientResult<ChatCompletionChunk>> + Send>>,
}

impl ChatStream {
    /// Wrap any chunk stream.
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = ClientResult<ChatCompletionChunk>> + Send + 'static,
    {
        Self {
            inner: Box::pin(stream.fuse()),
        }
    }
}

impl fmt::Debug for ChatStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatStream").finish_non_exhaustive()
    }
}

impl Stream for ChatStream {
    type Item = ClientResult<ChatCompletionChunk>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

/// Result of a chat call: whole or streamed, per `ChatRequest::stream`.
#[derive(Debug)]
pub enum ChatResponse {
    /// Non-streaming response
    Completion(ChatCompletion),
    /// Streaming response
    Stream(ChatStream),
}

impl ChatResponse {
    /// The completion, if this is a non-streaming response.
    #[must_use]
    pub fn into_completion(self) -> Option<ChatCompletion> {
        match self {
            Self::Completion(completion) => Some(completion),
            Self::Stream(_) => None,
        }
    }

    /// The stream, if this is a streaming response.
    #[must_use]
    pub fn into_stream(self) -> Option<ChatStream> {
        match self {
            Self::Completion(_) => None,
            Self::Stream(stream) => Some(stream),
        }
    }
}

// =============================================================================
// Trait
// =============================================================================

/// Trait for language model clients.
#[async_trait]
pub trait LanguageModelClient: Send + Sync + std::fmt::Debug {
    /// Embed one or more texts.
    async fn create_embeddings(&self, request: EmbeddingRequest)
        -> ClientResult<EmbeddingResponse>;

    /// Generate a chat completion, streamed when `request.stream` is set.
    async fn create_chat_completion(&self, request: ChatRequest) -> ClientResult<ChatResponse>;

    /// Get the client name for logging/debugging.
    fn name(&self) -> &'static str;

    /// Check if this is a simulation client.
    fn is_simulation(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_embedding_input_untagged() {
        let single: EmbeddingInput = serde_json::from_value(json!("a")).unwrap();
        assert_eq!(single.texts(), ["a".to_string()]);

        let batch: EmbeddingInput = serde_json::from_value(json!(["a", "b"])).unwrap();
        assert_eq!(batch.len(), 2);

        assert_eq!(serde_json::to_value(EmbeddingInput::from("x")).unwrap(), json!("x"));
    }

    #[test]
    fn test_embedding_request_default_model() {
        let request = EmbeddingRequest::new(vec!["a", "b"]);
        assert_eq!(request.model, EMBEDDING_MODEL_DEFAULT);
        assert_eq!(request.input.len(), 2);
    }

    #[test]
    fn test_chunk_content() {
        let chunk = ChatCompletionChunk::with_content("hi");
        assert_eq!(chunk.content(), Some("hi"));

        let empty: ChatCompletionChunk =
            serde_json::from_value(json!({"choices": [{"delta": {"role": "assistant"}}]})).unwrap();
        assert_eq!(empty.content(), None);
    }

    #[test]
    fn test_chat_request_builder() {
        let request = ChatRequest::new(vec![ChatMessage::system("s"), ChatMessage::user("u")])
            .with_model("gpt-4o-mini")
            .streaming();
        assert!(request.stream);
        assert_eq!(request.model, "gpt-4o-mini");
        assert_eq!(request.messages[1].role, "user");
    }
}
