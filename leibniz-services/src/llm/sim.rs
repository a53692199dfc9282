//! `SimLanguageModel` - Deterministic Embeddings and Canned Chat
//!
//! `TigerStyle`: Same input = same output, no network.
//!
//! # Embeddings
//!
//! 1. Seed a `DeterministicRng` from the text (`hash(text) mod 2^32`)
//! 2. Draw 1536 floats in [-1, 1)
//! 3. Normalize to a unit vector
//!
//! # Chat
//!
//! A fixed synthesis paragraph, or four fixed chunks when streaming. Each
//! chunk is emitted after a short sleep so consumers see real suspension
//! points.

use std::time::Duration;

use async_trait::async_trait;
use futures::stream;

use leibniz_core::constants::{
    EMBEDDING_DIMENSIONS_COUNT, EMBEDDING_TOKENS_PER_INPUT_COUNT, LLM_COMPLETION_TOKENS_SIM,
    LLM_STREAM_CHUNK_DELAY_MS,
};
use leibniz_core::dst::DeterministicRng;

use super::{
    ChatChoice, ChatCompletion, ChatCompletionChunk, ChatMessage, ChatRequest, ChatResponse,
    ChatStream, ChatUsage, EmbeddingData, EmbeddingRequest, EmbeddingResponse, EmbeddingUsage,
    LanguageModelClient,
};
use crate::error::ClientResult;

/// Non-streamed synthesis text
const SYNTHESIS_TEXT: &str = "This is a mock synthesis of the provided papers. The research \
shows convergent findings on transformer efficiency improvements through sparse attention, \
quantization, and knowledge distillation techniques.";

/// Streamed synthesis, in emission order
const SYNTHESIS_CHUNKS: [&str; 4] = [
    "This is a mock synthesis. ",
    "Research shows improvements in ",
    "transformer efficiency through ",
    "sparse attention and quantization.",
];

/// Deterministic unit vector for `text`.
fn embed_text(text: &str) -> Vec<f32> {
    let mut rng = DeterministicRng::from_text(text);
    let mut embedding = rng.next_signed_floats(EMBEDDING_DIMENSIONS_COUNT);

    let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut embedding {
            *x /= norm;
        }
    }

    // Postcondition
    debug_assert_eq!(embedding.len(), EMBEDDING_DIMENSIONS_COUNT);
    embedding
}

// =============================================================================
// SimLanguageModel
// =============================================================================

/// In-process language model simulation.
#[derive(Debug, Clone)]
pub struct SimLanguageModel {
    chunk_delay: Duration,
}

impl SimLanguageModel {
    /// Create a simulator with the standard chunk delay.
    #[must_use]
    pub fn new() -> Self {
        Self {
            chunk_delay: Duration::from_millis(LLM_STREAM_CHUNK_DELAY_MS),
        }
    }

    /// Override the sleep before each streamed chunk.
    #[must_use]
    pub fn with_chunk_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = delay;
        self
    }

    fn stream_chunks(&self) -> ChatStream {
        let delay = self.chunk_delay;
        let chunks = stream::unfold(0usize, move |next| async move {
            let text = SYNTHESIS_CHUNKS.get(next)?;
            tokio::time::sleep(delay).await;
            Some((Ok(ChatCompletionChunk::with_content(*text)), next + 1))
        });
        ChatStream::new(chunks)
    }
}

impl Default for SimLanguageModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LanguageModelClient for SimLanguageModel {
    #[tracing::instrument(level = "trace", skip(self, request), fields(inputs = request.input.len()))]
    async fn create_embeddings(
        &self,
        request: EmbeddingRequest,
    ) -> ClientResult<EmbeddingResponse> {
        let data: Vec<EmbeddingData> = request
            .input
            .texts()
            .iter()
            .enumerate()
            .map(|(index, text)| EmbeddingData {
                embedding: embed_text(text),
                index,
            })
            .collect();

        let tokens = u32::try_from(data.len())
            .unwrap_or(u32::MAX)
            .saturating_mul(EMBEDDING_TOKENS_PER_INPUT_COUNT);

        Ok(EmbeddingResponse {
            data,
            model: request.model,
            usage: EmbeddingUsage {
                prompt_tokens: tokens,
                total_tokens: tokens,
            },
        })
    }

    #[tracing::instrument(level = "trace", skip(self, request), fields(stream = request.stream))]
    async fn create_chat_completion(&self, request: ChatRequest) -> ClientResult<ChatResponse> {
        if request.stream {
            return Ok(ChatResponse::Stream(self.stream_chunks()));
        }

        Ok(ChatResponse::Completion(ChatCompletion {
            choices: vec![ChatChoice {
                message: ChatMessage::assistant(SYNTHESIS_TEXT),
            }],
            usage: ChatUsage {
                total_tokens: LLM_COMPLETION_TOKENS_SIM,
            },
        }))
    }

    fn name(&self) -> &'static str {
        "sim-llm"
    }

    fn is_simulation(&self) -> bool {
        true
    }
}

// =============================================================================
// Tests
// =============================================================================
