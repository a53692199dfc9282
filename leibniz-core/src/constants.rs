//! `TigerStyle` Constants
//!
//! All limits use big-endian naming: `CATEGORY_SPECIFICS_UNIT_LIMIT`
//! Example: `CACHE_TTL_SECS_DEFAULT` (not `DEFAULT_CACHE_TTL`)
//!
//! Every constant includes units in the name:
//! - _`SECS_DEFAULT` for time durations
//! - _`COUNT_MAX` for quantity limits
//! - _MS for milliseconds

// =============================================================================
// Service Endpoints
// =============================================================================

/// Default key-value cache port
pub const CACHE_PORT_DEFAULT: u16 = 6379;

/// Default graph database HTTP port
pub const GRAPH_HTTP_PORT_DEFAULT: u16 = 7474;

/// Default vector database HTTP port
pub const VECTOR_HTTP_PORT_DEFAULT: u16 = 6333;

/// Default full-text search port
pub const SEARCH_PORT_DEFAULT: u16 = 7700;

/// Default document parser port
pub const PARSER_PORT_DEFAULT: u16 = 8070;

// =============================================================================
// Performance Defaults
// =============================================================================

/// Default query timeout
pub const QUERY_TIMEOUT_MS_DEFAULT: u64 = 200;

/// Default cache entry TTL
pub const CACHE_TTL_SECS_DEFAULT: u64 = 3600; // 1 hour

/// Default worker count
pub const WORKERS_COUNT_DEFAULT: usize = 8;

/// Default batch size for bulk operations
pub const BATCH_SIZE_COUNT_DEFAULT: usize = 100;

// =============================================================================
// Vector Search
// =============================================================================

/// Score assigned to the first simulated vector match
pub const VECTOR_SCORE_TOP: f32 = 0.95;

/// Score decrement per rank for simulated vector matches
pub const VECTOR_SCORE_STEP: f32 = 0.10;

/// Default vector search limit
pub const VECTOR_SEARCH_LIMIT_DEFAULT: usize = 10;

// =============================================================================
// Full-Text Search
// =============================================================================

/// Default full-text search limit
pub const SEARCH_LIMIT_DEFAULT: usize = 20;

/// Reported processing time for simulated searches
pub const SEARCH_PROCESSING_TIME_MS_SIM: u64 = 15;

// =============================================================================
// Embedding / LLM
// =============================================================================

/// Embedding dimensions (text-embedding-ada-002)
pub const EMBEDDING_DIMENSIONS_COUNT: usize = 1536;

/// Approximate prompt tokens charged per embedding input
pub const EMBEDDING_TOKENS_PER_INPUT_COUNT: u32 = 10;

/// Total tokens reported for a simulated chat completion
pub const LLM_COMPLETION_TOKENS_SIM: u32 = 150;

/// Delay before each simulated streaming chunk
pub const LLM_STREAM_CHUNK_DELAY_MS: u64 = 50;

// =============================================================================
// Data Generation
// =============================================================================

/// Earliest year for synthesized papers
pub const PAPER_YEAR_MIN: i64 = 2020;

/// Latest year for synthesized papers
pub const PAPER_YEAR_MAX: i64 = 2024;

/// Minimum authors per synthesized paper
pub const PAPER_AUTHORS_COUNT_MIN: usize = 2;

/// Maximum authors per synthesized paper
pub const PAPER_AUTHORS_COUNT_MAX: usize = 6;

/// Default number of papers in a synthesized dataset
pub const PAPER_DATASET_COUNT_DEFAULT: usize = 100;

// =============================================================================
// DST (Deterministic Simulation Testing)
// =============================================================================

/// Maximum time advance in single step
pub const DST_TIME_ADVANCE_MS_MAX: u64 = 86_400_000; // 24 hours

// =============================================================================
// Time Constants
// =============================================================================

/// Milliseconds per second
pub const TIME_MS_PER_SEC: u64 = 1000;
