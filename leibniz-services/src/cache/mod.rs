//! Key-Value Cache - Client Trait and Implementations
//!
//! `TigerStyle`: Simulation-first cache abstraction.
//!
//! # Architecture
//!
//! ```text
//! CacheClient (trait)
//! ├── SimCache     (always available, in-process TTL map)
//! └── RedisCache   (feature: redis)
//! ```
//!
//! # Usage
//!
//! ```rust
//! use leibniz_services::cache::{CacheClient, SimCache};
//!
//! #[tokio::main]
//! async fn main() {
//!     let cache = SimCache::new();
//!     cache.setex("query:bert", 3600, "cached answer").await.unwrap();
//!     assert_eq!(
//!         cache.get("query:bert").await.unwrap().as_deref(),
//!         Some("cached answer")
//!     );
//! }
//! ```

mod sim;

#[cfg(feature = "redis")]
mod redis;

pub use sim::SimCache;

#[cfg(feature = "redis")]
pub use self::redis::RedisCache;

use async_trait::async_trait;

use crate::error::ClientResult;

/// Trait for key-value cache clients.
///
/// Mirrors the subset of the Redis command surface the application uses.
#[async_trait]
pub trait CacheClient: Send + Sync + std::fmt::Debug {
    /// Get a value. Missing and expired keys both return `None`.
    async fn get(&self, key: &str) -> ClientResult<Option<String>>;

    /// Store a value without expiry.
    async fn set(&self, key: &str, value: &str) -> ClientResult<bool>;

    /// Store a value that expires `ttl_secs` seconds from now.
    ///
    /// A TTL of zero expires immediately.
    async fn setex(&self, key: &str, ttl_secs: u64, value: &str) -> ClientResult<bool>;

    /// Delete a key, returning the number of keys removed (0 or 1).
    async fn delete(&self, key: &str) -> ClientResult<u64>;

    /// Liveness check.
    async fn ping(&self) -> ClientResult<bool>;

    /// Batching handle.
    ///
    /// Commands issued through the handle run immediately; batching is not
    /// modelled, only the method surface.
    fn pipeline(&self) -> &dyn CacheClient;

    /// Flush the pipeline. Always returns an empty reply list.
    async fn execute(&self) -> ClientResult<Vec<String>>;

    /// Get the client name for logging/debugging.
    fn name(&self) -> &'static str;

    /// Check if this is a simulation client.
    fn is_simulation(&self) -> bool;
}
