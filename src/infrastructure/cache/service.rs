//! Cache service trait and error types.

use async_trait::async_trait;

/// Errors that can occur while setting up or talking to a cache backend.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache connection error: {0}")]
    Connection(String),

    #[error("cache operation error: {0}")]
    Operation(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache of short code to original URL mappings used on the redirect path.
///
/// Short links are immutable once created, so entries never need
/// invalidation; they simply age out.
///
/// Implementations are fail-open: a backend error is logged and reported as
/// a miss, so the caller falls back to the link registry.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache with TTL
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Returns the cached original URL for `short_code`, if any.
    async fn get_url(&self, short_code: &str) -> CacheResult<Option<String>>;

    /// Caches a mapping. `ttl_seconds = None` uses the backend default.
    async fn set_url(
        &self,
        short_code: &str,
        original_url: &str,
        ttl_seconds: Option<u64>,
    ) -> CacheResult<()>;

    /// Checks if the cache backend is reachable. Used by `/health`.
    async fn health_check(&self) -> bool;

    /// Human-readable backend name for health output.
    fn backend(&self) -> &'static str;
}
