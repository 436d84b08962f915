//! Configuration types for the atlas engine.

use std::time::Duration;

/// Configuration for the query engine.
///
/// # Example
///
/// ```rust
/// use atlas_engine::{CacheConfig, EngineConfig};
/// use std::time::Duration;
///
/// let config = EngineConfig::builder()
///     .with_cache(CacheConfig::default())
///     .with_max_scan(500_000)
///     .build();
/// ```
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Response cache configuration (None = caching disabled).
    pub cache: Option<CacheConfig>,
    /// Upper bound on corpus size the executor will scan (None = unlimited).
    pub max_scan: Option<usize>,
}

impl EngineConfig {
    /// Creates a new builder for EngineConfig.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }
}

/// Builder for EngineConfig.
#[derive(Debug, Clone, Default)]
pub struct EngineConfigBuilder {
    cache: Option<CacheConfig>,
    max_scan: Option<usize>,
}

impl EngineConfigBuilder {
    /// Enables response caching with the given configuration.
    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Bounds the corpus size the executor will scan.
    pub fn with_max_scan(mut self, max_scan: usize) -> Self {
        self.max_scan = Some(max_scan);
        self
    }

    /// Builds the EngineConfig.
    pub fn build(self) -> EngineConfig {
        EngineConfig {
            cache: self.cache,
            max_scan: self.max_scan,
        }
    }
}

/// Configuration for the response cache.
///
/// Constructor configuration, not hard-coded constants: the cache service
/// is built once at process start from these values and injected into the
/// HTTP façade.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of cached responses; older entries are evicted first.
    pub max_entries: usize,
    /// Time-to-live for cached entries.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 100,
            ttl: Duration::from_secs(300),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_config_default() {
        let config = EngineConfig::default();
        assert!(config.cache.is_none());
        assert!(config.max_scan.is_none());
    }

    #[test]
    fn test_engine_config_builder() {
        let config = EngineConfig::builder()
            .with_cache(CacheConfig::default())
            .with_max_scan(10_000)
            .build();
        assert!(config.cache.is_some());
        assert_eq!(config.max_scan, Some(10_000));
    }

    #[test]
    fn test_cache_config_default() {
        let cache = CacheConfig::default();
        assert_eq!(cache.max_entries, 100);
        assert_eq!(cache.ttl, Duration::from_secs(300));
    }
}
