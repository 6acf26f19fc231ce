//! Resolver tuning supplied by the host service

use serde::Deserialize;
use std::time::Duration;

/// Top-level resolver configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub pagination: PaginationConfig,
    pub loaders: LoaderConfig,
    pub subscriptions: SubscriptionConfig,
}

/// Connection window limits
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Page size used when neither `first` nor `last` is given
    pub default_page_size: i32,
    /// Largest accepted `first`/`last`
    pub max_page_size: i32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

/// Batch loader tuning
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Batching window in milliseconds; 0 yields once instead of sleeping
    pub batch_delay_ms: u64,
    /// Keys per backend batch call
    pub max_batch_size: usize,
}

impl LoaderConfig {
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            batch_delay_ms: 1,
            max_batch_size: 100,
        }
    }
}

/// Subscription sink tuning
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct SubscriptionConfig {
    pub buffer_size: usize,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self { buffer_size: 32 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: ResolverConfig =
            serde_json::from_str(r#"{"pagination": {"max_page_size": 50}}"#).unwrap();
        assert_eq!(config.pagination.max_page_size, 50);
        assert_eq!(config.pagination.default_page_size, 20);
        assert_eq!(config.loaders.max_batch_size, 100);
        assert_eq!(config.subscriptions.buffer_size, 32);
    }

    #[test]
    fn test_batch_delay() {
        let loaders = LoaderConfig {
            batch_delay_ms: 5,
            max_batch_size: 10,
        };
        assert_eq!(loaders.batch_delay(), Duration::from_millis(5));
    }
}
