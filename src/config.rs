use std::time::Duration;

use smart_default::SmartDefault;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} not set")]
    MissingVar(&'static str),
}

/// Runtime knobs for the cache, the fetch path and the refresh loop.
#[derive(Debug, Clone, SmartDefault)]
pub struct GatewayConfig {
    /// How long a cached feed stays valid.
    #[default(Duration::from_secs(600))]
    pub cache_ttl: Duration,

    /// How often expired cache entries are reclaimed.
    #[default(Duration::from_secs(120))]
    pub sweep_period: Duration,

    #[default(10_000)]
    pub cache_capacity: u64,

    #[default(Duration::from_secs(600))]
    pub refresh_interval: Duration,

    /// Fingerprints refreshed in parallel during one cycle.
    #[default(4)]
    pub refresh_concurrency: usize,

    /// Upper bound for a single upstream call.
    #[default(Duration::from_secs(10))]
    pub fetch_timeout: Duration,

    /// Time an in-flight refresh cycle gets to finish on shutdown.
    #[default(Duration::from_secs(5))]
    pub shutdown_grace: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::default();

        assert_eq!(config.cache_ttl, Duration::from_secs(600));
        assert_eq!(config.sweep_period, Duration::from_secs(120));
        assert_eq!(config.refresh_interval, Duration::from_secs(600));
        assert_eq!(config.refresh_concurrency, 4);
        assert!(config.sweep_period < config.cache_ttl);
    }
}
