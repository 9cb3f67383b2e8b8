use std::sync::Arc;

use crate::cache::TtlCache;
use crate::config::GatewayConfig;
use crate::news::ArticleFetcher;
use crate::resolver::NewsResolver;
use crate::scheduler::RefreshScheduler;
use crate::store::{InteractionStore, UserRegistry};

/// Process-wide handles shared by request handlers and background tasks.
#[derive(Clone)]
pub struct GatewayContext {
    pub registry: Arc<UserRegistry>,
    pub interactions: Arc<InteractionStore>,
    pub cache: Arc<TtlCache>,
    pub resolver: Arc<NewsResolver>,
}

impl GatewayContext {
    pub fn new(config: &GatewayConfig, fetcher: Arc<dyn ArticleFetcher>) -> Self {
        let cache = Arc::new(TtlCache::new(config.cache_ttl, config.cache_capacity));
        let resolver = Arc::new(NewsResolver::new(
            Arc::clone(&cache),
            fetcher,
            config.fetch_timeout,
        ));

        Self {
            registry: Arc::new(UserRegistry::new()),
            interactions: Arc::new(InteractionStore::new()),
            cache,
            resolver,
        }
    }

    pub fn refresh_scheduler(&self, config: &GatewayConfig) -> Arc<RefreshScheduler> {
        Arc::new(RefreshScheduler::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.resolver),
            config.refresh_interval,
            config.refresh_concurrency,
        ))
    }
}
