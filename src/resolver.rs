use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, info};

use crate::cache::TtlCache;
use crate::news::{Article, ArticleFetcher, FeedQuery, FetchError, User};

/// Where a feed's articles came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedOrigin {
    /// The user has no categories or no languages; nothing was fetched.
    Unconfigured,
    Cache,
    Upstream,
}

#[derive(Debug, Clone)]
pub struct Feed {
    pub articles: Arc<Vec<Article>>,
    pub origin: FeedOrigin,
}

impl Feed {
    fn unconfigured() -> Self {
        Self {
            articles: Arc::new(Vec::new()),
            origin: FeedOrigin::Unconfigured,
        }
    }
}

pub struct NewsResolver {
    cache: Arc<TtlCache>,
    fetcher: Arc<dyn ArticleFetcher>,
    fetch_timeout: Duration,
}

impl NewsResolver {
    pub fn new(
        cache: Arc<TtlCache>,
        fetcher: Arc<dyn ArticleFetcher>,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            cache,
            fetcher,
            fetch_timeout,
        }
    }

    /// Serves the user's feed from cache, fetching and caching it on a miss.
    /// Fetch failures are returned as-is and never cached.
    pub async fn resolve(&self, user: &User) -> Result<Feed, FetchError> {
        let Some(query) = user.preferences.query() else {
            debug!("{} has no preferences configured", user.email);
            return Ok(Feed::unconfigured());
        };

        if let Some(articles) = self.cache.get(&query.fingerprint).await {
            debug!("cache hit for {} ({})", user.email, query.fingerprint);
            return Ok(Feed {
                articles,
                origin: FeedOrigin::Cache,
            });
        }

        debug!("cache miss for {} ({})", user.email, query.fingerprint);
        let articles = self.fetch_headlines(&query).await?;
        let articles = self.cache.set(query.fingerprint, articles).await;

        Ok(Feed {
            articles,
            origin: FeedOrigin::Upstream,
        })
    }

    /// Unconditionally re-fetches `query` and replaces its cache entry.
    /// On failure the existing entry is left alone.
    pub async fn refresh(&self, query: &FeedQuery) -> Result<usize, FetchError> {
        let articles = self.fetch_headlines(query).await?;
        let count = articles.len();
        self.cache.set(query.fingerprint.clone(), articles).await;

        Ok(count)
    }

    /// Keyword search. Always goes upstream.
    pub async fn search(&self, keyword: &str) -> Result<Vec<Article>, FetchError> {
        info!("Searching news for '{}'", keyword);
        self.bounded(self.fetcher.search(keyword)).await
    }

    async fn fetch_headlines(&self, query: &FeedQuery) -> Result<Vec<Article>, FetchError> {
        self.bounded(
            self.fetcher
                .top_headlines(&query.categories, &query.languages),
        )
        .await
    }

    async fn bounded<F>(&self, fetch: F) -> Result<Vec<Article>, FetchError>
    where
        F: std::future::Future<Output = Result<Vec<Article>, FetchError>>,
    {
        timeout(self.fetch_timeout, fetch)
            .await
            .map_err(|_| FetchError::Timeout(self.fetch_timeout))?
    }
}
