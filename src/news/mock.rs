use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::news::{
    error::FetchError, fetcher::ArticleFetcher, fingerprint::fingerprint, types::Article,
};

#[derive(Debug, Clone)]
enum Script {
    Articles(Vec<Article>),
    Fail(String),
}

impl Script {
    fn play(&self) -> Result<Vec<Article>, FetchError> {
        match self {
            Script::Articles(articles) => Ok(articles.clone()),
            Script::Fail(message) => Err(FetchError::Unavailable(message.clone())),
        }
    }
}

/// In-memory fetcher with scripted responses. Headlines are keyed by the
/// fingerprint of the requested categories/languages, searches by query.
/// Unscripted requests succeed with no articles.
#[derive(Debug, Default)]
pub struct ScriptedFetcher {
    headlines: DashMap<String, Script>,
    searches: DashMap<String, Script>,
    headline_calls: AtomicUsize,
    search_calls: AtomicUsize,
    delay: Option<Duration>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call sleeps for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn respond<S: AsRef<str>>(&self, categories: &[S], languages: &[S], articles: Vec<Article>) {
        let key = fingerprint(categories, languages).to_string();
        self.headlines.insert(key, Script::Articles(articles));
    }

    pub fn fail<S: AsRef<str>>(&self, categories: &[S], languages: &[S], message: &str) {
        let key = fingerprint(categories, languages).to_string();
        self.headlines.insert(key, Script::Fail(message.to_string()));
    }

    pub fn respond_search(&self, query: &str, articles: Vec<Article>) {
        self.searches
            .insert(query.to_string(), Script::Articles(articles));
    }

    pub fn fail_search(&self, query: &str, message: &str) {
        self.searches
            .insert(query.to_string(), Script::Fail(message.to_string()));
    }

    pub fn headline_calls(&self) -> usize {
        self.headline_calls.load(Ordering::SeqCst)
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl ArticleFetcher for ScriptedFetcher {
    async fn top_headlines(
        &self,
        categories: &[String],
        languages: &[String],
    ) -> Result<Vec<Article>, FetchError> {
        self.headline_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;

        let key = fingerprint(categories, languages).to_string();
        // Clone out of the map so no shard lock is held by the caller.
        let script = self.headlines.get(&key).map(|script| script.clone());
        script.map_or_else(|| Ok(Vec::new()), |script| script.play())
    }

    async fn search(&self, query: &str) -> Result<Vec<Article>, FetchError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;

        let script = self.searches.get(query).map(|script| script.clone());
        script.map_or_else(|| Ok(Vec::new()), |script| script.play())
    }
}
