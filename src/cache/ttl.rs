//! Fingerprint-keyed article cache with per-entry expiry.
//!
//! Validity is judged against `tokio::time::Instant`, so a paused test clock
//! drives expiry. moka bounds memory and performs the actual eviction: its own
//! TTL catches entries in real time, and [`TtlCache::sweep`] reclaims anything
//! the tokio clock already considers expired.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use moka::ops::compute::Op;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::news::{Article, Fingerprint};

#[derive(Debug, Clone)]
struct CacheEntry {
    articles: Arc<Vec<Article>>,
    inserted_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.inserted_at.elapsed() < ttl
    }
}

pub struct TtlCache {
    entries: Cache<Fingerprint, CacheEntry>,
    ttl: Duration,
}

impl TtlCache {
    pub fn new(ttl: Duration, capacity: u64) -> Self {
        let entries = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .build();

        Self { entries, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached articles for `key`, or `None` if absent or expired.
    pub async fn get(&self, key: &Fingerprint) -> Option<Arc<Vec<Article>>> {
        let entry = self.entries.get(key).await?;

        if entry.is_fresh(self.ttl) {
            Some(entry.articles)
        } else {
            debug!("cache entry {} expired", key);
            None
        }
    }

    /// Replaces the whole entry for `key` and restarts its TTL.
    pub async fn set(&self, key: Fingerprint, articles: Vec<Article>) -> Arc<Vec<Article>> {
        let articles = Arc::new(articles);
        let entry = CacheEntry {
            articles: Arc::clone(&articles),
            inserted_at: Instant::now(),
        };

        self.entries.insert(key, entry).await;
        articles
    }

    /// Approximate number of live entries.
    pub fn len(&self) -> u64 {
        self.entries.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every entry that is past its TTL. Expiry is re-checked under the
    /// entry's lock, so a concurrent `set` of the same key survives.
    pub async fn sweep(&self) {
        let ttl = self.ttl;
        let expired: Vec<Fingerprint> = self
            .entries
            .iter()
            .filter(|(_, entry)| !entry.is_fresh(ttl))
            .map(|(key, _)| Fingerprint::clone(&key))
            .collect();

        for key in &expired {
            self.entries
                .entry_by_ref(key)
                .and_compute_with(|current| {
                    let op = match current {
                        Some(entry) if !entry.value().is_fresh(ttl) => Op::Remove,
                        _ => Op::Nop,
                    };
                    std::future::ready(op)
                })
                .await;
        }

        self.entries.run_pending_tasks().await;
        debug!(
            "cache sweep removed {} expired entries, {} remain",
            expired.len(),
            self.len()
        );
    }

    pub fn spawn_sweeper(
        self: &Arc<Self>,
        period: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let cache = Arc::clone(self);

        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => cache.sweep().await,
                }
            }

            info!("Cache sweeper stopped");
        })
    }
}
