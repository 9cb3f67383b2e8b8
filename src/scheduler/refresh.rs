use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::news::{FeedQuery, Fingerprint};
use crate::resolver::NewsResolver;
use crate::store::UserRegistry;

/// Outcome of one pass over the registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Fingerprints whose cache entry was replaced.
    pub refreshed: usize,
    /// Fingerprints whose fetch failed; their old entries are untouched.
    pub failed: usize,
    /// Users without categories or languages.
    pub skipped: usize,
}

pub struct RefreshScheduler {
    registry: Arc<UserRegistry>,
    resolver: Arc<NewsResolver>,
    interval: Duration,
    concurrency: usize,
}

impl RefreshScheduler {
    pub fn new(
        registry: Arc<UserRegistry>,
        resolver: Arc<NewsResolver>,
        interval: Duration,
        concurrency: usize,
    ) -> Self {
        Self {
            registry,
            resolver,
            interval,
            concurrency: concurrency.max(1),
        }
    }

    /// Force-refreshes the feed of every configured user. Users that share a
    /// fingerprint are fetched once. A failed fetch is logged and skipped.
    pub async fn run_cycle(&self) -> CycleReport {
        let users = self.registry.snapshot();
        let mut report = CycleReport::default();

        let mut queries: HashMap<Fingerprint, FeedQuery> = HashMap::new();
        for user in &users {
            match user.preferences.query() {
                Some(query) => {
                    queries.entry(query.fingerprint.clone()).or_insert(query);
                }
                None => report.skipped += 1,
            }
        }

        debug!(
            "Refreshing {} fingerprints for {} users",
            queries.len(),
            users.len()
        );

        let outcomes = stream::iter(queries.into_values())
            .map(|query| async move {
                let outcome = self.resolver.refresh(&query).await;
                (query.fingerprint, outcome)
            })
            .buffer_unordered(self.concurrency)
            .collect::<Vec<_>>()
            .await;

        for (fingerprint, outcome) in outcomes {
            match outcome {
                Ok(count) => {
                    debug!("Refreshed {} with {} articles", fingerprint, count);
                    report.refreshed += 1;
                }
                Err(e) => {
                    warn!("Failed to update cache for {}: {}", fingerprint, e);
                    report.failed += 1;
                }
            }
        }

        report
    }

    /// Starts the recurring loop. The first cycle runs one interval from now.
    pub fn spawn(self: Arc<Self>, cancel: CancellationToken) -> RefreshHandle {
        let token = cancel.clone();

        let join = tokio::spawn(async move {
            info!("Refresh scheduler started, interval {:?}", self.interval);

            let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        info!("Updating cached news...");
                        let started = Instant::now();
                        let report = self.run_cycle().await;
                        info!(
                            "Refresh cycle done in {:?}: {} refreshed, {} failed, {} skipped",
                            started.elapsed(),
                            report.refreshed,
                            report.failed,
                            report.skipped
                        );
                    }
                }
            }

            info!("Refresh scheduler stopped");
        });

        RefreshHandle { cancel, join }
    }
}

pub struct RefreshHandle {
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

impl RefreshHandle {
    /// Stops scheduling new cycles and gives an in-flight cycle up to `grace`
    /// to finish before abandoning it.
    pub async fn shutdown(mut self, grace: Duration) {
        self.cancel.cancel();

        if tokio::time::timeout(grace, &mut self.join).await.is_err() {
            warn!("Refresh cycle still running after {:?}, abandoning it", grace);
            self.join.abort();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::TtlCache;
    use crate::news::{fingerprint, Article, Preferences, ScriptedFetcher};

    struct Fixture {
        fetcher: Arc<ScriptedFetcher>,
        cache: Arc<TtlCache>,
        registry: Arc<UserRegistry>,
        scheduler: Arc<RefreshScheduler>,
    }

    fn fixture(fetcher: ScriptedFetcher) -> Fixture {
        let fetcher = Arc::new(fetcher);
        let cache = Arc::new(TtlCache::new(Duration::from_secs(600), 100));
        let registry = Arc::new(UserRegistry::new());
        let resolver = Arc::new(NewsResolver::new(
            Arc::clone(&cache),
            fetcher.clone(),
            Duration::from_secs(5),
        ));
        let scheduler = Arc::new(RefreshScheduler::new(
            Arc::clone(&registry),
            resolver,
            Duration::from_secs(600),
            4,
        ));

        Fixture {
            fetcher,
            cache,
            registry,
            scheduler,
        }
    }

    #[tokio::test]
    async fn test_cycle_isolates_failures() {
        let f = fixture(ScriptedFetcher::new());
        let failing = fingerprint(&["tech"], &["en"]);
        let working = fingerprint(&["sports"], &["en"]);

        f.registry
            .register("a@example.com", Preferences::new(vec!["tech"], vec!["en"]))
            .unwrap();
        f.registry
            .register("b@example.com", Preferences::new(vec!["sports"], vec!["en"]))
            .unwrap();

        f.cache
            .set(failing.clone(), vec![Article::titled("old tech")])
            .await;
        f.cache
            .set(working.clone(), vec![Article::titled("old sports")])
            .await;

        f.fetcher.fail(&["tech"], &["en"], "upstream 500");
        f.fetcher
            .respond(&["sports"], &["en"], vec![Article::titled("new sports")]);

        let report = f.scheduler.run_cycle().await;

        assert_eq!(
            report,
            CycleReport {
                refreshed: 1,
                failed: 1,
                skipped: 0
            }
        );
        assert_eq!(
            *f.cache.get(&failing).await.unwrap(),
            vec![Article::titled("old tech")]
        );
        assert_eq!(
            *f.cache.get(&working).await.unwrap(),
            vec![Article::titled("new sports")]
        );
    }

    #[tokio::test]
    async fn test_cycle_skips_unconfigured_and_dedups() {
        let f = fixture(ScriptedFetcher::new());

        f.registry
            .register("a@example.com", Preferences::new(vec!["tech", "sports"], vec!["en"]))
            .unwrap();
        f.registry
            .register("b@example.com", Preferences::new(vec!["sports", "tech"], vec!["en"]))
            .unwrap();
        f.registry
            .register("c@example.com", Preferences::new(vec!["tech"], vec![]))
            .unwrap();

        let report = f.scheduler.run_cycle().await;

        assert_eq!(report.refreshed, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(f.fetcher.headline_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_is_forced_even_when_fresh() {
        let f = fixture(ScriptedFetcher::new());
        let key = fingerprint(&["tech"], &["en"]);

        f.registry
            .register("a@example.com", Preferences::new(vec!["tech"], vec!["en"]))
            .unwrap();
        f.cache.set(key.clone(), vec![Article::titled("old")]).await;
        f.fetcher
            .respond(&["tech"], &["en"], vec![Article::titled("new")]);

        f.scheduler.run_cycle().await;

        assert_eq!(f.fetcher.headline_calls(), 1);
        assert_eq!(
            *f.cache.get(&key).await.unwrap(),
            vec![Article::titled("new")]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_runs_on_interval() {
        let f = fixture(ScriptedFetcher::new());
        f.registry
            .register("a@example.com", Preferences::new(vec!["tech"], vec!["en"]))
            .unwrap();

        let handle = Arc::clone(&f.scheduler).spawn(CancellationToken::new());

        tokio::time::sleep(Duration::from_secs(599)).await;
        assert_eq!(f.fetcher.headline_calls(), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(f.fetcher.headline_calls(), 1);

        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(f.fetcher.headline_calls(), 2);

        handle.shutdown(Duration::from_secs(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_users_added_mid_run_are_picked_up_next_cycle() {
        let f = fixture(ScriptedFetcher::new());
        let handle = Arc::clone(&f.scheduler).spawn(CancellationToken::new());

        tokio::time::sleep(Duration::from_secs(601)).await;
        assert_eq!(f.fetcher.headline_calls(), 0);

        f.registry
            .register("late@example.com", Preferences::new(vec!["tech"], vec!["en"]))
            .unwrap();

        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(f.fetcher.headline_calls(), 1);

        handle.shutdown(Duration::from_secs(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_loop() {
        let f = fixture(ScriptedFetcher::new());
        f.registry
            .register("a@example.com", Preferences::new(vec!["tech"], vec!["en"]))
            .unwrap();

        let handle = Arc::clone(&f.scheduler).spawn(CancellationToken::new());
        handle.shutdown(Duration::from_secs(1)).await;

        tokio::time::sleep(Duration::from_secs(1800)).await;
        assert_eq!(f.fetcher.headline_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_abandons_slow_cycle() {
        let f = fixture(ScriptedFetcher::new().with_delay(Duration::from_secs(4)));
        for n in 0..3 {
            f.registry
                .register(
                    &format!("{n}@example.com"),
                    Preferences::new(vec![format!("topic-{n}")], vec!["en".to_string()]),
                )
                .unwrap();
        }

        // One fetch at a time, so a cycle takes 12s.
        let scheduler = Arc::new(RefreshScheduler::new(
            Arc::clone(&f.registry),
            Arc::new(NewsResolver::new(
                Arc::clone(&f.cache),
                f.fetcher.clone(),
                Duration::from_secs(5),
            )),
            Duration::from_secs(600),
            1,
        ));
        let handle = scheduler.spawn(CancellationToken::new());

        tokio::time::sleep(Duration::from_secs(601)).await;
        let started = Instant::now();
        handle.shutdown(Duration::from_secs(2)).await;

        assert!(started.elapsed() <= Duration::from_secs(3));
        assert!(f.fetcher.headline_calls() < 3);
    }
}
