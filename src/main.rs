use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use news_gateway::{
    config::GatewayConfig,
    http,
    news::{config::NewsApiConfig, ArticleFetcher, NewsApiClient, ScriptedFetcher},
    GatewayContext,
};

#[derive(Parser)]
#[command(name = "news-gateway")]
#[command(about = "Personalized news gateway with cached, periodically refreshed feeds")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Args {
    #[arg(short, long, default_value = "3000")]
    port: u16,

    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(long)]
    debug: bool,

    /// Seconds a cached feed stays valid
    #[arg(long, default_value = "600")]
    cache_ttl: u64,

    /// Seconds between sweeps of expired cache entries
    #[arg(long, default_value = "120")]
    sweep_period: u64,

    #[arg(long, default_value = "10000")]
    cache_capacity: u64,

    /// Seconds between background refresh cycles
    #[arg(long, default_value = "600")]
    refresh_interval: u64,

    #[arg(long, default_value = "4")]
    refresh_concurrency: usize,

    /// Seconds before an upstream call is abandoned
    #[arg(long, default_value = "10")]
    fetch_timeout: u64,

    /// Seconds an in-flight refresh cycle may run after shutdown is requested
    #[arg(long, default_value = "5")]
    shutdown_grace: u64,

    /// Serve from an in-memory fetcher instead of NewsAPI
    #[arg(long)]
    offline: bool,
}

impl Args {
    fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            cache_ttl: Duration::from_secs(self.cache_ttl),
            sweep_period: Duration::from_secs(self.sweep_period),
            cache_capacity: self.cache_capacity,
            refresh_interval: Duration::from_secs(self.refresh_interval),
            refresh_concurrency: self.refresh_concurrency,
            fetch_timeout: Duration::from_secs(self.fetch_timeout),
            shutdown_grace: Duration::from_secs(self.shutdown_grace),
        }
    }
}

/// Returns whether the sweeper stopped cleanly; a panic or abort is logged.
async fn join_sweeper(sweeper: JoinHandle<()>) -> bool {
    match sweeper.await {
        Ok(()) => true,
        Err(e) => {
            warn!("Cache sweeper exited abnormally: {}", e);
            false
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("news_gateway={filter_level},tower_http=info").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    dotenvy::dotenv().ok();

    let config = args.gateway_config();
    let fetcher: Arc<dyn ArticleFetcher> = if args.offline {
        info!("Offline mode: serving from in-memory fetcher");
        Arc::new(ScriptedFetcher::new())
    } else {
        let news_api = NewsApiConfig::from_env()
            .context("Failed to load NewsAPI configuration from environment")?;
        Arc::new(NewsApiClient::new(news_api, config.fetch_timeout)?)
    };

    let context = GatewayContext::new(&config, fetcher);
    let cancel = CancellationToken::new();
    let sweeper = context
        .cache
        .spawn_sweeper(config.sweep_period, cancel.child_token());
    let refresher = context
        .refresh_scheduler(&config)
        .spawn(cancel.child_token());

    let bind_addr = format!("{}:{}", args.host, args.port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind to {bind_addr}"))?;

    info!("News gateway started on {}", bind_addr);
    info!(
        "Cache TTL {:?}, refresh every {:?}",
        config.cache_ttl, config.refresh_interval
    );

    http::serve(listener, context).await.context("server error")?;

    info!("Shutting down background tasks");
    cancel.cancel();
    refresher.shutdown(config.shutdown_grace).await;
    join_sweeper(sweeper).await;

    Ok(())
}
