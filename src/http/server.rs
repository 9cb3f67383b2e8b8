use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::context::GatewayContext;
use crate::http::routes;

pub fn router(ctx: GatewayContext) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/users/signup", post(routes::register))
        .route(
            "/users/preferences",
            get(routes::get_preferences).put(routes::update_preferences),
        )
        .route("/news", get(routes::get_news))
        .route("/news/search/{keyword}", get(routes::search_news))
        .route("/news/read", get(routes::list_read))
        .route("/news/favorites", get(routes::list_favorites))
        .route("/news/{id}/read", post(routes::mark_read))
        .route("/news/{id}/favorite", post(routes::mark_favorite))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}

/// Serves until Ctrl+C or SIGTERM.
pub async fn serve(listener: TcpListener, ctx: GatewayContext) -> std::io::Result<()> {
    axum::serve(listener, router(ctx))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }
}
