use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::context::GatewayContext;
use crate::error::RestError;
use crate::http::identity::AuthenticatedUser;
use crate::news::Preferences;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: Option<String>,
    pub preferences: Option<Preferences>,
}

#[derive(Debug, Deserialize)]
pub struct PreferencesUpdate {
    pub preferences: Option<Preferences>,
}

pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn register(
    State(ctx): State<GatewayContext>,
    Json(request): Json<SignupRequest>,
) -> Result<impl IntoResponse, RestError> {
    let (Some(email), Some(preferences)) = (request.email, request.preferences) else {
        return Err(RestError::MissingSignupFields);
    };

    let user = ctx.registry.register(&email, preferences)?;
    info!("Registered user {}", user.email);

    Ok(Json(json!({"message": "User registered successfully"})))
}

pub async fn get_preferences(
    State(ctx): State<GatewayContext>,
    AuthenticatedUser(email): AuthenticatedUser,
) -> Result<impl IntoResponse, RestError> {
    let user = ctx.registry.get(&email).ok_or(RestError::UserNotFound)?;

    Ok(Json(json!({"preferences": user.preferences})))
}

/// A body without `preferences` leaves the stored ones unchanged.
pub async fn update_preferences(
    State(ctx): State<GatewayContext>,
    AuthenticatedUser(email): AuthenticatedUser,
    Json(update): Json<PreferencesUpdate>,
) -> Result<impl IntoResponse, RestError> {
    let user = match update.preferences {
        Some(preferences) => ctx.registry.update_preferences(&email, preferences),
        None => ctx.registry.get(&email),
    }
    .ok_or(RestError::UserNotFound)?;

    Ok(Json(json!({
        "message": "Preferences updated successfully",
        "preferences": user.preferences,
    })))
}

pub async fn get_news(
    State(ctx): State<GatewayContext>,
    AuthenticatedUser(email): AuthenticatedUser,
) -> Result<impl IntoResponse, RestError> {
    let user = ctx.registry.get(&email).ok_or(RestError::UserNotFound)?;
    let feed = ctx.resolver.resolve(&user).await.map_err(RestError::News)?;

    Ok(Json(json!({"news": feed.articles.as_slice()})))
}

pub async fn search_news(
    State(ctx): State<GatewayContext>,
    AuthenticatedUser(_): AuthenticatedUser,
    Path(keyword): Path<String>,
) -> Result<impl IntoResponse, RestError> {
    let articles = ctx
        .resolver
        .search(&keyword)
        .await
        .map_err(RestError::Search)?;

    Ok(Json(json!({"news": articles})))
}

pub async fn mark_read(
    State(ctx): State<GatewayContext>,
    AuthenticatedUser(email): AuthenticatedUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    ctx.interactions.mark_read(&email, &id);
    Json(json!({"message": "Article marked as read"}))
}

pub async fn mark_favorite(
    State(ctx): State<GatewayContext>,
    AuthenticatedUser(email): AuthenticatedUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    ctx.interactions.mark_favorite(&email, &id);
    Json(json!({"message": "Article marked as favorite"}))
}

pub async fn list_read(
    State(ctx): State<GatewayContext>,
    AuthenticatedUser(email): AuthenticatedUser,
) -> impl IntoResponse {
    Json(json!({"readArticles": ctx.interactions.list_read(&email)}))
}

pub async fn list_favorites(
    State(ctx): State<GatewayContext>,
    AuthenticatedUser(email): AuthenticatedUser,
) -> impl IntoResponse {
    Json(json!({"favoriteArticles": ctx.interactions.list_favorites(&email)}))
}
