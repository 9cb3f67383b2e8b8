use std::error::Error;

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use axum::http::StatusCode;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::{news::FetchError, store::RegistryError};

#[derive(Debug, Error)]
pub enum RestError {
    #[error("Unauthorized: authenticated user required")]
    Unauthenticated,

    #[error("User not found")]
    UserNotFound,

    #[error("Email and preferences are required")]
    MissingSignupFields,

    #[error("{0}")]
    Registry(#[from] RegistryError),

    #[error("Failed to fetch news")]
    News(#[source] FetchError),

    #[error("Failed to fetch search results")]
    Search(#[source] FetchError),
}

impl RestError {
    fn status(&self) -> StatusCode {
        match self {
            RestError::Unauthenticated => StatusCode::UNAUTHORIZED,
            RestError::UserNotFound => StatusCode::NOT_FOUND,
            RestError::MissingSignupFields => StatusCode::BAD_REQUEST,
            RestError::Registry(RegistryError::MissingEmail) => StatusCode::BAD_REQUEST,
            RestError::Registry(RegistryError::AlreadyRegistered(_)) => StatusCode::CONFLICT,
            RestError::News(e) | RestError::Search(e) if e.is_timeout() => {
                StatusCode::GATEWAY_TIMEOUT
            }
            RestError::News(_) | RestError::Search(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        error!("{}: {:?}", self, self.source());

        let status = self.status();
        let payload = match &self {
            RestError::News(e) | RestError::Search(e) => {
                Json(json!({"message": self.to_string(), "error": e.to_string()}))
            }
            _ => Json(json!({"message": self.to_string()})),
        };

        (status, payload).into_response()
    }
}
