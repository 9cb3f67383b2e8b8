use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::RestError;

/// Header carrying the caller's verified email, set by the auth layer in
/// front of the gateway.
pub const IDENTITY_HEADER: &str = "x-authenticated-user";

/// The verified user identifier for the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(pub String);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(IDENTITY_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .map(|email| AuthenticatedUser(email.to_string()))
            .ok_or(RestError::Unauthenticated)
    }
}
