//! Route handlers

pub mod auth;
pub mod console;
pub mod health;
pub mod site;

use axum::{
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::session::verify_session_jwt;
use crate::state::{AppState, SharedSession};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    /// Set when the client should send the user back to the sign-in page.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub sign_in: bool,
}

pub type RouteError = (StatusCode, Json<ErrorResponse>);

pub fn route_error(status: StatusCode, error: impl Into<String>) -> RouteError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            sign_in: false,
        }),
    )
}

pub fn unauthorized(error: impl Into<String>) -> RouteError {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: error.into(),
            sign_in: true,
        }),
    )
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Resolve the console session named by the request's bearer token.
pub async fn session_from_headers(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<(Uuid, SharedSession), RouteError> {
    let token = bearer_token(headers).ok_or_else(|| unauthorized("Missing bearer token"))?;
    let claims = verify_session_jwt(state.session_secret(), token).map_err(|err| {
        debug!(error = %err, "Rejected session token");
        unauthorized(err.to_string())
    })?;
    let id = claims
        .session_id()
        .map_err(|err| unauthorized(err.to_string()))?;

    let session = state
        .session(id)
        .await
        .ok_or_else(|| unauthorized("Session has ended. Please sign in again."))?;
    Ok((id, session))
}
