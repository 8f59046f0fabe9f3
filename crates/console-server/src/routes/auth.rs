//! Sign-in and sign-out
//!
//! Signing in opens a backend connection for the browser and hands back a
//! bearer token naming it.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use super::{route_error, session_from_headers, unauthorized, RouteError};
use crate::session::{issue_session_jwt, SESSION_TTL_HOURS};
use crate::state::AppState;

const LOGIN_FAILED: &str = "Login failed. Please try again.";

#[derive(Debug, Deserialize)]
struct SignInRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    token: String,
    expires_at: String,
    uid: String,
    email: String,
}

#[derive(Debug, Serialize)]
struct SignOutResponse {
    success: bool,
}

async fn sign_in(
    State(state): State<AppState>,
    Json(payload): Json<SignInRequest>,
) -> Result<Json<SignInResponse>, RouteError> {
    let session = state.new_session();
    let response = session
        .services()
        .auth
        .sign_in(payload.email.trim(), &payload.password)
        .await;

    let code = response.auth_code();
    let user = match response.into_result() {
        Ok(Some(user)) => user,
        Ok(None) => return Err(unauthorized(LOGIN_FAILED)),
        Err(error) => {
            warn!(email = %payload.email, %error, "Sign-in failed");
            let message = code.map(|code| code.login_message()).unwrap_or(LOGIN_FAILED);
            return Err(unauthorized(message));
        }
    };

    let session_id = Uuid::new_v4();
    let (token, exp) = issue_session_jwt(
        state.session_secret(),
        session_id,
        &user.email,
        SESSION_TTL_HOURS,
    )
    .map_err(|err| route_error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))?;
    state.register_session(session_id, session, exp).await;

    info!(email = %user.email, session_id = %session_id, "Signed in");
    let expires_at = DateTime::<Utc>::from_timestamp(exp as i64, 0)
        .unwrap_or_else(Utc::now)
        .to_rfc3339();
    Ok(Json(SignInResponse {
        token,
        expires_at,
        uid: user.uid,
        email: user.email,
    }))
}

async fn sign_out(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SignOutResponse>, RouteError> {
    let (id, session) = session_from_headers(&state, &headers).await?;
    {
        let mut session = session.lock().await;
        session.close();
        let response = session.services().auth.sign_out().await;
        if let Err(error) = response.into_result() {
            return Err(route_error(StatusCode::BAD_GATEWAY, error));
        }
    }
    state.remove_session(id).await;
    Ok(Json(SignOutResponse { success: true }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/sign-in", post(sign_in))
        .route("/api/auth/sign-out", post(sign_out))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use fixit_core::model::Role;
    use serde_json::json;
    use tower::ServiceExt;

    use crate::routes::test_support::*;

    #[tokio::test]
    async fn test_sign_in_issues_token_for_new_session() {
        let (state, backend) = build_state();
        seed_user(&backend, "root@fixit.test", Some(Role::GlobalAdmin), None).await;
        let app = app(state.clone());

        let token = sign_in(&app, "root@fixit.test").await;
        assert!(!token.is_empty());
        assert_eq!(state.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_sign_in_failures_use_friendly_messages() {
        let (state, backend) = build_state();
        seed_user(&backend, "root@fixit.test", Some(Role::GlobalAdmin), None).await;
        let app = app(state.clone());

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/auth/sign-in",
                None,
                json!({ "email": "root@fixit.test", "password": "nope-nope" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Incorrect password.");

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/auth/sign-in",
                None,
                json!({ "email": "ghost@fixit.test", "password": PASSWORD }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["error"], "No account found with this email.");
        assert_eq!(state.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_sign_out_ends_session() {
        let (state, backend) = build_state();
        seed_user(&backend, "root@fixit.test", Some(Role::GlobalAdmin), None).await;
        let app = app(state.clone());
        let token = sign_in(&app, "root@fixit.test").await;

        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/auth/sign-out", Some(&token), json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(state.session_count().await, 0);

        let response = app
            .oneshot(get_request("/api/console", Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_sign_out_requires_token() {
        let (state, _backend) = build_state();
        let response = app(state)
            .oneshot(json_request("POST", "/api/auth/sign-out", None, json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["signIn"], true);
    }
}
