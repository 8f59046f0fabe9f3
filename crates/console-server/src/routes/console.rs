//! Console bootstrap and command dispatch

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use fixit_core::console::{AuthGate, Command, ConsoleView, GateOutcome, Notification};

use super::{route_error, session_from_headers, RouteError};
use crate::session::ConsoleSession;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CommandResponse {
    notification: Notification,
    view: ConsoleView,
}

fn gate_error(outcome: &GateOutcome) -> RouteError {
    let status = match outcome {
        GateOutcome::AccessDenied { .. } => StatusCode::FORBIDDEN,
        _ => StatusCode::UNAUTHORIZED,
    };
    let mut error = route_error(status, outcome.message());
    error.1.sign_in = outcome.offers_sign_in();
    error
}

/// Run the auth gate for this session and open a console on success. A
/// refused session is dropped from the registry.
async fn open_console(
    state: &AppState,
    id: Uuid,
    session: &mut ConsoleSession,
) -> Result<(), RouteError> {
    let services = session.services();
    let outcome = AuthGate::new(services.auth.clone(), services.users.clone())
        .with_timeout(state.auth_timeout())
        .check()
        .await;

    if !outcome.is_authorized() {
        session.close();
        state.remove_session(id).await;
        return Err(gate_error(&outcome));
    }
    let Some(principal) = outcome.into_principal() else {
        return Err(route_error(StatusCode::INTERNAL_SERVER_ERROR, "Gate lost the principal"));
    };

    info!(email = %principal.auth.email, role = %principal.role(), "Console opened");
    session.open(principal).load_all().await;
    Ok(())
}

async fn console_view(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ConsoleView>, RouteError> {
    let (id, session) = session_from_headers(&state, &headers).await?;
    let mut session = session.lock().await;
    open_console(&state, id, &mut session).await?;

    session
        .console()
        .map(|console| Json(console.view()))
        .ok_or_else(|| route_error(StatusCode::INTERNAL_SERVER_ERROR, "Console not open"))
}

async fn dispatch_command(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(command): Json<Command>,
) -> Result<Json<CommandResponse>, RouteError> {
    let (id, session) = session_from_headers(&state, &headers).await?;
    let mut session = session.lock().await;
    if session.console().is_none() {
        open_console(&state, id, &mut session).await?;
    }

    let console = session
        .console_mut()
        .ok_or_else(|| route_error(StatusCode::INTERNAL_SERVER_ERROR, "Console not open"))?;
    let notification = console.dispatch(command).await;
    Ok(Json(CommandResponse {
        notification,
        view: console.view(),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/console", get(console_view))
        .route("/api/console/commands", post(dispatch_command))
}
