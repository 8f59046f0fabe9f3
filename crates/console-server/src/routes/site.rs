//! Marketing site endpoints

use axum::{routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::state::AppState;

const DEMO_REPLY: &str = "Message sent! (Demo mode)";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ContactRequest {
    name: String,
    email: String,
    message: String,
}

#[derive(Debug, Serialize)]
struct ContactResponse {
    status: &'static str,
}

/// Contact form. Nothing is delivered; the form only acknowledges.
async fn contact(Json(payload): Json<ContactRequest>) -> Json<ContactResponse> {
    info!(
        name = %payload.name,
        email = %payload.email,
        length = payload.message.len(),
        "Contact form submitted"
    );
    Json(ContactResponse { status: DEMO_REPLY })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/contact", post(contact))
}
