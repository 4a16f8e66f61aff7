use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/providers", get(list_providers))
}

/// GET /auth/providers — enabled OAuth providers for the sign-in page.
/// Public; ids and display names only.
async fn list_providers(State(svc): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "items": svc.list_providers() }))
}
