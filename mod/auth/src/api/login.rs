use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};

use opentodo_core::ServiceError;

use crate::api::AppState;
use crate::model::{LoginRequest, RegisterRequest, TokenPair, UserPublic};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// POST /auth/register — create a password account and sign in.
async fn register(
    State(svc): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServiceError> {
    let user = svc.register_user(body).map_err(ServiceError::from)?;
    let tokens = svc.issue_tokens(&user).map_err(ServiceError::from)?;

    let public: UserPublic = user.into();
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "user": public, "tokens": tokens })),
    ))
}

/// POST /auth/login — email/password sign in.
async fn login(
    State(svc): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<TokenPair>, ServiceError> {
    let user = svc.verify_login(&body).map_err(ServiceError::from)?;
    let tokens = svc.issue_tokens(&user).map_err(ServiceError::from)?;
    Ok(Json(tokens))
}
