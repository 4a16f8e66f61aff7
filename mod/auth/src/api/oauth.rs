use axum::extract::{Extension, Path, Query, State};
use axum::response::Redirect;
use axum::routing::{get, post};
use axum::{Json, Router};

use opentodo_core::ServiceError;

use crate::api::AppState;
use crate::model::{Claims, RefreshRequest, TokenPair};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/login/{provider}", get(login))
        .route("/callback/{provider}", get(callback))
        .route("/token/refresh", post(refresh))
        .route("/token/revoke", post(revoke))
}

/// GET /auth/login/{provider} — redirect to the provider's authorization URL.
async fn login(
    State(svc): State<AppState>,
    Path(provider): Path<String>,
) -> Result<Redirect, ServiceError> {
    let state = svc.oauth_state(&provider).map_err(ServiceError::from)?;
    let url = svc
        .oauth_authorize_url(&provider, &state)
        .map_err(ServiceError::from)?;
    Ok(Redirect::temporary(&url))
}

/// GET /auth/callback/{provider}?code=...&state=... — exchange the code
/// for tokens and sign the user in. The state must be one this server
/// minted for the same provider; anything else is a forged callback.
async fn callback(
    State(svc): State<AppState>,
    Path(provider): Path<String>,
    Query(params): Query<CallbackParams>,
) -> Result<Json<TokenPair>, ServiceError> {
    svc.verify_oauth_state(&provider, &params.state)
        .map_err(ServiceError::from)?;

    let user_info = svc
        .oauth_callback(&provider, &params.code)
        .await
        .map_err(ServiceError::from)?;

    let user = svc
        .find_or_create_oauth_user(&provider, &user_info)
        .map_err(ServiceError::from)?;

    let tokens = svc.issue_tokens(&user).map_err(ServiceError::from)?;
    Ok(Json(tokens))
}

/// POST /auth/token/refresh — rotate a token pair.
async fn refresh(
    State(svc): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<TokenPair>, ServiceError> {
    let tokens = svc
        .refresh_tokens(&body.refresh_token)
        .map_err(ServiceError::from)?;
    Ok(Json(tokens))
}

/// POST /auth/token/revoke — revoke the current session.
async fn revoke(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<axum::http::StatusCode, ServiceError> {
    svc.revoke_session(&claims.sid).map_err(ServiceError::from)?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

#[derive(serde::Deserialize)]
struct CallbackParams {
    code: String,
    #[serde(default)]
    state: String,
}
