use axum::extract::{Extension, State};
use axum::routing::get;
use axum::{Json, Router};

use opentodo_core::ServiceError;

use crate::api::AppState;
use crate::model::{Claims, UserPublic};

pub fn routes() -> Router<AppState> {
    Router::new().route("/me", get(me))
}

/// GET /auth/me — current user info from JWT claims.
async fn me(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<UserPublic>, ServiceError> {
    let user = svc.get_user(&claims.sub).map_err(ServiceError::from)?;
    Ok(Json(user.into()))
}
