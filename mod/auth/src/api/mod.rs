mod login;
mod me;
mod middleware;
mod oauth;
mod providers;

pub use middleware::auth_middleware;

use std::sync::Arc;

use axum::Router;

use crate::service::AuthService;

/// Shared application state.
pub type AppState = Arc<AuthService>;

/// Build the auth API router.
///
/// Routes carry absolute `/auth/...` paths. The bearer middleware is NOT
/// applied here — the binary layers [`auth_middleware`] over the whole
/// application so every module shares one principal-injection point.
pub fn build_router(svc: Arc<AuthService>) -> Router {
    let api = Router::new()
        .merge(login::routes())
        .merge(oauth::routes())
        .merge(me::routes())
        .merge(providers::routes());

    Router::new().nest("/auth", api).with_state(svc)
}
