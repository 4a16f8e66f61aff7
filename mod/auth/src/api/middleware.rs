use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, middleware::Next};
use serde_json::json;

use opentodo_core::Principal;
use opentodo_core::error::error_code;

use crate::api::AppState;

/// Paths that don't require authentication.
const PUBLIC_PATHS: &[&str] = &[
    "/auth/login",
    "/auth/register",
    "/auth/callback/",
    "/auth/providers",
    "/auth/token/refresh",
    "/health",
    "/version",
];

/// Bearer-token authentication middleware.
///
/// Checks for a Bearer token in the Authorization header and verifies it
/// against the auth service (signature, expiry, session revocation).
/// Public paths (login, register, callback, providers, health) are
/// excluded. On success, stores `Claims` and `Principal` as extensions
/// for handlers to extract.
pub async fn auth_middleware(
    State(svc): State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();

    if is_public_path(&path) {
        return next.run(req).await;
    }

    let token = match extract_bearer(req.headers()) {
        Some(t) => t.to_string(),
        None => return unauthorized("missing authorization header"),
    };

    match svc.verify_token(&token) {
        Ok(claims) => {
            req.extensions_mut().insert(Principal(claims.sub.clone()));
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(e) => unauthorized(&e.to_string()),
    }
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "code": error_code::UNAUTHENTICATED,
            "message": message,
        })),
    )
        .into_response()
}

/// Extract the Bearer token from the Authorization header.
fn extract_bearer(headers: &axum::http::HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Check if a path is public (no auth required).
fn is_public_path(path: &str) -> bool {
    PUBLIC_PATHS.iter().any(|prefix| path.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::build_router;
    use crate::service::test_support::test_service;
    use axum::body::Body;
    use axum::http::header;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn app() -> axum::Router {
        let svc = test_service();
        build_router(svc.clone()).layer(axum::middleware::from_fn_with_state(
            svc,
            auth_middleware,
        ))
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(resp: Response) -> serde_json::Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn public_path_matching() {
        assert!(is_public_path("/auth/login"));
        assert!(is_public_path("/auth/login/github"));
        assert!(is_public_path("/auth/register"));
        assert!(is_public_path("/auth/callback/github"));
        assert!(is_public_path("/auth/providers"));
        assert!(is_public_path("/health"));
        assert!(!is_public_path("/auth/me"));
        assert!(!is_public_path("/auth/token/revoke"));
        assert!(!is_public_path("/tasks"));
    }

    #[tokio::test]
    async fn register_then_me_roundtrip() {
        let app = app();

        let resp = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/auth/register",
                serde_json::json!({
                    "name": "Alice",
                    "email": "alice@example.com",
                    "password": "correct horse",
                }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body = json_body(resp).await;
        let token = body["tokens"]["access_token"].as_str().unwrap().to_string();
        assert!(body["user"].get("password_hash").is_none());

        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/auth/me")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let me = json_body(resp).await;
        assert_eq!(me["email"], "alice@example.com");
        assert!(me.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn me_without_token_is_401() {
        let resp = app()
            .oneshot(Request::builder().uri("/auth/me").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(resp).await;
        assert_eq!(body["code"], "UNAUTHENTICATED");
    }

    #[tokio::test]
    async fn login_with_bad_credentials_is_401() {
        let app = app();

        app.clone()
            .oneshot(json_request(
                "POST",
                "/auth/register",
                serde_json::json!({
                    "name": "Alice",
                    "email": "alice@example.com",
                    "password": "correct horse",
                }),
            ))
            .await
            .unwrap();

        let resp = app
            .oneshot(json_request(
                "POST",
                "/auth/login",
                serde_json::json!({
                    "email": "alice@example.com",
                    "password": "wrong",
                }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn providers_is_public_and_empty_by_default() {
        let resp = app()
            .oneshot(
                Request::builder()
                    .uri("/auth/providers")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = json_body(resp).await;
        assert_eq!(body["items"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn revoked_token_is_rejected() {
        let app = app();

        let resp = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/auth/register",
                serde_json::json!({
                    "name": "Alice",
                    "email": "alice@example.com",
                    "password": "correct horse",
                }),
            ))
            .await
            .unwrap();
        let body = json_body(resp).await;
        let token = body["tokens"]["access_token"].as_str().unwrap().to_string();

        let resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/auth/token/revoke")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/auth/me")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
