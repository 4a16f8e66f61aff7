use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};

use opentodo_core::{Principal, ServiceError};

use crate::model::{CreateTaskRequest, Task, UpdateTaskRequest};
use crate::service::TaskService;

type ServiceState = Arc<TaskService>;

pub fn router(service: Arc<TaskService>) -> Router {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/{id}", patch(update_task).delete(delete_task))
        .with_state(service)
}

// ---------------------------------------------------------------------------
// GET /tasks
// ---------------------------------------------------------------------------

async fn list_tasks(
    State(service): State<ServiceState>,
    principal: Principal,
) -> Result<Json<Vec<Task>>, ServiceError> {
    let tasks = service.list(principal.user_id())?;
    Ok(Json(tasks))
}

// ---------------------------------------------------------------------------
// POST /tasks
// ---------------------------------------------------------------------------

async fn create_task(
    State(service): State<ServiceState>,
    principal: Principal,
    Json(req): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Task>), ServiceError> {
    let task = service.create(principal.user_id(), req)?;
    Ok((StatusCode::CREATED, Json(task)))
}

// ---------------------------------------------------------------------------
// PATCH /tasks/:id
// ---------------------------------------------------------------------------

async fn update_task(
    State(service): State<ServiceState>,
    principal: Principal,
    Path(id): Path<String>,
    Json(patch): Json<UpdateTaskRequest>,
) -> Result<Json<Task>, ServiceError> {
    let task = service.update(principal.user_id(), &id, patch)?;
    Ok(Json(task))
}

// ---------------------------------------------------------------------------
// DELETE /tasks/:id
// ---------------------------------------------------------------------------

async fn delete_task(
    State(service): State<ServiceState>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    service.delete(principal.user_id(), &id)?;
    Ok(Json(serde_json::json!({ "id": id, "deleted": true })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use opentodo_sql::{SQLStore, SqliteStore};
    use tower::ServiceExt;

    fn test_router() -> Router {
        let db: Arc<dyn SQLStore> = Arc::new(SqliteStore::open_in_memory().unwrap());
        router(Arc::new(TaskService::new(db).unwrap()))
    }

    /// Build a request the way the auth middleware would deliver it:
    /// principal injected as a request extension.
    fn request(method: &str, uri: &str, principal: Option<&str>, body: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header("content-type", "application/json");
        }
        let mut req = builder
            .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
            .unwrap();
        if let Some(user) = principal {
            req.extensions_mut().insert(Principal(user.to_string()));
        }
        req
    }

    async fn json_body(resp: axum::response::Response) -> serde_json::Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn create_returns_201_with_task_shape() {
        let app = test_router();

        let resp = app
            .oneshot(request("POST", "/tasks", Some("u1"), Some(r#"{"title":"Buy milk"}"#)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body = json_body(resp).await;
        assert_eq!(body["title"], "Buy milk");
        assert_eq!(body["completed"], false);
        assert_eq!(body["userId"], "u1");
        assert!(body["description"].is_null());
        assert_eq!(body["createdAt"], body["updatedAt"]);
    }

    #[tokio::test]
    async fn create_without_title_is_400() {
        let app = test_router();

        let resp = app
            .oneshot(request("POST", "/tasks", Some("u1"), Some("{}")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body = json_body(resp).await;
        assert_eq!(body["code"], "VALIDATION_FAILED");
    }

    #[tokio::test]
    async fn missing_principal_is_401() {
        let app = test_router();

        let resp = app
            .clone()
            .oneshot(request("GET", "/tasks", None, None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = app
            .oneshot(request("POST", "/tasks", None, Some(r#"{"title":"x"}"#)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(resp).await;
        assert_eq!(body["code"], "UNAUTHENTICATED");
    }

    #[tokio::test]
    async fn list_returns_plain_array_scoped_to_owner() {
        let app = test_router();

        for title in ["a", "b"] {
            let body = format!(r#"{{"title":"{title}"}}"#);
            app.clone()
                .oneshot(request("POST", "/tasks", Some("u1"), Some(&body)))
                .await
                .unwrap();
        }
        app.clone()
            .oneshot(request("POST", "/tasks", Some("u2"), Some(r#"{"title":"not yours"}"#)))
            .await
            .unwrap();

        let resp = app
            .oneshot(request("GET", "/tasks", Some("u1"), None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = json_body(resp).await;
        let items = body.as_array().expect("list response is a bare array");
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|t| t["userId"] == "u1"));
    }

    #[tokio::test]
    async fn patch_toggles_and_404s_for_other_users() {
        let app = test_router();

        let created = json_body(
            app.clone()
                .oneshot(request("POST", "/tasks", Some("U1"), Some(r#"{"title":"Buy milk"}"#)))
                .await
                .unwrap(),
        )
        .await;
        let id = created["id"].as_str().unwrap();

        // U2 gets a 404, same as any unknown id.
        let resp = app
            .clone()
            .oneshot(request(
                "PATCH",
                &format!("/tasks/{id}"),
                Some("U2"),
                Some(r#"{"completed":true}"#),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        // U1's same patch succeeds.
        let resp = app
            .oneshot(request(
                "PATCH",
                &format!("/tasks/{id}"),
                Some("U1"),
                Some(r#"{"completed":true}"#),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = json_body(resp).await;
        assert_eq!(body["completed"], true);
        assert_eq!(body["title"], "Buy milk");
    }

    #[tokio::test]
    async fn delete_confirms_then_404s() {
        let app = test_router();

        let created = json_body(
            app.clone()
                .oneshot(request("POST", "/tasks", Some("u1"), Some(r#"{"title":"x"}"#)))
                .await
                .unwrap(),
        )
        .await;
        let id = created["id"].as_str().unwrap().to_string();

        let resp = app
            .clone()
            .oneshot(request("DELETE", &format!("/tasks/{id}"), Some("u1"), None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = json_body(resp).await;
        assert_eq!(body["deleted"], true);
        assert_eq!(body["id"], id.as_str());

        let resp = app
            .oneshot(request("DELETE", &format!("/tasks/{id}"), Some("u1"), None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
