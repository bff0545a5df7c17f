//! Repository management endpoints.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use repotrack_core::Repository;
use repotrack_db::RepositoryTx;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::AppState;
use crate::error::ApiError;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_repository))
        .route("/{owner}", get(list_repositories))
        .route("/{owner}/github", get(list_github_repositories))
        .route(
            "/{owner}/{name}",
            get(get_repository).delete(delete_repository),
        )
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct RepositoryResponse {
    pub full_name: String,
    pub owner: String,
    pub name: String,
    pub private: bool,
}

impl From<Repository> for RepositoryResponse {
    fn from(repo: Repository) -> Self {
        Self {
            full_name: repo.full_name(),
            owner: repo.owner,
            name: repo.name,
            private: repo.private,
        }
    }
}

/// Missing fields decode as empty and are rejected by validation.
#[derive(Debug, Deserialize)]
pub struct CreateRepositoryRequest {
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub private: bool,
}

async fn list_repositories(
    State(state): State<AppState>,
    Path(owner): Path<String>,
) -> Result<Json<Vec<RepositoryResponse>>, ApiError> {
    let mut tx = state.store.begin().await?;
    let repos = tx.list_by_owner(&owner).await;
    release(tx).await;

    Ok(Json(repos?.into_iter().map(Into::into).collect()))
}

async fn list_github_repositories(
    State(state): State<AppState>,
    Path(owner): Path<String>,
) -> Result<Json<Vec<RepositoryResponse>>, ApiError> {
    let repos = state.hosting.user_repositories(&owner).await?;
    Ok(Json(repos.into_iter().map(Into::into).collect()))
}

async fn get_repository(
    State(state): State<AppState>,
    Path((owner, name)): Path<(String, String)>,
) -> Result<Json<RepositoryResponse>, ApiError> {
    let full_name = format!("{}/{}", owner, name);

    let mut tx = state.store.begin().await?;
    let repo = tx.get_by_full_name(&full_name).await;
    release(tx).await;

    Ok(Json(repo?.into()))
}

async fn create_repository(
    State(state): State<AppState>,
    body: Result<Json<CreateRepositoryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RepositoryResponse>), ApiError> {
    let Json(req) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let repo = state
        .lifecycle
        .create(Repository::new(req.owner, req.name, req.private))
        .await?;

    Ok((StatusCode::CREATED, Json(repo.into())))
}

async fn delete_repository(
    State(state): State<AppState>,
    Path((owner, name)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state.lifecycle.delete(&owner, &name).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Read-only transactions are always rolled back.
async fn release(tx: Box<dyn RepositoryTx>) {
    if let Err(e) = tx.rollback().await {
        warn!(error = %e, "Failed to release read transaction");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use repotrack_core::hosting::{EnumerationError, EnumerationResult, HostingEnumerator};
    use repotrack_core::webhook::{WebhookError, WebhookRegistrar, WebhookResult};
    use repotrack_db::{MemoryRepositoryStore, RepositoryStore};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    #[derive(Default)]
    struct FakeHooks {
        fail: bool,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl WebhookRegistrar for FakeHooks {
        async fn create_hook(&self, full_name: &str) -> WebhookResult<()> {
            self.calls.lock().unwrap().push(format!("create {}", full_name));
            if self.fail {
                return Err(WebhookError::CreateRejected {
                    full_name: full_name.to_string(),
                    status: 404,
                });
            }
            Ok(())
        }

        async fn delete_hook(&self, full_name: &str) -> WebhookResult<()> {
            self.calls.lock().unwrap().push(format!("delete {}", full_name));
            if self.fail {
                return Err(WebhookError::DeleteRejected {
                    full_name: full_name.to_string(),
                    status: 500,
                });
            }
            Ok(())
        }
    }

    struct FakeHosting;

    #[async_trait]
    impl HostingEnumerator for FakeHosting {
        async fn user_repositories(&self, username: &str) -> EnumerationResult<Vec<Repository>> {
            match username {
                "user1" => Ok(vec![
                    Repository::new("user1", "repo1", false),
                    Repository::new("user1", "repo2", true),
                ]),
                "limited" => Err(EnumerationError::RateLimitExceeded),
                other => Err(EnumerationError::UnknownUser(other.to_string())),
            }
        }
    }

    struct Harness {
        store: MemoryRepositoryStore,
        hooks: Arc<FakeHooks>,
        app: Router,
    }

    fn harness(fail_hooks: bool) -> Harness {
        let store = MemoryRepositoryStore::new();
        let hooks = Arc::new(FakeHooks {
            fail: fail_hooks,
            ..Default::default()
        });
        let state = AppState::new(
            Arc::new(store.clone()),
            hooks.clone(),
            Arc::new(FakeHosting),
        );

        Harness {
            store,
            hooks,
            app: crate::routes::router(state),
        }
    }

    async fn seed(store: &MemoryRepositoryStore, owner: &str, name: &str, private: bool) {
        let mut tx = store.begin().await.unwrap();
        tx.create(&mut Repository::new(owner, name, private))
            .await
            .unwrap();
        tx.commit().await.unwrap();
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn post_json(body: &str) -> Request<Body> {
        Request::post("/repositories")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn delete(uri: &str) -> Request<Body> {
        Request::delete(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let h = harness(false);

        let (status, body) = send(
            &h.app,
            post_json(r#"{"owner": "blamewarrior", "name": "test_repo", "private": true}"#),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(
            body,
            json!({
                "full_name": "blamewarrior/test_repo",
                "owner": "blamewarrior",
                "name": "test_repo",
                "private": true
            })
        );
        assert_eq!(
            *h.hooks.calls.lock().unwrap(),
            vec!["create blamewarrior/test_repo"]
        );

        let (status, body) = send(&h.app, get("/repositories/blamewarrior/test_repo")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["full_name"], "blamewarrior/test_repo");
        assert_eq!(body["private"], true);
    }

    #[tokio::test]
    async fn test_create_with_failing_hook_leaves_nothing() {
        let h = harness(true);

        let (status, body) = send(
            &h.app,
            post_json(r#"{"owner": "blamewarrior", "name": "test_repo"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "internal server error");

        let (status, _) = send(&h.app, get("/repositories/blamewarrior/test_repo")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_validation_errors() {
        let h = harness(false);

        let (status, body) = send(&h.app, post_json(r#"{"name": "test_repo"}"#)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body["error"],
            "error when creating repository: owner must not be empty"
        );

        let (status, _) = send(&h.app, post_json(r#"{"owner": "blamewarrior"}"#)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        assert!(h.hooks.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_malformed_json() {
        let h = harness(false);

        let (status, body) = send(&h.app, post_json("{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_create_duplicate_is_internal_error() {
        let h = harness(false);
        seed(&h.store, "blamewarrior", "test_repo", false).await;

        let (status, _) = send(
            &h.app,
            post_json(r#"{"owner": "blamewarrior", "name": "test_repo"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(h.hooks.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_by_owner() {
        let h = harness(false);
        seed(&h.store, "blamewarrior", "repo1", false).await;
        seed(&h.store, "someone", "other", false).await;
        seed(&h.store, "blamewarrior", "repo2", true).await;

        let (status, body) = send(&h.app, get("/repositories/blamewarrior")).await;
        assert_eq!(status, StatusCode::OK);

        let names: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["full_name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["blamewarrior/repo1", "blamewarrior/repo2"]);

        let (status, body) = send(&h.app, get("/repositories/nobody")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_get_unknown_and_malformed() {
        let h = harness(false);

        let (status, _) = send(&h.app, get("/repositories/blamewarrior/missing")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&h.app, get("/repositories/blamewarrior/a%2Fb")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "incorrect full name");
    }

    #[tokio::test]
    async fn test_delete() {
        let h = harness(false);
        seed(&h.store, "blamewarrior", "test_repo", false).await;

        let (status, body) = send(&h.app, delete("/repositories/blamewarrior/test_repo")).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);
        assert_eq!(
            *h.hooks.calls.lock().unwrap(),
            vec!["delete blamewarrior/test_repo"]
        );

        let (status, _) = send(&h.app, get("/repositories/blamewarrior/test_repo")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_with_failing_hook_keeps_row() {
        let h = harness(true);
        seed(&h.store, "blamewarrior", "test_repo", false).await;

        let (status, _) = send(&h.app, delete("/repositories/blamewarrior/test_repo")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let (status, _) = send(&h.app, get("/repositories/blamewarrior/test_repo")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_list_github_repositories() {
        let h = harness(false);

        let (status, body) = send(&h.app, get("/repositories/user1/github")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([
                {"full_name": "user1/repo1", "owner": "user1", "name": "repo1", "private": false},
                {"full_name": "user1/repo2", "owner": "user1", "name": "repo2", "private": true}
            ])
        );

        let (status, _) = send(&h.app, get("/repositories/ghost/github")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&h.app, get("/repositories/limited/github")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_health() {
        let h = harness(false);

        let (status, body) = send(&h.app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");

        let (status, body) = send(&h.app, get("/health/ready")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ready");
    }
}
