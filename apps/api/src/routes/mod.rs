pub mod health;

use axum::{routing::get, Router};

use crate::api_keys::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // API key vault
        .route(
            "/api/v1/api-key",
            get(handlers::handle_get_api_key)
                .put(handlers::handle_save_api_key)
                .delete(handlers::handle_delete_api_key),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::api_keys::store::memory::InMemoryApiKeyStore;
    use crate::vault::VaultCodec;

    fn test_app() -> (Router, Arc<InMemoryApiKeyStore>) {
        let store = Arc::new(InMemoryApiKeyStore::default());
        let state = AppState {
            api_keys: store.clone(),
            vault: VaultCodec::with_cheap_kdf("router-test-secret"),
        };
        (build_router(state), store)
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn put_key(user_id: Uuid, api_key: &str, key_type: &str) -> Request<Body> {
        Request::builder()
            .method("PUT")
            .uri("/api/v1/api-key")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({ "user_id": user_id, "api_key": api_key, "key_type": key_type })
                    .to_string(),
            ))
            .unwrap()
    }

    fn with_user(method: &str, user_id: Uuid) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(format!("/api/v1/api-key?user_id={user_id}"))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_suite() {
        let (app, _) = test_app();
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["vault"]["cipher"], "aes-256-gcm");
    }

    #[tokio::test]
    async fn test_save_get_delete_flow() {
        let (app, _) = test_app();
        let user = Uuid::new_v4();

        let (status, body) = send(&app, put_key(user, "sk-test1234567890", "openai")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let (status, body) = send(&app, with_user("GET", user)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["has_key"], true);
        assert_eq!(body["key_type"], "openai");
        assert_eq!(body["masked_key"], "sk-t...7890");
        assert!(!body.to_string().contains("sk-test1234567890"));

        let (status, body) = send(&app, with_user("DELETE", user)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["deleted"], true);

        let (_, body) = send(&app, with_user("GET", user)).await;
        assert_eq!(body["has_key"], false);
        assert_eq!(body["masked_key"], Value::Null);
    }

    #[tokio::test]
    async fn test_blank_key_is_bad_request() {
        let (app, _) = test_app();
        let (status, body) = send(&app, put_key(Uuid::new_v4(), "", "anthropic")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_unreadable_envelopes_get_identical_responses() {
        let (app, store) = test_app();

        let truncated_user = Uuid::new_v4();
        store.put_raw(truncated_user, "c2hvcnQ=").await;

        let foreign_user = Uuid::new_v4();
        let foreign = VaultCodec::with_cheap_kdf("some-other-deployment")
            .encrypt("sk-test1234567890")
            .unwrap();
        store.put_raw(foreign_user, &foreign).await;

        let (truncated_status, truncated_body) = send(&app, with_user("GET", truncated_user)).await;
        let (foreign_status, foreign_body) = send(&app, with_user("GET", foreign_user)).await;

        assert_eq!(truncated_status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(truncated_status, foreign_status);
        assert_eq!(truncated_body, foreign_body);
        assert_eq!(
            truncated_body["error"]["message"],
            "Cannot process this stored value"
        );
    }
}
