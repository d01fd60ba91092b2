//! API Routes
//!
//! Configures the Axum router with all key-value server endpoints.

use axum::{
    routing::{get, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    delete_handler, get_handler, list_all_handler, list_handler, login_handler,
    missing_key_handler, ping_handler, put_handler, shutdown_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// Collection routes answer both with and without a trailing slash.
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests and their status
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let missing_key = put(missing_key_handler)
        .get(missing_key_handler)
        .delete(missing_key_handler);

    Router::new()
        .route(
            "/store/:key",
            put(put_handler).get(get_handler).delete(delete_handler),
        )
        .route("/store/", missing_key.clone())
        .route("/store", missing_key)
        .route("/list/", get(list_all_handler))
        .route("/list", get(list_all_handler))
        .route("/list/:key", get(list_handler))
        .route("/shutdown/", get(shutdown_handler))
        .route("/shutdown", get(shutdown_handler))
        .route("/login/", get(login_handler))
        .route("/login", get(login_handler))
        .route("/ping/", get(ping_handler))
        .route("/ping", get(ping_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    use base64::{engine::general_purpose::STANDARD, Engine as _};

    use crate::auth::{Authenticator, Tokenizer};
    use crate::config::Config;
    use crate::error::{Result, StoreError};
    use crate::store::{KvStore, StoreHandle};
    use crate::tracer::{Level, NullTracer, RecordingTracer};
    use crate::users::{UserDatabase, UserStorage};

    fn create_test_app() -> Router {
        let users = Arc::new(UserStorage::new());
        create_router(AppState::from_config(&Config::default(), users))
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_ping_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(Request::builder().uri("/ping/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "pong");
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let app = create_test_app();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/store/k1")
                    .header("Authorization", "alice")
                    .body(Body::from("hello"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/store/k1")
                    .header("Authorization", "bob")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "hello");
    }

    #[tokio::test]
    async fn test_store_without_key() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/store/")
                    .header("Authorization", "alice")
                    .body(Body::from("v"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_missing_authorization() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/store/k1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_list_missing_key() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/list/nope")
                    .header("Authorization", "alice")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_without_authorization() {
        let app = create_test_app();

        for uri in ["/list/", "/list", "/list/k1"] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::FORBIDDEN, "{}", uri);
        }
    }

    struct BrokenTokenizer;

    impl Tokenizer for BrokenTokenizer {
        fn create_token(&self, _username: &str) -> Result<String> {
            Err(StoreError::TokenCreation("signing key unavailable".to_string()))
        }

        fn username_from_token(&self, _token: &str) -> Result<String> {
            Err(StoreError::AuthorizationFailed)
        }
    }

    #[tokio::test]
    async fn test_login_token_failure_is_unauthorized() {
        let users = Arc::new(UserStorage::new());
        users.add_user("alice", "alice-pw").unwrap();
        let store = KvStore::new(NullTracer::shared(), users.clone(), 0);
        let (handle, _worker) = StoreHandle::spawn(store, NullTracer::shared());
        let tracer = RecordingTracer::new();
        let state = AppState::new(
            handle,
            users,
            Authenticator::new(Arc::new(BrokenTokenizer)),
            tracer.clone(),
        );

        let response = create_router(state)
            .oneshot(
                Request::builder()
                    .uri("/login/")
                    .header(
                        "Authorization",
                        format!("Basic {}", STANDARD.encode("alice:alice-pw")),
                    )
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(tracer.contains(Level::Error, "could not issue a token"));
    }
}
