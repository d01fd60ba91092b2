//! API Handlers
//!
//! HTTP request handlers for each key-value server endpoint.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Path, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    Json,
};

use crate::auth::{Authenticator, BasicCredentials, JwtTokenizer, BEARER_PREFIX};
use crate::config::Config;
use crate::error::{Result, StoreError};
use crate::models::EntryResponse;
use crate::store::{KvStore, StoreHandle};
use crate::tracer::{SharedTracer, TracingTracer};
use crate::users::UserDatabase;

/// Application state shared across all handlers.
///
/// The store itself lives in its worker task; handlers only hold a
/// [`StoreHandle`] to talk to it.
#[derive(Clone)]
pub struct AppState {
    /// Handle to the store worker
    pub store: StoreHandle,
    /// Registered users, consulted for login and the admin check
    pub users: Arc<dyn UserDatabase>,
    /// Resolves the caller's identity from the Authorization header
    pub authenticator: Authenticator,
    /// Tracer for the HTTP layer
    pub tracer: SharedTracer,
}

impl AppState {
    /// Creates a new AppState from its parts.
    pub fn new(
        store: StoreHandle,
        users: Arc<dyn UserDatabase>,
        authenticator: Authenticator,
        tracer: SharedTracer,
    ) -> Self {
        Self {
            store,
            users,
            authenticator,
            tracer,
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Spawns the store worker on the current runtime, so this must be
    /// called from within tokio.
    pub fn from_config(config: &Config, users: Arc<dyn UserDatabase>) -> Self {
        let store = KvStore::new(TracingTracer::shared("store"), users.clone(), config.lru_depth);
        let (handle, _worker) = StoreHandle::spawn_with_grace(
            store,
            TracingTracer::shared("store"),
            config.shutdown_grace(),
        );
        let tokenizer = JwtTokenizer::new(
            config.jwt_secret.clone(),
            config.token_expiration_minutes,
            TracingTracer::shared("auth"),
        );

        Self::new(
            handle,
            users,
            Authenticator::new(Arc::new(tokenizer)),
            TracingTracer::shared("http"),
        )
    }
}

// == Caller Extractor ==
/// The identity a request acts as, taken from its Authorization header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller(pub String);

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = StoreError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        state.authenticator.username(header).map(Caller)
    }
}

/// Handler for PUT /store/:key
///
/// Stores the request body under `key`, creating it for the caller or
/// updating it if the caller owns it (or is the administrator).
pub async fn put_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Caller(user): Caller,
    body: String,
) -> Result<&'static str> {
    if body.is_empty() {
        return Err(StoreError::ValueNotSpecified);
    }
    state.store.put(&key, &body, &user).await?;
    Ok("Ok")
}

/// Handler for GET /store/:key
///
/// Returns the stored value as plain text.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Caller(_user): Caller,
) -> Result<String> {
    state.store.get(&key).await
}

/// Handler for DELETE /store/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Caller(user): Caller,
) -> Result<&'static str> {
    state.store.delete(&key, &user).await?;
    Ok("Ok")
}

/// Handler for /store/ without a key.
pub async fn missing_key_handler() -> StoreError {
    StoreError::KeyNotSpecified
}

/// Handler for GET /list/
///
/// Lists every key, least recently touched first.
pub async fn list_all_handler(
    State(state): State<AppState>,
    Caller(_user): Caller,
) -> Result<Json<Vec<EntryResponse>>> {
    let entries = state.store.list_all().await?;
    Ok(Json(entries.iter().map(EntryResponse::from).collect()))
}

/// Handler for GET /list/:key
///
/// Inspects one key without counting a read.
pub async fn list_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Caller(_user): Caller,
) -> Result<Json<EntryResponse>> {
    let entry = state.store.list(&key).await?;
    Ok(Json(EntryResponse::from(entry)))
}

/// Handler for GET /shutdown/
///
/// Only the administrator may stop the store. The response is sent right
/// away; the server closes once the store's grace period has passed.
pub async fn shutdown_handler(
    State(state): State<AppState>,
    Caller(user): Caller,
) -> Result<&'static str> {
    if !state.users.is_admin(&user) {
        state
            .tracer
            .log_warning(&format!("User {} may not shut the store down", user));
        return Err(StoreError::UnauthorizedOwner(user));
    }

    state
        .tracer
        .log_info(&format!("Shutdown requested by {}", user));
    state.store.shutdown().await;
    Ok("Ok")
}

/// Handler for GET /login/
///
/// Exchanges Basic credentials for a bearer token, returned as
/// `Bearer <token>`.
pub async fn login_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<String> {
    let header = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    let credentials = BasicCredentials::parse(header)?;

    if let Err(e) = state
        .users
        .authenticate(&credentials.username, &credentials.password)
    {
        state
            .tracer
            .log_error(&format!("Login failed for {}: {}", credentials.username, e));
        return Err(StoreError::AuthorizationFailed);
    }

    let token = state
        .authenticator
        .tokenizer()
        .create_token(&credentials.username)
        .map_err(|e| {
            state.tracer.log_error(&format!(
                "Login for {} could not issue a token: {}",
                credentials.username, e
            ));
            StoreError::AuthorizationFailed
        })?;
    state
        .tracer
        .log_info(&format!("User {} logged in", credentials.username));
    Ok(format!("{}{}", BEARER_PREFIX, token))
}

/// Handler for GET /ping/
///
/// Liveness probe; does not touch the store.
pub async fn ping_handler() -> &'static str {
    "pong"
}
