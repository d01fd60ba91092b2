//! API Module
//!
//! HTTP handlers and routing for the key-value server.
//!
//! # Endpoints
//! - `PUT /store/:key` - Create or update a key; the body is the value
//! - `GET /store/:key` - Read a value
//! - `DELETE /store/:key` - Delete a key
//! - `GET /list/` - Metadata of every key, least recently touched first
//! - `GET /list/:key` - Metadata of one key
//! - `GET /shutdown/` - Stop the store (administrator only)
//! - `GET /login/` - Exchange Basic credentials for a bearer token
//! - `GET /ping/` - Liveness probe
//!
//! `/store` and `/shutdown` require an `Authorization` header: either
//! `Bearer <token>` or a bare username.

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
