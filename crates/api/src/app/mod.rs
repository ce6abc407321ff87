//! HTTP API application wiring (Axum router + shared state).
//!
//! - `routes/`: HTTP routes + handlers (one file per directory area)
//! - `dto.rs`: request DTOs and their mapping onto directory inputs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use consultdesk_staff::StaffDirectory;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;

/// Build the full HTTP router over a fresh, empty directory.
pub fn build_app(jwt_secret: String) -> Router {
    build_app_with_directory(jwt_secret, Arc::new(StaffDirectory::in_memory()))
}

/// Build the router over an existing directory (e.g. one seeded at startup).
pub fn build_app_with_directory(jwt_secret: String, directory: Arc<StaffDirectory>) -> Router {
    let jwt = Arc::new(consultdesk_auth::Hs256JwtValidator::new(jwt_secret.into_bytes()));
    let auth_state = middleware::AuthState { jwt };

    // Protected routes: require auth + tenant context.
    let protected = routes::router()
        .layer(Extension(directory))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
        .layer(ServiceBuilder::new().layer(axum::middleware::from_fn(middleware::log_request)))
}
