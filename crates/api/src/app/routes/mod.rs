use axum::{routing::get, Router};

pub mod assignments;
pub mod catalog;
pub mod common;
pub mod employees;
pub mod permissions;
pub mod rbac;
pub mod roles;
pub mod system;

/// Router for all authenticated (tenant-scoped) endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/admin/employees", employees::router())
        .nest("/admin/roles", roles::router())
        .nest("/admin/permissions", permissions::router())
        .nest("/admin/assignments", assignments::router())
        .nest("/admin/rbac", rbac::router())
        .nest("/admin/catalog", catalog::router())
}
