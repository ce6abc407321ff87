use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use consultdesk_auth::Permission;
use consultdesk_staff::{capabilities, StaffDirectory};

use crate::app::dto;
use crate::app::errors;
use crate::app::routes::common::respond;
use crate::authz;
use crate::context::{PrincipalContext, TenantContext};

pub fn router() -> Router {
    Router::new()
        .route("/", post(add_permission).get(list_permissions))
        .route(
            "/:permission",
            get(get_permission).patch(update_permission).delete(delete_permission),
        )
        .route("/:permission/toggle-active", post(toggle_active))
}

fn parse_permission(raw: &str) -> Result<Permission, axum::response::Response> {
    Permission::parse(raw).map_err(errors::domain_error_to_response)
}

pub async fn add_permission(
    Extension(directory): Extension<Arc<StaffDirectory>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreatePermissionRequest>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&directory, &tenant, &principal, &capabilities::MANAGE_PERMISSIONS) {
        return resp;
    }
    let input = match body.into_domain() {
        Ok(input) => input,
        Err(e) => return errors::domain_error_to_response(e),
    };
    respond(
        StatusCode::CREATED,
        directory.add_permission(tenant.tenant_id(), input, &principal.actor()),
    )
}

/// GET /admin/permissions - catalog entries with their live `employees`
/// count.
pub async fn list_permissions(
    Extension(directory): Extension<Arc<StaffDirectory>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&directory, &tenant, &principal, &capabilities::MANAGE_PERMISSIONS) {
        return resp;
    }
    respond(
        StatusCode::OK,
        directory
            .list_permissions(tenant.tenant_id())
            .map(|items| json!({ "items": items })),
    )
}

pub async fn get_permission(
    Extension(directory): Extension<Arc<StaffDirectory>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(raw): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&directory, &tenant, &principal, &capabilities::MANAGE_PERMISSIONS) {
        return resp;
    }
    let permission = match parse_permission(&raw) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    respond(StatusCode::OK, directory.get_permission(tenant.tenant_id(), &permission))
}

pub async fn update_permission(
    Extension(directory): Extension<Arc<StaffDirectory>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(raw): Path<String>,
    Json(body): Json<dto::UpdatePermissionRequest>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&directory, &tenant, &principal, &capabilities::MANAGE_PERMISSIONS) {
        return resp;
    }
    let permission = match parse_permission(&raw) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    let changes = match body.into_domain() {
        Ok(changes) => changes,
        Err(e) => return errors::domain_error_to_response(e),
    };
    respond(
        StatusCode::OK,
        directory.update_permission(tenant.tenant_id(), &permission, changes, &principal.actor()),
    )
}

pub async fn toggle_active(
    Extension(directory): Extension<Arc<StaffDirectory>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(raw): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&directory, &tenant, &principal, &capabilities::MANAGE_PERMISSIONS) {
        return resp;
    }
    let permission = match parse_permission(&raw) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    respond(
        StatusCode::OK,
        directory.toggle_permission_active(tenant.tenant_id(), &permission, &principal.actor()),
    )
}

/// DELETE /admin/permissions/:permission - also strips the identifier from
/// every role, employee and assignment.
pub async fn delete_permission(
    Extension(directory): Extension<Arc<StaffDirectory>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(raw): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&directory, &tenant, &principal, &capabilities::MANAGE_PERMISSIONS) {
        return resp;
    }
    let permission = match parse_permission(&raw) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    respond(
        StatusCode::OK,
        directory.delete_permission(tenant.tenant_id(), &permission, &principal.actor()),
    )
}
