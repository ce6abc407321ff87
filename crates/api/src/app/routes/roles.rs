use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use consultdesk_core::RoleId;
use consultdesk_staff::{capabilities, StaffDirectory};

use crate::app::dto;
use crate::app::errors;
use crate::app::routes::common::{parse_id, respond};
use crate::authz;
use crate::context::{PrincipalContext, TenantContext};

pub fn router() -> Router {
    Router::new()
        .route("/", post(add_role).get(list_roles))
        .route("/:id", get(get_role).patch(update_role).delete(delete_role))
}

pub async fn add_role(
    Extension(directory): Extension<Arc<StaffDirectory>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateRoleRequest>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&directory, &tenant, &principal, &capabilities::MANAGE_ROLES) {
        return resp;
    }
    let input = match body.into_domain() {
        Ok(input) => input,
        Err(e) => return errors::domain_error_to_response(e),
    };
    respond(
        StatusCode::CREATED,
        directory.add_role(tenant.tenant_id(), input, &principal.actor()),
    )
}

/// GET /admin/roles - roles with their live `employee_count`.
pub async fn list_roles(
    Extension(directory): Extension<Arc<StaffDirectory>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&directory, &tenant, &principal, &capabilities::MANAGE_ROLES) {
        return resp;
    }
    respond(
        StatusCode::OK,
        directory
            .list_roles(tenant.tenant_id())
            .map(|items| json!({ "items": items })),
    )
}

pub async fn get_role(
    Extension(directory): Extension<Arc<StaffDirectory>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&directory, &tenant, &principal, &capabilities::MANAGE_ROLES) {
        return resp;
    }
    let id: RoleId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    respond(StatusCode::OK, directory.get_role(tenant.tenant_id(), id))
}

pub async fn update_role(
    Extension(directory): Extension<Arc<StaffDirectory>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateRoleRequest>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&directory, &tenant, &principal, &capabilities::MANAGE_ROLES) {
        return resp;
    }
    let id: RoleId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let changes = match body.into_domain() {
        Ok(changes) => changes,
        Err(e) => return errors::domain_error_to_response(e),
    };
    respond(
        StatusCode::OK,
        directory.update_role(tenant.tenant_id(), id, changes, &principal.actor()),
    )
}

/// DELETE /admin/roles/:id - holders lose the role but keep their direct
/// permissions.
pub async fn delete_role(
    Extension(directory): Extension<Arc<StaffDirectory>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&directory, &tenant, &principal, &capabilities::MANAGE_ROLES) {
        return resp;
    }
    let id: RoleId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    respond(
        StatusCode::OK,
        directory.delete_role(tenant.tenant_id(), id, &principal.actor()),
    )
}
