use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use consultdesk_auth::Permission;
use consultdesk_core::{AssignmentId, EmployeeId};
use consultdesk_staff::{capabilities, AssignmentExport, StaffDirectory};

use crate::app::dto;
use crate::app::errors;
use crate::app::routes::common::{parse_id, respond};
use crate::authz;
use crate::context::{PrincipalContext, TenantContext};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_assignment).get(list_assignments))
        .route("/export", get(export_assignments))
        .route("/import", post(import_assignments))
        .route(
            "/:id",
            get(get_assignment).put(update_assignment).delete(delete_assignment),
        )
        .route("/:id/toggle", post(toggle_permission))
}

pub async fn create_assignment(
    Extension(directory): Extension<Arc<StaffDirectory>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateAssignmentRequest>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&directory, &tenant, &principal, &capabilities::MANAGE_PERMISSIONS) {
        return resp;
    }
    let employee_id: EmployeeId = match parse_id(&body.employee_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let permissions = match dto::parse_permissions(&body.permissions) {
        Ok(permissions) => permissions,
        Err(e) => return errors::domain_error_to_response(e),
    };
    respond(
        StatusCode::CREATED,
        directory.create_assignment(tenant.tenant_id(), employee_id, permissions, &principal.actor()),
    )
}

pub async fn list_assignments(
    Extension(directory): Extension<Arc<StaffDirectory>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&directory, &tenant, &principal, &capabilities::MANAGE_PERMISSIONS) {
        return resp;
    }
    let items = directory.list_assignments(tenant.tenant_id());
    respond(StatusCode::OK, Ok(json!({ "items": items })))
}

pub async fn get_assignment(
    Extension(directory): Extension<Arc<StaffDirectory>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&directory, &tenant, &principal, &capabilities::MANAGE_PERMISSIONS) {
        return resp;
    }
    let id: AssignmentId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    respond(StatusCode::OK, directory.get_assignment(tenant.tenant_id(), id))
}

pub async fn update_assignment(
    Extension(directory): Extension<Arc<StaffDirectory>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::PermissionSetRequest>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&directory, &tenant, &principal, &capabilities::MANAGE_PERMISSIONS) {
        return resp;
    }
    let id: AssignmentId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let permissions = match body.into_domain() {
        Ok(permissions) => permissions,
        Err(e) => return errors::domain_error_to_response(e),
    };
    respond(
        StatusCode::OK,
        directory.update_assignment(tenant.tenant_id(), id, permissions, &principal.actor()),
    )
}

/// POST /admin/assignments/:id/toggle - flip one checkbox of the record.
pub async fn toggle_permission(
    Extension(directory): Extension<Arc<StaffDirectory>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::ToggleAssignmentRequest>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&directory, &tenant, &principal, &capabilities::MANAGE_PERMISSIONS) {
        return resp;
    }
    let id: AssignmentId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let permission = match Permission::parse(&body.permission) {
        Ok(p) => p,
        Err(e) => return errors::domain_error_to_response(e),
    };
    respond(
        StatusCode::OK,
        directory.toggle_assignment_permission(tenant.tenant_id(), id, &permission, &principal.actor()),
    )
}

pub async fn delete_assignment(
    Extension(directory): Extension<Arc<StaffDirectory>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&directory, &tenant, &principal, &capabilities::MANAGE_PERMISSIONS) {
        return resp;
    }
    let id: AssignmentId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    respond(
        StatusCode::OK,
        directory.delete_assignment(tenant.tenant_id(), id, &principal.actor()),
    )
}

pub async fn export_assignments(
    Extension(directory): Extension<Arc<StaffDirectory>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&directory, &tenant, &principal, &capabilities::MANAGE_PERMISSIONS) {
        return resp;
    }
    respond(StatusCode::OK, directory.export_assignments(tenant.tenant_id()))
}

/// POST /admin/assignments/import - body is a document produced by
/// `GET /admin/assignments/export`. Nothing is applied unless every record
/// is valid.
pub async fn import_assignments(
    Extension(directory): Extension<Arc<StaffDirectory>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<AssignmentExport>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&directory, &tenant, &principal, &capabilities::MANAGE_PERMISSIONS) {
        return resp;
    }
    respond(
        StatusCode::OK,
        directory.import_assignments(tenant.tenant_id(), body, &principal.actor()),
    )
}
