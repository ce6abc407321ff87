use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use consultdesk_core::EmployeeId;
use consultdesk_staff::{capabilities, StaffDirectory};

use crate::app::dto;
use crate::app::errors;
use crate::app::routes::common::{parse_id, respond};
use crate::authz;
use crate::context::{PrincipalContext, TenantContext};

pub fn router() -> Router {
    Router::new()
        .route("/", post(add_employee).get(list_employees))
        .route("/:id", get(get_employee).patch(update_employee).delete(delete_employee))
        .route("/:id/toggle-active", post(toggle_active))
        .route("/:id/permissions", axum::routing::put(set_permissions))
        .route("/:id/grants", get(employee_grants))
}

pub async fn add_employee(
    Extension(directory): Extension<Arc<StaffDirectory>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateEmployeeRequest>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&directory, &tenant, &principal, &capabilities::MANAGE_EMPLOYEES) {
        return resp;
    }
    let input = match body.into_domain() {
        Ok(input) => input,
        Err(e) => return errors::domain_error_to_response(e),
    };
    respond(
        StatusCode::CREATED,
        directory.add_employee(tenant.tenant_id(), input, &principal.actor()),
    )
}

pub async fn list_employees(
    Extension(directory): Extension<Arc<StaffDirectory>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<dto::ListEmployeesQuery>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&directory, &tenant, &principal, &capabilities::MANAGE_EMPLOYEES) {
        return resp;
    }
    let query = match query.into_domain() {
        Ok(query) => query,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let items = directory.list_employees(tenant.tenant_id(), &query);
    respond(StatusCode::OK, Ok(json!({ "items": items })))
}

pub async fn get_employee(
    Extension(directory): Extension<Arc<StaffDirectory>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&directory, &tenant, &principal, &capabilities::MANAGE_EMPLOYEES) {
        return resp;
    }
    let id: EmployeeId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    respond(StatusCode::OK, directory.get_employee(tenant.tenant_id(), id))
}

pub async fn update_employee(
    Extension(directory): Extension<Arc<StaffDirectory>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateEmployeeRequest>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&directory, &tenant, &principal, &capabilities::MANAGE_EMPLOYEES) {
        return resp;
    }
    let id: EmployeeId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let changes = match body.into_domain() {
        Ok(changes) => changes,
        Err(e) => return errors::domain_error_to_response(e),
    };
    respond(
        StatusCode::OK,
        directory.update_employee(tenant.tenant_id(), id, changes, &principal.actor()),
    )
}

pub async fn delete_employee(
    Extension(directory): Extension<Arc<StaffDirectory>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&directory, &tenant, &principal, &capabilities::MANAGE_EMPLOYEES) {
        return resp;
    }
    let id: EmployeeId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    respond(
        StatusCode::OK,
        directory.delete_employee(tenant.tenant_id(), id, &principal.actor()),
    )
}

pub async fn toggle_active(
    Extension(directory): Extension<Arc<StaffDirectory>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&directory, &tenant, &principal, &capabilities::MANAGE_EMPLOYEES) {
        return resp;
    }
    let id: EmployeeId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    respond(
        StatusCode::OK,
        directory.toggle_employee_active(tenant.tenant_id(), id, &principal.actor()),
    )
}

/// PUT /admin/employees/:id/permissions - replace the direct permission set
/// (the checkbox grid). Also rewrites the employee's assignment record.
pub async fn set_permissions(
    Extension(directory): Extension<Arc<StaffDirectory>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::PermissionSetRequest>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&directory, &tenant, &principal, &capabilities::MANAGE_EMPLOYEES) {
        return resp;
    }
    let id: EmployeeId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let permissions = match body.into_domain() {
        Ok(permissions) => permissions,
        Err(e) => return errors::domain_error_to_response(e),
    };
    respond(
        StatusCode::OK,
        directory.set_employee_permissions(tenant.tenant_id(), id, permissions, &principal.actor()),
    )
}

/// GET /admin/employees/:id/grants - every grant with its source, plus the
/// collapsed effective set.
pub async fn employee_grants(
    Extension(directory): Extension<Arc<StaffDirectory>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&directory, &tenant, &principal, &capabilities::MANAGE_EMPLOYEES) {
        return resp;
    }
    let id: EmployeeId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let result = directory.employee_grants(tenant.tenant_id(), id).map(|grants| {
        let effective = consultdesk_staff::grants::effective_permissions(&grants);
        json!({ "grants": grants, "effective_permissions": effective })
    });
    respond(StatusCode::OK, result)
}
