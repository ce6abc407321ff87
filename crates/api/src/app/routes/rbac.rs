//! RBAC audit endpoints.
//!
//! Visibility into where access comes from: the grant relation, direct
//! grants that fall outside an employee's role, and explanations of
//! individual decisions.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    routing::get,
    Router,
};
use serde_json::json;

use consultdesk_auth::Permission;
use consultdesk_core::EmployeeId;
use consultdesk_staff::{capabilities, StaffDirectory};

use crate::app::dto::ExplainQuery;
use crate::app::errors;
use crate::app::routes::common::{parse_id, respond};
use crate::authz;
use crate::context::{PrincipalContext, TenantContext};

pub fn router() -> Router {
    Router::new()
        .route("/grants", get(grant_relation))
        .route("/coverage", get(coverage))
        .route("/explain", get(explain_own_access))
        .route("/explain/:employee_id", get(explain_employee_access))
}

/// GET /admin/rbac/grants - the tenant's full grant relation.
pub async fn grant_relation(
    Extension(directory): Extension<Arc<StaffDirectory>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&directory, &tenant, &principal, &capabilities::VIEW_REPORTS) {
        return resp;
    }
    respond(
        StatusCode::OK,
        directory
            .grant_relation(tenant.tenant_id())
            .map(|items| json!({ "items": items })),
    )
}

/// GET /admin/rbac/coverage - direct grants not covered by the holder's role.
pub async fn coverage(
    Extension(directory): Extension<Arc<StaffDirectory>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&directory, &tenant, &principal, &capabilities::VIEW_REPORTS) {
        return resp;
    }
    respond(StatusCode::OK, directory.coverage_report(tenant.tenant_id()))
}

/// GET /admin/rbac/explain?permission=X - why the caller can or cannot use X.
/// Open to any authenticated user.
pub async fn explain_own_access(
    Extension(directory): Extension<Arc<StaffDirectory>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<ExplainQuery>,
) -> axum::response::Response {
    let required = match Permission::parse(&query.permission) {
        Ok(p) => p,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let resolved = authz::resolve_principal(&directory, &tenant, &principal);
    let explanation = authz::explain(&resolved, &required);
    respond(StatusCode::OK, Ok(json!({ "explanation": explanation })))
}

/// GET /admin/rbac/explain/:employee_id?permission=X - the same question for
/// an employee record, answered from their effective permissions. The role
/// name is reported beside the explanation, not resolved again.
pub async fn explain_employee_access(
    Extension(directory): Extension<Arc<StaffDirectory>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(employee_id): Path<String>,
    Query(query): Query<ExplainQuery>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&directory, &tenant, &principal, &capabilities::VIEW_REPORTS) {
        return resp;
    }
    let employee_id: EmployeeId = match parse_id(&employee_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let required = match Permission::parse(&query.permission) {
        Ok(p) => p,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let tenant_id = tenant.tenant_id();
    let employee = match directory.get_employee(tenant_id, employee_id) {
        Ok(e) => e,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let subject = match authz::employee_subject(&directory, tenant_id, &employee) {
        Ok(subject) => subject,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let role = employee
        .role_id
        .and_then(|id| directory.get_role(tenant_id, id).ok())
        .map(|summary| summary.role.name);
    let explanation = authz::explain(&subject, &required);

    respond(
        StatusCode::OK,
        Ok(json!({
            "employee_id": employee.id,
            "employee_email": employee.email,
            "is_active": employee.is_active,
            "role": role,
            "explanation": explanation,
        })),
    )
}
