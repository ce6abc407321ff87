use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, routing::post, Router};

use consultdesk_staff::{capabilities, StaffDirectory};

use crate::app::routes::common::respond;
use crate::authz;
use crate::context::{PrincipalContext, TenantContext};

pub fn router() -> Router {
    Router::new().route("/seed", post(seed_defaults))
}

/// POST /admin/catalog/seed - install the default permissions and roles.
/// Existing entries are kept; repeating the call adds nothing.
pub async fn seed_defaults(
    Extension(directory): Extension<Arc<StaffDirectory>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&directory, &tenant, &principal, &capabilities::MANAGE_PERMISSIONS) {
        return resp;
    }
    respond(
        StatusCode::OK,
        directory.seed_defaults(tenant.tenant_id(), &principal.actor()),
    )
}
