//! Request-level authorization.
//!
//! A token whose subject is an employee of the tenant is authorized from that
//! employee's effective permissions, the same role and direct grants the
//! grant relation reports. A deactivated employee holds nothing, whatever
//! roles the token carries; for an active employee the token role `admin`
//! adds the wildcard.
//!
//! Tokens for any other subject (operators, service accounts) resolve their
//! roles against the tenant's role catalog: `admin` grants the wildcard, any
//! other role name grants the permissions of the catalog role with that name
//! (case-insensitive). Unknown role names grant nothing.

use std::collections::BTreeSet;

use consultdesk_auth::{
    authorize, explain_authorization, AuthorizationExplanation, Permission, Principal, PrincipalId,
    Role, TenantMembership,
};
use consultdesk_core::{DomainResult, EmployeeId, TenantId};
use consultdesk_staff::{Employee, StaffDirectory};

use crate::app::errors;
use crate::context::{PrincipalContext, TenantContext};

/// Build the authorization principal for the current request.
pub fn resolve_principal(
    directory: &StaffDirectory,
    tenant: &TenantContext,
    principal: &PrincipalContext,
) -> Principal {
    let tenant_id = tenant.tenant_id();
    let employee_id = EmployeeId::from_uuid(*principal.principal_id().as_uuid());
    let permissions = match directory.get_employee(tenant_id, employee_id) {
        Ok(employee) => employee_token_permissions(directory, tenant_id, &employee, principal.roles()),
        Err(_) => permissions_from_roles(directory, tenant, principal.roles()),
    };

    Principal {
        principal_id: principal.principal_id(),
        active_tenant_id: tenant_id,
        membership: TenantMembership {
            tenant_id,
            roles: principal.roles().to_vec(),
            permissions,
        },
    }
}

/// The principal an employee record stands for: its effective permissions and
/// nothing else. The employee's role is already folded into that set.
pub fn employee_subject(
    directory: &StaffDirectory,
    tenant_id: TenantId,
    employee: &Employee,
) -> DomainResult<Principal> {
    let effective = directory.effective_permissions(tenant_id, employee.id)?;
    Ok(Principal {
        principal_id: PrincipalId::from_uuid(*employee.id.as_uuid()),
        active_tenant_id: tenant_id,
        membership: TenantMembership {
            tenant_id,
            roles: Vec::new(),
            permissions: effective.into_iter().collect(),
        },
    })
}

/// Check `required` for the current request; the error is a ready 403.
pub fn require(
    directory: &StaffDirectory,
    tenant: &TenantContext,
    principal: &PrincipalContext,
    required: &Permission,
) -> Result<(), axum::response::Response> {
    let resolved = resolve_principal(directory, tenant, principal);
    authorize(&resolved, required).map_err(|e| {
        tracing::warn!(
            tenant_id = %tenant.tenant_id(),
            principal_id = %principal.principal_id(),
            permission = %required,
            "request denied"
        );
        errors::authz_error_to_response(e)
    })
}

/// Explain a decision for an already resolved principal. Role names in the
/// membership are reported as-is; they are not resolved a second time.
pub fn explain(principal: &Principal, required: &Permission) -> AuthorizationExplanation {
    explain_authorization(principal, required, |_| Vec::new())
}

fn employee_token_permissions(
    directory: &StaffDirectory,
    tenant_id: TenantId,
    employee: &Employee,
    roles: &[Role],
) -> Vec<Permission> {
    if !employee.is_active {
        return Vec::new();
    }
    let mut granted = match directory.effective_permissions(tenant_id, employee.id) {
        Ok(granted) => granted,
        Err(e) => {
            tracing::warn!(%tenant_id, employee_id = %employee.id, error = %e, "effective permissions unavailable");
            BTreeSet::new()
        }
    };
    if roles.iter().any(Role::is_admin) {
        granted.insert(Permission::wildcard());
    }
    granted.into_iter().collect()
}

fn permissions_from_roles(
    directory: &StaffDirectory,
    tenant: &TenantContext,
    roles: &[Role],
) -> Vec<Permission> {
    let mut granted = BTreeSet::new();
    for role in roles {
        if role.is_admin() {
            granted.insert(Permission::wildcard());
        } else {
            granted.extend(directory.role_permissions_by_name(tenant.tenant_id(), role.as_str()));
        }
    }
    granted.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use consultdesk_staff::{capabilities, Department, NewEmployee, NewRole, RoleDefinition};

    use super::*;

    fn setup() -> (StaffDirectory, TenantContext) {
        let dir = StaffDirectory::in_memory();
        let tenant = TenantId::new();
        dir.seed_defaults(tenant, "test").unwrap();
        (dir, TenantContext::new(tenant))
    }

    fn principal(roles: &[&'static str]) -> PrincipalContext {
        PrincipalContext::new(PrincipalId::new(), roles.iter().map(|r| Role::new(*r)).collect())
    }

    fn employee(
        dir: &StaffDirectory,
        tenant: &TenantContext,
        role: Option<&RoleDefinition>,
        permissions: &[&'static str],
    ) -> Employee {
        let input = NewEmployee {
            name: "Sita".into(),
            email: "sita@example.com".into(),
            phone: "+977 9800000000".into(),
            department: Department::Loans,
            designation: "Officer".into(),
            role_id: role.map(|r| r.id),
            permissions: permissions.iter().map(|p| Permission::from_static(*p)).collect(),
            joining_date: None,
        };
        dir.add_employee(tenant.tenant_id(), input, "test").unwrap()
    }

    fn token_for(employee: &Employee, roles: &[&'static str]) -> PrincipalContext {
        PrincipalContext::new(
            PrincipalId::from_uuid(*employee.id.as_uuid()),
            roles.iter().map(|r| Role::new(*r)).collect(),
        )
    }

    #[test]
    fn admin_token_role_grants_everything() {
        let (dir, tenant) = setup();
        let admin = principal(&["admin"]);
        assert!(require(&dir, &tenant, &admin, &capabilities::MANAGE_ROLES).is_ok());
        assert!(require(&dir, &tenant, &admin, &Permission::from_static("anything")).is_ok());
    }

    #[test]
    fn catalog_role_names_resolve_case_insensitively() {
        let (dir, tenant) = setup();
        let officer = principal(&["loan officer"]);

        assert!(require(&dir, &tenant, &officer, &capabilities::MANAGE_LOANS).is_ok());
        let denied = require(&dir, &tenant, &officer, &capabilities::MANAGE_EMPLOYEES).unwrap_err();
        assert_eq!(denied.status(), axum::http::StatusCode::FORBIDDEN);
    }

    #[test]
    fn unknown_role_names_grant_nothing() {
        let (dir, tenant) = setup();
        let resolved = resolve_principal(&dir, &tenant, &principal(&["astronaut"]));
        assert!(resolved.membership.permissions.is_empty());
    }

    #[test]
    fn roles_in_other_tenants_do_not_apply() {
        let (dir, _) = setup();
        let other = TenantContext::new(TenantId::new());
        dir.add_role(
            other.tenant_id(),
            NewRole {
                name: "Loan Officer".into(),
                description: String::new(),
                department: Department::Loans,
                level: 2,
                permissions: BTreeSet::new(),
            },
            "test",
        )
        .unwrap();

        let officer = principal(&["Loan Officer"]);
        assert!(require(&dir, &other, &officer, &capabilities::MANAGE_LOANS).is_err());
    }

    #[test]
    fn explanation_suggests_missing_permission() {
        let (dir, tenant) = setup();
        let resolved = resolve_principal(&dir, &tenant, &principal(&["Support Agent"]));
        let explanation = explain(&resolved, &capabilities::VIEW_REPORTS);
        assert!(!explanation.granted);
        assert!(explanation.denial_reason.is_some());
    }

    #[test]
    fn employee_token_carries_direct_grants() {
        let (dir, tenant) = setup();
        let sita = employee(&dir, &tenant, None, &["manage_loans"]);
        let token = token_for(&sita, &[]);

        assert!(require(&dir, &tenant, &token, &capabilities::MANAGE_LOANS).is_ok());
        assert!(require(&dir, &tenant, &token, &capabilities::MANAGE_EMPLOYEES).is_err());
    }

    #[test]
    fn employee_token_follows_ledger_changes() {
        let (dir, tenant) = setup();
        let sita = employee(&dir, &tenant, None, &["manage_loans"]);
        let token = token_for(&sita, &[]);

        dir.set_employee_permissions(tenant.tenant_id(), sita.id, BTreeSet::new(), "test")
            .unwrap();
        assert!(require(&dir, &tenant, &token, &capabilities::MANAGE_LOANS).is_err());
    }

    #[test]
    fn deactivated_employee_token_is_denied_even_as_admin() {
        let (dir, tenant) = setup();
        let officer = dir.find_role_by_name(tenant.tenant_id(), "Loan Officer").unwrap();
        let sita = employee(&dir, &tenant, Some(&officer), &["view_reports"]);
        let token = token_for(&sita, &["admin"]);
        assert!(require(&dir, &tenant, &token, &capabilities::MANAGE_ROLES).is_ok());

        dir.toggle_employee_active(tenant.tenant_id(), sita.id, "test").unwrap();

        let resolved = resolve_principal(&dir, &tenant, &token);
        assert!(resolved.membership.permissions.is_empty());
        assert!(require(&dir, &tenant, &token, &capabilities::MANAGE_LOANS).is_err());
        assert!(require(&dir, &tenant, &token, &capabilities::MANAGE_ROLES).is_err());
    }

    #[test]
    fn deactivated_employee_is_explained_as_denied() {
        let (dir, tenant) = setup();
        let officer = dir.find_role_by_name(tenant.tenant_id(), "Loan Officer").unwrap();
        let sita = employee(&dir, &tenant, Some(&officer), &[]);
        let sita = dir.toggle_employee_active(tenant.tenant_id(), sita.id, "test").unwrap();

        let subject = employee_subject(&dir, tenant.tenant_id(), &sita).unwrap();
        let explanation = explain(&subject, &capabilities::MANAGE_LOANS);
        assert!(!explanation.granted);
        assert!(explanation.principal.effective_permissions.is_empty());
    }

    #[test]
    fn catalog_role_named_admin_is_not_the_wildcard() {
        let (dir, tenant) = setup();
        let role = dir
            .add_role(
                tenant.tenant_id(),
                NewRole {
                    name: "Admin".into(),
                    description: String::new(),
                    department: Department::Administration,
                    level: 3,
                    permissions: BTreeSet::from([capabilities::VIEW_REPORTS]),
                },
                "test",
            )
            .unwrap();
        let sita = employee(&dir, &tenant, Some(&role), &[]);

        let subject = employee_subject(&dir, tenant.tenant_id(), &sita).unwrap();
        let denied = explain(&subject, &capabilities::MANAGE_EMPLOYEES);
        assert!(!denied.granted);
        assert!(!denied.principal.has_wildcard);
        assert!(explain(&subject, &capabilities::VIEW_REPORTS).granted);

        let token = token_for(&sita, &[]);
        assert!(require(&dir, &tenant, &token, &capabilities::MANAGE_EMPLOYEES).is_err());
    }
}
