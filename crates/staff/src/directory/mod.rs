//! The staff directory: one owner for employees, roles, the permission
//! catalog and the assignment ledger of every tenant.
//!
//! Mutations that touch more than one collection run under a directory-wide
//! write gate, so readers never observe an employee and its assignment (or a
//! role and its holders) disagreeing.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use consultdesk_auth::Permission;
use consultdesk_core::{AssignmentId, DomainError, DomainResult, EmployeeId, RoleId, TenantId};

use crate::assignment::Assignment;
use crate::catalog::{ensure_catalogable, PermissionDefinition};
use crate::employee::Employee;
use crate::grants::{self, Grant};
use crate::role::RoleDefinition;
use crate::store::{InMemoryTenantStore, TenantStore};

mod assignments;
mod employees;
mod permissions;
mod resolution;
mod roles;

pub struct StaffDirectory {
    employees: Arc<dyn TenantStore<EmployeeId, Employee>>,
    roles: Arc<dyn TenantStore<RoleId, RoleDefinition>>,
    catalog: Arc<dyn TenantStore<Permission, PermissionDefinition>>,
    assignments: Arc<dyn TenantStore<AssignmentId, Assignment>>,
    gate: RwLock<()>,
}

impl StaffDirectory {
    pub fn new(
        employees: Arc<dyn TenantStore<EmployeeId, Employee>>,
        roles: Arc<dyn TenantStore<RoleId, RoleDefinition>>,
        catalog: Arc<dyn TenantStore<Permission, PermissionDefinition>>,
        assignments: Arc<dyn TenantStore<AssignmentId, Assignment>>,
    ) -> Self {
        Self {
            employees,
            roles,
            catalog,
            assignments,
            gate: RwLock::new(()),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryTenantStore::new()),
            Arc::new(InMemoryTenantStore::new()),
            Arc::new(InMemoryTenantStore::new()),
            Arc::new(InMemoryTenantStore::new()),
        )
    }

    fn write_gate(&self) -> DomainResult<RwLockWriteGuard<'_, ()>> {
        self.gate
            .write()
            .map_err(|_| DomainError::invariant("staff directory lock poisoned"))
    }

    fn read_gate(&self) -> DomainResult<RwLockReadGuard<'_, ()>> {
        self.gate
            .read()
            .map_err(|_| DomainError::invariant("staff directory lock poisoned"))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lock-free helpers (callers hold the gate)
    // ─────────────────────────────────────────────────────────────────────────

    /// Every permission must be catalogued (active or not) and non-wildcard.
    fn ensure_grantable(
        &self,
        tenant_id: TenantId,
        permissions: &BTreeSet<Permission>,
    ) -> DomainResult<()> {
        for permission in permissions {
            ensure_catalogable(permission)?;
            if self.catalog.get(tenant_id, permission).is_none() {
                return Err(DomainError::validation(format!(
                    "unknown permission '{permission}'"
                )));
            }
        }
        Ok(())
    }

    fn ensure_role(&self, tenant_id: TenantId, role_id: RoleId) -> DomainResult<RoleDefinition> {
        self.roles
            .get(tenant_id, &role_id)
            .ok_or_else(|| DomainError::validation(format!("unknown role {role_id}")))
    }

    fn assignment_of(&self, tenant_id: TenantId, employee_id: EmployeeId) -> Option<Assignment> {
        self.assignments
            .list(tenant_id)
            .into_iter()
            .find(|a| a.employee_id == employee_id)
    }

    fn active_catalog(&self, tenant_id: TenantId) -> HashSet<Permission> {
        self.catalog
            .list(tenant_id)
            .into_iter()
            .filter(|d| d.is_active)
            .map(|d| d.permission)
            .collect()
    }

    fn grants_of(
        &self,
        employee: &Employee,
        roles: &HashMap<RoleId, RoleDefinition>,
        active: &HashSet<Permission>,
    ) -> Vec<Grant> {
        let role = employee.role_id.and_then(|id| roles.get(&id));
        grants::employee_grants(employee, role, |p| active.contains(p))
    }

    fn all_grants(&self, tenant_id: TenantId) -> Vec<Grant> {
        let roles = self.roles_by_id(tenant_id);
        let active = self.active_catalog(tenant_id);
        self.employees
            .list(tenant_id)
            .iter()
            .flat_map(|e| self.grants_of(e, &roles, &active))
            .collect()
    }

    fn roles_by_id(&self, tenant_id: TenantId) -> HashMap<RoleId, RoleDefinition> {
        self.roles
            .list(tenant_id)
            .into_iter()
            .map(|r| (r.id, r))
            .collect()
    }
}

impl Default for StaffDirectory {
    fn default() -> Self {
        Self::in_memory()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::BTreeSet;

    use consultdesk_auth::Permission;
    use consultdesk_core::TenantId;

    use super::StaffDirectory;
    use crate::catalog::{NewPermission, RiskLevel};
    use crate::department::Department;
    use crate::employee::NewEmployee;

    pub const ACTOR: &str = "test-admin";

    pub fn perms(names: &[&'static str]) -> BTreeSet<Permission> {
        names.iter().map(|p| Permission::from_static(*p)).collect()
    }

    /// Directory with a small catalog: view_dashboard, view_reports,
    /// manage_loans, manage_documents.
    pub fn directory() -> (StaffDirectory, TenantId) {
        let dir = StaffDirectory::in_memory();
        let tenant = TenantId::new();
        for (id, risk) in [
            ("view_dashboard", RiskLevel::Low),
            ("view_reports", RiskLevel::Low),
            ("manage_loans", RiskLevel::Medium),
            ("manage_documents", RiskLevel::Medium),
        ] {
            dir.add_permission(
                tenant,
                NewPermission {
                    permission: Permission::from_static(id),
                    name: id.replace('_', " "),
                    description: String::new(),
                    category: "test".to_string(),
                    risk_level: risk,
                },
                ACTOR,
            )
            .unwrap();
        }
        (dir, tenant)
    }

    pub fn new_employee(name: &str, email: &str, permissions: &[&'static str]) -> NewEmployee {
        NewEmployee {
            name: name.to_string(),
            email: email.to_string(),
            phone: "+977 9800000000".to_string(),
            department: Department::Loans,
            designation: "Officer".to_string(),
            role_id: None,
            permissions: perms(permissions),
            joining_date: None,
        }
    }
}
