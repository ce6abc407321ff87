use std::collections::BTreeSet;

use consultdesk_auth::Permission;
use consultdesk_core::{DomainError, DomainResult, EmployeeId, TenantId};

use super::StaffDirectory;
use crate::grants::{self, CoverageReport, Grant};
use crate::store::TenantStore;

impl StaffDirectory {
    /// The full grant relation of a tenant, employees in insertion order.
    pub fn grant_relation(&self, tenant_id: TenantId) -> DomainResult<Vec<Grant>> {
        let _gate = self.read_gate()?;
        Ok(self.all_grants(tenant_id))
    }

    pub fn employee_grants(&self, tenant_id: TenantId, employee_id: EmployeeId) -> DomainResult<Vec<Grant>> {
        let _gate = self.read_gate()?;
        let employee = self
            .employees
            .get(tenant_id, &employee_id)
            .ok_or(DomainError::not_found("employee"))?;
        let roles = self.roles_by_id(tenant_id);
        let active = self.active_catalog(tenant_id);
        Ok(self.grants_of(&employee, &roles, &active))
    }

    /// Role permissions plus direct permissions, restricted to active
    /// catalog entries. Empty for deactivated employees.
    pub fn effective_permissions(
        &self,
        tenant_id: TenantId,
        employee_id: EmployeeId,
    ) -> DomainResult<BTreeSet<Permission>> {
        let grants = self.employee_grants(tenant_id, employee_id)?;
        Ok(grants::effective_permissions(&grants))
    }

    pub fn coverage_report(&self, tenant_id: TenantId) -> DomainResult<CoverageReport> {
        let _gate = self.read_gate()?;
        let employees = self.employees.list(tenant_id);
        let roles = self.roles.list(tenant_id);
        Ok(grants::coverage_report(&employees, &roles))
    }
}
