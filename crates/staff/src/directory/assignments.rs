use std::collections::{BTreeSet, HashSet};

use chrono::Utc;

use consultdesk_auth::Permission;
use consultdesk_core::{AssignmentId, DomainError, DomainResult, EmployeeId, TenantId};

use super::StaffDirectory;
use crate::assignment::{
    Assignment, AssignmentExport, AssignmentRecord, ImportSummary, EXPORT_FORMAT_VERSION,
};
use crate::employee::Employee;
use crate::store::TenantStore;

impl StaffDirectory {
    /// Open the ledger record for an employee. The employee's direct
    /// permissions are replaced by `permissions`.
    pub fn create_assignment(
        &self,
        tenant_id: TenantId,
        employee_id: EmployeeId,
        permissions: BTreeSet<Permission>,
        actor: &str,
    ) -> DomainResult<Assignment> {
        let _gate = self.write_gate()?;
        let employee = self
            .employees
            .get(tenant_id, &employee_id)
            .ok_or(DomainError::not_found("employee"))?;
        if self.assignment_of(tenant_id, employee_id).is_some() {
            return Err(DomainError::conflict(format!(
                "employee {employee_id} already has an assignment"
            )));
        }
        self.ensure_grantable(tenant_id, &permissions)?;

        let assignment = Assignment {
            id: AssignmentId::new(),
            employee_id,
            employee_name: employee.name.clone(),
            permissions,
            assigned_at: Utc::now(),
            assigned_by: actor.to_string(),
        };
        self.write_through(tenant_id, employee, &assignment);

        tracing::info!(%tenant_id, assignment_id = %assignment.id, %employee_id, actor, "assignment created");
        Ok(assignment)
    }

    pub fn update_assignment(
        &self,
        tenant_id: TenantId,
        assignment_id: AssignmentId,
        permissions: BTreeSet<Permission>,
        actor: &str,
    ) -> DomainResult<Assignment> {
        let _gate = self.write_gate()?;
        let (mut assignment, employee) = self.assignment_with_employee(tenant_id, assignment_id)?;
        self.ensure_grantable(tenant_id, &permissions)?;

        assignment.permissions = permissions;
        assignment.assigned_at = Utc::now();
        assignment.assigned_by = actor.to_string();
        self.write_through(tenant_id, employee, &assignment);

        tracing::info!(%tenant_id, %assignment_id, actor, "assignment updated");
        Ok(assignment)
    }

    /// Checkbox toggle: adds `permission` if the record lacks it, removes it
    /// otherwise. Applying the same toggle twice restores the original set.
    pub fn toggle_assignment_permission(
        &self,
        tenant_id: TenantId,
        assignment_id: AssignmentId,
        permission: &Permission,
        actor: &str,
    ) -> DomainResult<Assignment> {
        let _gate = self.write_gate()?;
        let (mut assignment, employee) = self.assignment_with_employee(tenant_id, assignment_id)?;
        if !assignment.permissions.contains(permission) {
            self.ensure_grantable(tenant_id, &BTreeSet::from([permission.clone()]))?;
        }

        let granted = assignment.toggle(permission);
        assignment.assigned_at = Utc::now();
        assignment.assigned_by = actor.to_string();
        self.write_through(tenant_id, employee, &assignment);

        tracing::info!(%tenant_id, %assignment_id, %permission, granted, actor, "assignment permission toggled");
        Ok(assignment)
    }

    /// Deleting the record revokes the employee's direct permissions.
    pub fn delete_assignment(
        &self,
        tenant_id: TenantId,
        assignment_id: AssignmentId,
        actor: &str,
    ) -> DomainResult<Assignment> {
        let _gate = self.write_gate()?;
        let assignment = self
            .assignments
            .remove(tenant_id, &assignment_id)
            .ok_or(DomainError::not_found("assignment"))?;

        if let Some(mut employee) = self.employees.get(tenant_id, &assignment.employee_id) {
            employee.permissions.clear();
            employee.updated_at = Utc::now();
            self.employees.save(tenant_id, employee);
        }

        tracing::info!(%tenant_id, %assignment_id, actor, "assignment deleted");
        Ok(assignment)
    }

    pub fn get_assignment(&self, tenant_id: TenantId, assignment_id: AssignmentId) -> DomainResult<Assignment> {
        self.assignments
            .get(tenant_id, &assignment_id)
            .ok_or(DomainError::not_found("assignment"))
    }

    pub fn list_assignments(&self, tenant_id: TenantId) -> Vec<Assignment> {
        self.assignments.list(tenant_id)
    }

    pub fn export_assignments(&self, tenant_id: TenantId) -> DomainResult<AssignmentExport> {
        let _gate = self.read_gate()?;
        let records = self
            .assignments
            .list(tenant_id)
            .into_iter()
            .filter_map(|a| {
                let employee = self.employees.get(tenant_id, &a.employee_id)?;
                Some(AssignmentRecord {
                    employee_email: employee.email,
                    permissions: a.permissions,
                    assigned_by: a.assigned_by,
                    assigned_at: a.assigned_at,
                })
            })
            .collect();

        Ok(AssignmentExport {
            format_version: EXPORT_FORMAT_VERSION,
            exported_at: Utc::now(),
            records,
        })
    }

    /// Apply an exported ledger. Every record is validated before any is
    /// written; a single bad record rejects the whole import.
    ///
    /// Imported records are stamped with `actor` and the import time; the
    /// original `assigned_by` is kept only in the export document.
    pub fn import_assignments(
        &self,
        tenant_id: TenantId,
        export: AssignmentExport,
        actor: &str,
    ) -> DomainResult<ImportSummary> {
        if export.format_version != EXPORT_FORMAT_VERSION {
            return Err(DomainError::validation(format!(
                "unsupported assignment export version {} (expected {EXPORT_FORMAT_VERSION})",
                export.format_version
            )));
        }

        let _gate = self.write_gate()?;
        let mut seen: HashSet<String> = HashSet::new();
        let mut resolved: Vec<(Employee, BTreeSet<Permission>)> = Vec::with_capacity(export.records.len());
        for record in export.records {
            let email = record.employee_email.trim().to_lowercase();
            if !seen.insert(email.clone()) {
                return Err(DomainError::validation(format!(
                    "duplicate record for '{email}' in import"
                )));
            }
            let employee = self
                .find_employee_by_email(tenant_id, &email)
                .ok_or_else(|| DomainError::validation(format!("no employee with email '{email}'")))?;
            self.ensure_grantable(tenant_id, &record.permissions)?;
            resolved.push((employee, record.permissions));
        }

        let now = Utc::now();
        let mut summary = ImportSummary::default();
        for (employee, permissions) in resolved {
            let assignment = match self.assignment_of(tenant_id, employee.id) {
                Some(mut existing) => {
                    summary.updated += 1;
                    existing.permissions = permissions;
                    existing.assigned_at = now;
                    existing.assigned_by = actor.to_string();
                    existing
                }
                None => {
                    summary.created += 1;
                    Assignment {
                        id: AssignmentId::new(),
                        employee_id: employee.id,
                        employee_name: employee.name.clone(),
                        permissions,
                        assigned_at: now,
                        assigned_by: actor.to_string(),
                    }
                }
            };
            self.write_through(tenant_id, employee, &assignment);
        }

        tracing::info!(%tenant_id, created = summary.created, updated = summary.updated, actor, "assignments imported");
        Ok(summary)
    }

    fn assignment_with_employee(
        &self,
        tenant_id: TenantId,
        assignment_id: AssignmentId,
    ) -> DomainResult<(Assignment, Employee)> {
        let assignment = self
            .assignments
            .get(tenant_id, &assignment_id)
            .ok_or(DomainError::not_found("assignment"))?;
        let employee = self
            .employees
            .get(tenant_id, &assignment.employee_id)
            .ok_or_else(|| DomainError::invariant("assignment references a missing employee"))?;
        Ok((assignment, employee))
    }

    /// Replace the employee's direct set through the ledger. An existing
    /// record is rewritten and restamped; a non-empty set with no record opens
    /// one. Callers hold the write gate and have checked grantability.
    pub(super) fn record_direct_permissions(
        &self,
        tenant_id: TenantId,
        mut employee: Employee,
        permissions: BTreeSet<Permission>,
        actor: &str,
    ) -> Employee {
        let now = Utc::now();
        let assignment = match self.assignment_of(tenant_id, employee.id) {
            Some(mut existing) => {
                existing.permissions = permissions;
                existing.assigned_at = now;
                existing.assigned_by = actor.to_string();
                existing
            }
            None if !permissions.is_empty() => Assignment {
                id: AssignmentId::new(),
                employee_id: employee.id,
                employee_name: employee.name.clone(),
                permissions,
                assigned_at: now,
                assigned_by: actor.to_string(),
            },
            None => {
                employee.permissions = permissions;
                employee.updated_at = now;
                self.employees.save(tenant_id, employee.clone());
                return employee;
            }
        };
        self.write_through(tenant_id, employee, &assignment)
    }

    /// Store the record and mirror its permission set onto the employee.
    fn write_through(&self, tenant_id: TenantId, mut employee: Employee, assignment: &Assignment) -> Employee {
        employee.permissions = assignment.permissions.clone();
        employee.updated_at = assignment.assigned_at;
        self.employees.save(tenant_id, employee.clone());
        self.assignments.save(tenant_id, assignment.clone());
        employee
    }
}
