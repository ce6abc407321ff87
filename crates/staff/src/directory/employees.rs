use std::collections::BTreeSet;

use chrono::Utc;

use consultdesk_auth::Permission;
use consultdesk_core::{DomainError, DomainResult, EmployeeId, TenantId};

use super::StaffDirectory;
use crate::employee::{
    normalize_email, normalize_name, normalize_phone, Employee, EmployeeChanges, EmployeeQuery,
    NewEmployee,
};
use crate::store::TenantStore;

impl StaffDirectory {
    pub fn add_employee(
        &self,
        tenant_id: TenantId,
        input: NewEmployee,
        actor: &str,
    ) -> DomainResult<Employee> {
        let name = normalize_name(&input.name)?;
        let email = normalize_email(&input.email)?;
        let phone = normalize_phone(&input.phone)?;

        let _gate = self.write_gate()?;
        self.ensure_email_free(tenant_id, &email, None)?;
        if let Some(role_id) = input.role_id {
            self.ensure_role(tenant_id, role_id)?;
        }
        self.ensure_grantable(tenant_id, &input.permissions)?;

        let now = Utc::now();
        let employee = Employee {
            id: EmployeeId::new(),
            name,
            email,
            phone,
            department: input.department,
            designation: input.designation.trim().to_string(),
            role_id: input.role_id,
            permissions: BTreeSet::new(),
            is_active: true,
            joining_date: input.joining_date.unwrap_or_else(|| now.date_naive()),
            created_at: now,
            updated_at: now,
        };
        let employee = self.record_direct_permissions(tenant_id, employee, input.permissions, actor);

        tracing::info!(%tenant_id, employee_id = %employee.id, actor, "employee added");
        Ok(employee)
    }

    pub fn update_employee(
        &self,
        tenant_id: TenantId,
        employee_id: EmployeeId,
        changes: EmployeeChanges,
        actor: &str,
    ) -> DomainResult<Employee> {
        let _gate = self.write_gate()?;
        let mut employee = self
            .employees
            .get(tenant_id, &employee_id)
            .ok_or(DomainError::not_found("employee"))?;

        let mut renamed = false;
        if let Some(name) = changes.name {
            let name = normalize_name(&name)?;
            renamed = name != employee.name;
            employee.name = name;
        }
        if let Some(email) = changes.email {
            let email = normalize_email(&email)?;
            self.ensure_email_free(tenant_id, &email, Some(employee_id))?;
            employee.email = email;
        }
        if let Some(phone) = changes.phone {
            employee.phone = normalize_phone(&phone)?;
        }
        if let Some(department) = changes.department {
            employee.department = department;
        }
        if let Some(designation) = changes.designation {
            employee.designation = designation.trim().to_string();
        }
        if let Some(role_id) = changes.role_id {
            if let Some(id) = role_id {
                self.ensure_role(tenant_id, id)?;
            }
            employee.role_id = role_id;
        }
        if let Some(joining_date) = changes.joining_date {
            employee.joining_date = joining_date;
        }
        employee.updated_at = Utc::now();

        if renamed {
            if let Some(mut assignment) = self.assignment_of(tenant_id, employee_id) {
                assignment.employee_name = employee.name.clone();
                self.assignments.save(tenant_id, assignment);
            }
        }
        self.employees.save(tenant_id, employee.clone());

        tracing::info!(%tenant_id, %employee_id, actor, "employee updated");
        Ok(employee)
    }

    /// Removes the employee together with their assignment record.
    pub fn delete_employee(
        &self,
        tenant_id: TenantId,
        employee_id: EmployeeId,
        actor: &str,
    ) -> DomainResult<Employee> {
        let _gate = self.write_gate()?;
        let assignment = self.assignment_of(tenant_id, employee_id);
        let employee = self
            .employees
            .remove(tenant_id, &employee_id)
            .ok_or(DomainError::not_found("employee"))?;

        if let Some(assignment) = assignment {
            self.assignments.remove(tenant_id, &assignment.id);
        }

        tracing::info!(%tenant_id, %employee_id, actor, "employee deleted");
        Ok(employee)
    }

    pub fn toggle_employee_active(
        &self,
        tenant_id: TenantId,
        employee_id: EmployeeId,
        actor: &str,
    ) -> DomainResult<Employee> {
        let _gate = self.write_gate()?;
        let mut employee = self
            .employees
            .get(tenant_id, &employee_id)
            .ok_or(DomainError::not_found("employee"))?;

        employee.is_active = !employee.is_active;
        employee.updated_at = Utc::now();
        self.employees.save(tenant_id, employee.clone());

        tracing::info!(%tenant_id, %employee_id, is_active = employee.is_active, actor, "employee active flag toggled");
        Ok(employee)
    }

    /// Replace the employee's direct permissions (the checkbox grid). The
    /// assignment record is rewritten and restamped with `actor`, or opened
    /// when the employee gains a non-empty set without one.
    pub fn set_employee_permissions(
        &self,
        tenant_id: TenantId,
        employee_id: EmployeeId,
        permissions: BTreeSet<Permission>,
        actor: &str,
    ) -> DomainResult<Employee> {
        let _gate = self.write_gate()?;
        let employee = self
            .employees
            .get(tenant_id, &employee_id)
            .ok_or(DomainError::not_found("employee"))?;
        self.ensure_grantable(tenant_id, &permissions)?;

        let employee = self.record_direct_permissions(tenant_id, employee, permissions, actor);

        tracing::info!(%tenant_id, %employee_id, count = employee.permissions.len(), actor, "employee permissions replaced");
        Ok(employee)
    }

    pub fn get_employee(&self, tenant_id: TenantId, employee_id: EmployeeId) -> DomainResult<Employee> {
        self.employees
            .get(tenant_id, &employee_id)
            .ok_or(DomainError::not_found("employee"))
    }

    /// Employees matching `query`, in the order they were added.
    pub fn list_employees(&self, tenant_id: TenantId, query: &EmployeeQuery) -> Vec<Employee> {
        self.employees
            .list(tenant_id)
            .into_iter()
            .filter(|e| query.matches(e))
            .collect()
    }

    pub fn find_employee_by_email(&self, tenant_id: TenantId, email: &str) -> Option<Employee> {
        let normalized = email.trim().to_lowercase();
        self.employees
            .list(tenant_id)
            .into_iter()
            .find(|e| e.email == normalized)
    }

    fn ensure_email_free(
        &self,
        tenant_id: TenantId,
        email: &str,
        except: Option<EmployeeId>,
    ) -> DomainResult<()> {
        let taken = self
            .employees
            .list(tenant_id)
            .iter()
            .any(|e| e.email == email && Some(e.id) != except);
        if taken {
            return Err(DomainError::conflict(format!("email '{email}' is already in use")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::directory::test_support::{directory, new_employee, perms, ACTOR};
    use crate::department::Department;

    #[test]
    fn added_employee_holds_exactly_the_submitted_permissions() {
        let (dir, tenant) = directory();
        let added = dir
            .add_employee(tenant, new_employee("Sita", "sita@example.com", &["view_reports", "manage_loans"]), ACTOR)
            .unwrap();

        let stored = dir.get_employee(tenant, added.id).unwrap();
        assert_eq!(stored.permissions, perms(&["view_reports", "manage_loans"]));
        assert!(stored.is_active);
    }

    #[test]
    fn unknown_permission_is_rejected() {
        let (dir, tenant) = directory();
        let err = dir
            .add_employee(tenant, new_employee("Sita", "sita@example.com", &["launch_rockets"]), ACTOR)
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(ref m) if m.contains("launch_rockets")));
        assert!(dir.list_employees(tenant, &EmployeeQuery::default()).is_empty());
    }

    #[test]
    fn duplicate_email_conflicts_case_insensitively() {
        let (dir, tenant) = directory();
        dir.add_employee(tenant, new_employee("Sita", "sita@example.com", &[]), ACTOR)
            .unwrap();

        let err = dir
            .add_employee(tenant, new_employee("Sita Two", "SITA@example.com ", &[]), ACTOR)
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn same_email_is_allowed_in_another_tenant() {
        let (dir, tenant) = directory();
        dir.add_employee(tenant, new_employee("Sita", "sita@example.com", &[]), ACTOR)
            .unwrap();

        let other = TenantId::new();
        assert!(dir
            .add_employee(other, new_employee("Sita", "sita@example.com", &[]), ACTOR)
            .is_ok());
        assert_eq!(dir.list_employees(tenant, &EmployeeQuery::default()).len(), 1);
    }

    #[test]
    fn unknown_role_is_rejected() {
        let (dir, tenant) = directory();
        let mut input = new_employee("Sita", "sita@example.com", &[]);
        input.role_id = Some(consultdesk_core::RoleId::new());

        assert!(matches!(
            dir.add_employee(tenant, input, ACTOR),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn update_edits_fields_and_keeps_email_unique() {
        let (dir, tenant) = directory();
        let a = dir
            .add_employee(tenant, new_employee("Sita", "sita@example.com", &[]), ACTOR)
            .unwrap();
        dir.add_employee(tenant, new_employee("Hari", "hari@example.com", &[]), ACTOR)
            .unwrap();

        let updated = dir
            .update_employee(
                tenant,
                a.id,
                EmployeeChanges {
                    designation: Some("  Senior Officer ".into()),
                    department: Some(Department::Documents),
                    ..Default::default()
                },
                ACTOR,
            )
            .unwrap();
        assert_eq!(updated.designation, "Senior Officer");
        assert_eq!(updated.department, Department::Documents);

        let clash = dir.update_employee(
            tenant,
            a.id,
            EmployeeChanges { email: Some("hari@example.com".into()), ..Default::default() },
            ACTOR,
        );
        assert!(matches!(clash, Err(DomainError::Conflict(_))));

        let own_email = dir.update_employee(
            tenant,
            a.id,
            EmployeeChanges { email: Some("sita@example.com".into()), ..Default::default() },
            ACTOR,
        );
        assert!(own_email.is_ok());
    }

    #[test]
    fn toggle_active_flips_exactly_one_employee() {
        let (dir, tenant) = directory();
        let ids: Vec<_> = ["a", "b", "c"]
            .iter()
            .map(|n| {
                dir.add_employee(tenant, new_employee(n, &format!("{n}@example.com"), &[]), ACTOR)
                    .unwrap()
                    .id
            })
            .collect();

        let toggled = dir.toggle_employee_active(tenant, ids[1], ACTOR).unwrap();
        assert!(!toggled.is_active);

        let flags: Vec<bool> = dir
            .list_employees(tenant, &EmployeeQuery::default())
            .iter()
            .map(|e| e.is_active)
            .collect();
        assert_eq!(flags, vec![true, false, true]);
    }

    #[test]
    fn set_permissions_rewrites_the_assignment_record() {
        let (dir, tenant) = directory();
        let e = dir
            .add_employee(tenant, new_employee("Sita", "sita@example.com", &[]), ACTOR)
            .unwrap();
        let a = dir
            .create_assignment(tenant, e.id, perms(&["view_dashboard"]), "first-admin")
            .unwrap();

        dir.set_employee_permissions(tenant, e.id, perms(&["manage_documents"]), "second-admin")
            .unwrap();

        let a = dir.get_assignment(tenant, a.id).unwrap();
        assert_eq!(a.permissions, perms(&["manage_documents"]));
        assert_eq!(a.assigned_by, "second-admin");
    }

    fn ledger_permissions(dir: &StaffDirectory, tenant: TenantId, employee_id: EmployeeId) -> Option<BTreeSet<Permission>> {
        dir.list_assignments(tenant)
            .into_iter()
            .find(|a| a.employee_id == employee_id)
            .map(|a| a.permissions)
    }

    #[test]
    fn adding_with_permissions_opens_an_assignment_record() {
        let (dir, tenant) = directory();
        let e = dir
            .add_employee(tenant, new_employee("Sita", "sita@example.com", &["manage_loans"]), "hr-lead")
            .unwrap();

        let ledger = dir.list_assignments(tenant);
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].assigned_by, "hr-lead");
        assert_eq!(ledger_permissions(&dir, tenant, e.id), Some(e.permissions.clone()));
        assert!(matches!(
            dir.create_assignment(tenant, e.id, perms(&[]), ACTOR),
            Err(DomainError::Conflict(_))
        ));
    }

    #[test]
    fn adding_without_permissions_leaves_the_ledger_empty() {
        let (dir, tenant) = directory();
        dir.add_employee(tenant, new_employee("Sita", "sita@example.com", &[]), ACTOR)
            .unwrap();
        assert!(dir.list_assignments(tenant).is_empty());
    }

    #[test]
    fn replaced_permissions_reach_the_ledger_and_the_export() {
        let (dir, tenant) = directory();
        let e = dir
            .add_employee(tenant, new_employee("Sita", "sita@example.com", &["manage_loans"]), ACTOR)
            .unwrap();

        let e = dir
            .set_employee_permissions(tenant, e.id, perms(&["view_reports"]), "admin2")
            .unwrap();

        assert_eq!(dir.list_assignments(tenant).len(), 1);
        assert_eq!(ledger_permissions(&dir, tenant, e.id), Some(e.permissions.clone()));
        let export = dir.export_assignments(tenant).unwrap();
        assert_eq!(export.records.len(), 1);
        assert_eq!(export.records[0].permissions, perms(&["view_reports"]));
        assert_eq!(export.records[0].assigned_by, "admin2");
    }

    #[test]
    fn setting_permissions_without_a_record_opens_one() {
        let (dir, tenant) = directory();
        let e = dir
            .add_employee(tenant, new_employee("Sita", "sita@example.com", &[]), ACTOR)
            .unwrap();

        dir.set_employee_permissions(tenant, e.id, perms(&[]), ACTOR).unwrap();
        assert!(dir.list_assignments(tenant).is_empty());

        let e = dir
            .set_employee_permissions(tenant, e.id, perms(&["manage_documents"]), "hr-lead")
            .unwrap();
        assert_eq!(ledger_permissions(&dir, tenant, e.id), Some(perms(&["manage_documents"])));
        assert_eq!(dir.get_employee(tenant, e.id).unwrap().permissions, perms(&["manage_documents"]));
    }

    #[test]
    fn rename_refreshes_assignment_name() {
        let (dir, tenant) = directory();
        let e = dir
            .add_employee(tenant, new_employee("Sita", "sita@example.com", &[]), ACTOR)
            .unwrap();
        let a = dir.create_assignment(tenant, e.id, perms(&[]), ACTOR).unwrap();

        dir.update_employee(
            tenant,
            e.id,
            EmployeeChanges { name: Some("Sita Sharma".into()), ..Default::default() },
            ACTOR,
        )
        .unwrap();

        assert_eq!(dir.get_assignment(tenant, a.id).unwrap().employee_name, "Sita Sharma");
    }

    #[test]
    fn delete_removes_employee_and_assignment() {
        let (dir, tenant) = directory();
        let e = dir
            .add_employee(tenant, new_employee("Sita", "sita@example.com", &["view_reports"]), ACTOR)
            .unwrap();
        assert_eq!(dir.list_assignments(tenant).len(), 1);

        dir.delete_employee(tenant, e.id, ACTOR).unwrap();

        assert!(matches!(dir.get_employee(tenant, e.id), Err(DomainError::NotFound("employee"))));
        assert!(dir.list_assignments(tenant).is_empty());
        assert!(dir.delete_employee(tenant, e.id, ACTOR).is_err());
    }

    #[test]
    fn list_filters_and_keeps_insertion_order() {
        let (dir, tenant) = directory();
        for name in ["Zara", "Asha", "Mohan"] {
            dir.add_employee(
                tenant,
                new_employee(name, &format!("{}@example.com", name.to_lowercase()), &[]),
                ACTOR,
            )
            .unwrap();
        }

        let names: Vec<String> = dir
            .list_employees(tenant, &EmployeeQuery::default())
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["Zara", "Asha", "Mohan"]);

        let q = EmployeeQuery { search: Some("ash".into()), ..Default::default() };
        assert_eq!(dir.list_employees(tenant, &q).len(), 1);
        assert!(dir.find_employee_by_email(tenant, " MOHAN@example.com").is_some());
    }

    proptest! {
        #[test]
        fn toggling_active_twice_restores_every_flag(count in 1usize..6, pick in 0usize..6) {
            let (dir, tenant) = directory();
            let ids: Vec<_> = (0..count)
                .map(|i| {
                    dir.add_employee(tenant, new_employee("E", &format!("e{i}@example.com"), &[]), ACTOR)
                        .unwrap()
                        .id
                })
                .collect();
            let target = ids[pick % count];

            dir.toggle_employee_active(tenant, target, ACTOR).unwrap();
            let inactive: Vec<_> = dir
                .list_employees(tenant, &EmployeeQuery { active: Some(false), ..Default::default() })
                .into_iter()
                .map(|e| e.id)
                .collect();
            prop_assert_eq!(inactive, vec![target]);

            dir.toggle_employee_active(tenant, target, ACTOR).unwrap();
            prop_assert!(dir.list_employees(tenant, &EmployeeQuery::default()).iter().all(|e| e.is_active));
        }
    }
}
