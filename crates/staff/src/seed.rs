//! Default permission catalog and roles for a new tenant.

use std::collections::BTreeSet;

use serde::Serialize;

use consultdesk_auth::Permission;
use consultdesk_core::{DomainError, DomainResult, TenantId};

use crate::capabilities::*;
use crate::catalog::{NewPermission, RiskLevel};
use crate::department::Department;
use crate::directory::StaffDirectory;
use crate::role::NewRole;

struct DefaultPermission {
    permission: Permission,
    name: &'static str,
    description: &'static str,
    category: &'static str,
    risk_level: RiskLevel,
}

fn default_permissions() -> Vec<DefaultPermission> {
    let entry = |permission, name, description, category, risk_level| DefaultPermission {
        permission,
        name,
        description,
        category,
        risk_level,
    };
    vec![
        entry(VIEW_DASHBOARD, "View Dashboard", "Access the main dashboard", "General", RiskLevel::Low),
        entry(VIEW_REPORTS, "View Reports", "Read analytics and access reports", "Reports", RiskLevel::Low),
        entry(MANAGE_TICKETS, "Manage Tickets", "Handle support tickets", "Support", RiskLevel::Medium),
        entry(MANAGE_EMPLOYEES, "Manage Employees", "Add, edit and deactivate staff", "Administration", RiskLevel::High),
        entry(MANAGE_ROLES, "Manage Roles", "Create and edit roles", "Administration", RiskLevel::High),
        entry(
            MANAGE_PERMISSIONS,
            "Manage Permissions",
            "Edit the permission catalog and assignments",
            "Administration",
            RiskLevel::High,
        ),
        entry(
            MANAGE_OVERSEAS_EDUCATION,
            "Manage Overseas Education",
            "Applications, universities and enrollments",
            "Departments",
            RiskLevel::Medium,
        ),
        entry(MANAGE_LOANS, "Manage Loans", "Education loan applications", "Departments", RiskLevel::High),
        entry(MANAGE_DOCUMENTS, "Manage Documents", "Document verification and translation", "Departments", RiskLevel::Medium),
        entry(MANAGE_IT_TRAINING, "Manage IT Training", "Courses and batches", "Departments", RiskLevel::Low),
        entry(MANAGE_CAREER_SUPPORT, "Manage Career Support", "Counselling and placements", "Departments", RiskLevel::Low),
        entry(MANAGE_SETTLEMENT, "Manage Settlement", "Post-arrival settlement services", "Departments", RiskLevel::Low),
    ]
}

fn default_roles() -> Vec<NewRole> {
    let role = |name: &str, description: &str, department, level, permissions: &[Permission]| NewRole {
        name: name.to_string(),
        description: description.to_string(),
        department,
        level,
        permissions: permissions.iter().cloned().collect(),
    };
    let department_role = |name: &str, department, capability: Permission| {
        role(
            name,
            "Handles the day-to-day work of one department",
            department,
            2,
            &[VIEW_DASHBOARD, MANAGE_TICKETS, capability],
        )
    };

    let everything: Vec<Permission> = default_permissions().into_iter().map(|p| p.permission).collect();
    vec![
        role("Administrator", "Full access to the back-office", Department::Administration, 5, &everything),
        role(
            "Department Manager",
            "Runs a department and reads its reports",
            Department::Administration,
            4,
            &[VIEW_DASHBOARD, VIEW_REPORTS, MANAGE_TICKETS, MANAGE_EMPLOYEES],
        ),
        department_role("Education Counsellor", Department::OverseasEducation, MANAGE_OVERSEAS_EDUCATION),
        department_role("Loan Officer", Department::Loans, MANAGE_LOANS),
        department_role("Document Specialist", Department::Documents, MANAGE_DOCUMENTS),
        department_role("IT Trainer", Department::ItTraining, MANAGE_IT_TRAINING),
        department_role("Career Advisor", Department::CareerSupport, MANAGE_CAREER_SUPPORT),
        department_role("Settlement Officer", Department::Settlement, MANAGE_SETTLEMENT),
        role(
            "Support Agent",
            "Answers tickets",
            Department::Administration,
            1,
            &[VIEW_DASHBOARD, MANAGE_TICKETS],
        ),
    ]
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub permissions_added: usize,
    pub roles_added: usize,
}

impl StaffDirectory {
    /// Install the default catalog and roles. Entries that already exist
    /// (by identifier, or by role name) are left as they are, so seeding
    /// twice is a no-op.
    pub fn seed_defaults(&self, tenant_id: TenantId, actor: &str) -> DomainResult<SeedSummary> {
        let mut summary = SeedSummary::default();

        for default in default_permissions() {
            let input = NewPermission {
                permission: default.permission,
                name: default.name.to_string(),
                description: default.description.to_string(),
                category: default.category.to_string(),
                risk_level: default.risk_level,
            };
            match self.add_permission(tenant_id, input, actor) {
                Ok(_) => summary.permissions_added += 1,
                Err(DomainError::Conflict(_)) => {}
                Err(err) => return Err(err),
            }
        }

        for role in default_roles() {
            if self.find_role_by_name(tenant_id, &role.name).is_some() {
                continue;
            }
            // Tenants may have deleted some defaults; only grant what is catalogued.
            let catalogued: BTreeSet<Permission> = role
                .permissions
                .iter()
                .filter(|p| self.get_permission(tenant_id, p).is_ok())
                .cloned()
                .collect();
            match self.add_role(tenant_id, NewRole { permissions: catalogued, ..role }, actor) {
                Ok(_) => summary.roles_added += 1,
                Err(DomainError::Conflict(_)) => {}
                Err(err) => return Err(err),
            }
        }

        tracing::info!(
            %tenant_id,
            permissions_added = summary.permissions_added,
            roles_added = summary.roles_added,
            actor,
            "default catalog seeded"
        );
        Ok(summary)
    }
}
