//! Derived grant relation: `(employee, permission, granted_via)`.
//!
//! Nothing here is stored. Grants are recomputed from employees, roles and
//! the permission catalog every time they are needed, so role edits take
//! effect immediately and counts can never drift.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use consultdesk_auth::Permission;
use consultdesk_core::{EmployeeId, RoleId};

use crate::employee::Employee;
use crate::role::RoleDefinition;

/// How an employee came to hold a permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GrantedVia {
    Role { role_id: RoleId },
    Direct,
}

/// One row of the grant relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Grant {
    pub employee_id: EmployeeId,
    pub permission: Permission,
    pub granted_via: GrantedVia,
}

/// Grants held by one employee.
///
/// Inactive employees hold nothing. Permissions for which `is_active` returns
/// false are skipped. A permission granted both by the role and directly
/// yields two rows.
pub fn employee_grants<F>(
    employee: &Employee,
    role: Option<&RoleDefinition>,
    is_active: F,
) -> Vec<Grant>
where
    F: Fn(&Permission) -> bool,
{
    if !employee.is_active {
        return Vec::new();
    }

    let from_role = role
        .filter(|r| Some(r.id) == employee.role_id)
        .into_iter()
        .flat_map(|r| {
            r.permissions.iter().map(move |p| (p, GrantedVia::Role { role_id: r.id }))
        });
    let direct = employee.permissions.iter().map(|p| (p, GrantedVia::Direct));

    from_role
        .chain(direct)
        .filter(|(p, _)| is_active(p))
        .map(|(p, via)| Grant {
            employee_id: employee.id,
            permission: p.clone(),
            granted_via: via,
        })
        .collect()
}

/// Collapse grants into the distinct permission set.
pub fn effective_permissions(grants: &[Grant]) -> BTreeSet<Permission> {
    grants.iter().map(|g| g.permission.clone()).collect()
}

/// Number of distinct employees holding each permission.
pub fn holder_counts(grants: &[Grant]) -> HashMap<Permission, usize> {
    let mut holders: HashMap<&Permission, BTreeSet<EmployeeId>> = HashMap::new();
    for grant in grants {
        holders.entry(&grant.permission).or_default().insert(grant.employee_id);
    }
    holders
        .into_iter()
        .map(|(p, employees)| (p.clone(), employees.len()))
        .collect()
}

/// Direct grants of one employee that their role does not cover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverageGap {
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub role_id: Option<RoleId>,
    pub uncovered: BTreeSet<Permission>,
}

/// Report on the `direct permissions ⊆ role permissions` expectation.
///
/// Direct grants are legitimate, so this is informational: it lists where
/// access comes from outside the role model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CoverageReport {
    pub employees_checked: usize,
    pub gaps: Vec<CoverageGap>,
}

impl CoverageReport {
    pub fn is_covered(&self) -> bool {
        self.gaps.is_empty()
    }
}

pub fn coverage_report(employees: &[Employee], roles: &[RoleDefinition]) -> CoverageReport {
    let by_id: HashMap<RoleId, &RoleDefinition> = roles.iter().map(|r| (r.id, r)).collect();

    let gaps = employees
        .iter()
        .filter_map(|e| {
            let role_perms = e.role_id.and_then(|id| by_id.get(&id)).map(|r| &r.permissions);
            let uncovered: BTreeSet<Permission> = e
                .permissions
                .iter()
                .filter(|p| role_perms.is_none_or(|rp| !rp.contains(*p)))
                .cloned()
                .collect();

            (!uncovered.is_empty()).then(|| CoverageGap {
                employee_id: e.id,
                employee_name: e.name.clone(),
                role_id: e.role_id,
                uncovered,
            })
        })
        .collect();

    CoverageReport {
        employees_checked: employees.len(),
        gaps,
    }
}
