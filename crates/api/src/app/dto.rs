//! Request DTOs and their mapping onto directory inputs.
//!
//! Identifiers, departments and risk tiers arrive as strings and are parsed
//! here, so malformed input becomes a 400 before the directory is touched.

use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

use consultdesk_auth::Permission;
use consultdesk_core::{DomainResult, RoleId};
use consultdesk_staff::{
    Department, EmployeeChanges, EmployeeQuery, NewEmployee, NewPermission, NewRole,
    PermissionChanges, RiskLevel, RoleChanges,
};

// -------------------------
// Employees
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateEmployeeRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub department: String,
    #[serde(default)]
    pub designation: String,
    pub role_id: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
    pub joining_date: Option<NaiveDate>,
}

impl CreateEmployeeRequest {
    pub fn into_domain(self) -> DomainResult<NewEmployee> {
        Ok(NewEmployee {
            name: self.name,
            email: self.email,
            phone: self.phone,
            department: self.department.parse()?,
            designation: self.designation,
            role_id: self.role_id.as_deref().map(RoleId::from_str).transpose()?,
            permissions: parse_permissions(&self.permissions)?,
            joining_date: self.joining_date,
        })
    }
}

/// `"role_id": null` clears the role; omitting the field leaves it alone.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateEmployeeRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub designation: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub role_id: Option<Option<String>>,
    pub joining_date: Option<NaiveDate>,
}

impl UpdateEmployeeRequest {
    pub fn into_domain(self) -> DomainResult<EmployeeChanges> {
        let role_id = match self.role_id {
            Some(Some(raw)) => Some(Some(raw.parse::<RoleId>()?)),
            Some(None) => Some(None),
            None => None,
        };
        Ok(EmployeeChanges {
            name: self.name,
            email: self.email,
            phone: self.phone,
            department: self.department.as_deref().map(Department::from_str).transpose()?,
            designation: self.designation,
            role_id,
            joining_date: self.joining_date,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListEmployeesQuery {
    pub search: Option<String>,
    pub department: Option<String>,
    pub active: Option<bool>,
    pub role_id: Option<String>,
}

impl ListEmployeesQuery {
    pub fn into_domain(self) -> DomainResult<EmployeeQuery> {
        Ok(EmployeeQuery {
            search: self.search,
            department: self.department.as_deref().map(Department::from_str).transpose()?,
            active: self.active,
            role_id: self.role_id.as_deref().map(RoleId::from_str).transpose()?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct PermissionSetRequest {
    pub permissions: Vec<String>,
}

impl PermissionSetRequest {
    pub fn into_domain(self) -> DomainResult<BTreeSet<Permission>> {
        parse_permissions(&self.permissions)
    }
}

// -------------------------
// Roles
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateRoleRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub department: String,
    pub level: u8,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl CreateRoleRequest {
    pub fn into_domain(self) -> DomainResult<NewRole> {
        Ok(NewRole {
            name: self.name,
            description: self.description,
            department: self.department.parse()?,
            level: self.level,
            permissions: parse_permissions(&self.permissions)?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateRoleRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub department: Option<String>,
    pub level: Option<u8>,
    pub permissions: Option<Vec<String>>,
}

impl UpdateRoleRequest {
    pub fn into_domain(self) -> DomainResult<RoleChanges> {
        Ok(RoleChanges {
            name: self.name,
            description: self.description,
            department: self.department.as_deref().map(Department::from_str).transpose()?,
            level: self.level,
            permissions: self.permissions.as_deref().map(parse_permissions).transpose()?,
        })
    }
}

// -------------------------
// Permission catalog
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreatePermissionRequest {
    /// Identifier, e.g. `manage_loans`.
    pub permission: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub risk_level: String,
}

impl CreatePermissionRequest {
    pub fn into_domain(self) -> DomainResult<NewPermission> {
        Ok(NewPermission {
            permission: Permission::parse(&self.permission)?,
            name: self.name,
            description: self.description,
            category: self.category,
            risk_level: self.risk_level.parse()?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePermissionRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub risk_level: Option<String>,
}

impl UpdatePermissionRequest {
    pub fn into_domain(self) -> DomainResult<PermissionChanges> {
        Ok(PermissionChanges {
            name: self.name,
            description: self.description,
            category: self.category,
            risk_level: self.risk_level.as_deref().map(RiskLevel::from_str).transpose()?,
        })
    }
}

// -------------------------
// Assignments
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateAssignmentRequest {
    pub employee_id: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ToggleAssignmentRequest {
    pub permission: String,
}

// -------------------------
// RBAC audit
// -------------------------

#[derive(Debug, Deserialize)]
pub struct ExplainQuery {
    pub permission: String,
}

pub fn parse_permissions(raw: &[String]) -> DomainResult<BTreeSet<Permission>> {
    raw.iter().map(|p| Permission::parse(p)).collect()
}

/// Distinguishes an explicit `null` from an absent field.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn update_distinguishes_null_role_from_missing_role() {
        let cleared: UpdateEmployeeRequest = serde_json::from_value(json!({ "role_id": null })).unwrap();
        assert_eq!(cleared.into_domain().unwrap().role_id, Some(None));

        let untouched: UpdateEmployeeRequest = serde_json::from_value(json!({ "name": "Sita" })).unwrap();
        assert_eq!(untouched.into_domain().unwrap().role_id, None);
    }

    #[test]
    fn create_employee_parses_department_and_permissions() {
        let req: CreateEmployeeRequest = serde_json::from_value(json!({
            "name": "Sita",
            "email": "sita@example.com",
            "department": "IT Training",
            "permissions": ["view_dashboard", "manage_it_training"],
        }))
        .unwrap();

        let input = req.into_domain().unwrap();
        assert_eq!(input.department, Department::ItTraining);
        assert_eq!(input.permissions.len(), 2);
    }

    #[test]
    fn malformed_identifiers_are_validation_errors() {
        assert!(parse_permissions(&["Manage Loans".to_string()]).is_err());

        let req: CreateRoleRequest = serde_json::from_value(json!({
            "name": "Ops",
            "department": "spaceflight",
            "level": 3,
        }))
        .unwrap();
        assert!(req.into_domain().is_err());
    }

    #[test]
    fn risk_level_is_parsed_on_update() {
        let req: UpdatePermissionRequest =
            serde_json::from_value(json!({ "risk_level": "high" })).unwrap();
        assert_eq!(req.into_domain().unwrap().risk_level, Some(RiskLevel::High));
    }
}
