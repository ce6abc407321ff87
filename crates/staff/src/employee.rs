//! Employee records.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use consultdesk_auth::Permission;
use consultdesk_core::{DomainError, DomainResult, EmployeeId, Entity, RoleId};

use crate::department::Department;

/// A staff member of a consultancy.
///
/// `permissions` holds only the *direct* grants; role grants come from the
/// role referenced by `role_id` and are combined at resolution time (see
/// [`crate::grants`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub department: Department,
    pub designation: String,
    pub role_id: Option<RoleId>,
    pub permissions: BTreeSet<Permission>,
    pub is_active: bool,
    pub joining_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Employee {
    type Id = EmployeeId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Input for adding an employee.
#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub department: Department,
    pub designation: String,
    pub role_id: Option<RoleId>,
    pub permissions: BTreeSet<Permission>,
    /// Defaults to the creation date.
    pub joining_date: Option<NaiveDate>,
}

/// Partial edit of an employee. `None` leaves a field untouched;
/// `role_id: Some(None)` clears the role.
#[derive(Debug, Clone, Default)]
pub struct EmployeeChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<Department>,
    pub designation: Option<String>,
    pub role_id: Option<Option<RoleId>>,
    pub joining_date: Option<NaiveDate>,
}

/// Filters for the employee table.
#[derive(Debug, Clone, Default)]
pub struct EmployeeQuery {
    /// Case-insensitive substring over name, email and designation.
    pub search: Option<String>,
    pub department: Option<Department>,
    pub active: Option<bool>,
    pub role_id: Option<RoleId>,
}

impl EmployeeQuery {
    pub fn matches(&self, employee: &Employee) -> bool {
        if let Some(department) = self.department {
            if employee.department != department {
                return false;
            }
        }
        if let Some(active) = self.active {
            if employee.is_active != active {
                return false;
            }
        }
        if let Some(role_id) = self.role_id {
            if employee.role_id != Some(role_id) {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => {
                let needle = needle.to_lowercase();
                employee.name.to_lowercase().contains(&needle)
                    || employee.email.contains(&needle)
                    || employee.designation.to_lowercase().contains(&needle)
            }
            _ => true,
        }
    }
}

pub(crate) fn normalize_name(raw: &str) -> DomainResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(DomainError::validation("employee name cannot be empty"));
    }
    Ok(name.to_string())
}

pub(crate) fn normalize_email(raw: &str) -> DomainResult<String> {
    let email = raw.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    };
    if !valid {
        return Err(DomainError::validation("invalid email format"));
    }
    Ok(email)
}

/// Phone numbers are optional; when present they may contain digits,
/// spaces and `+ - ( )` only.
pub(crate) fn normalize_phone(raw: &str) -> DomainResult<String> {
    let phone = raw.trim();
    let valid = phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | ' '));
    if !valid {
        return Err(DomainError::validation("invalid phone number"));
    }
    Ok(phone.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee(name: &str, email: &str, designation: &str) -> Employee {
        let now = Utc::now();
        Employee {
            id: EmployeeId::new(),
            name: name.to_string(),
            email: email.to_string(),
            phone: String::new(),
            department: Department::Loans,
            designation: designation.to_string(),
            role_id: None,
            permissions: BTreeSet::new(),
            is_active: true,
            joining_date: now.date_naive(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn email_is_trimmed_and_lowercased() {
        assert_eq!(
            normalize_email("  Priya.N@Example.COM ").unwrap(),
            "priya.n@example.com"
        );
    }

    #[test]
    fn email_requires_local_and_domain_parts() {
        assert!(normalize_email("priya").is_err());
        assert!(normalize_email("@example.com").is_err());
        assert!(normalize_email("priya@").is_err());
        assert!(normalize_email("a@b@c").is_err());
    }

    #[test]
    fn blank_name_is_rejected() {
        assert!(normalize_name("   ").is_err());
    }

    #[test]
    fn phone_allows_common_punctuation() {
        assert_eq!(normalize_phone(" +977 (1) 555-0101 ").unwrap(), "+977 (1) 555-0101");
        assert!(normalize_phone("call me").is_err());
        assert_eq!(normalize_phone("").unwrap(), "");
    }

    #[test]
    fn query_search_is_case_insensitive_over_name_email_designation() {
        let e = employee("Anil Shrestha", "anil@example.com", "Loan Officer");

        let by_name = EmployeeQuery { search: Some("shrestha".into()), ..Default::default() };
        let by_designation = EmployeeQuery { search: Some("LOAN".into()), ..Default::default() };
        let miss = EmployeeQuery { search: Some("visa".into()), ..Default::default() };

        assert!(by_name.matches(&e));
        assert!(by_designation.matches(&e));
        assert!(!miss.matches(&e));
    }

    #[test]
    fn query_filters_combine() {
        let mut e = employee("Mina", "mina@example.com", "Advisor");
        e.is_active = false;

        let q = EmployeeQuery {
            department: Some(Department::Loans),
            active: Some(false),
            ..Default::default()
        };
        assert!(q.matches(&e));

        let q = EmployeeQuery { active: Some(true), ..Default::default() };
        assert!(!q.matches(&e));
    }
}
