//! Role catalog records.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use consultdesk_auth::Permission;
use consultdesk_core::{DomainError, DomainResult, Entity, RoleId};

use crate::department::Department;

/// Seniority level of a role, 1 (junior) to 5 (senior).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct RoleLevel(u8);

impl RoleLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(level: u8) -> DomainResult<Self> {
        if !(Self::MIN..=Self::MAX).contains(&level) {
            return Err(DomainError::validation(format!(
                "role level must be between {} and {}, got {level}",
                Self::MIN,
                Self::MAX
            )));
        }
        Ok(Self(level))
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for RoleLevel {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RoleLevel> for u8 {
    fn from(value: RoleLevel) -> Self {
        value.0
    }
}

/// A named, reusable bundle of permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDefinition {
    pub id: RoleId,
    pub name: String,
    pub description: String,
    pub department: Department,
    pub level: RoleLevel,
    pub permissions: BTreeSet<Permission>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RoleDefinition {
    /// Role names are unique per tenant, compared case-insensitively.
    pub fn has_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name.trim())
    }
}

impl Entity for RoleDefinition {
    type Id = RoleId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[derive(Debug, Clone)]
pub struct NewRole {
    pub name: String,
    pub description: String,
    pub department: Department,
    pub level: u8,
    pub permissions: BTreeSet<Permission>,
}

#[derive(Debug, Clone, Default)]
pub struct RoleChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub department: Option<Department>,
    pub level: Option<u8>,
    pub permissions: Option<BTreeSet<Permission>>,
}

/// A role together with the number of employees currently holding it.
#[derive(Debug, Clone, Serialize)]
pub struct RoleSummary {
    #[serde(flatten)]
    pub role: RoleDefinition,
    pub employee_count: usize,
}

pub(crate) fn normalize_role_name(raw: &str) -> DomainResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(DomainError::validation("role name cannot be empty"));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_bounds_are_inclusive() {
        assert!(RoleLevel::new(1).is_ok());
        assert!(RoleLevel::new(5).is_ok());
        assert!(RoleLevel::new(0).is_err());
        assert!(RoleLevel::new(6).is_err());
    }

    #[test]
    fn level_deserialization_is_validated() {
        let ok: RoleLevel = serde_json::from_str("3").unwrap();
        assert_eq!(ok.get(), 3);
        assert!(serde_json::from_str::<RoleLevel>("9").is_err());
    }
}
