//! Permission catalog records.

use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use consultdesk_auth::Permission;
use consultdesk_core::{DomainError, DomainResult, Entity};

/// Risk tier of granting a permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl core::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            other => Err(DomainError::validation(format!(
                "risk level must be one of: low, medium, high (got '{other}')"
            ))),
        }
    }
}

/// A catalogued permission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionDefinition {
    pub permission: Permission,
    pub name: String,
    pub description: String,
    pub category: String,
    pub risk_level: RiskLevel,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for PermissionDefinition {
    type Id = Permission;

    fn id(&self) -> &Self::Id {
        &self.permission
    }
}

#[derive(Debug, Clone)]
pub struct NewPermission {
    pub permission: Permission,
    pub name: String,
    pub description: String,
    pub category: String,
    pub risk_level: RiskLevel,
}

/// Partial edit; the identifier itself is immutable.
#[derive(Debug, Clone, Default)]
pub struct PermissionChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub risk_level: Option<RiskLevel>,
}

/// A catalogued permission with the number of active employees that
/// effectively hold it.
#[derive(Debug, Clone, Serialize)]
pub struct PermissionSummary {
    #[serde(flatten)]
    pub definition: PermissionDefinition,
    pub employees: usize,
}

pub(crate) fn ensure_catalogable(permission: &Permission) -> DomainResult<()> {
    if permission.is_wildcard() {
        return Err(DomainError::validation(
            "the wildcard permission cannot be catalogued or granted",
        ));
    }
    if Permission::parse(permission.as_str())? != *permission {
        return Err(DomainError::validation(format!(
            "permission identifier '{permission}' has surrounding whitespace"
        )));
    }
    Ok(())
}

pub(crate) fn normalize_label(field: &'static str, raw: &str) -> DomainResult<String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_level_parses_case_insensitively() {
        assert_eq!("HIGH".parse::<RiskLevel>().unwrap(), RiskLevel::High);
        assert!("critical".parse::<RiskLevel>().is_err());
    }

    #[test]
    fn risk_levels_order_low_to_high() {
        assert!(RiskLevel::Low < RiskLevel::Medium && RiskLevel::Medium < RiskLevel::High);
    }

    #[test]
    fn wildcard_is_not_catalogable() {
        assert!(ensure_catalogable(&Permission::wildcard()).is_err());
        assert!(ensure_catalogable(&Permission::from_static("view_reports")).is_ok());
    }

    #[test]
    fn malformed_identifiers_are_not_catalogable() {
        for raw in ["Bad Id", "view-reports", "", " view_reports"] {
            let err = ensure_catalogable(&Permission::new(raw)).unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)), "{raw:?}");
        }
    }
}
