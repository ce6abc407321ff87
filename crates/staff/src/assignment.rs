//! Assignment ledger records and their portable export format.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use consultdesk_auth::Permission;
use consultdesk_core::{AssignmentId, EmployeeId, Entity};

/// Audited record of the permissions granted directly to one employee.
///
/// The ledger and [`crate::Employee::permissions`] describe the same fact;
/// the directory keeps them equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: AssignmentId,
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub permissions: BTreeSet<Permission>,
    pub assigned_at: DateTime<Utc>,
    pub assigned_by: String,
}

impl Assignment {
    /// Add `permission` if absent, remove it if present. Returns whether the
    /// permission is held afterwards.
    pub fn toggle(&mut self, permission: &Permission) -> bool {
        if self.permissions.remove(permission) {
            false
        } else {
            self.permissions.insert(permission.clone());
            true
        }
    }
}

impl Entity for Assignment {
    type Id = AssignmentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

pub const EXPORT_FORMAT_VERSION: u32 = 1;

/// Portable snapshot of a tenant's assignment ledger.
///
/// Records are keyed by employee email rather than id so a ledger can be
/// moved between tenants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentExport {
    pub format_version: u32,
    pub exported_at: DateTime<Utc>,
    pub records: Vec<AssignmentRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    pub employee_email: String,
    pub permissions: BTreeSet<Permission>,
    pub assigned_by: String,
    pub assigned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub created: usize,
    pub updated: usize,
}
