//! Staff directory for the consultdesk back-office.
//!
//! Employees, roles, the permission catalog and the assignment ledger live
//! here, together with the derived grant relation that answers "who can do
//! what, and why".

pub mod assignment;
pub mod capabilities;
pub mod catalog;
pub mod department;
pub mod directory;
pub mod employee;
pub mod grants;
pub mod role;
pub mod seed;
pub mod store;

pub use assignment::{
    Assignment, AssignmentExport, AssignmentRecord, ImportSummary, EXPORT_FORMAT_VERSION,
};
pub use catalog::{
    NewPermission, PermissionChanges, PermissionDefinition, PermissionSummary, RiskLevel,
};
pub use department::Department;
pub use directory::StaffDirectory;
pub use employee::{Employee, EmployeeChanges, EmployeeQuery, NewEmployee};
pub use grants::{CoverageGap, CoverageReport, Grant, GrantedVia};
pub use role::{NewRole, RoleChanges, RoleDefinition, RoleLevel, RoleSummary};
pub use seed::SeedSummary;
pub use store::{InMemoryTenantStore, TenantStore};
