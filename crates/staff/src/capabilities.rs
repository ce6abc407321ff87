//! Permission identifiers the back-office itself checks.

use consultdesk_auth::Permission;

pub const VIEW_DASHBOARD: Permission = Permission::from_static("view_dashboard");
pub const VIEW_REPORTS: Permission = Permission::from_static("view_reports");
pub const MANAGE_TICKETS: Permission = Permission::from_static("manage_tickets");
pub const MANAGE_EMPLOYEES: Permission = Permission::from_static("manage_employees");
pub const MANAGE_ROLES: Permission = Permission::from_static("manage_roles");
pub const MANAGE_PERMISSIONS: Permission = Permission::from_static("manage_permissions");

pub const MANAGE_OVERSEAS_EDUCATION: Permission =
    Permission::from_static("manage_overseas_education");
pub const MANAGE_LOANS: Permission = Permission::from_static("manage_loans");
pub const MANAGE_DOCUMENTS: Permission = Permission::from_static("manage_documents");
pub const MANAGE_IT_TRAINING: Permission = Permission::from_static("manage_it_training");
pub const MANAGE_CAREER_SUPPORT: Permission = Permission::from_static("manage_career_support");
pub const MANAGE_SETTLEMENT: Permission = Permission::from_static("manage_settlement");
