use chrono::Utc;

use consultdesk_auth::Permission;
use consultdesk_core::{DomainError, DomainResult, TenantId};

use super::StaffDirectory;
use crate::catalog::{
    ensure_catalogable, normalize_label, NewPermission, PermissionChanges, PermissionDefinition,
    PermissionSummary,
};
use crate::grants;
use crate::store::TenantStore;

impl StaffDirectory {
    pub fn add_permission(
        &self,
        tenant_id: TenantId,
        input: NewPermission,
        actor: &str,
    ) -> DomainResult<PermissionDefinition> {
        ensure_catalogable(&input.permission)?;
        let name = normalize_label("permission name", &input.name)?;
        let category = normalize_label("permission category", &input.category)?;

        let _gate = self.write_gate()?;
        if self.catalog.get(tenant_id, &input.permission).is_some() {
            return Err(DomainError::conflict(format!(
                "permission '{}' already exists",
                input.permission
            )));
        }

        let now = Utc::now();
        let definition = PermissionDefinition {
            permission: input.permission,
            name,
            description: input.description.trim().to_string(),
            category,
            risk_level: input.risk_level,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.catalog.save(tenant_id, definition.clone());

        tracing::info!(%tenant_id, permission = %definition.permission, risk = %definition.risk_level, actor, "permission catalogued");
        Ok(definition)
    }

    pub fn update_permission(
        &self,
        tenant_id: TenantId,
        permission: &Permission,
        changes: PermissionChanges,
        actor: &str,
    ) -> DomainResult<PermissionDefinition> {
        let _gate = self.write_gate()?;
        let mut definition = self
            .catalog
            .get(tenant_id, permission)
            .ok_or(DomainError::not_found("permission"))?;

        if let Some(name) = changes.name {
            definition.name = normalize_label("permission name", &name)?;
        }
        if let Some(category) = changes.category {
            definition.category = normalize_label("permission category", &category)?;
        }
        if let Some(description) = changes.description {
            definition.description = description.trim().to_string();
        }
        if let Some(risk_level) = changes.risk_level {
            definition.risk_level = risk_level;
        }
        definition.updated_at = Utc::now();
        self.catalog.save(tenant_id, definition.clone());

        tracing::info!(%tenant_id, %permission, actor, "permission updated");
        Ok(definition)
    }

    /// Inactive permissions stay referenced by roles and employees but are
    /// excluded from effective permissions.
    pub fn toggle_permission_active(
        &self,
        tenant_id: TenantId,
        permission: &Permission,
        actor: &str,
    ) -> DomainResult<PermissionDefinition> {
        let _gate = self.write_gate()?;
        let mut definition = self
            .catalog
            .get(tenant_id, permission)
            .ok_or(DomainError::not_found("permission"))?;

        definition.is_active = !definition.is_active;
        definition.updated_at = Utc::now();
        self.catalog.save(tenant_id, definition.clone());

        tracing::info!(%tenant_id, %permission, is_active = definition.is_active, actor, "permission active flag toggled");
        Ok(definition)
    }

    /// Removes the permission from the catalog and from every role, employee
    /// and assignment of the tenant.
    pub fn delete_permission(
        &self,
        tenant_id: TenantId,
        permission: &Permission,
        actor: &str,
    ) -> DomainResult<PermissionDefinition> {
        let _gate = self.write_gate()?;
        let definition = self
            .catalog
            .remove(tenant_id, permission)
            .ok_or(DomainError::not_found("permission"))?;

        let now = Utc::now();
        let mut roles = 0usize;
        for mut role in self.roles.list(tenant_id) {
            if role.permissions.remove(permission) {
                role.updated_at = now;
                self.roles.save(tenant_id, role);
                roles += 1;
            }
        }
        let mut employees = 0usize;
        for mut employee in self.employees.list(tenant_id) {
            if employee.permissions.remove(permission) {
                employee.updated_at = now;
                self.employees.save(tenant_id, employee);
                employees += 1;
            }
        }
        for mut assignment in self.assignments.list(tenant_id) {
            if assignment.permissions.remove(permission) {
                self.assignments.save(tenant_id, assignment);
            }
        }

        tracing::info!(%tenant_id, %permission, roles, employees, actor, "permission deleted");
        Ok(definition)
    }

    pub fn get_permission(
        &self,
        tenant_id: TenantId,
        permission: &Permission,
    ) -> DomainResult<PermissionSummary> {
        let _gate = self.read_gate()?;
        let definition = self
            .catalog
            .get(tenant_id, permission)
            .ok_or(DomainError::not_found("permission"))?;
        let counts = grants::holder_counts(&self.all_grants(tenant_id));
        let employees = counts.get(permission).copied().unwrap_or(0);
        Ok(PermissionSummary { definition, employees })
    }

    pub fn list_permissions(&self, tenant_id: TenantId) -> DomainResult<Vec<PermissionSummary>> {
        let _gate = self.read_gate()?;
        let counts = grants::holder_counts(&self.all_grants(tenant_id));
        Ok(self
            .catalog
            .list(tenant_id)
            .into_iter()
            .map(|definition| {
                let employees = counts.get(&definition.permission).copied().unwrap_or(0);
                PermissionSummary { definition, employees }
            })
            .collect())
    }
}
