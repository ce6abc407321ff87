use chrono::Utc;

use consultdesk_auth::Permission;
use consultdesk_core::{DomainError, DomainResult, RoleId, TenantId};

use super::StaffDirectory;
use crate::employee::Employee;
use crate::role::{normalize_role_name, NewRole, RoleChanges, RoleDefinition, RoleLevel, RoleSummary};
use crate::store::TenantStore;

impl StaffDirectory {
    pub fn add_role(&self, tenant_id: TenantId, input: NewRole, actor: &str) -> DomainResult<RoleDefinition> {
        let name = normalize_role_name(&input.name)?;
        let level = RoleLevel::new(input.level)?;

        let _gate = self.write_gate()?;
        self.ensure_role_name_free(tenant_id, &name, None)?;
        self.ensure_grantable(tenant_id, &input.permissions)?;

        let now = Utc::now();
        let role = RoleDefinition {
            id: RoleId::new(),
            name,
            description: input.description.trim().to_string(),
            department: input.department,
            level,
            permissions: input.permissions,
            created_at: now,
            updated_at: now,
        };
        self.roles.save(tenant_id, role.clone());

        tracing::info!(%tenant_id, role_id = %role.id, role = %role.name, actor, "role added");
        Ok(role)
    }

    /// Edits take effect for every holder immediately; role grants are
    /// resolved at read time.
    pub fn update_role(
        &self,
        tenant_id: TenantId,
        role_id: RoleId,
        changes: RoleChanges,
        actor: &str,
    ) -> DomainResult<RoleDefinition> {
        let _gate = self.write_gate()?;
        let mut role = self
            .roles
            .get(tenant_id, &role_id)
            .ok_or(DomainError::not_found("role"))?;

        if let Some(name) = changes.name {
            let name = normalize_role_name(&name)?;
            self.ensure_role_name_free(tenant_id, &name, Some(role_id))?;
            role.name = name;
        }
        if let Some(description) = changes.description {
            role.description = description.trim().to_string();
        }
        if let Some(department) = changes.department {
            role.department = department;
        }
        if let Some(level) = changes.level {
            role.level = RoleLevel::new(level)?;
        }
        if let Some(permissions) = changes.permissions {
            self.ensure_grantable(tenant_id, &permissions)?;
            role.permissions = permissions;
        }
        role.updated_at = Utc::now();
        self.roles.save(tenant_id, role.clone());

        tracing::info!(%tenant_id, %role_id, actor, "role updated");
        Ok(role)
    }

    /// Removes the role and detaches it from its holders. Holders keep their
    /// direct permissions; only the role-derived grants disappear.
    pub fn delete_role(&self, tenant_id: TenantId, role_id: RoleId, actor: &str) -> DomainResult<RoleDefinition> {
        let _gate = self.write_gate()?;
        let role = self
            .roles
            .remove(tenant_id, &role_id)
            .ok_or(DomainError::not_found("role"))?;

        let now = Utc::now();
        let mut detached = 0usize;
        for mut employee in self.employees.list(tenant_id) {
            if employee.role_id == Some(role_id) {
                employee.role_id = None;
                employee.updated_at = now;
                self.employees.save(tenant_id, employee);
                detached += 1;
            }
        }

        tracing::info!(%tenant_id, %role_id, detached, actor, "role deleted");
        Ok(role)
    }

    pub fn get_role(&self, tenant_id: TenantId, role_id: RoleId) -> DomainResult<RoleSummary> {
        let _gate = self.read_gate()?;
        let role = self
            .roles
            .get(tenant_id, &role_id)
            .ok_or(DomainError::not_found("role"))?;
        let employees = self.employees.list(tenant_id);
        Ok(summarize(role, &employees))
    }

    pub fn list_roles(&self, tenant_id: TenantId) -> DomainResult<Vec<RoleSummary>> {
        let _gate = self.read_gate()?;
        let employees = self.employees.list(tenant_id);
        Ok(self
            .roles
            .list(tenant_id)
            .into_iter()
            .map(|r| summarize(r, &employees))
            .collect())
    }

    pub fn find_role_by_name(&self, tenant_id: TenantId, name: &str) -> Option<RoleDefinition> {
        self.roles
            .list(tenant_id)
            .into_iter()
            .find(|r| r.has_name(name))
    }

    /// Active catalog permissions granted by the role called `name`, or
    /// nothing when no such role exists.
    pub fn role_permissions_by_name(&self, tenant_id: TenantId, name: &str) -> Vec<Permission> {
        let Some(role) = self.find_role_by_name(tenant_id, name) else {
            return Vec::new();
        };
        let active = self.active_catalog(tenant_id);
        role.permissions
            .into_iter()
            .filter(|p| active.contains(p))
            .collect()
    }

    fn ensure_role_name_free(&self, tenant_id: TenantId, name: &str, except: Option<RoleId>) -> DomainResult<()> {
        let taken = self
            .roles
            .list(tenant_id)
            .iter()
            .any(|r| r.has_name(name) && Some(r.id) != except);
        if taken {
            return Err(DomainError::conflict(format!("role '{name}' already exists")));
        }
        Ok(())
    }
}

fn summarize(role: RoleDefinition, employees: &[Employee]) -> RoleSummary {
    let employee_count = employees
        .iter()
        .filter(|e| e.role_id == Some(role.id))
        .count();
    RoleSummary { role, employee_count }
}
