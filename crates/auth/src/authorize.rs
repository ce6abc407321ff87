use std::collections::BTreeSet;

use serde::Serialize;
use thiserror::Error;

use consultdesk_core::TenantId;

use crate::{Permission, PrincipalId, Role, TenantMembership};

/// A fully resolved principal for authorization decisions.
///
/// Construction of this object is intentionally decoupled from storage and
/// transport: the API derives memberships from token claims and the tenant's
/// role catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub principal_id: PrincipalId,
    pub active_tenant_id: TenantId,
    pub membership: TenantMembership,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("tenant mismatch")]
    TenantMismatch,

    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),
}

/// Authorize a principal within its active tenant context.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn authorize(principal: &Principal, required: &Permission) -> Result<(), AuthzError> {
    if principal.active_tenant_id != principal.membership.tenant_id {
        return Err(AuthzError::TenantMismatch);
    }

    let granted = principal
        .membership
        .permissions
        .iter()
        .any(|p| p.is_wildcard() || p == required);

    if granted {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization Explanation (Audit Trail)
// ─────────────────────────────────────────────────────────────────────────────

/// Detailed explanation of an authorization decision.
///
/// Answers "why was this request allowed/denied?" for the access review
/// screens.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationExplanation {
    /// The permission that was being checked.
    pub required_permission: String,

    /// Whether the authorization was granted.
    pub granted: bool,

    /// Human-readable reason for the decision.
    pub reason: String,

    /// Details about the principal's state.
    pub principal: PrincipalState,

    /// If denied, this explains what was missing.
    pub denial_reason: Option<DenialReason>,
}

/// Current state of the principal being checked.
#[derive(Debug, Clone, Serialize)]
pub struct PrincipalState {
    pub principal_id: PrincipalId,
    pub active_tenant_id: TenantId,
    pub membership_tenant_id: TenantId,
    pub roles: Vec<String>,
    pub effective_permissions: Vec<String>,
    pub has_wildcard: bool,
}

/// Detailed reason why authorization was denied.
#[derive(Debug, Clone, Serialize)]
pub struct DenialReason {
    pub kind: DenialKind,
    pub message: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    TenantMismatch,
    MissingPermission,
}

/// Explain why an authorization decision was made (or would be made).
///
/// `role_permissions` maps each of the principal's roles to the permissions
/// the role catalog grants it. Effective permissions are the union of those
/// and the membership's explicit permissions.
pub fn explain_authorization<F>(
    principal: &Principal,
    required: &Permission,
    role_permissions: F,
) -> AuthorizationExplanation
where
    F: Fn(&Role) -> Vec<Permission>,
{
    let required_str = required.as_str();
    let roles: Vec<String> = principal
        .membership
        .roles
        .iter()
        .map(|r| r.as_str().to_string())
        .collect();

    if principal.active_tenant_id != principal.membership.tenant_id {
        let explicit: Vec<String> = principal
            .membership
            .permissions
            .iter()
            .map(|p| p.as_str().to_string())
            .collect();
        let has_wildcard = principal.membership.permissions.iter().any(|p| p.is_wildcard());

        return AuthorizationExplanation {
            required_permission: required_str.to_string(),
            granted: false,
            reason: format!(
                "Tenant mismatch: principal is active in tenant {} but membership is for tenant {}",
                principal.active_tenant_id, principal.membership.tenant_id
            ),
            principal: PrincipalState {
                principal_id: principal.principal_id,
                active_tenant_id: principal.active_tenant_id,
                membership_tenant_id: principal.membership.tenant_id,
                roles,
                effective_permissions: explicit,
                has_wildcard,
            },
            denial_reason: Some(DenialReason {
                kind: DenialKind::TenantMismatch,
                message: "Principal is authenticated in a different tenant than their membership"
                    .to_string(),
                suggestions: vec![
                    "Verify the tenant_id in the token matches the principal's tenant membership"
                        .to_string(),
                ],
            }),
        };
    }

    // BTreeSet keeps the listing sorted for readability.
    let mut effective: BTreeSet<Permission> = BTreeSet::new();
    for role in &principal.membership.roles {
        effective.extend(role_permissions(role));
    }
    effective.extend(principal.membership.permissions.iter().cloned());

    let has_wildcard = effective.iter().any(Permission::is_wildcard);
    let has_required = effective.contains(required);
    let effective_list: Vec<String> = effective.iter().map(|p| p.as_str().to_string()).collect();

    let state = PrincipalState {
        principal_id: principal.principal_id,
        active_tenant_id: principal.active_tenant_id,
        membership_tenant_id: principal.membership.tenant_id,
        roles,
        effective_permissions: effective_list.clone(),
        has_wildcard,
    };

    if has_required || has_wildcard {
        let reason = if has_required {
            format!("Principal holds permission '{required_str}'")
        } else {
            "Principal has wildcard permission '*' (granted by the admin role)".to_string()
        };

        return AuthorizationExplanation {
            required_permission: required_str.to_string(),
            granted: true,
            reason,
            principal: state,
            denial_reason: None,
        };
    }

    AuthorizationExplanation {
        required_permission: required_str.to_string(),
        granted: false,
        reason: format!(
            "Principal does not have permission '{required_str}'. Current permissions: {effective_list:?}"
        ),
        principal: state,
        denial_reason: Some(DenialReason {
            kind: DenialKind::MissingPermission,
            message: format!("Missing required permission: '{required_str}'"),
            suggestions: vec![
                format!("Assign a role that grants the '{required_str}' permission"),
                format!("Grant the '{required_str}' permission directly through an assignment"),
            ],
        }),
    }
}
