//! `consultdesk-auth`: pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it knows how to
//! name permissions and roles, validate tokens, and decide (or explain) whether
//! a resolved principal may exercise a permission.

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod permissions;
pub mod principal;
pub mod roles;

pub use authorize::{
    authorize, explain_authorization, AuthorizationExplanation, AuthzError, DenialKind,
    DenialReason, Principal, PrincipalState,
};
pub use claims::{validate_claims, JwtClaims, TokenValidationError};
pub use jwt::{Hs256JwtValidator, JwtValidator};
pub use permissions::Permission;
pub use principal::{PrincipalId, TenantMembership};
pub use roles::Role;
