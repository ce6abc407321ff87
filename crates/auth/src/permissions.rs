use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use consultdesk_core::DomainError;

/// Permission identifier.
///
/// Permissions are modeled as opaque strings (e.g. "view_reports").
/// A special wildcard permission `"*"` can be used by policy layers to indicate
/// "allow all" without hardcoding catalog permissions into tokens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// Parse user-supplied input into a permission identifier.
    ///
    /// Identifiers are trimmed and must consist of lowercase ASCII letters,
    /// digits, `_` and `.`; the wildcard `*` is accepted as-is.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        if trimmed == "*" {
            return Ok(Self::wildcard());
        }
        if trimmed.is_empty() {
            return Err(DomainError::validation("permission identifier cannot be empty"));
        }
        let valid = trimmed
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '.');
        if !valid {
            return Err(DomainError::validation(format!(
                "invalid permission identifier '{trimmed}': use lowercase letters, digits, '_' or '.'"
            )));
        }
        Ok(Self(Cow::Owned(trimmed.to_string())))
    }

    pub fn wildcard() -> Self {
        Self::from_static("*")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.as_str() == "*"
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_and_accepts_snake_case() {
        let p = Permission::parse("  view_reports ").unwrap();
        assert_eq!(p.as_str(), "view_reports");
        assert!(!p.is_wildcard());
    }

    #[test]
    fn parse_accepts_wildcard() {
        assert!(Permission::parse("*").unwrap().is_wildcard());
    }

    #[test]
    fn parse_rejects_uppercase_and_spaces() {
        assert!(Permission::parse("View_Reports").is_err());
        assert!(Permission::parse("view reports").is_err());
        assert!(Permission::parse("").is_err());
    }

    #[test]
    fn static_and_owned_compare_equal() {
        assert_eq!(
            Permission::from_static("manage_roles"),
            Permission::new(String::from("manage_roles"))
        );
    }
}
