//! Runtime configuration read from the environment.

use std::env;

use anyhow::{Context, bail};

use consultdesk_core::TenantId;

const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub jwt_secret: String,
    pub api_host: String,
    pub api_port: u16,
    /// Tenant that receives the default permission catalog and roles at
    /// startup.
    pub seed_tenant_id: Option<TenantId>,
}

impl ApiConfig {
    pub fn load() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = match lookup("JWT_SECRET").filter(|v| !v.trim().is_empty()) {
            Some(secret) => secret,
            None => {
                tracing::warn!("JWT_SECRET not set; using insecure dev default");
                DEV_JWT_SECRET.to_string()
            }
        };

        let api_host = lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_owned());
        let api_port = match lookup("API_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("invalid API_PORT '{raw}'"))?,
            None => 8080,
        };
        if api_port == 0 {
            bail!("API_PORT must be non-zero");
        }

        let seed_tenant_id = lookup("SEED_TENANT_ID")
            .filter(|value| !value.trim().is_empty())
            .map(|value| {
                value
                    .trim()
                    .parse::<TenantId>()
                    .with_context(|| format!("invalid SEED_TENANT_ID '{value}'"))
            })
            .transpose()?;

        Ok(Self {
            jwt_secret,
            api_host,
            api_port,
            seed_tenant_id,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<ApiConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApiConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.jwt_secret, DEV_JWT_SECRET);
        assert_eq!(cfg.bind_addr(), "0.0.0.0:8080");
        assert!(cfg.seed_tenant_id.is_none());
    }

    #[test]
    fn reads_every_variable() {
        let tenant = TenantId::new();
        let tenant_str = tenant.to_string();
        let cfg = config(&[
            ("JWT_SECRET", "s3cret"),
            ("API_HOST", "127.0.0.1"),
            ("API_PORT", "9000"),
            ("SEED_TENANT_ID", tenant_str.as_str()),
        ])
        .unwrap();

        assert_eq!(cfg.jwt_secret, "s3cret");
        assert_eq!(cfg.bind_addr(), "127.0.0.1:9000");
        assert_eq!(cfg.seed_tenant_id, Some(tenant));
    }

    #[test]
    fn rejects_bad_port_and_tenant() {
        assert!(config(&[("API_PORT", "eighty")]).is_err());
        assert!(config(&[("API_PORT", "0")]).is_err());
        assert!(config(&[("SEED_TENANT_ID", "not-a-uuid")]).is_err());
    }
}
