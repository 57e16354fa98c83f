//! Dashboard configuration: the role, route and access tables.

use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use opsdash_auth::RolePolicy;
use opsdash_context::RoutePolicy;
use opsdash_nav::AccessPolicy;

/// Environment variable naming the JSON config file.
pub const CONFIG_ENV: &str = "OPSDASH_CONFIG";

/// Every section falls back to the built-in tables when omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub roles: RolePolicy,
    pub routes: RoutePolicy,
    pub access: AccessPolicy,
}

impl DashboardConfig {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Load from `$OPSDASH_CONFIG`, or the built-in defaults when it is unset.
    pub fn from_env() -> anyhow::Result<Self> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::load(path),
            _ => {
                tracing::warn!("{CONFIG_ENV} not set; using built-in policy tables");
                Ok(Self::default())
            }
        }
    }
}
