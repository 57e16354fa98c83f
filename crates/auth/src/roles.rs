use serde::{Deserialize, Serialize};

use opsdash_core::sanitize_identifier;

/// A role as delivered by the identity provider.
///
/// Providers are inconsistent: some send a bare string, some an object with a
/// `slug` and/or display `name`. Callers never inspect the shape directly; they
/// go through [`RoleRef::token`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoleRef {
    Name(String),
    Object {
        #[serde(default)]
        slug: Option<String>,
        #[serde(default)]
        name: Option<String>,
    },
}

impl RoleRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// Normalized comparison token (slug preferred over display name).
    pub fn token(&self) -> Option<RoleToken> {
        match self {
            RoleRef::Name(name) => RoleToken::normalize(name),
            RoleRef::Object { slug, name } => slug
                .as_deref()
                .and_then(RoleToken::normalize)
                .or_else(|| name.as_deref().and_then(RoleToken::normalize)),
        }
    }

    /// Human-readable label, as received.
    pub fn label(&self) -> Option<&str> {
        match self {
            RoleRef::Name(name) => sanitize_identifier(name),
            RoleRef::Object { slug, name } => name
                .as_deref()
                .and_then(sanitize_identifier)
                .or_else(|| slug.as_deref().and_then(sanitize_identifier)),
        }
    }
}

/// Lowercase, separator-insensitive role name.
///
/// `"Super-Admin"`, `"super_admin"` and `"super admin"` all normalize to
/// `super_admin`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleToken(String);

impl RoleToken {
    pub fn normalize(raw: &str) -> Option<Self> {
        let raw = sanitize_identifier(raw)?;
        let mut token = String::with_capacity(raw.len());
        for ch in raw.chars() {
            let ch = match ch {
                '-' | ' ' | '.' => '_',
                other => other.to_ascii_lowercase(),
            };
            // collapse runs of separators
            if ch == '_' && token.ends_with('_') {
                continue;
            }
            token.push(ch);
        }
        let token = token.trim_matches('_');
        if token.is_empty() {
            None
        } else {
            Some(Self(token.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for RoleToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonical role used for every access decision.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalRole {
    SuperAdmin,
    OrganizationOwner,
    Admin,
    OutletManager,
    Cashier,
    Staff,
    #[default]
    Unknown,
}

impl CanonicalRole {
    /// Ordering used to pick the strongest tenant-level role.
    pub fn rank(self) -> u8 {
        match self {
            CanonicalRole::SuperAdmin => 6,
            CanonicalRole::OrganizationOwner => 5,
            CanonicalRole::Admin => 4,
            CanonicalRole::OutletManager => 3,
            CanonicalRole::Cashier => 2,
            CanonicalRole::Staff => 1,
            CanonicalRole::Unknown => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CanonicalRole::SuperAdmin => "super_admin",
            CanonicalRole::OrganizationOwner => "organization_owner",
            CanonicalRole::Admin => "admin",
            CanonicalRole::OutletManager => "outlet_manager",
            CanonicalRole::Cashier => "cashier",
            CanonicalRole::Staff => "staff",
            CanonicalRole::Unknown => "unknown",
        }
    }
}

impl core::fmt::Display for CanonicalRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
