//! Permission entries and resource/action matching.
//!
//! Entries arrive either as strings (`"inventory:read"`, `"inventory_read"`,
//! `"inventory:*"`, `"*"`) or as `{resource, action}` objects. They are parsed
//! once into [`PermissionGrant`]s; malformed entries are dropped at that point
//! and never take part in matching.

use serde::{Deserialize, Serialize};

use opsdash_core::{DomainError, DomainResult};

const WILDCARD: &str = "*";

/// Permission entry as delivered by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PermissionEntry {
    Text(String),
    Structured {
        resource: String,
        #[serde(default)]
        action: Option<String>,
    },
}

impl PermissionEntry {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn structured(resource: impl Into<String>, action: Option<&str>) -> Self {
        Self::Structured {
            resource: resource.into(),
            action: action.map(str::to_string),
        }
    }
}

/// A parsed, normalized permission grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionGrant {
    /// `"*"`: everything.
    Wildcard,
    /// String form, lowercased with `_` folded into `:`.
    Scoped(String),
    /// Object form. `resource` is lowercase alphanumeric only; `None` action means any.
    Structured {
        resource: String,
        action: Option<String>,
    },
}

impl PermissionGrant {
    pub fn parse(entry: &PermissionEntry) -> DomainResult<Self> {
        match entry {
            PermissionEntry::Text(raw) => {
                let normalized = fold_separators(raw);
                if normalized == WILDCARD {
                    return Ok(Self::Wildcard);
                }
                if normalized.is_empty()
                    || normalized.starts_with(':')
                    || normalized.ends_with(':')
                    || normalized.chars().any(char::is_whitespace)
                {
                    return Err(DomainError::validation(format!(
                        "malformed permission entry {raw:?}"
                    )));
                }
                Ok(Self::Scoped(normalized))
            }
            PermissionEntry::Structured { resource, action } => {
                let resource = if resource.trim() == WILDCARD {
                    WILDCARD.to_string()
                } else {
                    alphanumeric_only(resource)
                };
                if resource.is_empty() {
                    return Err(DomainError::validation(
                        "structured permission entry has an empty resource",
                    ));
                }
                let action = action
                    .as_deref()
                    .map(|a| a.trim().to_ascii_lowercase())
                    .filter(|a| !a.is_empty() && a != WILDCARD);
                Ok(Self::Structured { resource, action })
            }
        }
    }

    /// Whether this grant covers `resource` (and `action`, when the node requires one).
    pub fn matches(&self, resource: &str, action: Option<&str>) -> bool {
        let action = action
            .map(|a| a.trim().to_ascii_lowercase())
            .filter(|a| !a.is_empty() && a != WILDCARD);

        match self {
            PermissionGrant::Wildcard => true,
            PermissionGrant::Scoped(entry) => {
                let resource = fold_separators(resource);
                if resource.is_empty() {
                    return false;
                }
                let any_action = format!("{resource}:{WILDCARD}");
                match action {
                    Some(action) => {
                        *entry == format!("{resource}:{}", fold_separators(&action))
                            || *entry == any_action
                    }
                    None => *entry == resource || *entry == any_action,
                }
            }
            PermissionGrant::Structured {
                resource: granted_resource,
                action: granted_action,
            } => {
                let wanted = alphanumeric_only(resource);
                let resource_ok = granted_resource == WILDCARD
                    || resource.trim() == WILDCARD
                    || (!wanted.is_empty() && *granted_resource == wanted);
                let action_ok = match (granted_action, &action) {
                    (Some(granted), Some(wanted)) => granted == wanted,
                    _ => true,
                };
                resource_ok && action_ok
            }
        }
    }
}

/// Parse every entry, skipping (and logging) the malformed ones.
pub fn parse_grants(entries: &[PermissionEntry]) -> Vec<PermissionGrant> {
    entries
        .iter()
        .filter_map(|entry| match PermissionGrant::parse(entry) {
            Ok(grant) => Some(grant),
            Err(err) => {
                tracing::debug!(?entry, %err, "skipping permission entry");
                None
            }
        })
        .collect()
}

/// True if any grant covers `resource`/`action`.
pub fn any_grant_matches(grants: &[PermissionGrant], resource: &str, action: Option<&str>) -> bool {
    grants.iter().any(|g| g.matches(resource, action))
}

fn fold_separators(raw: &str) -> String {
    raw.trim().to_ascii_lowercase().replace('_', ":")
}

fn alphanumeric_only(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn grant(text: &str) -> PermissionGrant {
        PermissionGrant::parse(&PermissionEntry::text(text)).unwrap()
    }

    #[test]
    fn exact_string_matches_with_either_separator() {
        assert!(grant("inventory:read").matches("inventory", Some("read")));
        assert!(grant("Inventory_Read").matches("inventory", Some("read")));
        assert!(grant("purchase_order:create").matches("purchase_order", Some("create")));
        assert!(!grant("inventory:read").matches("inventory", Some("write")));
    }

    #[test]
    fn resource_wildcard_covers_every_action() {
        let g = grant("inventory:*");
        assert!(g.matches("inventory", Some("read")));
        assert!(g.matches("inventory", None));
        assert!(!g.matches("sales", Some("read")));
    }

    #[test]
    fn bare_resource_only_covers_nodes_without_action() {
        let g = grant("reports");
        assert!(g.matches("reports", None));
        assert!(!g.matches("reports", Some("export")));
    }

    #[test]
    fn node_without_action_needs_bare_or_wildcard_grant() {
        assert!(grant("pos:sale").matches("pos:sale", None));
        assert!(grant("reports").matches("reports", None));
        assert!(grant("reports:*").matches("reports", None));
        assert!(!grant("reports:view").matches("reports", None));
        assert!(!grant("reportsx:view").matches("reports", None));
    }

    #[test]
    fn folded_separators_do_not_widen_to_prefix_resources() {
        assert!(!grant("purchase_order:create").matches("purchase", None));
        assert!(!grant("purchase_order").matches("purchase", None));
        assert!(grant("purchase_order").matches("purchase:order", None));
    }

    #[test]
    fn global_wildcard_matches_everything() {
        assert_eq!(grant(" * "), PermissionGrant::Wildcard);
        assert!(grant("*").matches("anything", Some("delete")));
    }

    #[test]
    fn structured_entries_normalize_resource_names() {
        let g = PermissionGrant::parse(&PermissionEntry::structured("Purchase-Orders", Some("READ")))
            .unwrap();
        assert!(g.matches("purchase_orders", Some("read")));
        assert!(!g.matches("purchase_orders", Some("write")));
        assert!(g.matches("PurchaseOrders", None));
    }

    #[test]
    fn structured_wildcards_on_either_side() {
        let any_resource =
            PermissionGrant::parse(&PermissionEntry::structured("*", Some("read"))).unwrap();
        assert!(any_resource.matches("hr", Some("read")));
        assert!(!any_resource.matches("hr", Some("write")));

        let any_action = PermissionGrant::parse(&PermissionEntry::structured("hr", Some("*"))).unwrap();
        assert!(any_action.matches("hr", Some("approve")));
        assert!(any_action.matches("hr", Some("*")));
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let entries = vec![
            PermissionEntry::text(""),
            PermissionEntry::text(":read"),
            PermissionEntry::text("inventory:"),
            PermissionEntry::text("inventory read"),
            PermissionEntry::structured("--", None),
            PermissionEntry::text("sales:read"),
        ];
        let grants = parse_grants(&entries);
        assert_eq!(grants, vec![PermissionGrant::Scoped("sales:read".into())]);
        assert!(any_grant_matches(&grants, "sales", Some("read")));
    }

    #[test]
    fn deserializes_mixed_shapes() {
        let entries: Vec<PermissionEntry> =
            serde_json::from_str(r#"["*", {"resource": "hr"}, {"resource": "pos", "action": "sale"}]"#)
                .unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1], PermissionEntry::structured("hr", None));
    }
}
