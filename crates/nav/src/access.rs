//! Access rule table and the permission filter built on it.
//!
//! Every node decision walks the same ordered table; the first rule that
//! applies decides:
//!
//! 1. `ElevatedRole`: super-admin or organization owner.
//! 2. `OperationalBypass`: an operational role on an operational module.
//! 3. `NavigationalNode`: the node declares no resource.
//! 4. `PermissionMatch` / `NoMatchingPermission`: the caller's grants.

use serde::{Deserialize, Serialize};

use opsdash_auth::{CanonicalRole, Classification, PermissionEntry, PermissionGrant, any_grant_matches, parse_grants};
use opsdash_core::modules::normalize_module_key;

use crate::MenuNode;

/// The rule that produced an access decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessRule {
    ElevatedRole,
    OperationalBypass,
    NavigationalNode,
    PermissionMatch,
    NoMatchingPermission,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AccessDecision {
    pub granted: bool,
    pub rule: AccessRule,
}

impl AccessDecision {
    fn grant(rule: AccessRule) -> Self {
        Self { granted: true, rule }
    }

    fn deny(rule: AccessRule) -> Self {
        Self { granted: false, rule }
    }
}

/// Operational bypass table.
///
/// One table serves both the "configured" and the "permitted" menu; there is
/// no second bypass layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessPolicy {
    pub operational_roles: Vec<CanonicalRole>,
    pub operational_modules: Vec<String>,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self {
            operational_roles: vec![CanonicalRole::OutletManager, CanonicalRole::Cashier, CanonicalRole::Staff],
            operational_modules: ["pos", "orders", "shifts", "customers"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl AccessPolicy {
    /// Decide a single node.
    pub fn decide(&self, node: &MenuNode, grants: &[PermissionGrant], classification: &Classification) -> AccessDecision {
        if elevated_role(classification) {
            return AccessDecision::grant(AccessRule::ElevatedRole);
        }
        if self.operational_bypass(node, classification) {
            return AccessDecision::grant(AccessRule::OperationalBypass);
        }
        let Some(resource) = node.resource.as_deref().filter(|r| !r.trim().is_empty()) else {
            return AccessDecision::grant(AccessRule::NavigationalNode);
        };
        if any_grant_matches(grants, resource, node.action.as_deref()) {
            AccessDecision::grant(AccessRule::PermissionMatch)
        } else {
            AccessDecision::deny(AccessRule::NoMatchingPermission)
        }
    }

    /// Rule 2: operational roles see operational modules without explicit grants.
    pub fn operational_bypass(&self, node: &MenuNode, classification: &Classification) -> bool {
        let Some(module) = node.module.as_deref() else {
            return false;
        };
        let module = normalize_module_key(module);
        self.operational_roles.contains(&classification.role)
            && self
                .operational_modules
                .iter()
                .any(|m| normalize_module_key(m) == module)
    }

    /// Remove nodes the caller may not see, pruning groupings left empty.
    ///
    /// A grouping survives only through its surviving children; a leaf
    /// survives on its own decision. Malformed permission entries are skipped.
    pub fn filter(
        &self,
        tree: &[MenuNode],
        permissions: &[PermissionEntry],
        classification: &Classification,
    ) -> Vec<MenuNode> {
        let grants = parse_grants(permissions);
        self.filter_with_grants(tree, &grants, classification)
    }

    pub fn filter_with_grants(
        &self,
        tree: &[MenuNode],
        grants: &[PermissionGrant],
        classification: &Classification,
    ) -> Vec<MenuNode> {
        tree.iter()
            .filter_map(|node| self.filter_node(node, grants, classification))
            .collect()
    }

    fn filter_node(&self, node: &MenuNode, grants: &[PermissionGrant], classification: &Classification) -> Option<MenuNode> {
        if node.is_group() {
            let children = self.filter_with_grants(&node.children, grants, classification);
            if children.is_empty() {
                tracing::trace!(title = %node.title, "menu grouping pruned: no accessible children");
                return None;
            }
            return Some(node.with_filtered_children(children));
        }

        let decision = self.decide(node, grants, classification);
        if decision.granted {
            Some(node.clone())
        } else {
            tracing::trace!(title = %node.title, rule = ?decision.rule, "menu node denied");
            None
        }
    }
}

/// Rule 1.
pub fn elevated_role(classification: &Classification) -> bool {
    classification.is_elevated()
}

/// Permission filter with the default bypass table.
pub fn filter_by_permission(
    tree: &[MenuNode],
    permissions: &[PermissionEntry],
    classification: &Classification,
) -> Vec<MenuNode> {
    AccessPolicy::default().filter(tree, permissions, classification)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
