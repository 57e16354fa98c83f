//! Raw navigation definitions keyed by role and context.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use opsdash_auth::CanonicalRole;
use opsdash_core::{BusinessUnitRef, OrganizationId, OutletId};

use crate::MenuNode;

/// What a raw menu is selected by.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NavKey {
    pub role: CanonicalRole,
    pub business_unit: Option<BusinessUnitRef>,
    pub outlet_id: Option<OutletId>,
    pub organization_id: Option<OrganizationId>,
}

/// Supplies the unfiltered menu for a role/context pair.
pub trait NavigationTreeSource {
    fn menu(&self, key: &NavKey) -> Vec<MenuNode>;
}

/// Role → menu table with a `default` entry for unlisted roles.
///
/// Paths may contain `{businessUnit}`, `{outlet}` and `{organization}`
/// placeholders; they are filled from the key. A node whose path needs a value
/// the key does not have keeps no path (it still renders as a label).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticMenuSource {
    pub roles: HashMap<CanonicalRole, Vec<MenuNode>>,
    #[serde(rename = "default")]
    pub fallback: Vec<MenuNode>,
}

impl NavigationTreeSource for StaticMenuSource {
    fn menu(&self, key: &NavKey) -> Vec<MenuNode> {
        let template = self.roles.get(&key.role).unwrap_or(&self.fallback);
        template.iter().map(|node| fill(node, key)).collect()
    }
}

fn fill(node: &MenuNode, key: &NavKey) -> MenuNode {
    let mut filled = node.with_filtered_children(node.children.iter().map(|c| fill(c, key)).collect());
    filled.path = node.path.as_deref().and_then(|path| fill_path(path, key));
    filled
}

fn fill_path(path: &str, key: &NavKey) -> Option<String> {
    let substitutions = [
        ("{businessUnit}", key.business_unit.as_ref().map(BusinessUnitRef::as_str)),
        ("{outlet}", key.outlet_id.as_ref().map(OutletId::as_str)),
        ("{organization}", key.organization_id.as_ref().map(OrganizationId::as_str)),
    ];
    let mut out = path.to_string();
    for (placeholder, value) in substitutions {
        if out.contains(placeholder) {
            out = out.replace(placeholder, value?);
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> StaticMenuSource {
        serde_json::from_str(
            r#"{
                "roles": {
                    "cashier": [{"title": "Register", "path": "/{businessUnit}/outlets/{outlet}/pos"}]
                },
                "default": [{"title": "Dashboard", "path": "/{businessUnit}/dashboard"}]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn placeholders_are_filled_from_key() {
        let key = NavKey {
            role: CanonicalRole::Cashier,
            business_unit: BusinessUnitRef::parse("acme-shop"),
            outlet_id: OutletId::parse("out-1"),
            organization_id: None,
        };
        let menu = source().menu(&key);
        assert_eq!(menu[0].path.as_deref(), Some("/acme-shop/outlets/out-1/pos"));
    }

    #[test]
    fn unknown_role_uses_fallback_and_missing_values_drop_path() {
        let key = NavKey {
            role: CanonicalRole::Staff,
            ..NavKey::default()
        };
        let menu = source().menu(&key);
        assert_eq!(menu[0].title, "Dashboard");
        assert_eq!(menu[0].path, None);
    }
}
