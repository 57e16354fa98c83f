//! The fixed filter order: module gate, then permissions, then search.
//!
//! Search runs last so that titles of nodes the caller cannot access never
//! influence (or appear in) search results.

use opsdash_auth::{Classification, PermissionEntry};
use opsdash_core::EnabledModules;

use crate::{AccessPolicy, MenuNode, count_nodes, filter_by_module, filter_by_query};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuPipeline {
    access: AccessPolicy,
}

impl MenuPipeline {
    pub fn new(access: AccessPolicy) -> Self {
        Self { access }
    }

    pub fn access(&self) -> &AccessPolicy {
        &self.access
    }

    pub fn run(
        &self,
        raw: &[MenuNode],
        enabled_modules: &EnabledModules,
        classification: &Classification,
        permissions: &[PermissionEntry],
        query: &str,
    ) -> Vec<MenuNode> {
        let gated = filter_by_module(raw, enabled_modules, classification);
        let permitted = self.access.filter(&gated, permissions, classification);
        let visible = filter_by_query(&permitted, query);

        tracing::debug!(
            role = %classification.role,
            raw = count_nodes(raw),
            gated = count_nodes(&gated),
            permitted = count_nodes(&permitted),
            visible = count_nodes(&visible),
            "menu filtered"
        );
        visible
    }
}

/// Build the caller's visible menu with the default access policy.
pub fn build_visible_menu(
    raw: &[MenuNode],
    enabled_modules: &EnabledModules,
    classification: &Classification,
    permissions: &[PermissionEntry],
    query: &str,
) -> Vec<MenuNode> {
    MenuPipeline::default().run(raw, enabled_modules, classification, permissions, query)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use opsdash_auth::CanonicalRole;
    use proptest::prelude::*;

    fn menu() -> Vec<MenuNode> {
        vec![
            MenuNode::new("Dashboard").with_path("/dashboard"),
            MenuNode::new("Point of Sale")
                .with_module("pos")
                .with_resource("pos:sale", None),
            MenuNode::new("Inventory").with_module("inventory").with_children(vec![
                MenuNode::new("Stock Levels").with_resource("inventory", Some("read")),
                MenuNode::new("Stock Adjustments").with_resource("inventory", Some("write")),
                MenuNode::new("Suppliers").with_resource("suppliers", Some("read")),
            ]),
            MenuNode::new("Secret Payroll").with_resource("hr:payroll", Some("read")),
        ]
    }

    #[test]
    fn search_never_surfaces_denied_titles() {
        let permissions = vec![PermissionEntry::text("inventory:read")];
        let staff = Classification::with_role(CanonicalRole::Staff);
        let out = build_visible_menu(&menu(), &EnabledModules::new(), &staff, &permissions, "payroll");
        assert!(out.is_empty());
    }

    #[test]
    fn full_pipeline_for_cashier() {
        let permissions = vec![PermissionEntry::text("inventory:read"), PermissionEntry::text("suppliers_read")];
        let modules = EnabledModules::new().with("pos", false);
        let cashier = Classification::with_role(CanonicalRole::Cashier);

        let out = build_visible_menu(&menu(), &modules, &cashier, &permissions, "stock");
        assert_eq!(
            out,
            vec![MenuNode::new("Inventory").with_module("inventory").with_children(vec![
                MenuNode::new("Stock Levels").with_resource("inventory", Some("read")),
            ])]
        );
    }

    fn title() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("Stock".to_string()),
            Just("Sales".to_string()),
            Just("Reports".to_string()),
            "[A-Za-z ]{1,8}",
        ]
    }

    fn leaf() -> impl Strategy<Value = MenuNode> {
        (
            title(),
            prop::option::of(prop_oneof![Just("pos"), Just("hr"), Just("inventory")]),
            prop::option::of(prop_oneof![Just("inventory"), Just("sales"), Just("hr")]),
            prop::option::of(prop_oneof![Just("read"), Just("write")]),
        )
            .prop_map(|(title, module, resource, action)| MenuNode {
                title: format!("Leaf {title}"),
                module: module.map(str::to_string),
                resource: resource.map(str::to_string),
                action: action.map(str::to_string),
                ..MenuNode::default()
            })
    }

    fn tree() -> impl Strategy<Value = Vec<MenuNode>> {
        let node = leaf().prop_recursive(3, 32, 4, |inner| {
            (title(), prop::option::of(Just("hr")), prop::collection::vec(inner, 1..4)).prop_map(
                |(title, module, children)| MenuNode {
                    title: format!("Group {title}"),
                    module: module.map(str::to_string),
                    children,
                    ..MenuNode::default()
                },
            )
        });
        prop::collection::vec(node, 0..6)
    }

    fn classification() -> impl Strategy<Value = Classification> {
        prop_oneof![
            Just(Classification::super_admin()),
            Just(Classification::organization_owner()),
            Just(Classification::with_role(CanonicalRole::Cashier)),
            Just(Classification::with_role(CanonicalRole::Admin)),
            Just(Classification::unknown()),
        ]
    }

    fn modules() -> impl Strategy<Value = EnabledModules> {
        (any::<bool>(), any::<bool>(), any::<bool>())
            .prop_map(|(pos, hr, inventory)| {
                EnabledModules::new()
                    .with("pos", pos)
                    .with("hr", hr)
                    .with("inventory", inventory)
            })
    }

    fn permissions() -> impl Strategy<Value = Vec<PermissionEntry>> {
        prop::collection::vec(
            prop_oneof![
                Just(PermissionEntry::text("inventory:read")),
                Just(PermissionEntry::text("sales_write")),
                Just(PermissionEntry::text("hr:*")),
                Just(PermissionEntry::text("")),
                Just(PermissionEntry::structured("Sales", None)),
            ],
            0..4,
        )
    }

    fn groupings_are_never_empty(tree: &[MenuNode]) -> bool {
        tree.iter().all(|n| {
            let own = !n.title.starts_with("Group") || !n.children.is_empty();
            own && groupings_are_never_empty(&n.children)
        })
    }

    fn no_disabled_module(tree: &[MenuNode], modules: &EnabledModules) -> bool {
        tree.iter().all(|n| {
            !n.module.as_deref().is_some_and(|m| modules.is_disabled(m)) && no_disabled_module(&n.children, modules)
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: identical inputs produce structurally identical trees.
        #[test]
        fn pipeline_is_deterministic(
            raw in tree(),
            modules in modules(),
            classification in classification(),
            permissions in permissions(),
            query in prop_oneof![Just(String::new()), Just("stock".to_string()), "[a-z]{1,3}"],
        ) {
            let first = build_visible_menu(&raw, &modules, &classification, &permissions, &query);
            let second = build_visible_menu(&raw, &modules, &classification, &permissions, &query);
            prop_assert_eq!(first, second);
        }

        /// Property: a grouping is either absent or keeps at least one child.
        #[test]
        fn no_orphan_groupings(
            raw in tree(),
            modules in modules(),
            classification in classification(),
            permissions in permissions(),
            query in prop_oneof![Just(String::new()), Just("group".to_string()), "[a-z]{1,3}"],
        ) {
            let out = build_visible_menu(&raw, &modules, &classification, &permissions, &query);
            prop_assert!(groupings_are_never_empty(&out));
        }

        /// Property: disabled modules never survive unless the caller is super-admin.
        #[test]
        fn disabled_modules_are_removed(
            raw in tree(),
            modules in modules(),
            classification in classification(),
        ) {
            let out = filter_by_module(&raw, &modules, &classification);
            if classification.is_super_admin {
                prop_assert_eq!(out, raw);
            } else {
                prop_assert!(no_disabled_module(&out, &modules));
            }
        }

        /// Property: a blank query leaves the permitted tree unchanged.
        #[test]
        fn blank_query_is_identity(raw in tree()) {
            prop_assert_eq!(filter_by_query(&raw, "  "), raw);
        }
    }
}
