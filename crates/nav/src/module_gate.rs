//! Module gate: drops subtrees whose feature module is disabled.

use opsdash_auth::Classification;
use opsdash_core::EnabledModules;

use crate::MenuNode;

/// Remove every node whose `module` is explicitly disabled, with its whole subtree.
///
/// Super-admins bypass the gate. A grouping whose children were all gated
/// away is dropped as well, so no empty grouping survives. Only an explicit
/// `false` gates; an unknown module stays visible.
pub fn filter_by_module(
    tree: &[MenuNode],
    modules: &EnabledModules,
    classification: &Classification,
) -> Vec<MenuNode> {
    if classification.is_super_admin {
        return tree.to_vec();
    }
    tree.iter().filter_map(|node| gate(node, modules)).collect()
}

fn gate(node: &MenuNode, modules: &EnabledModules) -> Option<MenuNode> {
    if let Some(module) = node.module.as_deref() {
        if modules.is_disabled(module) {
            tracing::trace!(title = %node.title, module, "menu node gated by disabled module");
            return None;
        }
    }

    if !node.is_group() {
        return Some(node.clone());
    }

    let children: Vec<MenuNode> = node.children.iter().filter_map(|c| gate(c, modules)).collect();
    if children.is_empty() {
        return None;
    }
    Some(node.with_filtered_children(children))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
