//! Free-text search over the (already permitted) navigation tree.

use crate::MenuNode;

/// Narrow `tree` to nodes whose title contains `query` (case-insensitive).
///
/// - Blank query: the tree is returned unchanged.
/// - A node whose own title matches keeps its full original subtree.
/// - A node kept only because of matching descendants keeps just those.
pub fn filter_by_query(tree: &[MenuNode], query: &str) -> Vec<MenuNode> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return tree.to_vec();
    }
    tree.iter().filter_map(|node| search(node, &needle)).collect()
}

fn search(node: &MenuNode, needle: &str) -> Option<MenuNode> {
    if node.title.to_lowercase().contains(needle) {
        return Some(node.clone());
    }
    let children: Vec<MenuNode> = node.children.iter().filter_map(|c| search(c, needle)).collect();
    if children.is_empty() {
        None
    } else {
        Some(node.with_filtered_children(children))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inventory() -> MenuNode {
        MenuNode::new("Inventory").with_children(vec![
            MenuNode::new("Stock Levels"),
            MenuNode::new("Transfers").with_children(vec![
                MenuNode::new("Outgoing stock"),
                MenuNode::new("Incoming"),
            ]),
            MenuNode::new("Suppliers"),
        ])
    }

    #[test]
    fn blank_query_is_identity() {
        let tree = vec![inventory()];
        assert_eq!(filter_by_query(&tree, ""), tree);
        assert_eq!(filter_by_query(&tree, "   "), tree);
    }

    #[test]
    fn descendant_match_narrows_precisely() {
        let out = filter_by_query(&[inventory()], "STOCK");
        assert_eq!(
            out,
            vec![MenuNode::new("Inventory").with_children(vec![
                MenuNode::new("Stock Levels"),
                MenuNode::new("Transfers").with_children(vec![MenuNode::new("Outgoing stock")]),
            ])]
        );
    }

    #[test]
    fn category_match_reveals_all_children() {
        let out = filter_by_query(&[inventory()], "invent");
        assert_eq!(out, vec![inventory()]);

        let out = filter_by_query(&[inventory()], "transfer");
        assert_eq!(out[0].children.len(), 1);
        assert_eq!(out[0].children[0].children.len(), 2);
    }

    #[test]
    fn no_match_yields_empty_tree() {
        assert!(filter_by_query(&[inventory()], "payroll").is_empty());
    }
}
