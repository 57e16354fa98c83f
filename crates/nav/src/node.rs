use serde::{Deserialize, Serialize};

/// One entry of the navigation tree.
///
/// Trees are ordered and acyclic; a node is identified by its position, not
/// by an id. A node with children is a grouping; a node without is a leaf.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuNode {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Feature module gating this node and its subtree.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuNode>,
}

impl MenuNode {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn with_resource(mut self, resource: impl Into<String>, action: Option<&str>) -> Self {
        self.resource = Some(resource.into());
        self.action = action.map(str::to_string);
        self
    }

    pub fn with_children(mut self, children: Vec<MenuNode>) -> Self {
        self.children = children;
        self
    }

    pub fn is_group(&self) -> bool {
        !self.children.is_empty()
    }

    /// Copy of this node's own fields with `children` replaced.
    pub(crate) fn with_filtered_children(&self, children: Vec<MenuNode>) -> Self {
        Self {
            title: self.title.clone(),
            path: self.path.clone(),
            module: self.module.clone(),
            resource: self.resource.clone(),
            action: self.action.clone(),
            children,
        }
    }
}

/// Total number of nodes in `tree`, descendants included.
pub fn count_nodes(tree: &[MenuNode]) -> usize {
    tree.iter().map(|n| 1 + count_nodes(&n.children)).sum()
}
