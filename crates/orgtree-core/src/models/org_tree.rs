//! Materialized subtree snapshot.

use serde::{Deserialize, Serialize};

use super::leaf_node::LeafNode;
use super::org_node::OrgNode;

/// One org unit with every descendant unit and leaf. Detached from the
/// backend once returned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct OrgTree {
    pub node: OrgNode,
    pub sub_trees: Vec<OrgTree>,
    pub sub_leaves: Vec<LeafNode>,
}

impl OrgTree {
    pub fn new(node: OrgNode) -> Self {
        Self {
            node,
            sub_trees: Vec::new(),
            sub_leaves: Vec::new(),
        }
    }

    /// Depth-first search for a unit by id, including `self`.
    pub fn find(&self, id: &str) -> Option<&OrgTree> {
        if self.node.id == id {
            return Some(self);
        }
        self.sub_trees.iter().find_map(|t| t.find(id))
    }

    /// Number of org units in the tree, including the root.
    pub fn unit_count(&self) -> usize {
        1 + self.sub_trees.iter().map(OrgTree::unit_count).sum::<usize>()
    }

    /// Every leaf at every level, parents before children.
    pub fn all_leaves(&self) -> Vec<&LeafNode> {
        let mut out: Vec<&LeafNode> = self.sub_leaves.iter().collect();
        for sub in &self.sub_trees {
            out.extend(sub.all_leaves());
        }
        out
    }
}
