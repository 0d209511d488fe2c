//! Domain models for organization trees.
//!
//! A tenant owns exactly one tree. Org units (tenant root, branches,
//! departments) form the interior of the tree and leaves (staff records)
//! hang off any unit.

pub mod leaf_node;
pub mod org_node;
pub mod org_tree;

pub use leaf_node::{LeafNode, UpdateLeafNode};
pub use org_node::{CreateOrgNode, OrgNode, OrgType, UpdateOrgNode};
pub use org_tree::OrgTree;
