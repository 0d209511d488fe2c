//! The tree-store contract.
//!
//! All operations are async and tenant-scoped: every call names the
//! tenant (`mid`) whose tree it works on. Implementations resolve units
//! by id inside that tree; the tenant root is the unit whose id equals
//! `mid`.

use crate::error::TreeResult;
use crate::models::{CreateOrgNode, LeafNode, OrgNode, OrgTree, UpdateLeafNode, UpdateOrgNode};

/// `depth` value for [`TreeStore::get_org_nodes_by_org`] that restricts
/// the listing to immediate children. Any other value lists the whole
/// subtree.
pub const DEPTH_CHILDREN: u32 = 1;

pub trait TreeStore: Send + Sync {
    // -----------------------------------------------------------------------
    // Org units
    // -----------------------------------------------------------------------

    /// Create an org unit and return its id.
    ///
    /// With an empty `pid` the unit becomes the tenant root and its id is
    /// `mid`. Otherwise the parent is resolved inside the tenant's tree and
    /// an id is generated when none is given.
    fn add_org_node(&self, input: CreateOrgNode) -> impl Future<Output = TreeResult<String>> + Send;

    /// Rename an org unit. The unit's subtree moves with it.
    fn modify_org_node(&self, input: UpdateOrgNode) -> impl Future<Output = TreeResult<()>> + Send;

    /// Delete an org unit together with every descendant unit and leaf.
    /// Not transactional: entries removed before a failure stay removed.
    fn del_org_node(&self, mid: &str, id: &str) -> impl Future<Output = TreeResult<()>> + Send;

    fn get_org_node(&self, mid: &str, id: &str) -> impl Future<Output = TreeResult<OrgNode>> + Send;

    /// Units under `pid`. `depth == DEPTH_CHILDREN` lists immediate
    /// children; anything else lists the whole subtree including `pid`.
    fn get_org_nodes_by_org(
        &self,
        mid: &str,
        pid: &str,
        depth: u32,
    ) -> impl Future<Output = TreeResult<Vec<OrgNode>>> + Send;

    /// Materialize the unit `id` with all descendant units and leaves.
    fn get_sub_tree(&self, mid: &str, id: &str) -> impl Future<Output = TreeResult<OrgTree>> + Send;

    /// Ancestors of `id`, nearest first: `[id, parent, .., tenant root]`.
    fn get_parents(
        &self,
        mid: &str,
        id: &str,
    ) -> impl Future<Output = TreeResult<Vec<OrgNode>>> + Send;

    // -----------------------------------------------------------------------
    // Leaves
    // -----------------------------------------------------------------------

    fn add_leaf_node(&self, leaf: LeafNode) -> impl Future<Output = TreeResult<()>> + Send;

    /// Replace a leaf's positions. `positions: None` is a no-op.
    fn modify_leaf_node(&self, input: UpdateLeafNode)
    -> impl Future<Output = TreeResult<()>> + Send;

    fn del_leaf_node(
        &self,
        mid: &str,
        pid: &str,
        uid: &str,
    ) -> impl Future<Output = TreeResult<()>> + Send;

    /// Leaves anywhere under `pid` with login id `uid`. An empty `uid`
    /// matches every leaf.
    fn get_leaf_nodes(
        &self,
        mid: &str,
        pid: &str,
        uid: &str,
    ) -> impl Future<Output = TreeResult<Vec<LeafNode>>> + Send;

    /// Every leaf anywhere under `pid`.
    fn get_leaf_nodes_by_org(
        &self,
        mid: &str,
        pid: &str,
    ) -> impl Future<Output = TreeResult<Vec<LeafNode>>> + Send;

    /// Leaves anywhere under `pid` holding `position_id`.
    fn get_users_by_position(
        &self,
        mid: &str,
        pid: &str,
        position_id: &str,
    ) -> impl Future<Output = TreeResult<Vec<LeafNode>>> + Send;
}
