//! Recursive walks over a unit's subtree.
//!
//! Both walks are depth-first on a single session. Materialization is
//! pre-order (unit, child units, leaves); deletion is post-order (leaves,
//! child units, unit) so no entry is removed before its descendants.

use std::pin::Pin;

use orgtree_core::error::{TreeError, TreeResult};
use orgtree_core::models::OrgTree;
use tracing::debug;

use crate::directory::{DirEntry, DirectorySession, SearchScope};
use crate::mapper;
use crate::schema::{self, LEAF_ATTRS, ORG_ATTRS};

/// LDAP "no attributes" selector; only DNs come back.
const DN_ONLY: &[&str] = &["1.1"];

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Build the tree rooted at `entry`.
pub(crate) fn materialize<'a, S: DirectorySession>(
    session: &'a mut S,
    entry: DirEntry,
) -> BoxFuture<'a, TreeResult<OrgTree>> {
    Box::pin(async move {
        debug!(dn = %entry.dn, "materializing unit");
        let mut tree = OrgTree::new(mapper::org_node_from_entry(&entry));

        let children = session
            .search(&entry.dn, SearchScope::SingleLevel, &schema::org_units(), ORG_ATTRS)
            .await
            .map_err(|e| TreeError::from(e).during("list child units"))?;
        for child in children {
            tree.sub_trees.push(materialize(&mut *session, child).await?);
        }

        let leaves = session
            .search(&entry.dn, SearchScope::SingleLevel, &schema::leaves(), LEAF_ATTRS)
            .await
            .map_err(|e| TreeError::from(e).during("list leaves"))?;
        tree.sub_leaves = leaves.iter().map(mapper::leaf_node_from_entry).collect();

        Ok(tree)
    })
}

/// Delete the unit at `dn` and everything below it. Stops at the first
/// failure; entries already deleted stay deleted.
pub(crate) fn delete<'a, S: DirectorySession>(
    session: &'a mut S,
    dn: String,
) -> BoxFuture<'a, TreeResult<()>> {
    Box::pin(async move {
        let leaves = session
            .search(&dn, SearchScope::SingleLevel, &schema::leaves(), DN_ONLY)
            .await
            .map_err(|e| TreeError::from(e).during("list leaves"))?;
        for leaf in leaves {
            debug!(dn = %leaf.dn, "deleting leaf");
            session
                .delete(&leaf.dn)
                .await
                .map_err(|e| TreeError::from(e).during("delete leaf"))?;
        }

        let children = session
            .search(&dn, SearchScope::SingleLevel, &schema::org_units(), DN_ONLY)
            .await
            .map_err(|e| TreeError::from(e).during("list child units"))?;
        for child in children {
            delete(&mut *session, child.dn).await?;
        }

        debug!(dn = %dn, "deleting unit");
        session
            .delete(&dn)
            .await
            .map_err(|e| TreeError::from(e).during("delete unit"))
    })
}
