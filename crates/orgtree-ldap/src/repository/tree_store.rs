//! Directory implementation of [`TreeStore`].
//!
//! Every operation opens its own session, resolves the tenant root with a
//! single-level search under the store base, resolves units by a
//! whole-subtree search for their id below that root, and closes the
//! session when done.

use std::collections::HashSet;

use orgtree_core::error::{TreeError, TreeResult};
use orgtree_core::models::{
    CreateOrgNode, LeafNode, OrgNode, OrgTree, UpdateLeafNode, UpdateOrgNode,
};
use orgtree_core::repository::{DEPTH_CHILDREN, TreeStore};
use tracing::{debug, info, warn};

use super::subtree;
use crate::directory::{DirEntry, Directory, DirectorySession, Filter, SearchScope};
use crate::idgen::IdGenerator;
use crate::mapper;
use crate::schema::{self, LEAF_ATTRS, ORG_ATTRS, leaf, org};

/// Upper bound on hops [`TreeStore::get_parents`] takes before giving up
/// on a parent chain that never reaches the tenant root.
pub const MAX_PARENT_DEPTH: usize = 64;

/// Tree store over any [`Directory`] engine.
#[derive(Debug, Clone)]
pub struct LdapTreeStore<D: Directory> {
    directory: D,
    base: String,
    ids: IdGenerator,
}

impl<D: Directory> LdapTreeStore<D> {
    /// `base` is the DN tenant roots are created under.
    pub fn new(directory: D, base: impl Into<String>, ids: IdGenerator) -> Self {
        Self {
            directory,
            base: base.into(),
            ids,
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    async fn open(&self) -> TreeResult<D::Session> {
        self.directory
            .connect()
            .await
            .map_err(|e| TreeError::from(e).during("connect"))
    }

    /// Closing is best effort; the operation's own result wins.
    async fn release(&self, session: D::Session) {
        if let Err(e) = session.close().await {
            debug!(error = %e, "closing directory session failed");
        }
    }

    async fn tenant_root_opt(
        &self,
        session: &mut D::Session,
        mid: &str,
    ) -> TreeResult<Option<DirEntry>> {
        let hits = session
            .search(
                &self.base,
                SearchScope::SingleLevel,
                &schema::org_unit_by_id(mid),
                ORG_ATTRS,
            )
            .await
            .map_err(|e| TreeError::from(e).during("resolve tenant root"))?;
        Ok(hits.into_iter().next())
    }

    async fn tenant_root(&self, session: &mut D::Session, mid: &str) -> TreeResult<DirEntry> {
        self.tenant_root_opt(session, mid)
            .await?
            .ok_or_else(|| TreeError::not_found("tenant", mid))
    }

    async fn unit_opt(
        &self,
        session: &mut D::Session,
        root: &DirEntry,
        id: &str,
    ) -> TreeResult<Option<DirEntry>> {
        if root.first(org::ID) == Some(id) {
            return Ok(Some(root.clone()));
        }
        let hits = session
            .search(
                &root.dn,
                SearchScope::Subtree,
                &schema::org_unit_by_id(id),
                ORG_ATTRS,
            )
            .await
            .map_err(|e| TreeError::from(e).during("resolve org unit"))?;
        Ok(hits.into_iter().next())
    }

    async fn unit(
        &self,
        session: &mut D::Session,
        root: &DirEntry,
        id: &str,
    ) -> TreeResult<DirEntry> {
        self.unit_opt(session, root, id)
            .await?
            .ok_or_else(|| TreeError::not_found("org unit", id))
    }

    /// Resolve unit `id` inside tenant `mid`'s tree.
    async fn resolve(
        &self,
        session: &mut D::Session,
        mid: &str,
        id: &str,
    ) -> TreeResult<DirEntry> {
        let root = self.tenant_root(session, mid).await?;
        debug!(mid, id, root = %root.dn, "resolving org unit");
        self.unit(session, &root, id).await
    }

    async fn search_leaves(
        &self,
        session: &mut D::Session,
        mid: &str,
        pid: &str,
        filter: Filter,
    ) -> TreeResult<Vec<LeafNode>> {
        let unit = self.resolve(session, mid, pid).await?;
        let hits = session
            .search(&unit.dn, SearchScope::Subtree, &filter, LEAF_ATTRS)
            .await
            .map_err(|e| TreeError::from(e).during("search leaves"))?;
        Ok(hits.iter().map(mapper::leaf_node_from_entry).collect())
    }

    // -----------------------------------------------------------------------
    // Operation bodies, run on an open session
    // -----------------------------------------------------------------------

    async fn add_org_node_in(
        &self,
        session: &mut D::Session,
        input: CreateOrgNode,
    ) -> TreeResult<String> {
        let (parent_dn, node) = if input.pid.is_empty() {
            if self.tenant_root_opt(session, &input.mid).await?.is_some() {
                return Err(TreeError::conflict("tenant", &input.mid));
            }
            let node = OrgNode {
                id: input.mid.clone(),
                mid: input.mid,
                pid: String::new(),
                node_type: input.node_type,
                name: input.name,
                is_default: input.is_default,
            };
            (self.base.clone(), node)
        } else {
            let root = self.tenant_root(session, &input.mid).await?;
            let parent = self.unit(session, &root, &input.pid).await?;
            let id = match input.id.filter(|id| !id.is_empty()) {
                Some(id) => {
                    if self.unit_opt(session, &root, &id).await?.is_some() {
                        return Err(TreeError::conflict("org unit", id));
                    }
                    id
                }
                None => self.ids.request_id().await?,
            };
            let node = OrgNode {
                mid: input.mid,
                pid: input.pid,
                id,
                node_type: input.node_type,
                name: input.name,
                is_default: input.is_default,
            };
            (parent.dn, node)
        };

        let dn = schema::org_unit_dn(&node.name, &parent_dn);
        session
            .add(&dn, mapper::org_node_attributes(&node))
            .await
            .map_err(|e| e.about("org unit name", &node.name, "add org unit"))?;

        info!(mid = %node.mid, id = %node.id, dn = %dn, "Created org unit");
        Ok(node.id)
    }

    async fn modify_org_node_in(
        &self,
        session: &mut D::Session,
        mid: &str,
        id: &str,
        name: &str,
    ) -> TreeResult<()> {
        let entry = self.resolve(session, mid, id).await?;
        if entry.first(org::NAME) == Some(name) {
            return Ok(());
        }
        session
            .modify_dn(&entry.dn, &schema::org_unit_rdn(name))
            .await
            .map_err(|e| e.about("org unit name", name, "rename org unit"))?;

        info!(mid, id, from = %entry.dn, name, "Renamed org unit");
        Ok(())
    }

    async fn del_org_node_in(
        &self,
        session: &mut D::Session,
        mid: &str,
        id: &str,
    ) -> TreeResult<()> {
        let entry = self.resolve(session, mid, id).await?;
        subtree::delete(session, entry.dn.clone()).await?;
        info!(mid, id, dn = %entry.dn, "Deleted org unit subtree");
        Ok(())
    }

    async fn get_parents_in(
        &self,
        session: &mut D::Session,
        mid: &str,
        id: &str,
    ) -> TreeResult<Vec<OrgNode>> {
        let root = self.tenant_root(session, mid).await?;
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = id.to_string();

        loop {
            if chain.len() >= MAX_PARENT_DEPTH {
                warn!(mid, id, "parent chain exceeds depth limit");
                return Err(TreeError::Backend(format!(
                    "parent chain of {id} exceeds {MAX_PARENT_DEPTH} levels"
                )));
            }
            if !seen.insert(current.clone()) {
                warn!(mid, id, repeated = %current, "parent chain cycles");
                return Err(TreeError::Backend(format!(
                    "parent chain of {id} revisits {current}"
                )));
            }

            let entry = self.unit(session, &root, &current).await?;
            let node = mapper::org_node_from_entry(&entry);
            let at_root = node.is_tenant_root();
            current = node.pid.clone();
            chain.push(node);
            if at_root {
                return Ok(chain);
            }
        }
    }

    async fn leaf_dn(
        &self,
        session: &mut D::Session,
        mid: &str,
        pid: &str,
        uid: &str,
    ) -> TreeResult<String> {
        let parent = self.resolve(session, mid, pid).await?;
        Ok(schema::leaf_dn(uid, &parent.dn))
    }

    async fn add_leaf_node_in(&self, session: &mut D::Session, leaf: &LeafNode) -> TreeResult<()> {
        let dn = self.leaf_dn(session, &leaf.mid, &leaf.pid, &leaf.uid).await?;
        session
            .add(&dn, mapper::leaf_node_attributes(leaf))
            .await
            .map_err(|e| e.about("leaf", &leaf.uid, "add leaf"))?;
        info!(mid = %leaf.mid, pid = %leaf.pid, uid = %leaf.uid, "Created leaf");
        Ok(())
    }

    async fn modify_leaf_node_in(
        &self,
        session: &mut D::Session,
        input: UpdateLeafNode,
        positions: Vec<String>,
    ) -> TreeResult<()> {
        let dn = self.leaf_dn(session, &input.mid, &input.pid, &input.uid).await?;
        let count = positions.len();
        session
            .replace(&dn, leaf::POSITIONS, positions)
            .await
            .map_err(|e| e.about("leaf", &input.uid, "replace positions"))?;
        info!(mid = %input.mid, uid = %input.uid, positions = count, "Updated leaf positions");
        Ok(())
    }

    async fn del_leaf_node_in(
        &self,
        session: &mut D::Session,
        mid: &str,
        pid: &str,
        uid: &str,
    ) -> TreeResult<()> {
        let dn = self.leaf_dn(session, mid, pid, uid).await?;
        session
            .delete(&dn)
            .await
            .map_err(|e| e.about("leaf", uid, "delete leaf"))?;
        info!(mid, pid, uid, "Deleted leaf");
        Ok(())
    }

    async fn get_org_nodes_by_org_in(
        &self,
        session: &mut D::Session,
        mid: &str,
        pid: &str,
        depth: u32,
    ) -> TreeResult<Vec<OrgNode>> {
        let unit = self.resolve(session, mid, pid).await?;
        let scope = if depth == DEPTH_CHILDREN {
            SearchScope::SingleLevel
        } else {
            SearchScope::Subtree
        };
        let hits = session
            .search(&unit.dn, scope, &schema::org_units(), ORG_ATTRS)
            .await
            .map_err(|e| TreeError::from(e).during("list org units"))?;
        Ok(hits.iter().map(mapper::org_node_from_entry).collect())
    }

    async fn get_sub_tree_in(
        &self,
        session: &mut D::Session,
        mid: &str,
        id: &str,
    ) -> TreeResult<OrgTree> {
        let entry = self.resolve(session, mid, id).await?;
        subtree::materialize(session, entry).await
    }
}

fn require(field: &str, value: &str) -> TreeResult<()> {
    if value.trim().is_empty() {
        return Err(TreeError::invalid(format!("{field} is required")));
    }
    Ok(())
}

impl<D: Directory> TreeStore for LdapTreeStore<D> {
    async fn add_org_node(&self, input: CreateOrgNode) -> TreeResult<String> {
        require("mid", &input.mid)?;
        require("name", &input.name)?;

        let mut session = self.open().await?;
        let result = self.add_org_node_in(&mut session, input).await;
        self.release(session).await;
        result
    }

    async fn modify_org_node(&self, input: UpdateOrgNode) -> TreeResult<()> {
        require("mid", &input.mid)?;
        require("id", &input.id)?;
        let Some(name) = input.name else {
            return Ok(());
        };
        require("name", &name)?;

        let mut session = self.open().await?;
        let result = self
            .modify_org_node_in(&mut session, &input.mid, &input.id, &name)
            .await;
        self.release(session).await;
        result
    }

    async fn del_org_node(&self, mid: &str, id: &str) -> TreeResult<()> {
        require("mid", mid)?;
        require("id", id)?;

        let mut session = self.open().await?;
        let result = self.del_org_node_in(&mut session, mid, id).await;
        self.release(session).await;
        result
    }

    async fn get_org_node(&self, mid: &str, id: &str) -> TreeResult<OrgNode> {
        let mut session = self.open().await?;
        let result = self
            .resolve(&mut session, mid, id)
            .await
            .map(|entry| mapper::org_node_from_entry(&entry));
        self.release(session).await;
        result
    }

    async fn get_org_nodes_by_org(
        &self,
        mid: &str,
        pid: &str,
        depth: u32,
    ) -> TreeResult<Vec<OrgNode>> {
        let mut session = self.open().await?;
        let result = self.get_org_nodes_by_org_in(&mut session, mid, pid, depth).await;
        self.release(session).await;
        result
    }

    async fn get_sub_tree(&self, mid: &str, id: &str) -> TreeResult<OrgTree> {
        let mut session = self.open().await?;
        let result = self.get_sub_tree_in(&mut session, mid, id).await;
        self.release(session).await;
        result
    }

    async fn get_parents(&self, mid: &str, id: &str) -> TreeResult<Vec<OrgNode>> {
        let mut session = self.open().await?;
        let result = self.get_parents_in(&mut session, mid, id).await;
        self.release(session).await;
        result
    }

    async fn add_leaf_node(&self, leaf: LeafNode) -> TreeResult<()> {
        require("mid", &leaf.mid)?;
        require("pid", &leaf.pid)?;
        require("uid", &leaf.uid)?;

        let mut session = self.open().await?;
        let result = self.add_leaf_node_in(&mut session, &leaf).await;
        self.release(session).await;
        result
    }

    async fn modify_leaf_node(&self, mut input: UpdateLeafNode) -> TreeResult<()> {
        let Some(positions) = input.positions.take() else {
            return Ok(());
        };
        require("mid", &input.mid)?;
        require("pid", &input.pid)?;
        require("uid", &input.uid)?;

        let mut session = self.open().await?;
        let result = self.modify_leaf_node_in(&mut session, input, positions).await;
        self.release(session).await;
        result
    }

    async fn del_leaf_node(&self, mid: &str, pid: &str, uid: &str) -> TreeResult<()> {
        require("mid", mid)?;
        require("pid", pid)?;
        require("uid", uid)?;

        let mut session = self.open().await?;
        let result = self.del_leaf_node_in(&mut session, mid, pid, uid).await;
        self.release(session).await;
        result
    }

    async fn get_leaf_nodes(&self, mid: &str, pid: &str, uid: &str) -> TreeResult<Vec<LeafNode>> {
        let mut filter = schema::leaves();
        if !uid.is_empty() {
            filter = filter.eq(leaf::LOGIN_ID, uid);
        }

        let mut session = self.open().await?;
        let result = self.search_leaves(&mut session, mid, pid, filter).await;
        self.release(session).await;
        result
    }

    async fn get_leaf_nodes_by_org(&self, mid: &str, pid: &str) -> TreeResult<Vec<LeafNode>> {
        let mut session = self.open().await?;
        let result = self
            .search_leaves(&mut session, mid, pid, schema::leaves())
            .await;
        self.release(session).await;
        result
    }

    async fn get_users_by_position(
        &self,
        mid: &str,
        pid: &str,
        position_id: &str,
    ) -> TreeResult<Vec<LeafNode>> {
        let filter = schema::leaves().eq(leaf::POSITIONS, position_id);

        let mut session = self.open().await?;
        let result = self.search_leaves(&mut session, mid, pid, filter).await;
        self.release(session).await;
        result
    }
}
