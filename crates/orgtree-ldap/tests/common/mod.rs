//! Shared fixtures for store integration tests.

#![allow(dead_code)]

use orgtree_core::models::{CreateOrgNode, LeafNode, OrgType};
use orgtree_core::repository::TreeStore;
use orgtree_ldap::{IdGenerator, LdapTreeStore, MemDirectory};
use tracing_subscriber::EnvFilter;

pub const BASE: &str = "dc=example,dc=com";

pub type MemStore = LdapTreeStore<MemDirectory>;

/// Install a test subscriber honoring `RUST_LOG`. Safe to call from
/// every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Helper: fresh in-memory directory and a store over it.
pub fn setup() -> (MemDirectory, MemStore) {
    init_tracing();
    let dir = MemDirectory::new(BASE);
    let store = LdapTreeStore::new(dir.clone(), BASE, IdGenerator::global());
    (dir, store)
}

/// Tenant `T1` with branch `B1`, department `D1` and leaf `u1`
/// (position `manager`) under `D1`.
pub async fn seed_scenario(store: &MemStore) {
    store
        .add_org_node(CreateOrgNode::tenant("T1", "Acme"))
        .await
        .unwrap();
    store
        .add_org_node(CreateOrgNode::child("T1", "T1", OrgType::Branch, "North").with_id("B1"))
        .await
        .unwrap();
    store
        .add_org_node(
            CreateOrgNode::child("T1", "B1", OrgType::Department, "Support").with_id("D1"),
        )
        .await
        .unwrap();
    store
        .add_leaf_node(leaf("D1", "u1", &["manager"]))
        .await
        .unwrap();
}

pub fn leaf(pid: &str, uid: &str, positions: &[&str]) -> LeafNode {
    LeafNode {
        mid: "T1".into(),
        pid: pid.into(),
        sid: format!("S-{uid}"),
        uid: uid.into(),
        positions: positions.iter().map(|p| p.to_string()).collect(),
    }
}
