//! Integration tests for subtree materialization.

mod common;

use common::{leaf, seed_scenario, setup};
use orgtree_core::models::{CreateOrgNode, OrgType};
use orgtree_core::repository::TreeStore;

#[tokio::test]
async fn scenario_tree_shape() {
    let (_dir, store) = setup();
    seed_scenario(&store).await;

    let tree = store.get_sub_tree("T1", "T1").await.unwrap();
    assert_eq!(tree.node.id, "T1");
    assert!(tree.sub_leaves.is_empty());
    assert_eq!(tree.sub_trees.len(), 1);

    let branch = &tree.sub_trees[0];
    assert_eq!(branch.node.id, "B1");
    assert_eq!(branch.node.pid, "T1");
    assert_eq!(branch.sub_trees.len(), 1);
    assert!(branch.sub_leaves.is_empty());

    let dept = &branch.sub_trees[0];
    assert_eq!(dept.node.id, "D1");
    assert!(dept.sub_trees.is_empty());
    assert_eq!(dept.sub_leaves.len(), 1);
    assert_eq!(dept.sub_leaves[0].uid, "u1");
    assert_eq!(dept.sub_leaves[0].positions, ["manager"]);
}

#[tokio::test]
async fn subtree_of_inner_unit() {
    let (_dir, store) = setup();
    seed_scenario(&store).await;
    store
        .add_org_node(CreateOrgNode::child("T1", "B1", OrgType::Department, "Sales").with_id("D2"))
        .await
        .unwrap();
    store.add_leaf_node(leaf("D2", "u5", &[])).await.unwrap();
    store.add_leaf_node(leaf("B1", "u6", &[])).await.unwrap();

    let tree = store.get_sub_tree("T1", "B1").await.unwrap();
    assert_eq!(tree.node.name, "North");
    let ids: Vec<_> = tree.sub_trees.iter().map(|t| t.node.id.as_str()).collect();
    assert_eq!(ids, ["D1", "D2"]);
    assert_eq!(tree.sub_leaves.len(), 1);
    assert_eq!(tree.all_leaves().len(), 3);
    assert_eq!(tree.find("D2").map(|t| t.sub_leaves.len()), Some(1));
}

#[tokio::test]
async fn subtree_of_missing_unit_is_not_found() {
    let (_dir, store) = setup();
    seed_scenario(&store).await;

    assert!(store.get_sub_tree("T1", "nope").await.unwrap_err().is_not_found());
    assert!(store.get_sub_tree("T2", "T2").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn tenants_are_isolated() {
    let (_dir, store) = setup();
    seed_scenario(&store).await;
    store
        .add_org_node(CreateOrgNode::tenant("T2", "Initech"))
        .await
        .unwrap();
    store
        .add_org_node(CreateOrgNode::child("T2", "T2", OrgType::Branch, "North").with_id("B1"))
        .await
        .unwrap();

    // The same unit id resolves independently inside each tenant.
    let t1_branch = store.get_sub_tree("T1", "B1").await.unwrap();
    let t2_branch = store.get_sub_tree("T2", "B1").await.unwrap();
    assert_eq!(t1_branch.unit_count(), 2);
    assert_eq!(t2_branch.unit_count(), 1);
    assert_eq!(t2_branch.node.mid, "T2");

    let parents = store.get_parents("T2", "B1").await.unwrap();
    let ids: Vec<_> = parents.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, ["B1", "T2"]);
}
