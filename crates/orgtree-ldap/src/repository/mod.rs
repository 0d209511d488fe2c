//! Directory-backed [`TreeStore`](orgtree_core::TreeStore) implementation.

mod subtree;
mod tree_store;

pub use tree_store::{LdapTreeStore, MAX_PARENT_DEPTH};
