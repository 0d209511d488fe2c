//! Orgtree LDAP — directory-backed organization tree store.
//!
//! This crate provides:
//! - The directory protocol seam ([`Directory`], [`DirectorySession`])
//!   with a network engine ([`LdapDirectory`]) and an in-memory engine
//!   ([`MemDirectory`])
//! - The directory schema and entry mapping ([`schema`], [`mapper`])
//! - Background id generation ([`IdGenerator`])
//! - The [`TreeStore`](orgtree_core::TreeStore) implementation
//!   ([`LdapTreeStore`]) and the configuration-driven factory ([`open`])

mod connection;
pub mod directory;
mod error;
pub mod idgen;
pub mod mapper;
mod memory;
pub mod repository;
pub mod schema;

pub use connection::{DirectoryConfig, LdapDirectory, LdapSession, REQUIRED_KEYS};
pub use directory::{AttributeSet, DirEntry, Directory, DirectorySession, Filter, SearchScope};
pub use error::{DirectoryError, rc};
pub use idgen::{ID_BUFFER_CAPACITY, IdGenerator};
pub use memory::{MemDirectory, MemSession};
pub use repository::{LdapTreeStore, MAX_PARENT_DEPTH};

use orgtree_core::error::TreeResult;
use tracing::info;

/// Build the tree store described by `config`, a JSON object with the
/// keys in [`REQUIRED_KEYS`]. The store draws ids from the process-wide
/// [`IdGenerator`]. No connection is made until the first operation.
pub fn open(config: &serde_json::Value) -> TreeResult<LdapTreeStore<LdapDirectory>> {
    let config = DirectoryConfig::from_value(config)?;
    info!(url = %config.url(), base = %config.base, "Opening directory tree store");
    let base = config.base.clone();
    Ok(LdapTreeStore::new(
        LdapDirectory::new(config),
        base,
        IdGenerator::global(),
    ))
}
