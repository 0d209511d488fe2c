//! Directory-specific error types and conversions.

use orgtree_core::error::TreeError;

/// LDAP result codes the store reacts to.
pub mod rc {
    pub const SUCCESS: u32 = 0;
    pub const NO_SUCH_OBJECT: u32 = 32;
    pub const NOT_ALLOWED_ON_NON_LEAF: u32 = 66;
    pub const ENTRY_ALREADY_EXISTS: u32 = 68;
    pub const OTHER: u32 = 80;
}

/// Directory-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("failed to connect to {url}: {reason}")]
    Connect { url: String, reason: String },

    #[error("bind as {user} failed: {reason}")]
    Bind { user: String, reason: String },

    #[error("directory unavailable")]
    Unavailable,

    #[error("no such entry: {dn}")]
    NoSuchObject { dn: String },

    #[error("entry already exists: {dn}")]
    AlreadyExists { dn: String },

    #[error("entry has children: {dn}")]
    NotAllowedOnNonLeaf { dn: String },

    #[error("result code {rc} on {dn}: {message}")]
    Protocol { rc: u32, dn: String, message: String },

    #[error("LDAP error: {0}")]
    Ldap(#[from] ldap3::LdapError),
}

impl DirectoryError {
    /// Turn a non-success result code into its error.
    pub fn check(code: u32, dn: &str, message: &str) -> Result<(), Self> {
        let dn = dn.to_string();
        match code {
            rc::SUCCESS => Ok(()),
            rc::NO_SUCH_OBJECT => Err(Self::NoSuchObject { dn }),
            rc::NOT_ALLOWED_ON_NON_LEAF => Err(Self::NotAllowedOnNonLeaf { dn }),
            rc::ENTRY_ALREADY_EXISTS => Err(Self::AlreadyExists { dn }),
            code => Err(Self::Protocol {
                rc: code,
                dn,
                message: message.to_string(),
            }),
        }
    }

    /// Categorize against the domain object a request was about, so a
    /// missing or duplicate entry is reported by entity and id rather
    /// than by DN.
    pub(crate) fn about(self, entity: &str, id: &str, step: &str) -> TreeError {
        match self {
            Self::NoSuchObject { .. } => TreeError::not_found(entity, id),
            Self::AlreadyExists { .. } => TreeError::conflict(entity, id),
            other => TreeError::from(other).during(step),
        }
    }
}

impl From<DirectoryError> for TreeError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::Connect { .. }
            | DirectoryError::Bind { .. }
            | DirectoryError::Unavailable => TreeError::Connection(err.to_string()),
            DirectoryError::NoSuchObject { dn } => TreeError::not_found("entry", dn),
            DirectoryError::AlreadyExists { dn } => TreeError::conflict("entry", dn),
            other => TreeError::Backend(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_codes_are_categorized() {
        assert!(DirectoryError::check(0, "ou=a", "").is_ok());
        assert!(matches!(
            DirectoryError::check(32, "ou=a", ""),
            Err(DirectoryError::NoSuchObject { .. })
        ));
        assert!(matches!(
            DirectoryError::check(68, "ou=a", ""),
            Err(DirectoryError::AlreadyExists { .. })
        ));
        assert!(matches!(
            DirectoryError::check(50, "ou=a", "insufficient access"),
            Err(DirectoryError::Protocol { rc: 50, .. })
        ));
    }

    #[test]
    fn converts_into_tree_errors() {
        let err: TreeError = DirectoryError::Unavailable.into();
        assert!(matches!(err, TreeError::Connection(_)));

        let err = DirectoryError::AlreadyExists { dn: "ou=x".into() }.about("org unit", "x", "add");
        assert!(err.is_conflict());

        let err = DirectoryError::NotAllowedOnNonLeaf { dn: "ou=x".into() }.about(
            "org unit",
            "x",
            "delete unit",
        );
        match err {
            TreeError::Backend(msg) => assert!(msg.starts_with("delete unit: ")),
            other => panic!("unexpected {other:?}"),
        }
    }
}
