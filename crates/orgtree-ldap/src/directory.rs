//! Directory protocol seam.
//!
//! A [`Directory`] dials and binds, yielding a [`DirectorySession`] that
//! issues the protocol requests the tree store needs. Entries are
//! addressed by distinguished name (DN); searches take a base DN, a
//! scope and a conjunctive equality [`Filter`].

use std::collections::HashMap;
use std::fmt;

use ldap3::ldap_escape;

use crate::error::DirectoryError;

/// Attribute name with its values, in the order they are written.
pub type AttributeSet = Vec<(String, Vec<String>)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    /// Immediate children of the base entry.
    SingleLevel,
    /// The base entry and every descendant.
    Subtree,
}

impl From<SearchScope> for ldap3::Scope {
    fn from(scope: SearchScope) -> Self {
        match scope {
            SearchScope::SingleLevel => ldap3::Scope::OneLevel,
            SearchScope::Subtree => ldap3::Scope::Subtree,
        }
    }
}

/// Conjunction of `attribute=value` equality assertions.
///
/// Attribute names and values compare case-insensitively, as directory
/// string attributes do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    clauses: Vec<(String, String)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, attr: &str, value: &str) -> Self {
        self.clauses.push((attr.to_string(), value.to_string()));
        self
    }

    pub fn clauses(&self) -> &[(String, String)] {
        &self.clauses
    }

    pub fn matches(&self, entry: &DirEntry) -> bool {
        self.clauses.iter().all(|(attr, value)| {
            entry
                .values(attr)
                .iter()
                .any(|v| v.eq_ignore_ascii_case(value))
        })
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.clauses.as_slice() {
            [] => write!(f, "(objectClass=*)"),
            [(attr, value)] => write!(f, "({attr}={})", ldap_escape(value.as_str())),
            clauses => {
                write!(f, "(&")?;
                for (attr, value) in clauses {
                    write!(f, "({attr}={})", ldap_escape(value.as_str()))?;
                }
                write!(f, ")")
            }
        }
    }
}

/// A search result entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirEntry {
    pub dn: String,
    pub attrs: HashMap<String, Vec<String>>,
}

impl DirEntry {
    /// All values of `name`, matched case-insensitively. Empty when absent.
    pub fn values(&self, name: &str) -> &[String] {
        self.attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn first(&self, name: &str) -> Option<&str> {
        self.values(name).first().map(String::as_str)
    }
}

/// Something that can be dialed and bound.
pub trait Directory: Send + Sync {
    type Session: DirectorySession;

    /// Dial the server and authenticate. Each call yields an independent
    /// session.
    fn connect(&self) -> impl Future<Output = Result<Self::Session, DirectoryError>> + Send;
}

/// An authenticated connection. Requests run one at a time.
pub trait DirectorySession: Send {
    fn search(
        &mut self,
        base: &str,
        scope: SearchScope,
        filter: &Filter,
        attrs: &[&str],
    ) -> impl Future<Output = Result<Vec<DirEntry>, DirectoryError>> + Send;

    fn add(
        &mut self,
        dn: &str,
        attrs: AttributeSet,
    ) -> impl Future<Output = Result<(), DirectoryError>> + Send;

    /// Delete a single entry. Entries with children are rejected.
    fn delete(&mut self, dn: &str) -> impl Future<Output = Result<(), DirectoryError>> + Send;

    /// Rename an entry in place, replacing its RDN. Descendants move
    /// with it.
    fn modify_dn(
        &mut self,
        dn: &str,
        new_rdn: &str,
    ) -> impl Future<Output = Result<(), DirectoryError>> + Send;

    /// Replace every value of `attr`. An empty `values` removes it.
    fn replace(
        &mut self,
        dn: &str,
        attr: &str,
        values: Vec<String>,
    ) -> impl Future<Output = Result<(), DirectoryError>> + Send;

    fn close(self) -> impl Future<Output = Result<(), DirectoryError>> + Send
    where
        Self: Sized;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> DirEntry {
        DirEntry {
            dn: "ou=Sales,ou=Acme,dc=example,dc=com".into(),
            attrs: HashMap::from([
                ("objectClass".to_string(), vec!["organizationalUnit".to_string()]),
                ("st".to_string(), vec!["B1".to_string()]),
            ]),
        }
    }

    #[test]
    fn filter_renders_conjunction() {
        let filter = Filter::new()
            .eq("objectClass", "organizationalUnit")
            .eq("st", "B1");
        assert_eq!(filter.to_string(), "(&(objectClass=organizationalUnit)(st=B1))");
        assert_eq!(Filter::new().eq("uid", "u1").to_string(), "(uid=u1)");
        assert_eq!(Filter::new().to_string(), "(objectClass=*)");
    }

    #[test]
    fn filter_escapes_values() {
        let rendered = Filter::new().eq("uid", "a*(b)").to_string();
        assert!(rendered.eq_ignore_ascii_case("(uid=a\\2a\\28b\\29)"));
    }

    #[test]
    fn filter_matches_case_insensitively() {
        let e = entry();
        assert!(Filter::new().eq("objectclass", "organizationalunit").matches(&e));
        assert!(Filter::new().eq("ST", "b1").matches(&e));
        assert!(!Filter::new().eq("st", "B2").matches(&e));
        assert!(!Filter::new().eq("title", "manager").matches(&e));
        assert!(Filter::new().matches(&e));
    }

    #[test]
    fn entry_lookup_ignores_attribute_case() {
        let e = entry();
        assert_eq!(e.first("ST"), Some("B1"));
        assert!(e.values("l").is_empty());
    }
}
