//! In-memory directory engine.
//!
//! Keeps entries in a DN-keyed map behind a shared lock and applies the
//! same structural rules an LDAP server does: an entry needs an existing
//! parent, a DN can exist once, only leaf entries can be deleted, and a
//! rename carries the entry's subtree along. Used for tests and for
//! embedding the store without a server.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use crate::directory::{AttributeSet, DirEntry, Directory, DirectorySession, Filter, SearchScope};
use crate::error::{DirectoryError, rc};

#[derive(Debug)]
struct MemEntry {
    /// Insertion order; search results are returned in this order.
    seq: u64,
    dn: String,
    attrs: AttributeSet,
}

#[derive(Debug)]
struct MemTree {
    entries: BTreeMap<String, MemEntry>,
    next_seq: u64,
    available: bool,
    /// Normalized DNs whose deletion is refused.
    failing_deletes: HashSet<String>,
}

/// Shared in-memory directory. Clones see the same entries.
#[derive(Debug, Clone)]
pub struct MemDirectory {
    tree: Arc<Mutex<MemTree>>,
}

impl MemDirectory {
    /// Create a directory provisioned with the store base entry.
    pub fn new(base: &str) -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(
            normalize(base),
            MemEntry {
                seq: 0,
                dn: base.to_string(),
                attrs: vec![("objectClass".into(), vec!["dcObject".into()])],
            },
        );
        Self {
            tree: Arc::new(Mutex::new(MemTree {
                entries,
                next_seq: 1,
                available: true,
                failing_deletes: HashSet::new(),
            })),
        }
    }

    /// Refuse (or accept again) new connections.
    pub fn set_available(&self, available: bool) {
        if let Ok(mut tree) = self.tree.lock() {
            tree.available = available;
        }
    }

    /// Make every later delete of `dn` fail with result code `other`.
    pub fn fail_delete_on(&self, dn: &str) {
        if let Ok(mut tree) = self.tree.lock() {
            tree.failing_deletes.insert(normalize(dn));
        }
    }

    /// Number of entries, including the base entry.
    pub fn len(&self) -> usize {
        self.tree.lock().map(|t| t.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, dn: &str) -> bool {
        self.tree
            .lock()
            .map(|t| t.entries.contains_key(&normalize(dn)))
            .unwrap_or(false)
    }
}

impl Directory for MemDirectory {
    type Session = MemSession;

    async fn connect(&self) -> Result<MemSession, DirectoryError> {
        if !lock(&self.tree)?.available {
            return Err(DirectoryError::Unavailable);
        }
        Ok(MemSession {
            tree: Arc::clone(&self.tree),
        })
    }
}

/// A session on a [`MemDirectory`].
#[derive(Debug)]
pub struct MemSession {
    tree: Arc<Mutex<MemTree>>,
}

impl DirectorySession for MemSession {
    async fn search(
        &mut self,
        base: &str,
        scope: SearchScope,
        filter: &Filter,
        attrs: &[&str],
    ) -> Result<Vec<DirEntry>, DirectoryError> {
        let tree = lock(&self.tree)?;
        let base_key = normalize(base);
        if !tree.entries.contains_key(&base_key) {
            return Err(DirectoryError::NoSuchObject {
                dn: base.to_string(),
            });
        }

        let mut hits: Vec<&MemEntry> = tree
            .entries
            .iter()
            .filter(|(key, _)| match scope {
                SearchScope::SingleLevel => parent_of(key) == Some(base_key.as_str()),
                SearchScope::Subtree => is_within(key, &base_key),
            })
            .map(|(_, entry)| entry)
            .filter(|entry| filter.matches(&to_dir_entry(entry, &[])))
            .collect();
        hits.sort_by_key(|entry| entry.seq);

        debug!(base, ?scope, filter = %filter, hits = hits.len(), "mem search");
        Ok(hits.into_iter().map(|e| to_dir_entry(e, attrs)).collect())
    }

    async fn add(&mut self, dn: &str, attrs: AttributeSet) -> Result<(), DirectoryError> {
        let mut tree = lock(&self.tree)?;
        let key = normalize(dn);
        if tree.entries.contains_key(&key) {
            return Err(DirectoryError::AlreadyExists { dn: dn.to_string() });
        }
        match parent_of(&key) {
            Some(parent) if tree.entries.contains_key(parent) => {}
            _ => {
                return Err(DirectoryError::NoSuchObject {
                    dn: parent_of(dn).unwrap_or(dn).to_string(),
                });
            }
        }

        let seq = tree.next_seq;
        tree.next_seq += 1;
        tree.entries.insert(
            key,
            MemEntry {
                seq,
                dn: dn.to_string(),
                attrs,
            },
        );
        Ok(())
    }

    async fn delete(&mut self, dn: &str) -> Result<(), DirectoryError> {
        let mut tree = lock(&self.tree)?;
        let key = normalize(dn);
        if !tree.entries.contains_key(&key) {
            return Err(DirectoryError::NoSuchObject { dn: dn.to_string() });
        }
        if tree
            .entries
            .keys()
            .any(|k| parent_of(k) == Some(key.as_str()))
        {
            return Err(DirectoryError::NotAllowedOnNonLeaf { dn: dn.to_string() });
        }
        if tree.failing_deletes.contains(&key) {
            return Err(DirectoryError::Protocol {
                rc: rc::OTHER,
                dn: dn.to_string(),
                message: "delete refused".into(),
            });
        }
        tree.entries.remove(&key);
        Ok(())
    }

    async fn modify_dn(&mut self, dn: &str, new_rdn: &str) -> Result<(), DirectoryError> {
        let mut tree = lock(&self.tree)?;
        let key = normalize(dn);
        if !tree.entries.contains_key(&key) {
            return Err(DirectoryError::NoSuchObject { dn: dn.to_string() });
        }
        let (rdn_attr, rdn_value) = split_rdn(new_rdn).ok_or_else(|| DirectoryError::Protocol {
            rc: rc::OTHER,
            dn: dn.to_string(),
            message: format!("invalid RDN {new_rdn}"),
        })?;

        let new_dn = match parent_of(dn) {
            Some(parent) => format!("{new_rdn},{parent}"),
            None => new_rdn.to_string(),
        };
        let new_key = normalize(&new_dn);
        if new_key != key && tree.entries.contains_key(&new_key) {
            return Err(DirectoryError::AlreadyExists { dn: new_dn });
        }

        let moved: Vec<String> = tree
            .entries
            .keys()
            .filter(|k| is_within(k, &key))
            .cloned()
            .collect();
        for old_key in moved {
            let Some(mut entry) = tree.entries.remove(&old_key) else {
                continue;
            };
            let kept = entry.dn.len() - dn.len();
            entry.dn = format!("{}{new_dn}", &entry.dn[..kept]);
            if old_key == key {
                set_attr(&mut entry.attrs, &rdn_attr, vec![rdn_value.clone()]);
            }
            tree.entries.insert(normalize(&entry.dn), entry);
        }
        Ok(())
    }

    async fn replace(
        &mut self,
        dn: &str,
        attr: &str,
        values: Vec<String>,
    ) -> Result<(), DirectoryError> {
        let mut tree = lock(&self.tree)?;
        let entry = tree
            .entries
            .get_mut(&normalize(dn))
            .ok_or_else(|| DirectoryError::NoSuchObject { dn: dn.to_string() })?;
        set_attr(&mut entry.attrs, attr, values);
        Ok(())
    }

    async fn close(self) -> Result<(), DirectoryError> {
        Ok(())
    }
}

fn lock(tree: &Mutex<MemTree>) -> Result<MutexGuard<'_, MemTree>, DirectoryError> {
    tree.lock().map_err(|_| DirectoryError::Protocol {
        rc: rc::OTHER,
        dn: String::new(),
        message: "in-memory directory lock poisoned".into(),
    })
}

fn to_dir_entry(entry: &MemEntry, wanted: &[&str]) -> DirEntry {
    let attrs: HashMap<String, Vec<String>> = entry
        .attrs
        .iter()
        .filter(|(name, _)| {
            wanted.is_empty() || wanted.iter().any(|w| w.eq_ignore_ascii_case(name))
        })
        .cloned()
        .collect();
    DirEntry {
        dn: entry.dn.clone(),
        attrs,
    }
}

/// Replace `name`'s values, dropping the attribute when `values` is empty.
fn set_attr(attrs: &mut AttributeSet, name: &str, values: Vec<String>) {
    attrs.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
    if !values.is_empty() {
        attrs.push((name.to_string(), values));
    }
}

fn normalize(dn: &str) -> String {
    dn.to_ascii_lowercase()
}

/// Everything after the first unescaped comma.
fn parent_of(dn: &str) -> Option<&str> {
    let bytes = dn.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b',' => return Some(&dn[i + 1..]),
            _ => i += 1,
        }
    }
    None
}

fn is_within(key: &str, base: &str) -> bool {
    let mut current = Some(key);
    while let Some(dn) = current {
        if dn == base {
            return true;
        }
        current = parent_of(dn);
    }
    false
}

fn split_rdn(rdn: &str) -> Option<(String, String)> {
    let (attr, value) = rdn.split_once('=')?;
    Some((attr.to_string(), unescape(value)))
}

/// Undo RFC 4514 escaping: `\XX` hex pairs and `\c` single characters.
fn unescape(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 1 < bytes.len() {
            let hex = value
                .get(i + 1..i + 3)
                .and_then(|h| u8::from_str_radix(h, 16).ok());
            match hex {
                Some(b) => {
                    out.push(b);
                    i += 3;
                }
                None => {
                    out.push(bytes[i + 1]);
                    i += 2;
                }
            }
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}
