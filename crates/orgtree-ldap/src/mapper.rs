//! Translation between domain records and directory attribute sets.
//!
//! Reads are lenient: missing or unparsable attributes fall back to the
//! field's zero value. Writes emit every field that has a value.

use orgtree_core::models::{LeafNode, OrgNode, OrgType};

use crate::directory::{AttributeSet, DirEntry};
use crate::schema::{self, leaf, org};

pub fn org_node_from_entry(entry: &DirEntry) -> OrgNode {
    OrgNode {
        mid: text(entry, org::TENANT_ID),
        pid: text(entry, org::PARENT_ID),
        id: text(entry, org::ID),
        node_type: OrgType::from_code(
            entry
                .first(org::TYPE)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(0),
        ),
        name: text(entry, org::NAME),
        is_default: entry.first(org::IS_DEFAULT).is_some_and(parse_bool),
    }
}

pub fn leaf_node_from_entry(entry: &DirEntry) -> LeafNode {
    LeafNode {
        mid: text(entry, leaf::TENANT_ID),
        pid: text(entry, leaf::PARENT_ID),
        sid: text(entry, leaf::STAFF_ID),
        uid: text(entry, leaf::LOGIN_ID),
        positions: entry.values(leaf::POSITIONS).to_vec(),
    }
}

pub fn org_node_attributes(node: &OrgNode) -> AttributeSet {
    let mut attrs = AttributeSet::new();
    push(&mut attrs, schema::OBJECT_CLASS, [schema::ORG_UNIT_CLASS]);
    push(&mut attrs, org::PARENT_ID, [node.pid.as_str()]);
    push(&mut attrs, org::TENANT_ID, [node.mid.as_str()]);
    push(&mut attrs, org::NAME, [node.name.as_str()]);
    push(&mut attrs, org::TYPE, [node.node_type.code().to_string()]);
    push(&mut attrs, org::ID, [node.id.as_str()]);
    push(&mut attrs, org::IS_DEFAULT, [node.is_default.to_string()]);
    attrs
}

pub fn leaf_node_attributes(node: &LeafNode) -> AttributeSet {
    let mut attrs = AttributeSet::new();
    push(&mut attrs, schema::OBJECT_CLASS, schema::LEAF_CLASSES.iter().copied());
    push(&mut attrs, leaf::LOGIN_ID, [node.uid.as_str()]);
    push(&mut attrs, leaf::COMMON_NAME, [node.uid.as_str()]);
    push(&mut attrs, leaf::SURNAME, [node.uid.as_str()]);
    push(&mut attrs, leaf::STAFF_ID, [node.sid.as_str()]);
    push(&mut attrs, leaf::PARENT_ID, [node.pid.as_str()]);
    push(&mut attrs, leaf::TENANT_ID, [node.mid.as_str()]);
    push(&mut attrs, leaf::STREET, [node.mid.as_str()]);
    push(&mut attrs, leaf::UID_NUMBER, ["0"]);
    push(&mut attrs, leaf::GID_NUMBER, ["0"]);
    push(&mut attrs, leaf::HOME_DIRECTORY, ["/"]);
    push(&mut attrs, leaf::POSITIONS, node.positions.iter().map(String::as_str));
    attrs
}

fn text(entry: &DirEntry, name: &str) -> String {
    entry.first(name).unwrap_or_default().to_string()
}

fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "t" | "1")
}

/// Directory servers reject empty values, so they are dropped, and an
/// attribute left without values is not written at all.
fn push<I, V>(attrs: &mut AttributeSet, name: &str, values: I)
where
    I: IntoIterator<Item = V>,
    V: Into<String>,
{
    let values: Vec<String> = values
        .into_iter()
        .map(Into::into)
        .filter(|v| !v.is_empty())
        .collect();
    if !values.is_empty() {
        attrs.push((name.to_string(), values));
    }
}
