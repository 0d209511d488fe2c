//! Org unit domain model.
//!
//! Org units are the interior nodes of a tenant's tree. The tenant root
//! is itself an org unit whose `id` equals the tenant id (`mid`) and
//! whose `pid` is empty.

use serde::{Deserialize, Serialize};

/// Kind of org unit. Stored in the backend as its integer code.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum OrgType {
    /// Missing or unreadable code.
    #[default]
    Unspecified,
    Tenant,
    Branch,
    Department,
}

impl OrgType {
    pub fn code(self) -> i32 {
        match self {
            OrgType::Unspecified => 0,
            OrgType::Tenant => 1,
            OrgType::Branch => 2,
            OrgType::Department => 3,
        }
    }

    /// Unknown codes map to [`OrgType::Unspecified`].
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => OrgType::Tenant,
            2 => OrgType::Branch,
            3 => OrgType::Department,
            _ => OrgType::Unspecified,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct OrgNode {
    /// Tenant id.
    pub mid: String,
    /// Parent unit id. Empty only for the tenant root.
    pub pid: String,
    /// Unique within the tenant's tree.
    pub id: String,
    pub node_type: OrgType,
    /// Unique among siblings; also the unit's path component.
    pub name: String,
    pub is_default: bool,
}

impl OrgNode {
    pub fn is_tenant_root(&self) -> bool {
        self.pid.is_empty() || self.id == self.mid
    }
}

/// Fields required to create a new org unit.
///
/// An empty `pid` creates the tenant root, whose id is forced to `mid`.
/// Otherwise `id` is generated when `None`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CreateOrgNode {
    pub mid: String,
    pub pid: String,
    pub id: Option<String>,
    pub node_type: OrgType,
    pub name: String,
    pub is_default: bool,
}

impl CreateOrgNode {
    /// Input for a tenant root.
    pub fn tenant(mid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            mid: mid.into(),
            node_type: OrgType::Tenant,
            name: name.into(),
            ..Default::default()
        }
    }

    /// Input for a unit under `pid` with a generated id.
    pub fn child(
        mid: impl Into<String>,
        pid: impl Into<String>,
        node_type: OrgType,
        name: impl Into<String>,
    ) -> Self {
        Self {
            mid: mid.into(),
            pid: pid.into(),
            node_type,
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Rename of an existing org unit. Only the name is mutable; the unit's
/// whole subtree moves with it. `name: None` changes nothing.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateOrgNode {
    pub mid: String,
    pub id: String,
    /// New name. `None` leaves the unit untouched; `Some("")` is rejected
    /// as an invalid argument rather than treated as "no change".
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_codes_roundtrip() {
        for t in [OrgType::Tenant, OrgType::Branch, OrgType::Department] {
            assert_eq!(OrgType::from_code(t.code()), t);
        }
        assert_eq!(OrgType::from_code(42), OrgType::Unspecified);
        assert_eq!(OrgType::default().code(), 0);
    }

    #[test]
    fn tenant_input_has_no_parent() {
        let input = CreateOrgNode::tenant("T1", "Acme");
        assert!(input.pid.is_empty());
        assert_eq!(input.node_type, OrgType::Tenant);
        assert!(input.id.is_none());
    }

    #[test]
    fn tenant_root_is_recognized() {
        let root = OrgNode {
            mid: "T1".into(),
            id: "T1".into(),
            ..Default::default()
        };
        assert!(root.is_tenant_root());

        let branch = OrgNode {
            mid: "T1".into(),
            pid: "T1".into(),
            id: "B1".into(),
            ..Default::default()
        };
        assert!(!branch.is_tenant_root());
    }
}
