//! Directory schema used to store organization trees.
//!
//! Org units are `organizationalUnit` entries named `ou=<name>`; leaves
//! are `inetOrgPerson`/`posixAccount` entries named `cn=<uid>` placed
//! directly under their unit. Tenant roots sit directly under the store
//! base.

use ldap3::dn_escape;

use crate::directory::Filter;

pub const OBJECT_CLASS: &str = "objectClass";

// -----------------------------------------------------------------------
// Org units
// -----------------------------------------------------------------------

pub const ORG_UNIT_CLASS: &str = "organizationalUnit";

pub mod org {
    pub const PARENT_ID: &str = "l";
    pub const ID: &str = "st";
    pub const NAME: &str = "ou";
    pub const TYPE: &str = "businessCategory";
    pub const TENANT_ID: &str = "street";
    pub const IS_DEFAULT: &str = "description";
}

pub const ORG_ATTRS: &[&str] = &[
    org::PARENT_ID,
    org::ID,
    org::NAME,
    org::TYPE,
    org::TENANT_ID,
    org::IS_DEFAULT,
];

// -----------------------------------------------------------------------
// Leaves
// -----------------------------------------------------------------------

pub const LEAF_CLASSES: &[&str] = &["inetOrgPerson", "posixAccount"];
/// Class used to select leaves in searches.
pub const LEAF_CLASS: &str = "posixAccount";

pub mod leaf {
    pub const STAFF_ID: &str = "employeeNumber";
    pub const TENANT_ID: &str = "o";
    pub const PARENT_ID: &str = "l";
    pub const LOGIN_ID: &str = "uid";
    pub const POSITIONS: &str = "title";
    pub const COMMON_NAME: &str = "cn";
    pub const SURNAME: &str = "sn";
    pub const STREET: &str = "street";
    pub const UID_NUMBER: &str = "uidNumber";
    pub const GID_NUMBER: &str = "gidNumber";
    pub const HOME_DIRECTORY: &str = "homeDirectory";
}

pub const LEAF_ATTRS: &[&str] = &[
    leaf::LOGIN_ID,
    leaf::PARENT_ID,
    leaf::TENANT_ID,
    leaf::POSITIONS,
    leaf::STAFF_ID,
];

// -----------------------------------------------------------------------
// Filters
// -----------------------------------------------------------------------

pub fn org_units() -> Filter {
    Filter::new().eq(OBJECT_CLASS, ORG_UNIT_CLASS)
}

pub fn org_unit_by_id(id: &str) -> Filter {
    org_units().eq(org::ID, id)
}

pub fn leaves() -> Filter {
    Filter::new().eq(OBJECT_CLASS, LEAF_CLASS)
}

// -----------------------------------------------------------------------
// Distinguished names
// -----------------------------------------------------------------------

pub fn org_unit_rdn(name: &str) -> String {
    format!("{}={}", org::NAME, dn_escape(name))
}

pub fn org_unit_dn(name: &str, parent_dn: &str) -> String {
    format!("{},{parent_dn}", org_unit_rdn(name))
}

pub fn leaf_dn(uid: &str, parent_dn: &str) -> String {
    format!("{}={},{parent_dn}", leaf::COMMON_NAME, dn_escape(uid))
}
