//! Leaf (staff record) domain model.

use serde::{Deserialize, Serialize};

/// A staff record attached under an org unit, addressed by
/// (parent unit, `uid`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct LeafNode {
    pub mid: String,
    /// Containing unit id.
    pub pid: String,
    /// Staff id.
    pub sid: String,
    /// Login id, unique under its parent.
    pub uid: String,
    /// Role identifiers. Order carries no meaning.
    pub positions: Vec<String>,
}

impl LeafNode {
    pub fn has_position(&self, position_id: &str) -> bool {
        self.positions.iter().any(|p| p == position_id)
    }
}

/// Position update for an existing leaf.
///
/// `positions: None` leaves stored positions untouched, `Some(vec![])`
/// clears them.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateLeafNode {
    pub mid: String,
    pub pid: String,
    pub uid: String,
    pub positions: Option<Vec<String>>,
}
