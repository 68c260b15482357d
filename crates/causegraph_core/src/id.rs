//! Node identifiers.
//!
//! A node id is the index of a node record in its graph's arena. Ids are
//! assigned sequentially in first-encounter order, which is also the order
//! the wire format uses for back-references.

use serde::{Deserialize, Serialize};

/// Node identifier - index of a node in one graph's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// Create from a raw arena index
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw arena index
    #[must_use]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }

    /// Get as a `usize` for slice indexing
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_raw() {
        let id = NodeId::from_raw(42);
        assert_eq!(id.as_u32(), 42);
        assert_eq!(id.index(), 42);
    }

    #[test]
    fn test_node_id_display() {
        assert_eq!(NodeId::from_raw(5).to_string(), "#5");
    }

    #[test]
    fn test_node_id_serializes_as_integer() {
        let json = serde_json::to_string(&NodeId::from_raw(9)).unwrap();
        assert_eq!(json, "9");
    }
}
