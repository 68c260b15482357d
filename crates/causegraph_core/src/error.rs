//! Core error types for causegraph.

use crate::id::NodeId;

/// Core result type
pub type CoreResult<T> = Result<T, CoreError>;

/// Core error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// The cause of a native exception can only be set once
    #[error("Cause already initialized for {class_name}")]
    CauseAlreadyInitialized {
        /// Runtime type of the exception whose cause was set twice
        class_name: String,
    },

    /// An extractor is already registered for the type
    #[error("Extractor already registered for {type_name}")]
    DuplicateExtractor {
        /// Exact runtime type name
        type_name: String,
    },

    /// A node edge points outside the arena
    #[error("Node {from} references missing node {to}")]
    DanglingReference {
        /// Node holding the edge
        from: NodeId,
        /// Missing target
        to: NodeId,
    },

    /// A record repeats a field name
    #[error("Node {node} repeats field {name}")]
    DuplicateField {
        /// Node holding the fields
        node: NodeId,
        /// Repeated name
        name: String,
    },

    /// The root id is outside the arena
    #[error("Root {root} is outside a graph of {len} nodes")]
    RootOutOfRange {
        /// Requested root
        root: NodeId,
        /// Number of allocated nodes
        len: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::CauseAlreadyInitialized {
            class_name: "Boom".to_string(),
        };
        assert_eq!(format!("{}", err), "Cause already initialized for Boom");

        let err = CoreError::DanglingReference {
            from: NodeId::from_raw(0),
            to: NodeId::from_raw(7),
        };
        assert_eq!(format!("{}", err), "Node #0 references missing node #7");
    }

    #[test]
    fn test_root_out_of_range_error() {
        let err = CoreError::RootOutOfRange {
            root: NodeId::from_raw(3),
            len: 2,
        };
        let s = format!("{}", err);
        assert!(s.contains("#3"));
        assert!(s.contains("2 nodes"));
    }
}
