//! Decode limits.
//!
//! Bound the allocations a decoder will make on behalf of a stream, and the
//! nesting depth of inline nodes. The decoder recurses once per nested node,
//! so `max_depth` is what keeps a hostile stream from exhausting the stack.

use serde::{Deserialize, Serialize};

/// Upper bounds applied while decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeLimits {
    /// Maximum byte length of one string
    pub max_string_len: u32,
    /// Maximum number of distinct nodes in one graph
    pub max_nodes: u32,
    /// Maximum number of frames in one stack trace
    pub max_frames: u32,
    /// Maximum number of field pairs on one node
    pub max_fields: u32,
    /// Maximum number of inline nodes nested inside one another
    pub max_depth: u32,
}

impl DecodeLimits {
    /// Set the maximum string length
    #[must_use]
    pub const fn with_max_string_len(mut self, max_string_len: u32) -> Self {
        self.max_string_len = max_string_len;
        self
    }

    /// Set the maximum node count
    #[must_use]
    pub const fn with_max_nodes(mut self, max_nodes: u32) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    /// Set the maximum nesting depth
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_string_len: 16 * 1024 * 1024,
            max_nodes: 1 << 20,
            max_frames: 1 << 20,
            max_fields: 1 << 20,
            max_depth: 256,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = DecodeLimits::default();
        assert_eq!(limits.max_string_len, 16 * 1024 * 1024);
        assert_eq!(limits.max_nodes, 1 << 20);
        assert_eq!(limits.max_depth, 256);
    }

    #[test]
    fn test_builder_methods() {
        let limits = DecodeLimits::default()
            .with_max_nodes(4)
            .with_max_string_len(8)
            .with_max_depth(3);
        assert_eq!(limits.max_nodes, 4);
        assert_eq!(limits.max_depth, 3);
        assert_eq!(limits.max_string_len, 8);
        assert_eq!(limits.max_frames, DecodeLimits::default().max_frames);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let limits: DecodeLimits = serde_json::from_str(r#"{"max_nodes": 10}"#).unwrap();
        assert_eq!(limits.max_nodes, 10);
        assert_eq!(limits.max_fields, DecodeLimits::default().max_fields);
    }
}
