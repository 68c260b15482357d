//! Snapshot graph.
//!
//! A [`RemoteExceptionGraph`] owns every node of one snapshot in an arena.
//! Edges (`cause`, `suppressed`) are [`NodeId`] indices into that arena, so
//! cycles cost nothing to represent and the whole graph is dropped at once.
//! Node identity is "same graph, same id": two [`NodeRef`]s compare equal
//! only when they are the same arena slot, never by content.
//!
//! The derived `PartialEq` compares arenas slot for slot. Builders and
//! decoders allocate ids in pre-order (node, then its cause, then its
//! suppressed list), so graphs produced that way from the same source are
//! `==`. Graphs assembled by hand may number their nodes differently;
//! [`RemoteExceptionGraph::is_isomorphic`] compares the shape reachable from
//! the roots regardless of numbering.

use crate::error::{CoreError, CoreResult};
use crate::frame::Frame;
use crate::id::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// A named string field extracted from a known exception type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    /// Field name
    pub name: String,
    /// Field value
    pub value: String,
}

impl Field {
    /// Create a new field
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Stored state of one node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Runtime type name of the original exception
    pub class_name: String,
    /// Message, absent when the original had none
    pub message: Option<String>,
    /// Stack, outermost call first
    pub stack_trace: Vec<Frame>,
    /// Extracted fields in extractor order
    pub fields: Vec<Field>,
    /// Cause edge
    pub cause: Option<NodeId>,
    /// Suppressed edges in original order
    pub suppressed: Vec<NodeId>,
}

impl NodeRecord {
    fn edges(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.cause.iter().chain(self.suppressed.iter()).copied()
    }
}

/// Immutable snapshot of an exception graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteExceptionGraph {
    root: NodeId,
    nodes: Vec<NodeRecord>,
}

impl RemoteExceptionGraph {
    /// Root node
    #[must_use]
    pub fn root(&self) -> NodeRef<'_> {
        NodeRef {
            graph: self,
            id: self.root,
        }
    }

    /// Get a node by id
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_>> {
        (id.index() < self.nodes.len()).then_some(NodeRef { graph: self, id })
    }

    /// Number of distinct nodes
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes. Always false for a finished graph.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in id order
    pub fn iter(&self) -> impl Iterator<Item = NodeRef<'_>> {
        (0..self.nodes.len()).map(move |i| NodeRef {
            graph: self,
            id: NodeId::from_raw(i as u32),
        })
    }

    /// Whether the nodes reachable from both roots correspond one to one,
    /// with equal content and edges that map onto each other.
    ///
    /// Ids are not compared, so a hand-assembled graph matches its decoded
    /// copy even when its ids were not assigned in pre-order. Nodes not
    /// reachable from the root are ignored.
    #[must_use]
    pub fn is_isomorphic(&self, other: &RemoteExceptionGraph) -> bool {
        let mut forward: HashMap<NodeId, NodeId> = HashMap::new();
        let mut backward: HashMap<NodeId, NodeId> = HashMap::new();
        let mut pending = vec![(self.root, other.root)];

        while let Some((a, b)) = pending.pop() {
            if let Some(&mapped) = forward.get(&a) {
                if mapped != b {
                    return false;
                }
                continue;
            }
            if backward.contains_key(&b) {
                return false;
            }
            forward.insert(a, b);
            backward.insert(b, a);

            let (left, right) = (&self.nodes[a.index()], &other.nodes[b.index()]);
            if left.class_name != right.class_name
                || left.message != right.message
                || left.stack_trace != right.stack_trace
                || left.fields != right.fields
                || left.suppressed.len() != right.suppressed.len()
            {
                return false;
            }
            match (left.cause, right.cause) {
                (Some(ca), Some(cb)) => pending.push((ca, cb)),
                (None, None) => {}
                _ => return false,
            }
            pending.extend(left.suppressed.iter().copied().zip(right.suppressed.iter().copied()));
        }
        true
    }
}

/// Borrowed handle to one node of a graph
#[derive(Clone, Copy)]
pub struct NodeRef<'g> {
    graph: &'g RemoteExceptionGraph,
    id: NodeId,
}

impl<'g> NodeRef<'g> {
    /// Arena id of this node
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Stored record
    #[must_use]
    pub fn record(&self) -> &'g NodeRecord {
        &self.graph.nodes[self.id.index()]
    }

    /// Runtime type name of the original exception
    #[must_use]
    pub fn class_name(&self) -> &'g str {
        &self.record().class_name
    }

    /// Message, if the original had one
    #[must_use]
    pub fn message(&self) -> Option<&'g str> {
        self.record().message.as_deref()
    }

    /// Stack, outermost call first
    #[must_use]
    pub fn stack_trace(&self) -> &'g [Frame] {
        &self.record().stack_trace
    }

    /// Extracted fields in order
    #[must_use]
    pub fn fields(&self) -> &'g [Field] {
        &self.record().fields
    }

    /// Names of the extracted fields in order
    pub fn field_names(self) -> impl ExactSizeIterator<Item = &'g str> {
        self.record().fields.iter().map(|f| f.name.as_str())
    }

    /// Value of a field by name
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&'g str> {
        self.record()
            .fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }

    /// Cause node
    #[must_use]
    pub fn cause(&self) -> Option<NodeRef<'g>> {
        self.record().cause.map(|id| self.sibling(id))
    }

    /// Suppressed nodes in order
    pub fn suppressed(self) -> impl ExactSizeIterator<Item = NodeRef<'g>> {
        let graph = self.graph;
        self.record()
            .suppressed
            .iter()
            .map(move |&id| NodeRef { graph, id })
    }

    /// Suppressed node at an index
    #[must_use]
    pub fn suppressed_at(&self, index: usize) -> Option<NodeRef<'g>> {
        self.record().suppressed.get(index).map(|&id| self.sibling(id))
    }

    /// Walk the cause chain starting at this node, stopping before any repeat
    #[must_use]
    pub fn cause_chain(&self) -> CauseChain<'g> {
        CauseChain {
            next: Some(*self),
            seen: HashSet::new(),
        }
    }

    /// Whether both handles are the same node of the same graph
    #[must_use]
    pub fn same_node(&self, other: &NodeRef<'_>) -> bool {
        std::ptr::eq(self.graph, other.graph) && self.id == other.id
    }

    fn sibling(&self, id: NodeId) -> NodeRef<'g> {
        NodeRef {
            graph: self.graph,
            id,
        }
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.same_node(other)
    }
}

impl Eq for NodeRef<'_> {}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("class_name", &self.class_name())
            .finish()
    }
}

impl fmt::Display for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message() {
            Some(message) => write!(f, "{}: {}", self.class_name(), message),
            None => write!(f, "{}", self.class_name()),
        }
    }
}

/// Iterator over a cause chain that ends at the first repeated node
pub struct CauseChain<'g> {
    next: Option<NodeRef<'g>>,
    seen: HashSet<NodeId>,
}

impl<'g> Iterator for CauseChain<'g> {
    type Item = NodeRef<'g>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        if !self.seen.insert(current.id) {
            return None;
        }
        self.next = current.cause();
        Some(current)
    }
}

/// Arena under construction.
///
/// Nodes are allocated as empty placeholders and filled in afterwards, so
/// an edge may point at a node whose own edges are not known yet.
#[derive(Debug, Default)]
pub struct GraphAssembler {
    nodes: Vec<NodeRecord>,
}

impl GraphAssembler {
    /// Create an empty assembler
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next id with an empty record
    pub fn allocate(&mut self) -> NodeId {
        let id = NodeId::from_raw(self.nodes.len() as u32);
        self.nodes.push(NodeRecord::default());
        id
    }

    /// Mutable access to an allocated record
    pub fn record_mut(&mut self, id: NodeId) -> Option<&mut NodeRecord> {
        self.nodes.get_mut(id.index())
    }

    /// Number of allocated nodes
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether nothing was allocated
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether an id has been allocated
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    /// Freeze into a graph after checking every record.
    ///
    /// # Errors
    ///
    /// Returns error if the root or any edge is outside the arena, or a
    /// record repeats a field name
    pub fn finish(self, root: NodeId) -> CoreResult<RemoteExceptionGraph> {
        if !self.contains(root) {
            return Err(CoreError::RootOutOfRange {
                root,
                len: self.nodes.len(),
            });
        }
        for (index, record) in self.nodes.iter().enumerate() {
            if let Some(to) = record.edges().find(|to| !self.contains(*to)) {
                return Err(CoreError::DanglingReference {
                    from: NodeId::from_raw(index as u32),
                    to,
                });
            }
            let mut names = HashSet::with_capacity(record.fields.len());
            if let Some(field) = record.fields.iter().find(|f| !names.insert(f.name.as_str())) {
                return Err(CoreError::DuplicateField {
                    node: NodeId::from_raw(index as u32),
                    name: field.name.clone(),
                });
            }
        }
        Ok(self.finish_unchecked(root))
    }

    pub(crate) fn finish_unchecked(self, root: NodeId) -> RemoteExceptionGraph {
        RemoteExceptionGraph {
            root,
            nodes: self.nodes,
        }
    }
}
