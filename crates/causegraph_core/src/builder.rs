//! Snapshot builder.
//!
//! Walks a native exception graph and copies it into a
//! [`RemoteExceptionGraph`]. Every distinct native object becomes exactly
//! one node. A node is registered in the identity map before its cause and
//! suppressed list are visited, so a walk that comes back to it (a cycle,
//! or the same object reached twice) finds the half-built node instead of
//! recursing forever.

use crate::graph::{Field, GraphAssembler, RemoteExceptionGraph};
use crate::id::NodeId;
use crate::native::NativeException;
use crate::registry::ExtractorRegistry;
use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Builds snapshot graphs from native exceptions
#[derive(Debug, Clone, Copy)]
pub struct SnapshotBuilder<'r> {
    registry: &'r ExtractorRegistry,
}

impl<'r> SnapshotBuilder<'r> {
    /// Create a builder that extracts fields with the given registry
    #[must_use]
    pub fn new(registry: &'r ExtractorRegistry) -> Self {
        Self { registry }
    }

    /// Snapshot the graph reachable from `root`.
    ///
    /// Never fails: cycles and shared references are resolved through the
    /// identity map of this call.
    #[must_use]
    pub fn build(&self, root: &Arc<dyn NativeException>) -> RemoteExceptionGraph {
        let mut walk = Walk {
            registry: self.registry,
            assembler: GraphAssembler::new(),
            seen: HashMap::new(),
            pinned: Vec::new(),
        };
        let root_id = walk.convert(root);
        let graph = walk.assembler.finish_unchecked(root_id);
        debug!(nodes = graph.len(), root = %graph.root(), "built exception snapshot");
        graph
    }
}

/// State owned by a single build call
struct Walk<'r> {
    registry: &'r ExtractorRegistry,
    assembler: GraphAssembler,
    seen: HashMap<*const (), NodeId>,
    // Keeps every visited object alive so its address stays unique.
    pinned: Vec<Arc<dyn NativeException>>,
}

impl Walk<'_> {
    fn convert(&mut self, exception: &Arc<dyn NativeException>) -> NodeId {
        let key = Arc::as_ptr(exception) as *const ();
        if let Some(&id) = self.seen.get(&key) {
            return id;
        }

        let id = self.assembler.allocate();
        self.seen.insert(key, id);
        self.pinned.push(Arc::clone(exception));
        trace!(node = %id, class = exception.type_name(), "allocated snapshot node");

        let fields = distinct_fields(exception.type_name(), self.registry.extract(&**exception));
        if let Some(record) = self.assembler.record_mut(id) {
            record.class_name = exception.type_name().to_string();
            record.message = exception.message().map(str::to_string);
            record.stack_trace = exception.stack_trace().to_vec();
            record.fields = fields;
        }

        if let Some(cause) = exception.cause() {
            let cause_id = self.convert(&cause);
            if let Some(record) = self.assembler.record_mut(id) {
                record.cause = Some(cause_id);
            }
        }

        for suppressed in exception.suppressed() {
            let suppressed_id = self.convert(&suppressed);
            if let Some(record) = self.assembler.record_mut(id) {
                record.suppressed.push(suppressed_id);
            }
        }

        id
    }
}

/// Drop repeated field names, keeping the first occurrence
fn distinct_fields(type_name: &str, fields: Vec<Field>) -> Vec<Field> {
    let mut names = HashSet::with_capacity(fields.len());
    fields
        .into_iter()
        .filter(|field| {
            let fresh = names.insert(field.name.clone());
            if !fresh {
                warn!(class = type_name, field = %field.name, "extractor produced a duplicate field name");
            }
            fresh
        })
        .collect()
}
