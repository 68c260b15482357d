//! Causegraph Core
//!
//! Portable snapshots of in-process exception graphs. A native exception,
//! its cause chain and its suppressed lists are copied into an arena of
//! immutable node records; cycles and shared references are kept as
//! integer edges so the snapshot can cross a process boundary intact.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod error;
pub mod frame;
pub mod graph;
pub mod id;
pub mod native;
pub mod registry;
pub mod render;

// Re-exports
pub use builder::SnapshotBuilder;
pub use error::{CoreError, CoreResult};
pub use frame::Frame;
pub use graph::{CauseChain, Field, GraphAssembler, NodeRecord, NodeRef, RemoteExceptionGraph};
pub use id::NodeId;
pub use native::{NativeException, SqlError, Throwable, ThrowableState, TransactionError};
pub use registry::{Extractor, ExtractorRegistry};

/// Snapshot a native exception graph with the process-wide extractor registry.
#[must_use]
pub fn snapshot(root: &std::sync::Arc<dyn NativeException>) -> RemoteExceptionGraph {
    SnapshotBuilder::new(ExtractorRegistry::global()).build(root)
}
