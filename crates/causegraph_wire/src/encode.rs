//! Graph encoder.

use crate::error::CodecResult;
use crate::marker;
use crate::stream::WireWriter;
use crate::WIRE_VERSION;
use causegraph_core::{NodeId, NodeRef, RemoteExceptionGraph};
use std::collections::HashMap;
use std::io::Write;
use tracing::debug;

/// Writes one graph to a sink.
///
/// Wire ids are assigned in the order nodes are first written, starting
/// at 0 for the root. They are independent of the graph's own arena ids.
pub struct Encoder<'g, W> {
    graph: &'g RemoteExceptionGraph,
    out: WireWriter<W>,
    ids: HashMap<NodeId, u32>,
}

impl<'g, W: Write> Encoder<'g, W> {
    /// Create an encoder for a graph
    pub fn new(graph: &'g RemoteExceptionGraph, writer: W) -> Self {
        Self {
            graph,
            out: WireWriter::new(writer),
            ids: HashMap::with_capacity(graph.len()),
        }
    }

    /// Write the version byte and the whole graph
    ///
    /// # Errors
    ///
    /// Returns error if the sink fails or a length exceeds `u32`
    pub fn encode(mut self) -> CodecResult<()> {
        self.out.write_u8(WIRE_VERSION)?;
        self.write_node(self.graph.root())?;
        self.out.flush()?;
        debug!(
            nodes = self.ids.len(),
            bytes = self.out.bytes_written(),
            "encoded exception graph"
        );
        Ok(())
    }

    fn write_node(&mut self, node: NodeRef<'g>) -> CodecResult<()> {
        let wire_id = self.ids.len() as u32;
        self.ids.insert(node.id(), wire_id);

        self.out.write_str(node.class_name())?;
        self.out.write_opt_str(node.message())?;

        let frames = node.stack_trace();
        self.out.write_len(frames.len())?;
        for frame in frames {
            self.out.write_str(&frame.declaring_class)?;
            self.out.write_str(&frame.method_name)?;
            self.out.write_opt_str(frame.file_name.as_deref())?;
            self.out.write_i32(frame.line_number)?;
        }

        let fields = node.fields();
        self.out.write_len(fields.len() * 2)?;
        for field in fields {
            self.out.write_opt_str(Some(field.name.as_str()))?;
            self.out.write_opt_str(Some(field.value.as_str()))?;
        }

        match node.cause() {
            Some(cause) => self.write_edge(cause)?,
            None => self.out.write_u8(marker::ABSENT)?,
        }

        self.out.write_len(node.suppressed().len())?;
        for suppressed in node.suppressed() {
            self.write_edge(suppressed)?;
        }
        Ok(())
    }

    fn write_edge(&mut self, target: NodeRef<'g>) -> CodecResult<()> {
        match self.ids.get(&target.id()) {
            Some(&wire_id) => {
                self.out.write_u8(marker::BACK_REFERENCE)?;
                self.out.write_u32(wire_id)?;
            }
            None => {
                self.out.write_u8(marker::NEW_NODE)?;
                self.write_node(target)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use causegraph_core::{NativeException, Throwable, snapshot};

    fn encode(graph: &RemoteExceptionGraph) -> Vec<u8> {
        let mut out = Vec::new();
        Encoder::new(graph, &mut out).encode().unwrap();
        out
    }

    #[test]
    fn test_single_node_layout() {
        let e = Throwable::new("A").into_shared();
        let bytes = encode(&snapshot(&e));
        assert_eq!(
            bytes,
            vec![
                WIRE_VERSION,
                0, 0, 0, 1, b'A', // class name
                0, // no message
                0, 0, 0, 0, // no frames
                0, 0, 0, 0, // no fields
                0, // no cause
                0, 0, 0, 0, // no suppressed
            ]
        );
    }

    #[test]
    fn test_self_cause_is_back_reference() {
        let e = Throwable::new("A").into_shared();
        e.init_cause(e.clone()).unwrap();
        let bytes = encode(&snapshot(&e));
        assert_eq!(
            &bytes[bytes.len() - 9..],
            &[marker::BACK_REFERENCE, 0, 0, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_each_node_written_once() {
        let shared = Throwable::new("app.SharedNode").into_shared();
        let root = Throwable::new("R").into_shared();
        root.init_cause(shared.clone()).unwrap();
        root.add_suppressed(shared.clone());
        root.add_suppressed(shared);

        let bytes = encode(&snapshot(&root));
        let needle = b"app.SharedNode";
        let hits = bytes.windows(needle.len()).filter(|w| *w == needle.as_slice()).count();
        assert_eq!(hits, 1);
    }
}
