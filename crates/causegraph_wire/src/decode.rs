//! Graph decoder.
//!
//! The decoder allocates a placeholder node the moment it reads a "new
//! node" marker, before reading that node's body. Ids are therefore
//! assigned in the same order the encoder assigned them, and a
//! back-reference to an ancestor whose body is still being read resolves
//! to that ancestor's slot.

use crate::error::{CodecError, CodecResult, Corruption, FieldListDefect, FieldPosition};
use crate::limits::DecodeLimits;
use crate::marker;
use crate::stream::WireReader;
use crate::WIRE_VERSION;
use causegraph_core::{Field, Frame, GraphAssembler, NodeId, NodeRecord, RemoteExceptionGraph};
use std::collections::HashSet;
use std::io::Read;
use tracing::{debug, trace, warn};

/// Reads one graph from a source
pub struct Decoder<R> {
    input: WireReader<R>,
    limits: DecodeLimits,
    assembler: GraphAssembler,
}

impl<R: Read> Decoder<R> {
    /// Create a decoder with the given limits
    pub fn new(reader: R, limits: DecodeLimits) -> Self {
        Self {
            input: WireReader::new(reader, limits.max_string_len),
            limits,
            assembler: GraphAssembler::new(),
        }
    }

    /// Read the version byte and the whole graph.
    ///
    /// On error nothing is returned; the partially read graph is dropped.
    ///
    /// # Errors
    ///
    /// Returns error if the stream is corrupted or a field list is malformed
    pub fn decode(mut self) -> CodecResult<RemoteExceptionGraph> {
        match self.read_graph() {
            Ok(graph) => {
                debug!(nodes = graph.len(), root = %graph.root(), "decoded exception graph");
                Ok(graph)
            }
            Err(err) => {
                warn!(error = %err, nodes_read = self.assembler.len(), "failed to decode exception graph");
                Err(err)
            }
        }
    }

    fn read_graph(&mut self) -> CodecResult<RemoteExceptionGraph> {
        let version = self.input.read_u8()?;
        if version != WIRE_VERSION {
            return Err(Corruption::UnsupportedVersion(version).into());
        }
        let root = self.read_node(1)?;
        let assembler = std::mem::take(&mut self.assembler);
        Ok(assembler.finish(root)?)
    }

    /// Read one inline node; `depth` counts the root as 1
    fn read_node(&mut self, depth: u32) -> CodecResult<NodeId> {
        if depth > self.limits.max_depth {
            return Err(Corruption::LengthOutOfRange {
                what: "nesting depth",
                len: depth,
                limit: self.limits.max_depth,
            }
            .into());
        }
        let assigned = self.assembler.len() as u32;
        if assigned >= self.limits.max_nodes {
            return Err(Corruption::LengthOutOfRange {
                what: "node count",
                len: assigned.saturating_add(1),
                limit: self.limits.max_nodes,
            }
            .into());
        }
        let id = self.assembler.allocate();

        let class_name = self.input.read_str()?;
        trace!(node = %id, class = %class_name, "allocated decoded node");
        let message = self.input.read_opt_str("message")?;
        let stack_trace = self.read_frames()?;
        let fields = self.read_fields()?;

        let cause = self.read_edge("cause", true, depth)?;

        let count = self.input.read_len("suppressed count", u32::MAX)?;
        let mut suppressed = Vec::with_capacity(count.min(16) as usize);
        for _ in 0..count {
            if let Some(target) = self.read_edge("suppressed", false, depth)? {
                suppressed.push(target);
            }
        }

        if let Some(record) = self.assembler.record_mut(id) {
            *record = NodeRecord {
                class_name,
                message,
                stack_trace,
                fields,
                cause,
                suppressed,
            };
        }
        Ok(id)
    }

    fn read_frames(&mut self) -> CodecResult<Vec<Frame>> {
        let count = self.input.read_len("frame count", self.limits.max_frames)?;
        let mut frames = Vec::with_capacity(count.min(64) as usize);
        for _ in 0..count {
            let declaring_class = self.input.read_str()?;
            let method_name = self.input.read_str()?;
            let file_name = self.input.read_opt_str("file name")?;
            let line_number = self.input.read_i32()?;
            frames.push(Frame {
                declaring_class,
                method_name,
                file_name,
                line_number,
            });
        }
        Ok(frames)
    }

    fn read_fields(&mut self) -> CodecResult<Vec<Field>> {
        let strings = self.input.read_u32()?;
        if strings % 2 != 0 {
            return Err(CodecError::MalformedFieldList(FieldListDefect::OddStringCount(strings)));
        }
        let pairs = strings / 2;
        if pairs > self.limits.max_fields {
            return Err(Corruption::LengthOutOfRange {
                what: "field count",
                len: pairs,
                limit: self.limits.max_fields,
            }
            .into());
        }

        let mut fields = Vec::with_capacity(pairs.min(16) as usize);
        let mut names = HashSet::new();
        for pair in 0..pairs {
            let name = self
                .input
                .read_opt_str("field name")?
                .ok_or(CodecError::NullFieldEntry {
                    pair,
                    position: FieldPosition::Name,
                })?;
            let value = self
                .input
                .read_opt_str("field value")?
                .ok_or(CodecError::NullFieldEntry {
                    pair,
                    position: FieldPosition::Value,
                })?;
            if !names.insert(name.clone()) {
                return Err(CodecError::MalformedFieldList(FieldListDefect::DuplicateName(name)));
            }
            fields.push(Field { name, value });
        }
        Ok(fields)
    }

    /// Read an edge marker; `None` only when absent is allowed
    fn read_edge(
        &mut self,
        context: &'static str,
        allow_absent: bool,
        depth: u32,
    ) -> CodecResult<Option<NodeId>> {
        match self.input.read_u8()? {
            marker::ABSENT if allow_absent => Ok(None),
            marker::NEW_NODE => Ok(Some(self.read_node(depth + 1)?)),
            marker::BACK_REFERENCE => {
                let raw = self.input.read_u32()?;
                let id = NodeId::from_raw(raw);
                if !self.assembler.contains(id) {
                    return Err(Corruption::BackReferenceOutOfRange {
                        id: raw,
                        assigned: self.assembler.len() as u32,
                    }
                    .into());
                }
                Ok(Some(id))
            }
            value => Err(Corruption::InvalidMarker { context, value }.into()),
        }
    }
}
