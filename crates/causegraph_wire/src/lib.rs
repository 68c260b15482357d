//! Causegraph Wire Codec
//!
//! Self-describing binary encoding of [`RemoteExceptionGraph`]s. Each
//! distinct node is written once, in pre-order (node, cause, suppressed);
//! later references to it are back-references to its sequential id, so
//! cycles fit in a finite stream and decode to true cycles.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod decode;
pub mod encode;
pub mod error;
pub mod limits;
pub mod stream;

pub use decode::Decoder;
pub use encode::Encoder;
pub use error::{CodecError, CodecResult, Corruption, ErrorKind, FieldListDefect, FieldPosition};
pub use limits::DecodeLimits;
pub use stream::{WireReader, WireWriter};

use bytes::{BufMut, Bytes, BytesMut};
use causegraph_core::RemoteExceptionGraph;
use std::io::{Read, Write};

/// Version byte written at the start of every stream
pub const WIRE_VERSION: u8 = 1;

/// Marker bytes for presence and node edges
pub mod marker {
    /// Optional value absent, or no cause
    pub const ABSENT: u8 = 0;
    /// Optional value present
    pub const PRESENT: u8 = 1;
    /// A new node is written inline
    pub const NEW_NODE: u8 = 1;
    /// Reference to an already written node id
    pub const BACK_REFERENCE: u8 = 2;
}

/// Codec with configurable decode limits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WireCodec {
    limits: DecodeLimits,
}

impl WireCodec {
    /// Create a codec with the given limits
    #[must_use]
    pub fn new(limits: DecodeLimits) -> Self {
        Self { limits }
    }

    /// Decode limits in effect
    #[must_use]
    pub fn limits(&self) -> &DecodeLimits {
        &self.limits
    }

    /// Encode a graph to a writer
    ///
    /// # Errors
    ///
    /// Returns error if the writer fails
    pub fn encode<W: Write>(&self, graph: &RemoteExceptionGraph, writer: W) -> CodecResult<()> {
        Encoder::new(graph, writer).encode()
    }

    /// Encode a graph into a byte vector
    ///
    /// # Errors
    ///
    /// Returns error if a length does not fit the wire format
    pub fn encode_to_vec(&self, graph: &RemoteExceptionGraph) -> CodecResult<Vec<u8>> {
        let mut out = Vec::new();
        self.encode(graph, &mut out)?;
        Ok(out)
    }

    /// Encode a graph into a frozen buffer for a transport
    ///
    /// # Errors
    ///
    /// Returns error if a length does not fit the wire format
    pub fn encode_to_bytes(&self, graph: &RemoteExceptionGraph) -> CodecResult<Bytes> {
        let mut out = BytesMut::new().writer();
        self.encode(graph, &mut out)?;
        Ok(out.into_inner().freeze())
    }

    /// Decode a graph from a reader
    ///
    /// # Errors
    ///
    /// Returns error if the stream is corrupted or the field list is malformed
    pub fn decode<R: Read>(&self, reader: R) -> CodecResult<RemoteExceptionGraph> {
        Decoder::new(reader, self.limits).decode()
    }
}

/// Encode a graph to a writer
///
/// # Errors
///
/// Returns error if the writer fails
pub fn encode<W: Write>(graph: &RemoteExceptionGraph, writer: W) -> CodecResult<()> {
    WireCodec::default().encode(graph, writer)
}

/// Encode a graph into a byte vector
///
/// # Errors
///
/// Returns error if a length does not fit the wire format
pub fn encode_to_vec(graph: &RemoteExceptionGraph) -> CodecResult<Vec<u8>> {
    WireCodec::default().encode_to_vec(graph)
}

/// Decode a graph from a reader with default limits
///
/// # Errors
///
/// Returns error if the stream is corrupted or the field list is malformed
pub fn decode<R: Read>(reader: R) -> CodecResult<RemoteExceptionGraph> {
    WireCodec::default().decode(reader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Buf;
    use causegraph_core::{NativeException, Throwable, snapshot};

    #[test]
    fn test_bytes_roundtrip() {
        let outer = Throwable::new("app.Outer").with_message("outer").into_shared();
        outer
            .init_cause(Throwable::new("app.Inner").into_shared())
            .unwrap();
        let graph = snapshot(&outer);

        let codec = WireCodec::default();
        let bytes = codec.encode_to_bytes(&graph).unwrap();
        assert_eq!(bytes[0], WIRE_VERSION);
        assert_eq!(bytes.as_ref(), codec.encode_to_vec(&graph).unwrap().as_slice());

        let decoded = codec.decode(bytes.reader()).unwrap();
        assert_eq!(decoded, graph);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let e = Throwable::new("app.Boom").with_message("x").into_shared();
        let graph = snapshot(&e);
        assert_eq!(encode_to_vec(&graph).unwrap(), encode_to_vec(&graph).unwrap());
    }
}
