//! Codec error types.

use causegraph_core::CoreError;
use std::fmt;
use std::io;

/// Codec result type
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors raised while encoding or decoding a graph
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The field section does not hold well-formed name/value pairs
    #[error("Malformed field list: {0}")]
    MalformedFieldList(FieldListDefect),

    /// A field name or value is absent
    #[error("Null field {position} in pair {pair}")]
    NullFieldEntry {
        /// Zero-based pair index
        pair: u32,
        /// Which half of the pair was absent
        position: FieldPosition,
    },

    /// The stream is structurally invalid or ended early
    #[error("Corrupted stream: {0}")]
    Corrupted(Corruption),

    /// The sink failed while encoding
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl CodecError {
    /// Classify the error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedFieldList(_) => ErrorKind::MalformedFieldList,
            Self::NullFieldEntry { .. } => ErrorKind::NullFieldEntry,
            Self::Corrupted(_) => ErrorKind::CorruptedStream,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    /// The corruption detail, if this is a corruption error
    #[must_use]
    pub fn corruption(&self) -> Option<&Corruption> {
        match self {
            Self::Corrupted(corruption) => Some(corruption),
            _ => None,
        }
    }
}

impl From<Corruption> for CodecError {
    fn from(corruption: Corruption) -> Self {
        Self::Corrupted(corruption)
    }
}

impl From<CoreError> for CodecError {
    fn from(err: CoreError) -> Self {
        Self::Corrupted(Corruption::Graph(err))
    }
}

/// Error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Odd field string count or repeated field name
    MalformedFieldList,
    /// Null name or value in a field pair
    NullFieldEntry,
    /// Any other structural violation of the stream
    CorruptedStream,
    /// Sink failure while encoding
    Io,
}

/// Structural violations of a stream
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Corruption {
    /// The source ended in the middle of a record
    #[error("stream ended mid-record")]
    Truncated,

    /// The source failed
    #[error("transport failure: {0}")]
    Transport(String),

    /// Unsupported format version
    #[error("unsupported wire version {0}")]
    UnsupportedVersion(u8),

    /// A marker byte had no meaning in its position
    #[error("invalid {context} marker {value}")]
    InvalidMarker {
        /// Where the marker was read
        context: &'static str,
        /// Byte read
        value: u8,
    },

    /// A back-reference named an id not assigned yet
    #[error("back-reference to node {id} but only {assigned} assigned")]
    BackReferenceOutOfRange {
        /// Referenced id
        id: u32,
        /// Ids assigned so far
        assigned: u32,
    },

    /// A length or count exceeds the configured limit
    #[error("{what} {len} exceeds limit {limit}")]
    LengthOutOfRange {
        /// What was being counted
        what: &'static str,
        /// Declared value
        len: u32,
        /// Configured limit
        limit: u32,
    },

    /// A string was not valid UTF-8
    #[error("string is not valid UTF-8")]
    InvalidUtf8,

    /// The decoded arena failed validation
    #[error("{0}")]
    Graph(CoreError),
}

impl From<io::Error> for Corruption {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => Self::Truncated,
            _ => Self::Transport(err.to_string()),
        }
    }
}

/// Why a field list is malformed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldListDefect {
    /// Names and values must come in pairs
    #[error("{0} strings cannot form name/value pairs")]
    OddStringCount(u32),

    /// Field names must be distinct
    #[error("duplicate field name {0}")]
    DuplicateName(String),
}

/// Half of a field pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldPosition {
    /// Field name
    Name,
    /// Field value
    Value,
}

impl fmt::Display for FieldPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => write!(f, "name"),
            Self::Value => write!(f, "value"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CodecError::MalformedFieldList(FieldListDefect::OddStringCount(3));
        assert_eq!(
            err.to_string(),
            "Malformed field list: 3 strings cannot form name/value pairs"
        );

        let err = CodecError::NullFieldEntry {
            pair: 1,
            position: FieldPosition::Value,
        };
        assert_eq!(err.to_string(), "Null field value in pair 1");

        let err = CodecError::from(Corruption::BackReferenceOutOfRange { id: 9, assigned: 2 });
        assert_eq!(
            err.to_string(),
            "Corrupted stream: back-reference to node 9 but only 2 assigned"
        );
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(
            CodecError::from(Corruption::Truncated).kind(),
            ErrorKind::CorruptedStream
        );
        assert_eq!(
            CodecError::MalformedFieldList(FieldListDefect::DuplicateName("a".to_string())).kind(),
            ErrorKind::MalformedFieldList
        );
        let io_err = io::Error::new(io::ErrorKind::BrokenPipe, "closed");
        assert_eq!(CodecError::from(io_err).kind(), ErrorKind::Io);
    }

    #[test]
    fn test_io_error_maps_to_corruption() {
        let eof = io::Error::new(io::ErrorKind::UnexpectedEof, "eof");
        assert_eq!(Corruption::from(eof), Corruption::Truncated);

        let reset = io::Error::new(io::ErrorKind::ConnectionReset, "reset");
        assert!(matches!(Corruption::from(reset), Corruption::Transport(_)));
    }
}
