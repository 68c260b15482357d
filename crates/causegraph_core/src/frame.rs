//! Stack frames.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One stack-trace entry.
///
/// Line numbers are kept exactly as captured: negative values are sentinels
/// ([`Frame::UNKNOWN_LINE`], [`Frame::NATIVE_METHOD_LINE`]) and are never
/// normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Frame {
    /// Fully qualified name of the declaring type
    pub declaring_class: String,
    /// Method name
    pub method_name: String,
    /// Source file, if known
    pub file_name: Option<String>,
    /// Line number, negative when unknown
    pub line_number: i32,
}

impl Frame {
    /// Line number sentinel for an unknown line
    pub const UNKNOWN_LINE: i32 = -1;

    /// Line number sentinel for a native method
    pub const NATIVE_METHOD_LINE: i32 = -2;

    /// Create a new frame
    #[must_use]
    pub fn new(
        declaring_class: impl Into<String>,
        method_name: impl Into<String>,
        file_name: Option<String>,
        line_number: i32,
    ) -> Self {
        Self {
            declaring_class: declaring_class.into(),
            method_name: method_name.into(),
            file_name,
            line_number,
        }
    }

    /// Whether the frame belongs to a native method
    #[must_use]
    pub fn is_native_method(&self) -> bool {
        self.line_number == Self::NATIVE_METHOD_LINE
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}(", self.declaring_class, self.method_name)?;
        if self.is_native_method() {
            write!(f, "Native Method)")
        } else {
            match &self.file_name {
                Some(file) if self.line_number >= 0 => write!(f, "{}:{})", file, self.line_number),
                Some(file) => write!(f, "{})", file),
                None => write!(f, "Unknown Source)"),
            }
        }
    }
}
