//! Byte sink and byte source.
//!
//! Primitive wire values over `std::io`: single bytes, presence markers,
//! big-endian `u32`/`i32`, and `u32` length-prefixed UTF-8 strings.

use crate::error::{CodecResult, Corruption};
use crate::marker;
use std::io::{self, Read, Write};

/// Writes primitive wire values
pub struct WireWriter<W> {
    writer: W,
    written: u64,
}

impl<W: Write> WireWriter<W> {
    /// Create a new writer
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Write raw bytes
    pub fn write_raw(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.writer.write_all(bytes)?;
        self.written += bytes.len() as u64;
        Ok(())
    }

    /// Write one byte
    pub fn write_u8(&mut self, value: u8) -> io::Result<()> {
        self.write_raw(&[value])
    }

    /// Write a presence marker
    pub fn write_marker(&mut self, present: bool) -> io::Result<()> {
        self.write_u8(if present { marker::PRESENT } else { marker::ABSENT })
    }

    /// Write a big-endian `u32`
    pub fn write_u32(&mut self, value: u32) -> io::Result<()> {
        self.write_raw(&value.to_be_bytes())
    }

    /// Write a big-endian `i32`
    pub fn write_i32(&mut self, value: i32) -> io::Result<()> {
        self.write_raw(&value.to_be_bytes())
    }

    /// Write a count or length as `u32`
    pub fn write_len(&mut self, len: usize) -> io::Result<()> {
        let len = u32::try_from(len).map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidInput, format!("length {len} exceeds u32"))
        })?;
        self.write_u32(len)
    }

    /// Write a length-prefixed string
    pub fn write_str(&mut self, value: &str) -> io::Result<()> {
        self.write_len(value.len())?;
        self.write_raw(value.as_bytes())
    }

    /// Write a presence marker followed by the string if present
    pub fn write_opt_str(&mut self, value: Option<&str>) -> io::Result<()> {
        self.write_marker(value.is_some())?;
        match value {
            Some(value) => self.write_str(value),
            None => Ok(()),
        }
    }

    /// Bytes written so far
    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    /// Flush the underlying writer
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Reads primitive wire values.
///
/// Every failure of the underlying reader is reported as [`Corruption`]:
/// end of input as [`Corruption::Truncated`], anything else as
/// [`Corruption::Transport`].
pub struct WireReader<R> {
    reader: R,
    max_string_len: u32,
}

impl<R: Read> WireReader<R> {
    /// Create a reader that accepts strings up to `max_string_len` bytes
    pub fn new(reader: R, max_string_len: u32) -> Self {
        Self {
            reader,
            max_string_len,
        }
    }

    /// Read exactly `buf.len()` bytes
    pub fn read_raw(&mut self, buf: &mut [u8]) -> Result<(), Corruption> {
        self.reader.read_exact(buf).map_err(Corruption::from)
    }

    /// Read one byte
    pub fn read_u8(&mut self) -> Result<u8, Corruption> {
        let mut buf = [0u8; 1];
        self.read_raw(&mut buf)?;
        Ok(buf[0])
    }

    /// Read a presence marker
    pub fn read_marker(&mut self, context: &'static str) -> Result<bool, Corruption> {
        match self.read_u8()? {
            marker::ABSENT => Ok(false),
            marker::PRESENT => Ok(true),
            value => Err(Corruption::InvalidMarker { context, value }),
        }
    }

    /// Read a big-endian `u32`
    pub fn read_u32(&mut self) -> Result<u32, Corruption> {
        let mut buf = [0u8; 4];
        self.read_raw(&mut buf)?;
        Ok(u32::from_be_bytes(buf))
    }

    /// Read a big-endian `i32`
    pub fn read_i32(&mut self) -> Result<i32, Corruption> {
        let mut buf = [0u8; 4];
        self.read_raw(&mut buf)?;
        Ok(i32::from_be_bytes(buf))
    }

    /// Read a count and check it against a limit
    pub fn read_len(&mut self, what: &'static str, limit: u32) -> Result<u32, Corruption> {
        let len = self.read_u32()?;
        if len > limit {
            return Err(Corruption::LengthOutOfRange { what, len, limit });
        }
        Ok(len)
    }

    /// Read a length-prefixed string
    pub fn read_str(&mut self) -> Result<String, Corruption> {
        let len = self.read_len("string length", self.max_string_len)?;
        // Grow with the data actually present rather than the declared length.
        let mut buf = Vec::new();
        (&mut self.reader)
            .take(u64::from(len))
            .read_to_end(&mut buf)
            .map_err(Corruption::from)?;
        if buf.len() != len as usize {
            return Err(Corruption::Truncated);
        }
        String::from_utf8(buf).map_err(|_| Corruption::InvalidUtf8)
    }

    /// Read a presence marker followed by the string if present
    pub fn read_opt_str(&mut self, context: &'static str) -> CodecResult<Option<String>> {
        if self.read_marker(context)? {
            Ok(Some(self.read_str()?))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written(f: impl FnOnce(&mut WireWriter<&mut Vec<u8>>) -> io::Result<()>) -> Vec<u8> {
        let mut out = Vec::new();
        let mut writer = WireWriter::new(&mut out);
        f(&mut writer).unwrap();
        out
    }

    #[test]
    fn test_big_endian_integers() {
        let bytes = written(|w| {
            w.write_u32(0x0102_0304)?;
            w.write_i32(-2)
        });
        assert_eq!(bytes, vec![1, 2, 3, 4, 0xFF, 0xFF, 0xFF, 0xFE]);

        let mut reader = WireReader::new(bytes.as_slice(), 16);
        assert_eq!(reader.read_u32().unwrap(), 0x0102_0304);
        assert_eq!(reader.read_i32().unwrap(), -2);
    }

    #[test]
    fn test_string_layout() {
        let bytes = written(|w| w.write_str("hé"));
        assert_eq!(bytes, vec![0, 0, 0, 3, b'h', 0xC3, 0xA9]);
        let mut reader = WireReader::new(bytes.as_slice(), 16);
        assert_eq!(reader.read_str().unwrap(), "hé");
    }

    #[test]
    fn test_optional_string() {
        let bytes = written(|w| {
            w.write_opt_str(None)?;
            w.write_opt_str(Some(""))
        });
        assert_eq!(bytes, vec![0, 1, 0, 0, 0, 0]);

        let mut reader = WireReader::new(bytes.as_slice(), 16);
        assert_eq!(reader.read_opt_str("message").unwrap(), None);
        assert_eq!(reader.read_opt_str("message").unwrap(), Some(String::new()));
    }

    #[test]
    fn test_bytes_written() {
        let mut out = Vec::new();
        let mut writer = WireWriter::new(&mut out);
        writer.write_str("abc").unwrap();
        writer.write_marker(true).unwrap();
        assert_eq!(writer.bytes_written(), 8);
    }

    #[test]
    fn test_truncated_string() {
        let bytes = [0u8, 0, 0, 5, b'a', b'b'];
        let mut reader = WireReader::new(&bytes[..], 16);
        assert_eq!(reader.read_str().unwrap_err(), Corruption::Truncated);
    }

    #[test]
    fn test_truncated_integer() {
        let bytes = [0u8, 1];
        let mut reader = WireReader::new(&bytes[..], 16);
        assert_eq!(reader.read_i32().unwrap_err(), Corruption::Truncated);
    }

    #[test]
    fn test_string_over_limit() {
        let bytes = written(|w| w.write_str("too long"));
        let mut reader = WireReader::new(bytes.as_slice(), 4);
        assert_eq!(
            reader.read_str().unwrap_err(),
            Corruption::LengthOutOfRange {
                what: "string length",
                len: 8,
                limit: 4
            }
        );
    }

    #[test]
    fn test_invalid_utf8() {
        let bytes = [0u8, 0, 0, 2, 0xC3, 0x28];
        let mut reader = WireReader::new(&bytes[..], 16);
        assert_eq!(reader.read_str().unwrap_err(), Corruption::InvalidUtf8);
    }

    #[test]
    fn test_invalid_marker() {
        let bytes = [7u8];
        let mut reader = WireReader::new(&bytes[..], 16);
        assert_eq!(
            reader.read_marker("file name").unwrap_err(),
            Corruption::InvalidMarker {
                context: "file name",
                value: 7
            }
        );
    }
}
