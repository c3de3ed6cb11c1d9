//! An immutable, owned, cheaply-clonable byte sequence representing one
//! logical line of the input stream.

use std::fmt;
use std::sync::Arc;

/// One logical line.
///
/// A `Line` ends with `\n` unless it is the final, unterminated tail of a
/// finite input stream (see [`Line::is_terminated`]). Bytes are never
/// borrowed from a shared read buffer — every `Line` owns a fresh
/// allocation, wrapped in an `Arc` so that fan-out to many subscribers and
/// the cumulative buffers kept by executors can clone a `Line` without
/// copying its bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct Line(Arc<[u8]>);

impl Line {
    /// Build a `Line` from an owned byte vector.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(Arc::from(bytes))
    }

    /// Build a `Line` from a byte slice, copying it into a fresh allocation.
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self(Arc::from(bytes))
    }

    /// The raw bytes of this line, including the trailing `\n` if present.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Number of bytes in this line, including the trailing `\n` if present.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when this line has no bytes at all (not even a newline).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when this line ends with `\n`. The only `Line` for which this is
    /// false is the final, unterminated tail of a finite input stream.
    pub fn is_terminated(&self) -> bool {
        self.0.last() == Some(&b'\n')
    }
}

impl fmt::Debug for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line({:?})", String::from_utf8_lossy(&self.0))
    }
}

impl From<Vec<u8>> for Line {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminated_line_reports_true() {
        let line = Line::from_slice(b"hello\n");
        assert!(line.is_terminated());
        assert_eq!(line.as_bytes(), b"hello\n");
    }

    #[test]
    fn unterminated_tail_reports_false() {
        let line = Line::from_slice(b"hello");
        assert!(!line.is_terminated());
    }

    #[test]
    fn empty_line_is_empty_and_unterminated() {
        let line = Line::from_slice(b"");
        assert!(line.is_empty());
        assert!(!line.is_terminated());
    }

    #[test]
    fn clone_is_cheap_and_equal() {
        let line = Line::from_slice(b"abc\n");
        let clone = line.clone();
        assert_eq!(line, clone);
    }
}
