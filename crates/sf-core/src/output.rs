//! The output contract: a cumulative snapshot of a command's captured
//! stdout/stderr, and the helper that segments a captured byte buffer into
//! [`Line`]s the same way the top-level segmenter does.

use crate::line::Line;

/// A cumulative view of a command's captured output at the moment of
/// emission — never a delta. Consumers do not track deltas; late
/// subscribers and recovery are simpler this way, at the cost of larger
/// payloads per emission.
#[derive(Debug, Clone, Default)]
pub struct Output {
    pub stdout: Vec<Line>,
    pub stderr: Vec<Line>,
}

impl Output {
    pub fn stdout_only(stdout: Vec<Line>) -> Self {
        Self {
            stdout,
            stderr: Vec::new(),
        }
    }

    pub fn stderr_only(stderr: Vec<Line>) -> Self {
        Self {
            stdout: Vec::new(),
            stderr,
        }
    }

    /// Build a stderr-only `Output` from a plain error message, for the
    /// spawn-failure and launch-error paths.
    pub fn from_error_text(text: impl Into<String>) -> Self {
        Self::stderr_only(segment_into_lines(text.into().as_bytes()))
    }
}

/// Split a fully-buffered byte sequence into [`Line`]s, using the same
/// newline-boundary rule as the streaming segmenter in [`crate::segmenter`]:
/// every line but a possible final one ends with `\n`. Deliberately does not
/// emit a trailing empty `Line` when the buffer ends exactly on a newline —
/// an unterminated `Line` may only be the final line of a finite stream, and
/// an empty line is not "the tail" of anything.
pub fn segment_into_lines(bytes: &[u8]) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut start = 0;
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'\n' {
            lines.push(Line::from_slice(&bytes[start..=i]));
            start = i + 1;
        }
    }
    if start < bytes.len() {
        lines.push(Line::from_slice(&bytes[start..]));
    }
    lines
}
