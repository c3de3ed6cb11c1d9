//! Presents a slice of [`Line`]s as a single readable byte stream, used to
//! feed a child process's stdin.
//!
//! No separator is inserted between lines — each `Line` already carries its
//! own trailing `\n`, except possibly the last one if the input stream was
//! unterminated.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, ReadBuf};

use crate::line::Line;

pub struct MultilineReader {
    lines: Vec<Line>,
    line_idx: usize,
    byte_offset: usize,
}

impl MultilineReader {
    pub fn new(lines: Vec<Line>) -> Self {
        Self {
            lines,
            line_idx: 0,
            byte_offset: 0,
        }
    }
}

impl AsyncRead for MultilineReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        loop {
            if self.line_idx >= self.lines.len() {
                return Poll::Ready(Ok(()));
            }
            let remaining = {
                let line = &self.lines[self.line_idx];
                line.len() - self.byte_offset
            };
            if remaining == 0 {
                self.line_idx += 1;
                self.byte_offset = 0;
                continue;
            }
            if buf.remaining() == 0 {
                return Poll::Ready(Ok(()));
            }
            let n = remaining.min(buf.remaining());
            let offset = self.byte_offset;
            buf.put_slice(&self.lines[self.line_idx].as_bytes()[offset..offset + n]);
            self.byte_offset += n;
            return Poll::Ready(Ok(()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn reads_all_lines_concatenated_with_no_inserted_separator() {
        let lines = vec![
            Line::from_slice(b"a\n"),
            Line::from_slice(b"b\n"),
            Line::from_slice(b"c"),
        ];
        let mut reader = MultilineReader::new(lines);
        let mut out = Vec::new();
        reader.read_to_end(&mut out).await.expect("read succeeds");
        assert_eq!(out, b"a\nb\nc");
    }

    #[tokio::test]
    async fn empty_line_slice_yields_empty_stream() {
        let mut reader = MultilineReader::new(Vec::new());
        let mut out = Vec::new();
        reader.read_to_end(&mut out).await.expect("read succeeds");
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn small_read_buffer_still_reassembles_full_stream() {
        let lines = vec![Line::from_slice(b"hello\n"), Line::from_slice(b"world\n")];
        let mut reader = MultilineReader::new(lines);
        let mut out = Vec::new();
        let mut chunk = [0u8; 3];
        loop {
            let n = reader.read(&mut chunk).await.expect("read succeeds");
            if n == 0 {
                break;
            }
            out.extend_from_slice(&chunk[..n]);
        }
        assert_eq!(out, b"hello\nworld\n");
    }
}
