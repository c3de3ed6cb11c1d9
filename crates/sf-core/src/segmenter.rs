//! Converts an arbitrary byte stream into newline-terminated [`Line`]s and
//! publishes them to an [`InputLog`].

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::CoreError;
use crate::log::InputLog;

const READ_BUF_SIZE: usize = 1024;

/// Read `reader` to completion, splitting every chunk on `\n` and
/// publishing each completed segment to `log`. Any trailing bytes with no
/// newline are carried forward across reads by `log`'s own incomplete-line
/// buffer. On EOF, the final partial line (if any) is flushed so it becomes
/// visible to subscribers even without a trailing newline.
///
/// Returns `Err` only for a non-EOF read failure, which is fatal for the
/// whole process — there is no meaningful continuation once the input pipe
/// itself is broken.
pub async fn run<R>(mut reader: R, log: &InputLog) -> Result<(), CoreError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; READ_BUF_SIZE];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            log.flush_incomplete_tail();
            return Ok(());
        }

        let mut chunk = &buf[..n];
        while let Some(pos) = chunk.iter().position(|&b| b == b'\n') {
            log.publish(&chunk[..=pos]);
            chunk = &chunk[pos + 1..];
        }
        if !chunk.is_empty() {
            log.publish(chunk);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn segments_multiple_lines_in_one_read() {
        let log = InputLog::with_tick_interval(Duration::from_millis(2));
        let data: &[u8] = b"a\nb\nc";
        run(data, &log).await.expect("segmenter run succeeds");
        assert_eq!(log.len(), 3);
    }

    #[tokio::test]
    async fn flushes_unterminated_tail_on_eof() {
        let log = InputLog::with_tick_interval(Duration::from_millis(2));
        run(&b"hello"[..], &log).await.expect("run succeeds");
        assert_eq!(log.len(), 1);

        let (mut rx, _cancel) = log.listen();
        let batch = rx.recv().await.expect("batch");
        assert_eq!(batch[0].as_bytes(), b"hello");
        assert!(!batch[0].is_terminated());
    }

    #[tokio::test]
    async fn round_trip_concatenation_equals_input() {
        let log = InputLog::with_tick_interval(Duration::from_millis(2));
        let input: &[u8] = b"one\ntwo\nthree";
        run(input, &log).await.expect("run succeeds");

        let (mut rx, _cancel) = log.listen();
        let batch = rx.recv().await.expect("batch");
        let joined: Vec<u8> = batch.iter().flat_map(|l| l.as_bytes().to_vec()).collect();
        assert_eq!(joined, input);
    }

    #[tokio::test]
    async fn every_line_but_the_last_is_terminated() {
        let log = InputLog::with_tick_interval(Duration::from_millis(2));
        run(&b"a\nb\nc"[..], &log).await.expect("run succeeds");

        let (mut rx, _cancel) = log.listen();
        let batch = rx.recv().await.expect("batch");
        assert!(batch[0].is_terminated());
        assert!(batch[1].is_terminated());
        assert!(!batch[2].is_terminated());
    }
}
