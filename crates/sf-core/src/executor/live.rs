//! Spawns a single long-running child at start, streams each batch's lines
//! into its stdin, and continuously captures its stdout/stderr as they
//! arrive, debouncing emission to the tick.

use std::sync::{Arc, Mutex};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::log::InputLog;
use crate::output::{Output, segment_into_lines};
use crate::process::build_command;

use super::{ExecuteOptions, ExecutorHandle};

const READ_CHUNK: usize = 1024;

pub(super) fn spawn(input: &InputLog, argv: Vec<String>, options: ExecuteOptions) -> ExecutorHandle {
    let (mut batches, sub_cancel) = input.listen();
    let cancel = CancellationToken::new();
    let (tx, out_rx) = mpsc::channel(1);

    let task_cancel = cancel.clone();
    let tick_interval = options.tick_interval;
    tokio::spawn(async move {
        let _sub_cancel = sub_cancel;

        let mut cmd = build_command(&argv);
        let mut child = match cmd.spawn() {
            Ok(child) => child,
            // The child never came up at all: emit one stderr-only Output and
            // transition straight to the closed state, mirroring the Go
            // original's `ch <- Output{...}` immediately followed by cancel.
            Err(e) => {
                let _ = tx.send(Output::from_error_text(e.to_string())).await;
                task_cancel.cancel();
                return;
            }
        };

        let mut stdin = child.stdin.take().expect("piped stdin");
        let stdout = child.stdout.take().expect("piped stdout");
        let stderr = child.stderr.take().expect("piped stderr");

        let stdout_buf = Arc::new(Mutex::new(Vec::new()));
        let stderr_buf = Arc::new(Mutex::new(Vec::new()));

        let reader_cancel = task_cancel.clone();
        tokio::spawn(pump(stdout, stdout_buf.clone(), reader_cancel.clone()));
        tokio::spawn(pump(stderr, stderr_buf.clone(), reader_cancel));

        // Keep the Child alive for the task's lifetime so `kill_on_drop`
        // reaps it when this task ends.
        let _child = child;

        let mut emitted_lens = (0usize, 0usize);
        let mut ticker = tokio::time::interval(tick_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = task_cancel.cancelled() => break,
                batch = batches.recv() => {
                    let Some(lines) = batch else { break };
                    for line in &lines {
                        // Write failures are non-fatal: the child may already have
                        // exited. Stop feeding it but keep ticking so whatever it
                        // produced before dying still gets flushed out.
                        if stdin.write_all(line.as_bytes()).await.is_err() {
                            break;
                        }
                    }
                }
                _ = ticker.tick() => {
                    let out = stdout_buf.lock().unwrap_or_else(|e| e.into_inner()).clone();
                    let err = stderr_buf.lock().unwrap_or_else(|e| e.into_inner()).clone();
                    let lens = (out.len(), err.len());
                    if lens != emitted_lens {
                        emitted_lens = lens;
                        let snapshot = Output {
                            stdout: segment_into_lines(&out),
                            stderr: segment_into_lines(&err),
                        };
                        if tx.send(snapshot).await.is_err() {
                            break;
                        }
                    }
                }
            }
        }
    });

    ExecutorHandle::new(out_rx, cancel)
}

/// Continuously drain `reader` into `buf`, raw bytes at a time, so a child
/// writing partial newline-free output is never mistaken for silence.
async fn pump(mut reader: impl AsyncRead + Unpin, buf: Arc<Mutex<Vec<u8>>>, cancel: CancellationToken) {
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            result = reader.read(&mut chunk) => {
                match result {
                    Ok(0) | Err(_) => return,
                    Ok(n) => {
                        let mut buf = buf.lock().unwrap_or_else(|e| e.into_inner());
                        buf.extend_from_slice(&chunk[..n]);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn streams_writes_to_single_child_and_emits_on_tick() {
        let log = InputLog::with_tick_interval(Duration::from_millis(2));
        let argv = vec!["cat".to_string()];
        let mut options = ExecuteOptions::default();
        options.tick_interval = Duration::from_millis(2);
        let mut handle = spawn(&log, argv, options);

        log.publish(b"a\n");
        let out = handle.outputs.recv().await.expect("first tick output");
        assert_eq!(out.stdout[0].as_bytes(), b"a\n");

        log.publish(b"b\n");
        let out = handle.outputs.recv().await.expect("second tick output");
        assert_eq!(out.stdout.len(), 2);

        handle.close();
    }

    #[tokio::test]
    async fn spawn_failure_emits_stderr_and_self_cancels() {
        let log = InputLog::with_tick_interval(Duration::from_millis(2));
        let argv = vec!["definitely-not-a-real-binary-xyz".to_string()];
        let mut handle = spawn(&log, argv, ExecuteOptions::default());

        let out = handle.outputs.recv().await.expect("spawn error output");
        assert!(out.stdout.is_empty());
        assert!(!out.stderr.is_empty());
        assert!(handle.outputs.recv().await.is_none());
    }
}
