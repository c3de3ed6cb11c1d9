//! Re-runs the command against the *entire* cumulative input on every new
//! batch, debouncing emission to the tick.

use std::io;

use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::line::Line;
use crate::log::InputLog;
use crate::multiline_reader::MultilineReader;
use crate::output::{Output, segment_into_lines};
use crate::process::build_command;

use super::{ExecuteOptions, ExecutorHandle, extend_with_cap};

pub(super) fn spawn(input: &InputLog, argv: Vec<String>, options: ExecuteOptions) -> ExecutorHandle {
    let (mut batches, sub_cancel) = input.listen();
    let cancel = CancellationToken::new();
    let (tx, out_rx) = mpsc::channel(1);

    let task_cancel = cancel.clone();
    let tick_interval = options.tick_interval;
    tokio::spawn(async move {
        let _sub_cancel = sub_cancel;
        let mut cumulative_input: Vec<Line> = Vec::new();
        let mut last_stdout: Vec<Line> = Vec::new();
        let mut last_stderr: Vec<Line> = Vec::new();
        let mut emitted_lens = (0usize, 0usize);

        let mut ticker = tokio::time::interval(tick_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = task_cancel.cancelled() => break,
                batch = batches.recv() => {
                    let Some(lines) = batch else { break };
                    extend_with_cap(&mut cumulative_input, lines, options.buffer_cap);

                    match run_snapshot(&argv, cumulative_input.clone(), &task_cancel).await {
                        Ok(Some(output)) => {
                            last_stdout = segment_into_lines(&output.stdout);
                            last_stderr = segment_into_lines(&output.stderr);
                        }
                        // Cancelled mid-run: the executor is tearing down.
                        Ok(None) => break,
                        Err(e) => {
                            if tx.send(Output::from_error_text(e.to_string())).await.is_err() {
                                break;
                            }
                        }
                    }
                }
                _ = ticker.tick() => {
                    let lens = (last_stdout.len(), last_stderr.len());
                    if lens != emitted_lens {
                        emitted_lens = lens;
                        let out = Output {
                            stdout: last_stdout.clone(),
                            stderr: last_stderr.clone(),
                        };
                        if tx.send(out).await.is_err() {
                            break;
                        }
                    }
                }
            }
        }
    });

    ExecutorHandle::new(out_rx, cancel)
}

/// Spawn a fresh child, stream `input` through a [`MultilineReader`] into its
/// stdin, and wait for it to finish. `Ok(None)` means the run was abandoned
/// because `cancel` fired first; the child is dropped (and killed via
/// `kill_on_drop`) along with the future driving it.
async fn run_snapshot(
    argv: &[String],
    input: Vec<Line>,
    cancel: &CancellationToken,
) -> io::Result<Option<std::process::Output>> {
    let mut cmd = build_command(argv);
    let mut child = cmd.spawn()?;
    let stdin = child.stdin.take();

    tokio::select! {
        _ = cancel.cancelled() => Ok(None),
        result = async move {
            if let Some(mut stdin) = stdin {
                let mut reader = MultilineReader::new(input);
                tokio::io::copy(&mut reader, &mut stdin).await?;
                stdin.shutdown().await?;
            }
            child.wait_with_output().await
        } => result.map(Some),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn emits_recomputed_output_on_tick_after_batch() {
        let log = InputLog::with_tick_interval(Duration::from_millis(2));
        let argv = vec!["wc".to_string(), "-l".to_string()];
        let mut options = ExecuteOptions::default();
        options.tick_interval = Duration::from_millis(2);
        let mut handle = spawn(&log, argv, options);

        log.publish(b"a\n");
        let out = handle.outputs.recv().await.expect("output after batch");
        let count = String::from_utf8_lossy(out.stdout[0].as_bytes()).trim().to_string();
        assert_eq!(count, "1");

        log.publish(b"b\n");
        let out = handle.outputs.recv().await.expect("output after second batch");
        let count = String::from_utf8_lossy(out.stdout[0].as_bytes()).trim().to_string();
        assert_eq!(count, "2");

        handle.close();
    }

    #[tokio::test]
    async fn non_zero_exit_still_emits_its_captured_output() {
        let log = InputLog::with_tick_interval(Duration::from_millis(2));
        let argv = vec![
            "sh".to_string(),
            "-c".to_string(),
            "echo partial; exit 7".to_string(),
        ];
        let mut options = ExecuteOptions::default();
        options.tick_interval = Duration::from_millis(2);
        let mut handle = spawn(&log, argv, options);

        log.publish(b"a\n");
        let out = handle.outputs.recv().await.expect("output after batch");
        let text = String::from_utf8_lossy(out.stdout[0].as_bytes()).trim().to_string();
        assert_eq!(text, "partial");

        handle.close();
    }
}
