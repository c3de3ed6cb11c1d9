//! Runs the command once per input line (side-effect style).

use std::io;

use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::log::InputLog;
use crate::output::{Output, segment_into_lines};
use crate::process::build_command;

use super::{ExecuteOptions, ExecutorHandle, extend_with_cap};

pub(super) fn spawn(
    input: &InputLog,
    argv: Vec<String>,
    options: ExecuteOptions,
) -> ExecutorHandle {
    let (mut batches, sub_cancel) = input.listen();
    let cancel = CancellationToken::new();
    let (tx, out_rx) = mpsc::channel(1);

    let task_cancel = cancel.clone();
    tokio::spawn(async move {
        let _sub_cancel = sub_cancel;
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();

        'outer: loop {
            tokio::select! {
                _ = task_cancel.cancelled() => break,
                batch = batches.recv() => {
                    let Some(lines) = batch else { break };
                    for line in lines {
                        tokio::select! {
                            _ = task_cancel.cancelled() => break 'outer,
                            result = run_once(&argv, line.as_bytes()) => {
                                let emitted = match result {
                                    Ok(output) => {
                                        extend_with_cap(
                                            &mut stdout,
                                            segment_into_lines(&output.stdout),
                                            options.buffer_cap,
                                        );
                                        extend_with_cap(
                                            &mut stderr,
                                            segment_into_lines(&output.stderr),
                                            options.buffer_cap,
                                        );
                                        Output {
                                            stdout: stdout.clone(),
                                            stderr: stderr.clone(),
                                        }
                                    }
                                    // Spawn/IO failure: non-fatal, report the error text.
                                    // The cumulative buffers are left untouched since
                                    // this invocation produced no captured output.
                                    Err(e) => Output::from_error_text(e.to_string()),
                                };
                                if tx.send(emitted).await.is_err() {
                                    break 'outer;
                                }
                            }
                        }
                    }
                }
            }
        }
    });

    ExecutorHandle::new(out_rx, cancel)
}

async fn run_once(argv: &[String], stdin_bytes: &[u8]) -> io::Result<std::process::Output> {
    let mut cmd = build_command(argv);
    let mut child = cmd.spawn()?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(stdin_bytes).await?;
        stdin.shutdown().await?;
    }
    child.wait_with_output().await
}
