//! The identity executor ("cat"): used when the command is empty. Passes
//! the input log straight through as cumulative stdout.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::log::InputLog;
use crate::output::Output;

use super::{ExecuteOptions, ExecutorHandle, extend_with_cap};

pub(super) fn spawn(input: &InputLog, options: ExecuteOptions) -> ExecutorHandle {
    let (mut batches, sub_cancel) = input.listen();
    let cancel = CancellationToken::new();
    let (tx, out_rx) = mpsc::channel(1);

    let task_cancel = cancel.clone();
    tokio::spawn(async move {
        let _sub_cancel = sub_cancel;
        let mut stdout = Vec::new();

        loop {
            tokio::select! {
                _ = task_cancel.cancelled() => break,
                batch = batches.recv() => {
                    let Some(lines) = batch else { break };
                    extend_with_cap(&mut stdout, lines, options.buffer_cap);
                    if tx.send(Output::stdout_only(stdout.clone())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    ExecutorHandle::new(out_rx, cancel)
}
