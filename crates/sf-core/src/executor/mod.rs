//! Command executors: the four variants implementing a common
//! `Execute(input) -> output-stream` contract.

mod identity;
mod iterative;
mod live;
mod snapshot;

use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::line::Line;
use crate::log::{DEFAULT_TICK_INTERVAL, InputLog};
use crate::output::Output;
use crate::token;

/// Which of the three command-driven strategies a request selects. Empty
/// commands always get the identity executor regardless of `Mode`; `Mode`
/// only disambiguates non-empty commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Snapshot,
    Iterative,
    Live,
}

/// Tick/timeout knobs threaded through every executor. `buffer_cap` is the
/// hook point for capping the unbounded cumulative line buffer; left `None`
/// (unbounded) by default.
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    pub tick_interval: Duration,
    pub buffer_cap: Option<usize>,
    pub output_spool: Option<PathBuf>,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            buffer_cap: None,
            output_spool: None,
        }
    }
}

/// A running executor's external handle: an output stream and a cancel
/// switch. Closing is idempotent — cancelling an already-finished executor
/// is a no-op, never a panic.
pub struct ExecutorHandle {
    pub outputs: mpsc::Receiver<Output>,
    cancel: CancellationToken,
}

impl ExecutorHandle {
    fn new(outputs: mpsc::Receiver<Output>, cancel: CancellationToken) -> Self {
        Self { outputs, cancel }
    }

    /// Cancel the child process (if any), unsubscribe from the input log,
    /// and close the output channel. Safe to call more than once.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// A cloneable handle to this executor's cancellation token, for callers
    /// (the supervisor) that need to retain the ability to close an executor
    /// after giving up ownership of its `outputs` receiver.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

/// Construct and start the executor selected by `command`/`mode` against
/// `input`. An empty (or whitespace-only) command always yields the
/// identity executor, regardless of `mode`.
pub fn spawn_executor(
    command: &str,
    mode: Mode,
    input: &InputLog,
    options: ExecuteOptions,
) -> ExecutorHandle {
    let argv = token::split(command);
    if argv.is_empty() {
        return identity::spawn(input, options);
    }

    match mode {
        Mode::Snapshot => snapshot::spawn(input, argv, options),
        Mode::Iterative => iterative::spawn(input, argv, options),
        Mode::Live => live::spawn(input, argv, options),
    }
}

/// Append `items` to the cumulative buffer `buf`, then drop the oldest
/// entries past `cap` if one is configured. See `ExecuteOptions::buffer_cap`:
/// the default (`cap = None`) is unbounded; a cap is opt-in and never the
/// default.
pub(crate) fn extend_with_cap(buf: &mut Vec<Line>, items: Vec<Line>, cap: Option<usize>) {
    buf.extend(items);
    if let Some(cap) = cap {
        if buf.len() > cap {
            let excess = buf.len() - cap;
            buf.drain(0..excess);
        }
    }
}
