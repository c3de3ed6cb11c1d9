//! Owns the current executor, stamps every emitted [`Output`] with a
//! monotonic generation id, and cancels the previous executor (rather than
//! waiting for it to drain) on every new command request.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::executor::{ExecuteOptions, Mode, spawn_executor};
use crate::log::InputLog;
use crate::output::Output;

/// Forwarded to consumers as `(generation, Output)`; a generation older than
/// [`Supervisor::current_generation`] is stale and should be discarded by
/// the caller.
pub type Tagged = (u64, Output);

/// Serializes command requests against one input log and multiplexes every
/// executor's output stream into one channel, tagging each `Output` with
/// the generation id of the request that produced it.
///
/// Not `Sync`-safe for concurrent `submit` calls: this is meant to be
/// driven by a single owning loop, not called from multiple tasks at once.
pub struct Supervisor {
    input: InputLog,
    current: Option<CancellationToken>,
    generation: Arc<AtomicU64>,
    sink: mpsc::Sender<Tagged>,
}

impl Supervisor {
    /// Build a supervisor bound to `input`, returning it alongside the
    /// receiver consumers should poll for `(generation, Output)` pairs.
    pub fn new(input: InputLog) -> (Self, mpsc::Receiver<Tagged>) {
        let (sink, rx) = mpsc::channel(64);
        let supervisor = Self {
            input,
            current: None,
            generation: Arc::new(AtomicU64::new(0)),
            sink,
        };
        (supervisor, rx)
    }

    /// The generation id most recently handed out by [`Supervisor::submit`].
    /// 0 before any command has been submitted.
    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Cancel the previous executor (if any), start a new one for
    /// `command`/`mode`, and forward its outputs tagged with the new
    /// generation id. Returns the new generation id.
    ///
    /// Order matters: generation bump, previous executor closed (its
    /// remaining outputs are abandoned, not awaited — they will be filtered
    /// by generation at the consumer), then the new executor is constructed
    /// and its stream forwarded.
    pub fn submit(&mut self, command: &str, mode: Mode, options: ExecuteOptions) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(prev_cancel) = self.current.take() {
            prev_cancel.cancel();
        }

        let handle = spawn_executor(command, mode, &self.input, options);
        self.current = Some(handle.cancel_token());

        let mut outputs = handle.outputs;
        let sink = self.sink.clone();
        tokio::spawn(async move {
            while let Some(output) = outputs.recv().await {
                if sink.send((generation, output)).await.is_err() {
                    break;
                }
            }
        });

        generation
    }
}

#[cfg(test)]
mod supervisor_tests;
