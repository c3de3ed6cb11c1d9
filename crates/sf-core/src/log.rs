//! Append-only, multi-subscriber log of [`Line`]s with tick-bounded fan-out.
//!
//! One mutex guards the subscriber table and the pending "incomplete line"
//! buffer; a periodic tick walks the subscriber table and asynchronously
//! attempts delivery to everyone who is behind, preempting any
//! still-blocked delivery from the previous tick before starting the next
//! one.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::line::Line;

/// Fan-out tick interval.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(16);

struct Subscriber {
    sender: mpsc::Sender<Vec<Line>>,
    watermark: usize,
}

struct State {
    lines: Vec<Line>,
    incomplete: Vec<u8>,
    subscribers: HashMap<u64, Subscriber>,
}

impl State {
    fn new() -> Self {
        Self {
            lines: Vec::with_capacity(1024),
            incomplete: Vec::new(),
            subscribers: HashMap::new(),
        }
    }
}

/// Handle returned by [`InputLog::listen`]; dropping or calling
/// [`SubscriptionCancel::cancel`] unsubscribes and closes the channel.
pub struct SubscriptionCancel {
    log: std::sync::Weak<Shared>,
    id: u64,
}

impl SubscriptionCancel {
    pub fn cancel(self) {
        // Dropping runs the same logic; named explicitly so callers can
        // read `cancel()` at the call site instead of a bare `drop(handle)`.
    }
}

impl Drop for SubscriptionCancel {
    fn drop(&mut self) {
        if let Some(shared) = self.log.upgrade() {
            let mut state = shared.state.lock().unwrap_or_else(|e| e.into_inner());
            state.subscribers.remove(&self.id);
        }
    }
}

struct Shared {
    state: Mutex<State>,
    next_id: AtomicU64,
}

/// The append-only input log. Cheaply clonable; all clones share the same
/// underlying lines, subscriber table, and background publish loop.
#[derive(Clone)]
pub struct InputLog {
    shared: std::sync::Arc<Shared>,
    tick: Duration,
    loop_cancel: CancellationToken,
}

impl InputLog {
    /// Construct a new log and start its background publish loop at the
    /// default 16 ms tick.
    pub fn new() -> Self {
        Self::with_tick_interval(DEFAULT_TICK_INTERVAL)
    }

    /// Construct a new log with a non-default tick interval. The default
    /// constructor uses the fixed 16 ms default; tests use this to avoid
    /// sleeping through real wall-clock ticks.
    pub fn with_tick_interval(tick: Duration) -> Self {
        let shared = std::sync::Arc::new(Shared {
            state: Mutex::new(State::new()),
            next_id: AtomicU64::new(0),
        });
        let loop_cancel = CancellationToken::new();

        let log = Self {
            shared,
            tick,
            loop_cancel,
        };
        log.spawn_publish_loop();
        log
    }

    /// Internal: append raw bytes read from the upstream source. Used only
    /// by the line segmenter. Accumulates into the pending incomplete-line
    /// buffer and, once a newline terminates it, moves it into the log as a
    /// new [`Line`].
    pub(crate) fn publish(&self, bytes: &[u8]) {
        let mut state = self.shared.state.lock().unwrap_or_else(|e| e.into_inner());
        state.incomplete.extend_from_slice(bytes);
        if state.incomplete.last() == Some(&b'\n') {
            let completed = std::mem::take(&mut state.incomplete);
            state.lines.push(Line::new(completed));
        }
    }

    /// Internal: flush the pending incomplete-line buffer as a final,
    /// unterminated [`Line`]. Used by the segmenter on end-of-input.
    pub(crate) fn flush_incomplete_tail(&self) {
        let mut state = self.shared.state.lock().unwrap_or_else(|e| e.into_inner());
        if !state.incomplete.is_empty() {
            let completed = std::mem::take(&mut state.incomplete);
            state.lines.push(Line::new(completed));
        }
    }

    /// Current number of completed lines in the log.
    pub fn len(&self) -> usize {
        let state = self.shared.state.lock().unwrap_or_else(|e| e.into_inner());
        state.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register a new subscription with watermark 0. Returns a channel on
    /// which batched `Line` slices are delivered, and a cancel handle.
    pub fn listen(&self) -> (mpsc::Receiver<Vec<Line>>, SubscriptionCancel) {
        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);
        // Capacity 1: the closest tokio equivalent of an unbuffered,
        // rendezvous-style channel — at most one already-sent-but-unconsumed
        // batch may be outstanding.
        let (tx, rx) = mpsc::channel(1);

        {
            let mut state = self.shared.state.lock().unwrap_or_else(|e| e.into_inner());
            state.subscribers.insert(
                id,
                Subscriber {
                    sender: tx,
                    watermark: 0,
                },
            );
        }

        let cancel = SubscriptionCancel {
            log: std::sync::Arc::downgrade(&self.shared),
            id,
        };
        (rx, cancel)
    }

    /// Stop the publish loop. Lines already published remain readable by
    /// any in-flight reads of [`InputLog::len`], but no further deliveries
    /// will occur.
    pub fn close(&self) {
        self.loop_cancel.cancel();
    }

    fn spawn_publish_loop(&self) {
        let shared = self.shared.clone();
        let loop_cancel = self.loop_cancel.clone();
        let tick = self.tick;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(tick);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // Scoped to the previous tick's in-flight deliveries; cancelled
            // at the start of the next tick so a slow subscriber can never
            // stall fan-out to everyone else for more than one tick.
            let mut prev_tick_cancel = CancellationToken::new();

            loop {
                tokio::select! {
                    _ = loop_cancel.cancelled() => {
                        prev_tick_cancel.cancel();
                        return;
                    }
                    _ = ticker.tick() => {
                        prev_tick_cancel.cancel();
                        prev_tick_cancel = CancellationToken::new();

                        let len = {
                            let state = shared.state.lock().unwrap_or_else(|e| e.into_inner());
                            state.lines.len()
                        };

                        let due: Vec<(u64, usize, mpsc::Sender<Vec<Line>>)> = {
                            let state = shared.state.lock().unwrap_or_else(|e| e.into_inner());
                            state
                                .subscribers
                                .iter()
                                .filter(|(_, sub)| sub.watermark < len)
                                .map(|(id, sub)| (*id, sub.watermark, sub.sender.clone()))
                                .collect()
                        };

                        for (id, watermark, sender) in due {
                            let shared = shared.clone();
                            let tick_cancel = prev_tick_cancel.clone();
                            let batch: Vec<Line> = {
                                let state = shared.state.lock().unwrap_or_else(|e| e.into_inner());
                                state.lines[watermark..len].to_vec()
                            };
                            tokio::spawn(async move {
                                tokio::select! {
                                    result = sender.send(batch) => {
                                        if result.is_ok() {
                                            let mut state =
                                                shared.state.lock().unwrap_or_else(|e| e.into_inner());
                                            if let Some(sub) = state.subscribers.get_mut(&id) {
                                                sub.watermark = len;
                                            }
                                        }
                                    }
                                    _ = tick_cancel.cancelled() => {}
                                }
                            });
                        }
                    }
                }
            }
        });
    }
}

impl Default for InputLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod log_tests;
