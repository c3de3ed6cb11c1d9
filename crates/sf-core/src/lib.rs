//! Streaming input fan-out and command re-execution engine.
//!
//! Bytes arrive on a byte source and are segmented into [`Line`]s by
//! [`segmenter`], accumulated in an [`log::InputLog`], and fanned out on a
//! fixed tick to whichever [`executor`] the [`supervisor::Supervisor`]
//! currently has selected. Each executor drives a child process (or, for the
//! empty command, simply passes input through) and emits cumulative
//! [`output::Output`] snapshots, which the supervisor tags with a generation
//! id so a caller can discard anything superseded by a newer command.

pub mod error;
pub mod executor;
pub mod line;
pub mod log;
pub mod multiline_reader;
pub mod output;
pub mod process;
pub mod segmenter;
pub mod supervisor;
pub mod token;

pub use error::CoreError;
pub use executor::{ExecuteOptions, ExecutorHandle, Mode, spawn_executor};
pub use line::Line;
pub use log::InputLog;
pub use output::Output;
pub use supervisor::{Supervisor, Tagged};
