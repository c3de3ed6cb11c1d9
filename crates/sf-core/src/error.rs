//! Core error taxonomy.
//!
//! Per the propagation policy: executor-local failures (spawn failure, a
//! child's non-zero exit) never reach this type — they are folded into an
//! [`crate::output::Output`]'s stderr field instead. `CoreError` exists only
//! for the one condition the core itself cannot route around: the
//! segmenter's upstream byte source failing non-EOF, which is fatal because
//! there is no meaningful continuation once the input pipe is broken.

use std::io;

#[derive(thiserror::Error, Debug)]
pub enum CoreError {
    #[error("reading input stream failed: {0}")]
    Io(#[from] io::Error),
}
