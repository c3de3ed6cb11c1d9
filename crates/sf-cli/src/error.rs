//! Host-only error conditions: anything that happens before an executor
//! exists to report through `Output.stderr`. Core errors never surface
//! here — see `sf_core::error::CoreError`'s doc comment for the boundary.

#[derive(thiserror::Error, Debug)]
pub enum HostError {
    #[error("standard input is a tty; pipe data into this program instead")]
    StdinIsTty,

    #[error("failed to open /dev/tty: {0}")]
    TtyOpen(#[source] std::io::Error),
}
