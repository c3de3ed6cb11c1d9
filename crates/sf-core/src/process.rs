//! Shared child-process spawn helper used by all three subprocess-driving
//! executors (iterative, snapshot, live).
//!
//! Pipes all three stdio streams, sets `kill_on_drop` as a safety net in
//! addition to explicit cancellation, and (on unix) isolates the child in
//! its own process group via `setsid` so cancelling an executor also reaps
//! any grandchildren the command spawned.

use std::process::Stdio;

use tokio::process::Command;
#[cfg(unix)]
use std::os::unix::process::CommandExt;

/// Build a [`Command`] for `argv[0]` with `argv[1..]` as arguments, piped
/// stdio, and process-group isolation on unix. `argv` must be non-empty.
pub fn build_command(argv: &[String]) -> Command {
    debug_assert!(!argv.is_empty(), "build_command requires a non-empty argv");
    let mut cmd = Command::new(&argv[0]);
    cmd.args(&argv[1..]);
    cmd.stdin(Stdio::piped());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    cmd.kill_on_drop(true);

    // SAFETY: setsid() is async-signal-safe and runs before exec in the
    // forked child, before any other thread's state is shared.
    #[cfg(unix)]
    unsafe {
        cmd.pre_exec(|| {
            libc::setsid();
            Ok(())
        });
    }

    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn spawns_piped_child_and_captures_output() {
        let mut cmd = build_command(&["echo".to_string(), "hi".to_string()]);
        let child = cmd.spawn().expect("spawn succeeds");
        let output = child.wait_with_output().await.expect("child completes");
        assert_eq!(output.stdout, b"hi\n");
    }
}
