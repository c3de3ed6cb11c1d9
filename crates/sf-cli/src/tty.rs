//! Opens the controlling terminal directly, so the command-line editor
//! never contends with piped stdin for bytes.

use std::fs::{File, OpenOptions};
use std::io;

pub fn open() -> io::Result<File> {
    OpenOptions::new().read(true).write(true).open("/dev/tty")
}
