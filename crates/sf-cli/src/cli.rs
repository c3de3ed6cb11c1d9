use clap::{Parser, ValueEnum};

use sf_core::executor::Mode;

/// Streams piped standard input through a re-editable command, rendering
/// its live output. Argv carries no other behavior-affecting flags.
#[derive(Parser, Debug)]
#[command(name = "sf", version, about)]
pub struct Cli {
    /// Initial execution mode for the command line.
    #[arg(long, value_enum, default_value = "snapshot")]
    pub mode: CliMode,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum CliMode {
    Snapshot,
    Iterative,
    Live,
}

impl From<CliMode> for Mode {
    fn from(mode: CliMode) -> Self {
        match mode {
            CliMode::Snapshot => Mode::Snapshot,
            CliMode::Iterative => Mode::Iterative,
            CliMode::Live => Mode::Live,
        }
    }
}
