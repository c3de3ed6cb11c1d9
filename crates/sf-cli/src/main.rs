mod cli;
mod error;
mod tty;

use std::io::{self, IsTerminal, Write};

use anyhow::Result;
use clap::Parser;
use sf_core::executor::ExecuteOptions;
use sf_core::{InputLog, Output, Supervisor};

use cli::Cli;
use error::HostError;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()
        .ok();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("{e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    if std::io::stdin().is_terminal() {
        return Err(HostError::StdinIsTty.into());
    }

    let input = InputLog::new();
    let segmenter_input = input.clone();
    tokio::spawn(async move {
        if let Err(e) = sf_core::segmenter::run(tokio::io::stdin(), &segmenter_input).await {
            tracing::error!("input stream failed: {e}");
        }
    });

    let tty_write = tty::open().map_err(HostError::TtyOpen)?;
    let tty_read = tty_write.try_clone().map_err(HostError::TtyOpen)?;

    // When stdout is itself a pipe/file, render live output to the tty and
    // save the final frame for stdout on exit; when stdout is already a
    // terminal, render there directly and there is nothing to hand back.
    let stdout_is_tty = std::io::stdout().is_terminal();
    let mut render_target = tty_write;

    let (line_tx, mut line_rx) = tokio::sync::mpsc::unbounded_channel::<String>();
    tokio::task::spawn_blocking(move || read_command_lines(tty_read, line_tx));

    let (mut supervisor, mut outputs) = Supervisor::new(input);
    let mode = cli.mode.into();
    let mut last_output: Option<Output> = None;

    loop {
        tokio::select! {
            line = line_rx.recv() => {
                let Some(command) = line else { break };
                supervisor.submit(&command, mode, ExecuteOptions::default());
            }
            tagged = outputs.recv() => {
                let Some((generation, output)) = tagged else { break };
                if generation != supervisor.current_generation() {
                    continue;
                }
                render(&mut render_target, &output)?;
                last_output = Some(output);
            }
        }
    }

    if !stdout_is_tty {
        if let Some(output) = last_output {
            let mut stdout = std::io::stdout();
            for line in &output.stdout {
                stdout.write_all(line.as_bytes())?;
            }
        }
    }

    Ok(())
}

/// Runs on a blocking thread: reads one command line per `Enter` press from
/// the controlling terminal, forwarding each to the async loop. Returns
/// (dropping `tx`) on tty EOF (Ctrl-D) or a read error.
fn read_command_lines(tty_read: std::fs::File, tx: tokio::sync::mpsc::UnboundedSender<String>) {
    use std::io::BufRead;
    let mut reader = io::BufReader::new(tty_read);
    let mut buf = String::new();
    loop {
        buf.clear();
        match reader.read_line(&mut buf) {
            Ok(0) | Err(_) => return,
            Ok(_) => {
                let line = buf.trim_end_matches(['\n', '\r']).to_string();
                if tx.send(line).is_err() {
                    return;
                }
            }
        }
    }
}

fn render(target: &mut impl Write, output: &Output) -> io::Result<()> {
    write!(target, "\x1b[2J\x1b[H")?;
    for line in &output.stdout {
        target.write_all(line.as_bytes())?;
    }
    for line in &output.stderr {
        target.write_all(line.as_bytes())?;
    }
    target.flush()
}
