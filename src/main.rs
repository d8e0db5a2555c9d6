mod config;
mod logging;
mod models;
mod report;
mod source;
mod terminal;

use std::future::Future;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use config::Config;
use models::HostEvent;
use report::canonicalize::strip_origin;
use report::{Reporter, Styles, handle_host_event};
use terminal::Terminal;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    logging::init()?;

    let workspace = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let config = Config::load(&workspace);
    tracing::debug!(?config, "loaded config");

    let source = source::select(host_command(std::env::args().skip(1)), &config.source)?;
    tracing::info!(source = source.name(), "reading host events");

    let (tx, mut rx) = mpsc::unbounded_channel();
    let stream = tokio::spawn(async move { source.stream(tx).await });

    let mut reporter = Reporter::new(config.reporter, Terminal::stdout())
        .with_formatter(|line| strip_origin(line).trim().to_owned());
    if std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()) {
        reporter = reporter.with_styles(Styles::plain());
    }

    let interrupted = drain(&mut rx, &mut reporter, tokio::signal::ctrl_c()).await;
    reporter.finish();

    if interrupted {
        tracing::info!("interrupted, stopping host");
        // Dropping the stream future kills the host's process group.
        stream.abort();
        return Ok(ExitCode::from(130));
    }

    stream
        .await
        .context("event source task panicked")?
        .context("event source failed")?;

    Ok(if reporter.has_failures() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Feed events to the reporter until the source closes the channel or
/// `interrupt` completes. Returns whether it was interrupted.
async fn drain<W: Write>(
    rx: &mut mpsc::UnboundedReceiver<HostEvent>,
    reporter: &mut Reporter<W>,
    interrupt: impl Future,
) -> bool {
    tokio::pin!(interrupt);
    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Some(event) => handle_host_event(reporter, event),
                None => return false,
            },
            _ = &mut interrupt => return true,
        }
    }
}

/// Everything after the program name, minus a leading `--`.
fn host_command(args: impl Iterator<Item = String>) -> Vec<String> {
    let mut args: Vec<String> = args.collect();
    if args.first().is_some_and(|a| a == "--") {
        args.remove(0);
    }
    args
}
