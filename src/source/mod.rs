pub mod command;
pub mod stdin;

use std::io;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;

use crate::config::SourceConfig;
use crate::models::HostEvent;

pub use command::CommandSource;
pub use stdin::StdinSource;

/// Where host lifecycle events come from.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Stream events over the channel until the host is done.
    async fn stream(&self, tx: mpsc::UnboundedSender<HostEvent>) -> Result<()>;

    /// Display name for this source (e.g., "stdin").
    fn name(&self) -> &str;
}

/// Pick the source: a command given on the command line, then the configured
/// command, then stdin.
pub fn select(args: Vec<String>, config: &SourceConfig) -> Result<Box<dyn EventSource>> {
    if !args.is_empty() {
        return Ok(Box::new(CommandSource::new(args)?));
    }
    if let Some(command) = &config.command {
        let argv = shell_words::split(command)
            .with_context(|| format!("failed to parse source command `{command}`"))?;
        return Ok(Box::new(CommandSource::new(argv)?));
    }
    Ok(Box::new(StdinSource))
}

/// Parse one NDJSON line. Blank lines and anything that isn't an event are
/// skipped.
pub fn parse_line(line: &str) -> Option<HostEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match serde_json::from_str(line) {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::debug!(error = %e, line, "skipping non-event line");
            None
        }
    }
}

/// Read the next line, decoding invalid UTF-8 lossily. The line terminator
/// is dropped. Returns `None` at end of input.
pub async fn read_line_lossy<R>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    if reader.read_until(b'\n', buf).await? == 0 {
        return Ok(None);
    }
    let line = String::from_utf8_lossy(&buf[..]);
    Ok(Some(line.trim_end_matches(['\n', '\r']).to_owned()))
}

/// Forward every event read from `reader`. Returns how many were sent.
pub async fn pump<R>(mut reader: R, tx: &mpsc::UnboundedSender<HostEvent>) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let mut sent = 0;
    while let Some(line) = read_line_lossy(&mut reader, &mut buf)
        .await
        .context("failed to read event stream")?
    {
        let Some(event) = parse_line(&line) else {
            continue;
        };
        if tx.send(event).is_err() {
            tracing::debug!("event receiver closed, stopping");
            break;
        }
        sent += 1;
    }
    Ok(sent)
}
