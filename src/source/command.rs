use std::process::Stdio;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::BufReader;
use tokio::process::Command;
use tokio::sync::mpsc;

use crate::models::HostEvent;

use super::{EventSource, pump, read_line_lossy};

/// Guard that kills the child process (and its entire process group) on drop.
struct ChildGuard {
    child: Option<tokio::process::Child>,
    /// Process group ID saved at spawn time so we can kill the whole group.
    #[cfg(unix)]
    pgid: Option<u32>,
}

impl ChildGuard {
    fn new(child: tokio::process::Child) -> Self {
        #[cfg(unix)]
        let pgid = child.id();
        Self {
            child: Some(child),
            #[cfg(unix)]
            pgid,
        }
    }

    /// The child has been reaped; nothing is left to kill.
    fn disarm(&mut self) {
        self.child = None;
        #[cfg(unix)]
        {
            self.pgid = None;
        }
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        // Kill the entire process group so browsers launched by the host don't become orphans.
        #[cfg(unix)]
        if let Some(pgid) = self.pgid {
            unsafe { libc::kill(-(pgid as libc::pid_t), libc::SIGKILL) };
        }
        if let Some(ref mut child) = self.child {
            let _ = child.start_kill();
        }
    }
}

/// Runs the host test runner and reads NDJSON events from its stdout.
pub struct CommandSource {
    argv: Vec<String>,
}

impl CommandSource {
    pub fn new(argv: Vec<String>) -> Result<Self> {
        if argv.is_empty() {
            anyhow::bail!("host command is empty");
        }
        Ok(Self { argv })
    }
}

#[async_trait]
impl EventSource for CommandSource {
    async fn stream(&self, tx: mpsc::UnboundedSender<HostEvent>) -> Result<()> {
        let (program, args) = self.argv.split_first().context("host command is empty")?;

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        // Own process group, so the guard can take down everything the host forks.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.as_std_mut().process_group(0);
        }

        tracing::debug!(cmd = ?cmd.as_std(), "spawning host");
        let mut child = cmd
            .spawn()
            .with_context(|| format!("failed to spawn `{program}`"))?;
        let stdout = child.stdout.take().context("missing stdout")?;
        let stderr = child.stderr.take().context("missing stderr")?;

        // The child stays in the guard so it is killed if this future is dropped.
        let mut guard = ChildGuard::new(child);

        // stdout is the display, so the host's stderr only goes to the log.
        let stderr_handle = tokio::spawn(async move {
            let mut reader = BufReader::new(stderr);
            let mut buf = Vec::new();
            loop {
                match read_line_lossy(&mut reader, &mut buf).await {
                    Ok(Some(line)) => tracing::debug!(target: "brief::host", "{line}"),
                    Ok(None) => break,
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to read host stderr");
                        break;
                    }
                }
            }
        });

        let sent = pump(BufReader::new(stdout), &tx).await?;
        stderr_handle.await.ok();

        if let Some(ref mut child) = guard.child {
            let status = child.wait().await.context("failed to wait for host command")?;
            guard.disarm();
            tracing::debug!(sent, %status, "host exited");
            if !status.success() {
                // Hosts exit non-zero when specs fail; the report already says why.
                tracing::warn!(%status, "host command exited unsuccessfully");
            }
        }

        Ok(())
    }

    fn name(&self) -> &str {
        &self.argv[0]
    }
}
