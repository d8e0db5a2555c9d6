use anyhow::Result;
use async_trait::async_trait;
use tokio::io::BufReader;
use tokio::sync::mpsc;

use crate::models::HostEvent;

use super::{EventSource, pump};

/// Events piped in on standard input.
pub struct StdinSource;

#[async_trait]
impl EventSource for StdinSource {
    async fn stream(&self, tx: mpsc::UnboundedSender<HostEvent>) -> Result<()> {
        let sent = pump(BufReader::new(tokio::io::stdin()), &tx).await?;
        tracing::debug!(sent, "stdin closed");
        Ok(())
    }

    fn name(&self) -> &str {
        "stdin"
    }
}
