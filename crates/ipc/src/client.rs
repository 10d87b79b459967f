use crate::intent::{format_intent, Intent};
use prayer_core::{AppSignal, Result, WidgetError, WidgetFamily};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::UnixStream;
use tracing::{debug, warn};

const SEND_TIMEOUT: Duration = Duration::from_secs(2);

/// Fire-and-forget intent sender for a peer's Unix socket.
///
/// Nothing is read back: the peer's reaction is observed elsewhere (for the
/// main application, through the fallback cache tier).
#[derive(Debug, Clone)]
pub struct SocketSignal {
    socket: PathBuf,
}

impl SocketSignal {
    pub fn new(socket: impl Into<PathBuf>) -> Self {
        Self { socket: socket.into() }
    }

    pub fn socket(&self) -> &Path {
        &self.socket
    }

    /// Send one intent line and close the connection.
    pub async fn send(&self, intent: &Intent) -> Result<()> {
        tokio::time::timeout(SEND_TIMEOUT, self.write_line(intent))
            .await
            .map_err(|_| WidgetError::Ipc(format!("'{}' timed out", self.socket.display())))?
    }

    async fn write_line(&self, intent: &Intent) -> Result<()> {
        let mut stream = UnixStream::connect(&self.socket).await.map_err(|e| {
            WidgetError::Ipc(format!("connect '{}': {e}", self.socket.display()))
        })?;
        stream
            .write_all(format_intent(intent).as_bytes())
            .await
            .map_err(|e| WidgetError::Ipc(format!("write: {e}")))?;
        stream
            .shutdown()
            .await
            .map_err(|e| WidgetError::Ipc(format!("shutdown: {e}")))?;
        debug!(socket = %self.socket.display(), ?intent, "intent sent");
        Ok(())
    }
}

impl AppSignal for SocketSignal {
    /// Queues the send on the current tokio runtime and returns at once;
    /// delivery failures are logged.
    fn request_refresh(&self, family: WidgetFamily) -> Result<()> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| WidgetError::Ipc(format!("no runtime for signal: {e}")))?;
        let signal = self.clone();
        runtime.spawn(async move {
            if let Err(e) = signal.send(&Intent::RefreshWidgetCache(family)).await {
                warn!("cannot signal main application: {e}");
            }
        });
        Ok(())
    }
}
