use crate::intent::{parse_intent, Intent};
use prayer_core::{Result, WidgetError};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Registration of this process as an intent receiver.
///
/// Created at start-up; dropping it stops accepting and removes the socket
/// file, so a stale registration never outlives the process.
pub struct IntentListener {
    path: PathBuf,
    task: JoinHandle<()>,
}

impl IntentListener {
    /// Bind `path` and forward every parsed intent on the returned channel.
    /// A stale socket file from a previous run is replaced.
    pub fn bind(path: impl AsRef<Path>) -> Result<(Self, mpsc::Receiver<Intent>)> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        match std::fs::remove_file(&path) {
            Ok(()) => debug!("removed stale socket {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let listener = UnixListener::bind(&path)
            .map_err(|e| WidgetError::Ipc(format!("bind '{}': {e}", path.display())))?;
        info!("Listening for intents on {}", path.display());

        let (tx, rx) = mpsc::channel(32);
        let task = tokio::spawn(accept_loop(listener, tx));
        Ok((Self { path, task }, rx))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for IntentListener {
    fn drop(&mut self) {
        self.task.abort();
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("cannot remove socket {}: {e}", self.path.display());
            }
        }
    }
}

async fn accept_loop(listener: UnixListener, tx: mpsc::Sender<Intent>) {
    loop {
        match listener.accept().await {
            Ok((stream, _)) => {
                tokio::spawn(read_intents(stream, tx.clone()));
            }
            Err(e) => {
                warn!("intent socket accept failed: {e}");
                tokio::time::sleep(std::time::Duration::from_millis(200)).await;
            }
        }
        if tx.is_closed() {
            return; // all receivers dropped
        }
    }
}

async fn read_intents(stream: UnixStream, tx: mpsc::Sender<Intent>) {
    let mut lines = BufReader::new(stream).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if line.trim().is_empty() {
            continue;
        }
        let intent = parse_intent(&line);
        if let Intent::Unknown(raw) = &intent {
            debug!("ignoring unknown intent: {raw}");
            continue;
        }
        if tx.send(intent).await.is_err() {
            return;
        }
    }
}
