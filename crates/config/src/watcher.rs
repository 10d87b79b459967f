use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Watches a file or directory and sends a notification on every write.
///
/// Used for the settings file and for the fallback cache tier, which the
/// main application rewrites out of process.
///
/// # Example
/// ```no_run
/// # async fn demo() {
/// let (_watcher, mut rx) = prayer_config::FileWatcher::spawn("/home/user/.config/prayer-widget/widget.toml");
/// while rx.recv().await.is_some() {
///     println!("changed, reloading");
/// }
/// # }
/// ```
pub struct FileWatcher {
    path: PathBuf,
    task: tokio::task::JoinHandle<()>,
}

impl FileWatcher {
    /// Spawn a filesystem watcher for `path`.
    /// Returns the watcher handle and a receiver that fires on every detected change.
    /// Dropping the handle stops the watch.
    pub fn spawn(path: impl AsRef<Path>) -> (Self, mpsc::Receiver<()>) {
        let (tx, rx) = mpsc::channel(1);
        let path = path.as_ref().to_path_buf();
        let task = tokio::spawn(watch_loop(path.clone(), tx));

        (Self { path, task }, rx)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn watch_loop(path: PathBuf, tx: mpsc::Sender<()>) {
    use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
    use std::time::Duration;

    let (sync_tx, mut sync_rx) = mpsc::channel::<notify::Result<Event>>(16);

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = sync_tx.blocking_send(res);
        },
        Config::default().with_poll_interval(Duration::from_secs(2)),
    ) {
        Ok(w) => w,
        Err(e) => {
            error!("Failed to create filesystem watcher: {e}");
            return;
        }
    };

    if let Err(e) = watcher.watch(&path, RecursiveMode::NonRecursive) {
        error!("Failed to watch '{}': {e}", path.display());
        return;
    }

    info!("Watching {}", path.display());

    while let Some(event) = sync_rx.recv().await {
        match event {
            Ok(e) => {
                use notify::EventKind::*;
                // A full channel already carries a pending notification.
                if matches!(e.kind, Modify(_) | Create(_))
                    && matches!(tx.try_send(()), Err(mpsc::error::TrySendError::Closed(_)))
                {
                    break; // receiver dropped
                }
            }
            Err(e) => warn!("Watcher error: {e}"),
        }
    }
}
