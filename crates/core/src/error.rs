use thiserror::Error;

/// Top-level error type shared by every crate in the workspace.
#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("config error: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("IPC error: {0}")]
    Ipc(String),

    #[error("alarm error: {0}")]
    Alarm(String),

    /// The platform refused a capability (e.g. exact wake timers).
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

pub type Result<T, E = WidgetError> = std::result::Result<T, E>;
