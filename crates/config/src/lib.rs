pub mod schema;
pub mod watcher;

pub use schema::{
    AlarmConfig, AppearanceConfig, IpcConfig, RefreshConfig, RenderConfig, StoreConfig,
    WidgetConfig,
};
pub use watcher::FileWatcher;

use prayer_core::{Result, WidgetError};
use std::path::{Path, PathBuf};

/// Load configuration from a TOML file.  Returns `WidgetConfig::default()` if
/// the file doesn't exist so the widget always has sensible defaults.
pub fn load(path: impl AsRef<Path>) -> Result<WidgetConfig> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::warn!(
            "Config file not found at '{}'; using defaults.",
            path.display()
        );
        return Ok(WidgetConfig::default());
    }

    let raw = std::fs::read_to_string(path)
        .map_err(|e| WidgetError::Config(format!("cannot read '{}': {e}", path.display())))?;

    toml::from_str(&raw).map_err(|e| WidgetError::Config(format!("TOML parse error: {e}")))
}

/// Return the default config path, honouring `$XDG_CONFIG_HOME`.
pub fn default_path() -> PathBuf {
    config_home().join("prayer-widget").join("widget.toml")
}

fn config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home().join(".config"))
}

pub(crate) fn home() -> PathBuf {
    PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
}
