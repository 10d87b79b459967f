use prayer_core::{ThemeMode, TimeOfDay};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure parsed from `widget.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// Locations of the two cache tiers.
    pub store: StoreConfig,
    /// Background refresh protocol tuning.
    pub refresh: RefreshConfig,
    /// Highlight wake timers.
    pub alarms: AlarmConfig,
    /// Sockets used to talk to the main application.
    pub ipc: IpcConfig,
    /// Light / dark preference.
    pub appearance: AppearanceConfig,
    /// Render cadence and output.
    pub render: RenderConfig,
}

/// Key-value tier directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Fast tier, owned by the widget process.
    pub fast_dir: PathBuf,
    /// Fallback tier, written by the main application.
    pub fallback_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        let base = data_home();
        Self {
            fast_dir:     base.join("prayer-widget").join("widget-cache"),
            fallback_dir: base.join("prayer-times").join("shared"),
        }
    }
}

/// Refresh orchestration parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Upper bound on waiting for the main application to publish (seconds).
    pub wait_secs: u64,
    /// Backstop interval for re-reading the fallback tier (milliseconds).
    pub poll_interval_ms: u64,
    /// Attempts per task before giving up.
    pub max_attempts: u32,
    /// Delay before the first retry (seconds); doubles per attempt.
    pub initial_backoff_secs: u64,
    /// Ceiling for the retry delay (seconds).
    pub max_backoff_secs: u64,
    /// Local time of the daily bulk refresh, `HH:MM`.
    pub daily_at: String,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            wait_secs:            20,
            poll_interval_ms:     500,
            max_attempts:         5,
            initial_backoff_secs: 30,
            max_backoff_secs:     600,
            daily_at:             "00:05".to_string(),
        }
    }
}

impl RefreshConfig {
    pub fn wait(&self) -> Duration {
        Duration::from_secs(self.wait_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(10))
    }

    /// Parsed `daily_at`; an unreadable value falls back to the default.
    pub fn daily_time(&self) -> TimeOfDay {
        TimeOfDay::parse(&self.daily_at).unwrap_or_else(|| {
            tracing::warn!("invalid refresh.daily_at '{}'; using 00:05", self.daily_at);
            TimeOfDay { hour: 0, minute: 5 }
        })
    }
}

/// Wake-timer policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlarmConfig {
    /// Whether the platform grants precise wakes.
    pub allow_exact: bool,
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self { allow_exact: true }
    }
}

/// Unix sockets for cross-process intents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IpcConfig {
    /// Where the main application listens for refresh requests.
    pub app_socket: PathBuf,
    /// Where this process listens for button presses and app wakes.
    pub widget_socket: PathBuf,
}

impl Default for IpcConfig {
    fn default() -> Self {
        let runtime = runtime_dir();
        Self {
            app_socket:    runtime.join("prayer-times.sock"),
            widget_socket: runtime.join("prayer-widget.sock"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppearanceConfig {
    /// `light`, `dark` or `system`; unset means "use the cached record's flag".
    pub theme_mode: Option<ThemeMode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Periodic redraw interval (seconds).
    pub periodic_secs: u64,
    /// Directory that receives one published frame per layout.
    pub frame_dir: PathBuf,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            periodic_secs: 1800,
            frame_dir:     data_home().join("prayer-widget").join("frames"),
        }
    }
}

fn data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| crate::home().join(".local").join("share"))
}

fn runtime_dir() -> PathBuf {
    std::env::var("XDG_RUNTIME_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| std::env::temp_dir())
}
