use crate::family::{TriggerSource, WidgetFamily};

/// All messages that can flow through the daemon event bus.
///
/// Sources:
/// - Intent listener        → `Refresh` (button, app wake)
/// - Highlight alarms       → `AlarmFired`
/// - Refresh task runner    → `Render` after a successful refresh
/// - Timers                 → `Refresh` (daily), `Render` (periodic)
/// - Config watcher task    → `ConfigReloaded`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // ── Rendering ─────────────────────────────────────────────────────────────
    /// Redraw every instance of `family`.
    Render {
        family: WidgetFamily,
        reason: RenderReason,
    },
    /// The family's highlight wake went off.
    AlarmFired(WidgetFamily),

    // ── Refresh ───────────────────────────────────────────────────────────────
    /// Request a cache refresh for `family`.
    Refresh {
        trigger: TriggerSource,
        family:  WidgetFamily,
    },

    // ── Config ────────────────────────────────────────────────────────────────
    /// Settings file changed on disk.
    ConfigReloaded,
}

/// Why a render was requested; only used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderReason {
    Startup,
    Periodic,
    AlarmFired,
    Refreshed,
    SettingsChanged,
}
