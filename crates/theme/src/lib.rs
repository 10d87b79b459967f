pub mod appearance;
pub mod colors;
pub mod palette;

pub use appearance::system_prefers_dark;
pub use colors::Color;
pub use palette::{palette, Palette, Slot};

use prayer_core::{CacheRecord, ThemeMode};

/// Colours for one render, derived from a [`CacheRecord`].
///
/// Building a [`WidgetTheme`] is infallible: out-of-range hue and opacity are
/// normalised rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WidgetTheme {
    pub palette:   Palette,
    pub dark_mode: bool,
}

impl WidgetTheme {
    pub fn from_record(record: &CacheRecord, mode: Option<ThemeMode>, system_dark: bool) -> Self {
        let dark_mode = resolve_dark_mode(mode, record.dark_mode, system_dark);
        Self {
            palette: palette(record.theme_hue, dark_mode)
                .with_background_opacity(record.background_opacity),
            dark_mode,
        }
    }
}

/// Effective dark mode.
///
/// An explicit preference wins, `system` follows the platform appearance,
/// and with no preference configured the record's stored flag is used.
pub fn resolve_dark_mode(mode: Option<ThemeMode>, stored: bool, system_dark: bool) -> bool {
    match mode {
        Some(ThemeMode::Light)  => false,
        Some(ThemeMode::Dark)   => true,
        Some(ThemeMode::System) => system_dark,
        None                    => stored,
    }
}
