use crate::schedule::{Prayer, PrayerSchedule};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Persisted field names shared by both cache tiers.
pub mod field {
    pub const SOURCE:          &str = "source";
    pub const LOCATION:        &str = "location";
    pub const HUE:             &str = "hue";
    pub const DARK_MODE:       &str = "isDarkMode";
    pub const BG_TRANSPARENCY: &str = "bgTransparency";
    pub const CACHE_DATE:      &str = "cacheDateDdMmYyyy";
    pub const CACHE_TIMESTAMP: &str = "cacheTimestampMs";
}

const DEFAULT_HUE: f64 = 200.0;

/// Everything the widget needs to draw itself without the main application.
///
/// Readers must accept partial records: each field falls back to its default
/// on its own, since the two tiers may be written by different app versions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheRecord {
    #[serde(flatten)]
    pub schedule: PrayerSchedule,
    #[serde(rename = "source")]
    pub source_label: String,
    pub location: String,
    /// Theme hue in degrees, `[0, 360)`.
    #[serde(rename = "hue")]
    pub theme_hue: f64,
    #[serde(rename = "isDarkMode")]
    pub dark_mode: bool,
    /// Root background opacity in `(0, 1]`.
    #[serde(rename = "bgTransparency")]
    pub background_opacity: f64,
    #[serde(rename = "cacheDateDdMmYyyy")]
    pub cache_date_key: String,
    #[serde(rename = "cacheTimestampMs")]
    pub cache_timestamp: i64,
}

impl Default for CacheRecord {
    fn default() -> Self {
        Self {
            schedule:           PrayerSchedule::default(),
            source_label:       String::new(),
            location:           String::new(),
            theme_hue:          DEFAULT_HUE,
            dark_mode:          false,
            background_opacity: 1.0,
            cache_date_key:     String::new(),
            cache_timestamp:    0,
        }
    }
}

impl CacheRecord {
    /// Build a record from a JSON object, defaulting every missing or
    /// mistyped field independently.  The result is already normalized.
    pub fn from_map(map: &Map<String, Value>) -> Self {
        let defaults = Self::default();
        let string = |key: &str, fallback: &str| {
            map.get(key)
                .and_then(Value::as_str)
                .map_or_else(|| fallback.to_string(), str::to_string)
        };

        let mut schedule = PrayerSchedule::default();
        for prayer in Prayer::ALL {
            if let Some(raw) = map.get(prayer.key()).and_then(Value::as_str) {
                schedule.set(prayer, raw);
            }
        }

        let record = Self {
            schedule,
            source_label: string(field::SOURCE, &defaults.source_label),
            location:     string(field::LOCATION, &defaults.location),
            theme_hue: map
                .get(field::HUE)
                .and_then(Value::as_f64)
                .unwrap_or(defaults.theme_hue),
            dark_mode: map
                .get(field::DARK_MODE)
                .and_then(Value::as_bool)
                .unwrap_or(defaults.dark_mode),
            background_opacity: map
                .get(field::BG_TRANSPARENCY)
                .and_then(Value::as_f64)
                .unwrap_or(defaults.background_opacity),
            cache_date_key: string(field::CACHE_DATE, &defaults.cache_date_key),
            cache_timestamp: map
                .get(field::CACHE_TIMESTAMP)
                .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))
                .unwrap_or(defaults.cache_timestamp),
        };

        record.normalized()
    }

    /// Parse a whole-record JSON document.  Anything that is not a JSON
    /// object counts as "no record".
    pub fn from_json(raw: &str) -> Option<Self> {
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => Some(Self::from_map(&map)),
            Ok(other) => {
                tracing::warn!("cached record is not a JSON object (got {}); ignoring", kind(&other));
                None
            }
            Err(e) => {
                tracing::warn!("cached record is not valid JSON: {e}; ignoring");
                None
            }
        }
    }

    /// Field-by-field view used by per-field stores.
    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    /// Clamp fields into their documented ranges.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if !(self.background_opacity > 0.0) {
            self.background_opacity = 1.0;
        }
        self.background_opacity = self.background_opacity.min(1.0);

        self.theme_hue = if self.theme_hue.is_finite() {
            self.theme_hue.rem_euclid(360.0)
        } else {
            DEFAULT_HUE
        };
        self
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null      => "null",
        Value::Bool(_)   => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_)  => "array",
        Value::Object(_) => "object",
    }
}

/// User preference for light/dark rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
    /// Follow the platform appearance at render time.
    System,
}
