use serde::{Deserialize, Serialize};

/// Placeholder shown for a prayer whose time is missing or unreadable.
pub const UNKNOWN_TIME: &str = "--:--";

/// The six daily events, in canonical display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Prayer {
    Fajr,
    Sunrise,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl Prayer {
    pub const ALL: [Prayer; 6] = [
        Prayer::Fajr,
        Prayer::Sunrise,
        Prayer::Dhuhr,
        Prayer::Asr,
        Prayer::Maghrib,
        Prayer::Isha,
    ];

    /// Field name used in the persisted record.
    pub fn key(self) -> &'static str {
        match self {
            Prayer::Fajr    => "fajr",
            Prayer::Sunrise => "sunrise",
            Prayer::Dhuhr   => "dhuhr",
            Prayer::Asr     => "asr",
            Prayer::Maghrib => "maghrib",
            Prayer::Isha    => "isha",
        }
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            Prayer::Fajr    => "Fajr",
            Prayer::Sunrise => "Sunrise",
            Prayer::Dhuhr   => "Dhuhr",
            Prayer::Asr     => "Asr",
            Prayer::Maghrib => "Maghrib",
            Prayer::Isha    => "Isha",
        }
    }
}

/// A well-formed wall-clock `HH:MM` reading, device-local.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeOfDay {
    pub hour:   u8,
    pub minute: u8,
}

impl TimeOfDay {
    /// Parse `"HH:MM"`.  Anything else (wrong token count, non-numeric or
    /// out-of-range components) yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.trim().split(':');
        let hour   = parts.next()?.trim().parse::<u8>().ok()?;
        let minute = parts.next()?.trim().parse::<u8>().ok()?;
        if parts.next().is_some() || hour > 23 || minute > 59 {
            return None;
        }
        Some(Self { hour, minute })
    }

    /// Minutes since local midnight.
    #[must_use]
    pub fn minutes(self) -> i32 {
        i32::from(self.hour) * 60 + i32::from(self.minute)
    }

    pub fn to_naive(self) -> chrono::NaiveTime {
        chrono::NaiveTime::from_hms_opt(u32::from(self.hour), u32::from(self.minute), 0)
            .unwrap_or(chrono::NaiveTime::MIN)
    }
}

/// Raw prayer times for one day.
///
/// Values are kept verbatim: a malformed entry is tolerated here and skipped
/// by consumers that need a real time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrayerSchedule {
    pub fajr:    String,
    pub sunrise: String,
    pub dhuhr:   String,
    pub asr:     String,
    pub maghrib: String,
    pub isha:    String,
}

impl Default for PrayerSchedule {
    fn default() -> Self {
        Self {
            fajr:    UNKNOWN_TIME.to_string(),
            sunrise: UNKNOWN_TIME.to_string(),
            dhuhr:   UNKNOWN_TIME.to_string(),
            asr:     UNKNOWN_TIME.to_string(),
            maghrib: UNKNOWN_TIME.to_string(),
            isha:    UNKNOWN_TIME.to_string(),
        }
    }
}

impl PrayerSchedule {
    pub fn get(&self, prayer: Prayer) -> &str {
        match prayer {
            Prayer::Fajr    => &self.fajr,
            Prayer::Sunrise => &self.sunrise,
            Prayer::Dhuhr   => &self.dhuhr,
            Prayer::Asr     => &self.asr,
            Prayer::Maghrib => &self.maghrib,
            Prayer::Isha    => &self.isha,
        }
    }

    pub fn set(&mut self, prayer: Prayer, value: impl Into<String>) {
        let slot = match prayer {
            Prayer::Fajr    => &mut self.fajr,
            Prayer::Sunrise => &mut self.sunrise,
            Prayer::Dhuhr   => &mut self.dhuhr,
            Prayer::Asr     => &mut self.asr,
            Prayer::Maghrib => &mut self.maghrib,
            Prayer::Isha    => &mut self.isha,
        };
        *slot = value.into();
    }

    /// Entries in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Prayer, &str)> {
        Prayer::ALL.into_iter().map(move |p| (p, self.get(p)))
    }
}
