use crate::schedule::{Prayer, PrayerSchedule, TimeOfDay, UNKNOWN_TIME};
use chrono::{NaiveTime, Timelike};
use serde::Serialize;

/// The upcoming event picked for highlighting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextEvent {
    pub prayer: Prayer,
    /// Raw stored value; may be malformed when the selection wrapped around.
    pub time:   String,
}

impl NextEvent {
    /// Parsed time, if the stored value is well formed.
    pub fn time_of_day(&self) -> Option<TimeOfDay> {
        TimeOfDay::parse(&self.time)
    }
}

/// Pick the entry with the smallest strictly positive minute offset from
/// `now` on the same day.
///
/// Malformed entries are skipped.  When nothing is left today the result
/// wraps to Fajr with whatever is stored for it; when every entry is
/// malformed it is Fajr with [`UNKNOWN_TIME`].  Never fails.
pub fn select_next(schedule: &PrayerSchedule, now: NaiveTime) -> NextEvent {
    let now_minutes = (now.hour() * 60 + now.minute()) as i32;

    let mut any_valid = false;
    let mut best: Option<(i32, Prayer)> = None;

    for (prayer, raw) in schedule.iter() {
        let Some(time) = TimeOfDay::parse(raw) else {
            continue;
        };
        any_valid = true;

        let offset = time.minutes() - now_minutes;
        if offset <= 0 {
            continue;
        }
        if best.map_or(true, |(b, _)| offset < b) {
            best = Some((offset, prayer));
        }
    }

    match best {
        Some((_, prayer)) => NextEvent {
            prayer,
            time: schedule.get(prayer).trim().to_string(),
        },
        None if any_valid => NextEvent {
            prayer: Prayer::Fajr,
            time:   schedule.get(Prayer::Fajr).trim().to_string(),
        },
        None => {
            tracing::warn!("no readable prayer time in schedule; showing placeholder");
            NextEvent {
                prayer: Prayer::Fajr,
                time:   UNKNOWN_TIME.to_string(),
            }
        }
    }
}
