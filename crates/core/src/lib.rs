pub mod clock;
pub mod error;
pub mod event;
pub mod family;
pub mod next_event;
pub mod record;
pub mod schedule;
pub mod signal;

pub use clock::{Clock, SystemClock};
pub use error::{Result, WidgetError};
pub use event::{Message, RenderReason};
pub use family::{DedupePolicy, TriggerSource, WidgetFamily};
pub use next_event::{select_next, NextEvent};
pub use record::{CacheRecord, ThemeMode};
pub use schedule::{Prayer, PrayerSchedule, TimeOfDay, UNKNOWN_TIME};
pub use signal::AppSignal;
