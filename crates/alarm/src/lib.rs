//! Self-rescheduling wake timers that move the "next prayer" highlight.

pub mod platform;
pub mod scheduler;

pub use platform::{AlarmPlatform, Precision, TokioAlarms};
pub use scheduler::{roll_forward, AlarmState, HighlightScheduler, PendingAlarm};
