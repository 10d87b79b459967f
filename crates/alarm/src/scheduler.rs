use crate::platform::{AlarmPlatform, Precision};
use chrono::{DateTime, Duration, Local, NaiveDateTime, TimeZone};
use prayer_core::{NextEvent, WidgetError, WidgetFamily};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// The single live wake for a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingAlarm {
    pub family:    WidgetFamily,
    pub target:    DateTime<Local>,
    pub precision: Precision,
}

impl PendingAlarm {
    pub fn target_epoch_millis(&self) -> i64 {
        self.target.timestamp_millis()
    }
}

/// Per-family lifecycle: `Idle → Scheduled → Fired → Scheduled → …`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmState {
    Idle,
    Scheduled(PendingAlarm),
    Fired,
}

/// Keeps exactly one highlight wake per family armed for the next prayer.
///
/// Every render re-arms through [`HighlightScheduler::arm`]; a fire leads to
/// a render, so the loop sustains itself without the daily refresh.
pub struct HighlightScheduler {
    platform: Arc<dyn AlarmPlatform>,
    states:   Mutex<HashMap<WidgetFamily, AlarmState>>,
}

impl HighlightScheduler {
    pub fn new(platform: Arc<dyn AlarmPlatform>) -> Self {
        Self {
            platform,
            states: Mutex::new(HashMap::new()),
        }
    }

    pub fn state(&self, family: WidgetFamily) -> AlarmState {
        self.states
            .lock()
            .ok()
            .and_then(|s| s.get(&family).copied())
            .unwrap_or(AlarmState::Idle)
    }

    /// Arm a wake at the next occurrence of `next`.  A malformed time leaves
    /// the current state untouched.
    pub fn arm(
        &self,
        family: WidgetFamily,
        next: &NextEvent,
        now: DateTime<Local>,
    ) -> Option<PendingAlarm> {
        let Some(time) = next.time_of_day() else {
            warn!(family = family.as_str(), time = %next.time, "next prayer has no usable time; highlight wake not armed");
            return None;
        };
        let naive = now.date_naive().and_time(time.to_naive());
        let Some(target) = local(naive) else {
            warn!(family = family.as_str(), %naive, "local time does not exist; highlight wake not armed");
            return None;
        };
        self.arm_at(family, target, now)
    }

    /// Arm a wake at `target`, rolled forward one day if already due.
    pub fn arm_at(
        &self,
        family: WidgetFamily,
        target: DateTime<Local>,
        now: DateTime<Local>,
    ) -> Option<PendingAlarm> {
        let target = roll_forward(target, now);
        let key = family.alarm_key();

        let precision = match self.platform.set_exact(key, target) {
            Ok(()) => Precision::Exact,
            Err(WidgetError::PermissionDenied(reason)) => {
                info!(family = family.as_str(), "exact wake denied ({reason}); using approximate");
                if let Err(e) = self.platform.set_approximate(key, target) {
                    warn!(family = family.as_str(), "approximate wake failed: {e}");
                    return None;
                }
                Precision::Approximate
            }
            Err(e) => {
                warn!(family = family.as_str(), "cannot arm highlight wake: {e}");
                return None;
            }
        };

        let pending = PendingAlarm { family, target, precision };
        self.set_state(family, AlarmState::Scheduled(pending));
        debug!(family = family.as_str(), %target, ?precision, "highlight wake scheduled");
        Some(pending)
    }

    /// Record that the family's wake went off.  The caller re-renders, which
    /// re-arms.
    pub fn on_fired(&self, family: WidgetFamily) {
        self.set_state(family, AlarmState::Fired);
        debug!(family = family.as_str(), "highlight wake fired");
    }

    fn set_state(&self, family: WidgetFamily, state: AlarmState) {
        match self.states.lock() {
            Ok(mut states) => {
                states.insert(family, state);
            }
            Err(_) => warn!("alarm state lock poisoned"),
        }
    }
}

/// Move a target that is not in the future forward by exactly one day.
pub fn roll_forward(target: DateTime<Local>, now: DateTime<Local>) -> DateTime<Local> {
    if target <= now {
        target + Duration::days(1)
    } else {
        target
    }
}

fn local(naive: NaiveDateTime) -> Option<DateTime<Local>> {
    Local.from_local_datetime(&naive).earliest()
}

#[cfg(test)]
mod tests {
    use super::*;
    use prayer_core::{Prayer, Result};

    #[derive(Default)]
    struct FakePlatform {
        deny_exact: bool,
        timers:     Mutex<HashMap<String, (DateTime<Local>, Precision)>>,
    }

    impl FakePlatform {
        fn record(&self, key: &str, at: DateTime<Local>, precision: Precision) -> Result<()> {
            self.timers.lock().unwrap().insert(key.to_string(), (at, precision));
            Ok(())
        }
    }

    impl AlarmPlatform for FakePlatform {
        fn set_exact(&self, key: &str, at: DateTime<Local>) -> Result<()> {
            if self.deny_exact {
                return Err(WidgetError::PermissionDenied("policy".into()));
            }
            self.record(key, at, Precision::Exact)
        }

        fn set_approximate(&self, key: &str, at: DateTime<Local>) -> Result<()> {
            self.record(key, at, Precision::Approximate)
        }
    }

    fn at(h: u32, m: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 10, h, m, 0).earliest().unwrap()
    }

    fn event(prayer: Prayer, time: &str) -> NextEvent {
        NextEvent { prayer, time: time.into() }
    }

    #[test]
    fn starts_idle() {
        let scheduler = HighlightScheduler::new(Arc::new(FakePlatform::default()));
        assert_eq!(scheduler.state(WidgetFamily::Vertical), AlarmState::Idle);
    }

    #[test]
    fn arms_for_later_today() {
        let platform = Arc::new(FakePlatform::default());
        let scheduler = HighlightScheduler::new(platform.clone());

        let pending = scheduler
            .arm(WidgetFamily::Vertical, &event(Prayer::Asr, "15:45"), at(13, 0))
            .unwrap();
        assert_eq!(pending.target, at(15, 45));
        assert_eq!(pending.precision, Precision::Exact);
        assert_eq!(scheduler.state(WidgetFamily::Vertical), AlarmState::Scheduled(pending));
    }

    #[test]
    fn arming_twice_keeps_one_pending_target() {
        let platform = Arc::new(FakePlatform::default());
        let scheduler = HighlightScheduler::new(platform.clone());

        scheduler.arm(WidgetFamily::Horizontal, &event(Prayer::Asr, "15:45"), at(13, 0));
        scheduler.arm(WidgetFamily::Horizontal, &event(Prayer::Maghrib, "17:30"), at(16, 0));

        let timers = platform.timers.lock().unwrap();
        assert_eq!(timers.len(), 1);
        assert_eq!(timers[WidgetFamily::Horizontal.alarm_key()].0, at(17, 30));
    }

    #[test]
    fn past_due_target_rolls_forward_one_day() {
        let scheduler = HighlightScheduler::new(Arc::new(FakePlatform::default()));
        let now = at(20, 0);

        let pending = scheduler.arm_at(WidgetFamily::Vertical, at(19, 0), now).unwrap();
        assert_eq!(pending.target, at(19, 0) + Duration::days(1));
        assert_eq!(pending.target_epoch_millis() - at(19, 0).timestamp_millis(), 86_400_000);
    }

    #[test]
    fn wrapped_fajr_is_armed_for_tomorrow() {
        let scheduler = HighlightScheduler::new(Arc::new(FakePlatform::default()));
        let pending = scheduler
            .arm(WidgetFamily::Vertical, &event(Prayer::Fajr, "05:45"), at(20, 0))
            .unwrap();
        assert_eq!(pending.target, at(5, 45) + Duration::days(1));
    }

    #[test]
    fn denied_exact_falls_back_to_approximate() {
        let platform = Arc::new(FakePlatform { deny_exact: true, ..Default::default() });
        let scheduler = HighlightScheduler::new(platform.clone());

        let pending = scheduler.arm_at(WidgetFamily::Vertical, at(15, 0), at(14, 0)).unwrap();
        assert_eq!(pending.precision, Precision::Approximate);
        assert_eq!(pending.target, at(15, 0));
    }

    #[test]
    fn fire_then_rearm_cycle() {
        let scheduler = HighlightScheduler::new(Arc::new(FakePlatform::default()));
        let family = WidgetFamily::Vertical;

        scheduler.arm(family, &event(Prayer::Asr, "15:45"), at(13, 0));
        scheduler.on_fired(family);
        assert_eq!(scheduler.state(family), AlarmState::Fired);

        let pending = scheduler.arm(family, &event(Prayer::Maghrib, "17:30"), at(15, 45)).unwrap();
        assert_eq!(scheduler.state(family), AlarmState::Scheduled(pending));
    }

    #[test]
    fn placeholder_time_is_not_armed() {
        let platform = Arc::new(FakePlatform::default());
        let scheduler = HighlightScheduler::new(platform.clone());

        assert!(scheduler
            .arm(WidgetFamily::Vertical, &event(Prayer::Fajr, prayer_core::UNKNOWN_TIME), at(9, 0))
            .is_none());
        assert!(platform.timers.lock().unwrap().is_empty());
        assert_eq!(scheduler.state(WidgetFamily::Vertical), AlarmState::Idle);
    }
}
