use crate::frame::WidgetFrame;
use crate::surface::Surface;
use prayer_alarm::HighlightScheduler;
use prayer_core::{select_next, CacheRecord, Clock, ThemeMode, WidgetFamily};
use prayer_store::CacheStore;
use prayer_theme::WidgetTheme;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, warn};

/// Render path shared by both widget families.
///
/// Each render reads the cache, derives colours and the next prayer, draws,
/// and arms the family's highlight wake.  Renders of one family are
/// serialised; different families may run concurrently.
pub struct Renderer {
    store:       CacheStore,
    alarms:      Arc<HighlightScheduler>,
    surface:     Arc<dyn Surface>,
    clock:       Arc<dyn Clock>,
    theme_mode:  RwLock<Option<ThemeMode>>,
    system_dark: fn() -> bool,
    in_flight:   HashMap<WidgetFamily, Mutex<()>>,
}

impl Renderer {
    pub fn new(
        store: CacheStore,
        alarms: Arc<HighlightScheduler>,
        surface: Arc<dyn Surface>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            alarms,
            surface,
            clock,
            theme_mode: RwLock::new(None),
            system_dark: prayer_theme::system_prefers_dark,
            in_flight: WidgetFamily::ALL.into_iter().map(|f| (f, Mutex::new(()))).collect(),
        }
    }

    /// Replace the platform appearance probe.
    pub fn with_appearance_probe(mut self, probe: fn() -> bool) -> Self {
        self.system_dark = probe;
        self
    }

    /// Apply the theme-mode setting; picked up by the next render.
    pub fn set_theme_mode(&self, mode: Option<ThemeMode>) {
        if let Ok(mut current) = self.theme_mode.write() {
            *current = mode;
        }
    }

    /// Redraw `family`.  Never fails: missing or damaged data renders as a
    /// placeholder and drawing errors are logged.
    pub fn render(&self, family: WidgetFamily) -> WidgetFrame {
        let _guard = self.in_flight.get(&family).and_then(|m| m.lock().ok());

        let now = self.clock.now();
        let (record, placeholder) = match self.store.read() {
            Some(record) => (record, false),
            None => {
                debug!(family = family.as_str(), "no cached record; rendering placeholder");
                (CacheRecord::default(), true)
            }
        };

        let mode = self.theme_mode.read().map(|m| *m).unwrap_or(None);
        let system_dark = matches!(mode, Some(ThemeMode::System)) && (self.system_dark)();
        let theme = WidgetTheme::from_record(&record, mode, system_dark);
        let next = select_next(&record.schedule, now.time());

        let frame = WidgetFrame::build(family, &record, &theme, &next, placeholder, now);
        if let Err(e) = self.surface.draw(&frame) {
            warn!(family = family.as_str(), "cannot publish frame: {e}");
        }

        self.alarms.arm(family, &next, now);
        debug!(family = family.as_str(), next = next.prayer.label(), time = %next.time, "rendered");
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Local, TimeZone};
    use prayer_alarm::{AlarmPlatform, AlarmState};
    use prayer_core::{Prayer, Result, UNKNOWN_TIME};
    use prayer_store::{KvStore, MemoryStore, FALLBACK_KEY};
    use prayer_theme::Slot;

    struct FixedClock(DateTime<Local>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Local> {
            self.0
        }
    }

    #[derive(Default)]
    struct NullPlatform;

    impl AlarmPlatform for NullPlatform {
        fn set_exact(&self, _key: &str, _at: DateTime<Local>) -> Result<()> {
            Ok(())
        }
        fn set_approximate(&self, _key: &str, _at: DateTime<Local>) -> Result<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<WidgetFrame>>);

    impl Surface for Recorder {
        fn draw(&self, frame: &WidgetFrame) -> Result<()> {
            self.0.lock().unwrap().push(frame.clone());
            Ok(())
        }
    }

    fn at(h: u32, m: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 10, h, m, 0).earliest().unwrap()
    }

    const FALLBACK: &str = r#"{
        "fajr": "05:45", "sunrise": "07:15", "dhuhr": "12:30",
        "asr": "15:45", "maghrib": "17:30", "isha": "19:00",
        "location": "Leeds", "hue": 200, "isDarkMode": false,
        "bgTransparency": 0.5, "cacheTimestampMs": 1
    }"#;

    struct Harness {
        renderer: Renderer,
        alarms:   Arc<HighlightScheduler>,
        surface:  Arc<Recorder>,
        fallback: Arc<MemoryStore>,
    }

    fn harness(now: DateTime<Local>) -> Harness {
        let fallback = Arc::new(MemoryStore::new());
        let store = CacheStore::new(Arc::new(MemoryStore::new()), fallback.clone());
        let alarms = Arc::new(HighlightScheduler::new(Arc::new(NullPlatform)));
        let surface = Arc::new(Recorder::default());
        let renderer = Renderer::new(store, alarms.clone(), surface.clone(), Arc::new(FixedClock(now)))
            .with_appearance_probe(|| true);
        Harness { renderer, alarms, surface, fallback }
    }

    #[test]
    fn afternoon_render_highlights_asr_and_arms() {
        let h = harness(at(13, 0));
        h.fallback.put(FALLBACK_KEY, FALLBACK).unwrap();

        let frame = h.renderer.render(WidgetFamily::Vertical);
        assert_eq!(frame.next.prayer, Prayer::Asr);
        assert_eq!(frame.next.time, "15:45");
        assert_eq!(frame.palette.get(Slot::Background).a, 128);
        assert!(!frame.placeholder);
        assert_eq!(h.surface.0.lock().unwrap().len(), 1);

        match h.alarms.state(WidgetFamily::Vertical) {
            AlarmState::Scheduled(p) => assert_eq!(p.target, at(15, 45)),
            other => panic!("unexpected state {other:?}"),
        }
        assert_eq!(h.alarms.state(WidgetFamily::Horizontal), AlarmState::Idle);
    }

    #[test]
    fn evening_render_wraps_to_tomorrows_fajr() {
        let h = harness(at(20, 0));
        h.fallback.put(FALLBACK_KEY, FALLBACK).unwrap();

        let frame = h.renderer.render(WidgetFamily::Horizontal);
        assert_eq!(frame.next.prayer, Prayer::Fajr);
        assert_eq!(frame.next.time, "05:45");
        match h.alarms.state(WidgetFamily::Horizontal) {
            AlarmState::Scheduled(p) => assert_eq!(p.target, at(5, 45) + chrono::Duration::days(1)),
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[test]
    fn empty_cache_renders_placeholder_without_alarm() {
        let h = harness(at(9, 0));
        let frame = h.renderer.render(WidgetFamily::Vertical);
        assert!(frame.placeholder);
        assert_eq!(frame.next.time, UNKNOWN_TIME);
        assert_eq!(h.alarms.state(WidgetFamily::Vertical), AlarmState::Idle);
    }

    #[test]
    fn system_theme_mode_overrides_stored_flag() {
        let h = harness(at(13, 0));
        h.fallback.put(FALLBACK_KEY, FALLBACK).unwrap();

        assert!(!h.renderer.render(WidgetFamily::Vertical).dark_mode);
        h.renderer.set_theme_mode(Some(ThemeMode::System));
        assert!(h.renderer.render(WidgetFamily::Vertical).dark_mode);
        h.renderer.set_theme_mode(Some(ThemeMode::Light));
        assert!(!h.renderer.render(WidgetFamily::Vertical).dark_mode);
    }
}
