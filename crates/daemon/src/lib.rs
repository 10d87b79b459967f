//! Widget host process.
//!
//! Owns the event loop and wires together all background tasks:
//! - Intent socket (refresh button, "cache updated" from the main app)
//! - Highlight wake timers (one per widget family)
//! - Refresh task runner (signal app → wait for fallback tier → copy)
//! - Daily refresh timer and periodic redraw tick
//! - Settings file watcher (live reload) and fallback tier watcher

use chrono::{DateTime, Duration as ChronoDuration, Local, TimeZone};
use prayer_alarm::{roll_forward, HighlightScheduler, TokioAlarms};
use prayer_config::{default_path, load as load_config, FileWatcher, WidgetConfig};
use prayer_core::{
    Clock, Message, RenderReason, Result, SystemClock, TimeOfDay, TriggerSource, WidgetFamily,
};
use prayer_ipc::{Intent, IntentListener, SocketSignal};
use prayer_refresh::{RefreshOrchestrator, RetryPolicy, TaskRunner};
use prayer_store::{CacheStore, FileStore};
use prayer_widgets::{JsonSurface, Renderer};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Event bus capacity.
const BUS_CAPACITY: usize = 64;

// ── Entry point ───────────────────────────────────────────────────────────────

/// Start the widget host.  Returns after Ctrl-C.
pub fn run() -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run_async(default_path()))
}

async fn run_async(config_path: PathBuf) -> Result<()> {
    let config = load_config(&config_path).unwrap_or_else(|e| {
        warn!("{e}; using defaults");
        WidgetConfig::default()
    });
    std::fs::create_dir_all(&config.store.fallback_dir)?;

    let (tx, mut rx) = mpsc::channel(BUS_CAPACITY);
    let mut daemon = Daemon::new(config_path, config, tx.clone(), Arc::new(SystemClock));

    // ── Background sources ───────────────────────────────────────────────────
    let (_listener, intents) = IntentListener::bind(&daemon.config.ipc.widget_socket)?;
    tokio::spawn(forward_intents(intents, tx.clone()));

    let (_config_watch, config_changes) = FileWatcher::spawn(&daemon.config_path);
    tokio::spawn(forward_config_changes(config_changes, tx.clone()));

    let (_fallback_watch, mut fallback_changes) = FileWatcher::spawn(&daemon.config.store.fallback_dir);
    let notifier = daemon.fallback_notifier.clone();
    tokio::spawn(async move {
        while fallback_changes.recv().await.is_some() {
            notifier.notify_one();
        }
    });

    tokio::spawn(daily_refresh(daemon.config.refresh.daily_time(), tx.clone()));
    tokio::spawn(periodic_render(daemon.config.render.periodic_secs, tx.clone()));

    // ── Boot recovery ────────────────────────────────────────────────────────
    for family in WidgetFamily::ALL {
        daemon.handle(Message::Render { family, reason: RenderReason::Startup });
        daemon.handle(Message::Refresh { trigger: TriggerSource::Boot, family });
    }

    // ── Event loop ───────────────────────────────────────────────────────────
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            msg = rx.recv() => match msg {
                Some(msg) => daemon.handle(msg),
                None => break,
            },
            _ = &mut shutdown => {
                info!("interrupt received");
                break;
            }
        }
    }

    info!("prayer-widget stopping");
    Ok(())
}

// ── State ─────────────────────────────────────────────────────────────────────

struct Daemon {
    config_path:       PathBuf,
    config:            WidgetConfig,
    renderer:          Renderer,
    alarms:            Arc<HighlightScheduler>,
    platform:          Arc<TokioAlarms>,
    runner:            TaskRunner,
    fallback_notifier: Arc<tokio::sync::Notify>,
}

impl Daemon {
    fn new(
        config_path: PathBuf,
        config: WidgetConfig,
        tx: mpsc::Sender<Message>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let store = CacheStore::new(
            Arc::new(FileStore::new(&config.store.fast_dir)),
            Arc::new(FileStore::new(&config.store.fallback_dir)),
        );

        let platform = Arc::new(TokioAlarms::new(tx.clone(), config.alarms.allow_exact));
        let alarms = Arc::new(HighlightScheduler::new(platform.clone()));

        let renderer = Renderer::new(
            store.clone(),
            alarms.clone(),
            Arc::new(JsonSurface::new(&config.render.frame_dir)),
            clock,
        );
        renderer.set_theme_mode(config.appearance.theme_mode);

        let orchestrator = RefreshOrchestrator::new(
            store,
            Arc::new(SocketSignal::new(&config.ipc.app_socket)),
            config.refresh.wait(),
            config.refresh.poll_interval(),
        );
        let fallback_notifier = orchestrator.fallback_notifier();
        let runner = TaskRunner::new(Arc::new(orchestrator), retry_policy(&config), tx);

        Self {
            config_path,
            config,
            renderer,
            alarms,
            platform,
            runner,
            fallback_notifier,
        }
    }

    /// Process one bus message.
    fn handle(&mut self, message: Message) {
        match message {
            Message::Render { family, reason } => {
                debug!(family = family.as_str(), ?reason, "render requested");
                self.renderer.render(family);
            }
            Message::AlarmFired(family) => {
                self.alarms.on_fired(family);
                self.renderer.render(family);
            }
            Message::Refresh { trigger, family } => {
                self.runner.enqueue(trigger, family);
            }
            Message::ConfigReloaded => self.reload_config(),
        }
    }

    fn reload_config(&mut self) {
        let config = match load_config(&self.config_path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Config reload failed, keeping previous settings: {e}");
                return;
            }
        };
        info!("Config reloaded");

        self.renderer.set_theme_mode(config.appearance.theme_mode);
        self.platform.set_allow_exact(config.alarms.allow_exact);
        if config.refresh.wait_secs != self.config.refresh.wait_secs
            || config.store.fast_dir != self.config.store.fast_dir
        {
            warn!("store and refresh settings take effect after restart");
        }
        self.config = config;

        for family in WidgetFamily::ALL {
            self.renderer.render(family);
            debug!(family = family.as_str(), reason = ?RenderReason::SettingsChanged, "re-rendered");
        }
    }
}

fn retry_policy(config: &WidgetConfig) -> RetryPolicy {
    RetryPolicy {
        max_attempts:    config.refresh.max_attempts,
        initial_backoff: Duration::from_secs(config.refresh.initial_backoff_secs),
        max_backoff:     Duration::from_secs(config.refresh.max_backoff_secs),
    }
}

// ── Background tasks ──────────────────────────────────────────────────────────

/// Map an incoming intent to bus messages.
fn intent_messages(intent: &Intent) -> Vec<Message> {
    match intent {
        Intent::RefreshButton(family) => vec![Message::Refresh {
            trigger: TriggerSource::Manual,
            family:  *family,
        }],
        Intent::WidgetCacheUpdated => WidgetFamily::ALL
            .into_iter()
            .map(|family| Message::Refresh { trigger: TriggerSource::AppWake, family })
            .collect(),
        // Addressed to the main application, not to us.
        Intent::RefreshWidgetCache(_) | Intent::Unknown(_) => Vec::new(),
    }
}

async fn forward_intents(mut intents: mpsc::Receiver<Intent>, tx: mpsc::Sender<Message>) {
    while let Some(intent) = intents.recv().await {
        for message in intent_messages(&intent) {
            if tx.send(message).await.is_err() {
                return;
            }
        }
    }
}

async fn forward_config_changes(mut changes: mpsc::Receiver<()>, tx: mpsc::Sender<Message>) {
    while changes.recv().await.is_some() {
        if tx.send(Message::ConfigReloaded).await.is_err() {
            return;
        }
    }
}

/// Next local instant at `time` strictly after `now`.
fn next_daily(now: DateTime<Local>, time: TimeOfDay) -> DateTime<Local> {
    let naive = now.date_naive().and_time(time.to_naive());
    match Local.from_local_datetime(&naive).earliest() {
        Some(today) => roll_forward(today, now),
        None => now + ChronoDuration::days(1),
    }
}

async fn daily_refresh(at: TimeOfDay, tx: mpsc::Sender<Message>) {
    loop {
        let now = Local::now();
        let next = next_daily(now, at);
        let delay = (next - now).to_std().unwrap_or(Duration::from_secs(60));
        debug!(%next, "daily refresh scheduled");
        tokio::time::sleep(delay).await;

        for family in WidgetFamily::ALL {
            let refresh = Message::Refresh { trigger: TriggerSource::Daily, family };
            if tx.send(refresh).await.is_err() {
                return;
            }
        }
    }
}

async fn periodic_render(every_secs: u64, tx: mpsc::Sender<Message>) {
    let mut ticker = tokio::time::interval(Duration::from_secs(every_secs.max(60)));
    ticker.tick().await; // first tick is immediate; startup already rendered

    loop {
        ticker.tick().await;
        for family in WidgetFamily::ALL {
            let render = Message::Render { family, reason: RenderReason::Periodic };
            if tx.send(render).await.is_err() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prayer_alarm::AlarmState;
    use prayer_core::record::field;
    use prayer_store::{KvStore, FALLBACK_KEY};
    use std::path::Path;

    fn at(h: u32, m: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 10, h, m, 0).earliest().unwrap()
    }

    struct FixedClock(DateTime<Local>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Local> {
            self.0
        }
    }

    fn config(dir: &Path) -> WidgetConfig {
        let mut config = WidgetConfig::default();
        config.store.fast_dir = dir.join("fast");
        config.store.fallback_dir = dir.join("fallback");
        config.ipc.app_socket = dir.join("app.sock");
        config.ipc.widget_socket = dir.join("widget.sock");
        config.render.frame_dir = dir.join("frames");
        config
    }

    fn daemon(dir: &Path, now: DateTime<Local>) -> (Daemon, mpsc::Receiver<Message>) {
        let (tx, rx) = mpsc::channel(BUS_CAPACITY);
        let daemon = Daemon::new(dir.join("widget.toml"), config(dir), tx, Arc::new(FixedClock(now)));
        (daemon, rx)
    }

    fn publish(dir: &Path, timestamp: i64) {
        let doc = format!(
            r#"{{"fajr":"05:45","sunrise":"07:15","dhuhr":"12:30","asr":"15:45",
                "maghrib":"17:30","isha":"19:00","cacheTimestampMs":{timestamp}}}"#
        );
        FileStore::new(dir.join("fallback")).put(FALLBACK_KEY, &doc).unwrap();
    }

    fn scheduled_target(daemon: &Daemon, family: WidgetFamily) -> DateTime<Local> {
        match daemon.alarms.state(family) {
            AlarmState::Scheduled(pending) => pending.target,
            other => panic!("expected a scheduled wake, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fired_alarm_rearms_for_following_prayer() {
        let dir = tempfile::tempdir().unwrap();
        publish(dir.path(), 1);
        let (mut daemon, _rx) = daemon(dir.path(), at(15, 45));

        daemon.handle(Message::AlarmFired(WidgetFamily::Vertical));

        assert_eq!(scheduled_target(&daemon, WidgetFamily::Vertical), at(17, 30));
        assert_eq!(daemon.alarms.state(WidgetFamily::Horizontal), AlarmState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn successful_refresh_renders_and_rearms() {
        let dir = tempfile::tempdir().unwrap();
        publish(dir.path(), 5);
        let (mut daemon, mut rx) = daemon(dir.path(), at(13, 0));

        daemon.handle(Message::Refresh {
            trigger: TriggerSource::AppWake,
            family:  WidgetFamily::Horizontal,
        });
        let render = rx.recv().await.unwrap();
        assert_eq!(
            render,
            Message::Render { family: WidgetFamily::Horizontal, reason: RenderReason::Refreshed }
        );
        assert_eq!(
            FileStore::new(dir.path().join("fast")).get(field::CACHE_TIMESTAMP).unwrap().as_deref(),
            Some("5")
        );

        daemon.handle(render);
        assert_eq!(scheduled_target(&daemon, WidgetFamily::Horizontal), at(15, 45));
        assert!(dir.path().join("frames").join(format!("{}.json", WidgetFamily::Horizontal.layout_key())).exists());
    }

    #[test]
    fn daily_refresh_later_today() {
        let time = TimeOfDay { hour: 23, minute: 0 };
        assert_eq!(next_daily(at(22, 0), time), at(23, 0));
    }

    #[test]
    fn daily_refresh_rolls_to_tomorrow() {
        let time = TimeOfDay { hour: 0, minute: 5 };
        assert_eq!(next_daily(at(0, 5), time), at(0, 5) + ChronoDuration::days(1));
    }

    #[test]
    fn button_press_is_manual_refresh() {
        assert_eq!(
            intent_messages(&Intent::RefreshButton(WidgetFamily::Horizontal)),
            vec![Message::Refresh {
                trigger: TriggerSource::Manual,
                family:  WidgetFamily::Horizontal,
            }]
        );
    }

    #[test]
    fn app_update_wakes_every_family() {
        let messages = intent_messages(&Intent::WidgetCacheUpdated);
        assert_eq!(messages.len(), WidgetFamily::ALL.len());
        assert!(messages
            .iter()
            .all(|m| matches!(m, Message::Refresh { trigger: TriggerSource::AppWake, .. })));
    }

    #[test]
    fn outbound_intents_are_ignored() {
        assert!(intent_messages(&Intent::RefreshWidgetCache(WidgetFamily::Vertical)).is_empty());
        assert!(intent_messages(&Intent::Unknown("x".into())).is_empty());
    }
}
