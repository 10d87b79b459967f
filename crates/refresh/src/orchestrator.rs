use crate::task::RefreshTask;
use prayer_core::{AppSignal, CacheRecord, TriggerSource};
use prayer_store::CacheStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{debug, info, warn};

/// Result of one refresh attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// A newer record was copied into the fast tier.
    Updated(CacheRecord),
    /// The fast tier already holds the published record or a newer one.
    Current,
    /// The main application did not publish in time; try again later.
    Retry,
}

/// Bridges the widget process and the main application for one attempt:
/// signal, wait (bounded) for a newer fallback record, normalise it into the
/// fast tier.
///
/// An app-wake task skips the signal: the app sends that wake after it has
/// published, and signalling back would start another fetch.
pub struct RefreshOrchestrator {
    store:            CacheStore,
    signal:           Arc<dyn AppSignal>,
    wait:             Duration,
    poll_interval:    Duration,
    fallback_changed: Arc<Notify>,
}

impl RefreshOrchestrator {
    pub fn new(
        store: CacheStore,
        signal: Arc<dyn AppSignal>,
        wait: Duration,
        poll_interval: Duration,
    ) -> Self {
        Self {
            store,
            signal,
            wait,
            poll_interval,
            fallback_changed: Arc::new(Notify::new()),
        }
    }

    /// Handle to wake a waiting attempt as soon as the fallback tier changes.
    /// Polling at `poll_interval` still runs without it.
    pub fn fallback_notifier(&self) -> Arc<Notify> {
        Arc::clone(&self.fallback_changed)
    }

    pub async fn run_once(&self, task: &RefreshTask) -> RefreshOutcome {
        let baseline = self.baseline(task);

        if task.trigger == TriggerSource::AppWake {
            debug!(task = %task.key, "record announced by main application");
        } else if let Err(e) = self.signal.request_refresh(task.family) {
            // The app may still publish on its own schedule; keep waiting.
            warn!(task = %task.key, "cannot signal main application: {e}");
        }

        let record = match tokio::time::timeout(self.wait, self.newer_fallback(baseline)).await {
            Ok(record) => record,
            Err(_) => {
                info!(task = %task.key, wait = ?self.wait, "no fresh record from main application");
                return RefreshOutcome::Retry;
            }
        };

        match self.store.write(&record) {
            Ok(true) => {
                info!(task = %task.key, timestamp = record.cache_timestamp, "widget cache refreshed");
                RefreshOutcome::Updated(record)
            }
            Ok(false) => {
                info!(task = %task.key, timestamp = record.cache_timestamp, "widget cache already current");
                RefreshOutcome::Current
            }
            Err(e) => {
                warn!(task = %task.key, "cannot update fast tier: {e}");
                RefreshOutcome::Retry
            }
        }
    }

    /// Timestamp a fallback record must exceed to be taken.
    ///
    /// A button press also requires it to be newer than whatever the
    /// fallback tier already holds, so only a fetch started after the press
    /// satisfies it.  An app wake takes whatever was announced; the store
    /// refuses it if the fast tier is already newer.
    fn baseline(&self, task: &RefreshTask) -> i64 {
        match task.trigger {
            TriggerSource::AppWake => i64::MIN,
            TriggerSource::Daily | TriggerSource::Boot => self.store.fast_timestamp(),
            TriggerSource::Manual => {
                let fallback = self.store.read_fallback().map_or(0, |r| r.cache_timestamp);
                self.store.fast_timestamp().max(fallback)
            }
        }
    }

    async fn newer_fallback(&self, baseline: i64) -> CacheRecord {
        loop {
            let changed = self.fallback_changed.notified();
            tokio::pin!(changed);
            changed.as_mut().enable();

            if let Some(record) = self.store.read_fallback() {
                if record.cache_timestamp > baseline {
                    return record;
                }
            }
            debug!(baseline, "fallback tier not updated yet");

            tokio::select! {
                _ = &mut changed => {}
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }
    }
}
