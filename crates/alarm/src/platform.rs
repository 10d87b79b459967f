use chrono::{DateTime, Local};
use prayer_core::{Message, Result, WidgetError, WidgetFamily};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// How strictly the platform honours the wake time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    Exact,
    Approximate,
}

/// Platform wake-timer service.
///
/// Setting a timer under a key that already has one pending replaces it.
pub trait AlarmPlatform: Send + Sync {
    /// Precise wake; may be refused with [`WidgetError::PermissionDenied`].
    fn set_exact(&self, key: &str, at: DateTime<Local>) -> Result<()>;
    /// Best-effort wake, always permitted.
    fn set_approximate(&self, key: &str, at: DateTime<Local>) -> Result<()>;
}

/// In-process timers on the tokio runtime.  A fired timer posts
/// [`Message::AlarmFired`] for the family owning the key.
pub struct TokioAlarms {
    allow_exact: AtomicBool,
    tx:          mpsc::Sender<Message>,
    pending:     Mutex<HashMap<String, JoinHandle<()>>>,
}

impl TokioAlarms {
    pub fn new(tx: mpsc::Sender<Message>, allow_exact: bool) -> Self {
        Self {
            allow_exact: AtomicBool::new(allow_exact),
            tx,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Change the precise-wake policy (e.g. after a settings reload).
    pub fn set_allow_exact(&self, allow: bool) {
        self.allow_exact.store(allow, Ordering::Relaxed);
    }

    /// Number of timers that have not fired yet.
    pub fn pending_count(&self) -> usize {
        self.pending
            .lock()
            .map(|p| p.values().filter(|h| !h.is_finished()).count())
            .unwrap_or(0)
    }

    fn arm(&self, key: &str, at: DateTime<Local>) -> Result<()> {
        let family = WidgetFamily::from_alarm_key(key)
            .ok_or_else(|| WidgetError::Alarm(format!("unknown alarm key '{key}'")))?;
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| WidgetError::Alarm(format!("no timer runtime: {e}")))?;

        let delay = (at - Local::now()).to_std().unwrap_or_default();
        let tx = self.tx.clone();
        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(Message::AlarmFired(family)).await;
        });

        let mut pending = self
            .pending
            .lock()
            .map_err(|_| WidgetError::Alarm("alarm table lock poisoned".into()))?;
        if let Some(previous) = pending.insert(key.to_string(), handle) {
            previous.abort();
        }
        debug!(key, ?delay, "wake armed");
        Ok(())
    }
}

impl AlarmPlatform for TokioAlarms {
    fn set_exact(&self, key: &str, at: DateTime<Local>) -> Result<()> {
        if !self.allow_exact.load(Ordering::Relaxed) {
            return Err(WidgetError::PermissionDenied("exact alarms are not allowed".into()));
        }
        self.arm(key, at)
    }

    fn set_approximate(&self, key: &str, at: DateTime<Local>) -> Result<()> {
        self.arm(key, at)
    }
}

impl Drop for TokioAlarms {
    fn drop(&mut self) {
        if let Ok(pending) = self.pending.get_mut() {
            for (_, handle) in pending.drain() {
                handle.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::time::Duration as StdDuration;

    #[tokio::test(start_paused = true)]
    async fn rearming_replaces_pending_timer() {
        let (tx, mut rx) = mpsc::channel(4);
        let alarms = TokioAlarms::new(tx, true);
        let key = WidgetFamily::Vertical.alarm_key();

        alarms.set_exact(key, Local::now() + Duration::seconds(60)).unwrap();
        alarms.set_exact(key, Local::now() + Duration::seconds(120)).unwrap();
        assert_eq!(alarms.pending_count(), 1);

        assert_eq!(rx.recv().await, Some(Message::AlarmFired(WidgetFamily::Vertical)));
        tokio::time::sleep(StdDuration::from_secs(600)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn exact_refused_when_not_allowed() {
        let (tx, _rx) = mpsc::channel(1);
        let alarms = TokioAlarms::new(tx, false);
        let key = WidgetFamily::Horizontal.alarm_key();

        let err = alarms.set_exact(key, Local::now()).unwrap_err();
        assert!(matches!(err, WidgetError::PermissionDenied(_)));
        alarms.set_approximate(key, Local::now()).unwrap();
    }

    #[tokio::test]
    async fn families_have_independent_timers() {
        let (tx, _rx) = mpsc::channel(4);
        let alarms = TokioAlarms::new(tx, true);
        let later = Local::now() + Duration::seconds(3600);
        for family in WidgetFamily::ALL {
            alarms.set_exact(family.alarm_key(), later).unwrap();
        }
        assert_eq!(alarms.pending_count(), 2);
    }

    #[tokio::test]
    async fn unknown_key_is_rejected() {
        let (tx, _rx) = mpsc::channel(1);
        let alarms = TokioAlarms::new(tx, true);
        assert!(matches!(
            alarms.set_approximate("nope", Local::now()),
            Err(WidgetError::Alarm(_))
        ));
    }
}
