use crate::orchestrator::{RefreshOrchestrator, RefreshOutcome};
use crate::task::{RefreshTask, RetryPolicy};
use prayer_core::{DedupePolicy, Message, RenderReason, TriggerSource, WidgetFamily};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// What happened to an enqueue request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// No task was pending under the key; a new one started.
    Enqueued,
    /// A pending task under the key absorbed the request.
    Absorbed,
    /// The pending task was cancelled and superseded.
    Replaced,
}

struct Pending {
    id:     u64,
    handle: JoinHandle<()>,
}

type PendingMap = Arc<Mutex<HashMap<String, Pending>>>;

/// Keyed work queue for refresh tasks.
///
/// At most one task runs per key.  Each task retries with backoff until it
/// succeeds or the attempt budget is spent; success posts a
/// [`Message::Render`] so the family is redrawn and its highlight re-armed.
pub struct TaskRunner {
    orchestrator: Arc<RefreshOrchestrator>,
    policy:       RetryPolicy,
    tx:           mpsc::Sender<Message>,
    pending:      PendingMap,
    next_id:      AtomicU64,
}

impl TaskRunner {
    pub fn new(
        orchestrator: Arc<RefreshOrchestrator>,
        policy: RetryPolicy,
        tx: mpsc::Sender<Message>,
    ) -> Self {
        Self {
            orchestrator,
            policy,
            tx,
            pending: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn enqueue(&self, trigger: TriggerSource, family: WidgetFamily) -> EnqueueOutcome {
        let task = RefreshTask::new(trigger, family);
        let Ok(mut pending) = self.pending.lock() else {
            error!("refresh queue lock poisoned; dropping {}", task.key);
            return EnqueueOutcome::Absorbed;
        };

        let mut outcome = EnqueueOutcome::Enqueued;
        if let Some(existing) = pending.get(&task.key) {
            if !existing.handle.is_finished() {
                match task.policy {
                    DedupePolicy::KeepExisting => {
                        info!(task = %task.key, "refresh already pending");
                        return EnqueueOutcome::Absorbed;
                    }
                    DedupePolicy::ReplaceExisting => {
                        existing.handle.abort();
                        outcome = EnqueueOutcome::Replaced;
                    }
                }
            }
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let key = task.key.clone();
        let handle = tokio::spawn(execute(
            Arc::clone(&self.orchestrator),
            self.policy,
            self.tx.clone(),
            Arc::clone(&self.pending),
            id,
            task,
        ));
        pending.insert(key.clone(), Pending { id, handle });
        info!(task = %key, ?outcome, "refresh queued");
        outcome
    }

    /// Number of tasks still running or waiting to retry.
    pub fn pending_count(&self) -> usize {
        self.pending
            .lock()
            .map(|p| p.values().filter(|t| !t.handle.is_finished()).count())
            .unwrap_or(0)
    }
}

impl Drop for TaskRunner {
    fn drop(&mut self) {
        if let Ok(pending) = self.pending.lock() {
            for task in pending.values() {
                task.handle.abort();
            }
        }
    }
}

async fn execute(
    orchestrator: Arc<RefreshOrchestrator>,
    policy: RetryPolicy,
    tx: mpsc::Sender<Message>,
    pending: PendingMap,
    id: u64,
    task: RefreshTask,
) {
    let attempts = policy.max_attempts.max(1);
    for attempt in 1..=attempts {
        match orchestrator.run_once(&task).await {
            RefreshOutcome::Updated(_) | RefreshOutcome::Current => {
                let render = Message::Render {
                    family: task.family,
                    reason: RenderReason::Refreshed,
                };
                if tx.send(render).await.is_err() {
                    warn!(task = %task.key, "event bus closed; render not requested");
                }
                break;
            }
            RefreshOutcome::Retry if attempt < attempts => {
                let delay = policy.backoff(attempt);
                warn!(task = %task.key, attempt, ?delay, "refresh attempt failed; retrying");
                tokio::time::sleep(delay).await;
            }
            RefreshOutcome::Retry => {
                error!(task = %task.key, attempts, "refresh gave up; widget keeps its cached data");
            }
        }
    }

    if let Ok(mut pending) = pending.lock() {
        if pending.get(&task.key).is_some_and(|p| p.id == id) {
            pending.remove(&task.key);
        }
    }
}
