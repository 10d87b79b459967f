use prayer_core::{DedupePolicy, TriggerSource, WidgetFamily};
use std::time::Duration;

/// One unit of refresh work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTask {
    pub key:     String,
    pub trigger: TriggerSource,
    pub family:  WidgetFamily,
    pub policy:  DedupePolicy,
}

impl RefreshTask {
    pub fn new(trigger: TriggerSource, family: WidgetFamily) -> Self {
        Self {
            key: family.task_key(trigger),
            trigger,
            family,
            policy: trigger.dedupe_policy(),
        }
    }
}

/// Finite retry budget with capped exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts:    u32,
    pub initial_backoff: Duration,
    pub max_backoff:     Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts:    5,
            initial_backoff: Duration::from_secs(30),
            max_backoff:     Duration::from_secs(600),
        }
    }
}

impl RetryPolicy {
    /// Delay after failed attempt number `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.initial_backoff
            .saturating_mul(1 << exponent)
            .min(self.max_backoff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_carries_trigger_policy() {
        let task = RefreshTask::new(TriggerSource::Manual, WidgetFamily::Horizontal);
        assert_eq!(task.key, "manual_refresh_horizontal");
        assert_eq!(task.policy, DedupePolicy::ReplaceExisting);
    }

    #[test]
    fn backoff_doubles_then_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(1), Duration::from_secs(30));
        assert_eq!(policy.backoff(2), Duration::from_secs(60));
        assert_eq!(policy.backoff(4), Duration::from_secs(240));
        assert_eq!(policy.backoff(6), Duration::from_secs(600));
        assert_eq!(policy.backoff(100), Duration::from_secs(600));
    }
}
