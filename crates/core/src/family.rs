use serde::{Deserialize, Serialize};

/// One of the two independent home-screen layouts.
///
/// Every family-specific identifier is derived here so the rest of the
/// workspace handles both layouts through a single code path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetFamily {
    Vertical,
    Horizontal,
}

impl WidgetFamily {
    pub const ALL: [WidgetFamily; 2] = [WidgetFamily::Vertical, WidgetFamily::Horizontal];

    pub fn as_str(self) -> &'static str {
        match self {
            WidgetFamily::Vertical   => "vertical",
            WidgetFamily::Horizontal => "horizontal",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "vertical"   => Some(WidgetFamily::Vertical),
            "horizontal" => Some(WidgetFamily::Horizontal),
            _ => None,
        }
    }

    /// Fixed identity of this family's pending highlight wake.
    pub fn alarm_key(self) -> &'static str {
        match self {
            WidgetFamily::Vertical   => "highlight_alarm_vertical",
            WidgetFamily::Horizontal => "highlight_alarm_horizontal",
        }
    }

    /// Inverse of [`WidgetFamily::alarm_key`].
    pub fn from_alarm_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.alarm_key() == key)
    }

    /// Name under which rendered frames for this family are published.
    pub fn layout_key(self) -> &'static str {
        match self {
            WidgetFamily::Vertical   => "prayer_widget_vertical",
            WidgetFamily::Horizontal => "prayer_widget_horizontal",
        }
    }

    /// Unique refresh task key for `(trigger, family)`.
    pub fn task_key(self, trigger: TriggerSource) -> String {
        format!("{}_refresh_{}", trigger.as_str(), self.as_str())
    }
}

/// What caused a refresh request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerSource {
    /// Refresh button on the widget.
    Manual,
    /// Once-a-day timer.
    Daily,
    /// Recovery after process/device start.
    Boot,
    /// The main application announced fresh data.
    AppWake,
}

impl TriggerSource {
    pub fn as_str(self) -> &'static str {
        match self {
            TriggerSource::Manual  => "manual",
            TriggerSource::Daily   => "daily",
            TriggerSource::Boot    => "boot",
            TriggerSource::AppWake => "app_wake",
        }
    }

    /// Ambient triggers keep a pending task; explicit ones supersede it.
    pub fn dedupe_policy(self) -> DedupePolicy {
        match self {
            TriggerSource::Daily | TriggerSource::Boot     => DedupePolicy::KeepExisting,
            TriggerSource::Manual | TriggerSource::AppWake => DedupePolicy::ReplaceExisting,
        }
    }
}

/// How a new task interacts with a pending one under the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupePolicy {
    KeepExisting,
    ReplaceExisting,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_keys_are_unique_per_trigger_and_family() {
        let triggers = [
            TriggerSource::Manual,
            TriggerSource::Daily,
            TriggerSource::Boot,
            TriggerSource::AppWake,
        ];
        let mut keys: Vec<String> = triggers
            .iter()
            .flat_map(|t| WidgetFamily::ALL.map(|f| f.task_key(*t)))
            .collect();
        let total = keys.len();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), total);
        assert_eq!(WidgetFamily::Vertical.task_key(TriggerSource::Daily), "daily_refresh_vertical");
    }

    #[test]
    fn alarm_key_round_trips() {
        for family in WidgetFamily::ALL {
            assert_eq!(WidgetFamily::from_alarm_key(family.alarm_key()), Some(family));
        }
        assert_eq!(WidgetFamily::from_alarm_key("other"), None);
    }

    #[test]
    fn explicit_triggers_replace() {
        assert_eq!(TriggerSource::Manual.dedupe_policy(), DedupePolicy::ReplaceExisting);
        assert_eq!(TriggerSource::AppWake.dedupe_policy(), DedupePolicy::ReplaceExisting);
        assert_eq!(TriggerSource::Daily.dedupe_policy(), DedupePolicy::KeepExisting);
        assert_eq!(TriggerSource::Boot.dedupe_policy(), DedupePolicy::KeepExisting);
    }
}
