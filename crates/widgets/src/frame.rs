use chrono::{DateTime, Local};
use prayer_core::{CacheRecord, NextEvent, Prayer, TimeOfDay, WidgetFamily, UNKNOWN_TIME};
use prayer_theme::{Color, Palette, Slot, WidgetTheme};
use serde::Serialize;

/// One prayer line of the widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameRow {
    pub prayer:      Prayer,
    pub label:       &'static str,
    /// `HH:MM`, or [`UNKNOWN_TIME`] when the stored value is unreadable.
    pub time:        String,
    pub highlighted: bool,
    pub text:        Color,
    pub background:  Color,
}

/// Everything the home-screen host needs to draw one family.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetFrame {
    pub family:      WidgetFamily,
    pub layout_key:  &'static str,
    pub location:    String,
    pub source:      String,
    pub date_key:    String,
    pub rows:        Vec<FrameRow>,
    pub next:        NextEvent,
    pub dark_mode:   bool,
    pub palette:     Palette,
    /// No record was found in either tier.
    pub placeholder: bool,
    pub rendered_at: DateTime<Local>,
}

impl WidgetFrame {
    pub fn build(
        family: WidgetFamily,
        record: &CacheRecord,
        theme: &WidgetTheme,
        next: &NextEvent,
        placeholder: bool,
        now: DateTime<Local>,
    ) -> Self {
        let palette = theme.palette;
        let rows = record
            .schedule
            .iter()
            .map(|(prayer, raw)| {
                let highlighted = !placeholder && prayer == next.prayer;
                let (text, background) = if highlighted {
                    (palette.get(Slot::HighlightText), palette.get(Slot::AccentContainer))
                } else {
                    (palette.get(Slot::TextPrimary), palette.get(Slot::Surface))
                };
                FrameRow {
                    prayer,
                    label: prayer.label(),
                    time: display_time(raw),
                    highlighted,
                    text,
                    background,
                }
            })
            .collect();

        Self {
            family,
            layout_key: family.layout_key(),
            location: record.location.clone(),
            source: record.source_label.clone(),
            date_key: record.cache_date_key.clone(),
            rows,
            next: next.clone(),
            dark_mode: theme.dark_mode,
            palette,
            placeholder,
            rendered_at: now,
        }
    }

    pub fn highlighted(&self) -> Option<&FrameRow> {
        self.rows.iter().find(|r| r.highlighted)
    }
}

fn display_time(raw: &str) -> String {
    match TimeOfDay::parse(raw) {
        Some(t) => format!("{:02}:{:02}", t.hour, t.minute),
        None => UNKNOWN_TIME.to_string(),
    }
}
