use prayer_core::WidgetFamily;

/// Intents understood by either side of the bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Widget → app: run your fetch cycle and repopulate the fallback tier.
    RefreshWidgetCache(WidgetFamily),
    /// App → widget: the fallback tier was just rewritten.
    WidgetCacheUpdated,
    /// Host → widget: the refresh button was pressed.
    RefreshButton(WidgetFamily),
    /// An intent we don't handle; carries the raw line for debugging.
    Unknown(String),
}

const REFRESH_WIDGET_CACHE: &str = "refresh_widget_cache";
const WIDGET_CACHE_UPDATED: &str = "widget_cache_updated";
const REFRESH_BUTTON: &str = "refresh_button";

/// Parse a raw intent line.
///
/// Intents have the format `name>>payload`; the payload is a widget family
/// where one is needed.
pub fn parse_intent(line: &str) -> Intent {
    let line = line.trim_end_matches(['\r', '\n']);
    let Some((name, data)) = line.split_once(">>") else {
        return Intent::Unknown(line.to_string());
    };

    match name.trim() {
        REFRESH_WIDGET_CACHE => WidgetFamily::parse(data)
            .map_or_else(|| Intent::Unknown(line.to_string()), Intent::RefreshWidgetCache),
        REFRESH_BUTTON => WidgetFamily::parse(data)
            .map_or_else(|| Intent::Unknown(line.to_string()), Intent::RefreshButton),
        WIDGET_CACHE_UPDATED => Intent::WidgetCacheUpdated,
        _ => Intent::Unknown(line.to_string()),
    }
}

/// Encode an intent as a single line, newline included.
pub fn format_intent(intent: &Intent) -> String {
    match intent {
        Intent::RefreshWidgetCache(f) => format!("{REFRESH_WIDGET_CACHE}>>{}\n", f.as_str()),
        Intent::RefreshButton(f)      => format!("{REFRESH_BUTTON}>>{}\n", f.as_str()),
        Intent::WidgetCacheUpdated    => format!("{WIDGET_CACHE_UPDATED}>>\n"),
        Intent::Unknown(raw)          => format!("{raw}\n"),
    }
}
