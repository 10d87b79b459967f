/// Best-effort probe of the desktop's light/dark appearance.
///
/// `PRAYER_WIDGET_APPEARANCE=dark|light` wins; otherwise a `GTK_THEME`
/// ending in `:dark` (or naming a dark variant) counts as dark.
pub fn system_prefers_dark() -> bool {
    prefers_dark_from(
        std::env::var("PRAYER_WIDGET_APPEARANCE").ok().as_deref(),
        std::env::var("GTK_THEME").ok().as_deref(),
    )
}

fn prefers_dark_from(explicit: Option<&str>, gtk_theme: Option<&str>) -> bool {
    match explicit.map(|s| s.trim().to_ascii_lowercase()) {
        Some(v) if v == "dark"  => return true,
        Some(v) if v == "light" => return false,
        _ => {}
    }
    gtk_theme
        .map(|t| t.to_ascii_lowercase())
        .is_some_and(|t| t.ends_with(":dark") || t.contains("-dark"))
}
