use crate::colors::Color;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Named colour roles of the widget surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Root background; the only slot that carries the user's opacity.
    Background,
    Surface,
    SurfaceAlt,
    Accent,
    /// Row background behind the upcoming prayer.
    AccentContainer,
    Divider,
    Icon,
    TextPrimary,
    TextSecondary,
    TextMuted,
    TextOnAccent,
    /// Text of the upcoming prayer row.
    HighlightText,
    HeaderText,
}

pub const SLOT_COUNT: usize = 13;

impl Slot {
    pub const ALL: [Slot; SLOT_COUNT] = [
        Slot::Background,
        Slot::Surface,
        Slot::SurfaceAlt,
        Slot::Accent,
        Slot::AccentContainer,
        Slot::Divider,
        Slot::Icon,
        Slot::TextPrimary,
        Slot::TextSecondary,
        Slot::TextMuted,
        Slot::TextOnAccent,
        Slot::HighlightText,
        Slot::HeaderText,
    ];

    pub const TEXT: [Slot; 6] = [
        Slot::TextPrimary,
        Slot::TextSecondary,
        Slot::TextMuted,
        Slot::TextOnAccent,
        Slot::HighlightText,
        Slot::HeaderText,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Slot::Background      => "background",
            Slot::Surface         => "surface",
            Slot::SurfaceAlt      => "surfaceAlt",
            Slot::Accent          => "accent",
            Slot::AccentContainer => "accentContainer",
            Slot::Divider         => "divider",
            Slot::Icon            => "icon",
            Slot::TextPrimary     => "textPrimary",
            Slot::TextSecondary   => "textSecondary",
            Slot::TextMuted       => "textMuted",
            Slot::TextOnAccent    => "textOnAccent",
            Slot::HighlightText   => "highlightText",
            Slot::HeaderText      => "headerText",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Saturation / value pair for one slot; the hue always comes from the caller.
#[derive(Debug, Clone, Copy)]
struct Tone {
    saturation: f32,
    value:      f32,
}

const fn tone(saturation: f32, value: f32) -> Tone {
    Tone { saturation, value }
}

/// Light-mode tones, indexed like [`Slot::ALL`].
const LIGHT: [Tone; SLOT_COUNT] = [
    tone(0.06, 0.98), // background
    tone(0.10, 0.95), // surface
    tone(0.14, 0.91), // surfaceAlt
    tone(0.65, 0.70), // accent
    tone(0.25, 0.92), // accentContainer
    tone(0.12, 0.80), // divider
    tone(0.55, 0.55), // icon
    tone(0.35, 0.15), // textPrimary
    tone(0.25, 0.35), // textSecondary
    tone(0.12, 0.50), // textMuted
    tone(0.03, 1.00), // textOnAccent
    tone(0.80, 0.30), // highlightText
    tone(0.60, 0.40), // headerText
];

/// Dark-mode tones, indexed like [`Slot::ALL`].
const DARK: [Tone; SLOT_COUNT] = [
    tone(0.30, 0.12), // background
    tone(0.28, 0.17), // surface
    tone(0.25, 0.22), // surfaceAlt
    tone(0.45, 0.85), // accent
    tone(0.55, 0.35), // accentContainer
    tone(0.20, 0.30), // divider
    tone(0.35, 0.80), // icon
    tone(0.05, 0.95), // textPrimary
    tone(0.10, 0.80), // textSecondary
    tone(0.10, 0.62), // textMuted
    tone(0.70, 0.12), // textOnAccent
    tone(0.20, 0.98), // highlightText
    tone(0.30, 0.88), // headerText
];

/// Fully resolved colours for one render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Palette {
    colors: [Color; SLOT_COUNT],
}

impl Palette {
    pub fn get(&self, slot: Slot) -> Color {
        self.colors[slot.index()]
    }

    /// Apply the record's background opacity to the root background only.
    #[must_use]
    pub fn with_background_opacity(mut self, opacity: f64) -> Self {
        let opacity = if opacity > 0.0 { opacity.min(1.0) } else { 1.0 };
        let idx = Slot::Background.index();
        self.colors[idx] = self.colors[idx].with_alpha(opacity as f32);
        self
    }
}

impl Serialize for Palette {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(SLOT_COUNT))?;
        for slot in Slot::ALL {
            map.serialize_entry(slot.name(), &self.get(slot))?;
        }
        map.end()
    }
}

/// Derive the palette for `hue` (degrees) in light or dark mode.
///
/// Deterministic: equal inputs give byte-identical palettes, every slot at
/// full alpha.
pub fn palette(hue: f64, dark_mode: bool) -> Palette {
    let table = if dark_mode { &DARK } else { &LIGHT };
    let hue = if hue.is_finite() { hue.rem_euclid(360.0) as f32 } else { 0.0 };

    let mut colors = [Color::TRANSPARENT; SLOT_COUNT];
    for (color, tone) in colors.iter_mut().zip(table.iter()) {
        *color = Color::from_hsv(hue, tone.saturation, tone.value);
    }
    Palette { colors }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_order_matches_indices() {
        for (i, slot) in Slot::ALL.iter().enumerate() {
            assert_eq!(slot.index(), i);
        }
    }

    #[test]
    fn deterministic() {
        assert_eq!(palette(200.0, false), palette(200.0, false));
        assert_eq!(palette(200.0, true), palette(200.0, true));
    }

    #[test]
    fn modes_differ_in_every_text_slot() {
        for hue in (0..360).step_by(15) {
            let light = palette(f64::from(hue), false);
            let dark = palette(f64::from(hue), true);
            for slot in Slot::TEXT {
                assert_ne!(light.get(slot), dark.get(slot), "hue {hue} slot {}", slot.name());
            }
        }
    }

    #[test]
    fn every_slot_is_opaque() {
        let p = palette(33.0, true);
        assert!(Slot::ALL.iter().all(|s| p.get(*s).a == 255));
    }

    #[test]
    fn opacity_touches_background_only() {
        let base = palette(120.0, false);
        let faded = base.with_background_opacity(0.5);
        assert_eq!(faded.get(Slot::Background).a, 128);
        for slot in Slot::ALL.into_iter().filter(|s| *s != Slot::Background) {
            assert_eq!(faded.get(slot), base.get(slot));
        }
        let bg = faded.get(Slot::Background);
        let orig = base.get(Slot::Background);
        assert_eq!((bg.r, bg.g, bg.b), (orig.r, orig.g, orig.b));
    }

    #[test]
    fn non_positive_opacity_is_opaque() {
        let p = palette(10.0, false).with_background_opacity(0.0);
        assert_eq!(p.get(Slot::Background).a, 255);
    }

    #[test]
    fn hue_wraps() {
        assert_eq!(palette(370.0, false), palette(10.0, false));
    }
}
