use serde::{Serialize, Serializer};

/// 8-bit RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Self = Self { r: 0, g: 0, b: 0, a: 0 };

    /// Opaque colour from hue (degrees), saturation and value (`[0, 1]`).
    pub fn from_hsv(hue: f32, saturation: f32, value: f32) -> Self {
        let (r, g, b) = hsv_to_rgb(hue, saturation, value);
        Self {
            r: channel(r),
            g: channel(g),
            b: channel(b),
            a: 255,
        }
    }

    /// `#RRGGBBAA`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }

    /// Return a copy with the alpha channel set from an opacity in `[0, 1]`.
    #[inline]
    #[must_use]
    pub fn with_alpha(mut self, opacity: f32) -> Self {
        self.a = channel(opacity);
        self
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

fn channel(unit: f32) -> u8 {
    if unit.is_nan() {
        return 0;
    }
    (unit.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Standard six-sector HSV → RGB.  Hue wraps; `s` and `v` are clamped.
fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (f32, f32, f32) {
    let s = s.clamp(0.0, 1.0);
    let v = v.clamp(0.0, 1.0);
    let h = if h.is_finite() { h.rem_euclid(360.0) / 60.0 } else { 0.0 };
    let i = h.floor() as i32;
    let f = h - i as f32;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match i.rem_euclid(6) {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b, a: 255 }
    }

    #[test]
    fn primary_hues() {
        assert_eq!(Color::from_hsv(0.0, 1.0, 1.0), rgb(255, 0, 0));
        assert_eq!(Color::from_hsv(120.0, 1.0, 1.0), rgb(0, 255, 0));
        assert_eq!(Color::from_hsv(240.0, 1.0, 1.0), rgb(0, 0, 255));
        assert_eq!(Color::from_hsv(360.0, 1.0, 1.0), Color::from_hsv(0.0, 1.0, 1.0));
    }

    #[test]
    fn zero_saturation_is_grey() {
        assert_eq!(Color::from_hsv(200.0, 0.0, 0.5), rgb(128, 128, 128));
    }

    #[test]
    fn hex_includes_alpha() {
        let c = Color { r: 0x12, g: 0x34, b: 0x56, a: 0x80 };
        assert_eq!(c.to_hex(), "#12345680");
    }

    #[test]
    fn alpha_from_opacity() {
        let white = rgb(255, 255, 255);
        assert_eq!(white.with_alpha(0.0).a, 0);
        assert_eq!(white.with_alpha(0.5).a, 128);
        assert_eq!(white.with_alpha(2.0).a, 255);
        assert_eq!(Color::TRANSPARENT.with_alpha(1.0).r, 0);
    }
}
