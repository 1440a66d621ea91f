//! Color utilities for card animations.

use ratatui::style::Color;

/// A translucent RGB color, flattened onto a backdrop when rasterised.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Opacity in 0.0-1.0.
    pub alpha: f32,
}

/// Shorthand constructor mirroring CSS `rgba()`.
pub const fn rgba(r: u8, g: u8, b: u8, alpha: f32) -> Paint {
    Paint { r, g, b, alpha }
}

impl Paint {
    /// Scale the opacity by `factor` (clamped to 0.0-1.0).
    pub fn fade(self, factor: f32) -> Self {
        Self {
            alpha: self.alpha * factor.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Composite this paint over an opaque backdrop.
    ///
    /// Non-RGB backdrops are treated as black.
    pub fn over(self, backdrop: Color) -> Color {
        let (br, bg, bb) = match backdrop {
            Color::Rgb(r, g, b) => (r, g, b),
            _ => (0, 0, 0),
        };
        let a = self.alpha.clamp(0.0, 1.0);
        let mix = |fg: u8, bg: u8| (fg as f32 * a + bg as f32 * (1.0 - a)).round() as u8;
        Color::Rgb(mix(self.r, br), mix(self.g, bg), mix(self.b, bb))
    }
}

/// Convert HSL to RGB color.
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> Color {
    if s == 0.0 {
        let v = (l * 255.0) as u8;
        return Color::Rgb(v, v, v);
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;

    let h = h / 360.0;

    let r = hue_to_rgb(p, q, h + 1.0 / 3.0);
    let g = hue_to_rgb(p, q, h);
    let b = hue_to_rgb(p, q, h - 1.0 / 3.0);

    Color::Rgb((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8)
}

fn hue_to_rgb(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }

    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}
