//! Moon with a pulsing glow and twinkling stars.

use stratus_core::Size;

use crate::color::{Paint, rgba};
use crate::surface::{Shape, Surface};

const MOON_RADIUS: f64 = 20.0;
const STAR_COUNT: usize = 10;
const PHASE_STEP: f64 = 0.02;
/// Amplitude of the glow pulse in pixels.
const GLOW_PULSE: f64 = 3.0;
/// How far the glow reaches beyond the pulsing radius.
const GLOW_SPREAD: f64 = 10.0;
/// Vertical twinkle amplitude of each star.
const STAR_BOB: f64 = 5.0;

const GLOW_PAINT: Paint = rgba(220, 220, 255, 0.4);
const MOON_PAINT: Paint = rgba(240, 240, 255, 0.6);
const STAR_PAINT: Paint = rgba(255, 255, 255, 0.4);

/// Moon routine state.
#[derive(Debug, Clone)]
pub struct MoonState {
    pub center: (f64, f64),
    pub phase: f64,
}

impl MoonState {
    pub fn new(size: Size) -> Self {
        Self {
            center: (size.width * 0.8, size.height * 0.3),
            phase: 0.0,
        }
    }

    /// Outer radius of the glow at the current phase.
    pub fn glow_radius(&self) -> f64 {
        MOON_RADIUS + self.phase.sin() * GLOW_PULSE + GLOW_SPREAD
    }

    /// Star positions at the current phase.
    ///
    /// Stars sit on the diagonal from the card origin to the moon.
    pub fn stars(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        let (cx, cy) = self.center;
        (0..STAR_COUNT).map(move |i| {
            let i = i as f64;
            (
                cx / STAR_COUNT as f64 * i,
                cy / STAR_COUNT as f64 * i + (self.phase + i).sin() * STAR_BOB,
            )
        })
    }

    pub fn redraw(&mut self, surface: &mut Surface) {
        surface.clear();
        let (cx, cy) = self.center;

        surface.draw(Shape::Glow {
            x: cx,
            y: cy,
            inner: MOON_RADIUS,
            outer: self.glow_radius(),
            paint: GLOW_PAINT,
        });
        surface.draw(Shape::Disc {
            x: cx,
            y: cy,
            radius: MOON_RADIUS,
            paint: MOON_PAINT,
        });
        for (x, y) in self.stars() {
            surface.draw(Shape::Disc {
                x,
                y,
                radius: 1.0,
                paint: STAR_PAINT,
            });
        }

        self.phase += PHASE_STEP;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animations::testing::{CARD, surface};

    #[test]
    fn test_moon_layers() {
        let mut state = MoonState::new(CARD);
        let mut surface = surface(CARD);
        state.redraw(&mut surface);
        let shapes = surface.shapes();
        assert_eq!(shapes.len(), 2 + STAR_COUNT);
        assert!(matches!(shapes[0], Shape::Glow { .. }));
        assert!(matches!(shapes[1], Shape::Disc { radius, .. } if radius == MOON_RADIUS));
    }

    #[test]
    fn test_glow_pulses_with_phase() {
        let mut state = MoonState::new(CARD);
        assert_eq!(state.glow_radius(), MOON_RADIUS + GLOW_SPREAD);
        state.phase = std::f64::consts::FRAC_PI_2;
        assert!((state.glow_radius() - (MOON_RADIUS + GLOW_PULSE + GLOW_SPREAD)).abs() < 1e-9);
    }

    #[test]
    fn test_stars_bob_vertically_only() {
        let mut state = MoonState::new(CARD);
        let before: Vec<_> = state.stars().collect();
        let mut surface = surface(CARD);
        for _ in 0..10 {
            state.redraw(&mut surface);
        }
        let after: Vec<_> = state.stars().collect();
        for ((x0, y0), (x1, y1)) in before.into_iter().zip(after) {
            assert_eq!(x0, x1);
            assert!((y0 - y1).abs() <= 2.0 * STAR_BOB);
        }
        assert!((state.phase - 0.2).abs() < 1e-9);
    }
}
