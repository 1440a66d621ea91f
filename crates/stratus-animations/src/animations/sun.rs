//! Rotating sun animation.

use std::f64::consts::TAU;

use stratus_core::{Size, SunTier};

use crate::color::{Paint, rgba};
use crate::surface::{Shape, Surface};

const SUN_RADIUS: f64 = 25.0;
const RAY_COUNT: usize = 12;
/// Rays start this far outside the disc.
const RAY_GAP: f64 = 5.0;
const RAY_LENGTH: f64 = 10.0;
const RAY_STROKE: f64 = 2.0;
/// Radians per frame.
const ROTATION_STEP: f64 = 0.005;

/// Sun color for a temperature tier.
pub fn sun_paint(tier: SunTier) -> Paint {
    match tier {
        SunTier::Warm => rgba(255, 140, 0, 0.7),
        SunTier::Pale => rgba(255, 235, 150, 0.5),
        SunTier::Gold => rgba(255, 215, 0, 0.6),
    }
}

/// Sun routine state.
#[derive(Debug, Clone)]
pub struct SunState {
    pub center: (f64, f64),
    /// Current angle of the ray fan.
    pub rotation: f64,
    pub tier: SunTier,
}

impl SunState {
    pub fn new(size: Size, temp_c: f64) -> Self {
        Self {
            center: (size.width * 0.8, size.height * 0.3),
            rotation: 0.0,
            tier: SunTier::from_temperature(temp_c),
        }
    }

    pub fn redraw(&mut self, surface: &mut Surface) {
        surface.clear();
        let paint = sun_paint(self.tier);
        let (cx, cy) = self.center;

        for i in 0..RAY_COUNT {
            let angle = self.rotation + TAU * i as f64 / RAY_COUNT as f64;
            let (sin, cos) = angle.sin_cos();
            let inner = SUN_RADIUS + RAY_GAP;
            let outer = inner + RAY_LENGTH;
            surface.draw(Shape::Segment {
                x1: cx + inner * cos,
                y1: cy + inner * sin,
                x2: cx + outer * cos,
                y2: cy + outer * sin,
                stroke: RAY_STROKE,
                paint,
            });
        }

        surface.draw(Shape::Disc {
            x: cx,
            y: cy,
            radius: SUN_RADIUS,
            paint,
        });

        self.rotation += ROTATION_STEP;
    }
}
