//! Rain animation (stateful).

use rand::Rng;
use stratus_core::Size;

use super::uniform;
use crate::color::{Paint, rgba};
use crate::surface::{Shape, Surface};

/// Parameters of a falling-streak shower.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Downpour {
    /// Number of drops.
    pub count: usize,
    /// Streak length range in pixels.
    pub length: (f64, f64),
    /// Fall speed range in pixels per frame.
    pub speed: (f64, f64),
    pub stroke: f64,
    pub paint: Paint,
}

/// Ordinary rain.
pub const RAIN: Downpour = Downpour {
    count: 50,
    length: (10.0, 25.0),
    speed: (5.0, 8.0),
    stroke: 1.0,
    paint: rgba(174, 194, 224, 0.6),
};

/// State for a single raindrop.
#[derive(Debug, Clone, PartialEq)]
pub struct RainDrop {
    /// Horizontal position.
    pub x: f64,
    /// Top of the streak.
    pub y: f64,
    /// Streak length.
    pub length: f64,
    /// Pixels fallen per frame.
    pub speed: f64,
}

/// Scatter drops over the whole surface.
pub fn init_drops<R: Rng + ?Sized>(shower: &Downpour, size: Size, rng: &mut R) -> Vec<RainDrop> {
    (0..shower.count)
        .map(|_| RainDrop {
            x: uniform(rng, 0.0, size.width),
            y: uniform(rng, 0.0, size.height),
            length: uniform(rng, shower.length.0, shower.length.1),
            speed: uniform(rng, shower.speed.0, shower.speed.1),
        })
        .collect()
}

/// Advance drops one frame, recycling those that left the bottom edge.
pub fn fall<R: Rng + ?Sized>(drops: &mut [RainDrop], size: Size, rng: &mut R) {
    for drop in drops {
        drop.y += drop.speed;
        if drop.y > size.height {
            drop.y = -drop.length;
            drop.x = uniform(rng, 0.0, size.width);
        }
    }
}

/// Draw every drop as a vertical streak.
pub fn draw_drops(drops: &[RainDrop], shower: &Downpour, surface: &mut Surface) {
    for drop in drops {
        surface.draw(Shape::Segment {
            x1: drop.x,
            y1: drop.y,
            x2: drop.x,
            y2: drop.y + drop.length,
            stroke: shower.stroke,
            paint: shower.paint,
        });
    }
}

/// Rain routine state.
#[derive(Debug, Clone)]
pub struct RainState {
    pub drops: Vec<RainDrop>,
}

impl RainState {
    pub fn new<R: Rng + ?Sized>(size: Size, rng: &mut R) -> Self {
        Self {
            drops: init_drops(&RAIN, size, rng),
        }
    }

    pub fn redraw<R: Rng + ?Sized>(&mut self, surface: &mut Surface, rng: &mut R) {
        surface.clear();
        draw_drops(&self.drops, &RAIN, surface);
        fall(&mut self.drops, surface.size(), rng);
    }
}
