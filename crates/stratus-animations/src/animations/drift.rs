//! Gentle bouncing motes, drawn when no other routine matches.

use rand::Rng;
use stratus_core::{Size, TimeOfDay};

use super::uniform;
use crate::color::{Paint, rgba};
use crate::surface::{Shape, Surface};

const MOTE_COUNT: usize = 20;

/// Mote color for the time of day.
pub fn mote_paint(time_of_day: TimeOfDay) -> Paint {
    match time_of_day {
        TimeOfDay::Day => rgba(255, 255, 255, 0.3),
        TimeOfDay::Night => rgba(200, 200, 255, 0.3),
    }
}

/// A single floating particle.
#[derive(Debug, Clone, PartialEq)]
pub struct Mote {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub vx: f64,
    pub vy: f64,
}

/// Default routine state.
#[derive(Debug, Clone)]
pub struct DriftState {
    pub motes: Vec<Mote>,
    pub time_of_day: TimeOfDay,
}

impl DriftState {
    pub fn new<R: Rng + ?Sized>(size: Size, time_of_day: TimeOfDay, rng: &mut R) -> Self {
        let motes = (0..MOTE_COUNT)
            .map(|_| Mote {
                x: uniform(rng, 0.0, size.width),
                y: uniform(rng, 0.0, size.height),
                radius: uniform(rng, 1.0, 3.0),
                vx: uniform(rng, -0.25, 0.25),
                vy: uniform(rng, -0.25, 0.25),
            })
            .collect();
        Self { motes, time_of_day }
    }

    pub fn redraw(&mut self, surface: &mut Surface) {
        surface.clear();
        let paint = mote_paint(self.time_of_day);
        for mote in &self.motes {
            surface.draw(Shape::Disc {
                x: mote.x,
                y: mote.y,
                radius: mote.radius,
                paint,
            });
        }

        let Size { width, height } = surface.size();
        for mote in &mut self.motes {
            mote.x += mote.vx;
            mote.y += mote.vy;

            if mote.x < 0.0 || mote.x > width {
                mote.vx = -mote.vx;
            }
            if mote.y < 0.0 || mote.y > height {
                mote.vy = -mote.vy;
            }
        }
    }
}
