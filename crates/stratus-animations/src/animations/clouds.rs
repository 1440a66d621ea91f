//! Drifting cloud animation (stateful).

use rand::Rng;
use stratus_core::{Size, TimeOfDay};

use super::uniform;
use crate::color::{Paint, rgba};
use crate::surface::{Shape, Surface};

const CLOUD_COUNT: usize = 3;

/// Clouds only form in the upper part of the card.
const CLOUD_BAND: f64 = 0.4;

/// Cloud color for the time of day.
pub fn cloud_paint(time_of_day: TimeOfDay) -> Paint {
    match time_of_day {
        TimeOfDay::Day => rgba(255, 255, 255, 0.4),
        TimeOfDay::Night => rgba(200, 200, 200, 0.3),
    }
}

/// A three-lobed cloud.
#[derive(Debug, Clone, PartialEq)]
pub struct Cloud {
    /// Center of the left lobe.
    pub x: f64,
    pub y: f64,
    pub width: f64,
    /// Pixels per frame to the right.
    pub speed: f64,
}

impl Cloud {
    fn lobes(&self) -> [(f64, f64, f64); 3] {
        let w = self.width;
        [
            (self.x, self.y, w / 3.0),
            (self.x + w / 4.0, self.y - w / 6.0, w / 4.0),
            (self.x + w / 2.0, self.y, w / 3.0),
        ]
    }
}

/// Cloud routine state.
#[derive(Debug, Clone)]
pub struct CloudState {
    pub clouds: Vec<Cloud>,
    pub time_of_day: TimeOfDay,
}

impl CloudState {
    pub fn new<R: Rng + ?Sized>(size: Size, time_of_day: TimeOfDay, rng: &mut R) -> Self {
        let clouds = (0..CLOUD_COUNT)
            .map(|_| Cloud {
                x: uniform(rng, 0.0, size.width),
                y: uniform(rng, 0.0, size.height * CLOUD_BAND),
                width: uniform(rng, 40.0, 100.0),
                speed: uniform(rng, 0.1, 0.3),
            })
            .collect();
        Self {
            clouds,
            time_of_day,
        }
    }

    pub fn paint(&self) -> Paint {
        cloud_paint(self.time_of_day)
    }

    pub fn redraw(&mut self, surface: &mut Surface) {
        surface.clear();
        let paint = self.paint();
        for cloud in &self.clouds {
            for (x, y, radius) in cloud.lobes() {
                surface.draw(Shape::Disc { x, y, radius, paint });
            }
        }

        let width = surface.width();
        for cloud in &mut self.clouds {
            cloud.x += cloud.speed;
            if cloud.x > width + cloud.width {
                cloud.x = -cloud.width;
            }
        }
    }
}
