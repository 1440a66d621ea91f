//! Thunderstorm animation (stateful - extends rain).

use rand::Rng;
use stratus_core::Size;

use super::rain::{self, Downpour, RainDrop};
use crate::color::{Paint, rgba};
use crate::surface::{Shape, Surface};

/// Denser, faster rain than [`rain::RAIN`].
pub const STORM_RAIN: Downpour = Downpour {
    count: 80,
    length: (15.0, 35.0),
    speed: (8.0, 12.0),
    stroke: 1.5,
    paint: rgba(174, 194, 224, 0.7),
};

/// Frames that must pass after a flash before the next one may fire.
pub const FLASH_COOLDOWN_FRAMES: u32 = 100;

/// A flash fires when the per-frame draw exceeds this value.
pub const FLASH_THRESHOLD: f64 = 0.97;

const FLASH_PAINT: Paint = rgba(255, 255, 255, 0.3);

/// State for a thunderstorm.
#[derive(Debug, Clone)]
pub struct StormState {
    /// Rain streaks (reuses rain logic).
    pub drops: Vec<RainDrop>,
    /// Frames since the last lightning flash.
    pub frames_since_flash: u32,
}

impl StormState {
    pub fn new<R: Rng + ?Sized>(size: Size, rng: &mut R) -> Self {
        Self {
            drops: rain::init_drops(&STORM_RAIN, size, rng),
            frames_since_flash: 0,
        }
    }

    /// Draw one frame. Returns `true` if lightning flashed.
    pub fn redraw<R: Rng + ?Sized>(&mut self, surface: &mut Surface, rng: &mut R) -> bool {
        surface.clear();
        rain::draw_drops(&self.drops, &STORM_RAIN, surface);
        rain::fall(&mut self.drops, surface.size(), rng);

        // Cooldown plus a per-frame coin flip gives irregular flash spacing.
        self.frames_since_flash += 1;
        if self.frames_since_flash > FLASH_COOLDOWN_FRAMES
            && rng.gen_range(0.0..1.0) > FLASH_THRESHOLD
        {
            surface.draw(Shape::Wash { paint: FLASH_PAINT });
            self.frames_since_flash = 0;
            return true;
        }
        false
    }
}
