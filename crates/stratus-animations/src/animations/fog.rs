//! Sliding fog bands (stateful).

use rand::Rng;
use stratus_core::Size;

use super::uniform;
use crate::color::{Paint, rgba};
use crate::surface::{Shape, Surface};

const LAYER_COUNT: usize = 5;
const FOG_PAINT: Paint = rgba(200, 200, 200, 0.2);

/// One horizontal band of fog.
#[derive(Debug, Clone, PartialEq)]
pub struct FogLayer {
    /// Top edge of the band.
    pub y: f64,
    /// Left edge of the band.
    pub offset: f64,
    /// Pixels per frame to the right.
    pub speed: f64,
}

/// Fog routine state.
#[derive(Debug, Clone)]
pub struct FogState {
    pub layers: Vec<FogLayer>,
}

impl FogState {
    pub fn new<R: Rng + ?Sized>(size: Size, rng: &mut R) -> Self {
        let band = size.height / LAYER_COUNT as f64;
        let layers = (0..LAYER_COUNT)
            .map(|i| FogLayer {
                y: band * i as f64,
                offset: uniform(rng, 0.0, size.width),
                speed: uniform(rng, 0.2, 0.5),
            })
            .collect();
        Self { layers }
    }

    pub fn redraw(&mut self, surface: &mut Surface) {
        surface.clear();
        let Size { width, height } = surface.size();
        let band = height / LAYER_COUNT as f64;

        // The gradient is anchored to the card, so a band fades in and out
        // as it slides across.
        for layer in &self.layers {
            surface.draw(Shape::Band {
                x: layer.offset,
                y: layer.y,
                width,
                height: band,
                fade_from: 0.0,
                fade_to: width,
                paint: FOG_PAINT,
            });
        }

        for layer in &mut self.layers {
            layer.offset += layer.speed;
            if layer.offset > width {
                layer.offset = -width;
            }
        }
    }
}
