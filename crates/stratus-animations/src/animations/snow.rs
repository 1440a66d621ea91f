//! Snowfall animation (stateful).

use rand::Rng;
use stratus_core::Size;

use super::uniform;
use crate::color::{Paint, rgba};
use crate::surface::{Shape, Surface};

const FLAKE_COUNT: usize = 30;
const FLAKE_PAINT: Paint = rgba(255, 255, 255, 0.8);

/// State for a single snowflake.
#[derive(Debug, Clone, PartialEq)]
pub struct Flake {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    /// Pixels fallen per frame.
    pub speed: f64,
    /// Horizontal pixels per frame, either direction.
    pub drift: f64,
}

/// Snow routine state.
#[derive(Debug, Clone)]
pub struct SnowState {
    pub flakes: Vec<Flake>,
}

impl SnowState {
    pub fn new<R: Rng + ?Sized>(size: Size, rng: &mut R) -> Self {
        let flakes = (0..FLAKE_COUNT)
            .map(|_| Flake {
                x: uniform(rng, 0.0, size.width),
                y: uniform(rng, 0.0, size.height),
                radius: uniform(rng, 1.0, 3.0),
                speed: uniform(rng, 0.5, 1.0),
                drift: uniform(rng, -0.25, 0.25),
            })
            .collect();
        Self { flakes }
    }

    pub fn redraw<R: Rng + ?Sized>(&mut self, surface: &mut Surface, rng: &mut R) {
        surface.clear();
        for flake in &self.flakes {
            surface.draw(Shape::Disc {
                x: flake.x,
                y: flake.y,
                radius: flake.radius,
                paint: FLAKE_PAINT,
            });
        }
        self.update(surface.size(), rng);
    }

    fn update<R: Rng + ?Sized>(&mut self, size: Size, rng: &mut R) {
        for flake in &mut self.flakes {
            flake.y += flake.speed;
            flake.x += flake.drift;

            if flake.y > size.height {
                flake.y = -flake.radius;
                flake.x = uniform(rng, 0.0, size.width);
            }
            // Wrap horizontally across both edges
            if flake.x > size.width {
                flake.x = 0.0;
            }
            if flake.x < 0.0 {
                flake.x = size.width;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animations::testing::{CARD, rng, surface};

    #[test]
    fn test_initial_flakes_within_ranges() {
        let state = SnowState::new(CARD, &mut rng());
        assert_eq!(state.flakes.len(), 30);
        for flake in &state.flakes {
            assert!((1.0..3.0).contains(&flake.radius));
            assert!((0.5..1.0).contains(&flake.speed));
            assert!((-0.25..0.25).contains(&flake.drift));
        }
    }

    #[test]
    fn test_flakes_stay_in_bounds_while_wrapping() {
        let mut rng = rng();
        let mut state = SnowState::new(CARD, &mut rng);
        let mut surface = surface(CARD);
        let mut wrapped = false;
        // Slowest flake needs height / 0.5 frames to reach the bottom.
        for _ in 0..300 {
            let before: Vec<f64> = state.flakes.iter().map(|f| f.y).collect();
            state.redraw(&mut surface, &mut rng);
            for (flake, y) in state.flakes.iter().zip(before) {
                if flake.y < y {
                    wrapped = true;
                    assert_eq!(flake.y, -flake.radius);
                }
                assert!(flake.x >= 0.0 && flake.x <= CARD.width);
                assert!(flake.y >= -flake.radius && flake.y <= CARD.height);
            }
        }
        assert!(wrapped);
    }

    #[test]
    fn test_horizontal_wrap() {
        let mut rng = rng();
        let mut state = SnowState {
            flakes: vec![
                Flake {
                    x: CARD.width - 0.1,
                    y: 10.0,
                    radius: 2.0,
                    speed: 0.5,
                    drift: 0.25,
                },
                Flake {
                    x: 0.1,
                    y: 10.0,
                    radius: 2.0,
                    speed: 0.5,
                    drift: -0.25,
                },
            ],
        };
        state.update(CARD, &mut rng);
        assert_eq!(state.flakes[0].x, 0.0);
        assert_eq!(state.flakes[1].x, CARD.width);
    }
}
