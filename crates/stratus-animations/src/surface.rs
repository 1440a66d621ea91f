//! Drawing surfaces owned by card animations.
//!
//! A surface is a retained display list in card pixel coordinates (origin at
//! the top-left, y growing downwards). Routines clear it and push shapes every
//! frame; the view rasterises whatever the list holds when it paints.

use stratus_core::{Size, SurfaceId};

use crate::color::Paint;

/// A primitive drawn onto a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Straight stroke.
    Segment {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        stroke: f64,
        paint: Paint,
    },
    /// Filled circle.
    Disc {
        x: f64,
        y: f64,
        radius: f64,
        paint: Paint,
    },
    /// Rectangle filled with a horizontal gradient that is transparent at
    /// `fade_from` and `fade_to` and fully `paint` halfway between them.
    Band {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fade_from: f64,
        fade_to: f64,
        paint: Paint,
    },
    /// Radial gradient ring, `paint` at `inner` fading out at `outer`.
    Glow {
        x: f64,
        y: f64,
        inner: f64,
        outer: f64,
        paint: Paint,
    },
    /// Translucent fill over the whole surface.
    Wash { paint: Paint },
}

impl Shape {
    /// Opacity of a band at horizontal position `x`.
    ///
    /// Returns `None` for shapes that are not bands.
    pub fn band_alpha_at(&self, x: f64) -> Option<f32> {
        let Shape::Band {
            fade_from,
            fade_to,
            paint,
            ..
        } = *self
        else {
            return None;
        };
        let span = fade_to - fade_from;
        if span <= 0.0 {
            return Some(0.0);
        }
        let t = ((x - fade_from) / span).clamp(0.0, 1.0);
        let weight = 1.0 - (t - 0.5).abs() * 2.0;
        Some(paint.alpha * weight as f32)
    }
}

/// An overlay region sized to a card.
#[derive(Debug, Clone)]
pub struct Surface {
    id: SurfaceId,
    size: Size,
    shapes: Vec<Shape>,
}

impl Surface {
    pub fn new(id: SurfaceId, size: Size) -> Self {
        Self {
            id,
            size,
            shapes: Vec::new(),
        }
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn width(&self) -> f64 {
        self.size.width
    }

    /// Erase everything drawn so far.
    pub fn clear(&mut self) {
        self.shapes.clear();
    }

    /// Queue a shape. Surfaces without area ignore draw calls.
    pub fn draw(&mut self, shape: Shape) {
        if self.size.is_empty() {
            return;
        }
        self.shapes.push(shape);
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }
}
