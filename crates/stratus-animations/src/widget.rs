//! Rasterising surfaces into the terminal.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    symbols::Marker,
    widgets::{
        Widget,
        canvas::{Canvas, Circle, Context, Line, Points},
    },
};

use crate::color::Paint;
use crate::surface::{Shape, Surface};

/// Spacing of sample points when filling areas, in surface pixels.
const FILL_STEP: f64 = 2.0;

/// Vertical spacing of the scanlines used for bands.
const BAND_SCANLINE: f64 = 4.0;

/// Horizontal strips a band's gradient is split into.
const BAND_STRIPS: usize = 12;

/// Paints a [`Surface`] into a card's area.
///
/// Translucent paints are flattened onto `backdrop`, the card's background.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceView<'a> {
    surface: &'a Surface,
    backdrop: Color,
}

impl<'a> SurfaceView<'a> {
    pub fn new(surface: &'a Surface) -> Self {
        Self {
            surface,
            backdrop: Color::Black,
        }
    }

    pub fn backdrop(mut self, backdrop: Color) -> Self {
        self.backdrop = backdrop;
        self
    }
}

impl Widget for SurfaceView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let size = self.surface.size();
        if area.is_empty() || size.is_empty() {
            return;
        }
        let backdrop = self.backdrop;
        let shapes = self.surface.shapes();

        Canvas::default()
            .background_color(backdrop)
            .marker(Marker::Braille)
            .x_bounds([0.0, size.width])
            .y_bounds([0.0, size.height])
            .paint(|ctx| {
                for shape in shapes {
                    paint_shape(ctx, shape, size.width, size.height, backdrop);
                }
            })
            .render(area, buf);

        // Washes tint the cell background, which the canvas cannot do.
        for shape in shapes {
            if let Shape::Wash { paint } = shape {
                buf.set_style(area, Style::new().bg(paint.over(backdrop)));
            }
        }
    }
}

fn paint_shape(ctx: &mut Context, shape: &Shape, width: f64, height: f64, backdrop: Color) {
    // Surfaces grow downwards, the canvas grows upwards.
    let flip = |y: f64| height - y;

    match *shape {
        Shape::Segment {
            x1,
            y1,
            x2,
            y2,
            stroke,
            paint,
        } => {
            let color = paint.over(backdrop);
            ctx.draw(&Line::new(x1, flip(y1), x2, flip(y2), color));
            if stroke > 1.0 {
                ctx.draw(&Line::new(x1 + 1.0, flip(y1), x2 + 1.0, flip(y2), color));
            }
        }
        Shape::Disc {
            x,
            y,
            radius,
            paint,
        } => {
            let coords = disc_points(x, flip(y), radius);
            ctx.draw(&Points {
                coords: &coords,
                color: paint.over(backdrop),
            });
        }
        Shape::Band {
            x,
            y,
            width: band_width,
            height: band_height,
            paint,
            ..
        } => {
            let strip = band_width / BAND_STRIPS as f64;
            for i in 0..BAND_STRIPS {
                let left = (x + strip * i as f64).max(0.0);
                let right = (x + strip * (i + 1) as f64).min(width);
                if right <= left {
                    continue;
                }
                let alpha = shape.band_alpha_at((left + right) / 2.0).unwrap_or(0.0);
                if alpha < 0.01 {
                    continue;
                }
                let color = Paint { alpha, ..paint }.over(backdrop);
                let mut row = y;
                while row < y + band_height {
                    ctx.draw(&Line::new(left, flip(row), right, flip(row), color));
                    row += BAND_SCANLINE;
                }
            }
        }
        Shape::Glow {
            x,
            y,
            inner,
            outer,
            paint,
        } => {
            let span = outer - inner;
            if span <= 0.0 {
                return;
            }
            let mut radius = inner;
            while radius <= outer {
                let falloff = 1.0 - ((radius - inner) / span) as f32;
                ctx.draw(&Circle {
                    x,
                    y: flip(y),
                    radius,
                    color: paint.fade(falloff).over(backdrop),
                });
                radius += FILL_STEP;
            }
        }
        Shape::Wash { .. } => {}
    }
}

/// Sample points covering a filled disc.
fn disc_points(cx: f64, cy: f64, radius: f64) -> Vec<(f64, f64)> {
    if radius < FILL_STEP {
        return vec![(cx, cy)];
    }
    let mut points = Vec::new();
    let mut dy = -radius;
    while dy <= radius {
        let mut dx = -radius;
        while dx <= radius {
            if dx * dx + dy * dy <= radius * radius {
                points.push((cx + dx, cy + dy));
            }
            dx += FILL_STEP;
        }
        dy += FILL_STEP;
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::rgba;
    use stratus_core::{Size, SurfaceId};

    fn painted_cells(buf: &Buffer) -> usize {
        buf.content()
            .iter()
            .filter(|cell| cell.symbol() != " ")
            .count()
    }

    #[test]
    fn test_disc_points_cover_the_center() {
        assert_eq!(disc_points(5.0, 5.0, 1.0), vec![(5.0, 5.0)]);
        let points = disc_points(0.0, 0.0, 4.0);
        assert!(points.contains(&(0.0, 0.0)));
        assert!(points.iter().all(|(x, y)| x * x + y * y <= 16.0));
    }

    #[test]
    fn test_renders_shapes_into_the_area() {
        let mut surface = Surface::new(SurfaceId::new(1), Size::from_cells(20, 6));
        surface.draw(Shape::Disc {
            x: 80.0,
            y: 48.0,
            radius: 20.0,
            paint: rgba(255, 215, 0, 0.6),
        });
        let area = Rect::new(0, 0, 20, 6);
        let mut buf = Buffer::empty(area);
        SurfaceView::new(&surface).render(area, &mut buf);
        assert!(painted_cells(&buf) > 0);
    }

    #[test]
    fn test_empty_surface_leaves_buffer_untouched() {
        let surface = Surface::new(SurfaceId::new(1), Size::ZERO);
        let area = Rect::new(0, 0, 10, 4);
        let mut buf = Buffer::empty(area);
        SurfaceView::new(&surface)
            .backdrop(Color::Rgb(10, 10, 10))
            .render(area, &mut buf);
        assert_eq!(buf, Buffer::empty(area));
    }

    #[test]
    fn test_wash_tints_background() {
        let mut surface = Surface::new(SurfaceId::new(1), Size::from_cells(4, 2));
        surface.draw(Shape::Wash {
            paint: rgba(255, 255, 255, 0.3),
        });
        let area = Rect::new(0, 0, 4, 2);
        let mut buf = Buffer::empty(area);
        SurfaceView::new(&surface)
            .backdrop(Color::Rgb(0, 0, 0))
            .render(area, &mut buf);
        assert_eq!(buf[(0_u16, 0_u16)].bg, Color::Rgb(77, 77, 77));
    }
}
