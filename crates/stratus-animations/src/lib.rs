//! Animated weather overlays for stratus city cards.
//!
//! Each card gets its own drawing surface and redraw loop, managed by an
//! [`AnimationManager`]. A routine (rain, snow, storm, clouds, sun, moon, fog,
//! or gentle drifting motes) is picked from the card's condition text and
//! redrawn once per frame until the card is detached.

pub mod animations;
mod color;
mod frame_loop;
mod manager;
mod routine;
mod surface;
mod widget;

pub use color::{Paint, hsl_to_rgb, rgba};
pub use frame_loop::{FrameLoop, LoopToken};
pub use manager::{AnimationHandle, AnimationManager, CardHost, FrameStats};
pub use routine::Routine;
pub use surface::{Shape, Surface};
pub use widget::SurfaceView;
