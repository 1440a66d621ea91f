//! Weather routines drawn behind city cards.
//!
//! Every routine follows the same shape: initial state is drawn from the
//! random source once, then each frame draws the current state and advances
//! it by one step.

pub mod clouds;
pub mod drift;
pub mod fog;
pub mod moon;
pub mod rain;
pub mod snow;
pub mod storm;
pub mod sun;

use rand::Rng;

/// Uniform sample from `[low, high)`.
///
/// Collapses to `low` when the range is empty, which happens for every
/// position range on a surface that has not been laid out yet.
pub(crate) fn uniform<R: Rng + ?Sized>(rng: &mut R, low: f64, high: f64) -> f64 {
    if high > low {
        rng.gen_range(low..high)
    } else {
        low
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use rand::{SeedableRng, rngs::StdRng};
    use stratus_core::{Size, SurfaceId};

    use crate::surface::Surface;

    pub const CARD: Size = Size::new(240.0, 128.0);

    pub fn rng() -> StdRng {
        StdRng::seed_from_u64(0x5eed)
    }

    pub fn surface(size: Size) -> Surface {
        Surface::new(SurfaceId::new(7), size)
    }
}
