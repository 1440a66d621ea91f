//! Routine selection and per-frame dispatch.

use rand::Rng;
use stratus_core::{RoutineKind, Size, TimeOfDay};

use crate::animations::{
    clouds::CloudState, drift::DriftState, fog::FogState, moon::MoonState, rain::RainState,
    snow::SnowState, storm::StormState, sun::SunState,
};
use crate::surface::Surface;

/// Running state of one card's animation, tagged by routine.
#[derive(Debug, Clone)]
pub enum Routine {
    Rain(RainState),
    Snow(SnowState),
    Thunderstorm(StormState),
    Clouds(CloudState),
    Sun(SunState),
    Moon(MoonState),
    Fog(FogState),
    Default(DriftState),
}

impl Routine {
    /// Classify `condition` and initialise the matching routine.
    pub fn select<R: Rng + ?Sized>(
        condition: &str,
        is_daytime: bool,
        temp_c: f64,
        size: Size,
        rng: &mut R,
    ) -> Self {
        let kind = RoutineKind::classify(condition, is_daytime);
        Self::start(kind, TimeOfDay::from_daytime(is_daytime), temp_c, size, rng)
    }

    /// Initialise a routine. Random state is drawn here and never reseeded.
    pub fn start<R: Rng + ?Sized>(
        kind: RoutineKind,
        time_of_day: TimeOfDay,
        temp_c: f64,
        size: Size,
        rng: &mut R,
    ) -> Self {
        match kind {
            RoutineKind::Rain => Self::Rain(RainState::new(size, rng)),
            RoutineKind::Snow => Self::Snow(SnowState::new(size, rng)),
            RoutineKind::Thunderstorm => Self::Thunderstorm(StormState::new(size, rng)),
            RoutineKind::Clouds => Self::Clouds(CloudState::new(size, time_of_day, rng)),
            RoutineKind::Sun => Self::Sun(SunState::new(size, temp_c)),
            RoutineKind::Moon => Self::Moon(MoonState::new(size)),
            RoutineKind::Fog => Self::Fog(FogState::new(size, rng)),
            RoutineKind::Default => Self::Default(DriftState::new(size, time_of_day, rng)),
        }
    }

    pub fn kind(&self) -> RoutineKind {
        match self {
            Self::Rain(_) => RoutineKind::Rain,
            Self::Snow(_) => RoutineKind::Snow,
            Self::Thunderstorm(_) => RoutineKind::Thunderstorm,
            Self::Clouds(_) => RoutineKind::Clouds,
            Self::Sun(_) => RoutineKind::Sun,
            Self::Moon(_) => RoutineKind::Moon,
            Self::Fog(_) => RoutineKind::Fog,
            Self::Default(_) => RoutineKind::Default,
        }
    }

    /// Clear `surface`, draw the current state and advance it one frame.
    pub fn redraw<R: Rng + ?Sized>(&mut self, surface: &mut Surface, rng: &mut R) {
        match self {
            Self::Rain(state) => state.redraw(surface, rng),
            Self::Snow(state) => state.redraw(surface, rng),
            Self::Thunderstorm(state) => {
                let _flashed = state.redraw(surface, rng);
            }
            Self::Clouds(state) => state.redraw(surface),
            Self::Sun(state) => state.redraw(surface),
            Self::Moon(state) => state.redraw(surface),
            Self::Fog(state) => state.redraw(surface),
            Self::Default(state) => state.redraw(surface),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animations::{
        clouds::cloud_paint,
        testing::{CARD, rng, surface},
    };
    use stratus_core::SunTier;

    #[test]
    fn test_light_rain_scenario() {
        let routine = Routine::select("light rain", true, 15.0, CARD, &mut rng());
        assert_eq!(routine.kind(), RoutineKind::Rain);
        let Routine::Rain(state) = routine else {
            panic!("expected rain");
        };
        assert_eq!(state.drops.len(), 50);
        for drop in &state.drops {
            assert!((0.0..CARD.height).contains(&drop.y));
            assert!((10.0..25.0).contains(&drop.length));
        }
    }

    #[test]
    fn test_broken_clouds_at_night_scenario() {
        let routine = Routine::select("broken clouds", false, 5.0, CARD, &mut rng());
        let Routine::Clouds(state) = routine else {
            panic!("expected clouds");
        };
        assert_eq!(state.time_of_day, TimeOfDay::Night);
        assert_eq!(state.paint(), cloud_paint(TimeOfDay::Night));
        assert_ne!(state.paint(), cloud_paint(TimeOfDay::Day));
    }

    #[test]
    fn test_hot_clear_day_scenario() {
        let routine = Routine::select("Clear", true, 35.0, CARD, &mut rng());
        let Routine::Sun(state) = routine else {
            panic!("expected sun");
        };
        assert_eq!(state.tier, SunTier::Warm);
    }

    #[test]
    fn test_clear_night_is_moon() {
        let routine = Routine::select("clear sky", false, 35.0, CARD, &mut rng());
        assert_eq!(routine.kind(), RoutineKind::Moon);
    }

    #[test]
    fn test_unknown_condition_falls_back_to_default() {
        let routine = Routine::select("volcanic ash", true, 20.0, CARD, &mut rng());
        assert_eq!(routine.kind(), RoutineKind::Default);
    }

    #[test]
    fn test_every_routine_tolerates_zero_area() {
        let kinds = [
            RoutineKind::Rain,
            RoutineKind::Snow,
            RoutineKind::Thunderstorm,
            RoutineKind::Clouds,
            RoutineKind::Sun,
            RoutineKind::Moon,
            RoutineKind::Fog,
            RoutineKind::Default,
        ];
        let mut rng = rng();
        for kind in kinds {
            let mut routine = Routine::start(kind, TimeOfDay::Night, 0.0, Size::ZERO, &mut rng);
            let mut surface = surface(Size::ZERO);
            for _ in 0..200 {
                routine.redraw(&mut surface, &mut rng);
            }
            assert!(surface.shapes().is_empty(), "{kind} drew on an empty surface");
            assert_eq!(routine.kind(), kind);
        }
    }
}
