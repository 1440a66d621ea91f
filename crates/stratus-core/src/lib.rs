//! Core types shared by the stratus crates.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Horizontal surface pixels covered by one terminal column.
pub const PIXELS_PER_COLUMN: f64 = 8.0;

/// Vertical surface pixels covered by one terminal row.
pub const PIXELS_PER_ROW: f64 = 16.0;

/// Stable identity of a card on the dashboard.
///
/// Allocated by the dashboard when a card is created and never derived from
/// the card's contents, so two cards showing the same city stay distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardId(u64);

impl CardId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "card#{}", self.0)
    }
}

/// Identity of an animation drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(u64);

impl SurfaceId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// Rendered size of a card in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const ZERO: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Convert a cell area to surface pixels.
    pub fn from_cells(columns: u16, rows: u16) -> Self {
        Self {
            width: f64::from(columns) * PIXELS_PER_COLUMN,
            height: f64::from(rows) * PIXELS_PER_ROW,
        }
    }

    /// A surface with no drawable area.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Whether a city is currently in daylight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeOfDay {
    #[default]
    Day,
    Night,
}

impl TimeOfDay {
    pub fn from_daytime(is_daytime: bool) -> Self {
        if is_daytime { Self::Day } else { Self::Night }
    }

    pub fn is_day(self) -> bool {
        self == Self::Day
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Day => "Day",
            Self::Night => "Night",
        }
    }
}

/// The visual routine drawn behind a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoutineKind {
    Rain,
    Snow,
    Thunderstorm,
    Clouds,
    Sun,
    Moon,
    Fog,
    Default,
}

impl RoutineKind {
    /// Classify free-text weather conditions.
    ///
    /// Matching is a case-insensitive substring test in a fixed order, first
    /// match wins. Compound descriptions such as "thunderstorm with heavy
    /// clouds" therefore resolve to the earlier entry.
    pub fn classify(condition: &str, is_daytime: bool) -> Self {
        let condition = condition.to_lowercase();
        let has = |needle: &str| condition.contains(needle);

        if has("rain") || has("drizzle") {
            Self::Rain
        } else if has("snow") {
            Self::Snow
        } else if has("thunder") || has("storm") {
            Self::Thunderstorm
        } else if has("cloud") {
            Self::Clouds
        } else if has("clear") {
            if is_daytime { Self::Sun } else { Self::Moon }
        } else if has("fog") || has("mist") {
            Self::Fog
        } else {
            Self::Default
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Rain => "rain",
            Self::Snow => "snow",
            Self::Thunderstorm => "thunderstorm",
            Self::Clouds => "clouds",
            Self::Sun => "sun",
            Self::Moon => "moon",
            Self::Fog => "fog",
            Self::Default => "default",
        }
    }
}

impl fmt::Display for RoutineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sun color tier chosen from the temperature in Celsius.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SunTier {
    /// Above 30°C.
    Warm,
    /// Below 10°C.
    Pale,
    Gold,
}

impl SunTier {
    pub fn from_temperature(temp_c: f64) -> Self {
        if temp_c > 30.0 {
            Self::Warm
        } else if temp_c < 10.0 {
            Self::Pale
        } else {
            Self::Gold
        }
    }
}

/// Temperature unit used for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn toggle(self) -> Self {
        match self {
            Self::Celsius => Self::Fahrenheit,
            Self::Fahrenheit => Self::Celsius,
        }
    }

    /// Convert a Celsius reading into this unit.
    pub fn from_celsius(self, temp_c: f64) -> f64 {
        match self {
            Self::Celsius => temp_c,
            Self::Fahrenheit => temp_c * 9.0 / 5.0 + 32.0,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Celsius => "°C",
            Self::Fahrenheit => "°F",
        }
    }
}
