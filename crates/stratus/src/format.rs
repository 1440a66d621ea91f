//! Display helpers for weather values.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate};
use ratatui::style::Color;
use stratus_core::TemperatureUnit;

/// Rounded temperature in `unit`, e.g. "-3°C".
pub fn format_temp(temp_c: f64, unit: TemperatureUnit) -> String {
    // Avoid printing "-0".
    let rounded = unit.from_celsius(temp_c).round() + 0.0;
    format!("{rounded:.0}{}", unit.symbol())
}

pub fn format_wind(kmph: f64) -> String {
    format!("{:.0} km/h", kmph.round())
}

pub fn format_pressure(mb: f64) -> String {
    format!("{:.0} hPa", mb.round())
}

pub fn format_humidity(humidity: u8) -> String {
    format!("{humidity}%")
}

/// Chance of rain as shown next to hourly entries; empty when zero.
pub fn format_chance_of_rain(percent: u8) -> String {
    if percent == 0 {
        String::new()
    } else {
        format!("{percent}% rain")
    }
}

/// UV index bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UvLevel {
    Low,
    Moderate,
    High,
    VeryHigh,
    Extreme,
}

impl UvLevel {
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
            Self::VeryHigh => "Very High",
            Self::Extreme => "Extreme",
        }
    }

    pub fn color(self) -> Color {
        match self {
            Self::Low => Color::Rgb(0x4c, 0xaf, 0x50),
            Self::Moderate => Color::Rgb(0xff, 0xeb, 0x3b),
            Self::High => Color::Rgb(0xff, 0x98, 0x00),
            Self::VeryHigh => Color::Rgb(0xf4, 0x43, 0x36),
            Self::Extreme => Color::Rgb(0x9c, 0x27, 0xb0),
        }
    }
}

pub fn uv_level(uv: f64) -> UvLevel {
    match uv {
        uv if uv <= 2.0 => UvLevel::Low,
        uv if uv <= 5.0 => UvLevel::Moderate,
        uv if uv <= 7.0 => UvLevel::High,
        uv if uv <= 10.0 => UvLevel::VeryHigh,
        _ => UvLevel::Extreme,
    }
}

const COMPASS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// 16-point compass direction for a bearing in degrees.
pub fn wind_direction(degrees: f64) -> &'static str {
    let index = (degrees.rem_euclid(360.0) / 22.5).round() as usize % COMPASS.len();
    COMPASS[index]
}

/// Uppercase the first character.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// "Today", "Tomorrow" or the weekday name.
pub fn day_name(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        "Today".to_string()
    } else if today.succ_opt() == Some(date) {
        "Tomorrow".to_string()
    } else {
        date.format("%A").to_string()
    }
}

/// Month and day, e.g. "May 4".
pub fn short_date(date: NaiveDate) -> String {
    format!("{} {}", date.format("%b"), date.day())
}

/// 12-hour clock label for an hour of day, e.g. "3 PM".
pub fn hour_label(hour: u32) -> String {
    let meridiem = if hour % 24 < 12 { "AM" } else { "PM" };
    let hour = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{hour} {meridiem}")
}

/// Wall-clock time with minutes, e.g. "04:07 AM".
pub fn clock_time(time: &DateTime<FixedOffset>) -> String {
    time.format("%I:%M %p").to_string()
}

/// Full date, e.g. "Wednesday, May 15, 2024".
pub fn long_date(time: &DateTime<FixedOffset>) -> String {
    time.format("%A, %B %-d, %Y").to_string()
}
