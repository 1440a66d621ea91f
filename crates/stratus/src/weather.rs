//! Weather data for the dashboard cards.
//!
//! Current conditions and forecasts come from the wttr.in JSON API and are
//! fetched per city on a background thread. Offline mode swaps the network
//! for generated weather.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, RwLock};
use std::thread;
use std::time::{Duration, Instant};

use chrono::{
    DateTime, Days, FixedOffset, Local, NaiveDate, NaiveDateTime, Offset, Timelike, Utc,
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::Deserialize;
use stratus_config::City;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Timeout for HTTP requests.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Hourly entries kept per city.
const MAX_HOURLY: usize = 24;

/// Daylight window used when the report has no usable astronomy data.
const FALLBACK_DAY_HOURS: std::ops::Range<u32> = 6..20;

/// Errors from fetching or decoding a weather report.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("request failed: {0}")]
    Http(#[from] ureq::Error),

    #[error("malformed response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("response has no {0}")]
    MissingField(&'static str),

    #[error("field {field} is not a number: {value:?}")]
    InvalidNumber { field: &'static str, value: String },
}

/// One entry of the hourly forecast.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyForecast {
    pub date: NaiveDate,
    /// Hour of day, 0-23.
    pub hour: u32,
    pub temp_c: f64,
    pub description: String,
    /// Chance of rain in percent.
    pub chance_of_rain: u8,
}

/// One day of the multi-day forecast.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub max_c: f64,
    pub min_c: f64,
    pub description: String,
}

/// Current weather for one city.
#[derive(Debug, Clone, PartialEq)]
pub struct CityWeather {
    pub description: String,
    pub temp_c: f64,
    pub feels_like_c: f64,
    pub humidity: u8,
    pub wind_kmph: f64,
    pub wind_degrees: f64,
    pub pressure_mb: f64,
    pub uv_index: f64,
    pub is_daytime: bool,
    /// The city's offset from UTC.
    pub utc_offset: FixedOffset,
    /// Upcoming hours, starting at the observation hour.
    pub hourly: Vec<HourlyForecast>,
    pub daily: Vec<DailyForecast>,
    pub fetched_at: DateTime<Local>,
}

impl CityWeather {
    /// Wall-clock time in the city at `now`.
    pub fn local_time(&self, now: DateTime<Utc>) -> DateTime<FixedOffset> {
        now.with_timezone(&self.utc_offset)
    }
}

/// Latest known state of a city's weather.
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    Ready(CityWeather),
    /// No data could be fetched yet; holds the last error message.
    Unavailable(String),
}

/// Where weather comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Network,
    Offline,
}

/// wttr.in `format=j1` response (partial - only fields we need).
#[derive(Debug, Deserialize)]
struct WttrResponse {
    current_condition: Vec<CurrentCondition>,
    #[serde(default)]
    weather: Vec<DailyWeather>,
}

#[derive(Debug, Deserialize)]
struct CurrentCondition {
    #[serde(rename = "temp_C")]
    temp_c: String,
    #[serde(rename = "FeelsLikeC")]
    feels_like_c: String,
    #[serde(default)]
    humidity: String,
    #[serde(rename = "windspeedKmph", default)]
    windspeed_kmph: String,
    #[serde(rename = "winddirDegree", default)]
    winddir_degree: String,
    #[serde(default)]
    pressure: String,
    #[serde(rename = "uvIndex", default)]
    uv_index: String,
    #[serde(rename = "weatherDesc", default)]
    weather_desc: Vec<Text>,
    #[serde(rename = "localObsDateTime", default)]
    local_obs_date_time: String,
    /// Observation time in UTC, e.g. "11:30 AM".
    #[serde(default)]
    observation_time: String,
}

#[derive(Debug, Deserialize)]
struct Text {
    value: String,
}

#[derive(Debug, Deserialize)]
struct DailyWeather {
    date: String,
    #[serde(rename = "maxtempC")]
    maxtemp_c: String,
    #[serde(rename = "mintempC")]
    mintemp_c: String,
    #[serde(default)]
    astronomy: Vec<Astronomy>,
    #[serde(default)]
    hourly: Vec<Hourly>,
}

#[derive(Debug, Deserialize)]
struct Astronomy {
    sunrise: String,
    sunset: String,
}

#[derive(Debug, Deserialize)]
struct Hourly {
    time: String,
    #[serde(rename = "tempC")]
    temp_c: String,
    #[serde(rename = "weatherDesc", default)]
    weather_desc: Vec<Text>,
    #[serde(rename = "chanceofrain", default)]
    chance_of_rain: String,
}

enum Command {
    Track(City),
    Untrack(String),
    Refresh,
    Stop,
}

/// Fetches weather for the tracked cities in a background thread.
#[derive(Debug)]
pub struct WeatherMonitor {
    /// Latest report per city, keyed by [`City::label`].
    reports: Arc<RwLock<HashMap<String, Report>>>,
    /// Bumped whenever a report is stored.
    generation: Arc<AtomicU64>,
    commands: Option<Sender<Command>>,
    source: Source,
    interval: Duration,
}

impl WeatherMonitor {
    pub fn new(source: Source, interval: Duration) -> Self {
        Self {
            reports: Arc::new(RwLock::new(HashMap::new())),
            generation: Arc::new(AtomicU64::new(0)),
            commands: None,
            source,
            interval,
        }
    }

    /// Start the background thread. Every city is fetched immediately and
    /// then again each interval.
    pub fn start(&mut self, cities: &[City]) {
        if self.commands.is_some() {
            return;
        }
        let (tx, rx) = mpsc::channel();
        self.commands = Some(tx);

        let reports = self.reports.clone();
        let generation = self.generation.clone();
        let source = self.source;
        let interval = self.interval;
        let mut cities = cities.to_vec();

        thread::spawn(move || {
            let fetcher = Fetcher::new(source);
            let store = |city: &City| {
                let result = fetcher.fetch(city);
                store_report(&reports, city, result);
                generation.fetch_add(1, Ordering::Release);
            };

            cities.iter().for_each(&store);
            let mut last_fetch = Instant::now();

            loop {
                let wait = interval.saturating_sub(last_fetch.elapsed());
                match rx.recv_timeout(wait) {
                    Ok(Command::Track(city)) => {
                        store(&city);
                        cities.push(city);
                    }
                    Ok(Command::Untrack(label)) => {
                        cities.retain(|city| city.label() != label);
                        // A fetch for this city may have landed since `untrack`.
                        forget_report(&reports, &label);
                    }
                    Ok(Command::Refresh) | Err(RecvTimeoutError::Timeout) => {
                        cities.iter().for_each(&store);
                        last_fetch = Instant::now();
                    }
                    Ok(Command::Stop) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            debug!("weather thread stopped");
        });
    }

    /// Stop the background thread.
    pub fn stop(&mut self) {
        if let Some(tx) = self.commands.take() {
            let _ = tx.send(Command::Stop);
        }
    }

    /// Start tracking `city` and fetch it right away.
    pub fn track(&self, city: City) {
        self.send(Command::Track(city));
    }

    /// Stop tracking `city` and forget its report.
    pub fn untrack(&self, city: &City) {
        let label = city.label();
        forget_report(&self.reports, &label);
        self.send(Command::Untrack(label));
    }

    /// Refetch every tracked city now.
    pub fn refresh(&self) {
        self.send(Command::Refresh);
    }

    /// Latest report for `city`, `None` while the first fetch is pending.
    pub fn report(&self, city: &City) -> Option<Report> {
        self.reports
            .read()
            .ok()
            .and_then(|reports| reports.get(&city.label()).cloned())
    }

    /// Changes whenever a new report lands.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    fn send(&self, command: Command) {
        if let Some(tx) = &self.commands
            && tx.send(command).is_err()
        {
            warn!("weather thread is gone");
        }
    }
}

impl Drop for WeatherMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

struct Fetcher {
    agent: Option<ureq::Agent>,
}

impl Fetcher {
    fn new(source: Source) -> Self {
        let agent = match source {
            Source::Network => Some(
                ureq::Agent::config_builder()
                    .timeout_global(Some(REQUEST_TIMEOUT))
                    .build()
                    .new_agent(),
            ),
            Source::Offline => None,
        };
        Self { agent }
    }

    fn fetch(&self, city: &City) -> Result<CityWeather, WeatherError> {
        match &self.agent {
            Some(agent) => fetch_weather(agent, city),
            None => Ok(synthetic_weather(city, Local::now())),
        }
    }
}

/// Store the outcome of a fetch. A failure keeps earlier data.
fn store_report(
    reports: &RwLock<HashMap<String, Report>>,
    city: &City,
    result: Result<CityWeather, WeatherError>,
) {
    let label = city.label();
    if let Err(err) = &result {
        warn!(city = %label, error = %err, "weather fetch failed");
    }
    if let Ok(mut reports) = reports.write() {
        let report = merge_report(reports.get(&label), result);
        reports.insert(label, report);
    }
}

fn forget_report(reports: &RwLock<HashMap<String, Report>>, label: &str) {
    if let Ok(mut reports) = reports.write() {
        reports.remove(label);
    }
}

fn merge_report(previous: Option<&Report>, result: Result<CityWeather, WeatherError>) -> Report {
    match (result, previous) {
        (Ok(weather), _) => Report::Ready(weather),
        (Err(_), Some(Report::Ready(stale))) => Report::Ready(stale.clone()),
        (Err(err), _) => Report::Unavailable(err.to_string()),
    }
}

/// Fetch and decode the weather for `city` from wttr.in.
fn fetch_weather(agent: &ureq::Agent, city: &City) -> Result<CityWeather, WeatherError> {
    let url = format!("https://wttr.in/{}?format=j1", url_encode(&city.query()));
    let body = agent.get(&url).call()?.body_mut().read_to_string()?;
    let weather = parse_report(&body, Local::now())?;
    info!(city = %city.label(), description = %weather.description, "fetched weather");
    Ok(weather)
}

/// Decode a wttr.in `format=j1` body.
fn parse_report(body: &str, fetched_at: DateTime<Local>) -> Result<CityWeather, WeatherError> {
    let response: WttrResponse = serde_json::from_str(body)?;
    let current = response
        .current_condition
        .first()
        .ok_or(WeatherError::MissingField("current condition"))?;

    let today = response.weather.first();
    let observed =
        NaiveDateTime::parse_from_str(&current.local_obs_date_time, "%Y-%m-%d %I:%M %p")
            .unwrap_or_else(|_| fetched_at.naive_local());
    let is_daytime = is_daytime(
        observed.hour() * 60 + observed.minute(),
        today.and_then(|day| day.astronomy.first()),
    );
    let utc_offset = utc_offset(observed, &current.observation_time)
        .unwrap_or_else(|| fetched_at.offset().fix());

    let mut hourly = Vec::with_capacity(MAX_HOURLY);
    let mut daily = Vec::with_capacity(response.weather.len());
    for day in &response.weather {
        let Ok(date) = NaiveDate::parse_from_str(&day.date, "%Y-%m-%d") else {
            continue;
        };
        for hour in &day.hourly {
            hourly.push(HourlyForecast {
                date,
                hour: hour.time.parse::<u32>().map_or(0, |t| t / 100),
                temp_c: number("tempC", &hour.temp_c)?,
                description: description(&hour.weather_desc),
                chance_of_rain: hour.chance_of_rain.parse().unwrap_or(0),
            });
        }
        daily.push(DailyForecast {
            date,
            max_c: number("maxtempC", &day.maxtemp_c)?,
            min_c: number("mintempC", &day.mintemp_c)?,
            description: midday_description(&day.hourly),
        });
    }
    upcoming_hours(&mut hourly, observed);

    Ok(CityWeather {
        description: description(&current.weather_desc),
        temp_c: number("temp_C", &current.temp_c)?,
        feels_like_c: number("FeelsLikeC", &current.feels_like_c)?,
        humidity: current.humidity.parse().unwrap_or(0),
        wind_kmph: current.windspeed_kmph.parse().unwrap_or(0.0),
        wind_degrees: current.winddir_degree.parse().unwrap_or(0.0),
        pressure_mb: current.pressure.parse().unwrap_or(0.0),
        uv_index: current.uv_index.parse().unwrap_or(0.0),
        is_daytime,
        utc_offset,
        hourly,
        daily,
        fetched_at,
    })
}

/// Drop slots that start before the observation hour and keep the next
/// [`MAX_HOURLY`].
fn upcoming_hours(hourly: &mut Vec<HourlyForecast>, observed: NaiveDateTime) {
    let current = (observed.date(), observed.hour());
    hourly.retain(|slot| (slot.date, slot.hour) >= current);
    hourly.truncate(MAX_HOURLY);
}

/// Offset between the local observation time and the same moment in UTC.
///
/// Only clock times are reported, so the difference is wrapped into the
/// range of real offsets (UTC-12 to UTC+14).
fn utc_offset(local: NaiveDateTime, utc_time: &str) -> Option<FixedOffset> {
    let utc = i32::try_from(parse_time_to_minutes(utc_time)?).ok()?;
    let local = i32::try_from(local.hour() * 60 + local.minute()).ok()?;
    let minutes = match local - utc {
        m if m > 14 * 60 => m - 24 * 60,
        m if m < -12 * 60 => m + 24 * 60,
        m => m,
    };
    FixedOffset::east_opt(minutes * 60)
}

fn number(field: &'static str, value: &str) -> Result<f64, WeatherError> {
    value
        .trim()
        .parse()
        .map_err(|_| WeatherError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

fn description(texts: &[Text]) -> String {
    texts
        .first()
        .map(|text| text.value.trim().to_string())
        .unwrap_or_default()
}

/// Description of the hourly slot closest to noon.
fn midday_description(hourly: &[Hourly]) -> String {
    hourly
        .iter()
        .min_by_key(|hour| hour.time.parse::<i32>().map_or(i32::MAX, |t| (t - 1200).abs()))
        .map(|hour| description(&hour.weather_desc))
        .unwrap_or_default()
}

/// Whether `minutes` past midnight falls between sunrise and sunset.
///
/// Falls back to a fixed daylight window when sunrise or sunset is missing
/// (polar day and night report "No sunrise").
fn is_daytime(minutes: u32, astronomy: Option<&Astronomy>) -> bool {
    let bounds = astronomy.and_then(|astro| {
        Some((
            parse_time_to_minutes(&astro.sunrise)?,
            parse_time_to_minutes(&astro.sunset)?,
        ))
    });
    match bounds {
        Some((sunrise, sunset)) => minutes >= sunrise && minutes < sunset,
        None => FALLBACK_DAY_HOURS.contains(&(minutes / 60)),
    }
}

/// Parse time string like "06:45 AM" to minutes since midnight.
fn parse_time_to_minutes(time_str: &str) -> Option<u32> {
    let (clock, meridiem) = time_str.trim().split_once(' ')?;
    let (hours, minutes) = clock.split_once(':')?;

    let mut hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;
    if hours > 12 || minutes > 59 {
        return None;
    }
    match meridiem.trim().to_ascii_uppercase().as_str() {
        "PM" if hours != 12 => hours += 12,
        "AM" if hours == 12 => hours = 0,
        "AM" | "PM" => {}
        _ => return None,
    }

    Some(hours * 60 + minutes)
}

/// Simple URL encoding for location strings.
fn url_encode(s: &str) -> String {
    s.replace(' ', "+").replace(',', "%2C").replace('\'', "%27")
}

/// Conditions generated in offline mode.
const SYNTHETIC_CONDITIONS: [&str; 10] = [
    "Sunny",
    "Clear",
    "Partly cloudy",
    "Overcast clouds",
    "Light rain",
    "Moderate rain",
    "Light snow",
    "Thundery outbreaks possible",
    "Mist",
    "Fog",
];

/// Days of forecast generated in offline mode.
const SYNTHETIC_DAYS: u64 = 4;

/// Deterministic weather for `city`, used when offline.
///
/// Everything except the day/night flag and timestamps depends only on the
/// city name.
pub fn synthetic_weather(city: &City, now: DateTime<Local>) -> CityWeather {
    let mut rng = StdRng::seed_from_u64(name_seed(&city.name));
    let pick = |rng: &mut StdRng| {
        SYNTHETIC_CONDITIONS[rng.gen_range(0..SYNTHETIC_CONDITIONS.len())].to_string()
    };

    let description = pick(&mut rng);
    let temp_c = rng.gen_range(-15.0_f64..35.0).round();
    let today = now.date_naive();

    let mut hourly = Vec::new();
    let mut daily = Vec::new();
    for offset in 0..SYNTHETIC_DAYS {
        let date = today.checked_add_days(Days::new(offset)).unwrap_or(today);
        let base = temp_c + rng.gen_range(-3.0..3.0);
        for slot in 0..8_u32 {
            hourly.push(HourlyForecast {
                date,
                hour: slot * 3,
                temp_c: (base + rng.gen_range(-4.0..4.0)).round(),
                description: pick(&mut rng),
                chance_of_rain: rng.gen_range(0..=100),
            });
        }
        daily.push(DailyForecast {
            date,
            max_c: (base + 4.0).round(),
            min_c: (base - 4.0).round(),
            description: pick(&mut rng),
        });
    }

    upcoming_hours(&mut hourly, now.naive_local());

    CityWeather {
        description,
        temp_c,
        feels_like_c: temp_c - rng.gen_range(0.0_f64..4.0).round(),
        humidity: rng.gen_range(20..=100),
        wind_kmph: rng.gen_range(0.0_f64..40.0).round(),
        wind_degrees: rng.gen_range(0.0_f64..360.0).round(),
        pressure_mb: rng.gen_range(990.0_f64..1035.0).round(),
        uv_index: rng.gen_range(0.0_f64..11.0).round(),
        is_daytime: FALLBACK_DAY_HOURS.contains(&now.hour()),
        utc_offset: now.offset().fix(),
        hourly,
        daily,
        fetched_at: now,
    }
}

/// FNV-1a over the lowercased name.
fn name_seed(name: &str) -> u64 {
    name.to_lowercase()
        .bytes()
        .fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
            (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};

    const SAMPLE: &str = r#"{
        "current_condition": [{
            "FeelsLikeC": "12",
            "humidity": "71",
            "localObsDateTime": "2024-05-14 02:30 PM",
            "observation_time": "11:30 AM",
            "pressure": "1016",
            "temp_C": "14",
            "uvIndex": "4",
            "weatherDesc": [{"value": "Light rain shower"}],
            "winddirDegree": "230",
            "windspeedKmph": "17"
        }],
        "weather": [
            {
                "date": "2024-05-14",
                "maxtempC": "17",
                "mintempC": "8",
                "astronomy": [{"sunrise": "04:58 AM", "sunset": "09:12 PM"}],
                "hourly": [
                    {"time": "0", "tempC": "9", "weatherDesc": [{"value": "Clear"}], "chanceofrain": "0"},
                    {"time": "1200", "tempC": "15", "weatherDesc": [{"value": "Patchy rain nearby"}], "chanceofrain": "80"},
                    {"time": "2100", "tempC": "11", "weatherDesc": [{"value": "Overcast"}], "chanceofrain": "20"}
                ]
            },
            {
                "date": "2024-05-15",
                "maxtempC": "19",
                "mintempC": "9",
                "astronomy": [{"sunrise": "04:56 AM", "sunset": "09:14 PM"}],
                "hourly": [
                    {"time": "900", "tempC": "13", "weatherDesc": [{"value": "Sunny"}], "chanceofrain": "0"}
                ]
            }
        ]
    }"#;

    fn noon() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2024, 5, 14, 12, 0, 0)
            .single()
            .expect("valid local time")
    }

    fn city(name: &str) -> City {
        City::new(name, "")
    }

    #[test]
    fn test_parse_report() {
        let weather = parse_report(SAMPLE, noon()).expect("parse");
        assert_eq!(weather.description, "Light rain shower");
        assert_eq!(weather.temp_c, 14.0);
        assert_eq!(weather.feels_like_c, 12.0);
        assert_eq!(weather.humidity, 71);
        assert_eq!(weather.wind_kmph, 17.0);
        assert_eq!(weather.wind_degrees, 230.0);
        assert_eq!(weather.pressure_mb, 1016.0);
        assert_eq!(weather.uv_index, 4.0);
        assert!(weather.is_daytime);
        assert_eq!(weather.utc_offset, FixedOffset::east_opt(3 * 3600).expect("offset"));

        assert_eq!(weather.daily.len(), 2);
        assert_eq!(weather.daily[0].description, "Patchy rain nearby");
        assert_eq!(weather.daily[1].max_c, 19.0);
        assert_eq!(
            weather.daily[1].date,
            NaiveDate::from_ymd_opt(2024, 5, 15).expect("date")
        );
    }

    #[test]
    fn test_hourly_starts_at_observation_hour() {
        let weather = parse_report(SAMPLE, noon()).expect("parse");
        let hours: Vec<(u32, u32)> = weather
            .hourly
            .iter()
            .map(|slot| (slot.date.day(), slot.hour))
            .collect();
        assert_eq!(hours, vec![(14, 21), (15, 9)]);
        assert_eq!(weather.hourly[0].chance_of_rain, 20);

        let evening = SAMPLE.replace("02:30 PM", "10:15 PM");
        let weather = parse_report(&evening, noon()).expect("parse");
        assert_eq!(weather.hourly.len(), 1);
        assert_eq!(weather.hourly[0].description, "Sunny");
    }

    #[test]
    fn test_utc_offset() {
        let at = |text: &str| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M").expect("datetime")
        };
        let hours = |h: i32| FixedOffset::east_opt(h * 3600);
        assert_eq!(utc_offset(at("2024-05-14 14:30"), "11:30 AM"), hours(3));
        assert_eq!(utc_offset(at("2024-05-14 00:30"), "11:30 PM"), hours(1));
        assert_eq!(utc_offset(at("2024-05-14 23:00"), "01:00 AM"), hours(-2));
        assert_eq!(
            utc_offset(at("2024-05-14 18:15"), "12:30 PM"),
            FixedOffset::east_opt(5 * 3600 + 45 * 60)
        );
        assert_eq!(utc_offset(at("2024-05-14 18:15"), ""), None);
    }

    #[test]
    fn test_missing_observation_time_uses_host_offset() {
        let body = SAMPLE.replace(r#""observation_time": "11:30 AM","#, "");
        let weather = parse_report(&body, noon()).expect("parse");
        assert_eq!(weather.utc_offset, noon().offset().fix());
    }

    #[test]
    fn test_local_time_applies_offset() {
        let weather = parse_report(SAMPLE, noon()).expect("parse");
        let now = Utc
            .with_ymd_and_hms(2024, 5, 14, 22, 5, 0)
            .single()
            .expect("utc time");
        let local = weather.local_time(now);
        assert_eq!(local.format("%Y-%m-%d %H:%M").to_string(), "2024-05-15 01:05");
    }

    #[test]
    fn test_parse_report_night_observation() {
        let body = SAMPLE.replace("02:30 PM", "11:40 PM");
        let weather = parse_report(&body, noon()).expect("parse");
        assert!(!weather.is_daytime);
    }

    #[test]
    fn test_parse_report_errors() {
        assert!(matches!(
            parse_report("not json", noon()),
            Err(WeatherError::Parse(_))
        ));
        assert!(matches!(
            parse_report(r#"{"current_condition": []}"#, noon()),
            Err(WeatherError::MissingField(_))
        ));
        let body = SAMPLE.replace(r#""temp_C": "14""#, r#""temp_C": "warm""#);
        assert!(matches!(
            parse_report(&body, noon()),
            Err(WeatherError::InvalidNumber { field: "temp_C", .. })
        ));
    }

    #[test]
    fn test_hourly_is_capped() {
        let hours: Vec<String> = (0..30)
            .map(|i| format!(r#"{{"time": "{}", "tempC": "1", "weatherDesc": [{{"value": "Fog"}}]}}"#, i % 8 * 300))
            .collect();
        let body = format!(
            r#"{{"current_condition": [{{"temp_C": "1", "FeelsLikeC": "0",
                "localObsDateTime": "2024-01-02 12:00 AM"}}],
                "weather": [{{"date": "2024-01-02", "maxtempC": "2", "mintempC": "-1", "hourly": [{}]}}]}}"#,
            hours.join(",")
        );
        let weather = parse_report(&body, noon()).expect("parse");
        assert_eq!(weather.hourly.len(), MAX_HOURLY);
    }

    #[test]
    fn test_is_daytime() {
        let astro = Astronomy {
            sunrise: "06:00 AM".into(),
            sunset: "06:00 PM".into(),
        };
        assert!(is_daytime(6 * 60, Some(&astro)));
        assert!(!is_daytime(18 * 60, Some(&astro)));
        assert!(!is_daytime(3 * 60, Some(&astro)));

        let polar = Astronomy {
            sunrise: "No sunrise".into(),
            sunset: "No sunset".into(),
        };
        assert!(is_daytime(12 * 60, Some(&polar)));
        assert!(!is_daytime(22 * 60, None));
    }

    #[test]
    fn test_parse_time_to_minutes() {
        assert_eq!(parse_time_to_minutes("06:45 AM"), Some(6 * 60 + 45));
        assert_eq!(parse_time_to_minutes("12:00 PM"), Some(12 * 60));
        assert_eq!(parse_time_to_minutes("12:00 AM"), Some(0));
        assert_eq!(parse_time_to_minutes("06:30 PM"), Some(18 * 60 + 30));
        assert_eq!(parse_time_to_minutes("No sunrise"), None);
        assert_eq!(parse_time_to_minutes("13:00 PM"), None);
    }

    #[test]
    fn test_url_encode() {
        assert_eq!(url_encode("New York"), "New+York");
        assert_eq!(url_encode("Seoul, Korea"), "Seoul%2C+Korea");
        assert_eq!(url_encode("Xi'an"), "Xi%27an");
    }

    #[test]
    fn test_failed_fetch_keeps_stale_data() {
        let stale = synthetic_weather(&city("Minsk"), noon());
        let previous = Report::Ready(stale.clone());
        let err = WeatherError::MissingField("current condition");
        assert_eq!(merge_report(Some(&previous), Err(err)), previous);

        let err = WeatherError::MissingField("current condition");
        assert!(matches!(
            merge_report(None, Err(err)),
            Report::Unavailable(message) if message.contains("current condition")
        ));

        let fresh = synthetic_weather(&city("Tallinn"), noon());
        assert_eq!(
            merge_report(Some(&previous), Ok(fresh.clone())),
            Report::Ready(fresh)
        );
    }

    #[test]
    fn test_synthetic_weather_is_stable_per_city() {
        let a = synthetic_weather(&city("Harbin"), noon());
        let b = synthetic_weather(&city("harbin"), noon());
        assert_eq!(a, b);
        assert!(SYNTHETIC_CONDITIONS.contains(&a.description.as_str()));
        assert_eq!(a.hourly.len(), MAX_HOURLY);
        assert_eq!(a.hourly[0].hour, 12);
        assert_eq!(a.daily.len(), 4);
        assert!(a.daily.iter().all(|day| day.max_c > day.min_c));
        assert!(a.is_daytime);
    }

    #[test]
    fn test_monitor_reports_nothing_before_start() {
        let monitor = WeatherMonitor::new(Source::Offline, Duration::from_secs(60));
        assert_eq!(monitor.report(&city("Seoul")), None);
        assert_eq!(monitor.generation(), 0);
    }

    #[test]
    fn test_offline_monitor_fetches_tracked_cities() {
        let mut monitor = WeatherMonitor::new(Source::Offline, Duration::from_secs(3600));
        monitor.start(&[city("Wuhan")]);
        monitor.track(city("Dalian"));

        let deadline = Instant::now() + Duration::from_secs(5);
        while monitor.generation() < 2 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(matches!(monitor.report(&city("Wuhan")), Some(Report::Ready(_))));
        assert!(matches!(monitor.report(&city("Dalian")), Some(Report::Ready(_))));

        monitor.untrack(&city("Dalian"));
        assert_eq!(monitor.report(&city("Dalian")), None);
        monitor.stop();
    }

    #[test]
    fn test_untrack_drops_fetch_in_flight() {
        let mut monitor = WeatherMonitor::new(Source::Offline, Duration::from_secs(3600));
        monitor.start(&[city("Wuhan")]);
        monitor.track(city("Dalian"));
        monitor.untrack(&city("Dalian"));
        monitor.refresh();

        // Initial fetch, the Dalian fetch, then the refresh of Wuhan.
        let deadline = Instant::now() + Duration::from_secs(5);
        while monitor.generation() < 3 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(monitor.generation(), 3);
        assert_eq!(monitor.report(&city("Dalian")), None);
        assert!(matches!(monitor.report(&city("Wuhan")), Some(Report::Ready(_))));
        monitor.stop();
    }
}
