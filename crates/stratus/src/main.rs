mod dashboard;
mod format;
mod weather;

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local, Utc};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use directories::ProjectDirs;
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, BorderType, Clear, Paragraph},
};
use stratus_animations::AnimationManager;
use stratus_config::{City, Config};
use stratus_core::CardId;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::dashboard::{CardView, Dashboard, Direction};
use crate::format::{
    capitalize, clock_time, day_name, format_chance_of_rain, format_humidity, format_pressure,
    format_temp, format_wind, hour_label, long_date, short_date, uv_level, wind_direction,
};
use crate::weather::{CityWeather, Report, Source, WeatherMonitor};

/// Time between animation frames (~60 Hz).
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

const ACCENT: Color = Color::Yellow;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    init_logging();
    let config = Config::load()?;
    let terminal = ratatui::init();
    let result = App::new(config, Config::default_path().ok()).run(terminal);
    ratatui::restore();
    result
}

/// Log to a file in the data directory; the terminal belongs to the UI.
///
/// The filter comes from `STRATUS_LOG`, then `RUST_LOG`, defaulting to `warn`.
fn init_logging() {
    let Some(dirs) = ProjectDirs::from("", "", "stratus") else {
        return;
    };
    let dir = dirs.data_dir();
    let file = fs::create_dir_all(dir).and_then(|()| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join("stratus.log"))
    });
    let Ok(file) = file else {
        return;
    };

    let filter = EnvFilter::try_from_env("STRATUS_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .compact()
        .try_init();
}

/// What the keyboard is currently driving.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode {
    Browse,
    Detail(CardId),
    AddCity(String),
}

/// The main application which holds the state and logic of the application.
#[derive(Debug)]
pub struct App {
    /// Is the application running?
    running: bool,
    config: Config,
    /// Where to persist config changes, if anywhere.
    config_path: Option<PathBuf>,
    dashboard: Dashboard,
    animations: AnimationManager,
    weather: WeatherMonitor,
    /// Latest weather per card.
    reports: HashMap<CardId, Report>,
    /// Weather generation the reports were copied at.
    weather_generation: u64,
    /// Restart every card's animation before the next frame.
    needs_rerender: bool,
    mode: Mode,
    /// One-line message shown in the footer.
    status: Option<String>,
}

impl App {
    /// Construct a new instance of [`App`].
    pub fn new(config: Config, config_path: Option<PathBuf>) -> Self {
        let source = if config.offline {
            Source::Offline
        } else {
            Source::Network
        };
        Self {
            running: false,
            dashboard: Dashboard::new(&config.cities),
            animations: AnimationManager::new(),
            weather: WeatherMonitor::new(source, config.refresh_interval()),
            reports: HashMap::new(),
            weather_generation: 0,
            needs_rerender: true,
            mode: Mode::Browse,
            status: None,
            config,
            config_path,
        }
    }

    /// Run the application's main loop.
    pub fn run(mut self, mut terminal: DefaultTerminal) -> color_eyre::Result<()> {
        self.running = true;
        self.weather.start(&self.config.cities);
        let mut next_frame = Instant::now();

        while self.running {
            self.poll_weather();
            terminal.draw(|frame| self.render(frame))?;
            if self.needs_rerender {
                self.rerender();
            }

            self.handle_crossterm_events(next_frame.saturating_duration_since(Instant::now()))?;
            if Instant::now() >= next_frame {
                self.animations.tick();
                next_frame = Instant::now() + FRAME_INTERVAL;
            }
        }

        self.animations.detach_all(&mut self.dashboard);
        self.weather.stop();
        Ok(())
    }

    /// Pick up weather that arrived since the last frame.
    fn poll_weather(&mut self) {
        let generation = self.weather.generation();
        if generation == self.weather_generation {
            return;
        }
        self.weather_generation = generation;
        self.reports = self
            .dashboard
            .cards()
            .iter()
            .filter_map(|card| {
                self.weather
                    .report(card.city())
                    .map(|report| (card.id(), report))
            })
            .collect();
        self.needs_rerender = true;
    }

    /// Tear down every animation and start one per card with weather.
    fn rerender(&mut self) {
        self.needs_rerender = false;
        self.animations.detach_all(&mut self.dashboard);
        if !self.config.animations {
            return;
        }

        let targets: Vec<(CardId, String, bool, f64)> = self
            .dashboard
            .cards()
            .iter()
            .filter_map(|card| match self.reports.get(&card.id()) {
                Some(Report::Ready(weather)) => Some((
                    card.id(),
                    weather.description.clone(),
                    weather.is_daytime,
                    weather.temp_c,
                )),
                _ => None,
            })
            .collect();
        for (card, condition, is_daytime, temp_c) in targets {
            self.animations
                .attach(&mut self.dashboard, card, &condition, is_daytime, temp_c);
        }
    }

    /// Renders the user interface.
    fn render(&mut self, frame: &mut Frame) {
        let [header, body, footer] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        self.render_header(frame, header);

        if self.dashboard.layout(body) {
            self.needs_rerender = true;
        }
        if self.dashboard.cards().is_empty() {
            let hint = Paragraph::new("No cities yet. Press a to add one.")
                .dark_gray()
                .centered();
            frame.render_widget(hint, body);
        }
        let selected = self.dashboard.selected().map(|card| card.id());
        let now = Utc::now();
        for card in self.dashboard.cards() {
            let Some(area) = card.area() else {
                continue;
            };
            let view = CardView::new(card, self.reports.get(&card.id()), self.config.units)
                .surface(self.animations.surface(card.id()))
                .selected(selected == Some(card.id()))
                .clock(now);
            frame.render_widget(view, area);
        }

        if let Mode::Detail(id) = self.mode {
            self.render_detail(frame, body, id, now);
        }
        self.render_footer(frame, footer);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let mut tags = vec![Span::from(self.config.units.symbol()).dark_gray()];
        if self.config.offline {
            tags.push(Span::from("  offline").dark_gray());
        }
        if !self.config.animations {
            tags.push(Span::from("  paused").dark_gray());
        }
        let title = Line::from(
            [
                vec![Span::from(" stratus ").bold().fg(ACCENT), Span::from(" ")],
                tags,
            ]
            .concat(),
        );
        frame.render_widget(title, area);

        let clock = Local::now().format("%a %d %b %H:%M:%S ").to_string();
        frame.render_widget(Line::from(clock).dark_gray().right_aligned(), area);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let line = match &self.mode {
            Mode::AddCity(input) => Line::from(vec![
                "Add city: ".bold().fg(ACCENT),
                Span::from(format!("{input}█")),
                "  Enter add  Esc cancel".dark_gray(),
            ]),
            _ => match &self.status {
                Some(status) => Line::from(status.as_str()).fg(ACCENT),
                None => Line::from(vec![
                    "q".bold().fg(ACCENT),
                    " quit  ".dark_gray(),
                    "⏎".bold().fg(ACCENT),
                    " details  ".dark_gray(),
                    "a".bold().fg(ACCENT),
                    " add  ".dark_gray(),
                    "d".bold().fg(ACCENT),
                    " remove  ".dark_gray(),
                    "r".bold().fg(ACCENT),
                    " refresh  ".dark_gray(),
                    "u".bold().fg(ACCENT),
                    " units  ".dark_gray(),
                    "p".bold().fg(ACCENT),
                    " animations".dark_gray(),
                ]),
            },
        };
        frame.render_widget(line.centered(), area);
    }

    fn render_detail(&self, frame: &mut Frame, area: Rect, id: CardId, now: DateTime<Utc>) {
        let Some(card) = self.dashboard.card(id) else {
            return;
        };
        let [modal] = Layout::horizontal([Constraint::Percentage(80)])
            .flex(Flex::Center)
            .areas(area);
        let [modal] = Layout::vertical([Constraint::Percentage(90)])
            .flex(Flex::Center)
            .areas(modal);

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::new().fg(ACCENT))
            .title(Line::from(format!(" {} ", card.city().label())).bold())
            .title_bottom(
                Line::from(vec![
                    " d".bold().fg(ACCENT),
                    " remove  ".dark_gray(),
                    "Esc".bold().fg(ACCENT),
                    " close ".dark_gray(),
                ])
                .right_aligned(),
            );
        let inner = block.inner(modal);
        frame.render_widget(Clear, modal);
        frame.render_widget(block, modal);

        let weather = match self.reports.get(&id) {
            Some(Report::Ready(weather)) => weather,
            Some(Report::Unavailable(reason)) => {
                let text = format!("Weather unavailable: {reason}");
                frame.render_widget(Paragraph::new(text).light_red(), inner);
                return;
            }
            None => {
                frame.render_widget(Paragraph::new("Loading…").dark_gray(), inner);
                return;
            }
        };

        let [details, hourly] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Fill(1)]).areas(inner);
        frame.render_widget(Paragraph::new(self.detail_lines(weather, now)), details);
        frame.render_widget(Paragraph::new(self.hourly_lines(weather)), hourly);
    }

    fn detail_lines(&self, weather: &CityWeather, now: DateTime<Utc>) -> Vec<Line<'static>> {
        let unit = self.config.units;
        let local = weather.local_time(now);
        let uv = uv_level(weather.uv_index);
        let row = |label: &str, value: String| {
            Line::from(vec![Span::from(format!("{label:<13}")).dark_gray(), Span::from(value)])
        };

        let mut lines = vec![
            Line::from(capitalize(&weather.description)).bold(),
            Line::default(),
            row("Local time", clock_time(&local)),
            row("Date", long_date(&local)),
            row("Temperature", format_temp(weather.temp_c, unit)),
            row("Feels like", format_temp(weather.feels_like_c, unit)),
            row("Humidity", format_humidity(weather.humidity)),
            row(
                "Wind",
                format!(
                    "{} {}",
                    format_wind(weather.wind_kmph),
                    wind_direction(weather.wind_degrees)
                ),
            ),
            row("Pressure", format_pressure(weather.pressure_mb)),
            Line::from(vec![
                Span::from(format!("{:<13}", "UV index")).dark_gray(),
                Span::from(format!("{:.0} ", weather.uv_index)),
                Span::from(uv.label()).fg(uv.color()),
            ]),
            row("Updated", weather.fetched_at.format("%H:%M").to_string()),
            Line::default(),
            Line::from("Forecast").bold().fg(ACCENT),
        ];

        let today = local.date_naive();
        lines.extend(weather.daily.iter().map(|day| {
            Line::from(vec![
                Span::from(format!("{:<10}", day_name(day.date, today))),
                Span::from(format!("{:<8}", short_date(day.date))).dark_gray(),
                Span::from(format!(
                    "{} / {}  ",
                    format_temp(day.max_c, unit),
                    format_temp(day.min_c, unit)
                )),
                Span::from(capitalize(&day.description)).dark_gray(),
            ])
        }));
        lines
    }

    fn hourly_lines(&self, weather: &CityWeather) -> Vec<Line<'static>> {
        let unit = self.config.units;
        let mut lines = vec![Line::from("Hourly").bold().fg(ACCENT)];
        lines.extend(weather.hourly.iter().map(|hour| {
            Line::from(vec![
                Span::from(format!("{:<7}", short_date(hour.date))).dark_gray(),
                Span::from(format!("{:>6}  ", hour_label(hour.hour))),
                Span::from(format!("{:>6}  ", format_temp(hour.temp_c, unit))),
                Span::from(capitalize(&hour.description)),
                Span::from(format!("  {}", format_chance_of_rain(hour.chance_of_rain))).blue(),
            ])
        }));
        lines
    }

    /// Reads the crossterm events and updates the state of [`App`].
    /// Waits at most `timeout` so animation frames stay on schedule.
    fn handle_crossterm_events(&mut self, timeout: Duration) -> color_eyre::Result<()> {
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key_event(key),
                Event::Mouse(_) => {}
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
        Ok(())
    }

    /// Handles the key events and updates the state of [`App`].
    fn on_key_event(&mut self, key: KeyEvent) {
        if key.modifiers == KeyModifiers::CONTROL
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
        {
            self.quit();
            return;
        }

        match self.mode.clone() {
            Mode::AddCity(input) => self.on_input_key(key, input),
            Mode::Detail(id) => match key.code {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => self.mode = Mode::Browse,
                KeyCode::Char('d') => self.remove_card(id),
                _ => {}
            },
            Mode::Browse => {
                self.status = None;
                match key.code {
                    KeyCode::Esc | KeyCode::Char('q') => self.quit(),
                    KeyCode::Left | KeyCode::Char('h') => self.dashboard.select(Direction::Left),
                    KeyCode::Right | KeyCode::Char('l') => self.dashboard.select(Direction::Right),
                    KeyCode::Up | KeyCode::Char('k') => self.dashboard.select(Direction::Up),
                    KeyCode::Down | KeyCode::Char('j') => self.dashboard.select(Direction::Down),
                    KeyCode::Enter => {
                        if let Some(card) = self.dashboard.selected() {
                            self.mode = Mode::Detail(card.id());
                        }
                    }
                    KeyCode::Char('a') => self.mode = Mode::AddCity(String::new()),
                    KeyCode::Char('d') => {
                        if let Some(id) = self.dashboard.selected().map(|card| card.id()) {
                            self.remove_card(id);
                        }
                    }
                    KeyCode::Char('r') => {
                        self.weather.refresh();
                        self.status = Some("Refreshing weather…".to_string());
                    }
                    KeyCode::Char('u') => self.toggle_units(),
                    KeyCode::Char('p') => self.toggle_animations(),
                    _ => {}
                }
            }
        }
    }

    fn on_input_key(&mut self, key: KeyEvent, mut input: String) {
        match key.code {
            KeyCode::Esc => self.mode = Mode::Browse,
            KeyCode::Enter => {
                self.mode = Mode::Browse;
                self.add_city(&input);
            }
            KeyCode::Backspace => {
                input.pop();
                self.mode = Mode::AddCity(input);
            }
            KeyCode::Char(c) => {
                input.push(c);
                self.mode = Mode::AddCity(input);
            }
            _ => {}
        }
    }

    /// Add a city typed as "Name" or "Name, Country".
    fn add_city(&mut self, input: &str) {
        let (name, country) = input.split_once(',').unwrap_or((input, ""));
        if name.trim().is_empty() {
            return;
        }
        if !self.config.add_city(City::new(name, country)) {
            self.status = Some(format!("{} is already on the dashboard", name.trim()));
            return;
        }
        let Some(city) = self.config.cities.last().cloned() else {
            return;
        };
        info!(city = %city.label(), "added city");

        self.dashboard.push(city.clone());
        self.dashboard.select_last();
        self.weather.track(city);
        self.needs_rerender = true;
        self.save_config();
    }

    fn remove_card(&mut self, id: CardId) {
        self.animations.detach(&mut self.dashboard, id);
        let Some(card) = self.dashboard.remove(id) else {
            return;
        };
        info!(city = %card.city().label(), "removed city");

        self.config.remove_city(&card.city().name);
        self.weather.untrack(card.city());
        self.reports.remove(&id);
        if self.mode == Mode::Detail(id) {
            self.mode = Mode::Browse;
        }
        self.needs_rerender = true;
        self.save_config();
    }

    fn toggle_units(&mut self) {
        self.config.units = self.config.units.toggle();
        self.save_config();
    }

    fn toggle_animations(&mut self) {
        self.config.animations = !self.config.animations;
        self.needs_rerender = true;
        self.save_config();
    }

    fn save_config(&mut self) {
        let Some(path) = &self.config_path else {
            return;
        };
        if let Err(err) = self.config.save_to(path) {
            warn!(error = %err, "failed to save config");
            self.status = Some(format!("Could not save settings: {err}"));
        }
    }

    /// Set running to false to quit the application.
    fn quit(&mut self) {
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::synthetic_weather;
    use chrono::{FixedOffset, TimeZone};
    use ratatui::{Terminal, backend::TestBackend};
    use stratus_core::TemperatureUnit;

    fn test_app(cities: &[&str], path: Option<PathBuf>) -> App {
        let config = Config {
            cities: cities.iter().map(|name| City::new(*name, "")).collect(),
            offline: true,
            ..Config::default()
        };
        App::new(config, path)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.on_key_event(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    /// Give every card generated weather, as if the monitor had reported.
    fn fill_reports(app: &mut App) {
        for card in app.dashboard.cards() {
            let weather = synthetic_weather(card.city(), Local::now());
            app.reports.insert(card.id(), Report::Ready(weather));
        }
        app.needs_rerender = true;
    }

    fn draw(app: &mut App) {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).expect("terminal");
        terminal.draw(|frame| app.render(frame)).expect("draw");
        if app.needs_rerender {
            app.rerender();
        }
    }

    #[test]
    fn test_rerender_attaches_one_animation_per_card() {
        let mut app = test_app(&["Minsk", "Tallinn", "Harbin"], None);
        draw(&mut app);
        assert!(app.animations.is_empty());

        fill_reports(&mut app);
        draw(&mut app);
        assert_eq!(app.animations.len(), 3);
        for card in app.dashboard.cards() {
            let surface = app.animations.surface(card.id()).expect("surface");
            assert!(!surface.size().is_empty());
        }

        for _ in 0..5 {
            app.needs_rerender = true;
            draw(&mut app);
        }
        assert_eq!(app.animations.len(), 3);
        assert_eq!(app.animations.running_loops(), 3);
    }

    #[test]
    fn test_toggle_animations_detaches_everything() {
        let mut app = test_app(&["Minsk", "Tallinn"], None);
        fill_reports(&mut app);
        draw(&mut app);
        assert_eq!(app.animations.len(), 2);

        press(&mut app, KeyCode::Char('p'));
        draw(&mut app);
        assert!(app.animations.is_empty());
        assert_eq!(app.animations.running_loops(), 0);

        press(&mut app, KeyCode::Char('p'));
        draw(&mut app);
        assert_eq!(app.animations.len(), 2);
    }

    #[test]
    fn test_add_city_from_input() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        let mut app = test_app(&["Minsk"], Some(path.clone()));

        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "Xi'an, Chinaa");
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.mode, Mode::Browse);
        assert_eq!(app.dashboard.cards().len(), 2);
        assert_eq!(
            app.dashboard.selected().map(|card| card.city().clone()),
            Some(City::new("Xi'an", "China"))
        );
        let saved = Config::load_from(&path).expect("load");
        assert_eq!(saved.cities, app.config.cities);

        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "minsk");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.dashboard.cards().len(), 2);
        assert!(app.status.is_some());
    }

    #[test]
    fn test_escape_cancels_input() {
        let mut app = test_app(&["Minsk"], None);
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "Oryol");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.mode, Mode::Browse);
        assert_eq!(app.config.cities.len(), 1);
    }

    #[test]
    fn test_remove_from_detail_modal() {
        let mut app = test_app(&["Minsk", "Kursk"], None);
        fill_reports(&mut app);
        draw(&mut app);

        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Enter);
        let id = app.dashboard.cards()[1].id();
        assert_eq!(app.mode, Mode::Detail(id));
        draw(&mut app);

        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.mode, Mode::Browse);
        assert!(app.animations.surface(id).is_none());
        assert!(!app.reports.contains_key(&id));
        assert_eq!(app.config.cities, vec![City::new("Minsk", "")]);

        draw(&mut app);
        assert_eq!(app.animations.len(), 1);
    }

    #[test]
    fn test_toggle_units() {
        let mut app = test_app(&["Minsk"], None);
        press(&mut app, KeyCode::Char('u'));
        assert_eq!(app.config.units, TemperatureUnit::Fahrenheit);
        press(&mut app, KeyCode::Char('u'));
        assert_eq!(app.config.units, TemperatureUnit::Celsius);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = test_app(&[], None);
        app.running = true;
        app.on_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(!app.running);

        let mut app = test_app(&[], None);
        app.running = true;
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.running);
    }

    #[test]
    fn test_detail_modal_renders_forecast() {
        let mut app = test_app(&["Beijing"], None);
        fill_reports(&mut app);
        draw(&mut app);
        press(&mut app, KeyCode::Enter);

        let mut terminal = Terminal::new(TestBackend::new(120, 40)).expect("terminal");
        terminal.draw(|frame| app.render(frame)).expect("draw");
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(text.contains("Forecast"));
        assert!(text.contains("Hourly"));
        assert!(text.contains("Today"));
        assert!(text.contains("Humidity"));
        assert!(text.contains("Local time"));
    }

    #[test]
    fn test_detail_lines_show_city_clock() {
        let mut app = test_app(&["Beijing"], None);
        fill_reports(&mut app);
        let Some(Report::Ready(mut weather)) = app.reports.values().next().cloned() else {
            panic!("expected weather");
        };
        weather.utc_offset = FixedOffset::east_opt(8 * 3600).expect("offset");
        let now = Utc
            .with_ymd_and_hms(2024, 5, 14, 20, 7, 0)
            .single()
            .expect("utc time");

        let text: String = app
            .detail_lines(&weather, now)
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        assert!(text.contains("04:07 AM"), "{text}");
        assert!(text.contains("Wednesday, May 15, 2024"), "{text}");
    }
}
