//! The grid of city cards.

use chrono::{DateTime, Utc};
use ratatui::{
    buffer::Buffer,
    layout::{Margin, Rect},
    style::{Color, Style, Stylize},
    text::Line,
    widgets::{Block, BorderType, Paragraph, Widget},
};
use stratus_animations::{CardHost, Surface, SurfaceView, hsl_to_rgb};
use stratus_config::City;
use stratus_core::{CardId, Size, SurfaceId, TemperatureUnit, TimeOfDay};

use crate::format::{capitalize, clock_time, format_temp};
use crate::weather::Report;

/// Card size in cells, borders included.
pub const CARD_WIDTH: u16 = 32;
pub const CARD_HEIGHT: u16 = 9;

/// Something drawn inside a card, bottom to top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardLayer {
    Animation(SurfaceId),
    Content,
}

/// One city card.
#[derive(Debug, Clone)]
pub struct Card {
    id: CardId,
    city: City,
    /// Where the card was last laid out, `None` when off screen.
    area: Option<Rect>,
    layers: Vec<CardLayer>,
}

impl Card {
    pub fn id(&self) -> CardId {
        self.id
    }

    pub fn city(&self) -> &City {
        &self.city
    }

    pub fn area(&self) -> Option<Rect> {
        self.area
    }

    pub fn layers(&self) -> &[CardLayer] {
        &self.layers
    }

    /// The part of the card inside its border.
    pub fn inner(&self) -> Option<Rect> {
        self.area
            .map(|area| area.inner(Margin::new(1, 1)))
            .filter(|inner| !inner.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

/// Cards in display order plus selection and scroll state.
#[derive(Debug, Default)]
pub struct Dashboard {
    cards: Vec<Card>,
    next_id: u64,
    selected: usize,
    columns: u16,
    scroll_row: u16,
}

impl Dashboard {
    pub fn new(cities: &[City]) -> Self {
        let mut dashboard = Self::default();
        for city in cities {
            dashboard.push(city.clone());
        }
        dashboard
    }

    /// Append a card for `city`. Ids are never reused.
    pub fn push(&mut self, city: City) -> CardId {
        self.next_id += 1;
        let id = CardId::new(self.next_id);
        self.cards.push(Card {
            id,
            city,
            area: None,
            layers: vec![CardLayer::Content],
        });
        id
    }

    pub fn remove(&mut self, id: CardId) -> Option<Card> {
        let index = self.cards.iter().position(|card| card.id == id)?;
        let card = self.cards.remove(index);
        if self.selected >= self.cards.len() {
            self.selected = self.cards.len().saturating_sub(1);
        }
        Some(card)
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.iter().find(|card| card.id == id)
    }

    pub fn selected(&self) -> Option<&Card> {
        self.cards.get(self.selected)
    }

    /// Select the last card.
    pub fn select_last(&mut self) {
        self.selected = self.cards.len().saturating_sub(1);
    }

    /// Move the selection within the grid.
    pub fn select(&mut self, direction: Direction) {
        let Some(last) = self.cards.len().checked_sub(1) else {
            return;
        };
        let columns = usize::from(self.columns.max(1));
        let current = self.selected;
        self.selected = match direction {
            Direction::Left => current.saturating_sub(1),
            Direction::Right => (current + 1).min(last),
            Direction::Up => current.checked_sub(columns).unwrap_or(current),
            Direction::Down if current + columns <= last => current + columns,
            Direction::Down => current,
        };
    }

    /// Place the cards in `area`, scrolling to keep the selection visible.
    ///
    /// Returns `true` if any card moved, appeared or disappeared.
    pub fn layout(&mut self, area: Rect) -> bool {
        let columns = (area.width / CARD_WIDTH).max(1);
        let visible_rows = (area.height / CARD_HEIGHT).max(1);
        self.columns = columns;

        let selected_row = (self.selected / usize::from(columns)) as u16;
        if selected_row < self.scroll_row {
            self.scroll_row = selected_row;
        } else if selected_row >= self.scroll_row + visible_rows {
            self.scroll_row = selected_row + 1 - visible_rows;
        }

        let mut changed = false;
        for (index, card) in self.cards.iter_mut().enumerate() {
            let row = (index / usize::from(columns)) as u16;
            let column = (index % usize::from(columns)) as u16;
            let placed = (row >= self.scroll_row && row < self.scroll_row + visible_rows)
                .then(|| {
                    Rect::new(
                        area.x + column * CARD_WIDTH,
                        area.y + (row - self.scroll_row) * CARD_HEIGHT,
                        CARD_WIDTH,
                        CARD_HEIGHT,
                    )
                    .intersection(area)
                })
                .filter(|rect| !rect.is_empty());
            if card.area != placed {
                card.area = placed;
                changed = true;
            }
        }
        changed
    }

    fn card_mut(&mut self, id: CardId) -> Option<&mut Card> {
        self.cards.iter_mut().find(|card| card.id == id)
    }
}

impl CardHost for Dashboard {
    fn rendered_size(&self, card: CardId) -> Size {
        self.card(card)
            .and_then(Card::inner)
            .map_or(Size::ZERO, |inner| Size::from_cells(inner.width, inner.height))
    }

    fn insert_surface(&mut self, card: CardId, surface: SurfaceId) {
        if let Some(card) = self.card_mut(card) {
            card.layers.insert(0, CardLayer::Animation(surface));
        }
    }

    fn remove_surface(&mut self, card: CardId, surface: SurfaceId) {
        if let Some(card) = self.card_mut(card) {
            card.layers
                .retain(|layer| *layer != CardLayer::Animation(surface));
        }
    }
}

/// Card background, picked from the condition text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardTheme {
    ClearDay,
    ClearNight,
    CloudyDay,
    CloudyNight,
    Rainy,
    Snowy,
    Stormy,
    Misty,
    Default,
}

impl CardTheme {
    pub fn for_condition(condition: &str, is_daytime: bool) -> Self {
        let c = condition.to_lowercase();
        if c.contains("clear") {
            if is_daytime { Self::ClearDay } else { Self::ClearNight }
        } else if c.contains("cloud") {
            if is_daytime { Self::CloudyDay } else { Self::CloudyNight }
        } else if c.contains("rain") || c.contains("drizzle") {
            Self::Rainy
        } else if c.contains("snow") {
            Self::Snowy
        } else if c.contains("thunder") {
            Self::Stormy
        } else if c.contains("mist") || c.contains("fog") || c.contains("haze") {
            Self::Misty
        } else {
            Self::Default
        }
    }

    pub fn background(self) -> Color {
        match self {
            Self::ClearDay => hsl_to_rgb(205.0, 0.55, 0.38),
            Self::ClearNight => hsl_to_rgb(232.0, 0.45, 0.16),
            Self::CloudyDay => hsl_to_rgb(210.0, 0.15, 0.38),
            Self::CloudyNight => hsl_to_rgb(220.0, 0.2, 0.18),
            Self::Rainy => hsl_to_rgb(215.0, 0.3, 0.24),
            Self::Snowy => hsl_to_rgb(200.0, 0.25, 0.42),
            Self::Stormy => hsl_to_rgb(262.0, 0.3, 0.17),
            Self::Misty => hsl_to_rgb(0.0, 0.0, 0.34),
            Self::Default => hsl_to_rgb(198.0, 0.4, 0.27),
        }
    }
}

/// Renders one card: border, then each layer in order.
#[derive(Debug, Clone, Copy)]
pub struct CardView<'a> {
    card: &'a Card,
    report: Option<&'a Report>,
    surface: Option<&'a Surface>,
    unit: TemperatureUnit,
    selected: bool,
    /// Instant the city clock is shown for.
    now: DateTime<Utc>,
}

impl<'a> CardView<'a> {
    pub fn new(card: &'a Card, report: Option<&'a Report>, unit: TemperatureUnit) -> Self {
        Self {
            card,
            report,
            surface: None,
            unit,
            selected: false,
            now: Utc::now(),
        }
    }

    pub fn surface(mut self, surface: Option<&'a Surface>) -> Self {
        self.surface = surface;
        self
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    pub fn clock(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    fn render_content(&self, area: Rect, buf: &mut Buffer) {
        let city = self.card.city();
        let mut lines = vec![
            Line::from(city.name.as_str()).bold().white(),
            Line::from(city.country.as_str()).gray(),
            Line::default(),
        ];

        match self.report {
            Some(Report::Ready(weather)) => {
                let temp = format_temp(weather.temp_c, self.unit);
                let time = clock_time(&weather.local_time(self.now));
                Paragraph::new(vec![
                    Line::from(temp).bold().white().right_aligned(),
                    Line::from(time).gray().right_aligned(),
                ])
                .render(area, buf);

                let time_of_day = TimeOfDay::from_daytime(weather.is_daytime);
                let icon = if time_of_day.is_day() { "☀" } else { "☾" };
                lines.push(Line::from(capitalize(&weather.description)).white());
                lines.push(
                    Line::from(format!(
                        "Feels like {}",
                        format_temp(weather.feels_like_c, self.unit)
                    ))
                    .gray(),
                );
                lines.push(Line::default());
                lines.push(Line::from(format!("{icon} {}", time_of_day.label())).white());
            }
            Some(Report::Unavailable(_)) => {
                lines.push(Line::from("Weather unavailable").light_red());
            }
            None => lines.push(Line::from("Loading…").gray()),
        }

        Paragraph::new(lines).render(area, buf);
    }
}

impl Widget for CardView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let backdrop = match self.report {
            Some(Report::Ready(weather)) => {
                CardTheme::for_condition(&weather.description, weather.is_daytime)
            }
            _ => CardTheme::Default,
        }
        .background();
        let border = if self.selected {
            Color::Yellow
        } else {
            Color::DarkGray
        };

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::new().fg(border))
            .style(Style::new().bg(backdrop));
        let inner = block.inner(area);
        block.render(area, buf);

        for layer in self.card.layers() {
            match *layer {
                CardLayer::Animation(id) => {
                    if let Some(surface) = self.surface.filter(|surface| surface.id() == id) {
                        SurfaceView::new(surface)
                            .backdrop(backdrop)
                            .render(inner, buf);
                    }
                }
                CardLayer::Content => self.render_content(inner, buf),
            }
        }
    }
}
