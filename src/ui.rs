//! Terminal rendering of the now-playing card.
//!
//! `OverlayView` is the `Renderer` the presentation core writes into; `draw`
//! paints whatever it holds with `ratatui`. Opacity is emulated by blending
//! every colour towards black.

use std::sync::Arc;

use ratatui::{
    Frame,
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Clear, Gauge, Paragraph},
};

use crate::config::{AppearanceSettings, OverlaySettings};
use crate::overlay::{ArtworkImage, Renderer};

const CARD_BACKGROUND: Color = Color::Rgb(24, 24, 24);
const CARD_BORDER: Color = Color::Rgb(64, 64, 64);
const GAUGE_TRACK: Color = Color::Rgb(83, 83, 83);
const UPPER_HALF_BLOCK: &str = "▀";

/// Everything the card shows, as last set through `Renderer`.
#[derive(Debug, Clone)]
pub struct OverlayView {
    artwork: Option<Arc<ArtworkImage>>,
    track: String,
    artist: String,
    fraction: f64,
    opacity: f32,
    elapsed: String,
    total: String,
    dirty: bool,
}

impl Default for OverlayView {
    fn default() -> Self {
        Self {
            artwork: None,
            track: String::new(),
            artist: String::new(),
            fraction: 0.0,
            opacity: 0.0,
            elapsed: "0:00".to_string(),
            total: "0:00".to_string(),
            dirty: true,
        }
    }
}

impl OverlayView {
    pub fn artwork(&self) -> Option<&ArtworkImage> {
        self.artwork.as_deref()
    }

    pub fn track(&self) -> &str {
        &self.track
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn elapsed(&self) -> &str {
        &self.elapsed
    }

    pub fn total(&self) -> &str {
        &self.total
    }

    /// Force a redraw, e.g. after the card moved or the terminal resized.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns whether anything changed since the last call and clears the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

impl Renderer for OverlayView {
    fn set_artwork(&mut self, artwork: Option<Arc<ArtworkImage>>) {
        self.artwork = artwork;
        self.dirty = true;
    }

    fn set_track_text(&mut self, text: &str) {
        if self.track != text {
            self.track = text.to_string();
            self.dirty = true;
        }
    }

    fn set_artist_text(&mut self, text: &str) {
        if self.artist != text {
            self.artist = text.to_string();
            self.dirty = true;
        }
    }

    fn set_progress_fraction(&mut self, fraction: f64) {
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        if self.fraction != fraction {
            self.fraction = fraction;
            self.dirty = true;
        }
    }

    fn set_opacity(&mut self, opacity: f32) {
        let opacity = opacity.clamp(0.0, 1.0);
        if self.opacity != opacity {
            self.opacity = opacity;
            self.dirty = true;
        }
    }

    fn set_elapsed_label(&mut self, label: &str) {
        if self.elapsed != label {
            self.elapsed = label.to_string();
            self.dirty = true;
        }
    }

    fn set_total_label(&mut self, label: &str) {
        if self.total != label {
            self.total = label.to_string();
            self.dirty = true;
        }
    }
}

/// Where the card sits on screen. Moved with the arrow keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub width: u16,
    pub height: u16,
    /// Left edge column; negative means horizontally centred.
    pub x: i32,
    pub from_bottom: u16,
}

impl Placement {
    pub fn from_settings(overlay: &OverlaySettings) -> Self {
        Self {
            width: overlay.width,
            height: overlay.height,
            x: overlay.position_x,
            from_bottom: overlay.position_y_from_bottom,
        }
    }

    /// The card's rectangle inside `screen`, shrunk to fit when needed.
    pub fn area(&self, screen: Rect) -> Rect {
        let width = self.width.min(screen.width);
        let height = self.height.min(screen.height);
        let max_x = screen.width - width;
        let x = if self.x < 0 {
            max_x / 2
        } else {
            u16::try_from(self.x).unwrap_or(u16::MAX).min(max_x)
        };
        let y = (screen.height - height).saturating_sub(self.from_bottom);
        Rect {
            x: screen.x + x,
            y: screen.y + y,
            width,
            height,
        }
    }

    /// Move by `dx` columns and `dy` rows (positive is down), staying on screen.
    pub fn nudge(&mut self, dx: i32, dy: i32, screen: Rect) {
        let current = self.area(screen);
        let max_x = i32::from(screen.width - current.width);
        self.x = (i32::from(current.x - screen.x) + dx).clamp(0, max_x);

        let max_from_bottom = i32::from(screen.height - current.height);
        let from_bottom = (i32::from(self.from_bottom) - dy).clamp(0, max_from_bottom);
        self.from_bottom = u16::try_from(from_bottom).unwrap_or(0);
    }
}

/// Resolved colours for the card's text and progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Appearance {
    pub progress: Color,
    pub track: Color,
    pub artist: Color,
    pub time: Color,
}

impl Default for Appearance {
    fn default() -> Self {
        Self::from_settings(&AppearanceSettings::default())
    }
}

impl Appearance {
    /// Unparseable colours fall back to white.
    pub fn from_settings(settings: &AppearanceSettings) -> Self {
        let parse = |s: &str| s.parse::<Color>().unwrap_or(Color::White);
        Self {
            progress: parse(&settings.progress_color),
            track: parse(&settings.track_color),
            artist: parse(&settings.artist_color),
            time: parse(&settings.time_color),
        }
    }
}

/// Approximate RGB for a terminal colour.
fn rgb_of(color: Color) -> [u8; 3] {
    match color {
        Color::Rgb(r, g, b) => [r, g, b],
        Color::Black => [0, 0, 0],
        Color::Red => [128, 0, 0],
        Color::Green => [0, 128, 0],
        Color::Yellow => [128, 128, 0],
        Color::Blue => [0, 0, 128],
        Color::Magenta => [128, 0, 128],
        Color::Cyan => [0, 128, 128],
        Color::Gray => [192, 192, 192],
        Color::DarkGray => [128, 128, 128],
        Color::LightRed => [255, 0, 0],
        Color::LightGreen => [0, 255, 0],
        Color::LightYellow => [255, 255, 0],
        Color::LightBlue => [0, 0, 255],
        Color::LightMagenta => [255, 0, 255],
        Color::LightCyan => [0, 255, 255],
        _ => [255, 255, 255],
    }
}

/// Blend `color` towards black; `opacity` 1.0 keeps it, 0.0 is black.
pub fn fade_color(color: Color, opacity: f32) -> Color {
    fade_rgb(rgb_of(color), opacity)
}

fn fade_rgb([r, g, b]: [u8; 3], opacity: f32) -> Color {
    let k = opacity.clamp(0.0, 1.0);
    let scale = |v: u8| (f32::from(v) * k).round() as u8;
    Color::Rgb(scale(r), scale(g), scale(b))
}

/// Cells reserved for artwork inside a card of the given outer size:
/// roughly square, and never more than a third of the width.
pub fn artwork_cells(card_width: u16, card_height: u16) -> (u16, u16) {
    let inner_h = card_height.saturating_sub(2);
    let inner_w = card_width.saturating_sub(2);
    let cols = inner_h.saturating_mul(2).min(inner_w / 3);
    (cols, inner_h)
}

/// Paint the card described by `view` at `placement`.
pub fn draw(frame: &mut Frame, view: &OverlayView, placement: &Placement, appearance: &Appearance) {
    let area = placement.area(frame.area());
    let opacity = view.opacity();
    if area.width < 3 || area.height < 3 || opacity <= 0.0 {
        return;
    }
    let fade = |c: Color| fade_color(c, opacity);

    let block = Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(fade(CARD_BORDER)))
        .style(Style::default().bg(fade(CARD_BACKGROUND)));
    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    let (art_cols, _) = artwork_cells(area.width, area.height);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(art_cols),
            Constraint::Length(if art_cols > 0 { 2 } else { 0 }),
            Constraint::Min(1),
        ])
        .split(inner);

    match view.artwork() {
        Some(art) => draw_artwork(frame.buffer_mut(), columns[0], art, opacity),
        None if art_cols > 0 => {
            let placeholder = Paragraph::new("♫")
                .alignment(Alignment::Center)
                .style(Style::default().fg(fade(GAUGE_TRACK)));
            let middle = Rect {
                y: columns[0].y + columns[0].height / 2,
                height: 1,
                ..columns[0]
            };
            frame.render_widget(placeholder, middle);
        }
        None => {}
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(columns[2]);

    let track = Line::from(vec![
        Span::styled("♪ ", Style::default().fg(fade(appearance.progress))),
        Span::styled(
            view.track(),
            Style::default()
                .fg(fade(appearance.track))
                .add_modifier(Modifier::BOLD),
        ),
    ]);
    frame.render_widget(Paragraph::new(track), rows[0]);
    frame.render_widget(
        Paragraph::new(view.artist()).style(Style::default().fg(fade(appearance.artist))),
        rows[1],
    );

    let gauge = Gauge::default()
        .gauge_style(
            Style::default()
                .fg(fade(appearance.progress))
                .bg(fade(GAUGE_TRACK)),
        )
        .ratio(view.fraction())
        .label("");
    frame.render_widget(gauge, rows[3]);

    let time_style = Style::default().fg(fade(appearance.time));
    let times = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[4]);
    frame.render_widget(Paragraph::new(view.elapsed()).style(time_style), times[0]);
    frame.render_widget(
        Paragraph::new(view.total())
            .style(time_style)
            .alignment(Alignment::Right),
        times[1],
    );
}

/// Two pixel rows per cell: the upper half block takes the top pixel as
/// foreground and the bottom pixel as background.
fn draw_artwork(buf: &mut Buffer, area: Rect, art: &ArtworkImage, opacity: f32) {
    if area.width == 0 || area.height == 0 || art.width == 0 || art.height == 0 {
        return;
    }
    let px_rows = u32::from(area.height) * 2;
    let sample = |col: u16, px_row: u32| {
        let x = u32::from(col) * art.width / u32::from(area.width);
        let y = px_row * art.height / px_rows;
        art.pixel(x, y).unwrap_or([0, 0, 0])
    };

    for row in 0..area.height {
        for col in 0..area.width {
            let top = sample(col, u32::from(row) * 2);
            let bottom = sample(col, u32::from(row) * 2 + 1);
            if let Some(cell) = buf.cell_mut((area.x + col, area.y + row)) {
                cell.set_symbol(UPPER_HALF_BLOCK)
                    .set_fg(fade_rgb(top, opacity))
                    .set_bg(fade_rgb(bottom, opacity));
            }
        }
    }
}
