use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend, layout::Rect};
use tracing::{debug, info};

use crate::config;
use crate::overlay::{OverlayTuning, Presenter, ScrollField};
use crate::source::{Poller, SourceMsg};
use crate::ui::{self, Appearance, OverlayView, Placement};

use super::timers::Ticker;

/// Upper bound on one wait for input, so queued source messages are never
/// left sitting for long.
const MAX_WAIT: Duration = Duration::from_millis(100);

/// What a key press asks the loop to do beyond updating local state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    None,
    Refresh,
    Quit,
}

/// State owned by the event loop: the presenter, the view it renders into,
/// where the card sits and the three presentation timers.
pub struct EventLoopState {
    pub presenter: Presenter,
    pub view: OverlayView,
    pub placement: Placement,
    pub appearance: Appearance,
    fade: Ticker,
    scroll: Ticker,
    progress: Ticker,
    /// Set once the poller side of the channel is gone.
    pub source_closed: bool,
}

impl EventLoopState {
    pub fn new(settings: &config::Settings, now: Instant) -> Self {
        let o = &settings.overlay;
        let tuning = OverlayTuning {
            target_opacity: o.opacity,
            fade_step: o.fade_step,
            max_text_length: o.max_text_length,
        };
        Self {
            presenter: Presenter::new(tuning, now),
            view: OverlayView::default(),
            placement: Placement::from_settings(o),
            appearance: Appearance::from_settings(&settings.appearance),
            fade: Ticker::from_millis(o.fade_tick_ms, now),
            scroll: Ticker::from_millis(o.scroll_tick_ms, now),
            progress: Ticker::from_millis(o.progress_tick_ms, now),
            source_closed: false,
        }
    }

    pub fn apply(&mut self, msg: SourceMsg, now: Instant) {
        match msg {
            SourceMsg::Snapshot(snapshot) => {
                self.presenter.on_snapshot(snapshot, now, &mut self.view);
            }
            SourceMsg::Artwork { url, image } => {
                self.presenter.on_artwork(url, image, &mut self.view);
            }
        }
        debug!(phase = ?self.presenter.phase(), "source message applied");
    }

    /// Apply every queued source message. Returns how many were applied.
    pub fn drain(&mut self, rx: &Receiver<SourceMsg>) -> usize {
        let mut applied = 0;
        loop {
            match rx.try_recv() {
                Ok(msg) => {
                    self.apply(msg, Instant::now());
                    applied += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.source_closed {
                        debug!("poller channel closed");
                        self.source_closed = true;
                    }
                    break;
                }
            }
        }
        applied
    }

    /// Run every timer that is due at `now`, each at most once.
    pub fn run_due_ticks(&mut self, now: Instant) {
        if self.fade.fire(now) {
            self.presenter.tick_fade(now, &mut self.view);
        }
        if self.scroll.fire(now) {
            self.presenter.tick_scroll(&mut self.view);
        }
        if self.progress.fire(now) {
            self.presenter.tick_progress(now, &mut self.view);
        }
    }

    /// Earliest timer the loop has to wake for. The fade timer only counts
    /// while a fade runs.
    pub fn next_deadline(&self) -> Instant {
        let next = self.scroll.next_due().min(self.progress.next_due());
        if self.presenter.is_fading() {
            next.min(self.fade.next_due())
        } else {
            next
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, screen: Rect) -> KeyAction {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return KeyAction::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return KeyAction::Quit;
            }
            KeyCode::Char('r') => return KeyAction::Refresh,
            KeyCode::Char('t') => self.presenter.toggle_scroll_paused(ScrollField::Track),
            KeyCode::Char('a') => self.presenter.toggle_scroll_paused(ScrollField::Artist),
            KeyCode::Left => self.move_card(-1, 0, screen),
            KeyCode::Right => self.move_card(1, 0, screen),
            KeyCode::Up => self.move_card(0, -1, screen),
            KeyCode::Down => self.move_card(0, 1, screen),
            _ => {}
        }
        KeyAction::None
    }

    fn move_card(&mut self, dx: i32, dy: i32, screen: Rect) {
        self.placement.nudge(dx, dy, screen);
        self.view.mark_dirty();
    }
}

/// Main terminal event loop. Source messages are applied one at a time
/// between timer ticks; returns `Ok(())` when quit is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut EventLoopState,
    poller: &Poller,
    rx: &Receiver<SourceMsg>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        state.drain(rx);
        state.run_due_ticks(Instant::now());

        if state.view.take_dirty() {
            terminal.draw(|f| ui::draw(f, &state.view, &state.placement, &state.appearance))?;
        }

        let wait = state
            .next_deadline()
            .saturating_duration_since(Instant::now())
            .min(MAX_WAIT);
        if !event::poll(wait)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                let size = terminal.size()?;
                let screen = Rect::new(0, 0, size.width, size.height);
                match state.handle_key(key, screen) {
                    KeyAction::Quit => break,
                    KeyAction::Refresh => {
                        info!("manual refresh");
                        poller.refresh();
                    }
                    KeyAction::None => {}
                }
            }
            Event::Resize(..) => state.view.mark_dirty(),
            _ => {}
        }
    }

    Ok(())
}
