use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use super::fade::FadeAnimator;
use super::format::format_time;
use super::marquee::ScrollCursor;
use super::progress::ProgressModel;
use super::render::{ArtworkImage, Renderer};
use super::snapshot::TrackSnapshot;

/// Track line shown (while faded out) once playback stops.
pub const IDLE_TEXT: &str = "No track playing";

/// Parameters the presenter is built with; it never mutates them.
#[derive(Debug, Clone, Copy)]
pub struct OverlayTuning {
    /// Opacity the card fades in to.
    pub target_opacity: f32,
    /// Opacity change per fade tick.
    pub fade_step: f32,
    /// Characters shown before a field starts to scroll.
    pub max_text_length: usize,
}

impl Default for OverlayTuning {
    fn default() -> Self {
        Self {
            target_opacity: 0.85,
            fade_step: 0.05,
            max_text_length: 35,
        }
    }
}

/// Externally observable state of the presenter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Empty,
    Showing(String),
    Transitioning { from: String, to: Option<String> },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ScrollField {
    Track,
    Artist,
}

#[derive(Debug)]
enum Transition {
    Idle,
    /// A track change is pending but another fade still runs; the fade-out
    /// starts as soon as that one completes.
    Waiting(Option<TrackSnapshot>),
    /// Fading out; the payload is swapped in once opacity reaches 0.
    FadingOut(Option<TrackSnapshot>),
}

/// Reconciles polled snapshots into fade, scroll and progress state.
///
/// All mutation happens through `&mut self`, so snapshots, artwork and the
/// three ticks are applied strictly one at a time by whoever owns it.
pub struct Presenter {
    tuning: OverlayTuning,
    current: Option<TrackSnapshot>,
    progress: ProgressModel,
    fade: FadeAnimator,
    transition: Transition,
    track_scroll: ScrollCursor,
    artist_scroll: ScrollCursor,
    artwork: Option<(String, Arc<ArtworkImage>)>,
}

impl Presenter {
    pub fn new(tuning: OverlayTuning, now: Instant) -> Self {
        Self {
            tuning,
            current: None,
            progress: ProgressModel::empty(now),
            fade: FadeAnimator::new(tuning.fade_step),
            transition: Transition::Idle,
            track_scroll: ScrollCursor::new(tuning.max_text_length),
            artist_scroll: ScrollCursor::new(tuning.max_text_length),
            artwork: None,
        }
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current.as_ref().map(TrackSnapshot::id)
    }

    pub fn is_fading(&self) -> bool {
        self.fade.is_fading()
    }

    pub fn scroll_cursor(&self, field: ScrollField) -> &ScrollCursor {
        match field {
            ScrollField::Track => &self.track_scroll,
            ScrollField::Artist => &self.artist_scroll,
        }
    }

    pub fn phase(&self) -> Phase {
        match &self.transition {
            Transition::Waiting(next) | Transition::FadingOut(next) => Phase::Transitioning {
                from: self.current_id().unwrap_or_default().to_string(),
                to: next.as_ref().map(|s| s.id().to_string()),
            },
            Transition::Idle => match self.current_id() {
                Some(id) => Phase::Showing(id.to_string()),
                None => Phase::Empty,
            },
        }
    }

    pub fn set_scroll_paused(&mut self, field: ScrollField, paused: bool) {
        match field {
            ScrollField::Track => self.track_scroll.set_paused(paused),
            ScrollField::Artist => self.artist_scroll.set_paused(paused),
        }
    }

    pub fn toggle_scroll_paused(&mut self, field: ScrollField) {
        let paused = self.scroll_cursor(field).is_paused();
        self.set_scroll_paused(field, !paused);
    }

    /// Apply one polled snapshot (`None` = nothing playing).
    pub fn on_snapshot<R: Renderer>(
        &mut self,
        snapshot: Option<TrackSnapshot>,
        now: Instant,
        r: &mut R,
    ) {
        if let Transition::Waiting(next) | Transition::FadingOut(next) = &mut self.transition {
            // Latest snapshot wins; the running fade keeps going.
            *next = snapshot;
            return;
        }

        let same_track = match (&self.current, &snapshot) {
            (Some(cur), Some(new)) => cur.id() == new.id(),
            (None, None) => true,
            _ => false,
        };

        if same_track {
            if let Some(snapshot) = snapshot {
                self.update_in_place(snapshot, now, r);
            }
            return;
        }

        if self.current.is_none() {
            self.swap_in(snapshot, now, r);
            self.fade_in();
            return;
        }

        info!(
            from = self.current_id().unwrap_or_default(),
            to = snapshot.as_ref().map(TrackSnapshot::id).unwrap_or("<nothing>"),
            album = snapshot.as_ref().map(TrackSnapshot::album).unwrap_or_default(),
            "track changed"
        );
        self.transition = match self.fade.fade_to(0.0) {
            Ok(()) => Transition::FadingOut(snapshot),
            Err(_) => Transition::Waiting(snapshot),
        };
    }

    /// Artwork finished loading in the background.
    pub fn on_artwork<R: Renderer>(&mut self, url: String, image: Arc<ArtworkImage>, r: &mut R) {
        let shown = self
            .current
            .as_ref()
            .and_then(TrackSnapshot::artwork_url)
            .is_some_and(|u| u == url);
        if shown {
            r.set_artwork(Some(image.clone()));
        }
        self.artwork = Some((url, image));
    }

    pub fn tick_fade<R: Renderer>(&mut self, now: Instant, r: &mut R) {
        if !self.fade.is_fading() {
            return;
        }
        let completed = self.fade.tick();
        r.set_opacity(self.fade.level());

        let Some(done) = completed else {
            return;
        };

        match std::mem::replace(&mut self.transition, Transition::Idle) {
            Transition::Waiting(next) => {
                self.transition = match self.fade.fade_to(0.0) {
                    Ok(()) => Transition::FadingOut(next),
                    Err(_) => Transition::Waiting(next),
                };
            }
            Transition::FadingOut(next) if done.target <= 0.0 => {
                // Fully transparent: nothing old can be seen next to the new text.
                self.swap_in(next, now, r);
                if self.current.is_some() {
                    self.fade_in();
                }
            }
            other => self.transition = other,
        }
    }

    pub fn tick_scroll<R: Renderer>(&mut self, r: &mut R) {
        if self.track_scroll.tick() {
            r.set_track_text(&self.track_scroll.visible());
        }
        if self.artist_scroll.tick() {
            r.set_artist_text(&self.artist_scroll.visible());
        }
    }

    pub fn tick_progress<R: Renderer>(&mut self, now: Instant, r: &mut R) {
        if self.current.is_none() {
            return;
        }
        if let Some(fraction) = self.progress.fraction(now) {
            r.set_progress_fraction(fraction);
            r.set_elapsed_label(&format_time(self.progress.display_progress(now)));
        }
    }

    fn fade_in(&mut self) {
        if self.fade.fade_to(self.tuning.target_opacity).is_err() {
            debug!("fade-in skipped: another fade is running");
        }
    }

    fn update_in_place<R: Renderer>(&mut self, snapshot: TrackSnapshot, now: Instant, r: &mut R) {
        self.progress = ProgressModel::sample(
            snapshot.progress_ms(),
            snapshot.duration_ms(),
            snapshot.is_playing(),
            now,
        );
        r.set_total_label(&format_time(snapshot.duration_ms()));

        let previous_url = self.current.as_ref().and_then(TrackSnapshot::artwork_url);
        if previous_url != snapshot.artwork_url() {
            r.set_artwork(self.cached_artwork(snapshot.artwork_url()));
        }
        self.current = Some(snapshot);
    }

    fn cached_artwork(&self, url: Option<&str>) -> Option<Arc<ArtworkImage>> {
        let url = url?;
        self.artwork
            .as_ref()
            .filter(|(cached, _)| cached == url)
            .map(|(_, image)| image.clone())
    }

    fn swap_in<R: Renderer>(&mut self, next: Option<TrackSnapshot>, now: Instant, r: &mut R) {
        match next {
            Some(snapshot) => {
                self.progress = ProgressModel::sample(
                    snapshot.progress_ms(),
                    snapshot.duration_ms(),
                    snapshot.is_playing(),
                    now,
                );
                self.track_scroll.reset_text(snapshot.track());
                self.artist_scroll.reset_text(snapshot.artist());

                r.set_track_text(&self.track_scroll.visible());
                r.set_artist_text(&self.artist_scroll.visible());
                r.set_artwork(self.cached_artwork(snapshot.artwork_url()));
                r.set_total_label(&format_time(snapshot.duration_ms()));
                r.set_elapsed_label(&format_time(self.progress.display_progress(now)));
                r.set_progress_fraction(self.progress.fraction(now).unwrap_or(0.0));

                self.current = Some(snapshot);
            }
            None => {
                self.progress = ProgressModel::empty(now);
                self.track_scroll.reset_text("");
                self.artist_scroll.reset_text("");

                r.set_track_text(IDLE_TEXT);
                r.set_artist_text("");
                r.set_artwork(None);
                r.set_total_label(&format_time(0));
                r.set_elapsed_label(&format_time(0));
                r.set_progress_fraction(0.0);

                self.current = None;
            }
        }
    }
}
