use super::fade::{FadeAnimator, FadeBusy, FadeCompleted};
use super::format::format_time;
use super::marquee::{SEPARATOR_LEN, ScrollCursor};
use super::presenter::{IDLE_TEXT, Phase};
use super::progress::ProgressModel;
use super::*;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Artwork(bool),
    Track(String),
    Artist(String),
    Fraction(f64),
    Opacity(f32),
    Elapsed(String),
    Total(String),
}

/// Records every render call together with the opacity in effect at that moment.
#[derive(Default)]
struct Recorder {
    opacity: f32,
    calls: Vec<(Call, f32)>,
}

impl Recorder {
    fn push(&mut self, call: Call) {
        self.calls.push((call, self.opacity));
    }

    fn track_texts(&self) -> Vec<(String, f32)> {
        self.calls
            .iter()
            .filter_map(|(c, o)| match c {
                Call::Track(t) => Some((t.clone(), *o)),
                _ => None,
            })
            .collect()
    }

    fn fade_outs(&self) -> usize {
        // Count transitions into opacity 0 from a visible level.
        let mut count = 0;
        let mut last = 0.0f32;
        for (c, _) in &self.calls {
            if let Call::Opacity(o) = c {
                if *o == 0.0 && last > 0.0 {
                    count += 1;
                }
                last = *o;
            }
        }
        count
    }
}

impl Renderer for Recorder {
    fn set_artwork(&mut self, artwork: Option<Arc<ArtworkImage>>) {
        self.push(Call::Artwork(artwork.is_some()));
    }
    fn set_track_text(&mut self, text: &str) {
        self.push(Call::Track(text.to_string()));
    }
    fn set_artist_text(&mut self, text: &str) {
        self.push(Call::Artist(text.to_string()));
    }
    fn set_progress_fraction(&mut self, fraction: f64) {
        self.push(Call::Fraction(fraction));
    }
    fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity;
        self.push(Call::Opacity(opacity));
    }
    fn set_elapsed_label(&mut self, label: &str) {
        self.push(Call::Elapsed(label.to_string()));
    }
    fn set_total_label(&mut self, label: &str) {
        self.push(Call::Total(label.to_string()));
    }
}

fn snap(track: &str, progress: u64, duration: u64, playing: bool) -> TrackSnapshot {
    TrackSnapshot::new(track, "Artist")
        .with_album("Album")
        .with_progress(progress, duration)
        .playing(playing)
}

fn tuning() -> OverlayTuning {
    OverlayTuning {
        target_opacity: 0.85,
        fade_step: 0.05,
        max_text_length: 35,
    }
}

/// Run fade ticks until the presenter stops fading (bounded).
fn settle(p: &mut Presenter, now: Instant, r: &mut Recorder) {
    for _ in 0..200 {
        if !p.is_fading() {
            return;
        }
        p.tick_fade(now, r);
    }
    panic!("fade did not settle");
}

#[test]
fn format_time_pads_seconds_and_keeps_minutes_unbounded() {
    assert_eq!(format_time(0), "0:00");
    assert_eq!(format_time(999), "0:00");
    assert_eq!(format_time(5_000), "0:05");
    assert_eq!(format_time(65_000), "1:05");
    assert_eq!(format_time(600_000), "10:00");
    assert_eq!(format_time(7_200_000), "120:00");
}

#[test]
fn snapshot_id_joins_track_and_artist() {
    let s = TrackSnapshot::new("Song", "Band");
    assert_eq!(s.id(), "Song|Band");
    assert!(!s.is_playing());
    assert_eq!(s.duration_ms(), 0);
    assert_eq!(s.with_artwork_url(Some("  ".into())).artwork_url(), None);
}

#[test]
fn progress_extrapolates_while_playing_and_clamps() {
    let t0 = Instant::now();
    let p = ProgressModel::sample(10_000, 12_000, true, t0);

    assert_eq!(p.display_progress(t0), 10_000);
    assert_eq!(p.display_progress(t0 + Duration::from_millis(500)), 10_500);
    assert_eq!(p.display_progress(t0 + Duration::from_secs(60)), 12_000);

    let mut last = 0;
    for ms in (0..5_000).step_by(250) {
        let v = p.display_progress(t0 + Duration::from_millis(ms));
        assert!(v >= last);
        last = v;
    }
}

#[test]
fn progress_is_frozen_when_paused_and_zero_without_duration() {
    let t0 = Instant::now();
    let paused = ProgressModel::sample(4_000, 10_000, false, t0);
    assert_eq!(paused.display_progress(t0 + Duration::from_secs(3)), 4_000);
    assert_eq!(paused.fraction(t0), Some(0.4));

    let unknown = ProgressModel::sample(4_000, 0, true, t0);
    assert_eq!(unknown.display_progress(t0 + Duration::from_secs(3)), 0);
    assert_eq!(unknown.fraction(t0), None);

    let overshoot = ProgressModel::sample(20_000, 10_000, false, t0);
    assert_eq!(overshoot.display_progress(t0), 10_000);
}

#[test]
fn short_text_is_static() {
    let mut c = ScrollCursor::new(10);
    c.reset_text("short");
    assert!(!c.scrolls());
    assert!(!c.tick());
    assert_eq!(c.visible(), "short");
    assert_eq!(c.frames().nth(5).unwrap(), "short");
}

#[test]
fn marquee_wraps_through_separator_and_is_periodic() {
    let mut c = ScrollCursor::new(4);
    c.reset_text("abcdef");
    assert_eq!(c.visible(), "abcd");

    let start = c.visible();
    let cycle = "abcdef".len() + SEPARATOR_LEN;
    let mut seen = Vec::new();
    for _ in 0..cycle {
        assert!(c.tick());
        seen.push(c.visible());
    }
    assert_eq!(c.visible(), start);

    // Position 3 shows the tail then the gap; position 8 wraps back to the head.
    assert_eq!(seen[2], "def ");
    assert_eq!(seen[7], "   a");
}

#[test]
fn marquee_frames_are_lazy_and_restartable() {
    let mut c = ScrollCursor::new(3);
    c.reset_text("héllo wörld");
    let cycle = c.cycle_len();

    let first: Vec<String> = c.frames().take(cycle + 1).collect();
    assert_eq!(first[0], "hél");
    assert_eq!(first[cycle], first[0]);
    assert!(first.iter().all(|f| f.chars().count() == 3));

    c.tick();
    assert_eq!(c.frames().next().unwrap(), "éll");
}

#[test]
fn marquee_pause_and_reset() {
    let mut c = ScrollCursor::new(3);
    c.reset_text("abcdefgh");
    c.tick();
    c.tick();
    c.set_paused(true);
    assert!(!c.tick());
    assert_eq!(c.visible(), "cde");

    c.reset_text("zyxwvuts");
    assert!(c.is_paused());
    assert_eq!(c.visible(), "zyx");
}

#[test]
fn marquee_handles_empty_text_and_zero_width() {
    let mut c = ScrollCursor::new(5);
    c.reset_text("");
    assert_eq!(c.visible(), "");
    assert!(!c.tick());

    let mut zero = ScrollCursor::new(0);
    zero.reset_text("anything");
    assert_eq!(zero.visible(), "");
    assert!(!zero.tick());
}

#[test]
fn fade_steps_clamps_and_completes_once() {
    let mut f = FadeAnimator::new(0.3);
    f.fade_to(0.85).unwrap();

    assert_eq!(f.tick(), None);
    assert_eq!(f.tick(), None);
    assert_eq!(f.tick(), Some(FadeCompleted { target: 0.85 }));
    assert_eq!(f.level(), 0.85);
    assert!(!f.is_fading());
    assert_eq!(f.tick(), None);

    f.fade_to(0.0).unwrap();
    for _ in 0..2 {
        assert_eq!(f.tick(), None);
    }
    assert_eq!(f.tick(), Some(FadeCompleted { target: 0.0 }));
    assert_eq!(f.level(), 0.0);
}

#[test]
fn fade_rejects_overlapping_requests() {
    let mut f = FadeAnimator::new(0.05);
    f.fade_to(1.0).unwrap();
    assert_eq!(f.fade_to(0.0), Err(FadeBusy));
    let done = (0..100).find_map(|_| f.tick());
    assert_eq!(done, Some(FadeCompleted { target: 1.0 }));
}

#[test]
fn fade_to_current_level_completes_on_next_tick() {
    let mut f = FadeAnimator::new(0.05);
    f.fade_to(0.0).unwrap();
    assert_eq!(f.tick(), Some(FadeCompleted { target: 0.0 }));
}

#[test]
fn first_snapshot_shows_immediately_and_fades_in() {
    let t0 = Instant::now();
    let mut p = Presenter::new(tuning(), t0);
    let mut r = Recorder::default();

    assert_eq!(p.phase(), Phase::Empty);
    p.on_snapshot(Some(snap("A", 0, 200_000, true)), t0, &mut r);

    assert_eq!(p.phase(), Phase::Showing("A|Artist".into()));
    assert_eq!(r.track_texts(), vec![("A".to_string(), 0.0)]);
    assert!(r.calls.contains(&(Call::Total("3:20".into()), 0.0)));

    settle(&mut p, t0, &mut r);
    assert_eq!(r.opacity, 0.85);
}

#[test]
fn same_id_updates_in_place_without_fading() {
    let t0 = Instant::now();
    let mut p = Presenter::new(tuning(), t0);
    let mut r = Recorder::default();
    p.on_snapshot(Some(snap("A", 0, 200_000, true)), t0, &mut r);
    settle(&mut p, t0, &mut r);
    r.calls.clear();

    for i in 1..5 {
        let now = t0 + Duration::from_secs(2 * i);
        p.on_snapshot(Some(snap("A", 2_000 * i, 200_000, true)), now, &mut r);
        assert!(!p.is_fading());
        p.tick_progress(now, &mut r);
        assert_eq!(
            r.calls.last().map(|(c, _)| c.clone()),
            Some(Call::Elapsed(format_time(2_000 * i)))
        );
    }
    assert!(r.track_texts().is_empty());
    assert!(!r.calls.iter().any(|(c, _)| matches!(c, Call::Opacity(_))));
}

#[test]
fn scenario_in_place_then_fade_cycle_then_fade_to_empty() {
    let t0 = Instant::now();
    let mut p = Presenter::new(tuning(), t0);
    let mut r = Recorder::default();

    p.on_snapshot(Some(snap("A", 0, 200_000, true)), t0, &mut r);
    settle(&mut p, t0, &mut r);

    let t1 = t0 + Duration::from_secs(2);
    p.on_snapshot(Some(snap("A", 5_000, 200_000, true)), t1, &mut r);
    assert_eq!(p.phase(), Phase::Showing("A|Artist".into()));
    assert_eq!(r.fade_outs(), 0);

    let t2 = t1 + Duration::from_secs(2);
    p.on_snapshot(Some(snap("B", 0, 180_000, true)), t2, &mut r);
    assert_eq!(
        p.phase(),
        Phase::Transitioning {
            from: "A|Artist".into(),
            to: Some("B|Artist".into())
        }
    );
    // Fade-out, swap and fade-in all run on fade ticks.
    settle(&mut p, t2, &mut r);
    assert_eq!(p.current_id(), Some("B|Artist"));
    assert_eq!(r.opacity, 0.85);
    assert_eq!(r.fade_outs(), 1);

    let t3 = t2 + Duration::from_secs(2);
    p.on_snapshot(None, t3, &mut r);
    settle(&mut p, t3, &mut r);
    assert_eq!(p.phase(), Phase::Empty);
    assert_eq!(r.opacity, 0.0);
    assert_eq!(r.fade_outs(), 2);

    // Every text swap happened while fully transparent.
    for (text, opacity) in r.track_texts() {
        assert_eq!(opacity, 0.0, "text {text:?} rendered at opacity {opacity}");
    }
    assert_eq!(r.track_texts().last().unwrap().0, IDLE_TEXT);
}

#[test]
fn latest_snapshot_wins_during_transition() {
    let t0 = Instant::now();
    let mut p = Presenter::new(tuning(), t0);
    let mut r = Recorder::default();
    p.on_snapshot(Some(snap("A", 0, 100_000, true)), t0, &mut r);
    settle(&mut p, t0, &mut r);

    p.on_snapshot(Some(snap("B", 0, 100_000, true)), t0, &mut r);
    p.tick_fade(t0, &mut r);
    let level_mid_fade = r.opacity;
    p.on_snapshot(Some(snap("C", 0, 100_000, true)), t0, &mut r);
    // The running fade is not restarted.
    p.tick_fade(t0, &mut r);
    assert!(r.opacity < level_mid_fade);
    assert!(p.is_fading());

    settle(&mut p, t0, &mut r);
    assert_eq!(p.current_id(), Some("C|Artist"));
    assert!(!r.track_texts().iter().any(|(t, _)| t == "B"));
}

#[test]
fn change_during_fade_in_is_deferred_not_dropped() {
    let t0 = Instant::now();
    let mut p = Presenter::new(tuning(), t0);
    let mut r = Recorder::default();
    p.on_snapshot(Some(snap("A", 0, 100_000, true)), t0, &mut r);
    p.tick_fade(t0, &mut r);
    assert!(p.is_fading());

    p.on_snapshot(Some(snap("B", 0, 100_000, true)), t0, &mut r);
    assert!(matches!(p.phase(), Phase::Transitioning { .. }));

    settle(&mut p, t0, &mut r);
    assert_eq!(p.phase(), Phase::Showing("B|Artist".into()));
    assert_eq!(r.opacity, 0.85);

    // A finished fading in, then faded out, before B's text appeared.
    let pos = |want: &Call| r.calls.iter().position(|(c, _)| c == want).unwrap();
    let a_visible = pos(&Call::Opacity(0.85));
    let hidden = pos(&Call::Opacity(0.0));
    let b_text = pos(&Call::Track("B".into()));
    assert!(a_visible < hidden && hidden < b_text);
}

#[test]
fn long_titles_scroll_and_reset_on_track_change() {
    let t0 = Instant::now();
    let tuning = OverlayTuning {
        max_text_length: 5,
        ..tuning()
    };
    let mut p = Presenter::new(tuning, t0);
    let mut r = Recorder::default();

    p.on_snapshot(Some(snap("A very long title", 0, 100_000, true)), t0, &mut r);
    p.tick_scroll(&mut r);
    p.tick_scroll(&mut r);
    assert_eq!(p.scroll_cursor(ScrollField::Track).visible(), "very ");
    assert_eq!(p.scroll_cursor(ScrollField::Artist).visible(), "tist ");
    assert_eq!(r.track_texts().last().unwrap().0, "very ");

    p.toggle_scroll_paused(ScrollField::Track);
    p.tick_scroll(&mut r);
    assert_eq!(p.scroll_cursor(ScrollField::Track).visible(), "very ");
    assert_eq!(p.scroll_cursor(ScrollField::Artist).visible(), "ist  ");

    settle(&mut p, t0, &mut r);
    p.on_snapshot(Some(snap("Another long title", 0, 100_000, true)), t0, &mut r);
    settle(&mut p, t0, &mut r);
    assert_eq!(p.current_id(), Some("Another long title|Artist"));
    assert_eq!(p.scroll_cursor(ScrollField::Track).visible(), "Anoth");
    assert_eq!(p.scroll_cursor(ScrollField::Artist).visible(), "Artis");
    assert!(p.scroll_cursor(ScrollField::Track).is_paused());
}

#[test]
fn progress_tick_reports_interpolated_fraction() {
    let t0 = Instant::now();
    let mut p = Presenter::new(tuning(), t0);
    let mut r = Recorder::default();
    p.on_snapshot(Some(snap("A", 60_000, 120_000, true)), t0, &mut r);
    r.calls.clear();

    p.tick_progress(t0 + Duration::from_secs(30), &mut r);
    assert!(r.calls.iter().any(|(c, _)| *c == Call::Fraction(0.75)));
    assert!(r.calls.iter().any(|(c, _)| *c == Call::Elapsed("1:30".into())));

    r.calls.clear();
    p.on_snapshot(None, t0, &mut r);
    settle(&mut p, t0, &mut r);
    r.calls.clear();
    p.tick_progress(t0 + Duration::from_secs(40), &mut r);
    assert!(r.calls.is_empty());
}

#[test]
fn zero_duration_never_reports_a_fraction_on_tick() {
    let t0 = Instant::now();
    let mut p = Presenter::new(tuning(), t0);
    let mut r = Recorder::default();
    p.on_snapshot(Some(snap("Live", 1_000, 0, true)), t0, &mut r);
    r.calls.clear();
    p.tick_progress(t0 + Duration::from_secs(5), &mut r);
    assert!(r.calls.is_empty());
}

#[test]
fn artwork_is_shown_for_the_matching_track_only() {
    let t0 = Instant::now();
    let mut p = Presenter::new(tuning(), t0);
    let mut r = Recorder::default();
    let image = Arc::new(ArtworkImage {
        width: 1,
        height: 1,
        pixels: vec![[1, 2, 3]],
    });

    let a = snap("A", 0, 100_000, true).with_artwork_url(Some("https://img/a".into()));
    p.on_snapshot(Some(a), t0, &mut r);
    r.calls.clear();

    p.on_artwork("https://img/other".into(), image.clone(), &mut r);
    assert!(r.calls.is_empty());

    p.on_artwork("https://img/a".into(), image.clone(), &mut r);
    assert_eq!(r.calls, vec![(Call::Artwork(true), 0.0)]);

    // Art that arrives before the swap is used when the track comes in.
    settle(&mut p, t0, &mut r);
    let b = snap("B", 0, 100_000, true).with_artwork_url(Some("https://img/b".into()));
    p.on_snapshot(Some(b), t0, &mut r);
    p.on_artwork("https://img/b".into(), image, &mut r);
    r.calls.clear();
    settle(&mut p, t0, &mut r);
    assert!(r.calls.iter().any(|(c, o)| *c == Call::Artwork(true) && *o == 0.0));
}

#[test]
fn new_artwork_url_on_same_track_swaps_the_image() {
    let t0 = Instant::now();
    let mut p = Presenter::new(tuning(), t0);
    let mut r = Recorder::default();
    let image = Arc::new(ArtworkImage {
        width: 1,
        height: 1,
        pixels: vec![[9, 9, 9]],
    });

    let old = snap("A", 0, 100_000, true).with_artwork_url(Some("https://img/old".into()));
    p.on_snapshot(Some(old.clone()), t0, &mut r);
    settle(&mut p, t0, &mut r);

    // Loaded for a URL the card is not showing yet: cached only.
    p.on_artwork("https://img/new".into(), image, &mut r);
    r.calls.clear();

    p.on_snapshot(Some(old), t0, &mut r);
    assert!(!r.calls.iter().any(|(c, _)| matches!(c, Call::Artwork(_))));

    let new = snap("A", 1_000, 100_000, true).with_artwork_url(Some("https://img/new".into()));
    p.on_snapshot(Some(new), t0, &mut r);
    assert!(r.calls.contains(&(Call::Artwork(true), 0.85)));
    assert_eq!(p.phase(), Phase::Showing("A|Artist".into()));

    let gone = snap("A", 2_000, 100_000, true);
    p.on_snapshot(Some(gone), t0, &mut r);
    assert_eq!(r.calls.last().map(|(c, _)| c.clone()), Some(Call::Artwork(false)));
}
