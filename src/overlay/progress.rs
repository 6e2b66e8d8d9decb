use std::time::Instant;

/// Last sampled playback position plus the wall-clock instant it was taken.
///
/// Between samples the displayed position is extrapolated linearly from
/// elapsed wall-clock time, so the bar moves smoothly even though polls are
/// seconds apart.
#[derive(Debug, Clone, Copy)]
pub struct ProgressModel {
    progress_ms: u64,
    duration_ms: u64,
    is_playing: bool,
    sampled_at: Instant,
}

impl ProgressModel {
    pub fn empty(now: Instant) -> Self {
        Self::sample(0, 0, false, now)
    }

    pub fn sample(progress_ms: u64, duration_ms: u64, is_playing: bool, now: Instant) -> Self {
        Self {
            progress_ms,
            duration_ms,
            is_playing,
            sampled_at: now,
        }
    }

    /// Position to display at `now`, clamped to `[0, duration]`.
    pub fn display_progress(&self, now: Instant) -> u64 {
        if self.duration_ms == 0 {
            return 0;
        }
        let progress = if self.is_playing {
            let elapsed = now.saturating_duration_since(self.sampled_at).as_millis();
            let elapsed = u64::try_from(elapsed).unwrap_or(u64::MAX);
            self.progress_ms.saturating_add(elapsed)
        } else {
            self.progress_ms
        };
        progress.min(self.duration_ms)
    }

    /// Fraction of the track played, or `None` when the duration is unknown.
    pub fn fraction(&self, now: Instant) -> Option<f64> {
        if self.duration_ms == 0 {
            return None;
        }
        Some(self.display_progress(now) as f64 / self.duration_ms as f64)
    }
}
