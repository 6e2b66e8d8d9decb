/// One polled sample of remote playback state.
///
/// The `id` is derived from track and artist names, so two snapshots of the
/// same song compare equal by id even when progress differs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackSnapshot {
    id: String,
    track: String,
    artist: String,
    album: String,
    artwork_url: Option<String>,
    progress_ms: u64,
    duration_ms: u64,
    is_playing: bool,
}

impl TrackSnapshot {
    pub fn new(track: impl Into<String>, artist: impl Into<String>) -> Self {
        let track = track.into();
        let artist = artist.into();
        Self {
            id: format!("{track}|{artist}"),
            track,
            artist,
            album: String::new(),
            artwork_url: None,
            progress_ms: 0,
            duration_ms: 0,
            is_playing: false,
        }
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = album.into();
        self
    }

    pub fn with_artwork_url(mut self, url: Option<String>) -> Self {
        self.artwork_url = url.filter(|u| !u.trim().is_empty());
        self
    }

    pub fn with_progress(mut self, progress_ms: u64, duration_ms: u64) -> Self {
        self.progress_ms = progress_ms;
        self.duration_ms = duration_ms;
        self
    }

    pub fn playing(mut self, is_playing: bool) -> Self {
        self.is_playing = is_playing;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn track(&self) -> &str {
        &self.track
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    pub fn album(&self) -> &str {
        &self.album
    }

    pub fn artwork_url(&self) -> Option<&str> {
        self.artwork_url.as_deref()
    }

    pub fn progress_ms(&self) -> u64 {
        self.progress_ms
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }
}
