use std::sync::Arc;

/// Decoded album art, already scaled to the card's artwork area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtworkImage {
    pub width: u32,
    pub height: u32,
    /// Row-major RGB pixels, `width * height` entries.
    pub pixels: Vec<[u8; 3]>,
}

impl ArtworkImage {
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get((y * self.width + x) as usize).copied()
    }
}

/// Output boundary of the presentation core. Calls are fire-and-forget.
pub trait Renderer {
    fn set_artwork(&mut self, artwork: Option<Arc<ArtworkImage>>);
    fn set_track_text(&mut self, text: &str);
    fn set_artist_text(&mut self, text: &str);
    fn set_progress_fraction(&mut self, fraction: f64);
    fn set_opacity(&mut self, opacity: f32);
    fn set_elapsed_label(&mut self, label: &str);
    fn set_total_label(&mut self, label: &str);
}
