use image::imageops::FilterType;
use reqwest::Url;
use reqwest::blocking::Client;
use tracing::debug;

use crate::overlay::ArtworkImage;

use super::types::SourceError;

/// Fetches cover art and scales it to the card's pixel grid.
///
/// Remembers the last URL it was asked for so an unchanged cover is not
/// downloaded again on every poll, including one that failed to load.
pub struct ArtworkLoader {
    http: Client,
    width: u32,
    height: u32,
    last_url: Option<String>,
}

impl ArtworkLoader {
    pub fn new(http: Client, width: u32, height: u32) -> Self {
        Self {
            http,
            width: width.max(1),
            height: height.max(1),
            last_url: None,
        }
    }

    pub fn wants(&self, url: &str) -> bool {
        self.last_url.as_deref() != Some(url)
    }

    pub fn load(&mut self, url: &str) -> Result<ArtworkImage, SourceError> {
        self.last_url = Some(url.to_string());
        let bytes = self.fetch_bytes(url)?;
        debug!(url, bytes = bytes.len(), "artwork fetched");
        decode_artwork(&bytes, self.width, self.height)
    }

    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, SourceError> {
        let parsed = Url::parse(url).map_err(|e| SourceError::ArtworkUrl(format!("{url}: {e}")))?;
        match parsed.scheme() {
            "file" => {
                let path = parsed
                    .to_file_path()
                    .map_err(|_| SourceError::ArtworkUrl(url.to_string()))?;
                Ok(std::fs::read(path)?)
            }
            "http" | "https" => {
                let response = self.http.get(parsed).send()?.error_for_status()?;
                Ok(response.bytes()?.to_vec())
            }
            other => Err(SourceError::ArtworkUrl(format!("unsupported scheme {other}"))),
        }
    }
}

/// Decode PNG or JPEG bytes and resize them to exactly `width` x `height`.
pub fn decode_artwork(bytes: &[u8], width: u32, height: u32) -> Result<ArtworkImage, SourceError> {
    let decoded = image::load_from_memory(bytes)?;
    let rgb = decoded
        .resize_exact(width.max(1), height.max(1), FilterType::Triangle)
        .to_rgb8();
    Ok(ArtworkImage {
        width: rgb.width(),
        height: rgb.height(),
        pixels: rgb.pixels().map(|p| p.0).collect(),
    })
}
