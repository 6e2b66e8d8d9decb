use std::collections::HashMap;

use async_io::block_on;
use zbus::proxy::CacheProperties;
use zbus::{Connection, proxy};
use zvariant::{OwnedValue, Value};

use crate::overlay::TrackSnapshot;

use super::types::{SnapshotSource, SourceError};

const BUS_PREFIX: &str = "org.mpris.MediaPlayer2.";
const SERVICE_UNKNOWN: &str = "org.freedesktop.DBus.Error.ServiceUnknown";
const NAME_HAS_NO_OWNER: &str = "org.freedesktop.DBus.Error.NameHasNoOwner";

#[proxy(
    interface = "org.mpris.MediaPlayer2.Player",
    default_path = "/org/mpris/MediaPlayer2",
    gen_blocking = false
)]
trait Player {
    #[zbus(property)]
    fn metadata(&self) -> zbus::Result<HashMap<String, OwnedValue>>;

    #[zbus(property)]
    fn playback_status(&self) -> zbus::Result<String>;

    #[zbus(property)]
    fn position(&self) -> zbus::Result<i64>;
}

/// Reads the current track from a desktop media player over the session bus.
pub struct MprisSource {
    bus_name: String,
    connection: Option<Connection>,
}

impl MprisSource {
    /// `player` is either a full bus name or the suffix after
    /// `org.mpris.MediaPlayer2.`, e.g. `spotify`.
    pub fn new(player: &str) -> Self {
        let bus_name = if player.starts_with(BUS_PREFIX) {
            player.to_string()
        } else {
            format!("{BUS_PREFIX}{player}")
        };
        Self {
            bus_name,
            connection: None,
        }
    }

    pub fn bus_name(&self) -> &str {
        &self.bus_name
    }

    async fn read(&mut self) -> Result<Option<TrackSnapshot>, SourceError> {
        let connection = match &self.connection {
            Some(connection) => connection.clone(),
            None => {
                let connection = Connection::session().await?;
                self.connection = Some(connection.clone());
                connection
            }
        };

        let player = PlayerProxy::builder(&connection)
            .destination(self.bus_name.as_str())?
            .cache_properties(CacheProperties::No)
            .build()
            .await?;

        let status = match player.playback_status().await {
            Ok(status) => status,
            Err(e) if player_absent(&e) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if status == "Stopped" {
            return Ok(None);
        }

        let metadata = player.metadata().await?;
        // Some players do not implement Position.
        let position = player.position().await.unwrap_or(0);
        Ok(snapshot_from_metadata(&metadata, &status, position))
    }
}

impl SnapshotSource for MprisSource {
    fn name(&self) -> &str {
        "mpris"
    }

    fn fetch(&mut self) -> Result<Option<TrackSnapshot>, SourceError> {
        block_on(self.read())
    }
}

fn player_absent(err: &zbus::Error) -> bool {
    match err {
        zbus::Error::MethodError(name, _, _) => {
            let name = name.as_str();
            name == SERVICE_UNKNOWN || name == NAME_HAS_NO_OWNER
        }
        zbus::Error::FDO(e) => matches!(
            **e,
            zbus::fdo::Error::ServiceUnknown(_) | zbus::fdo::Error::NameHasNoOwner(_)
        ),
        _ => false,
    }
}

/// Build a snapshot from an MPRIS `Metadata` map.
///
/// Returns `None` when the player reports no title. Times arrive in
/// microseconds.
pub fn snapshot_from_metadata(
    metadata: &HashMap<String, OwnedValue>,
    playback_status: &str,
    position_us: i64,
) -> Option<TrackSnapshot> {
    let title = metadata.get("xesam:title").and_then(string_of)?;
    if title.trim().is_empty() {
        return None;
    }
    let artist = metadata
        .get("xesam:artist")
        .map(strings_of)
        .unwrap_or_default()
        .join(", ");
    let album = metadata
        .get("xesam:album")
        .and_then(string_of)
        .unwrap_or_default();
    let art_url = metadata.get("mpris:artUrl").and_then(string_of);
    let length_us = metadata
        .get("mpris:length")
        .and_then(integer_of)
        .unwrap_or(0);

    Some(
        TrackSnapshot::new(title, artist)
            .with_album(album)
            .with_artwork_url(art_url)
            .with_progress(micros_to_millis(position_us), micros_to_millis(length_us))
            .playing(playback_status == "Playing"),
    )
}

fn micros_to_millis(us: i64) -> u64 {
    u64::try_from(us).unwrap_or(0) / 1000
}

fn unwrap_variant<'a>(value: &'a Value<'a>) -> &'a Value<'a> {
    match value {
        Value::Value(inner) => unwrap_variant(inner),
        other => other,
    }
}

fn string_of(value: &OwnedValue) -> Option<String> {
    match unwrap_variant(value) {
        Value::Str(s) => Some(s.as_str().to_string()),
        _ => None,
    }
}

fn strings_of(value: &OwnedValue) -> Vec<String> {
    match unwrap_variant(value) {
        Value::Str(s) => vec![s.as_str().to_string()],
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match unwrap_variant(item) {
                Value::Str(s) => Some(s.as_str().to_string()),
                _ => None,
            })
            .filter(|s| !s.trim().is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

fn integer_of(value: &OwnedValue) -> Option<i64> {
    match unwrap_variant(value) {
        Value::I64(n) => Some(*n),
        Value::U64(n) => i64::try_from(*n).ok(),
        Value::I32(n) => Some(i64::from(*n)),
        Value::U32(n) => Some(i64::from(*n)),
        _ => None,
    }
}
