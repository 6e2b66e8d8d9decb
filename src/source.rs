//! Track snapshot sources and the background poller that drives them.
//!
//! Sources may block on the network or the session bus, so they only ever run
//! on the poller thread. Results reach the event loop as `SourceMsg` values.

mod artwork;
mod mpris;
mod poller;
mod spotify;
mod types;

pub use artwork::ArtworkLoader;
pub use mpris::MprisSource;
pub use poller::Poller;
pub use spotify::SpotifySource;
pub use types::{SnapshotSource, SourceMsg};
