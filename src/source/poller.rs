use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::artwork::ArtworkLoader;
use super::types::{SnapshotSource, SourceMsg};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollCmd {
    /// Fetch now instead of waiting for the interval.
    Refresh,
    Shutdown,
}

/// Handle to the thread that polls a `SnapshotSource`.
///
/// Fetches once immediately and then every `interval`. Failed fetches are
/// logged and produce no message. The thread is detached: a blocked fetch
/// never holds up exit, and the output channel closes once it returns.
pub struct Poller {
    tx: Sender<PollCmd>,
    running: Arc<AtomicBool>,
}

impl Poller {
    pub fn spawn(
        source: Box<dyn SnapshotSource>,
        artwork: Option<ArtworkLoader>,
        interval: Duration,
        out: Sender<SourceMsg>,
    ) -> Self {
        let (tx, rx) = mpsc::channel::<PollCmd>();
        let running = Arc::new(AtomicBool::new(true));
        let running_for_thread = running.clone();
        thread::spawn(move || {
            poll_loop(source, artwork, interval, rx, out, running_for_thread);
        });

        Self { tx, running }
    }

    pub fn refresh(&self) {
        let _ = self.tx.send(PollCmd::Refresh);
    }

    /// Stop polling. Does not wait for a fetch that is already in flight;
    /// its result is discarded when it returns.
    pub fn shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
        let _ = self.tx.send(PollCmd::Shutdown);
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn poll_loop(
    mut source: Box<dyn SnapshotSource>,
    mut artwork: Option<ArtworkLoader>,
    interval: Duration,
    rx: Receiver<PollCmd>,
    out: Sender<SourceMsg>,
    running: Arc<AtomicBool>,
) {
    info!(
        source = source.name(),
        interval_ms = interval.as_millis() as u64,
        "poller started"
    );

    while running.load(Ordering::SeqCst) {
        match source.fetch() {
            Ok(snapshot) => {
                let art_url = snapshot
                    .as_ref()
                    .and_then(|s| s.artwork_url())
                    .map(str::to_string);
                if !deliver(&running, &out, SourceMsg::Snapshot(snapshot)) {
                    break;
                }

                if let (Some(loader), Some(url)) = (artwork.as_mut(), art_url) {
                    if loader.wants(&url) {
                        match loader.load(&url) {
                            Ok(image) => {
                                let msg = SourceMsg::Artwork {
                                    url,
                                    image: Arc::new(image),
                                };
                                if !deliver(&running, &out, msg) {
                                    break;
                                }
                            }
                            Err(e) => warn!(%url, error = %e, "artwork load failed"),
                        }
                    }
                }
            }
            Err(e) => {
                warn!(source = source.name(), error = %e, "fetch failed, keeping last state");
            }
        }

        match rx.recv_timeout(interval) {
            Ok(PollCmd::Refresh) | Err(RecvTimeoutError::Timeout) => {}
            Ok(PollCmd::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    debug!(source = source.name(), "poller stopped");
}

fn deliver(running: &AtomicBool, out: &Sender<SourceMsg>, msg: SourceMsg) -> bool {
    running.load(Ordering::SeqCst) && out.send(msg).is_ok()
}
