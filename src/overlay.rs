//! Presentation core: turns polled snapshots into display decisions.
//!
//! The `Presenter` owns all display state and is driven by three periodic
//! ticks (fade, scroll, progress) plus snapshot deliveries. Everything it
//! decides leaves through the `Renderer` trait.

mod fade;
mod format;
mod marquee;
mod presenter;
mod progress;
mod render;
mod snapshot;

pub use presenter::{OverlayTuning, Presenter, ScrollField};
pub use render::{ArtworkImage, Renderer};
pub use snapshot::TrackSnapshot;

#[cfg(test)]
mod tests;
