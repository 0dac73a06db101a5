//! Watch-progress tracking: the per-page start detector and the
//! best-effort history writer it feeds.

pub mod history;
pub mod tracker;

pub use history::{AddOutcome, WatchHistoryService};
pub use tracker::{StartWatching, TrackerState, WatchProgressTracker};
