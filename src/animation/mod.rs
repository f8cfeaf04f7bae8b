//! Frame driving: easing curves, display-refresh pacing, and the per-run frame loop.

/// Frame loop that paints every frame and hands it to capture.
pub mod driver;
/// Easing curves for normalized progress.
pub mod ease;
/// Per-frame scheduling primitives.
pub mod ticker;
