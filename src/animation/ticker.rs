use crate::foundation::core::{Fps, FrameIndex};
use std::time::{Duration, Instant};

/// Host scheduling primitive: suspends the driver until the next frame slot.
pub trait FrameTicker {
    /// Called once before frame 0 is painted.
    fn start(&mut self);
    /// Block until it is time to paint `next`.
    fn wait_next_frame(&mut self, next: FrameIndex);
}

/// Never waits. Used for offline rendering, where capture timing comes from frame indices.
#[derive(Clone, Copy, Debug, Default)]
pub struct FreeRunTicker;

impl FrameTicker for FreeRunTicker {
    fn start(&mut self) {}

    fn wait_next_frame(&mut self, _next: FrameIndex) {}
}

/// Paces frames at a fixed rate, like a display refresh callback.
///
/// Deadlines are computed from the start instant, so a slow frame does not push every later frame
/// back.
#[derive(Clone, Debug)]
pub struct PacedTicker {
    fps: Fps,
    origin: Option<Instant>,
}

impl PacedTicker {
    /// Create a ticker that releases one frame per `1 / fps` seconds.
    pub fn new(fps: Fps) -> Self {
        Self { fps, origin: None }
    }

    /// Deadline of `frame` relative to the start instant.
    pub fn offset_of(&self, frame: FrameIndex) -> Duration {
        Duration::from_secs_f64(self.fps.frames_to_secs(frame.0))
    }
}

impl FrameTicker for PacedTicker {
    fn start(&mut self) {
        self.origin = Some(Instant::now());
    }

    fn wait_next_frame(&mut self, next: FrameIndex) {
        let origin = *self.origin.get_or_insert_with(Instant::now);
        let deadline = origin + self.offset_of(next);
        let now = Instant::now();
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ticker.rs"]
mod tests;
