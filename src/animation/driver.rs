use crate::animation::ticker::{FrameTicker, FreeRunTicker, PacedTicker};
use crate::encode::capture::CaptureHandle;
use crate::encode::sink::FrameSink;
use crate::foundation::core::{Fps, FrameIndex, FrameRange, Progress};
use crate::foundation::error::{ChocoError, ChocoResult};
use crate::render::backend::{FrameRGBA, FrameRenderer, FrameRequest};
use crate::scene::style::Style;
use std::time::{Duration, Instant};

/// Receives each frame as soon as it is fully painted.
pub trait FrameReady {
    /// Take frame `idx`. Called in strictly increasing order.
    fn frame_ready(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ChocoResult<()>;
}

impl<S: FrameSink + ?Sized> FrameReady for S {
    fn frame_ready(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ChocoResult<()> {
        self.push_frame(idx, frame)
    }
}

impl FrameReady for CaptureHandle {
    fn frame_ready(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ChocoResult<()> {
        self.push_frame(idx, frame)
    }
}

/// What to animate.
#[derive(Clone, Copy, Debug)]
pub struct RunSpec<'a> {
    /// Animation style.
    pub style: Style,
    /// Caption text. Empty means no caption.
    pub caption: &'a str,
    /// Frames to produce, `>= 1`.
    pub total_frames: u64,
}

/// Summary of a finished run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DriverStats {
    /// Frames painted and handed over.
    pub frames: u64,
    /// Wall-clock time spent in the run.
    pub elapsed: Duration,
}

/// Advances the animation one frame per tick, hands every painted frame to a [`FrameReady`]
/// target, and reports completion once.
pub struct AnimationDriver {
    ticker: Box<dyn FrameTicker + Send>,
}

impl std::fmt::Debug for AnimationDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationDriver").finish_non_exhaustive()
    }
}

impl AnimationDriver {
    /// Driver that waits on `ticker` between frames.
    pub fn new(ticker: Box<dyn FrameTicker + Send>) -> Self {
        Self { ticker }
    }

    /// Driver that never waits.
    pub fn free_run() -> Self {
        Self::new(Box::new(FreeRunTicker))
    }

    /// Driver paced at `fps`, like a display refresh loop.
    pub fn paced(fps: Fps) -> Self {
        Self::new(Box::new(PacedTicker::new(fps)))
    }

    /// Paint frames `0..spec.total_frames` in order.
    ///
    /// Frame `i` is painted at progress `i / total_frames` and handed to `out` before the driver
    /// waits for the next tick. After the last frame `on_complete` runs exactly once, before this
    /// returns. Any error aborts the run, skips `on_complete`, and is returned.
    #[tracing::instrument(
        level = "info",
        skip(self, renderer, out, on_complete),
        fields(style = %spec.style, frames = spec.total_frames)
    )]
    pub fn run(
        &mut self,
        renderer: &mut dyn FrameRenderer,
        spec: &RunSpec<'_>,
        out: &mut dyn FrameReady,
        on_complete: impl FnOnce(&DriverStats),
    ) -> ChocoResult<DriverStats> {
        if spec.total_frames == 0 {
            return Err(ChocoError::validation("total_frames must be > 0"));
        }

        let started = Instant::now();
        let range = FrameRange::first(spec.total_frames);
        self.ticker.start();

        for frame in range.iter() {
            let req = FrameRequest {
                frame,
                progress: Progress::of(frame, spec.total_frames),
                style: spec.style,
                caption: spec.caption,
            };
            let rgba = renderer.render_frame(&req)?;
            out.frame_ready(frame, &rgba)?;

            let next = FrameIndex(frame.0 + 1);
            if range.contains(next) {
                self.ticker.wait_next_frame(next);
            }
        }

        let stats = DriverStats {
            frames: range.len_frames(),
            elapsed: started.elapsed(),
        };
        tracing::debug!(elapsed_ms = stats.elapsed.as_millis() as u64, "animation complete");
        on_complete(&stats);
        Ok(stats)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/driver.rs"]
mod tests;
