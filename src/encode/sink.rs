use crate::encode::codec::VideoCodec;
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::ChocoResult;
use crate::render::backend::FrameRGBA;

/// Configuration provided to a [`FrameSink`] before any frame is pushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Capture rate: every pushed frame lasts `1 / fps` seconds in the output.
    pub fps: Fps,
}

/// Sink contract for consuming rendered frames in timeline order.
///
/// Ordering contract: `push_frame` is called in strictly increasing `FrameIndex` order.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> ChocoResult<()>;
    /// Push one fully painted frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ChocoResult<()>;
    /// Called once after the last frame. Returns only when all output has been flushed.
    fn end(&mut self) -> ChocoResult<()>;
}

/// A sink that encodes frames into a container and hands out the encoded chunks.
pub trait Recorder: FrameSink {
    /// Container/codec this recorder produces.
    fn codec(&self) -> VideoCodec;
    /// Drain the encoded chunks accumulated so far, in output order.
    fn take_chunks(&mut self) -> Vec<Vec<u8>>;
    /// Abandon a started recording. Buffered output may be discarded.
    ///
    /// The default finalizes through `end` and ignores its result.
    fn abort(&mut self) {
        let _ = self.end();
    }
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    ended: bool,
    frames: Vec<(FrameIndex, FrameRGBA)>,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `end` has been called.
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Borrow the captured frames.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, _cfg: SinkConfig) -> ChocoResult<()> {
        self.ended = false;
        self.frames.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ChocoResult<()> {
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> ChocoResult<()> {
        self.ended = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
