use crate::encode::artifact::Artifact;
use crate::encode::codec::VideoCodec;
use crate::encode::sink::{Recorder, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{ChocoError, ChocoResult};
use crate::render::backend::FrameRGBA;
use crate::scene::style::Style;

/// Entry point of the capture pipeline.
pub struct CapturePipeline;

impl CapturePipeline {
    /// Start `recorder` for frames described by `cfg`.
    ///
    /// Fails with [`ChocoError::UnsupportedCodec`] when the recorder cannot produce its codec.
    #[tracing::instrument(level = "debug", skip(recorder), fields(codec = %recorder.codec()))]
    pub fn start(mut recorder: Box<dyn Recorder>, cfg: SinkConfig) -> ChocoResult<CaptureHandle> {
        recorder.begin(cfg)?;
        Ok(CaptureHandle {
            recorder: Some(recorder),
            cfg,
            frames: 0,
            last_idx: None,
        })
    }
}

/// A running capture. Frames go in through [`CaptureHandle::push_frame`]; [`CaptureHandle::stop`]
/// flushes the recorder and assembles the artifact.
///
/// Dropping a handle without stopping it aborts the recorder and discards its output.
pub struct CaptureHandle {
    recorder: Option<Box<dyn Recorder>>,
    cfg: SinkConfig,
    frames: u64,
    last_idx: Option<FrameIndex>,
}

impl CaptureHandle {
    /// Codec being recorded.
    pub fn codec(&self) -> Option<VideoCodec> {
        self.recorder.as_ref().map(|r| r.codec())
    }

    /// Configuration the recorder was started with.
    pub fn config(&self) -> SinkConfig {
        self.cfg
    }

    /// Frames captured so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Capture one fully painted frame.
    pub fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ChocoResult<()> {
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(ChocoError::capture(format!(
                "frame {} captured after frame {}",
                idx.0, last.0
            )));
        }
        let recorder = self
            .recorder
            .as_mut()
            .ok_or_else(|| ChocoError::capture("capture already stopped"))?;
        recorder.push_frame(idx, frame)?;
        self.last_idx = Some(idx);
        self.frames += 1;
        Ok(())
    }

    /// Stop capturing. Returns once the recorder has flushed everything it encoded.
    #[tracing::instrument(level = "debug", skip(self), fields(frames = self.frames))]
    pub fn stop(mut self, style: Style, created_at_ms: u64) -> ChocoResult<Artifact> {
        let mut recorder = self
            .recorder
            .take()
            .ok_or_else(|| ChocoError::capture("capture already stopped"))?;
        recorder.end()?;
        let chunks = recorder.take_chunks();
        tracing::debug!(chunks = chunks.len(), "capture stopped");
        Artifact::new(
            chunks.concat(),
            recorder.codec(),
            style,
            created_at_ms,
            self.frames,
            self.cfg.fps,
        )
    }
}

impl Drop for CaptureHandle {
    fn drop(&mut self) {
        if let Some(mut recorder) = self.recorder.take() {
            tracing::debug!(frames = self.frames, "capture abandoned; aborting recorder");
            recorder.abort();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/capture.rs"]
mod tests;
