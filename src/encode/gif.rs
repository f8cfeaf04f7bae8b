use crate::encode::codec::VideoCodec;
use crate::encode::sink::{FrameSink, Recorder, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{ChocoError, ChocoResult};
use crate::render::backend::FrameRGBA;
use image::codecs::gif::{GifEncoder, Repeat};
use std::sync::{Arc, Mutex};

/// Options for [`GifRecorder`].
#[derive(Clone, Copy, Debug)]
pub struct GifRecorderOpts {
    /// Background color used to flatten alpha (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
    /// Palette quantization speed, 1 (best) to 30 (fastest).
    pub speed: i32,
}

impl Default for GifRecorderOpts {
    fn default() -> Self {
        Self {
            bg_rgba: [0, 0, 0, 255],
            speed: 20,
        }
    }
}

/// `Write` target that keeps every encoder write as a separate chunk.
#[derive(Clone, Default)]
struct ChunkWriter(Arc<Mutex<Vec<Vec<u8>>>>);

impl ChunkWriter {
    fn take(&self) -> Vec<Vec<u8>> {
        match self.0.lock() {
            Ok(mut chunks) => std::mem::take(&mut *chunks),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl std::io::Write for ChunkWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let mut chunks = self
            .0
            .lock()
            .map_err(|_| std::io::Error::other("gif chunk buffer poisoned"))?;
        chunks.push(buf.to_vec());
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Recorder that encodes an infinitely looping animated GIF in-process.
///
/// GIF frame delays have 10 ms resolution, so the stored delay is the nearest representable value
/// to `1 / fps`.
pub struct GifRecorder {
    opts: GifRecorderOpts,
    encoder: Option<GifEncoder<ChunkWriter>>,
    out: ChunkWriter,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl GifRecorder {
    /// Create a recorder with `opts`.
    pub fn new(opts: GifRecorderOpts) -> Self {
        Self {
            opts,
            encoder: None,
            out: ChunkWriter::default(),
            cfg: None,
            last_idx: None,
        }
    }
}

impl FrameSink for GifRecorder {
    fn begin(&mut self, cfg: SinkConfig) -> ChocoResult<()> {
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(ChocoError::validation("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(ChocoError::validation(
                "gif recorder width/height must be non-zero",
            ));
        }
        if cfg.width > u32::from(u16::MAX) || cfg.height > u32::from(u16::MAX) {
            return Err(ChocoError::validation(
                "gif recorder width/height must fit in u16",
            ));
        }
        if self.encoder.is_some() {
            return Err(ChocoError::capture("gif recorder already started"));
        }

        let mut encoder =
            GifEncoder::new_with_speed(self.out.clone(), self.opts.speed.clamp(1, 30));
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|e| ChocoError::capture(format!("gif setup failed: {e}")))?;

        self.out.take();
        self.encoder = Some(encoder);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ChocoResult<()> {
        let cfg = self
            .cfg
            .ok_or_else(|| ChocoError::capture("gif recorder not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(ChocoError::capture(
                "gif recorder received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);

        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(ChocoError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        let Some(encoder) = self.encoder.as_mut() else {
            return Err(ChocoError::capture("gif recorder is already finalized"));
        };

        let rgba = frame.to_opaque_rgba8(self.opts.bg_rgba)?;
        let buffer = image::RgbaImage::from_raw(frame.width, frame.height, rgba)
            .ok_or_else(|| ChocoError::validation("frame.data size mismatch with width*height*4"))?;
        let delay = image::Delay::from_numer_denom_ms(1000 * cfg.fps.den, cfg.fps.num);
        encoder
            .encode_frame(image::Frame::from_parts(buffer, 0, 0, delay))
            .map_err(|e| ChocoError::capture(format!("gif frame {} failed: {e}", idx.0)))?;
        Ok(())
    }

    fn end(&mut self) -> ChocoResult<()> {
        let encoder = self
            .encoder
            .take()
            .ok_or_else(|| ChocoError::capture("gif recorder not started"))?;
        // Dropping the encoder writes the GIF trailer.
        drop(encoder);
        self.cfg = None;
        Ok(())
    }
}

impl Recorder for GifRecorder {
    fn codec(&self) -> VideoCodec {
        VideoCodec::Gif
    }

    fn take_chunks(&mut self) -> Vec<Vec<u8>> {
        if self.encoder.is_some() {
            return Vec::new();
        }
        self.out.take()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/gif.rs"]
mod tests;
