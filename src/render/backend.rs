use crate::foundation::core::{Canvas, FrameIndex, Progress};
use crate::foundation::error::{ChocoError, ChocoResult};
use crate::foundation::math::{Fnv1a64, flatten_premul_over_bg};
use crate::scene::style::Style;

/// A rendered frame as RGBA8 pixels.
///
/// Frames produced by the CPU backend are premultiplied alpha. The `premultiplied` flag makes this
/// explicit at API boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// RGBA bytes of the pixel at `(x, y)`, if inside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Content hash of the pixel data and dimensions.
    pub fn fingerprint(&self) -> u64 {
        let mut h = Fnv1a64::new_default();
        h.write_bytes(&self.width.to_le_bytes());
        h.write_bytes(&self.height.to_le_bytes());
        h.write_bytes(&self.data);
        h.finish()
    }

    /// Opaque straight-alpha copy, with transparency flattened over `bg_rgba`.
    pub fn to_opaque_rgba8(&self, bg_rgba: [u8; 4]) -> ChocoResult<Vec<u8>> {
        let expected = (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4);
        if self.data.len() != expected {
            return Err(ChocoError::validation(
                "frame.data size mismatch with width*height*4",
            ));
        }
        if !self.premultiplied {
            return Err(ChocoError::validation(
                "only premultiplied frames can be flattened",
            ));
        }
        let mut out = vec![0u8; expected];
        flatten_premul_over_bg(&mut out, &self.data, bg_rgba);
        Ok(out)
    }
}

/// Everything the renderer needs to paint one frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameRequest<'a> {
    /// Frame index within the run.
    pub frame: FrameIndex,
    /// `frame / total_frames`.
    pub progress: Progress,
    /// Animation style.
    pub style: Style,
    /// Caption text. Empty means no caption.
    pub caption: &'a str,
}

/// Paints complete frames onto a drawing surface.
///
/// Each call overwrites the entire surface, so output depends only on the request.
pub trait FrameRenderer {
    /// Size of the drawing surface.
    fn canvas(&self) -> Canvas;
    /// Paint the frame described by `req` and read it back.
    fn render_frame(&mut self, req: &FrameRequest<'_>) -> ChocoResult<FrameRGBA>;
}

impl<R: FrameRenderer + ?Sized> FrameRenderer for Box<R> {
    fn canvas(&self) -> Canvas {
        (**self).canvas()
    }

    fn render_frame(&mut self, req: &FrameRequest<'_>) -> ChocoResult<FrameRGBA> {
        (**self).render_frame(req)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/backend.rs"]
mod tests;
