//! JSON-facing generator configuration.

use crate::animation::driver::AnimationDriver;
use crate::encode::codec::VideoCodec;
use crate::foundation::core::{Canvas, Fps, Rgba8};
use crate::foundation::error::{ChocoError, ChocoResult};
use crate::render::text::{CaptionFont, find_system_font};
use crate::scene::palette;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// How the driver spaces frames in wall-clock time.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Pacing {
    /// Render as fast as possible. Output timing comes from frame indices alone.
    #[default]
    FreeRun,
    /// One frame per `1 / fps` seconds, like a display refresh loop.
    Realtime,
}

impl Pacing {
    /// Driver for this pacing at `fps`.
    pub fn driver(self, fps: Fps) -> AnimationDriver {
        match self {
            Self::FreeRun => AnimationDriver::free_run(),
            Self::Realtime => AnimationDriver::paced(fps),
        }
    }
}

/// Settings for a [`crate::Generator`]. Every field has a default.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Drawing surface size.
    pub canvas: Canvas,
    /// Frames per run.
    pub total_frames: u64,
    /// Capture rate.
    pub fps: Fps,
    /// Output container/codec.
    pub codec: VideoCodec,
    /// Caption font. When unset, common system bold fonts are probed.
    pub font_path: Option<PathBuf>,
    /// Background fill, also used to flatten alpha before encoding.
    pub background: Rgba8,
    /// Frame pacing.
    pub pacing: Pacing,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::HD_1080,
            total_frames: 150,
            fps: Fps::default(),
            codec: VideoCodec::default(),
            font_path: None,
            background: palette::BACKGROUND,
            pacing: Pacing::default(),
        }
    }
}

impl GeneratorConfig {
    /// Parse a configuration from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> ChocoResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| ChocoError::serde(format!("parse generator config JSON: {e}")))
    }

    /// Parse a configuration from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> ChocoResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ChocoError::validation(format!("open generator config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Pretty JSON rendering of the configuration.
    pub fn to_json_pretty(&self) -> ChocoResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ChocoError::serde(e.to_string()))
    }

    /// Check that the configuration can drive a run.
    pub fn validate(&self) -> ChocoResult<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(ChocoError::validation("canvas width/height must be non-zero"));
        }
        self.canvas.dims_u16()?;
        if !self.canvas.width.is_multiple_of(2) || !self.canvas.height.is_multiple_of(2) {
            return Err(ChocoError::validation(
                "canvas width/height must be even (required for yuv420p output)",
            ));
        }
        if self.total_frames == 0 {
            return Err(ChocoError::validation("total_frames must be > 0"));
        }
        Fps::new(self.fps.num, self.fps.den)?;
        Ok(())
    }

    /// Load the caption font: `font_path` when set, otherwise the first system font found.
    ///
    /// `Ok(None)` means no font is configured and none was found.
    pub fn resolve_font(&self) -> ChocoResult<Option<CaptionFont>> {
        match self.font_path.as_deref() {
            Some(path) => CaptionFont::from_path(path).map(Some),
            None => match find_system_font() {
                Some(path) => {
                    tracing::debug!(path = %path.display(), "using system caption font");
                    CaptionFont::from_path(&path).map(Some)
                }
                None => Ok(None),
            },
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config/generator_config.rs"]
mod tests;
