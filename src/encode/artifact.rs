use crate::encode::codec::VideoCodec;
use crate::foundation::core::Fps;
use crate::foundation::error::{ChocoError, ChocoResult};
use crate::scene::style::Style;
use std::path::{Path, PathBuf};

/// A finished video held in memory.
#[derive(Clone, PartialEq, Eq)]
pub struct Artifact {
    bytes: Vec<u8>,
    codec: VideoCodec,
    style: Style,
    created_at_ms: u64,
    frames: u64,
    fps: Fps,
}

impl std::fmt::Debug for Artifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Artifact")
            .field("bytes", &self.bytes.len())
            .field("codec", &self.codec)
            .field("style", &self.style)
            .field("created_at_ms", &self.created_at_ms)
            .field("frames", &self.frames)
            .field("fps", &self.fps)
            .finish()
    }
}

impl Artifact {
    /// Assemble an artifact. Empty `bytes` are rejected.
    pub fn new(
        bytes: Vec<u8>,
        codec: VideoCodec,
        style: Style,
        created_at_ms: u64,
        frames: u64,
        fps: Fps,
    ) -> ChocoResult<Self> {
        if bytes.is_empty() {
            return Err(ChocoError::capture("encoder produced no output"));
        }
        Ok(Self {
            bytes,
            codec,
            style,
            created_at_ms,
            frames,
            fps,
        })
    }

    /// Encoded container bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Container/codec of the bytes.
    pub fn codec(&self) -> VideoCodec {
        self.codec
    }

    /// MIME type of the bytes.
    pub fn mime_type(&self) -> &'static str {
        self.codec.mime_type()
    }

    /// Style the video was generated with.
    pub fn style(&self) -> Style {
        self.style
    }

    /// Milliseconds since the Unix epoch at which the run finished.
    pub fn created_at_ms(&self) -> u64 {
        self.created_at_ms
    }

    /// Number of frames captured.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Playback length, `frames / fps`.
    pub fn duration_secs(&self) -> f64 {
        self.fps.frames_to_secs(self.frames)
    }

    /// `chocolate-video-<style>-<timestamp>.<ext>`.
    pub fn file_name(&self) -> String {
        format!(
            "chocolate-video-{}-{}.{}",
            self.style.id(),
            self.created_at_ms,
            self.codec.extension()
        )
    }

    /// Write the artifact into `dir` under [`Artifact::file_name`], creating `dir` when missing.
    pub fn save_into(&self, dir: &Path) -> ChocoResult<PathBuf> {
        use anyhow::Context as _;
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output directory '{}'", dir.display()))?;
        let path = dir.join(self.file_name());
        std::fs::write(&path, &self.bytes)
            .with_context(|| format!("failed to write '{}'", path.display()))?;
        Ok(path)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/artifact.rs"]
mod tests;
