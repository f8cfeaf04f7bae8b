use crate::foundation::error::{ChocoError, ChocoResult};
use std::fmt;
use std::str::FromStr;

/// Output container and codec of an artifact.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum VideoCodec {
    /// WebM container, VP9 video. Encoded by `ffmpeg` (`libvpx-vp9`).
    #[default]
    Webm,
    /// Fragmented MP4 container, H.264 video. Encoded by `ffmpeg` (`libx264`).
    Mp4,
    /// Animated GIF, encoded in-process.
    Gif,
}

impl VideoCodec {
    /// Every codec, in preference order.
    pub const ALL: [VideoCodec; 3] = [VideoCodec::Webm, VideoCodec::Mp4, VideoCodec::Gif];

    /// Stable identifier used on the command line and in config files.
    pub fn id(self) -> &'static str {
        match self {
            Self::Webm => "webm",
            Self::Mp4 => "mp4",
            Self::Gif => "gif",
        }
    }

    /// MIME type of the produced bytes.
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Webm => "video/webm;codecs=vp9",
            Self::Mp4 => "video/mp4",
            Self::Gif => "image/gif",
        }
    }

    /// File extension (without the dot).
    pub fn extension(self) -> &'static str {
        match self {
            Self::Webm => "webm",
            Self::Mp4 => "mp4",
            Self::Gif => "gif",
        }
    }

    /// `ffmpeg` encoder needed for this codec, or `None` when encoded in-process.
    pub fn ffmpeg_encoder(self) -> Option<&'static str> {
        match self {
            Self::Webm => Some("libvpx-vp9"),
            Self::Mp4 => Some("libx264"),
            Self::Gif => None,
        }
    }

    /// `ffmpeg` output arguments (after the input) that stream the container to stdout.
    pub(crate) fn ffmpeg_output_args(self) -> &'static [&'static str] {
        match self {
            Self::Webm => &[
                "-an",
                "-c:v",
                "libvpx-vp9",
                "-pix_fmt",
                "yuv420p",
                "-b:v",
                "0",
                "-crf",
                "32",
                "-deadline",
                "realtime",
                "-cpu-used",
                "8",
                "-row-mt",
                "1",
                "-f",
                "webm",
                "pipe:1",
            ],
            // A non-seekable pipe needs a fragmented MP4 (moov up front).
            Self::Mp4 => &[
                "-an",
                "-c:v",
                "libx264",
                "-pix_fmt",
                "yuv420p",
                "-preset",
                "veryfast",
                "-movflags",
                "frag_keyframe+empty_moov+default_base_moof",
                "-f",
                "mp4",
                "pipe:1",
            ],
            Self::Gif => &[],
        }
    }
}

impl fmt::Display for VideoCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for VideoCodec {
    type Err = ChocoError;

    fn from_str(s: &str) -> ChocoResult<Self> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.id().eq_ignore_ascii_case(needle))
            .ok_or_else(|| {
                ChocoError::validation(format!(
                    "unknown codec '{s}' (expected one of: webm, mp4, gif)"
                ))
            })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/codec.rs"]
mod tests;
