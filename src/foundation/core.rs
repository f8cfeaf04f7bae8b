use crate::foundation::error::{ChocoError, ChocoResult};

pub use kurbo::{BezPath, Point};

/// Absolute 0-based frame index within a generation run.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Half-open frame range `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRange {
    /// Inclusive range start.
    pub start: FrameIndex,
    /// Exclusive range end.
    pub end: FrameIndex,
}

impl FrameRange {
    /// Range covering `[0, frames)`.
    pub fn first(frames: u64) -> Self {
        Self {
            start: FrameIndex(0),
            end: FrameIndex(frames),
        }
    }

    /// Number of frames contained in the range.
    pub fn len_frames(self) -> u64 {
        self.end.0.saturating_sub(self.start.0)
    }

    /// Return `true` when `f` is inside `[start, end)`.
    pub fn contains(self, f: FrameIndex) -> bool {
        self.start.0 <= f.0 && f.0 < self.end.0
    }

    /// Iterate the frame indices in increasing order.
    pub fn iter(self) -> impl Iterator<Item = FrameIndex> {
        (self.start.0..self.end.0).map(FrameIndex)
    }
}

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> ChocoResult<Self> {
        if den == 0 {
            return Err(ChocoError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(ChocoError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Convert frame count to seconds.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * f64::from(self.den) / f64::from(self.num)
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 30, den: 1 }
    }
}

/// Drawing surface dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// The fixed 1920x1080 generation surface.
    pub const HD_1080: Canvas = Canvas {
        width: 1920,
        height: 1080,
    };

    /// Dimensions as `u16`, which is what the raster backend accepts.
    pub fn dims_u16(self) -> ChocoResult<(u16, u16)> {
        let w: u16 = self
            .width
            .try_into()
            .map_err(|_| ChocoError::validation("canvas width exceeds u16"))?;
        let h: u16 = self
            .height
            .try_into()
            .map_err(|_| ChocoError::validation("canvas height exceeds u16"))?;
        Ok((w, h))
    }

    /// Width as floating point.
    pub fn w(self) -> f64 {
        f64::from(self.width)
    }

    /// Height as floating point.
    pub fn h(self) -> f64 {
        f64::from(self.height)
    }

    /// Centre point of the surface.
    pub fn center(self) -> Point {
        Point::new(self.w() / 2.0, self.h() / 2.0)
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::HD_1080
    }
}

/// Normalized animation position, `frame / total_frames`.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default)]
pub struct Progress(f64);

impl Progress {
    /// Progress of `frame` within a run of `total_frames` frames.
    ///
    /// `total_frames == 0` yields zero progress.
    pub fn of(frame: FrameIndex, total_frames: u64) -> Self {
        if total_frames == 0 {
            return Self(0.0);
        }
        Self(frame.0 as f64 / total_frames as f64)
    }

    /// Build from a raw fraction, clamped into `[0, 1]`. Non-finite input maps to 0.
    pub fn from_fraction(p: f64) -> Self {
        if !p.is_finite() {
            return Self(0.0);
        }
        Self(p.clamp(0.0, 1.0))
    }

    /// Raw fraction.
    pub fn get(self) -> f64 {
        self.0
    }
}

/// Straight-alpha RGBA8 colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque colour from its channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Colour with explicit alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(s: &str) -> ChocoResult<Self> {
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| ChocoError::validation(format!("colour '{s}' must start with '#'")))?;
        let byte = |i: usize| -> ChocoResult<u8> {
            hex.get(i..i + 2)
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or_else(|| ChocoError::validation(format!("invalid hex colour '{s}'")))
        };
        match hex.len() {
            6 => Ok(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Self::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => Err(ChocoError::validation(format!(
                "hex colour '{s}' must have 6 or 8 digits"
            ))),
        }
    }

    /// Format as `#rrggbb` (or `#rrggbbaa` when not opaque).
    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Channels as an array.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl serde::Serialize for Rgba8 {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Rgba8 {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
