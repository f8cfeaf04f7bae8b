//! Chocoreel renders short procedural "chocolate" clips with a caption and captures them to video.
//!
//! A run paints a fixed number of frames for one of four [`Style`]s on the CPU, hands every frame
//! to a recorder as soon as it is painted, and keeps the encoded [`Artifact`] in memory until it is
//! saved:
//!
//! - Configure a [`GeneratorConfig`] (or use the defaults: 1920x1080, 150 frames at 30 fps, WebM)
//! - Create a [`Generator`] and call [`Generator::generate`]
//! - Save the result with [`Generator::download`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Frame loop and pacing.
pub mod animation;
/// Generator configuration.
pub mod config;
/// Capture pipeline and recorders.
pub mod encode;
/// Frame rendering.
pub mod render;
/// Styles, palette and caption.
pub mod scene;
/// Run lifecycle.
pub mod session;

pub use crate::foundation::core::{
    BezPath, Canvas, Fps, FrameIndex, FrameRange, Point, Progress, Rgba8,
};
pub use crate::foundation::error::{ChocoError, ChocoResult};

pub use crate::animation::driver::{AnimationDriver, DriverStats, FrameReady, RunSpec};
pub use crate::animation::ticker::{FrameTicker, FreeRunTicker, PacedTicker};
pub use crate::config::{GeneratorConfig, Pacing};
pub use crate::encode::artifact::Artifact;
pub use crate::encode::capture::{CaptureHandle, CapturePipeline};
pub use crate::encode::codec::VideoCodec;
pub use crate::encode::ffmpeg::{FfmpegRecorder, FfmpegRecorderOpts, is_ffmpeg_on_path};
pub use crate::encode::gif::{GifRecorder, GifRecorderOpts};
pub use crate::encode::sink::{FrameSink, InMemorySink, Recorder, SinkConfig};
pub use crate::render::backend::{FrameRGBA, FrameRenderer, FrameRequest};
pub use crate::render::cpu::{CpuRenderer, CpuRendererOpts};
pub use crate::render::text::{CaptionFont, find_system_font};
pub use crate::scene::caption::Caption;
pub use crate::scene::style::Style;
pub use crate::session::generator::{
    GenerateRequest, GenerationState, Generator, RecorderFactory, SystemRecorders,
};
