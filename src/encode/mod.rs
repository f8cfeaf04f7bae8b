//! Capture pipeline: frame sinks, recorders, and the finished artifact.
//!
//! Recorders consume frames in timeline order, accumulate encoded chunks, and hand them to
//! [`capture::CaptureHandle::stop`], which assembles the [`artifact::Artifact`].

/// Finished, in-memory video.
pub mod artifact;
/// Start/stop wrapper around a recorder.
pub mod capture;
/// Output containers and codecs.
pub mod codec;
/// `ffmpeg`-based recorder (WebM/VP9 and MP4/H.264 via system `ffmpeg`).
pub mod ffmpeg;
/// In-process animated GIF recorder.
pub mod gif;
/// Generic frame sink trait and built-in sinks.
pub mod sink;
