use crate::animation::driver::{AnimationDriver, RunSpec};
use crate::config::GeneratorConfig;
use crate::encode::artifact::Artifact;
use crate::encode::capture::CapturePipeline;
use crate::encode::codec::VideoCodec;
use crate::encode::ffmpeg::{FfmpegRecorder, FfmpegRecorderOpts};
use crate::encode::gif::{GifRecorder, GifRecorderOpts};
use crate::encode::sink::{Recorder, SinkConfig};
use crate::foundation::core::Rgba8;
use crate::foundation::error::{ChocoError, ChocoResult};
use crate::render::backend::FrameRenderer;
use crate::render::cpu::{CpuRenderer, CpuRendererOpts};
use crate::scene::caption::{Caption, is_acceptable};
use crate::scene::palette;
use crate::scene::style::Style;
use std::path::{Path, PathBuf};

/// Where a [`Generator`] is in its run lifecycle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum GenerationState {
    /// No run has happened yet.
    #[default]
    Idle,
    /// Frames are being painted and captured.
    Running,
    /// All frames are captured; waiting for the encoder to flush.
    Finalizing,
    /// The last run produced an artifact.
    Ready,
    /// The last run failed.
    Failed(String),
}

impl GenerationState {
    /// Whether a run is in flight.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Running | Self::Finalizing)
    }
}

/// Moves the state to `Failed` if a run exits while still in flight, including by unwinding.
struct RunGuard<'a> {
    state: &'a mut GenerationState,
}

impl<'a> RunGuard<'a> {
    fn enter(state: &'a mut GenerationState) -> Self {
        *state = GenerationState::Running;
        Self { state }
    }

    fn set(&mut self, next: GenerationState) {
        *self.state = next;
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if self.state.is_in_flight() {
            *self.state = GenerationState::Failed("generation aborted".to_string());
        }
    }
}

/// Builds the recorder for each run.
pub trait RecorderFactory {
    /// Recorder producing `codec`, flattening alpha over `background`.
    fn create(&self, codec: VideoCodec, background: Rgba8) -> ChocoResult<Box<dyn Recorder>>;
}

impl<F> RecorderFactory for F
where
    F: Fn(VideoCodec, Rgba8) -> ChocoResult<Box<dyn Recorder>>,
{
    fn create(&self, codec: VideoCodec, background: Rgba8) -> ChocoResult<Box<dyn Recorder>> {
        self(codec, background)
    }
}

/// Stock recorders: system `ffmpeg` for WebM/MP4, in-process GIF.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemRecorders;

impl RecorderFactory for SystemRecorders {
    fn create(&self, codec: VideoCodec, background: Rgba8) -> ChocoResult<Box<dyn Recorder>> {
        let bg_rgba = background.to_array();
        let recorder: Box<dyn Recorder> = match codec {
            VideoCodec::Webm | VideoCodec::Mp4 => Box::new(FfmpegRecorder::new(FfmpegRecorderOpts {
                bg_rgba,
                ..FfmpegRecorderOpts::new(codec)
            })?),
            VideoCodec::Gif => Box::new(GifRecorder::new(GifRecorderOpts {
                bg_rgba,
                ..GifRecorderOpts::default()
            })),
        };
        Ok(recorder)
    }
}

/// One generation request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerateRequest {
    /// Animation style.
    pub style: Style,
    /// Caption text, 1 to 30 characters, not blank.
    pub text: String,
}

impl GenerateRequest {
    /// Request for `style` captioned with `text`.
    pub fn new(style: Style, text: impl Into<String>) -> Self {
        Self {
            style,
            text: text.into(),
        }
    }
}

/// Runs generations one at a time and keeps the latest artifact.
///
/// `generate` takes `&mut self`, so at most one run is in flight per generator.
pub struct Generator<R: FrameRenderer> {
    cfg: GeneratorConfig,
    renderer: R,
    driver: AnimationDriver,
    recorders: Box<dyn RecorderFactory>,
    state: GenerationState,
    artifact: Option<Artifact>,
    last_timestamp_ms: u64,
}

impl Generator<CpuRenderer> {
    /// Generator with the CPU renderer, stock recorders and the configured pacing.
    ///
    /// Fails when no caption font can be loaded.
    pub fn from_config(cfg: GeneratorConfig) -> ChocoResult<Self> {
        cfg.validate()?;
        let font = cfg.resolve_font()?.ok_or_else(|| {
            ChocoError::validation(
                "no caption font found; set font_path (or pass --font) to a TTF/OTF file",
            )
        })?;
        let renderer = CpuRenderer::new(CpuRendererOpts {
            canvas: cfg.canvas,
            background: cfg.background,
            caption_color: palette::CAPTION,
        })?
        .with_caption_font(font);
        Self::with_renderer(cfg, renderer)
    }
}

impl<R: FrameRenderer> Generator<R> {
    /// Generator around an existing renderer. The renderer surface must match `cfg.canvas`.
    pub fn with_renderer(cfg: GeneratorConfig, renderer: R) -> ChocoResult<Self> {
        cfg.validate()?;
        if renderer.canvas() != cfg.canvas {
            return Err(ChocoError::validation(format!(
                "renderer surface {}x{} does not match configured canvas {}x{}",
                renderer.canvas().width,
                renderer.canvas().height,
                cfg.canvas.width,
                cfg.canvas.height
            )));
        }
        let driver = cfg.pacing.driver(cfg.fps);
        Ok(Self {
            cfg,
            renderer,
            driver,
            recorders: Box::new(SystemRecorders),
            state: GenerationState::Idle,
            artifact: None,
            last_timestamp_ms: 0,
        })
    }

    /// Replace the recorder factory.
    pub fn with_recorders(mut self, recorders: impl RecorderFactory + 'static) -> Self {
        self.recorders = Box::new(recorders);
        self
    }

    /// Replace the driver (and with it the frame pacing).
    pub fn with_driver(mut self, driver: AnimationDriver) -> Self {
        self.driver = driver;
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &GeneratorConfig {
        &self.cfg
    }

    /// Current lifecycle state.
    pub fn state(&self) -> &GenerationState {
        &self.state
    }

    /// Artifact of the most recent successful run.
    pub fn artifact(&self) -> Option<&Artifact> {
        self.artifact.as_ref()
    }

    /// Whether `generate` would start a run for `text`.
    pub fn can_generate(&self, text: &str) -> bool {
        !self.state.is_in_flight() && is_acceptable(text)
    }

    /// Run one generation and return the new artifact.
    ///
    /// The caption is validated before anything is painted. On failure the previous artifact is
    /// kept and the state becomes [`GenerationState::Failed`].
    #[tracing::instrument(level = "info", skip(self), fields(style = %req.style, codec = %self.cfg.codec))]
    pub fn generate(&mut self, req: &GenerateRequest) -> ChocoResult<&Artifact> {
        let caption = Caption::new(&req.text)?;
        if self.state.is_in_flight() {
            return Err(ChocoError::validation("a generation is already in progress"));
        }

        let mut guard = RunGuard::enter(&mut self.state);
        let res = run_once(
            &mut self.renderer,
            &mut self.driver,
            self.recorders.as_ref(),
            &self.cfg,
            req.style,
            &caption,
            &mut guard,
            &mut self.last_timestamp_ms,
        );

        match res {
            Ok(artifact) => {
                tracing::info!(
                    file = %artifact.file_name(),
                    bytes = artifact.bytes().len(),
                    duration_secs = artifact.duration_secs(),
                    "artifact ready"
                );
                guard.set(GenerationState::Ready);
                drop(guard);
                Ok(self.artifact.insert(artifact))
            }
            Err(e) => {
                tracing::warn!(error = %e, "generation failed");
                guard.set(GenerationState::Failed(e.to_string()));
                Err(e)
            }
        }
    }

    /// Save the latest artifact into `dir`. `Ok(None)` when there is nothing to save.
    pub fn download(&self, dir: &Path) -> ChocoResult<Option<PathBuf>> {
        self.artifact
            .as_ref()
            .map(|artifact| artifact.save_into(dir))
            .transpose()
    }
}

#[allow(clippy::too_many_arguments)]
fn run_once(
    renderer: &mut dyn FrameRenderer,
    driver: &mut AnimationDriver,
    recorders: &dyn RecorderFactory,
    cfg: &GeneratorConfig,
    style: Style,
    caption: &Caption,
    guard: &mut RunGuard<'_>,
    last_timestamp_ms: &mut u64,
) -> ChocoResult<Artifact> {
    let canvas = renderer.canvas();
    let recorder = recorders.create(cfg.codec, cfg.background)?;
    let mut capture = CapturePipeline::start(
        recorder,
        SinkConfig {
            width: canvas.width,
            height: canvas.height,
            fps: cfg.fps,
        },
    )?;

    let spec = RunSpec {
        style,
        caption: caption.as_str(),
        total_frames: cfg.total_frames,
    };
    driver.run(renderer, &spec, &mut capture, |_| {
        guard.set(GenerationState::Finalizing)
    })?;

    let created_at_ms = next_timestamp_ms(last_timestamp_ms);
    capture.stop(style, created_at_ms)
}

/// Wall-clock milliseconds, bumped so every call returns a larger value than the previous one.
fn next_timestamp_ms(last: &mut u64) -> u64 {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    let ts = now.max(last.saturating_add(1));
    *last = ts;
    ts
}

#[cfg(test)]
#[path = "../../tests/unit/session/generator.rs"]
mod tests;
