use super::*;
use crate::encode::sink::FrameSink;
use crate::foundation::core::{Canvas, FrameIndex};
use crate::render::backend::{FrameRGBA, FrameRequest};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

const CANVAS: Canvas = Canvas {
    width: 4,
    height: 4,
};

fn cfg() -> GeneratorConfig {
    GeneratorConfig {
        canvas: CANVAS,
        total_frames: 12,
        ..GeneratorConfig::default()
    }
}

/// Counts render calls; optionally fails at a given frame.
struct CountingRenderer {
    calls: Arc<AtomicUsize>,
    fail_at: Option<u64>,
}

impl FrameRenderer for CountingRenderer {
    fn canvas(&self) -> Canvas {
        CANVAS
    }

    fn render_frame(&mut self, req: &FrameRequest<'_>) -> ChocoResult<FrameRGBA> {
        if self.fail_at == Some(req.frame.0) {
            return Err(ChocoError::render("context lost"));
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(FrameRGBA {
            width: CANVAS.width,
            height: CANVAS.height,
            data: vec![255; (CANVAS.width * CANVAS.height * 4) as usize],
            premultiplied: true,
        })
    }
}

/// Emits one byte per frame.
#[derive(Default)]
struct ByteRecorder {
    chunks: Vec<Vec<u8>>,
}

impl FrameSink for ByteRecorder {
    fn begin(&mut self, _cfg: SinkConfig) -> ChocoResult<()> {
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, _frame: &FrameRGBA) -> ChocoResult<()> {
        self.chunks.push(vec![idx.0 as u8]);
        Ok(())
    }

    fn end(&mut self) -> ChocoResult<()> {
        Ok(())
    }
}

impl Recorder for ByteRecorder {
    fn codec(&self) -> VideoCodec {
        VideoCodec::Webm
    }

    fn take_chunks(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.chunks)
    }
}

/// Factory whose recorders are refused while `unsupported` is set.
fn factory(unsupported: Arc<AtomicBool>) -> impl RecorderFactory + 'static {
    move |codec: VideoCodec, _bg: Rgba8| -> ChocoResult<Box<dyn Recorder>> {
        if unsupported.load(Ordering::SeqCst) {
            return Err(ChocoError::UnsupportedCodec {
                codec: codec.id().to_string(),
                encoder: "libvpx-vp9".to_string(),
            });
        }
        let recorder: Box<dyn Recorder> = Box::new(ByteRecorder::default());
        Ok(recorder)
    }
}

fn generator(fail_at: Option<u64>) -> (Generator<CountingRenderer>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let renderer = CountingRenderer {
        calls: Arc::clone(&calls),
        fail_at,
    };
    let g = Generator::with_renderer(cfg(), renderer)
        .unwrap()
        .with_recorders(factory(Arc::new(AtomicBool::new(false))));
    (g, calls)
}

fn temp_dir(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("chocoreel-{tag}-{}", std::process::id()))
}

#[test]
fn blank_caption_never_starts_a_run() {
    let (mut g, calls) = generator(None);
    for text in ["", "   "] {
        let err = g.generate(&GenerateRequest::new(Style::Melting, text)).unwrap_err();
        assert!(matches!(err, ChocoError::Validation(_)));
        assert!(!g.can_generate(text));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(g.state(), &GenerationState::Idle);
    assert!(g.artifact().is_none());
}

#[test]
fn overlong_caption_is_rejected() {
    let (mut g, calls) = generator(None);
    let err = g
        .generate(&GenerateRequest::new(Style::Splash, "x".repeat(31)))
        .unwrap_err();
    assert!(matches!(err, ChocoError::Validation(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn successful_run_produces_artifact() {
    let (mut g, calls) = generator(None);
    assert!(g.can_generate("Choco"));

    let artifact = g
        .generate(&GenerateRequest::new(Style::Pour, "Choco"))
        .unwrap();
    assert_eq!(artifact.frames(), 12);
    assert_eq!(artifact.bytes(), (0u8..12).collect::<Vec<_>>().as_slice());
    assert_eq!(artifact.style(), Style::Pour);
    assert!((artifact.duration_secs() - 0.4).abs() < 1e-9);

    assert_eq!(calls.load(Ordering::SeqCst), 12);
    assert_eq!(g.state(), &GenerationState::Ready);
    assert!(g.can_generate("Again"));
}

#[test]
fn sequential_runs_get_distinct_names() {
    let (mut g, _) = generator(None);
    let first = g
        .generate(&GenerateRequest::new(Style::Melting, "One"))
        .unwrap()
        .clone();
    let second = g
        .generate(&GenerateRequest::new(Style::Swirl, "Two"))
        .unwrap()
        .clone();

    assert!(first.file_name().starts_with("chocolate-video-melting-"));
    assert!(second.file_name().starts_with("chocolate-video-swirl-"));
    assert!(second.created_at_ms() > first.created_at_ms());
    assert_eq!(g.artifact(), Some(&second));
}

#[test]
fn unsupported_codec_fails_and_clears_the_flight_flag() {
    let calls = Arc::new(AtomicUsize::new(0));
    let unsupported = Arc::new(AtomicBool::new(true));
    let renderer = CountingRenderer {
        calls: Arc::clone(&calls),
        fail_at: None,
    };
    let mut g = Generator::with_renderer(cfg(), renderer)
        .unwrap()
        .with_recorders(factory(Arc::clone(&unsupported)));

    let err = g
        .generate(&GenerateRequest::new(Style::Splash, "Hi"))
        .unwrap_err();
    assert!(matches!(err, ChocoError::UnsupportedCodec { .. }));
    assert!(matches!(g.state(), GenerationState::Failed(msg) if msg.contains("unsupported codec")));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(g.can_generate("Hi"));

    unsupported.store(false, Ordering::SeqCst);
    g.generate(&GenerateRequest::new(Style::Splash, "Hi"))
        .unwrap();
    assert_eq!(g.state(), &GenerationState::Ready);
}

#[test]
fn render_failure_keeps_the_previous_artifact() {
    let calls = Arc::new(AtomicUsize::new(0));
    let renderer = CountingRenderer {
        calls: Arc::clone(&calls),
        fail_at: None,
    };
    let mut g = Generator::with_renderer(cfg(), renderer)
        .unwrap()
        .with_recorders(factory(Arc::new(AtomicBool::new(false))));
    let kept = g
        .generate(&GenerateRequest::new(Style::Melting, "Keep"))
        .unwrap()
        .clone();

    g.renderer.fail_at = Some(5);
    let err = g
        .generate(&GenerateRequest::new(Style::Swirl, "Lost"))
        .unwrap_err();
    assert!(matches!(err, ChocoError::Render(_)));
    assert!(matches!(g.state(), GenerationState::Failed(_)));
    assert_eq!(g.artifact(), Some(&kept));
    assert!(g.can_generate("Retry"));
}

#[test]
fn download_without_artifact_is_a_no_op() {
    let (g, _) = generator(None);
    let dir = temp_dir("no-download");
    assert_eq!(g.download(&dir).unwrap(), None);
    assert!(!dir.exists());
}

#[test]
fn download_writes_named_file() {
    let (mut g, _) = generator(None);
    let name = g
        .generate(&GenerateRequest::new(Style::Swirl, "Save me"))
        .unwrap()
        .file_name();
    let dir = temp_dir("download");
    let path = g.download(&dir).unwrap().unwrap();
    assert_eq!(path, dir.join(&name));
    assert_eq!(std::fs::read(&path).unwrap().len(), 12);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn mismatched_renderer_surface_is_rejected() {
    let renderer = CountingRenderer {
        calls: Arc::new(AtomicUsize::new(0)),
        fail_at: None,
    };
    let err = Generator::with_renderer(GeneratorConfig::default(), renderer)
        .err()
        .unwrap();
    assert!(matches!(err, ChocoError::Validation(_)));
}

#[test]
fn run_guard_fails_an_abandoned_run() {
    let mut state = GenerationState::Ready;
    {
        let mut guard = RunGuard::enter(&mut state);
        guard.set(GenerationState::Finalizing);
    }
    assert_eq!(state, GenerationState::Failed("generation aborted".to_string()));

    let mut state = GenerationState::Idle;
    {
        let mut guard = RunGuard::enter(&mut state);
        guard.set(GenerationState::Ready);
    }
    assert_eq!(state, GenerationState::Ready);
}

#[test]
fn timestamps_strictly_increase() {
    let mut last = u64::MAX - 1;
    assert_eq!(next_timestamp_ms(&mut last), u64::MAX);
    let mut last = 0;
    let a = next_timestamp_ms(&mut last);
    let b = next_timestamp_ms(&mut last);
    assert!(b > a);
}
