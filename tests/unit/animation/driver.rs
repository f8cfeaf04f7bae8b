use super::*;
use crate::encode::sink::InMemorySink;
use crate::foundation::core::Canvas;
use std::sync::{Arc, Mutex};

/// Records every request and returns a 1x1 frame whose red channel is the frame index.
#[derive(Default)]
struct RecordingRenderer {
    calls: Vec<(u64, f64, Style, String)>,
    fail_at: Option<u64>,
}

impl FrameRenderer for RecordingRenderer {
    fn canvas(&self) -> Canvas {
        Canvas {
            width: 1,
            height: 1,
        }
    }

    fn render_frame(&mut self, req: &FrameRequest<'_>) -> ChocoResult<FrameRGBA> {
        if self.fail_at == Some(req.frame.0) {
            return Err(ChocoError::render("surface lost"));
        }
        self.calls.push((
            req.frame.0,
            req.progress.get(),
            req.style,
            req.caption.to_string(),
        ));
        Ok(FrameRGBA {
            width: 1,
            height: 1,
            data: vec![req.frame.0 as u8, 0, 0, 255],
            premultiplied: true,
        })
    }
}

/// Ticker that logs its calls into a shared list.
struct LogTicker(Arc<Mutex<Vec<String>>>);

impl FrameTicker for LogTicker {
    fn start(&mut self) {
        self.0.lock().unwrap().push("start".to_string());
    }

    fn wait_next_frame(&mut self, next: FrameIndex) {
        self.0.lock().unwrap().push(format!("wait {}", next.0));
    }
}

fn spec(total_frames: u64) -> RunSpec<'static> {
    RunSpec {
        style: Style::Melting,
        caption: "Test",
        total_frames,
    }
}

#[test]
fn renders_every_frame_in_order_then_completes_once() {
    let mut renderer = RecordingRenderer::default();
    let mut sink = InMemorySink::new();
    let mut completions = Vec::new();

    let stats = AnimationDriver::free_run()
        .run(&mut renderer, &spec(150), &mut sink, |s| {
            completions.push(s.frames)
        })
        .unwrap();

    assert_eq!(stats.frames, 150);
    assert_eq!(completions, vec![150]);
    assert_eq!(renderer.calls.len(), 150);
    for (i, (frame, progress, style, caption)) in renderer.calls.iter().enumerate() {
        assert_eq!(*frame, i as u64);
        assert!((progress - i as f64 / 150.0).abs() < 1e-12);
        assert_eq!(*style, Style::Melting);
        assert_eq!(caption, "Test");
    }
    assert_eq!(renderer.calls[0].1, 0.0);
    assert!(renderer.calls[149].1 < 1.0);
}

#[test]
fn each_painted_frame_is_handed_over_before_the_next() {
    let mut renderer = RecordingRenderer::default();
    let mut sink = InMemorySink::new();
    AnimationDriver::free_run()
        .run(&mut renderer, &spec(5), &mut sink, |_| {})
        .unwrap();

    let got: Vec<(u64, u8)> = sink
        .frames()
        .iter()
        .map(|(idx, f)| (idx.0, f.data[0]))
        .collect();
    assert_eq!(got, vec![(0, 0), (1, 1), (2, 2), (3, 3), (4, 4)]);
}

#[test]
fn waits_between_frames_but_not_after_the_last() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut driver = AnimationDriver::new(Box::new(LogTicker(Arc::clone(&log))));
    driver
        .run(
            &mut RecordingRenderer::default(),
            &spec(3),
            &mut InMemorySink::new(),
            |_| {},
        )
        .unwrap();
    assert_eq!(
        *log.lock().unwrap(),
        vec!["start", "wait 1", "wait 2"]
    );
}

#[test]
fn render_error_aborts_without_completion() {
    let mut renderer = RecordingRenderer {
        fail_at: Some(7),
        ..Default::default()
    };
    let mut sink = InMemorySink::new();
    let mut completed = false;
    let err = AnimationDriver::free_run()
        .run(&mut renderer, &spec(150), &mut sink, |_| completed = true)
        .unwrap_err();

    assert!(matches!(err, ChocoError::Render(_)));
    assert!(!completed);
    assert_eq!(sink.frames().len(), 7);
}

#[test]
fn handoff_error_aborts_without_completion() {
    struct Refuse;
    impl FrameReady for Refuse {
        fn frame_ready(&mut self, idx: FrameIndex, _frame: &FrameRGBA) -> ChocoResult<()> {
            if idx.0 == 2 {
                return Err(ChocoError::capture("encoder went away"));
            }
            Ok(())
        }
    }

    let mut renderer = RecordingRenderer::default();
    let mut completed = 0;
    let err = AnimationDriver::free_run()
        .run(&mut renderer, &spec(10), &mut Refuse, |_| completed += 1)
        .unwrap_err();
    assert!(matches!(err, ChocoError::Capture(_)));
    assert_eq!(completed, 0);
    assert_eq!(renderer.calls.len(), 3);
}

#[test]
fn zero_frames_is_rejected() {
    let err = AnimationDriver::free_run()
        .run(
            &mut RecordingRenderer::default(),
            &spec(0),
            &mut InMemorySink::new(),
            |_| panic!("no completion for an invalid run"),
        )
        .unwrap_err();
    assert!(matches!(err, ChocoError::Validation(_)));
}

#[test]
fn single_frame_run_completes_without_waiting() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut driver = AnimationDriver::new(Box::new(LogTicker(Arc::clone(&log))));
    let stats = driver
        .run(
            &mut RecordingRenderer::default(),
            &spec(1),
            &mut InMemorySink::new(),
            |_| {},
        )
        .unwrap();
    assert_eq!(stats.frames, 1);
    assert_eq!(*log.lock().unwrap(), vec!["start"]);
}
