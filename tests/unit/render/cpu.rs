use super::*;
use crate::foundation::core::{FrameIndex, Progress};
use crate::render::text::find_system_font;
use crate::scene::style::Style;

const SMALL: Canvas = Canvas {
    width: 320,
    height: 180,
};

fn renderer() -> CpuRenderer {
    CpuRenderer::new(CpuRendererOpts {
        canvas: SMALL,
        ..CpuRendererOpts::default()
    })
    .unwrap()
}

fn req(style: Style, p: f64, caption: &str) -> FrameRequest<'_> {
    FrameRequest {
        frame: FrameIndex(0),
        progress: Progress::from_fraction(p),
        style,
        caption,
    }
}

#[test]
fn oversized_canvas_is_rejected() {
    let res = CpuRenderer::new(CpuRendererOpts {
        canvas: Canvas {
            width: 100_000,
            height: 10,
        },
        ..CpuRendererOpts::default()
    });
    assert!(matches!(res, Err(ChocoError::Validation(_))));
}

#[test]
fn background_covers_the_surface() {
    let mut r = renderer();
    let frame = r.render_frame(&req(Style::Swirl, 0.0, "")).unwrap();
    assert_eq!(frame.width, 320);
    assert_eq!(frame.height, 180);
    assert_eq!(frame.data.len(), (SMALL.width * SMALL.height * 4) as usize);
    assert!(frame.premultiplied);
    let bg = palette::BACKGROUND.to_array();
    assert_eq!(frame.pixel(0, 0), Some(bg));
    assert_eq!(frame.pixel(319, 179), Some(bg));
    assert_eq!(frame.pixel(320, 0), None);
}

#[test]
fn melting_paints_inside_the_first_drip() {
    let mut r = renderer();
    let frame = r.render_frame(&req(Style::Melting, 0.5, "")).unwrap();
    let px = frame.pixel(35, 110).unwrap();
    assert_ne!(px, palette::BACKGROUND.to_array());
    assert_eq!(px[3], 255);
}

#[test]
fn swirl_strokes_through_the_centre() {
    let mut r = renderer();
    let frame = r.render_frame(&req(Style::Swirl, 0.5, "")).unwrap();
    assert_ne!(frame.pixel(160, 90).unwrap(), palette::BACKGROUND.to_array());
}

#[test]
fn rendering_is_deterministic_and_stateless() {
    for style in Style::ALL {
        let mut a = renderer();
        let first = a.render_frame(&req(style, 0.4, "")).unwrap();
        let _later = a.render_frame(&req(style, 0.9, "")).unwrap();
        let again = a.render_frame(&req(style, 0.4, "")).unwrap();
        assert_eq!(first.fingerprint(), again.fingerprint(), "{style}");

        let mut b = renderer();
        let fresh = b.render_frame(&req(style, 0.4, "")).unwrap();
        assert_eq!(first, fresh, "{style}");
    }
}

#[test]
fn progress_changes_the_picture() {
    for style in [Style::Melting, Style::Splash, Style::Pour, Style::Swirl] {
        let mut r = renderer();
        let a = r.render_frame(&req(style, 0.3, "")).unwrap();
        let b = r.render_frame(&req(style, 0.8, "")).unwrap();
        assert_ne!(a.fingerprint(), b.fingerprint(), "{style}");
    }
}

#[test]
fn caption_without_font_is_a_render_error() {
    let mut r = renderer();
    assert!(!r.has_caption_font());
    let err = r.render_frame(&req(Style::Pour, 0.5, "Test")).unwrap_err();
    assert!(matches!(err, ChocoError::Render(_)));
}

#[test]
fn caption_draws_and_leaves_no_state_behind() {
    let Some(path) = find_system_font() else {
        return;
    };
    let font = CaptionFont::from_path(&path).unwrap();
    let mut r = CpuRenderer::new(CpuRendererOpts {
        canvas: Canvas::HD_1080,
        ..CpuRendererOpts::default()
    })
    .unwrap()
    .with_caption_font(font);

    let plain = r.render_frame(&req(Style::Splash, 0.25, "")).unwrap();
    let faded = r.render_frame(&req(Style::Splash, 0.25, "Test")).unwrap();
    assert_ne!(plain.fingerprint(), faded.fingerprint());

    // Caption is invisible at progress 0.
    let zero_plain = r.render_frame(&req(Style::Splash, 0.0, "")).unwrap();
    let zero_caption = r.render_frame(&req(Style::Splash, 0.0, "Test")).unwrap();
    assert_eq!(zero_plain, zero_caption);

    let after = r.render_frame(&req(Style::Splash, 0.25, "")).unwrap();
    assert_eq!(plain, after);
}
