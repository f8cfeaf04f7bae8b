use super::*;

#[test]
fn frame_range_contains_boundaries() {
    let r = FrameRange {
        start: FrameIndex(2),
        end: FrameIndex(5),
    };
    assert!(!r.contains(FrameIndex(1)));
    assert!(r.contains(FrameIndex(2)));
    assert!(r.contains(FrameIndex(4)));
    assert!(!r.contains(FrameIndex(5)));
    assert_eq!(
        FrameRange {
            start: FrameIndex(3),
            end: FrameIndex(1),
        }
        .len_frames(),
        0
    );
}

#[test]
fn frame_range_iterates_in_order() {
    let frames: Vec<u64> = FrameRange::first(4).iter().map(|f| f.0).collect();
    assert_eq!(frames, vec![0, 1, 2, 3]);
    assert_eq!(FrameRange::first(150).len_frames(), 150);
}

#[test]
fn fps_rejects_zero_and_converts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
    let fps = Fps::default();
    assert!((fps.frames_to_secs(150) - 5.0).abs() < 1e-9);
}

#[test]
fn progress_is_frame_over_total() {
    assert_eq!(Progress::of(FrameIndex(0), 150).get(), 0.0);
    assert!((Progress::of(FrameIndex(75), 150).get() - 0.5).abs() < 1e-12);
    assert!(Progress::of(FrameIndex(149), 150).get() < 1.0);
    assert_eq!(Progress::of(FrameIndex(3), 0).get(), 0.0);
    assert_eq!(Progress::from_fraction(f64::NAN).get(), 0.0);
    assert_eq!(Progress::from_fraction(3.0).get(), 1.0);
}

#[test]
fn canvas_hd_fits_u16_and_centers() {
    assert_eq!(Canvas::HD_1080.dims_u16().unwrap(), (1920, 1080));
    assert_eq!(Canvas::HD_1080.center(), Point::new(960.0, 540.0));
    let huge = Canvas {
        width: 70_000,
        height: 10,
    };
    assert!(huge.dims_u16().is_err());
}

#[test]
fn hex_colours_parse_and_format() {
    let c = Rgba8::from_hex("#1a0f0a").unwrap();
    assert_eq!(c, Rgba8::rgb(0x1a, 0x0f, 0x0a));
    assert_eq!(c.to_hex(), "#1a0f0a");

    let t = Rgba8::from_hex("#2d181000").unwrap();
    assert_eq!(t.a, 0);
    assert_eq!(t.to_hex(), "#2d181000");

    assert!(Rgba8::from_hex("1a0f0a").is_err());
    assert!(Rgba8::from_hex("#12345").is_err());
    assert!(Rgba8::from_hex("#zzzzzz").is_err());
}

#[test]
fn colour_serde_uses_hex_strings() {
    let json = serde_json::to_string(&Rgba8::rgb(0xd4, 0xa5, 0x74)).unwrap();
    assert_eq!(json, "\"#d4a574\"");
    let back: Rgba8 = serde_json::from_str(&json).unwrap();
    assert_eq!(back, Rgba8::rgb(0xd4, 0xa5, 0x74));
}
