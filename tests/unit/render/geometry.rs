use super::*;
use crate::foundation::core::FrameIndex;

const HD: Canvas = Canvas::HD_1080;

fn run_progress() -> impl Iterator<Item = Progress> {
    (0..150).map(|f| Progress::of(FrameIndex(f), 150))
}

#[test]
fn melting_tip_starts_at_100_and_descends_monotonically() {
    assert_eq!(melt_tip_y(HD, Progress::from_fraction(0.0)), 100.0);
    let mut last = f64::MIN;
    for p in run_progress() {
        let y = melt_tip_y(HD, p);
        assert!(y >= last);
        assert!(y <= HD.h() * 0.8);
        last = y;
    }
    assert!((melt_tip_y(HD, Progress::from_fraction(1.0)) - 864.0).abs() < 1e-9);
    // Square-root easing: a quarter of the way in, the tip is half way down.
    let quarter = melt_tip_y(HD, Progress::from_fraction(0.25));
    assert!((quarter - (100.0 + 0.5 * 764.0)).abs() < 1e-9);
}

#[test]
fn melting_drips_are_evenly_spaced() {
    let drips = melt_drips(HD, Progress::from_fraction(0.3));
    assert_eq!(drips.len(), MELT_DRIPS);
    let spacing = 1920.0 / 9.0;
    for (i, d) in drips.iter().enumerate() {
        assert!((d.x - spacing * (i as f64 + 1.0)).abs() < 1e-9);
        assert_eq!(d.start_y, MELT_START_Y);
    }
}

#[test]
fn first_melting_frame_paints_no_drips() {
    // The gradient spans start_y..tip_y, which has zero length at progress 0.
    assert!(style_marks(Style::Melting, HD, Progress::from_fraction(0.0)).is_empty());
    assert_eq!(
        style_marks(Style::Melting, HD, Progress::from_fraction(0.1)).len(),
        MELT_DRIPS
    );
}

#[test]
fn drip_outline_is_closed_and_reaches_below_the_tip() {
    let d = Drip {
        x: 500.0,
        start_y: 100.0,
        tip_y: 600.0,
    };
    let path = d.outline();
    assert!(matches!(
        path.elements().last(),
        Some(kurbo::PathEl::ClosePath)
    ));
    let bbox = path.bounding_box();
    assert!(bbox.y1 > 600.0 && bbox.y1 <= 620.0);
    assert!(bbox.x0 >= 440.0 && bbox.x1 <= 560.0);
}

#[test]
fn splash_distance_grows_and_radius_shrinks() {
    let mut last_d = f64::MIN;
    let mut last_r = f64::MAX;
    for p in run_progress() {
        let d = splash_distance(p);
        let r = splash_radius(p);
        assert!(d >= last_d);
        assert!(r <= last_r);
        last_d = d;
        last_r = r;
    }
    assert_eq!(splash_distance(Progress::from_fraction(0.0)), 0.0);
    assert_eq!(splash_radius(Progress::from_fraction(0.0)), 80.0);
    assert_eq!(splash_radius(Progress::from_fraction(1.0)), 40.0);
}

#[test]
fn splash_blobs_sit_on_a_circle_around_the_centre() {
    let p = Progress::from_fraction(0.6);
    let blobs = splash_blobs(HD, p);
    assert_eq!(blobs.len(), SPLASH_BLOBS);
    let expected = splash_distance(p);
    for b in &blobs {
        let d = (b.center - HD.center()).hypot();
        assert!((d - expected).abs() < 1e-9);
        assert_eq!(b.radius, splash_radius(p));
    }
    let first = blobs[0].center;
    assert!((first.y - 540.0).abs() < 1e-9);
    assert!(first.x > 960.0);
}

#[test]
fn pour_pool_is_absent_until_the_tip_passes_half_height() {
    let mut last = 0.0;
    for p in run_progress() {
        let g = pour_geometry(HD, p);
        if g.tip_y <= HD.h() * 0.5 {
            assert_eq!(g.pool_rx, 0.0);
        } else {
            assert!(g.pool_rx > 0.0);
        }
        assert!(g.pool_rx >= last);
        last = g.pool_rx;
    }
    let end = pour_geometry(HD, Progress::from_fraction(1.0));
    assert!((end.tip_y - 756.0).abs() < 1e-9);
    assert!((end.pool_rx - POUR_POOL_MAX_RX).abs() < 1e-9);
}

#[test]
fn pour_marks_include_pool_only_when_it_has_width() {
    let early = style_marks(Style::Pour, HD, Progress::from_fraction(0.2));
    assert_eq!(early.len(), 1);
    let late = style_marks(Style::Pour, HD, Progress::from_fraction(0.95));
    assert_eq!(late.len(), 2);
    assert_eq!(late[1].paint, Paint::Solid(palette::DARK));
}

#[test]
fn swirl_point_count_is_non_decreasing_and_capped() {
    let mut last = 0;
    for p in run_progress() {
        let n = swirl_point_count(p);
        assert!(n >= last);
        assert!(n <= SWIRL_MAX_POINTS);
        last = n;
    }
    assert_eq!(swirl_point_count(Progress::from_fraction(0.0)), 1);
    assert_eq!(swirl_point_count(Progress::from_fraction(0.999)), 200);
    assert_eq!(swirl_point_count(Progress::from_fraction(1.0)), 200);
}

#[test]
fn swirl_spirals_alternate_colour_and_share_point_count() {
    let p = Progress::from_fraction(0.5);
    let spirals = swirl_spirals(HD, p);
    assert_eq!(spirals.len(), SWIRL_SPIRALS);
    assert_eq!(spirals[0].color, palette::MID);
    assert_eq!(spirals[1].color, palette::DARK);
    assert_eq!(spirals[2].color, palette::MID);
    for s in &spirals {
        assert_eq!(s.points.len(), swirl_point_count(p));
        assert_eq!(s.points[0], HD.center());
    }
    // Point i lies at radius 3i.
    let pt = spirals[1].points[10];
    assert!(((pt - HD.center()).hypot() - 30.0).abs() < 1e-9);
}

#[test]
fn swirl_single_point_strokes_nothing() {
    assert!(style_marks(Style::Swirl, HD, Progress::from_fraction(0.0)).is_empty());
    let marks = style_marks(Style::Swirl, HD, Progress::from_fraction(0.5));
    assert_eq!(marks.len(), SWIRL_SPIRALS);
    assert!(marks.iter().all(|m| m.kind
        == MarkKind::Stroke {
            width: SWIRL_STROKE_WIDTH
        }));
}

#[test]
fn marks_are_deterministic() {
    for style in Style::ALL {
        for p in [0.0, 0.33, 0.72] {
            let p = Progress::from_fraction(p);
            assert_eq!(style_marks(style, HD, p), style_marks(style, HD, p));
        }
    }
}
