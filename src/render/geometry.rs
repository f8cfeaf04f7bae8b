//! Closed-form geometry for each animation style.
//!
//! Every function here is a pure function of the surface size and progress, so re-rendering the
//! same progress always yields the same marks. The raster backend only executes the resulting
//! [`Mark`] list.

use crate::animation::ease::Ease;
use crate::foundation::core::{BezPath, Canvas, Point, Progress, Rgba8};
use crate::scene::palette;
use crate::scene::style::Style;
use kurbo::Shape;
use std::f64::consts::TAU;

const PATH_TOLERANCE: f64 = 0.1;

/// Number of drips in the melting style.
pub const MELT_DRIPS: usize = 8;
/// Where drips start, in pixels from the top edge.
pub const MELT_START_Y: f64 = 100.0;
/// Number of blobs in the splash style.
pub const SPLASH_BLOBS: usize = 12;
/// Distance blobs travel from the centre by the end of the run.
pub const SPLASH_MAX_DISTANCE: f64 = 300.0;
/// Blob radius at progress 0.
pub const SPLASH_MAX_RADIUS: f64 = 80.0;
/// Stream origin above the top edge.
pub const POUR_START_Y: f64 = -100.0;
/// Maximum horizontal radius of the pool.
pub const POUR_POOL_MAX_RX: f64 = 400.0;
/// Vertical radius of the pool.
pub const POUR_POOL_RY: f64 = 60.0;
/// Number of interleaved spirals in the swirl style.
pub const SWIRL_SPIRALS: usize = 3;
/// Maximum plotted points per spiral.
pub const SWIRL_MAX_POINTS: usize = 200;
/// Stroke width of every spiral.
pub const SWIRL_STROKE_WIDTH: f64 = 40.0;

/// A gradient colour stop at `offset` in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    /// Position along the gradient.
    pub offset: f32,
    /// Colour at this position.
    pub color: Rgba8,
}

const fn stop(offset: f32, color: Rgba8) -> GradientStop {
    GradientStop { offset, color }
}

/// How a mark is coloured.
#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
    /// A single colour.
    Solid(Rgba8),
    /// Linear gradient from `start` to `end`.
    Linear {
        /// Gradient origin (offset 0).
        start: Point,
        /// Gradient end (offset 1).
        end: Point,
        /// Colour stops in increasing offset order.
        stops: Vec<GradientStop>,
    },
    /// Radial gradient centred on `center`.
    Radial {
        /// Gradient centre (offset 0).
        center: Point,
        /// Radius at offset 1.
        radius: f64,
        /// Colour stops in increasing offset order.
        stops: Vec<GradientStop>,
    },
}

impl Paint {
    /// A gradient with zero extent paints nothing.
    pub fn is_degenerate(&self) -> bool {
        match self {
            Paint::Solid(_) => false,
            Paint::Linear { start, end, .. } => (*end - *start).hypot() < 1e-9,
            Paint::Radial { radius, .. } => *radius <= 0.0,
        }
    }
}

/// Whether a mark's path is filled or stroked.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MarkKind {
    /// Non-zero fill of the path.
    Fill,
    /// Stroke with round caps and joins.
    Stroke {
        /// Stroke width in pixels.
        width: f64,
    },
}

/// One draw operation: a path, how to apply it, and its paint.
#[derive(Clone, Debug, PartialEq)]
pub struct Mark {
    /// Geometry in surface pixels.
    pub path: BezPath,
    /// Fill or stroke.
    pub kind: MarkKind,
    /// Colour source.
    pub paint: Paint,
}

impl Mark {
    fn fill(path: BezPath, paint: Paint) -> Self {
        Self {
            path,
            kind: MarkKind::Fill,
            paint,
        }
    }
}

/// Marks for `style` at `progress`, in paint order.
pub fn style_marks(style: Style, canvas: Canvas, progress: Progress) -> Vec<Mark> {
    let mut marks: Vec<Mark> = match style {
        Style::Melting => melt_drips(canvas, progress)
            .iter()
            .map(Drip::mark)
            .collect(),
        Style::Splash => splash_blobs(canvas, progress)
            .iter()
            .map(Blob::mark)
            .collect(),
        Style::Pour => pour_geometry(canvas, progress).marks(),
        Style::Swirl => swirl_spirals(canvas, progress)
            .iter()
            .filter_map(Spiral::mark)
            .collect(),
    };
    marks.retain(|m| !m.paint.is_degenerate());
    marks
}

/// A single drip of the melting style.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Drip {
    /// Horizontal centre.
    pub x: f64,
    /// Where the drip hangs from.
    pub start_y: f64,
    /// Current tip position.
    pub tip_y: f64,
}

impl Drip {
    /// Closed outline: two curved flanks meeting in a rounded tip.
    pub fn outline(&self) -> BezPath {
        let Drip { x, start_y, tip_y } = *self;
        let mut p = BezPath::new();
        p.move_to((x - 40.0, start_y));
        p.curve_to(
            (x - 60.0, tip_y * 0.3),
            (x - 50.0, tip_y * 0.6),
            (x - 30.0, tip_y),
        );
        p.curve_to(
            (x - 20.0, tip_y + 20.0),
            (x + 20.0, tip_y + 20.0),
            (x + 30.0, tip_y),
        );
        p.curve_to(
            (x + 50.0, tip_y * 0.6),
            (x + 60.0, tip_y * 0.3),
            (x + 40.0, start_y),
        );
        p.close_path();
        p
    }

    /// Outline filled with a dark-mid-dark vertical gradient down to the tip.
    pub fn mark(&self) -> Mark {
        Mark::fill(
            self.outline(),
            Paint::Linear {
                start: Point::new(self.x, self.start_y),
                end: Point::new(self.x, self.tip_y),
                stops: vec![
                    stop(0.0, palette::DARK),
                    stop(0.5, palette::MID),
                    stop(1.0, palette::DEEP),
                ],
            },
        )
    }
}

/// Tip height of every drip: square-root eased from [`MELT_START_Y`] towards `0.8 * height`.
pub fn melt_tip_y(canvas: Canvas, progress: Progress) -> f64 {
    Ease::Power(0.5).lerp(MELT_START_Y, canvas.h() * 0.8, progress.get())
}

/// Drips evenly spaced across the width.
pub fn melt_drips(canvas: Canvas, progress: Progress) -> Vec<Drip> {
    let spacing = canvas.w() / (MELT_DRIPS as f64 + 1.0);
    let tip_y = melt_tip_y(canvas, progress);
    (0..MELT_DRIPS)
        .map(|i| Drip {
            x: spacing * (i as f64 + 1.0),
            start_y: MELT_START_Y,
            tip_y,
        })
        .collect()
}

/// A radial splash blob.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Blob {
    /// Blob centre.
    pub center: Point,
    /// Blob radius.
    pub radius: f64,
}

impl Blob {
    /// Disc filled with a radial gradient that fades out at the rim.
    pub fn mark(&self) -> Mark {
        let disc = kurbo::Circle::new(self.center, self.radius);
        Mark::fill(
            disc.to_path(PATH_TOLERANCE),
            Paint::Radial {
                center: self.center,
                radius: self.radius,
                stops: vec![
                    stop(0.0, palette::MID),
                    stop(0.7, palette::DARK),
                    stop(1.0, palette::DEEP_CLEAR),
                ],
            },
        )
    }
}

/// Distance of every blob from the surface centre.
pub fn splash_distance(progress: Progress) -> f64 {
    SPLASH_MAX_DISTANCE * Ease::Power(0.7).apply(progress.get())
}

/// Radius of every blob; shrinks linearly to half size.
pub fn splash_radius(progress: Progress) -> f64 {
    SPLASH_MAX_RADIUS * (1.0 - 0.5 * progress.get())
}

/// Blobs arranged evenly around the surface centre.
pub fn splash_blobs(canvas: Canvas, progress: Progress) -> Vec<Blob> {
    let c = canvas.center();
    let distance = splash_distance(progress);
    let radius = splash_radius(progress);
    (0..SPLASH_BLOBS)
        .map(|i| {
            let angle = TAU * i as f64 / SPLASH_BLOBS as f64;
            Blob {
                center: Point::new(c.x + angle.cos() * distance, c.y + angle.sin() * distance),
                radius,
            }
        })
        .collect()
}

/// The pour stream and its pool.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pour {
    /// Horizontal centre of the stream.
    pub x: f64,
    /// Top of the stream, above the frame.
    pub start_y: f64,
    /// Current bottom of the stream.
    pub tip_y: f64,
    /// Where the stream lands and the pool sits.
    pub end_y: f64,
    /// Horizontal pool radius; zero until the tip passes half height.
    pub pool_rx: f64,
}

impl Pour {
    /// Trapezoid stream.
    pub fn stream_outline(&self) -> BezPath {
        let mut p = BezPath::new();
        p.move_to((self.x - 30.0, self.start_y));
        p.line_to((self.x - 40.0, self.tip_y));
        p.line_to((self.x + 40.0, self.tip_y));
        p.line_to((self.x + 30.0, self.start_y));
        p.close_path();
        p
    }

    fn marks(&self) -> Vec<Mark> {
        let mut out = vec![Mark::fill(
            self.stream_outline(),
            Paint::Linear {
                start: Point::new(self.x, self.start_y),
                end: Point::new(self.x, self.tip_y),
                stops: vec![stop(0.0, palette::MID), stop(1.0, palette::DARK)],
            },
        )];
        if self.pool_rx > 0.0 {
            let pool = kurbo::Ellipse::new((self.x, self.end_y), (self.pool_rx, POUR_POOL_RY), 0.0);
            out.push(Mark::fill(
                pool.to_path(PATH_TOLERANCE),
                Paint::Solid(palette::DARK),
            ));
        }
        out
    }
}

/// Stream falls linearly to 70% height; the pool widens once the tip is past 50%.
pub fn pour_geometry(canvas: Canvas, progress: Progress) -> Pour {
    let end_y = canvas.h() * 0.7;
    let tip_y = Ease::Linear.lerp(POUR_START_Y, end_y, progress.get());
    let half = canvas.h() * 0.5;
    let pool_rx = if tip_y > half {
        POUR_POOL_MAX_RX * (tip_y - half) / (canvas.h() * 0.2)
    } else {
        0.0
    };
    Pour {
        x: canvas.w() / 2.0,
        start_y: POUR_START_Y,
        tip_y,
        end_y,
        pool_rx,
    }
}

/// One spiral polyline of the swirl style.
#[derive(Clone, Debug, PartialEq)]
pub struct Spiral {
    /// Plotted points from the centre outwards.
    pub points: Vec<Point>,
    /// Stroke colour.
    pub color: Rgba8,
}

impl Spiral {
    /// Thick rounded stroke through the points. A single point draws nothing.
    pub fn mark(&self) -> Option<Mark> {
        let (first, rest) = self.points.split_first()?;
        if rest.is_empty() {
            return None;
        }
        let mut p = BezPath::new();
        p.move_to(*first);
        for pt in rest {
            p.line_to(*pt);
        }
        Some(Mark {
            path: p,
            kind: MarkKind::Stroke {
                width: SWIRL_STROKE_WIDTH,
            },
            paint: Paint::Solid(self.color),
        })
    }
}

/// Points plotted per spiral at `progress`.
pub fn swirl_point_count(progress: Progress) -> usize {
    let reached = (progress.get() * SWIRL_MAX_POINTS as f64).floor() as usize;
    (reached + 1).min(SWIRL_MAX_POINTS)
}

/// Spirals offset by a third of a turn each, alternating colour.
pub fn swirl_spirals(canvas: Canvas, progress: Progress) -> Vec<Spiral> {
    let c = canvas.center();
    let count = swirl_point_count(progress);
    (0..SWIRL_SPIRALS)
        .map(|s| {
            let phase = TAU * s as f64 / SWIRL_SPIRALS as f64;
            let points = (0..count)
                .map(|i| {
                    let angle = (i as f64 / 20.0) * TAU + phase;
                    let distance = i as f64 * 3.0;
                    Point::new(c.x + angle.cos() * distance, c.y + angle.sin() * distance)
                })
                .collect();
            Spiral {
                points,
                color: if s % 2 == 0 {
                    palette::MID
                } else {
                    palette::DARK
                },
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/render/geometry.rs"]
mod tests;
