use crate::foundation::core::{BezPath, Canvas, Point, Rgba8};
use crate::foundation::error::{ChocoError, ChocoResult};
use crate::render::backend::{FrameRGBA, FrameRenderer, FrameRequest};
use crate::render::geometry::{GradientStop, Mark, MarkKind, Paint, style_marks};
use crate::render::text::{
    CAPTION_SIZE_PX, CaptionFont, CaptionLayout, TextBrushRgba8, TextLayoutEngine,
};
use crate::scene::caption::caption_opacity;
use crate::scene::palette;

/// Options for the CPU renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CpuRendererOpts {
    /// Drawing surface size.
    pub canvas: Canvas,
    /// Full-surface fill painted first on every frame.
    pub background: Rgba8,
    /// Caption colour.
    pub caption_color: Rgba8,
}

impl Default for CpuRendererOpts {
    fn default() -> Self {
        Self {
            canvas: Canvas::HD_1080,
            background: palette::BACKGROUND,
            caption_color: palette::CAPTION,
        }
    }
}

/// Frame renderer powered by `vello_cpu`.
///
/// The render context and target pixmap are reused across frames; every frame starts with a
/// full-surface background fill, so nothing from a previous frame survives.
pub struct CpuRenderer {
    opts: CpuRendererOpts,
    width: u16,
    height: u16,

    ctx: Option<vello_cpu::RenderContext>,
    pixmap: vello_cpu::Pixmap,

    font: Option<CaptionFont>,
    font_data: Option<vello_cpu::peniko::FontData>,
    text_engine: TextLayoutEngine,
    caption_cache: Option<CaptionLayout>,
}

impl CpuRenderer {
    /// Create a renderer for the configured surface. Fails when the surface cannot be allocated.
    pub fn new(opts: CpuRendererOpts) -> ChocoResult<Self> {
        let (width, height) = opts.canvas.dims_u16()?;
        if width == 0 || height == 0 {
            return Err(ChocoError::validation("canvas width/height must be non-zero"));
        }
        Ok(Self {
            opts,
            width,
            height,
            ctx: None,
            pixmap: vello_cpu::Pixmap::new(width, height),
            font: None,
            font_data: None,
            text_engine: TextLayoutEngine::new(),
            caption_cache: None,
        })
    }

    /// Use `font` for captions.
    pub fn with_caption_font(mut self, font: CaptionFont) -> Self {
        self.font_data = Some(vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(font.bytes().to_vec()),
            0,
        ));
        self.font = Some(font);
        self.text_engine = TextLayoutEngine::new();
        self.caption_cache = None;
        self
    }

    /// Whether captions can be drawn.
    pub fn has_caption_font(&self) -> bool {
        self.font.is_some()
    }

    fn caption_layout(&mut self, text: &str) -> ChocoResult<CaptionLayout> {
        if let Some(cached) = self.caption_cache.as_ref()
            && cached.text == text
        {
            return Ok(cached.clone());
        }
        let font = self.font.as_ref().ok_or_else(|| {
            ChocoError::render("a caption font is required to draw caption text")
        })?;
        if self.text_engine.family_name().is_none() {
            self.text_engine.register_font(font.bytes())?;
        }
        let layout = self.text_engine.layout_line(
            text,
            CAPTION_SIZE_PX,
            TextBrushRgba8::from(self.opts.caption_color),
        )?;
        tracing::debug!(
            family = self.text_engine.family_name().unwrap_or("?"),
            width = layout.width(),
            "caption laid out"
        );
        let out = CaptionLayout::centered(text, layout, self.opts.canvas);
        self.caption_cache = Some(out.clone());
        Ok(out)
    }
}

impl FrameRenderer for CpuRenderer {
    fn canvas(&self) -> Canvas {
        self.opts.canvas
    }

    fn render_frame(&mut self, req: &FrameRequest<'_>) -> ChocoResult<FrameRGBA> {
        let marks = style_marks(req.style, self.opts.canvas, req.progress);
        let caption = if req.caption.is_empty() {
            None
        } else {
            Some(self.caption_layout(req.caption)?)
        };
        let opacity = caption_opacity(req.progress);

        let mut ctx = match self.ctx.take() {
            Some(ctx) => ctx,
            None => vello_cpu::RenderContext::new(self.width, self.height),
        };
        ctx.reset();

        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(color_to_cpu(self.opts.background));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            self.opts.canvas.w(),
            self.opts.canvas.h(),
        ));

        for mark in &marks {
            draw_mark(&mut ctx, mark);
        }

        if let (Some(caption), Some(font)) = (caption.as_ref(), self.font_data.as_ref())
            && opacity > 0.0
        {
            with_opacity(&mut ctx, opacity, |ctx| draw_caption(ctx, caption, font));
        }

        ctx.flush();
        clear_pixmap(&mut self.pixmap);
        ctx.render_to_pixmap(&mut self.pixmap);
        self.ctx = Some(ctx);

        Ok(FrameRGBA {
            width: self.opts.canvas.width,
            height: self.opts.canvas.height,
            data: self.pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

/// Run `f` inside an opacity layer, popping it afterwards so the alpha never leaks into later
/// draws.
fn with_opacity(
    ctx: &mut vello_cpu::RenderContext,
    opacity: f32,
    f: impl FnOnce(&mut vello_cpu::RenderContext),
) {
    if opacity >= 1.0 {
        f(ctx);
        return;
    }
    ctx.push_opacity_layer(opacity);
    f(ctx);
    ctx.pop_layer();
}

fn draw_mark(ctx: &mut vello_cpu::RenderContext, mark: &Mark) {
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

    match &mark.paint {
        Paint::Solid(c) => ctx.set_paint(color_to_cpu(*c)),
        Paint::Linear { start, end, stops } => ctx.set_paint(
            vello_cpu::peniko::Gradient::new_linear(point_to_cpu(*start), point_to_cpu(*end))
                .with_stops(stops_to_cpu(stops).as_slice()),
        ),
        Paint::Radial {
            center,
            radius,
            stops,
        } => ctx.set_paint(
            vello_cpu::peniko::Gradient::new_radial(point_to_cpu(*center), *radius as f32)
                .with_stops(stops_to_cpu(stops).as_slice()),
        ),
    }

    let path = bezpath_to_cpu(&mark.path);
    match mark.kind {
        MarkKind::Fill => ctx.fill_path(&path),
        MarkKind::Stroke { width } => {
            ctx.set_stroke(
                vello_cpu::kurbo::Stroke::new(width)
                    .with_caps(vello_cpu::kurbo::Cap::Round)
                    .with_join(vello_cpu::kurbo::Join::Round),
            );
            ctx.stroke_path(&path);
        }
    }
}

fn draw_caption(
    ctx: &mut vello_cpu::RenderContext,
    caption: &CaptionLayout,
    font: &vello_cpu::peniko::FontData,
) {
    let (ox, oy) = caption.origin;
    ctx.set_transform(vello_cpu::kurbo::Affine::translate((ox, oy)));
    for line in caption.layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let brush = run.style().brush;
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                brush.r, brush.g, brush.b, brush.a,
            ));
            let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            ctx.glyph_run(font)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
}

fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap) {
    pixmap.data_as_u8_slice_mut().fill(0);
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn stops_to_cpu(stops: &[GradientStop]) -> Vec<vello_cpu::peniko::ColorStop> {
    stops
        .iter()
        .map(|s| vello_cpu::peniko::ColorStop::from((s.offset, color_to_cpu(s.color))))
        .collect()
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
