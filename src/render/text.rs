use crate::foundation::core::{Canvas, Rgba8};
use crate::foundation::error::{ChocoError, ChocoResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Caption font size in pixels.
pub const CAPTION_SIZE_PX: f32 = 120.0;

/// Brush type carried through parley layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBrushRgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl From<Rgba8> for TextBrushRgba8 {
    fn from(c: Rgba8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

/// Font bytes used for the caption.
#[derive(Clone)]
pub struct CaptionFont {
    bytes: Arc<Vec<u8>>,
    source: Option<PathBuf>,
}

impl std::fmt::Debug for CaptionFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptionFont")
            .field("bytes", &self.bytes.len())
            .field("source", &self.source)
            .finish()
    }
}

impl CaptionFont {
    /// Wrap in-memory font data (TTF/OTF).
    pub fn from_bytes(bytes: Vec<u8>) -> ChocoResult<Self> {
        if bytes.is_empty() {
            return Err(ChocoError::validation("caption font data is empty"));
        }
        Ok(Self {
            bytes: Arc::new(bytes),
            source: None,
        })
    }

    /// Read a font file from disk.
    pub fn from_path(path: &Path) -> ChocoResult<Self> {
        use anyhow::Context as _;
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read caption font '{}'", path.display()))?;
        let mut font = Self::from_bytes(bytes)?;
        font.source = Some(path.to_path_buf());
        Ok(font)
    }

    /// Raw font bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Bold sans-serif fonts commonly present on desktop systems, probed in order when no caption font
/// is configured.
pub const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

/// First existing file among [`SYSTEM_FONT_CANDIDATES`].
pub fn find_system_font() -> Option<PathBuf> {
    SYSTEM_FONT_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_file())
}

/// Shapes and lays out caption text with Parley.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family_name: Option<String>,
}

impl TextLayoutEngine {
    pub(crate) fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            family_name: None,
        }
    }

    /// Family name of the registered caption font.
    pub(crate) fn family_name(&self) -> Option<&str> {
        self.family_name.as_deref()
    }

    /// Register the caption font. Later layouts reuse its family without touching the collection.
    pub(crate) fn register_font(&mut self, font_bytes: &[u8]) -> ChocoResult<()> {
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            ChocoError::validation("no font families registered from font bytes")
        })?;
        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| ChocoError::validation("registered font family has no name"))?
            .to_string();
        self.family_name = Some(family_name);
        Ok(())
    }

    /// Shape a single line of bold text in the registered font.
    pub(crate) fn layout_line(
        &mut self,
        text: &str,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> ChocoResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(ChocoError::validation(
                "text size_px must be finite and > 0",
            ));
        }
        let family_name = self
            .family_name
            .clone()
            .ok_or_else(|| ChocoError::validation("no caption font registered"))?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::BOLD,
        ));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

/// A shaped caption, positioned so its box is centred on the surface.
#[derive(Clone)]
pub(crate) struct CaptionLayout {
    pub(crate) text: String,
    pub(crate) layout: Arc<parley::Layout<TextBrushRgba8>>,
    pub(crate) origin: (f64, f64),
}

impl CaptionLayout {
    pub(crate) fn centered(
        text: &str,
        layout: parley::Layout<TextBrushRgba8>,
        canvas: Canvas,
    ) -> Self {
        let origin = centered_origin(
            canvas,
            f64::from(layout.width()),
            f64::from(layout.height()),
        );
        Self {
            text: text.to_string(),
            layout: Arc::new(layout),
            origin,
        }
    }
}

/// Top-left corner that centres a `w` x `h` box on the surface.
pub(crate) fn centered_origin(canvas: Canvas, w: f64, h: f64) -> (f64, f64) {
    ((canvas.w() - w) / 2.0, (canvas.h() - h) / 2.0)
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
