use crate::foundation::core::Rgba8;

/// Full-surface background fill.
pub const BACKGROUND: Rgba8 = Rgba8::rgb(0x1a, 0x0f, 0x0a);
/// Dark chocolate.
pub const DARK: Rgba8 = Rgba8::rgb(0x3d, 0x28, 0x17);
/// Milk chocolate highlight.
pub const MID: Rgba8 = Rgba8::rgb(0x5c, 0x3d, 0x2e);
/// Deepest shade, used at the tip of drips.
pub const DEEP: Rgba8 = Rgba8::rgb(0x2d, 0x18, 0x10);
/// `DEEP` at zero alpha, the outer edge of splash blobs.
pub const DEEP_CLEAR: Rgba8 = Rgba8::rgba(0x2d, 0x18, 0x10, 0);
/// Caption colour.
pub const CAPTION: Rgba8 = Rgba8::rgb(0xd4, 0xa5, 0x74);
