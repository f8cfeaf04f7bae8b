//! What gets drawn: the animation styles, their palette, and the caption.

/// Caption text and its fade-in.
pub mod caption;
/// Fixed colours of the chocolate look.
pub mod palette;
/// The four animation styles.
pub mod style;
