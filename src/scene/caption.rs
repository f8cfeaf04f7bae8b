use crate::foundation::core::Progress;
use crate::foundation::error::{ChocoError, ChocoResult};

/// Validated caption text drawn over every frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Caption(String);

impl Caption {
    /// Maximum caption length in characters.
    pub const MAX_CHARS: usize = 30;

    /// Validate caption text: it must contain a non-whitespace character and fit in
    /// [`Caption::MAX_CHARS`] characters.
    pub fn new(text: impl Into<String>) -> ChocoResult<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ChocoError::validation("caption text must not be empty"));
        }
        let chars = text.chars().count();
        if chars > Self::MAX_CHARS {
            return Err(ChocoError::validation(format!(
                "caption text is {chars} characters, at most {} are allowed",
                Self::MAX_CHARS
            )));
        }
        Ok(Self(text))
    }

    /// Caption text as given.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// `true` when `text` would be accepted by [`Caption::new`].
pub fn is_acceptable(text: &str) -> bool {
    !text.trim().is_empty() && text.chars().count() <= Caption::MAX_CHARS
}

/// Caption opacity: ramps linearly to fully opaque over the first half of the run.
pub fn caption_opacity(progress: Progress) -> f32 {
    (2.0 * progress.get()).clamp(0.0, 1.0) as f32
}

#[cfg(test)]
#[path = "../../tests/unit/scene/caption.rs"]
mod tests;
