/// Convenience result type used across chocoreel.
pub type ChocoResult<T> = Result<T, ChocoError>;

/// Top-level error taxonomy used by the renderer, driver and capture pipeline.
#[derive(thiserror::Error, Debug)]
pub enum ChocoError {
    /// Invalid user-provided input or configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while painting a frame.
    #[error("render error: {0}")]
    Render(String),

    /// Errors while capturing or encoding frames.
    #[error("capture error: {0}")]
    Capture(String),

    /// The runtime cannot produce the requested container/codec.
    #[error("unsupported codec: {codec} (encoder '{encoder}' is not available)")]
    UnsupportedCodec {
        /// Codec identifier as accepted by the CLI.
        codec: String,
        /// Encoder name that was probed for.
        encoder: String,
    },

    /// Errors when serializing or deserializing configuration.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ChocoError {
    /// Build a [`ChocoError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ChocoError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`ChocoError::Capture`] value.
    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture(msg.into())
    }

    /// Build a [`ChocoError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
