use crate::foundation::error::{ChocoError, ChocoResult};
use std::fmt;
use std::str::FromStr;

/// Animation style, selected before a run starts.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Style {
    /// Drips sliding down from the top edge.
    #[default]
    Melting,
    /// Blobs bursting outwards from the centre.
    Splash,
    /// A stream falling into a growing pool.
    Pour,
    /// Three interleaved spirals unwinding from the centre.
    Swirl,
}

impl Style {
    /// Every style, in menu order.
    pub const ALL: [Style; 4] = [Style::Melting, Style::Splash, Style::Pour, Style::Swirl];

    /// Stable identifier, used on the command line and in artifact file names.
    pub fn id(self) -> &'static str {
        match self {
            Self::Melting => "melting",
            Self::Splash => "splash",
            Self::Pour => "pour",
            Self::Swirl => "swirl",
        }
    }

    /// Human readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Melting => "Melting Chocolate",
            Self::Splash => "Chocolate Splash",
            Self::Pour => "Chocolate Pour",
            Self::Swirl => "Chocolate Swirl",
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Style {
    type Err = ChocoError;

    fn from_str(s: &str) -> ChocoResult<Self> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|style| style.id().eq_ignore_ascii_case(needle))
            .ok_or_else(|| {
                ChocoError::validation(format!(
                    "unknown style '{s}' (expected one of: melting, splash, pour, swirl)"
                ))
            })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/style.rs"]
mod tests;
