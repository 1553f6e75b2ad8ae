use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Geometric relation between the two sides of a coupled patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransformKind {
    /// Not yet known; classification detects it.
    #[default]
    Unknown,
    /// The sides are images under a rotation (possibly the identity).
    Rotational,
    /// The sides are images under a translation.
    Translational,
}

impl TransformKind {
    /// All variants, in declaration order.
    pub const ALL: [Self; 3] = [Self::Unknown, Self::Rotational, Self::Translational];

    /// Returns the lowercase name used in configuration files.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Rotational => "rotational",
            Self::Translational => "translational",
        }
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a transform name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown transform type '{0}', expected one of unknown, rotational, translational")]
pub struct ParseTransformKindError(String);

impl FromStr for TransformKind {
    type Err = ParseTransformKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseTransformKindError(s.to_owned()))
    }
}
