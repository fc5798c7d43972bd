//! Phase tags.

use std::fmt;

/// Which root a volume computation is after.
///
/// `Unknown` and `Stable` both trigger the multi-candidate search; `Stable`
/// additionally runs the model's stability test on the winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Phase {
    #[default]
    Unknown,
    Liquid,
    Vapor,
    Solid,
    Stable,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::Unknown,
        Phase::Liquid,
        Phase::Vapor,
        Phase::Solid,
        Phase::Stable,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Phase::Unknown => "unknown",
            Phase::Liquid => "liquid",
            Phase::Vapor => "vapor",
            Phase::Solid => "solid",
            Phase::Stable => "stable",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for Phase {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unknown" | "any" | "" => Ok(Phase::Unknown),
            "liquid" | "l" => Ok(Phase::Liquid),
            "vapor" | "vapour" | "gas" | "v" => Ok(Phase::Vapor),
            "solid" | "s" => Ok(Phase::Solid),
            "stable" => Ok(Phase::Stable),
            _ => Err("unknown phase"),
        }
    }
}
