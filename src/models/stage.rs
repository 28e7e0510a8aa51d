use serde::{Deserialize, Serialize};

/// One of the six phases of the methodology lifecycle.
///
/// Stages are ordered: work discovered in `Discover` is planned, implemented,
/// verified, operated and finally fed back through `Improve`. The ordering is
/// display-only; task generation treats every stage independently.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Discover,
    Plan,
    Implement,
    Verify,
    Operate,
    Improve,
}

impl Stage {
    /// All stages in lifecycle order.
    pub const ALL: [Stage; 6] = [
        Self::Discover,
        Self::Plan,
        Self::Implement,
        Self::Verify,
        Self::Operate,
        Self::Improve,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discover => "discover",
            Self::Plan => "plan",
            Self::Implement => "implement",
            Self::Verify => "verify",
            Self::Operate => "operate",
            Self::Improve => "improve",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "discover" => Some(Self::Discover),
            "plan" => Some(Self::Plan),
            "implement" => Some(Self::Implement),
            "verify" => Some(Self::Verify),
            "operate" => Some(Self::Operate),
            "improve" => Some(Self::Improve),
            _ => None,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
