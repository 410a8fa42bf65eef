use serde::{Deserialize, Serialize};
use std::fmt;

/// Urgency tier for queued mutations. P0 drains first.
///
/// The derived `Ord` sorts P0 lowest, so an ascending sort yields drain order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    P0,
    P1,
    P2,
    P3,
}

impl Priority {
    pub fn as_str(&self) -> &str {
        match self {
            Priority::P0 => "p0",
            Priority::P1 => "p1",
            Priority::P2 => "p2",
            Priority::P3 => "p3",
        }
    }

    /// Safety- and compliance-relevant tiers that warrant a user-facing
    /// notification once synced.
    pub fn is_high(&self) -> bool {
        matches!(self, Priority::P0 | Priority::P1)
    }
}

impl From<&str> for Priority {
    fn from(value: &str) -> Self {
        match value {
            "p0" => Priority::P0,
            "p1" => Priority::P1,
            "p2" => Priority::P2,
            _ => Priority::P3,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
