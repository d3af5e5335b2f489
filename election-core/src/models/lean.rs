use serde::{Deserialize, Serialize};

/// Which way a state is shown (and which bucket its electors land in).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lean {
    Republican,
    Democrat,
    /// Exact tie, or manually marked too close to call.
    Contested,
}

impl Lean {
    /// Compares two vote totals. Equal totals (including 0 vs 0) are contested.
    pub fn from_totals(
        republican: u64,
        democrat: u64,
    ) -> Self {
        match republican.cmp(&democrat) {
            std::cmp::Ordering::Greater => Self::Republican,
            std::cmp::Ordering::Less => Self::Democrat,
            std::cmp::Ordering::Equal => Self::Contested,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Republican => "R",
            Self::Democrat => "D",
            Self::Contested => "T",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "R" | "REP" | "REPUBLICAN" => Some(Self::Republican),
            "D" | "DEM" | "DEMOCRAT" => Some(Self::Democrat),
            "T" | "TIE" | "CONTESTED" => Some(Self::Contested),
            _ => None,
        }
    }
}
