use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Lean;
use crate::calculations::common::percent_of;

/// What last changed a state's displayed color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateSource {
    Override,
    VoteUpdate,
}

/// Totals for one state, always summed from its counties and never edited
/// directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateAggregate {
    pub state: String,
    pub total_republican: u64,
    pub total_democrat: u64,
    pub total_other: u64,
    /// Population with the excluded county counted as zero.
    pub population: u64,
    pub county_count: usize,
}

impl StateAggregate {
    pub fn empty(state: impl Into<String>) -> Self {
        Self {
            state: state.into(),
            total_republican: 0,
            total_democrat: 0,
            total_other: 0,
            population: 0,
            county_count: 0,
        }
    }

    pub fn vote_total(&self) -> u64 {
        self.total_republican
            .saturating_add(self.total_democrat)
            .saturating_add(self.total_other)
    }

    /// The lean implied by the vote totals alone, ignoring any override.
    pub fn computed_lean(&self) -> Lean {
        Lean::from_totals(self.total_republican, self.total_democrat)
    }

    pub fn turnout(&self) -> Decimal {
        percent_of(self.vote_total(), self.population)
    }
}
