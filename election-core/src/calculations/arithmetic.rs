//! Derived fields of a county record.
//!
//! [`VoteArithmetic::recompute`] is the only place `vote_total`, the party
//! percentages and turnout are computed. Every mutation path runs its
//! result through it before the record is stored.

use crate::calculations::common::percent_of;
use crate::{CountyId, CountyRecord};

/// Bedford city, Virginia. Merged into Bedford County in 2013 but still
/// reported separately by some sources, so its population would otherwise
/// be counted twice.
pub const DEFAULT_EXCLUDED_COUNTY: CountyId = 51515;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteArithmetic {
    excluded_county: Option<CountyId>,
}

impl Default for VoteArithmetic {
    fn default() -> Self {
        Self::new(Some(DEFAULT_EXCLUDED_COUNTY))
    }
}

impl VoteArithmetic {
    /// `excluded_county` reports zero turnout and contributes no population
    /// to any aggregate.
    pub fn new(excluded_county: Option<CountyId>) -> Self {
        Self { excluded_county }
    }

    pub fn excluded_county(&self) -> Option<CountyId> {
        self.excluded_county
    }

    pub fn is_excluded(
        &self,
        id: CountyId,
    ) -> bool {
        self.excluded_county == Some(id)
    }

    /// Returns a copy of `record` with every derived field brought up to date.
    pub fn recompute(
        &self,
        record: &CountyRecord,
    ) -> CountyRecord {
        let vote_total = record
            .republican
            .saturating_add(record.democrat)
            .saturating_add(record.other);

        let turnout = if self.is_excluded(record.id) {
            rust_decimal::Decimal::ZERO
        } else {
            percent_of(vote_total, record.population)
        };

        CountyRecord {
            vote_total,
            percentage_republican: percent_of(record.republican, vote_total),
            percentage_democrat: percent_of(record.democrat, vote_total),
            percentage_other: percent_of(record.other, vote_total),
            turnout,
            ..record.clone()
        }
    }

    /// Population as it should count toward state and national sums.
    pub fn effective_population(
        &self,
        record: &CountyRecord,
    ) -> u64 {
        if self.is_excluded(record.id) {
            0
        } else {
            record.population
        }
    }
}
