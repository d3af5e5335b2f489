use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Lean;

/// National electoral vote split. Built fresh by every tally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectoralResult {
    pub republican_votes: u32,
    pub democrat_votes: u32,
    pub too_close_to_call_votes: u32,
}

impl ElectoralResult {
    pub fn total(&self) -> u32 {
        self.republican_votes + self.democrat_votes + self.too_close_to_call_votes
    }

    pub(crate) fn add(
        &mut self,
        lean: Lean,
        electors: u32,
    ) {
        match lean {
            Lean::Republican => self.republican_votes += electors,
            Lean::Democrat => self.democrat_votes += electors,
            Lean::Contested => self.too_close_to_call_votes += electors,
        }
    }

    /// The party holding at least `majority` electors, if any.
    pub fn winner(
        &self,
        majority: u32,
    ) -> Option<Lean> {
        if self.republican_votes >= majority {
            Some(Lean::Republican)
        } else if self.democrat_votes >= majority {
            Some(Lean::Democrat)
        } else {
            None
        }
    }
}

/// One state's slice of the electoral result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateAllocation {
    pub state: String,
    pub electors: u32,
    pub lean: Lean,
    /// True when a manual override decided the allocation.
    pub overridden: bool,
}

/// National popular vote summed straight from county records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopularVote {
    pub republican_total: u64,
    pub democrat_total: u64,
    pub other_total: u64,
    pub total: u64,
    pub population: u64,
    pub turnout: Decimal,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn add_routes_electors_by_lean() {
        let mut result = ElectoralResult::default();

        result.add(Lean::Republican, 10);
        result.add(Lean::Democrat, 20);
        result.add(Lean::Contested, 5);
        result.add(Lean::Democrat, 1);

        assert_eq!(
            result,
            ElectoralResult {
                republican_votes: 10,
                democrat_votes: 21,
                too_close_to_call_votes: 5,
            }
        );
        assert_eq!(result.total(), 36);
    }

    #[test]
    fn winner_requires_majority() {
        let result = ElectoralResult {
            republican_votes: 269,
            democrat_votes: 269,
            too_close_to_call_votes: 0,
        };
        assert_eq!(result.winner(270), None);

        let result = ElectoralResult {
            republican_votes: 232,
            democrat_votes: 306,
            too_close_to_call_votes: 0,
        };
        assert_eq!(result.winner(270), Some(Lean::Democrat));
    }
}
