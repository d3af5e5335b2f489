//! National totals: electoral votes from state aggregates, popular vote
//! straight from county records.

use crate::calculations::VoteArithmetic;
use crate::calculations::common::percent_of;
use crate::{
    Apportionment, CountyRecord, ElectoralResult, Lean, PopularVote, StateAggregator,
    StateAllocation,
};

/// Assigns each state's electors to a bucket.
///
/// Walks the apportionment table rather than the aggregates, so every
/// elector lands somewhere even for states with no county data (those
/// count as a 0-0 tie). An override decides its state outright.
pub fn allocate_states(
    aggregator: &StateAggregator,
    apportionment: Apportionment,
) -> Vec<StateAllocation> {
    apportionment
        .entries()
        .iter()
        .map(|&(state, electors)| {
            let (lean, overridden) = match aggregator.override_for(state) {
                Some(lean) => (lean, true),
                None => (
                    aggregator
                        .aggregate(state)
                        .map(|aggregate| aggregate.computed_lean())
                        .unwrap_or(Lean::Contested),
                    false,
                ),
            };
            StateAllocation {
                state: state.to_string(),
                electors,
                lean,
                overridden,
            }
        })
        .collect()
}

/// Sums [`allocate_states`] into a national result. The three buckets always
/// add up to `apportionment.total_electors()`.
pub fn tally_electoral(
    aggregator: &StateAggregator,
    apportionment: Apportionment,
) -> ElectoralResult {
    allocate_states(aggregator, apportionment)
        .iter()
        .fold(ElectoralResult::default(), |mut result, allocation| {
            result.add(allocation.lean, allocation.electors);
            result
        })
}

/// National popular vote. Overrides play no part here.
pub fn tally_popular<'a, I>(
    records: I,
    arithmetic: &VoteArithmetic,
) -> PopularVote
where
    I: IntoIterator<Item = &'a CountyRecord>,
{
    let mut popular = records
        .into_iter()
        .fold(PopularVote::default(), |mut acc, record| {
            acc.republican_total = acc.republican_total.saturating_add(record.republican);
            acc.democrat_total = acc.democrat_total.saturating_add(record.democrat);
            acc.other_total = acc.other_total.saturating_add(record.other);
            acc.total = acc.total.saturating_add(record.vote_total);
            acc.population = acc
                .population
                .saturating_add(arithmetic.effective_population(record));
            acc
        });
    popular.turnout = percent_of(popular.total, popular.population);
    popular
}
