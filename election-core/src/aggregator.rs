//! State totals and manual color overrides.
//!
//! Totals are always re-summed from the county store. Overrides are a side
//! channel: they never alter totals, only which lean a state displays and
//! which bucket its electors fall into.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::{CountyStore, Lean, StateAggregate, UpdateSource};

/// What a vote recompute does to a stored override.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverridePolicy {
    /// Drop the override once the computed lean matches it. An override
    /// that disagrees with the totals is kept.
    #[default]
    ClearWhenRedundant,
    /// Keep every override until it is cleared explicitly.
    KeepUntilCleared,
}

#[derive(Debug, Clone, Default)]
pub struct StateAggregator {
    policy: OverridePolicy,
    aggregates: BTreeMap<String, StateAggregate>,
    overrides: HashMap<String, Lean>,
    sources: HashMap<String, UpdateSource>,
}

fn state_key(state: &str) -> String {
    state.trim().to_ascii_uppercase()
}

impl StateAggregator {
    pub fn new(policy: OverridePolicy) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }

    pub fn policy(&self) -> OverridePolicy {
        self.policy
    }

    /// Re-sums one state from its counties and marks the state as last
    /// changed by a vote update.
    pub fn recompute_state(
        &mut self,
        store: &CountyStore,
        state: &str,
    ) -> &StateAggregate {
        let key = state_key(state);
        let arithmetic = store.arithmetic();

        let aggregate = store.counties_in_state(&key).fold(
            StateAggregate::empty(key.clone()),
            |mut acc, county| {
                acc.total_republican = acc.total_republican.saturating_add(county.republican);
                acc.total_democrat = acc.total_democrat.saturating_add(county.democrat);
                acc.total_other = acc.total_other.saturating_add(county.other);
                acc.population = acc
                    .population
                    .saturating_add(arithmetic.effective_population(county));
                acc.county_count += 1;
                acc
            },
        );

        let computed = aggregate.computed_lean();
        if self.policy == OverridePolicy::ClearWhenRedundant
            && self.overrides.get(&key) == Some(&computed)
        {
            tracing::debug!(state = %key, lean = computed.as_str(), "override now matches totals; cleared");
            self.overrides.remove(&key);
        }

        tracing::debug!(
            state = %key,
            republican = aggregate.total_republican,
            democrat = aggregate.total_democrat,
            other = aggregate.total_other,
            "state recomputed"
        );

        self.sources.insert(key.clone(), UpdateSource::VoteUpdate);
        self.aggregates.insert(key.clone(), aggregate);
        &self.aggregates[&key]
    }

    /// Rebuilds every state present in the store. States that no longer
    /// have counties are dropped.
    pub fn recompute_all(
        &mut self,
        store: &CountyStore,
    ) {
        self.aggregates.clear();
        for state in store.state_codes() {
            self.recompute_state(store, &state);
        }
    }

    pub fn aggregate(
        &self,
        state: &str,
    ) -> Option<&StateAggregate> {
        self.aggregates.get(&state_key(state))
    }

    /// All aggregates, sorted by state code.
    pub fn aggregates(&self) -> impl Iterator<Item = &StateAggregate> {
        self.aggregates.values()
    }

    pub fn set_override(
        &mut self,
        state: &str,
        lean: Lean,
    ) {
        let key = state_key(state);
        self.overrides.insert(key.clone(), lean);
        self.sources.insert(key, UpdateSource::Override);
    }

    /// Removes a state's override and returns it.
    pub fn clear_override(
        &mut self,
        state: &str,
    ) -> Option<Lean> {
        let key = state_key(state);
        let removed = self.overrides.remove(&key);
        if removed.is_some() {
            self.sources.insert(key, UpdateSource::VoteUpdate);
        }
        removed
    }

    pub fn clear_all_overrides(&mut self) {
        for key in self.overrides.keys() {
            self.sources.insert(key.clone(), UpdateSource::VoteUpdate);
        }
        self.overrides.clear();
    }

    pub fn override_for(
        &self,
        state: &str,
    ) -> Option<Lean> {
        self.overrides.get(&state_key(state)).copied()
    }

    pub fn last_update_source(
        &self,
        state: &str,
    ) -> Option<UpdateSource> {
        self.sources.get(&state_key(state)).copied()
    }

    /// The lean a state should be drawn with.
    ///
    /// An override wins only while it is the most recent change to the
    /// state; after a vote recompute the totals decide. Ties and states
    /// without data are contested.
    pub fn resolve_display_color(
        &self,
        state: &str,
    ) -> Lean {
        let key = state_key(state);
        if self.sources.get(&key) == Some(&UpdateSource::Override) {
            if let Some(&lean) = self.overrides.get(&key) {
                return lean;
            }
        }
        self.aggregates
            .get(&key)
            .map(StateAggregate::computed_lean)
            .unwrap_or(Lean::Contested)
    }
}
