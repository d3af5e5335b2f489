//! The engine: one owner for the store, the state aggregates, the national
//! tallies and the listeners.
//!
//! Every mutating method takes `&mut self` and runs the full cascade before
//! returning:
//!
//! 1. the county edit is applied and stored,
//! 2. each affected state is re-summed,
//! 3. the electoral and popular tallies are rebuilt,
//! 4. listeners are notified once.
//!
//! The exclusive borrow is what keeps the cascade atomic: no reader can
//! observe the store between steps 1 and 3, and a listener cannot start
//! another edit while it is being notified.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::{
    DEFAULT_EXCLUDED_COUNTY, Redistribution, TwoPartyShare, UpdateOutcome, VoteArithmetic,
    aggregate_share,
};
use crate::notify::{ChangeKind, ChangeListener, ChangeNotification, SubscriptionId};
use crate::tally::{allocate_states, tally_electoral, tally_popular};
use crate::{
    Apportionment, CountyId, CountyRecord, CountyStore, ElectoralResult, EngineError, Lean,
    OverridePolicy, PopularVote, RawCountyRecord, StateAggregate, StateAggregator,
    StateAllocation,
};

/// Engine settings. Every field has a default, so a partial TOML file is
/// valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub apportionment: Apportionment,
    /// County whose population is left out of every aggregate.
    pub excluded_county: Option<CountyId>,
    pub override_policy: OverridePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            apportionment: Apportionment::default(),
            excluded_county: Some(DEFAULT_EXCLUDED_COUNTY),
            override_policy: OverridePolicy::default(),
        }
    }
}

pub struct ElectionEngine {
    config: EngineConfig,
    store: CountyStore,
    aggregator: StateAggregator,
    electoral: ElectoralResult,
    popular: PopularVote,
    listeners: Vec<(SubscriptionId, Box<dyn ChangeListener>)>,
    next_subscription: u64,
    batch_depth: usize,
    pending: Option<ChangeNotification>,
}

impl fmt::Debug for ElectionEngine {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("ElectionEngine")
            .field("config", &self.config)
            .field("counties", &self.store.len())
            .field("electoral", &self.electoral)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl Default for ElectionEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl ElectionEngine {
    pub fn new(config: EngineConfig) -> Self {
        let store = CountyStore::new(VoteArithmetic::new(config.excluded_county));
        let aggregator = StateAggregator::new(config.override_policy);
        let electoral = tally_electoral(&aggregator, config.apportionment);

        Self {
            config,
            store,
            aggregator,
            electoral,
            popular: PopularVote::default(),
            listeners: Vec::new(),
            next_subscription: 0,
            batch_depth: 0,
            pending: None,
        }
    }

    // -----------------------------------------------------------------------
    // Subscriptions
    // -----------------------------------------------------------------------

    pub fn subscribe<L>(
        &mut self,
        listener: L,
    ) -> SubscriptionId
    where
        L: ChangeListener + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns `false` if the subscription was already gone.
    pub fn unsubscribe(
        &mut self,
        id: SubscriptionId,
    ) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Runs `f` with notifications held back, then sends a single
    /// notification covering everything `f` changed. Nested batches are
    /// folded into the outermost one.
    pub fn batch<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        self.batch_depth += 1;
        let output = f(self);
        self.batch_depth -= 1;

        if self.batch_depth == 0 {
            if let Some(change) = self.pending.take() {
                self.dispatch(&change);
            }
        }
        output
    }

    // -----------------------------------------------------------------------
    // Loading and edits
    // -----------------------------------------------------------------------

    /// Replaces all county data, drops every override and rebuilds all
    /// totals. Returns the number of counties kept.
    pub fn load<I>(
        &mut self,
        raw: I,
    ) -> usize
    where
        I: IntoIterator<Item = RawCountyRecord>,
    {
        let count = self.store.load(raw);
        self.aggregator = StateAggregator::new(self.config.override_policy);
        self.aggregator.recompute_all(&self.store);
        self.recompute_national();

        let states = self.store.state_codes().into_iter().collect();
        self.notify(ChangeKind::Loaded, Vec::new(), states);
        count
    }

    /// Sets one county's split. See
    /// [`Redistribution::apply_update`] for the clamping rules.
    pub fn update_county(
        &mut self,
        id: CountyId,
        republican: u64,
        democrat: u64,
        other: u64,
    ) -> Result<UpdateOutcome, EngineError> {
        let outcome = self
            .store
            .update(id, republican, democrat, other)
            .ok_or(EngineError::CountyNotFound(id))?;

        self.cascade(ChangeKind::CountyUpdated, vec![id]);
        Ok(outcome)
    }

    /// Percentage-point swing across `ids`. An empty selection does nothing.
    pub fn swing(
        &mut self,
        ids: &[CountyId],
        republican_delta: Decimal,
        democrat_delta: Decimal,
    ) -> Result<Vec<CountyRecord>, EngineError> {
        let selected = self.selection(ids)?;
        if selected.is_empty() {
            return Ok(Vec::new());
        }

        let updated = Redistribution::new(self.store.arithmetic()).apply_swing(
            &selected,
            republican_delta,
            democrat_delta,
        );
        Ok(self.commit(ChangeKind::Swing, updated))
    }

    /// Moves the selection's combined Republican share to
    /// `target_republican` percent.
    pub fn swing_to_share(
        &mut self,
        ids: &[CountyId],
        target_republican: Decimal,
    ) -> Result<Vec<CountyRecord>, EngineError> {
        let selected = self.selection(ids)?;
        if selected.is_empty() {
            return Ok(Vec::new());
        }

        let updated = Redistribution::new(self.store.arithmetic())
            .swing_to_share(&selected, target_republican);
        Ok(self.commit(ChangeKind::Swing, updated))
    }

    /// Sets the selection's combined totals and distributes them back to
    /// each county by its two-party pool.
    pub fn group_update(
        &mut self,
        ids: &[CountyId],
        republican_total: u64,
        democrat_total: u64,
    ) -> Result<Vec<CountyRecord>, EngineError> {
        let selected = self.selection(ids)?;
        if selected.is_empty() {
            return Ok(Vec::new());
        }

        let updated = Redistribution::new(self.store.arithmetic()).apply_group_update(
            &selected,
            republican_total,
            democrat_total,
        );
        Ok(self.commit(ChangeKind::GroupUpdate, updated))
    }

    pub fn reset_county(
        &mut self,
        id: CountyId,
    ) -> Result<CountyRecord, EngineError> {
        let record = self
            .store
            .reset(id)
            .cloned()
            .ok_or(EngineError::CountyNotFound(id))?;

        self.cascade(ChangeKind::CountyReset, vec![id]);
        Ok(record)
    }

    /// Resets every county of one state. Overrides are left alone.
    pub fn reset_state(
        &mut self,
        state: &str,
    ) -> Result<Vec<CountyRecord>, EngineError> {
        let ids: Vec<CountyId> = self
            .store
            .counties_in_state(state)
            .map(|record| record.id)
            .collect();
        if ids.is_empty() {
            return Err(EngineError::StateNotFound(state.to_string()));
        }

        let records = ids
            .iter()
            .filter_map(|&id| self.store.reset(id).cloned())
            .collect();
        self.cascade(ChangeKind::StateReset, ids);
        Ok(records)
    }

    /// Restores every county, clears every override and rebuilds all totals.
    pub fn reset_all(&mut self) {
        self.store.reset_all();
        self.aggregator.clear_all_overrides();
        self.aggregator.recompute_all(&self.store);
        self.recompute_national();
        tracing::info!(counties = self.store.len(), "all counties reset");

        let counties = self.store.get_all().iter().map(|r| r.id).collect();
        let states = self.store.state_codes().into_iter().collect();
        self.notify(ChangeKind::ResetAll, counties, states);
    }

    // -----------------------------------------------------------------------
    // Overrides and apportionment
    // -----------------------------------------------------------------------

    pub fn set_override(
        &mut self,
        state: &str,
        lean: Lean,
    ) -> Result<(), EngineError> {
        let state = self.known_state(state)?;
        self.aggregator.set_override(&state, lean);
        self.recompute_national();
        self.notify(ChangeKind::OverrideSet, Vec::new(), vec![state]);
        Ok(())
    }

    /// Returns the override that was removed, if there was one.
    pub fn clear_override(
        &mut self,
        state: &str,
    ) -> Result<Option<Lean>, EngineError> {
        let state = self.known_state(state)?;
        let removed = self.aggregator.clear_override(&state);
        if removed.is_some() {
            self.recompute_national();
            self.notify(ChangeKind::OverrideCleared, Vec::new(), vec![state]);
        }
        Ok(removed)
    }

    /// Switches the elector table. County and state data are untouched.
    pub fn set_apportionment(
        &mut self,
        apportionment: Apportionment,
    ) {
        let previous = self.config.apportionment;
        if previous == apportionment {
            return;
        }
        self.config.apportionment = apportionment;
        self.recompute_national();

        let states = previous
            .entries()
            .iter()
            .zip(apportionment.entries())
            .filter(|(old, new)| old != new)
            .map(|((state, _), _)| state.to_string())
            .collect();
        self.notify(ChangeKind::ApportionmentChanged, Vec::new(), states);
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn apportionment(&self) -> Apportionment {
        self.config.apportionment
    }

    pub fn store(&self) -> &CountyStore {
        &self.store
    }

    pub fn county(
        &self,
        id: CountyId,
    ) -> Option<&CountyRecord> {
        self.store.get(id)
    }

    pub fn counties(&self) -> &[CountyRecord] {
        self.store.get_all()
    }

    pub fn state(
        &self,
        state: &str,
    ) -> Option<&StateAggregate> {
        self.aggregator.aggregate(state)
    }

    pub fn states(&self) -> impl Iterator<Item = &StateAggregate> {
        self.aggregator.aggregates()
    }

    pub fn aggregator(&self) -> &StateAggregator {
        &self.aggregator
    }

    pub fn display_color(
        &self,
        state: &str,
    ) -> Lean {
        self.aggregator.resolve_display_color(state)
    }

    pub fn allocations(&self) -> Vec<StateAllocation> {
        allocate_states(&self.aggregator, self.config.apportionment)
    }

    pub fn electoral(&self) -> ElectoralResult {
        self.electoral
    }

    pub fn popular(&self) -> &PopularVote {
        &self.popular
    }

    /// Slider position for a selection of counties.
    pub fn share_of(
        &self,
        ids: &[CountyId],
    ) -> Result<TwoPartyShare, EngineError> {
        Ok(aggregate_share(&self.selection(ids)?))
    }

    // -----------------------------------------------------------------------
    // Cascade
    // -----------------------------------------------------------------------

    /// Looks up every id (duplicates ignored) before anything is changed.
    fn selection(
        &self,
        ids: &[CountyId],
    ) -> Result<Vec<CountyRecord>, EngineError> {
        let mut seen = HashSet::new();
        ids.iter()
            .filter(|id| seen.insert(**id))
            .map(|&id| {
                self.store
                    .get(id)
                    .cloned()
                    .ok_or(EngineError::CountyNotFound(id))
            })
            .collect()
    }

    fn known_state(
        &self,
        state: &str,
    ) -> Result<String, EngineError> {
        let code = state.trim().to_ascii_uppercase();
        if self.config.apportionment.electors(&code).is_some()
            || self.aggregator.aggregate(&code).is_some()
        {
            Ok(code)
        } else {
            Err(EngineError::StateNotFound(state.to_string()))
        }
    }

    fn commit(
        &mut self,
        kind: ChangeKind,
        updated: Vec<CountyRecord>,
    ) -> Vec<CountyRecord> {
        let ids = updated.iter().map(|record| record.id).collect();
        for record in &updated {
            self.store.persist(record.clone());
        }
        self.cascade(kind, ids);
        updated
    }

    fn cascade(
        &mut self,
        kind: ChangeKind,
        counties: Vec<CountyId>,
    ) {
        let states: BTreeSet<String> = counties
            .iter()
            .filter_map(|&id| self.store.get(id))
            .map(|record| record.state.clone())
            .collect();

        for state in &states {
            self.aggregator.recompute_state(&self.store, state);
        }
        self.recompute_national();

        tracing::debug!(
            ?kind,
            counties = counties.len(),
            states = states.len(),
            republican_electors = self.electoral.republican_votes,
            democrat_electors = self.electoral.democrat_votes,
            "cascade complete"
        );
        self.notify(kind, counties, states.into_iter().collect());
    }

    fn recompute_national(&mut self) {
        self.electoral = tally_electoral(&self.aggregator, self.config.apportionment);
        self.popular = tally_popular(self.store.get_all(), self.store.arithmetic());
    }

    fn notify(
        &mut self,
        kind: ChangeKind,
        counties: Vec<CountyId>,
        states: Vec<String>,
    ) {
        let change = ChangeNotification {
            kind,
            counties,
            states,
            electoral: self.electoral,
            popular: self.popular.clone(),
        };

        if self.batch_depth > 0 {
            self.pending = match self.pending.take() {
                Some(mut pending) => {
                    pending.absorb(change);
                    Some(pending)
                }
                None => Some(change),
            };
        } else {
            self.dispatch(&change);
        }
    }

    fn dispatch(
        &mut self,
        change: &ChangeNotification,
    ) {
        for (_, listener) in &mut self.listeners {
            listener.on_change(change);
        }
    }
}
