//! Change notifications emitted by [`crate::ElectionEngine`].
//!
//! A notification is sent only after the whole county, state and national
//! cascade has finished, exactly once per engine call (or once per
//! [`crate::ElectionEngine::batch`]).

use serde::{Deserialize, Serialize};

use crate::{CountyId, ElectoralResult, PopularVote};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Loaded,
    CountyUpdated,
    Swing,
    GroupUpdate,
    CountyReset,
    StateReset,
    ResetAll,
    OverrideSet,
    OverrideCleared,
    ApportionmentChanged,
    /// Several changes coalesced by a batch.
    Batch,
}

/// What changed, plus the national totals as they stand afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeNotification {
    pub kind: ChangeKind,
    /// Counties whose votes changed, in first-touched order.
    pub counties: Vec<CountyId>,
    /// States whose aggregate or display color may have changed, sorted.
    pub states: Vec<String>,
    pub electoral: ElectoralResult,
    pub popular: PopularVote,
}

impl ChangeNotification {
    /// Folds a later change into this one.
    pub(crate) fn absorb(
        &mut self,
        later: ChangeNotification,
    ) {
        self.kind = ChangeKind::Batch;
        for county in later.counties {
            if !self.counties.contains(&county) {
                self.counties.push(county);
            }
        }
        self.states.extend(later.states);
        self.states.sort();
        self.states.dedup();
        self.electoral = later.electoral;
        self.popular = later.popular;
    }
}

/// Receives notifications. Implemented for any `FnMut(&ChangeNotification)`.
pub trait ChangeListener {
    fn on_change(
        &mut self,
        change: &ChangeNotification,
    );
}

impl<F> ChangeListener for F
where
    F: FnMut(&ChangeNotification),
{
    fn on_change(
        &mut self,
        change: &ChangeNotification,
    ) {
        self(change)
    }
}

/// Handle returned by [`crate::ElectionEngine::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);
