//! What-if edits on county vote splits.
//!
//! Three edit modes exist:
//!
//! | Mode | Entry point | Pool held fixed |
//! |------|-------------|-----------------|
//! | Absolute set on one county | [`Redistribution::apply_update`] | the county's vote total |
//! | Percentage-point swing on a group | [`Redistribution::apply_swing`] | each county's Republican + Democrat votes |
//! | Aggregated absolute set on a group | [`Redistribution::apply_group_update`] | each county's Republican + Democrat votes |
//!
//! # Conservation
//!
//! No edit changes how many votes a county cast. Requests that do not fit
//! the pool are clamped and rescaled instead of rejected.
//!
//! # Rounding
//!
//! Every path uses [`split_pool`]: the Republican count is floored and the
//! Democrat count is the exact remainder of the pool.
//!
//! # Example
//!
//! ```
//! use election_core::CountyRecord;
//! use election_core::calculations::{Redistribution, VoteArithmetic};
//!
//! let arithmetic = VoteArithmetic::default();
//! let county = arithmetic.recompute(&CountyRecord::new(1001, "Autauga", "AL", 1000, 200, 250, 50));
//!
//! let outcome = Redistribution::new(&arithmetic).apply_update(&county, 1000, 0, 50);
//!
//! assert_eq!(outcome.record.republican, 450);
//! assert_eq!(outcome.record.democrat, 0);
//! assert_eq!(outcome.record.vote_total, 500);
//! assert!(outcome.clamped);
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::CountyRecord;
use crate::calculations::VoteArithmetic;
use crate::calculations::common::{floor_count, split_pool};

/// Values a caller asked for in a single-county edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRequest {
    pub republican: u64,
    pub democrat: u64,
    pub other: u64,
}

/// Result of a single-county edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// The record as it should be stored.
    pub record: CountyRecord,
    pub requested: UpdateRequest,
    /// True when the applied values differ from the requested ones.
    pub clamped: bool,
}

/// Combined Republican/Democrat position of a group of counties; this is
/// what a group slider displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TwoPartyShare {
    pub republican: u64,
    pub democrat: u64,
}

impl TwoPartyShare {
    pub fn pool(&self) -> u64 {
        self.republican.saturating_add(self.democrat)
    }

    /// Unrounded Republican share of the pool in percent.
    pub fn republican_percent(&self) -> Decimal {
        self.percent(self.republican)
    }

    /// Unrounded Democrat share of the pool in percent.
    pub fn democrat_percent(&self) -> Decimal {
        self.percent(self.democrat)
    }

    fn percent(
        &self,
        votes: u64,
    ) -> Decimal {
        if self.pool() == 0 {
            return Decimal::ZERO;
        }
        Decimal::from(votes) * Decimal::ONE_HUNDRED / Decimal::from(self.pool())
    }
}

/// Sums the two-party pool across `records`.
pub fn aggregate_share(records: &[CountyRecord]) -> TwoPartyShare {
    records.iter().fold(
        TwoPartyShare {
            republican: 0,
            democrat: 0,
        },
        |acc, record| TwoPartyShare {
            republican: acc.republican.saturating_add(record.republican),
            democrat: acc.democrat.saturating_add(record.democrat),
        },
    )
}

fn clamp_points(delta: Decimal) -> Decimal {
    delta.clamp(-Decimal::ONE_HUNDRED, Decimal::ONE_HUNDRED)
}

/// Applies edits to county records. Holds no state of its own.
#[derive(Debug, Clone, Copy)]
pub struct Redistribution<'a> {
    arithmetic: &'a VoteArithmetic,
}

impl<'a> Redistribution<'a> {
    pub fn new(arithmetic: &'a VoteArithmetic) -> Self {
        Self { arithmetic }
    }

    /// Sets a county's split, keeping its vote total fixed.
    ///
    /// `other` is clamped to the pool. Republican and Democrat are clamped to
    /// what remains and then rescaled in their requested ratio until they
    /// fill it exactly; a request of zero for both splits the remainder
    /// evenly.
    pub fn apply_update(
        &self,
        record: &CountyRecord,
        republican: u64,
        democrat: u64,
        other: u64,
    ) -> UpdateOutcome {
        let requested = UpdateRequest {
            republican,
            democrat,
            other,
        };

        let pool = record.vote_total;
        let other = other.min(pool);
        let remainder = pool - other;
        let republican = republican.min(remainder);
        let democrat = democrat.min(remainder);

        let (republican, democrat) = if republican.checked_add(democrat) == Some(remainder) {
            (republican, democrat)
        } else if republican == 0 && democrat == 0 {
            (remainder / 2, remainder - remainder / 2)
        } else {
            split_pool(
                remainder,
                Decimal::from(republican),
                Decimal::from(democrat),
            )
        };

        let updated = self.arithmetic.recompute(&CountyRecord {
            republican,
            democrat,
            other,
            ..record.clone()
        });

        let clamped = requested
            != UpdateRequest {
                republican,
                democrat,
                other,
            };
        if clamped {
            tracing::debug!(
                county = record.id,
                ?requested,
                applied_republican = republican,
                applied_democrat = democrat,
                applied_other = other,
                "edit clamped to the county's vote pool"
            );
        }

        UpdateOutcome {
            record: updated,
            requested,
            clamped,
        }
    }

    /// Moves every county by the same number of percentage points.
    ///
    /// Each county's delta is scaled by its own Republican + Democrat pool;
    /// Other votes are untouched. Deltas are clamped to -100..=100 points.
    /// If the move takes the group's combined Republican (or Democrat) share
    /// to 100% or beyond, every county's pool goes entirely to that party.
    /// A zero delta leaves every record exactly as it was.
    pub fn apply_swing(
        &self,
        records: &[CountyRecord],
        republican_delta: Decimal,
        democrat_delta: Decimal,
    ) -> Vec<CountyRecord> {
        if records.is_empty() {
            return Vec::new();
        }

        let republican_delta = clamp_points(republican_delta);
        let democrat_delta = clamp_points(democrat_delta);
        let share = aggregate_share(records);
        let republican_target = share.republican_percent() + republican_delta;
        let democrat_target = share.democrat_percent() + democrat_delta;

        if !republican_delta.is_zero() && republican_target >= Decimal::ONE_HUNDRED {
            return self.assign_whole_pool(records, true);
        }
        if !democrat_delta.is_zero() && democrat_target >= Decimal::ONE_HUNDRED {
            return self.assign_whole_pool(records, false);
        }

        records
            .iter()
            .map(|record| self.swing_county(record, republican_delta, democrat_delta))
            .collect()
    }

    /// Moves the group's combined Republican share to `target_republican`
    /// percent (clamped to 0..=100) of the two-party pool.
    pub fn swing_to_share(
        &self,
        records: &[CountyRecord],
        target_republican: Decimal,
    ) -> Vec<CountyRecord> {
        let target = target_republican.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
        let share = aggregate_share(records);

        let republican_delta = target - share.republican_percent();
        let democrat_delta = (Decimal::ONE_HUNDRED - target) - share.democrat_percent();

        self.apply_swing(records, republican_delta, democrat_delta)
    }

    /// Sets the group's combined Republican/Democrat totals and hands the
    /// result back to each member in proportion to its own two-party pool.
    ///
    /// The group's pool cannot change, so only the ratio of the requested
    /// totals matters. Two zero totals leave the group unchanged.
    pub fn apply_group_update(
        &self,
        records: &[CountyRecord],
        republican_total: u64,
        democrat_total: u64,
    ) -> Vec<CountyRecord> {
        if republican_total == 0 && democrat_total == 0 {
            return records.to_vec();
        }

        let republican_weight = Decimal::from(republican_total);
        let democrat_weight = Decimal::from(democrat_total);

        records
            .iter()
            .map(|record| {
                let (republican, democrat) =
                    split_pool(record.two_party_total(), republican_weight, democrat_weight);
                self.arithmetic.recompute(&CountyRecord {
                    republican,
                    democrat,
                    ..record.clone()
                })
            })
            .collect()
    }

    fn swing_county(
        &self,
        record: &CountyRecord,
        republican_delta: Decimal,
        democrat_delta: Decimal,
    ) -> CountyRecord {
        let pool = record.two_party_total();
        if pool == 0 {
            return record.clone();
        }

        let scale = Decimal::from(pool) / Decimal::ONE_HUNDRED;
        let republican = (Decimal::from(record.republican) + scale * republican_delta)
            .max(Decimal::ZERO);
        let democrat =
            (Decimal::from(record.democrat) + scale * democrat_delta).max(Decimal::ZERO);

        let weight = republican + democrat;
        if weight.is_zero() {
            tracing::debug!(county = record.id, "swing emptied both parties; county left unchanged");
            return record.clone();
        }

        let (republican, democrat) = if weight == Decimal::from(pool) {
            let republican = floor_count(republican).min(pool);
            (republican, pool - republican)
        } else {
            split_pool(pool, republican, democrat)
        };

        self.arithmetic.recompute(&CountyRecord {
            republican,
            democrat,
            ..record.clone()
        })
    }

    fn assign_whole_pool(
        &self,
        records: &[CountyRecord],
        to_republican: bool,
    ) -> Vec<CountyRecord> {
        records
            .iter()
            .map(|record| {
                let pool = record.two_party_total();
                let (republican, democrat) = if to_republican { (pool, 0) } else { (0, pool) };
                self.arithmetic.recompute(&CountyRecord {
                    republican,
                    democrat,
                    ..record.clone()
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn county(
        id: u32,
        republican: u64,
        democrat: u64,
        other: u64,
    ) -> CountyRecord {
        VoteArithmetic::default().recompute(&CountyRecord::new(
            id, "Test", "XX", 10_000, republican, democrat, other,
        ))
    }

    fn splits(records: &[CountyRecord]) -> Vec<(u64, u64, u64)> {
        records
            .iter()
            .map(|r| (r.republican, r.democrat, r.other))
            .collect()
    }

    // =========================================================================
    // apply_update tests
    // =========================================================================

    #[test]
    fn apply_update_clamps_oversized_republican_request() {
        let arithmetic = VoteArithmetic::default();
        let original = county(1, 200, 250, 50);

        let outcome = Redistribution::new(&arithmetic).apply_update(&original, 1000, 0, 50);

        assert_eq!(outcome.record.republican, 450);
        assert_eq!(outcome.record.democrat, 0);
        assert_eq!(outcome.record.other, 50);
        assert_eq!(outcome.record.vote_total, 500);
        assert!(outcome.clamped);
        assert_eq!(outcome.requested.republican, 1000);
    }

    #[test]
    fn apply_update_applies_request_that_fits_exactly() {
        let arithmetic = VoteArithmetic::default();
        let original = county(2, 200, 250, 50);

        let outcome = Redistribution::new(&arithmetic).apply_update(&original, 300, 150, 50);

        assert_eq!(splits(&[outcome.record.clone()]), vec![(300, 150, 50)]);
        assert_eq!(outcome.record.percentage_republican, dec!(60));
        assert!(!outcome.clamped);
    }

    #[test]
    fn apply_update_scales_down_proportionally() {
        let arithmetic = VoteArithmetic::default();
        let original = county(3, 200, 250, 50);

        let outcome = Redistribution::new(&arithmetic).apply_update(&original, 300, 300, 50);

        assert_eq!(splits(&[outcome.record]), vec![(225, 225, 50)]);
    }

    #[test]
    fn apply_update_scales_up_undersized_request() {
        let arithmetic = VoteArithmetic::default();
        let original = county(4, 200, 250, 50);

        let outcome = Redistribution::new(&arithmetic).apply_update(&original, 100, 50, 50);

        assert_eq!(splits(&[outcome.record]), vec![(300, 150, 50)]);
        assert!(outcome.clamped);
    }

    #[test]
    fn apply_update_zero_request_splits_evenly() {
        let arithmetic = VoteArithmetic::default();
        let original = county(5, 200, 249, 51);

        let outcome = Redistribution::new(&arithmetic).apply_update(&original, 0, 0, 51);

        assert_eq!(splits(&[outcome.record]), vec![(224, 225, 51)]);
    }

    #[test]
    fn apply_update_clamps_other_to_pool() {
        let arithmetic = VoteArithmetic::default();
        let original = county(6, 200, 250, 50);

        let outcome = Redistribution::new(&arithmetic).apply_update(&original, 10, 10, 900);

        assert_eq!(splits(&[outcome.record]), vec![(0, 0, 500)]);
    }

    #[test]
    fn apply_update_conserves_vote_total() {
        let arithmetic = VoteArithmetic::default();
        let redistribution = Redistribution::new(&arithmetic);
        let original = county(7, 3_217, 4_981, 333);
        let requests = [
            (0, 0, 0),
            (1, 0, 333),
            (u64::MAX / 4, 7, 333),
            (8_531, 8_531, 0),
            (17, 9_999, 100),
            (4_000, 4_198, 333),
            (2, 3, 8_531),
        ];

        for (republican, democrat, other) in requests {
            let outcome = redistribution.apply_update(&original, republican, democrat, other);
            let record = &outcome.record;

            assert_eq!(
                record.republican + record.democrat + record.other,
                original.vote_total,
                "request ({republican}, {democrat}, {other})"
            );
            assert_eq!(record.vote_total, original.vote_total);
        }
    }

    // =========================================================================
    // apply_swing tests
    // =========================================================================

    #[test]
    fn apply_swing_zero_delta_is_identity() {
        let arithmetic = VoteArithmetic::default();
        let records = vec![
            county(10, 1, 2, 0),
            county(11, 333, 667, 12),
            county(12, 0, 0, 5),
            county(13, 7_919, 104_729, 1_301),
        ];

        let swung = Redistribution::new(&arithmetic).apply_swing(&records, dec!(0), dec!(0));

        assert_eq!(swung, records);
    }

    #[test]
    fn apply_swing_scales_points_by_each_pool() {
        let arithmetic = VoteArithmetic::default();
        let records = vec![county(20, 400, 600, 25), county(21, 100, 100, 3)];

        let swung = Redistribution::new(&arithmetic).apply_swing(&records, dec!(5), dec!(-5));

        assert_eq!(splits(&swung), vec![(450, 550, 25), (110, 90, 3)]);
    }

    #[test]
    fn apply_swing_clamps_at_zero_and_keeps_pool() {
        let arithmetic = VoteArithmetic::default();
        let records = vec![county(30, 10, 990, 0)];

        let swung = Redistribution::new(&arithmetic).apply_swing(&records, dec!(-5), dec!(5));

        assert_eq!(splits(&swung), vec![(0, 1000, 0)]);
    }

    #[test]
    fn apply_swing_one_sided_delta_is_renormalized() {
        let arithmetic = VoteArithmetic::default();
        let records = vec![county(31, 500, 500, 40)];

        // +10 points for Republicans only: 600 vs 500, rescaled into 1000.
        let swung = Redistribution::new(&arithmetic).apply_swing(&records, dec!(10), dec!(0));

        assert_eq!(splits(&swung), vec![(545, 455, 40)]);
    }

    #[test]
    fn apply_swing_to_full_republican_share_moves_every_pool() {
        let arithmetic = VoteArithmetic::default();
        let records = vec![county(40, 400, 600, 9), county(41, 300, 100, 0)];

        let swung = Redistribution::new(&arithmetic).apply_swing(&records, dec!(50), dec!(-50));

        assert_eq!(splits(&swung), vec![(1000, 0, 9), (400, 0, 0)]);
    }

    #[test]
    fn apply_swing_to_full_democrat_share_moves_every_pool() {
        let arithmetic = VoteArithmetic::default();
        let records = vec![county(42, 400, 600, 9), county(43, 300, 100, 0)];

        let swung = Redistribution::new(&arithmetic).apply_swing(&records, dec!(-50), dec!(50));

        assert_eq!(splits(&swung), vec![(0, 1000, 9), (0, 400, 0)]);
    }

    #[test]
    fn apply_swing_saturates_oversized_deltas() {
        let arithmetic = VoteArithmetic::default();
        let records = vec![county(44, 400, 600, 9), county(45, 300, 100, 0)];
        let redistribution = Redistribution::new(&arithmetic);

        let to_republican = redistribution.apply_swing(&records, Decimal::MAX, dec!(0));
        let to_democrat = redistribution.apply_swing(&records, dec!(0), Decimal::MAX);
        let drained = redistribution.apply_swing(&records, Decimal::MIN, dec!(0));

        assert_eq!(splits(&to_republican), vec![(1000, 0, 9), (400, 0, 0)]);
        assert_eq!(splits(&to_democrat), vec![(0, 1000, 9), (0, 400, 0)]);
        assert_eq!(splits(&drained), vec![(0, 1000, 9), (0, 400, 0)]);
    }

    #[test]
    fn apply_swing_on_empty_selection_is_noop() {
        let arithmetic = VoteArithmetic::default();

        let swung = Redistribution::new(&arithmetic).apply_swing(&[], dec!(10), dec!(-10));

        assert!(swung.is_empty());
    }

    #[test]
    fn swing_to_share_hits_target_slider_position() {
        let arithmetic = VoteArithmetic::default();
        let records = vec![county(50, 400, 600, 0), county(51, 300, 100, 0)];

        let swung = Redistribution::new(&arithmetic).swing_to_share(&records, dec!(60));

        assert_eq!(splits(&swung), vec![(500, 500, 0), (340, 60, 0)]);
        assert_eq!(aggregate_share(&swung).republican_percent(), dec!(60));
    }

    // =========================================================================
    // apply_group_update tests
    // =========================================================================

    #[test]
    fn apply_group_update_distributes_by_member_pool() {
        let arithmetic = VoteArithmetic::default();
        let records = vec![county(60, 400, 600, 11), county(61, 300, 100, 0)];

        let updated =
            Redistribution::new(&arithmetic).apply_group_update(&records, 350, 1050);

        assert_eq!(splits(&updated), vec![(250, 750, 11), (100, 300, 0)]);
    }

    #[test]
    fn apply_group_update_accepts_extreme_totals() {
        let arithmetic = VoteArithmetic::default();
        let records = vec![county(63, 400, 600, 11), county(64, 300, 100, 0)];

        let updated =
            Redistribution::new(&arithmetic).apply_group_update(&records, u64::MAX, 1);

        assert_eq!(splits(&updated), vec![(999, 1, 11), (399, 1, 0)]);
        assert_eq!(updated[0].vote_total, records[0].vote_total);
    }

    #[test]
    fn apply_update_with_extreme_request_stays_in_pool() {
        let arithmetic = VoteArithmetic::default();
        let original = county(8, 200, 250, 50);

        let outcome =
            Redistribution::new(&arithmetic).apply_update(&original, u64::MAX, u64::MAX, 0);

        assert_eq!(splits(&[outcome.record]), vec![(250, 250, 0)]);
        assert!(outcome.clamped);
    }

    #[test]
    fn apply_group_update_with_zero_totals_is_noop() {
        let arithmetic = VoteArithmetic::default();
        let records = vec![county(62, 400, 600, 11)];

        let updated = Redistribution::new(&arithmetic).apply_group_update(&records, 0, 0);

        assert_eq!(updated, records);
    }

    #[test]
    fn aggregate_share_sums_two_party_pool() {
        let share = aggregate_share(&[county(70, 400, 600, 50), county(71, 300, 100, 0)]);

        assert_eq!(share.pool(), 1400);
        assert_eq!(share.republican_percent(), dec!(50));
        assert_eq!(share.democrat_percent(), dec!(50));
    }
}
