//! Working set of county records plus their load-time originals.

use std::collections::{BTreeSet, HashMap};

use crate::calculations::common::coerce_count;
use crate::calculations::{Redistribution, UpdateOutcome, VoteArithmetic};
use crate::{CountyId, CountyRecord, RawCountyRecord};

/// Parses a FIPS code. Zero is never a county.
fn county_id(fips: &str) -> Option<CountyId> {
    let fips = fips.trim();
    if fips.is_empty() || !fips.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    fips.parse::<CountyId>().ok().filter(|&id| id != 0)
}

/// Holds the mutable county records in load order, and an untouched copy
/// of each as it was loaded.
#[derive(Debug, Clone, Default)]
pub struct CountyStore {
    arithmetic: VoteArithmetic,
    records: Vec<CountyRecord>,
    originals: Vec<CountyRecord>,
    index: HashMap<CountyId, usize>,
}

impl CountyStore {
    pub fn new(arithmetic: VoteArithmetic) -> Self {
        Self {
            arithmetic,
            records: Vec::new(),
            originals: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn arithmetic(&self) -> &VoteArithmetic {
        &self.arithmetic
    }

    /// Replaces the store's contents with `raw` and returns how many
    /// records were kept.
    ///
    /// Numeric text that cannot be parsed counts as 0. State codes are
    /// trimmed and upper-cased. Rows whose FIPS code is missing, zero or
    /// not a number are skipped. If an identifier repeats, the first row
    /// wins.
    pub fn load<I>(
        &mut self,
        raw: I,
    ) -> usize
    where
        I: IntoIterator<Item = RawCountyRecord>,
    {
        self.records.clear();
        self.originals.clear();
        self.index.clear();

        for row in raw {
            let Some(id) = county_id(&row.fips) else {
                tracing::warn!(
                    fips = %row.fips,
                    name = %row.name.trim(),
                    "county row without a usable FIPS code skipped"
                );
                continue;
            };

            let record = self.arithmetic.recompute(&CountyRecord::new(
                id,
                row.name.trim(),
                row.state.trim().to_ascii_uppercase(),
                coerce_count(&row.population),
                coerce_count(&row.republican),
                coerce_count(&row.democrat),
                coerce_count(&row.other),
            ));

            if self.index.contains_key(&record.id) {
                tracing::warn!(county = record.id, name = %record.name, "duplicate county id skipped");
                continue;
            }

            self.index.insert(record.id, self.records.len());
            self.originals.push(record.clone());
            self.records.push(record);
        }

        tracing::info!(counties = self.records.len(), "county records loaded");
        self.records.len()
    }

    pub fn get(
        &self,
        id: CountyId,
    ) -> Option<&CountyRecord> {
        self.index.get(&id).map(|&i| &self.records[i])
    }

    /// The record exactly as it was loaded.
    pub fn original(
        &self,
        id: CountyId,
    ) -> Option<&CountyRecord> {
        self.index.get(&id).map(|&i| &self.originals[i])
    }

    /// Every record, in load order.
    pub fn get_all(&self) -> &[CountyRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(
        &self,
        id: CountyId,
    ) -> bool {
        self.index.contains_key(&id)
    }

    pub fn counties_in_state<'a>(
        &'a self,
        state: &'a str,
    ) -> impl Iterator<Item = &'a CountyRecord> + 'a {
        self.records
            .iter()
            .filter(move |record| record.state.eq_ignore_ascii_case(state))
    }

    /// Distinct state codes present in the data, sorted.
    pub fn state_codes(&self) -> BTreeSet<String> {
        self.records
            .iter()
            .map(|record| record.state.clone())
            .collect()
    }

    /// Sets a county's split through [`Redistribution::apply_update`] and
    /// stores the result. `None` if the id is unknown.
    pub fn update(
        &mut self,
        id: CountyId,
        republican: u64,
        democrat: u64,
        other: u64,
    ) -> Option<UpdateOutcome> {
        let &i = self.index.get(&id)?;
        let outcome = Redistribution::new(&self.arithmetic).apply_update(
            &self.records[i],
            republican,
            democrat,
            other,
        );
        self.records[i] = outcome.record.clone();
        Some(outcome)
    }

    /// Stores a record produced by the redistribution engine. Returns
    /// `false` (and stores nothing) if its id is unknown.
    pub fn persist(
        &mut self,
        record: CountyRecord,
    ) -> bool {
        match self.index.get(&record.id) {
            Some(&i) => {
                self.records[i] = self.arithmetic.recompute(&record);
                true
            }
            None => false,
        }
    }

    /// Restores one county from its original snapshot.
    pub fn reset(
        &mut self,
        id: CountyId,
    ) -> Option<&CountyRecord> {
        let &i = self.index.get(&id)?;
        self.records[i] = self.arithmetic.recompute(&self.originals[i]);
        Some(&self.records[i])
    }

    pub fn reset_all(&mut self) {
        for (record, original) in self.records.iter_mut().zip(&self.originals) {
            *record = self.arithmetic.recompute(original);
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn raw(
        fips: &str,
        state: &str,
        population: &str,
        republican: &str,
        democrat: &str,
        other: &str,
    ) -> RawCountyRecord {
        RawCountyRecord {
            fips: fips.to_string(),
            name: format!("County {fips}"),
            state: state.to_string(),
            population: population.to_string(),
            republican: republican.to_string(),
            democrat: democrat.to_string(),
            other: other.to_string(),
        }
    }

    fn loaded_store() -> CountyStore {
        let mut store = CountyStore::new(VoteArithmetic::default());
        store.load(vec![
            raw("01001", "AL", "1000", "400", "300", "0"),
            raw("01003", " al ", "2,000", "900", "500", "100"),
            raw("13001", "GA", "5000", "1000", "1200", "50"),
        ]);
        store
    }

    #[test]
    fn load_coerces_and_derives_fields() {
        let store = loaded_store();

        let autauga = store.get(1001).expect("county should load");
        assert_eq!(autauga.state, "AL");
        assert_eq!(autauga.vote_total, 700);
        assert_eq!(autauga.percentage_republican, dec!(57.14));
        assert_eq!(autauga.turnout, dec!(70));

        let baldwin = store.get(1003).expect("county should load");
        assert_eq!(baldwin.state, "AL");
        assert_eq!(baldwin.population, 2000);
    }

    #[test]
    fn load_defaults_unparseable_numbers_to_zero() {
        let mut store = CountyStore::new(VoteArithmetic::default());
        store.load(vec![raw("02013", "AK", "", "abc", "12", "n/a")]);

        let record = store.get(2013).expect("county should load");
        assert_eq!(record.population, 0);
        assert_eq!(record.republican, 0);
        assert_eq!(record.democrat, 12);
        assert_eq!(record.other, 0);
        assert_eq!(record.turnout, dec!(0));
    }

    #[test]
    fn load_keeps_first_duplicate_and_load_order() {
        let mut store = CountyStore::new(VoteArithmetic::default());
        let kept = store.load(vec![
            raw("5", "AR", "10", "1", "1", "0"),
            raw("3", "AR", "10", "2", "2", "0"),
            raw("5", "AR", "10", "9", "9", "0"),
        ]);

        assert_eq!(kept, 2);
        let ids: Vec<_> = store.get_all().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![5, 3]);
        assert_eq!(store.get(5).map(|r| r.republican), Some(1));
    }

    #[test]
    fn load_skips_rows_without_usable_fips() {
        let mut store = CountyStore::new(VoteArithmetic::default());
        let kept = store.load(vec![
            raw("", "AR", "10", "1", "1", "0"),
            raw("n/a", "AR", "10", "1", "1", "0"),
            raw("00000", "AR", "10", "1", "1", "0"),
            raw("99999999999", "AR", "10", "1", "1", "0"),
            raw("05001", "AR", "10", "4", "2", "0"),
            raw("  ", "AR", "10", "1", "1", "0"),
        ]);

        assert_eq!(kept, 1);
        assert_eq!(store.get(5001).map(|r| r.republican), Some(4));
        assert!(!store.contains(0));
    }

    #[test]
    fn load_zeroes_out_of_range_counts() {
        let mut store = CountyStore::new(VoteArithmetic::default());
        store.load(vec![raw(
            "48005",
            "TX",
            "99999999999999999999",
            "99999999999999999999",
            "1",
            "18446744073709551615",
        )]);

        let record = store.get(48005).expect("county should load");
        assert_eq!(record.population, 0);
        assert_eq!(record.republican, 0);
        assert_eq!(record.democrat, 1);
        assert_eq!(record.other, 0);
        assert_eq!(record.vote_total, 1);
    }

    #[test]
    fn update_unknown_county_is_none() {
        let mut store = loaded_store();

        assert!(store.update(99999, 1, 1, 1).is_none());
        assert!(store.reset(99999).is_none());
    }

    #[test]
    fn update_persists_clamped_values() {
        let mut store = loaded_store();

        let outcome = store.update(1001, 5000, 0, 0).expect("county exists");

        assert_eq!(outcome.record.republican, 700);
        assert_eq!(store.get(1001), Some(&outcome.record));
        assert_eq!(store.original(1001).map(|r| r.republican), Some(400));
    }

    #[test]
    fn reset_restores_original_exactly() {
        let mut store = loaded_store();
        let original = store.get(1003).cloned().expect("county exists");

        store.update(1003, 1, 1399, 100);
        store.update(1003, 700, 700, 0);
        let reset = store.reset(1003).cloned();

        assert_eq!(reset, Some(original));
    }

    #[test]
    fn reset_all_restores_every_county() {
        let mut store = loaded_store();
        let before = store.get_all().to_vec();

        store.update(1001, 0, 700, 0);
        store.update(13001, 2250, 0, 0);
        store.reset_all();

        assert_eq!(store.get_all(), before.as_slice());
    }

    #[test]
    fn counties_in_state_and_state_codes() {
        let store = loaded_store();

        assert_eq!(store.counties_in_state("AL").count(), 2);
        assert_eq!(store.counties_in_state("ga").count(), 1);
        assert_eq!(
            store.state_codes().into_iter().collect::<Vec<_>>(),
            vec!["AL".to_string(), "GA".to_string()]
        );
    }

    #[test]
    fn persist_rejects_unknown_ids() {
        let mut store = loaded_store();
        let stranger = CountyRecord::new(77777, "Nowhere", "ZZ", 0, 1, 1, 1);

        assert!(!store.persist(stranger));
        assert_eq!(store.len(), 3);
    }
}
