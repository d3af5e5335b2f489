use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Numeric FIPS code of a county (`"01001"` is stored as `1001`).
pub type CountyId = u32;

/// A county row as delivered by the external data source.
///
/// Every field is still text; [`crate::CountyStore::load`] coerces the
/// numeric ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCountyRecord {
    pub fips: String,
    pub name: String,
    pub state: String,
    pub population: String,
    pub republican: String,
    pub democrat: String,
    pub other: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountyRecord {
    pub id: CountyId,
    pub name: String,
    pub state: String,
    pub population: u64,
    pub republican: u64,
    pub democrat: u64,
    pub other: u64,

    // Derived values, owned by VoteArithmetic::recompute
    pub vote_total: u64,
    pub percentage_republican: Decimal,
    pub percentage_democrat: Decimal,
    pub percentage_other: Decimal,
    pub turnout: Decimal,
}

impl CountyRecord {
    /// Creates a record with zeroed derived fields.
    ///
    /// Run the result through [`crate::calculations::VoteArithmetic::recompute`]
    /// before handing it to anything else.
    pub fn new(
        id: CountyId,
        name: impl Into<String>,
        state: impl Into<String>,
        population: u64,
        republican: u64,
        democrat: u64,
        other: u64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            state: state.into(),
            population,
            republican,
            democrat,
            other,
            vote_total: 0,
            percentage_republican: Decimal::ZERO,
            percentage_democrat: Decimal::ZERO,
            percentage_other: Decimal::ZERO,
            turnout: Decimal::ZERO,
        }
    }

    /// Republican plus Democrat votes; the pool a swing operates on.
    pub fn two_party_total(&self) -> u64 {
        self.republican.saturating_add(self.democrat)
    }
}
