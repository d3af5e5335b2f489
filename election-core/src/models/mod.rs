mod apportionment;
mod county;
mod electoral;
mod lean;
mod state;

pub use apportionment::Apportionment;
pub use county::{CountyId, CountyRecord, RawCountyRecord};
pub use electoral::{ElectoralResult, PopularVote, StateAllocation};
pub use lean::Lean;
pub use state::{StateAggregate, UpdateSource};
