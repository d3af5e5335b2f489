//! Pure vote arithmetic: derived county fields and redistribution.
//!
//! Nothing in this module touches the store; every function takes records
//! by reference and returns new ones for the caller to persist.

pub mod arithmetic;
pub mod common;
pub mod redistribution;

pub use arithmetic::{DEFAULT_EXCLUDED_COUNTY, VoteArithmetic};
pub use redistribution::{Redistribution, TwoPartyShare, UpdateOutcome, UpdateRequest, aggregate_share};
