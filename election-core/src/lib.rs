//! Vote aggregation and what-if redistribution for county-level
//! presidential election results.
//!
//! County edits flow upward through a fixed hierarchy:
//!
//! ```text
//! county edit -> VoteArithmetic -> CountyStore -> StateAggregator -> tallies -> listeners
//! ```
//!
//! [`ElectionEngine`] owns every layer and runs the whole cascade
//! synchronously inside each `&mut self` call, so no observer can see a
//! county that has been edited while its state or the national totals
//! are still stale.

pub mod aggregator;
pub mod calculations;
pub mod engine;
pub mod error;
pub mod models;
pub mod notify;
pub mod store;
pub mod tally;

pub use aggregator::{OverridePolicy, StateAggregator};
pub use engine::{ElectionEngine, EngineConfig};
pub use error::EngineError;
pub use models::*;
pub use notify::{ChangeKind, ChangeListener, ChangeNotification, SubscriptionId};
pub use store::CountyStore;
