use thiserror::Error;

use crate::CountyId;

/// Engine operations only fail when they name something that does not
/// exist. Nothing is modified when one of these is returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("county {0} not found")]
    CountyNotFound(CountyId),

    #[error("state '{0}' not found")]
    StateNotFound(String),
}
