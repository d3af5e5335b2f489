//! TOML configuration for the engine.
//!
//! ```toml
//! apportionment = "census2010"      # or "census2020"
//! excluded_county = 51515           # omit to keep the default
//! override_policy = "keep_until_cleared"
//! ```
//!
//! Every key is optional.

use std::path::Path;

use election_core::EngineConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

pub fn parse_config(input: &str) -> Result<EngineConfig, ConfigError> {
    Ok(toml::from_str(input)?)
}

pub fn load_config(path: &Path) -> Result<EngineConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_config(&text)
}
