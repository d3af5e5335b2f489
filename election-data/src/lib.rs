pub mod config;
pub mod loader;
pub mod logging;

pub use config::{ConfigError, load_config, parse_config};
pub use loader::{CountyCsvLoader, CountyLoaderError};
