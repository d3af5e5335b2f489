//! CSV ingestion of county election results.
//!
//! ## CSV Format
//!
//! Headers are matched by name, in any order. Each column accepts a few
//! spellings seen in published county-level datasets.
//!
//! | Column       | Also accepted                         | Notes |
//! |--------------|---------------------------------------|-------|
//! | `fips`       | `FIPS`, `id`, `county_fips`           | leading zeros allowed |
//! | `county`     | `name`, `county_name`, `County`       | |
//! | `state`      | `state_code`, `state_po`, `State`     | postal code, e.g. `TX` |
//! | `population` | `Population`, `pop`                   | |
//! | `republican` | `Republican`, `rep`, `votes_gop`      | |
//! | `democrat`   | `Democrat`, `dem`, `votes_dem`        | |
//! | `other`      | `Other`, `oth`, `votes_other`         | |
//!
//! A missing column reads as empty text. Numeric cells are kept as text
//! here; [`election_core::CountyStore::load`] coerces them (blank or
//! non-numeric cells count as 0).
//!
//! ```csv
//! fips,county,state,population,republican,democrat,other
//! 01001,Autauga,AL,"55,869",19838,7503,429
//! ```

use std::fs::File;
use std::io::Read;
use std::path::Path;

use election_core::RawCountyRecord;
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when reading county CSV data.
///
/// Only structural problems are errors; bad numbers are not.
#[derive(Debug, Error)]
pub enum CountyLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("cannot read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<csv::Error> for CountyLoaderError {
    fn from(err: csv::Error) -> Self {
        CountyLoaderError::CsvParse(err.to_string())
    }
}

/// One row of the county CSV, as text.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
struct CountyCsvRow {
    #[serde(alias = "FIPS", alias = "id", alias = "county_fips")]
    fips: String,
    #[serde(alias = "name", alias = "county_name", alias = "County")]
    county: String,
    #[serde(alias = "state_code", alias = "state_po", alias = "State")]
    state: String,
    #[serde(alias = "Population", alias = "pop")]
    population: String,
    #[serde(alias = "Republican", alias = "rep", alias = "votes_gop")]
    republican: String,
    #[serde(alias = "Democrat", alias = "dem", alias = "votes_dem")]
    democrat: String,
    #[serde(alias = "Other", alias = "oth", alias = "votes_other")]
    other: String,
}

impl From<CountyCsvRow> for RawCountyRecord {
    fn from(row: CountyCsvRow) -> Self {
        RawCountyRecord {
            fips: row.fips,
            name: row.county,
            state: row.state,
            population: row.population,
            republican: row.republican,
            democrat: row.democrat,
            other: row.other,
        }
    }
}

/// Reads county rows from CSV in file order.
pub struct CountyCsvLoader;

impl CountyCsvLoader {
    /// Parse county records from any reader (a file, a byte slice, ...).
    pub fn parse<R: Read>(reader: R) -> Result<Vec<RawCountyRecord>, CountyLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .flexible(false)
            .from_reader(reader);

        let mut records = Vec::new();
        for result in csv_reader.deserialize::<CountyCsvRow>() {
            records.push(result?.into());
        }

        tracing::debug!(rows = records.len(), "county CSV parsed");
        Ok(records)
    }

    pub fn load_from_file(path: &Path) -> Result<Vec<RawCountyRecord>, CountyLoaderError> {
        let file = File::open(path).map_err(|source| CountyLoaderError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(file)
    }
}
