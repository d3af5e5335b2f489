use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::Parser;
use election_core::{
    Apportionment, ChangeNotification, CountyId, ElectionEngine, EngineConfig, Lean,
};
use election_data::logging::init_logging;
use election_data::{CountyCsvLoader, load_config};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

// --- CLI definition ---

/// What-if explorer for county-level presidential results.
///
/// Loads a county CSV, applies the requested edits in one batch, and prints
/// the resulting electoral and popular vote.
#[derive(Debug, Parser)]
#[command(name = "election-whatif")]
#[command(version, about, long_about = None)]
struct Cli {
    /// County results CSV (fips, county, state, population, republican, democrat, other)
    #[arg(short, long)]
    file: PathBuf,

    /// TOML engine configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Apportionment table: 2010 or 2020 (overrides the config file)
    #[arg(long, value_parser = parse_apportionment)]
    census: Option<Apportionment>,

    /// Count every county's population, including the excluded one
    #[arg(long, default_value_t = false)]
    no_exclusion: bool,

    /// Set one county: FIPS:REP:DEM:OTHER
    #[arg(long = "set", value_name = "FIPS:REP:DEM:OTHER")]
    sets: Vec<CountyEdit>,

    /// Swing every county of a state by percentage points: STATE:REP:DEM
    #[arg(long = "swing", value_name = "STATE:REP:DEM", allow_hyphen_values = true)]
    swings: Vec<StateSwing>,

    /// Force a state's lean: STATE=R|D|T
    #[arg(long = "override", value_name = "STATE=R|D|T")]
    overrides: Vec<StateOverride>,

    /// Print the per-state allocation table
    #[arg(long, default_value_t = false)]
    states: bool,

    /// Log filter directive (e.g. `debug`, `election_core=trace`)
    #[arg(long)]
    log_level: Option<String>,

    /// Append logs to this file as well as stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy)]
struct CountyEdit {
    id: CountyId,
    republican: u64,
    democrat: u64,
    other: u64,
}

impl FromStr for CountyEdit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<_> = s.split(':').map(str::trim).collect();
        let [id, republican, democrat, other] = parts[..] else {
            return Err(format!("expected FIPS:REP:DEM:OTHER, got '{s}'"));
        };
        let number = |field: &str, value: &str| {
            value
                .parse::<u64>()
                .map_err(|e| format!("invalid {field} '{value}': {e}"))
        };
        Ok(Self {
            id: id
                .parse()
                .map_err(|e| format!("invalid FIPS '{id}': {e}"))?,
            republican: number("Republican votes", republican)?,
            democrat: number("Democrat votes", democrat)?,
            other: number("Other votes", other)?,
        })
    }
}

#[derive(Debug, Clone)]
struct StateSwing {
    state: String,
    republican: Decimal,
    democrat: Decimal,
}

impl FromStr for StateSwing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<_> = s.split(':').map(str::trim).collect();
        let [state, republican, democrat] = parts[..] else {
            return Err(format!("expected STATE:REP:DEM, got '{s}'"));
        };
        let points = |value: &str| {
            Decimal::from_str(value).map_err(|e| format!("invalid points '{value}': {e}"))
        };
        Ok(Self {
            state: state.to_ascii_uppercase(),
            republican: points(republican)?,
            democrat: points(democrat)?,
        })
    }
}

#[derive(Debug, Clone)]
struct StateOverride {
    state: String,
    lean: Lean,
}

impl FromStr for StateOverride {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (state, lean) = s
            .split_once('=')
            .ok_or_else(|| format!("expected STATE=R|D|T, got '{s}'"))?;
        let lean = Lean::parse(lean).ok_or_else(|| format!("unknown lean '{lean}'"))?;
        Ok(Self {
            state: state.trim().to_ascii_uppercase(),
            lean,
        })
    }
}

fn parse_apportionment(s: &str) -> Result<Apportionment, String> {
    Apportionment::parse(s).ok_or_else(|| format!("unknown census '{s}' (use 2010 or 2020)"))
}

// --- Entry point ---

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref(), cli.log_file.as_deref())?;

    let mut config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(census) = cli.census {
        config.apportionment = census;
    }
    if cli.no_exclusion {
        config.excluded_county = None;
    }
    debug!(?config, "engine configuration");

    let records = CountyCsvLoader::load_from_file(&cli.file)
        .with_context(|| format!("Failed to load counties: {}", cli.file.display()))?;

    let mut engine = ElectionEngine::new(config);
    engine.subscribe(|change: &ChangeNotification| {
        info!(
            kind = ?change.kind,
            counties = change.counties.len(),
            states = ?change.states,
            republican = change.electoral.republican_votes,
            democrat = change.electoral.democrat_votes,
            too_close = change.electoral.too_close_to_call_votes,
            "results changed"
        );
    });

    let loaded = engine.load(records);
    println!("Loaded {loaded} counties from {}", cli.file.display());

    engine.batch(|engine| {
        for edit in &cli.sets {
            match engine.update_county(edit.id, edit.republican, edit.democrat, edit.other) {
                Ok(outcome) if outcome.clamped => warn!(
                    county = edit.id,
                    republican = outcome.record.republican,
                    democrat = outcome.record.democrat,
                    other = outcome.record.other,
                    "edit adjusted to keep the county's vote total"
                ),
                Ok(_) => {}
                Err(e) => warn!("skipping --set: {e}"),
            }
        }

        for swing in &cli.swings {
            let ids: Vec<CountyId> = engine
                .store()
                .counties_in_state(&swing.state)
                .map(|county| county.id)
                .collect();
            if ids.is_empty() {
                warn!(state = %swing.state, "skipping --swing: no counties for state");
                continue;
            }
            if let Err(e) = engine.swing(&ids, swing.republican, swing.democrat) {
                warn!("skipping --swing: {e}");
            }
        }

        for state_override in &cli.overrides {
            if let Err(e) = engine.set_override(&state_override.state, state_override.lean) {
                warn!("skipping --override: {e}");
            }
        }
    });

    print_summary(&engine, cli.states);
    Ok(())
}

fn print_summary(
    engine: &ElectionEngine,
    with_states: bool,
) {
    let apportionment = engine.apportionment();

    if with_states {
        println!();
        println!("{:<6} {:>8} {:>6} {:>12} {:>12}", "State", "Electors", "Lean", "Republican", "Democrat");
        for allocation in engine.allocations() {
            let (republican, democrat) = engine
                .state(&allocation.state)
                .map(|s| (s.total_republican, s.total_democrat))
                .unwrap_or((0, 0));
            let marker = if allocation.overridden { "*" } else { "" };
            println!(
                "{:<6} {:>8} {:>5}{:1} {:>12} {:>12}",
                allocation.state,
                allocation.electors,
                allocation.lean.as_str(),
                marker,
                republican,
                democrat
            );
        }
    }

    let electoral = engine.electoral();
    println!();
    println!("Electoral votes ({} census, {} to win)", apportionment.as_str(), apportionment.majority());
    println!("  Republican:        {:>4}", electoral.republican_votes);
    println!("  Democrat:          {:>4}", electoral.democrat_votes);
    println!("  Too close to call: {:>4}", electoral.too_close_to_call_votes);
    match electoral.winner(apportionment.majority()) {
        Some(Lean::Republican) => println!("  Winner: Republican"),
        Some(Lean::Democrat) => println!("  Winner: Democrat"),
        _ => println!("  Winner: none"),
    }

    let popular = engine.popular();
    println!();
    println!("Popular vote");
    println!("  Republican: {:>12}", popular.republican_total);
    println!("  Democrat:   {:>12}", popular.democrat_total);
    println!("  Other:      {:>12}", popular.other_total);
    println!("  Turnout:    {:>11}%", popular.turnout);
}
