//! Croupier CLI
//!
//! Plays spins against a persisted table, and inspects its history and
//! statistics.

use clap::{Parser, Subcommand};
use croupier::{
    open_store, open_table, BetKind, BetSelection, ConfigLoader, CroupierConfig, CroupierResult,
    SpinReport, StateStore, StorageBackend, Table, WagerError,
};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// American roulette table
#[derive(Parser)]
#[command(name = "croupier")]
#[command(about = "American roulette wager resolution with a persisted bank and history")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// State file, overriding the configuration
    #[arg(short, long)]
    state: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Place wagers and spin once
    Play {
        /// Wager as SELECTION[=STAKE], e.g. straight:17=50, split:17-20, red=100
        #[arg(short, long = "bet", required = true)]
        bets: Vec<String>,

        /// Force the outcome ("00" or 0-36)
        #[arg(short, long)]
        outcome: Option<String>,
    },

    /// Show recent wagers, newest first
    History {
        #[arg(short = 'n', long, default_value = "10")]
        count: usize,
    },

    /// Show statistics for the retained history and lifetime totals
    Stats,

    /// Add capital to the balance
    Inject { amount: u64 },

    /// Delete the wager history
    ClearHistory,

    /// List bet categories
    Catalog {
        /// Only this kind, e.g. corner
        #[arg(short, long)]
        kind: Option<String>,
    },

    /// Spin repeatedly on a fresh in-memory table
    Simulate {
        #[arg(short = 'n', long, default_value = "100")]
        spins: u64,

        #[arg(short, long, default_value = "red")]
        bet: String,

        /// Stake per spin; defaults to the configured default stake
        #[arg(long)]
        stake: Option<u64>,

        /// Wheel seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> CroupierResult<()> {
    let cli = Cli::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_path(path);
    }
    let mut config = loader.load()?;
    if let Some(path) = &cli.state {
        config.storage.path = path.to_string_lossy().into_owned();
    }

    let default_filter = if cli.verbose {
        "croupier=debug".to_string()
    } else {
        format!("croupier={}", config.logging.level.as_str())
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .init();

    match cli.command {
        Commands::Play { bets, outcome } => play(&config, &bets, outcome.as_deref()),
        Commands::History { count } => show_history(&config, count),
        Commands::Stats => show_stats(&config),
        Commands::Inject { amount } => inject(&config, amount),
        Commands::ClearHistory => clear_history(&config),
        Commands::Catalog { kind } => show_catalog(kind.as_deref()),
        Commands::Simulate {
            spins,
            bet,
            stake,
            seed,
        } => simulate(&config, spins, &bet, stake, seed),
    }
}

/// Split `SELECTION[=STAKE]`
fn parse_bet(arg: &str, default_stake: u64) -> Result<(BetSelection, u64), WagerError> {
    let (selection, stake) = match arg.split_once('=') {
        Some((selection, stake)) => {
            let stake = stake
                .trim()
                .parse()
                .map_err(|_| WagerError::InvalidInput(arg.to_string()))?;
            (selection, stake)
        }
        None => (arg, default_stake),
    };
    Ok((selection.parse()?, stake))
}

fn play(config: &CroupierConfig, bets: &[String], outcome: Option<&str>) -> CroupierResult<()> {
    let store = open_store(config)?;
    let mut table = open_table(config, store.as_ref())?;

    // Parse everything first so a typo places nothing
    let wagers = bets
        .iter()
        .map(|arg| parse_bet(arg, config.table.default_stake))
        .collect::<Result<Vec<_>, _>>()?;

    for (selection, stake) in &wagers {
        if let Err(e) = table.place_wager(selection, *stake) {
            table.clear_active_wagers(true)?;
            return Err(e.into());
        }
    }

    if let Some(text) = outcome {
        if let Err(e) = table.set_forced_from_str(text) {
            table.clear_active_wagers(true)?;
            return Err(e.into());
        }
    }

    table.begin_spin()?;
    let report = table.finish_spin()?;
    print_report(&report);

    save(store.as_ref(), &table)
}

fn print_report(report: &SpinReport) {
    println!("{}", report);
    for result in &report.results {
        let verdict = if result.win_amount > 0 {
            format!("WON {}$", result.win_amount)
        } else {
            format!("LOST {}$", result.stake)
        };
        println!("  {} on {} - {}", result.kind, result.covered, verdict);
    }
    println!("Balance: {}$", report.balance_after);
}

fn save(store: &dyn StateStore, table: &Table) -> CroupierResult<()> {
    store.save(&table.snapshot())?;
    Ok(())
}

fn show_history(config: &CroupierConfig, count: usize) -> CroupierResult<()> {
    let store = open_store(config)?;
    let table = open_table(config, store.as_ref())?;

    let entries = table.history_snapshot(count);
    if entries.is_empty() {
        println!("No wagers yet");
    }
    for entry in entries {
        println!("{}", entry);
    }
    Ok(())
}

fn show_stats(config: &CroupierConfig) -> CroupierResult<()> {
    let store = open_store(config)?;
    let table = open_table(config, store.as_ref())?;
    let stats = table.statistics_snapshot();
    let lifetime = table.lifetime();

    println!("Last {} wagers:", stats.wagers);
    println!("  Spins: {}", stats.spins);
    println!("  Wins: {}  Losses: {}", stats.wins, stats.losses);
    println!("  Wagered: {}$  Won: {}$", stats.total_wagered, stats.total_won);
    println!("  Net: {}$", stats.net_profit);
    println!("Lifetime:");
    println!("  Spins: {}", lifetime.spins);
    println!("  Capital injected: {}$", lifetime.capital_injected);
    println!("  Wagered: {}$  Won: {}$", lifetime.lost, lifetime.won);
    match lifetime.profit {
        p if p > 0 => println!("  Profit Earned: {}$", p),
        p if p < 0 => println!("  Loss Incurred: {}$", -p),
        _ => println!("  No Profit or Loss"),
    }
    println!("Balance: {}$", table.balance());
    Ok(())
}

fn inject(config: &CroupierConfig, amount: u64) -> CroupierResult<()> {
    let store = open_store(config)?;
    let mut table = open_table(config, store.as_ref())?;

    table.inject(amount)?;
    println!("Balance: {}$", table.balance());
    save(store.as_ref(), &table)
}

fn clear_history(config: &CroupierConfig) -> CroupierResult<()> {
    let store = open_store(config)?;
    let mut table = open_table(config, store.as_ref())?;

    table.clear_history();
    save(store.as_ref(), &table)
}

fn show_catalog(kind: Option<&str>) -> CroupierResult<()> {
    let catalog = croupier::BetCatalog::american()?;
    let kinds: Vec<BetKind> = match kind {
        Some(text) => vec![text.parse()?],
        None => BetKind::ALL.to_vec(),
    };

    for kind in kinds {
        for category in catalog.categories_of(kind) {
            println!("{}", category);
        }
    }
    Ok(())
}

fn simulate(
    config: &CroupierConfig,
    spins: u64,
    bet: &str,
    stake: Option<u64>,
    seed: Option<u64>,
) -> CroupierResult<()> {
    let mut config = config.clone();
    config.storage.backend = StorageBackend::Memory;
    if seed.is_some() {
        config.table.rng_seed = seed;
    }

    let (selection, stake) = parse_bet(bet, stake.unwrap_or(config.table.default_stake))?;
    let mut table = Table::from_config(&config, None)?;

    for _ in 0..spins {
        match table.place_wager(&selection, stake) {
            Ok(_) => {}
            Err(WagerError::InsufficientFunds { available, .. }) => {
                warn!(available, "Bankroll exhausted");
                break;
            }
            Err(e) => return Err(e.into()),
        }
        let outcome = table.current_outcome_or_random();
        table.spin_outcome(outcome)?;
    }

    let stats = table.statistics_snapshot();
    let lifetime = table.lifetime();
    info!(spins = lifetime.spins, balance = table.balance(), "Simulation finished");

    println!("Spins: {}", lifetime.spins);
    println!("Wins: {}  Losses: {}  (last {} wagers)", stats.wins, stats.losses, stats.wagers);
    println!("Wagered: {}$  Won: {}$", lifetime.lost, lifetime.won);
    println!("Net: {}$", lifetime.profit);
    println!("Balance: {}$", table.balance());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert()
    }

    #[test]
    fn test_parse_bet() {
        let (selection, stake) = parse_bet("straight:17=50", 10).unwrap();
        assert_eq!(selection.kind, BetKind::Straight);
        assert_eq!(stake, 50);

        let (selection, stake) = parse_bet("dozen2", 10).unwrap();
        assert_eq!(selection, BetSelection::outside(BetKind::Dozen2));
        assert_eq!(stake, 10);

        assert!(matches!(parse_bet("red=lots", 10), Err(WagerError::InvalidInput(_))));
        assert!(matches!(parse_bet("trio=5", 10), Err(WagerError::UnknownBet(_))));
    }

    #[test]
    fn test_play_with_forced_outcome_persists() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = CroupierConfig::default();
        config.storage.path = dir.path().join("state.json").to_string_lossy().into_owned();

        play(&config, &["straight:17=50".to_string()], Some("17")).unwrap();

        let store = open_store(&config).unwrap();
        let table = open_table(&config, store.as_ref()).unwrap();
        assert_eq!(table.balance(), 2750);
        assert_eq!(table.total_spins(), 1);
    }

    #[test]
    fn test_play_bad_outcome_refunds() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = CroupierConfig::default();
        config.storage.path = dir.path().join("state.json").to_string_lossy().into_owned();

        assert!(play(&config, &["red=100".to_string()], Some("37")).is_err());

        let store = open_store(&config).unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
