//! BitSlot command line
//!
//! Usage:
//!   bitslot spin [--count N] [--bet X] [--json | --cues | --events]
//!   bitslot simulate --spins N [--bet X] [--balance X]
//!   bitslot config            - Print the effective config as JSON
//!   bitslot balance           - Print the persisted balance

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use bs_core::BsError;
use bs_slot_lab::{SessionStats, SlotConfig, SpinEngine, SpinResult};
use bs_stage::{AudioCue, CueDispatcher, CuePlayer, FnSink, StageEvent};
use bs_state::{BalanceStore, JsonBalanceStore, MemoryBalanceStore, PLAYER_BALANCE_KEY};

#[derive(Parser)]
#[command(name = "bitslot", about = "BitSlot spin resolution engine", version)]
struct Cli {
    /// Engine config (.json, .yaml or .yml); built-in defaults when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Balance file; the platform config directory when omitted
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Fixed RNG seed for a reproducible session
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Spin against the persisted balance
    Spin {
        /// Number of spins
        #[arg(short = 'n', long, default_value_t = 1)]
        count: u32,
        /// Bet per spin (current bet when omitted)
        #[arg(short, long)]
        bet: Option<f64>,
        /// Print each result as JSON
        #[arg(long)]
        json: bool,
        /// Print the audio cues each spin fires
        #[arg(long, conflicts_with = "json")]
        cues: bool,
        /// Print every stage event as a JSON line
        #[arg(long, conflicts_with_all = ["json", "cues"])]
        events: bool,
    },
    /// Run many spins against an in-memory balance and report session stats
    Simulate {
        #[arg(short = 'n', long)]
        spins: u64,
        #[arg(short, long)]
        bet: Option<f64>,
        /// Starting balance (config initial balance when omitted)
        #[arg(long)]
        balance: Option<f64>,
    },
    /// Print the effective config as JSON
    Config,
    /// Print the persisted balance
    Balance,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Spin {
            count,
            bet,
            json,
            cues,
            events,
        } => {
            let store = Arc::new(open_store(&cli.store));
            let engine = SpinEngine::new(config, store)?;
            let engine = if cues {
                engine.with_sink(CueDispatcher::new(PrintPlayer))
            } else if events {
                engine.with_sink(FnSink(print_event))
            } else {
                engine
            };
            run_spins(engine, count, bet, json)
        }
        Commands::Simulate {
            spins,
            bet,
            balance,
        } => {
            let mut config = config;
            if let Some(balance) = balance {
                config.initial_balance = balance;
            }
            let engine = SpinEngine::new(config, Arc::new(MemoryBalanceStore::new()))?;
            simulate(engine, spins, bet)
        }
        Commands::Config => {
            println!("{}", config.to_json()?);
            Ok(())
        }
        Commands::Balance => {
            let store = open_store(&cli.store);
            match store.load(PLAYER_BALANCE_KEY)? {
                Some(balance) => println!("{:.2}", balance),
                None => println!("{:.2} (nothing saved yet)", config.initial_balance),
            }
            Ok(())
        }
    }
}

fn load_config(cli: &Cli) -> Result<SlotConfig> {
    let mut config = match &cli.config {
        Some(path) => SlotConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SlotConfig::default(),
    };
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    Ok(config)
}

fn open_store(path: &Option<PathBuf>) -> JsonBalanceStore {
    match path {
        Some(path) => JsonBalanceStore::new(path),
        None => JsonBalanceStore::at_default_path(),
    }
}

/// Spin once, at `bet` when given
fn spin_once(engine: &mut SpinEngine, bet: Option<f64>) -> Result<Option<SpinResult>, BsError> {
    let outcome = match bet {
        Some(bet) => engine.request_spin(bet),
        None => engine.spin(),
    };
    match outcome {
        Ok(result) => Ok(Some(result)),
        Err(e) if e.is_gameplay() => {
            log::warn!("{}", e);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn run_spins(mut engine: SpinEngine, count: u32, bet: Option<f64>, json: bool) -> Result<()> {
    for _ in 0..count {
        let Some(result) = spin_once(&mut engine, bet)? else {
            println!("Spin rejected at balance {:.2}", engine.balance());
            break;
        };

        if json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            print_result(&engine, &result);
        }
    }

    engine.shutdown();
    Ok(())
}

fn print_result(engine: &SpinEngine, result: &SpinResult) {
    println!(
        "{}{}",
        result.spin_id,
        if result.is_free_spin { " (free spin)" } else { "" }
    );
    println!("{}", result.final_board.render(engine.catalog()));

    let tier = result
        .win_tier
        .map(|t| format!(" {}", t.display_name()))
        .unwrap_or_default();
    println!(
        "bet {:.2} | {} lines, {} cascades | win {:.2} x{} = {:.2}{} | balance {:.2}",
        result.bet,
        result.line_matches.len(),
        result.cascade_count(),
        result.base_win,
        result.multiplier,
        result.total_win,
        tier,
        result.balance_after
    );
    if result.free_spins_awarded > 0 {
        println!(
            "BONUS: +{} free spins ({} remaining)",
            result.free_spins_awarded, result.free_spins_remaining
        );
    }
    println!();
}

fn simulate(mut engine: SpinEngine, spins: u64, bet: Option<f64>) -> Result<()> {
    for _ in 0..spins {
        if spin_once(&mut engine, bet)?.is_none() {
            println!("Stopped after {} spins", engine.stats().total_spins);
            break;
        }
    }

    let balance = engine.balance();
    print_stats(&engine.shutdown(), balance);
    Ok(())
}

fn print_stats(stats: &SessionStats, balance: f64) {
    println!("Spins:          {}", stats.total_spins);
    println!("Free spins:     {}", stats.free_spins_played);
    println!("Total bet:      {:.2}", stats.total_bet);
    println!("Total win:      {:.2}", stats.total_win);
    println!("RTP:            {:.2}%", stats.rtp());
    println!("Hit rate:       {:.2}%", stats.hit_rate());
    println!("Cascade steps:  {}", stats.cascade_steps);
    println!("Multipliers:    {}", stats.multiplier_triggers);
    println!("Bonus triggers: {}", stats.bonus_triggers);
    println!("Max win ratio:  {:.2}x", stats.max_win_ratio);
    println!("Final balance:  {:.2}", balance);
}

fn print_event(event: StageEvent) {
    match event.to_json_line() {
        Ok(line) => println!("{}", line),
        Err(e) => log::warn!("Failed to encode {}: {}", event.type_name(), e),
    }
}

/// Prints cues in place of playing clips
struct PrintPlayer;

impl CuePlayer for PrintPlayer {
    fn play(&mut self, cue: AudioCue) {
        println!("  ♪ {:?}", cue);
    }
}
