//! Jackpot command-line front end
//!
//! Thin collaborator around `RoundEngine`: parses tickets, renders results
//! and never touches the economy directly.

use clap::{Parser, Subcommand};
use jackpot::{
    common::{config::generate_sample_config, ConfigLoader},
    config::{JackpotConfig, LogLevel},
    errors::JackpotResult,
    lottery::{DrawGenerator, Ticket},
    storage::open_store,
    JackpotError, RoundEngine, RoundError, RoundResult, DEFAULT_PLAYER,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

/// Jackpot Lottery CLI
#[derive(Parser)]
#[command(name = "jackpot")]
#[command(about = "Six-ball lottery simulation with a persistent jackpot economy")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Data directory for economy storage
    #[arg(short, long)]
    data_dir: Option<String>,

    /// Player whose economy to use
    #[arg(short, long, default_value = DEFAULT_PLAYER)]
    player: String,

    /// Seed the draw generator for reproducible rounds
    #[arg(long)]
    seed: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one round
    Play {
        /// Six distinct numbers, comma separated; quick pick when omitted
        #[arg(short, long, value_delimiter = ',')]
        numbers: Option<Vec<u8>>,

        /// Pay the surcharge to double any prize
        #[arg(long)]
        power_play: bool,
    },

    /// Suggest six numbers without playing
    QuickPick,

    /// Show balance, jackpot and statistics
    Status,

    /// Show recent rounds
    History {
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Start a new session with a fresh bankroll
    NewSession,

    /// Wipe all statistics and stored data
    Reset {
        /// Confirm the full reset
        #[arg(long)]
        yes: bool,
    },

    /// Play quick-pick rounds until the limit or a bust
    Simulate {
        #[arg(short, long, default_value = "100")]
        rounds: u64,

        #[arg(long)]
        power_play: bool,
    },

    /// Write a sample configuration file
    InitConfig {
        #[arg(short, long, default_value = "jackpot.toml")]
        path: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Config decides the default log level, so it loads before logging starts
    let loaded = load_config(&cli);
    let level = match &loaded {
        Ok(config) => config.monitoring.log_level,
        Err(_) => LogLevel::Info,
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_directive(level, cli.verbose).into()),
        )
        .with_target(false)
        .init();

    match loaded.and_then(|config| run(cli, config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.as_round_error() {
                Some(round_error) => println!("{}", advisory(round_error)),
                None => error!("{}", e),
            }
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> JackpotResult<JackpotConfig> {
    if let Commands::InitConfig { .. } = cli.command {
        return Ok(JackpotConfig::default());
    }

    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_path(path);
    }
    let mut config = loader.load()?;
    if let Some(data_dir) = &cli.data_dir {
        config.storage.data_directory = data_dir.clone();
    }
    Ok(config)
}

/// Default `EnvFilter` directive; `--verbose` wins over the configured level
fn log_directive(level: LogLevel, verbose: bool) -> String {
    let level = if verbose { LogLevel::Debug } else { level };
    format!("jackpot={}", level.as_filter())
}

fn run(cli: Cli, config: JackpotConfig) -> JackpotResult<()> {
    if let Commands::InitConfig { path } = &cli.command {
        generate_sample_config(path)?;
        info!("Wrote sample configuration to {}", path);
        return Ok(());
    }

    let mut engine = open_engine(config, &cli.player, cli.seed)?;

    match cli.command {
        Commands::Play { numbers, power_play } => {
            let numbers = match numbers {
                Some(numbers) => numbers,
                None => engine.quick_pick()?,
            };
            let ticket = Ticket::new(numbers, power_play, engine.config().game.max_number)?;
            let result = engine.play(&ticket)?;
            print_round(&result);
            print_status(&engine);
        }
        Commands::QuickPick => {
            let numbers = engine.quick_pick()?;
            let rendered: Vec<String> = numbers.iter().map(|n| n.to_string()).collect();
            println!("Quick pick: {}", rendered.join(","));
        }
        Commands::Status => print_status(&engine),
        Commands::History { limit } => {
            let recent = engine.history().recent(limit);
            if recent.is_empty() {
                println!("No rounds played yet");
            }
            for record in recent {
                println!(
                    "{}  {:?} vs {:?} + {}  matches {}{}  prize {}",
                    record.played_at.format("%Y-%m-%d %H:%M:%S"),
                    record.numbers,
                    record.winning_numbers,
                    record.bonus,
                    record.matches,
                    if record.bonus_match { " (+bonus)" } else { "" },
                    format_amount(record.final_prize),
                );
            }
        }
        Commands::NewSession => {
            let previous = engine.start_new_session()?;
            println!(
                "Previous session: {} games, {} wins, profit {}",
                previous.games_played,
                previous.wins,
                format_amount(previous.profit)
            );
            print_status(&engine);
        }
        Commands::Reset { yes } => {
            engine.reset_all(yes)?;
            println!("All statistics reset");
            print_status(&engine);
        }
        Commands::Simulate { rounds, power_play } => simulate(&mut engine, rounds, power_play)?,
        Commands::InitConfig { .. } => {}
    }

    Ok(())
}

fn open_engine(
    config: JackpotConfig,
    player: &str,
    seed: Option<u64>,
) -> JackpotResult<RoundEngine> {
    match seed {
        Some(seed) => {
            let store = open_store(&config.storage)?;
            let draws = Box::new(DrawGenerator::seeded(seed, &config.game));
            RoundEngine::open(config, player, store, draws)
        }
        None => RoundEngine::from_config(config, player),
    }
}

fn simulate(engine: &mut RoundEngine, rounds: u64, power_play: bool) -> JackpotResult<()> {
    let mut played = 0;
    let mut won = 0;
    let mut best = 0;

    while played < rounds {
        let numbers = engine.quick_pick()?;
        let ticket = Ticket::new(numbers, power_play, engine.config().game.max_number)?;
        let result = match engine.play(&ticket) {
            Ok(result) => result,
            Err(JackpotError::Round(RoundError::InsufficientFunds { .. }))
            | Err(JackpotError::Round(RoundError::SessionBusted)) => break,
            Err(e) => return Err(e),
        };

        played += 1;
        if result.is_win() {
            won += 1;
            best = best.max(result.final_prize);
            info!("Round {}: {}", played, result.tier);
        }
        if result.bust {
            break;
        }
    }

    println!(
        "Simulated {} rounds: {} wins, best prize {}",
        played,
        won,
        format_amount(best)
    );
    print_status(engine);
    Ok(())
}

fn print_round(result: &RoundResult) {
    println!("Your numbers:    {}", result.ticket);
    println!("Winning numbers: {}", result.draw);
    println!("Matches: {}{}", result.matches, if result.bonus_match { " + bonus" } else { "" });
    println!("{}", result.tier);
    if result.is_win() {
        if result.ticket.power_play {
            println!(
                "Prize: {} (power play x2 of {})",
                format_amount(result.final_prize),
                format_amount(result.prize_before_multiplier)
            );
        } else {
            println!("Prize: {}", format_amount(result.final_prize));
        }
    }
    if !result.persisted {
        println!("Warning: this round could not be saved");
    }
    if result.bust {
        println!("You are bust! Run `jackpot new-session` to play again.");
    }
}

fn print_status(engine: &RoundEngine) {
    let state = engine.state();
    let session = engine.session_summary();
    println!("Player:       {}", engine.player_id());
    println!("Balance:      {}", format_amount(state.display_balance()));
    println!("Jackpot:      {}", format_amount(state.jackpot));
    println!(
        "Ticket:       {} ({} with power play)",
        format_amount(engine.ticket_cost(false)),
        format_amount(engine.ticket_cost(true))
    );
    println!(
        "Session:      {} games, {} wins, profit {}",
        session.games_played,
        session.wins,
        format_amount(session.profit)
    );
    println!(
        "Lifetime:     {} games, {} wins ({:.1}%), biggest win {}",
        state.games_played,
        state.total_wins,
        state.win_rate() * 100.0,
        format_amount(state.biggest_win)
    );
    println!("Win streak:   {}  Last win: {}", state.win_streak, format_amount(state.last_win));
}

fn advisory(error: &RoundError) -> String {
    match error {
        RoundError::SessionBusted => {
            "You are bust. Run `jackpot new-session` to start over.".to_string()
        }
        RoundError::InsufficientFunds { balance, cost } => format!(
            "Not enough funds: balance {}, ticket costs {}. \
             Run `jackpot new-session` for a fresh bankroll.",
            format_amount(*balance),
            format_amount(*cost)
        ),
        RoundError::ResetNotConfirmed => {
            "Resetting wipes every statistic; rerun with --yes to confirm.".to_string()
        }
        other => other.to_string(),
    }
}

/// Render an amount with thousands separators
fn format_amount(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if amount < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}
