//! Arena CLI: run bot-vs-bot sessions from the command line.
//!
//! Usage:
//!   cargo run --release --bin arena -- --games 200 --bots sage,novice
//!   cargo run --release --bin arena -- --games 50 --preset classic --step-ms 5000

use std::path::PathBuf;

use clap::Parser;

use sea_turtle_quest::engine::arena::{run_arena, ArenaConfig};
use sea_turtle_quest::engine::bot_profiles::{load_default_profiles, load_profiles};
use sea_turtle_quest::engine::bot_strategy::BotStrategy;
use sea_turtle_quest::engine::settings::{load_default_settings, load_settings, GameSettings};

#[derive(Parser)]
#[command(name = "arena", about = "Run bot-vs-bot arena experiments for Sea Turtle Quest")]
struct Cli {
    /// Number of games to play
    #[arg(long, default_value = "100")]
    games: usize,

    /// Random seed
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Rotate turn order between games
    #[arg(long, default_value = "true")]
    alternate_seats: bool,

    /// Bot profiles, one seat each
    #[arg(long, value_delimiter = ',', default_value = "scholar,explorer")]
    bots: Vec<String>,

    /// Game milliseconds each bot command takes
    #[arg(long, default_value = "2000")]
    step_ms: u64,

    /// Path to bot_profiles.toml
    #[arg(long)]
    profiles: Option<PathBuf>,

    /// Path to a settings TOML file
    #[arg(long, env = "SEA_TURTLE_SETTINGS")]
    settings: Option<PathBuf>,

    /// Built-in preset when no settings file is given
    #[arg(long)]
    preset: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let profiles = match &cli.profiles {
        Some(path) => load_profiles(path).unwrap_or_else(|e| {
            eprintln!("Error loading profiles: {}", e);
            std::process::exit(1);
        }),
        None => load_default_profiles(),
    };

    let settings = match (&cli.settings, &cli.preset) {
        (Some(path), _) => load_settings(path).unwrap_or_else(|e| {
            eprintln!("Error loading settings: {}", e);
            std::process::exit(1);
        }),
        (None, Some(name)) => GameSettings::preset(name).unwrap_or_else(|| {
            eprintln!("Error: unknown preset '{}'", name);
            std::process::exit(1);
        }),
        (None, None) => load_default_settings(),
    };

    let mut strategies: Vec<(String, Box<dyn BotStrategy>)> = Vec::new();
    for name in &cli.bots {
        let profile = profiles.get(name).unwrap_or_else(|| {
            eprintln!("Error: profile '{}' not found", name);
            eprintln!("Available profiles: {:?}", profiles.profiles.keys().collect::<Vec<_>>());
            std::process::exit(1);
        });
        if strategies.iter().any(|(n, _)| n == name) {
            eprintln!("Error: profile '{}' listed twice", name);
            std::process::exit(1);
        }
        eprintln!(
            "  {}: type={}, accuracy={:.2}",
            name,
            profile.strategy_type,
            profile.effective_accuracy()
        );
        strategies.push((name.clone(), profile.build()));
    }

    eprintln!(
        "Arena: {} games, seed={}, alternate_seats={}, step={}ms",
        cli.games, cli.seed, cli.alternate_seats, cli.step_ms
    );
    eprintln!();

    let total = cli.games;
    let progress_cb = move |done: usize, _total: usize| {
        eprint!("\r  [{}/{}] games completed", done, total);
    };

    let config = ArenaConfig {
        settings,
        num_games: cli.games,
        base_seed: cli.seed,
        step_ms: cli.step_ms,
        alternate_seats: cli.alternate_seats,
    };
    let result = run_arena(&config, &strategies, Some(&progress_cb));

    eprintln!("\r                                    "); // clear progress line
    println!("{result}");
}
