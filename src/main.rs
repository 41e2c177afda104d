//! Autoplay a single session with bots, driving the game clock from a tokio
//! interval. Prints the final leaderboard as JSON.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use sea_turtle_quest::engine::audio::TracingCueSink;
use sea_turtle_quest::engine::bot_profiles::{load_default_profiles, load_profiles};
use sea_turtle_quest::engine::bot_strategy::BotStrategy;
use sea_turtle_quest::engine::clock::ManualClock;
use sea_turtle_quest::engine::models::Page;
use sea_turtle_quest::engine::ranking::leaderboard;
use sea_turtle_quest::engine::rng::SeededRandom;
use sea_turtle_quest::engine::session::Command;
use sea_turtle_quest::engine::settings::{load_default_settings, load_settings, GameSettings, SettingsError};
use sea_turtle_quest::engine::store::GameStore;

#[derive(Parser)]
#[command(name = "sea-turtle-quest", about = "Autoplay a Sea Turtle Quest session with bots")]
struct Cli {
    /// Bot profile per seat (from bot_profiles.toml)
    #[arg(long, value_delimiter = ',', default_value = "scholar,explorer,novice")]
    bots: Vec<String>,

    /// Random seed (default: entropy)
    #[arg(long, env = "SEA_TURTLE_SEED")]
    seed: Option<u64>,

    /// Path to a settings TOML file (default: auto-discover)
    #[arg(long, env = "SEA_TURTLE_SETTINGS")]
    settings: Option<PathBuf>,

    /// Built-in preset, used when no settings file is given: "team_quest" or "classic"
    #[arg(long)]
    preset: Option<String>,

    /// Path to bot_profiles.toml (default: auto-discover)
    #[arg(long, env = "SEA_TURTLE_BOT_PROFILES")]
    profiles: Option<PathBuf>,

    /// Real milliseconds between ticks
    #[arg(long, default_value = "50")]
    tick_ms: u64,

    /// Game milliseconds that pass per tick
    #[arg(long, default_value = "2000")]
    time_scale: u64,
}

fn resolve_settings(cli: &Cli) -> Result<GameSettings, SettingsError> {
    match (&cli.settings, &cli.preset) {
        (Some(path), _) => load_settings(path),
        (None, Some(name)) => GameSettings::preset(name).ok_or_else(|| SettingsError::UnknownPreset(name.clone())),
        (None, None) => Ok(load_default_settings()),
    }
}

/// Round-robin turn bookkeeping: one zone or temple visit per turn.
struct Turns {
    seats: Vec<(String, Box<dyn BotStrategy>)>,
    current: usize,
    visited: bool,
    idle: usize,
}

impl Turns {
    fn pass(&mut self, store: &mut GameStore) {
        if matches!(store.state().page, Page::Zone(_) | Page::Temple) {
            if let Err(e) = store.dispatch(Command::ReturnToMap) {
                tracing::debug!(error = %e, "return to map rejected");
            }
        }
        self.current = (self.current + 1) % self.seats.len();
        self.visited = false;
    }

    /// Issue at most one command for the seat whose turn it is.
    fn step(&mut self, store: &mut GameStore, rng: &mut SeededRandom) {
        let pid = format!("p{}", self.current + 1);
        let page = store.state().page;
        if page == Page::Map && store.state().active_player.as_deref() != Some(pid.as_str()) {
            if store.dispatch(Command::SelectPlayer { player_id: pid }).is_err() {
                self.pass(store);
            }
            return;
        }

        let strategy = &self.seats[self.current].1;
        let command = strategy.choose_command(store.state(), store.settings(), &pid, store.now(), rng);
        let Some(command) = command else {
            self.idle += 1;
            self.pass(store);
            return;
        };
        match store.dispatch(command) {
            Ok(_) => {
                self.idle = 0;
                match store.state().page {
                    Page::Zone(_) | Page::Temple => self.visited = true,
                    Page::Map if self.visited => self.pass(store),
                    _ => {}
                }
            }
            Err(e) => {
                tracing::debug!(player = %pid, error = %e, "bot command rejected");
                self.idle += 1;
                self.pass(store);
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();
    let settings = resolve_settings(&cli)?;
    let profiles = match &cli.profiles {
        Some(path) => load_profiles(path)?,
        None => load_default_profiles(),
    };

    let mut seats = Vec::with_capacity(cli.bots.len());
    for name in &cli.bots {
        let profile = profiles
            .get(name)
            .ok_or_else(|| format!("profile '{}' not found", name))?;
        seats.push((name.clone(), profile.build()));
    }
    if seats.is_empty() {
        return Err("at least one bot is required".into());
    }

    let rng = match cli.seed {
        Some(seed) => SeededRandom::from_seed(seed),
        None => SeededRandom::from_entropy(),
    };
    let mut bot_rng = match cli.seed {
        Some(seed) => SeededRandom::from_seed(seed.wrapping_add(1)),
        None => SeededRandom::from_entropy(),
    };
    let clock = ManualClock::starting_at(0);
    let mut store = GameStore::new(
        settings.clone(),
        Box::new(rng),
        Arc::new(clock.clone()),
        Box::new(TracingCueSink),
    );

    store.dispatch(Command::OpenSetup)?;
    for (i, (name, _)) in seats.iter().enumerate() {
        store.dispatch(Command::Join {
            name: format!("{name}-{}", i + 1),
            team: settings.team_colors[i % settings.team_colors.len()].clone(),
        })?;
    }
    store.dispatch(Command::StartGame)?;
    tracing::info!(
        seats = seats.len(),
        limit_min = settings.time_limit_minutes,
        "autoplay started"
    );

    let mut turns = Turns {
        seats,
        current: 0,
        visited: false,
        idle: 0,
    };
    let mut interval = tokio::time::interval(Duration::from_millis(cli.tick_ms));
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = &mut ctrl_c => {
                tracing::info!("interrupted, ending game");
                if let Err(e) = store.dispatch(Command::EndGame) {
                    tracing::debug!(error = %e, "end game rejected");
                }
                break;
            }
        }
        clock.advance(cli.time_scale);
        store.tick()?;
        if store.state().page == Page::Finished {
            break;
        }
        turns.step(&mut store, &mut bot_rng);
        if turns.idle >= turns.seats.len() && store.state().page == Page::Map {
            tracing::info!("no bot can act, ending game");
            store.dispatch(Command::EndGame)?;
            break;
        }
    }

    let board = leaderboard(store.state(), Some(settings.leaderboard_size));
    println!("{}", serde_json::to_string_pretty(&board)?);
    Ok(())
}
