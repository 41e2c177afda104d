//! Bot arena: many seeded sessions played out in parallel, one seat per
//! strategy, with aggregated win and score statistics.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::engine::audio::TracingCueSink;
use crate::engine::bot_strategy::BotStrategy;
use crate::engine::clock::ManualClock;
use crate::engine::errors::GameError;
use crate::engine::models::{Millis, Page};
use crate::engine::rng::{RandomSource, SeededRandom};
use crate::engine::session::Command;
use crate::engine::settings::GameSettings;
use crate::engine::store::GameStore;

/// Upper bound on commands a bot may issue in one turn.
const MAX_TURN_STEPS: usize = 64;

/// One strategy's tally across an arena run.
#[derive(Debug, Clone, Default)]
pub struct StrategyRecord {
    /// Final `total_score` of every seat this strategy held.
    pub scores: Vec<u32>,
    /// Elapsed game time of each first-place temple clear.
    pub win_times: Vec<Millis>,
}

impl StrategyRecord {
    pub fn wins(&self) -> usize {
        self.win_times.len()
    }

    pub fn mean_score(&self) -> f64 {
        if self.scores.is_empty() {
            return 0.0;
        }
        self.scores.iter().map(|&s| f64::from(s)).sum::<f64>() / self.scores.len() as f64
    }

    pub fn fastest_win(&self) -> Option<Millis> {
        self.win_times.iter().copied().min()
    }

    pub fn median_win_time(&self) -> Option<Millis> {
        let mut times = self.win_times.clone();
        times.sort_unstable();
        let n = times.len();
        match n {
            0 => None,
            _ if n % 2 == 1 => Some(times[n / 2]),
            _ => Some((times[n / 2 - 1] + times[n / 2]) / 2),
        }
    }
}

/// Aggregated results from an arena run.
#[derive(Debug, Clone, Default)]
pub struct ArenaResult {
    pub num_games: usize,
    /// Games that ended with nobody clearing the temple.
    pub no_winner: usize,
    pub records: BTreeMap<String, StrategyRecord>,
    /// Wall-clock time spent simulating each game.
    pub wall_times: Vec<Duration>,
}

impl ArenaResult {
    pub fn win_rate(&self, name: &str) -> f64 {
        let wins = self.records.get(name).map_or(0, StrategyRecord::wins);
        wins as f64 / self.num_games.max(1) as f64
    }

    pub fn avg_score(&self, name: &str) -> f64 {
        self.records.get(name).map_or(0.0, StrategyRecord::mean_score)
    }
}

fn as_minutes(ms: Option<Millis>) -> String {
    ms.map(|ms| format!("{:.1}min", ms as f64 / 60_000.0))
        .unwrap_or_else(|| "-".into())
}

impl fmt::Display for ArenaResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} games, {} without a winner", self.num_games, self.no_winner)?;
        writeln!(
            f,
            "{:<12} {:>5} {:>7} {:>9} {:>9} {:>11}",
            "strategy", "wins", "rate", "fastest", "median", "mean score"
        )?;
        for (name, record) in &self.records {
            writeln!(
                f,
                "{:<12} {:>5} {:>6.1}% {:>9} {:>9} {:>11.1}",
                name,
                record.wins(),
                self.win_rate(name) * 100.0,
                as_minutes(record.fastest_win()),
                as_minutes(record.median_win_time()),
                record.mean_score(),
            )?;
        }
        if !self.wall_times.is_empty() {
            let total: Duration = self.wall_times.iter().sum();
            write!(
                f,
                "simulated in {:.2}s, {:.1}ms per game",
                total.as_secs_f64(),
                total.as_secs_f64() * 1000.0 / self.wall_times.len() as f64
            )?;
        }
        Ok(())
    }
}

/// Knobs for a batch of simulated sessions.
#[derive(Debug, Clone)]
pub struct ArenaConfig {
    pub settings: GameSettings,
    pub num_games: usize,
    pub base_seed: u64,
    /// Simulated game time each bot command takes.
    pub step_ms: Millis,
    /// Rotate turn order between games.
    pub alternate_seats: bool,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            settings: GameSettings::team_quest(),
            num_games: 100,
            base_seed: 42,
            step_ms: 2_000,
            alternate_seats: true,
        }
    }
}

/// Result of a single simulated session.
#[derive(Debug, Clone, PartialEq)]
pub struct GameOutcome {
    /// Strategy name and elapsed game time of the first temple winner.
    pub winner: Option<(String, Millis)>,
    pub scores: Vec<(String, u32)>,
}

/// Play `config.num_games` sessions between the named strategies in parallel.
pub fn run_arena(
    config: &ArenaConfig,
    strategies: &[(String, Box<dyn BotStrategy>)],
    progress_callback: Option<&(dyn Fn(usize, usize) + Sync)>,
) -> ArenaResult {
    let completed = AtomicUsize::new(0);
    let games: Vec<(Result<GameOutcome, GameError>, Duration)> = (0..config.num_games)
        .into_par_iter()
        .map(|game_idx| {
            let shift = if config.alternate_seats { game_idx } else { 0 };
            let seats: Vec<(&str, &dyn BotStrategy)> = (0..strategies.len())
                .map(|i| {
                    let (name, strategy) = &strategies[(i + shift) % strategies.len()];
                    (name.as_str(), strategy.as_ref())
                })
                .collect();

            let t0 = Instant::now();
            let outcome = play_one_game(
                &config.settings,
                &seats,
                config.base_seed + game_idx as u64,
                config.step_ms,
            );
            let wall = t0.elapsed();

            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(cb) = progress_callback {
                cb(done, config.num_games);
            }
            (outcome, wall)
        })
        .collect();

    let mut result = ArenaResult {
        num_games: config.num_games,
        records: strategies
            .iter()
            .map(|(n, _)| (n.clone(), StrategyRecord::default()))
            .collect(),
        ..ArenaResult::default()
    };

    for (game_idx, (outcome, wall)) in games.into_iter().enumerate() {
        result.wall_times.push(wall);
        let outcome = match outcome {
            Ok(o) => o,
            Err(e) => {
                tracing::warn!(game_idx, error = %e, "arena game aborted");
                result.no_winner += 1;
                continue;
            }
        };
        for (name, score) in &outcome.scores {
            result.records.entry(name.clone()).or_default().scores.push(*score);
        }
        match outcome.winner {
            Some((name, at)) => result.records.entry(name).or_default().win_times.push(at),
            None => result.no_winner += 1,
        }
    }
    result
}

/// Play one session on a manual clock. Each seat takes one visit per turn.
/// The session ends on expiry, on a temple win by everyone, or when a full
/// round passes with no accepted command.
pub fn play_one_game(
    settings: &GameSettings,
    seats: &[(&str, &dyn BotStrategy)],
    seed: u64,
    step_ms: Millis,
) -> Result<GameOutcome, GameError> {
    let clock = ManualClock::starting_at(0);
    let mut store = GameStore::new(
        settings.clone(),
        Box::new(SeededRandom::from_seed(seed)),
        Arc::new(clock.clone()),
        Box::new(TracingCueSink),
    );
    let mut bot_rng = SeededRandom::from_seed(seed.wrapping_mul(0x9E37_79B9_7F4A_7C15));

    store.dispatch(Command::OpenSetup)?;
    let mut seat_ids = Vec::with_capacity(seats.len());
    for (i, (name, _)) in seats.iter().enumerate() {
        store.dispatch(Command::Join {
            name: format!("{name}-{i}"),
            team: settings.team_colors[i % settings.team_colors.len()].clone(),
        })?;
        seat_ids.push(format!("p{}", i + 1));
    }
    store.dispatch(Command::StartGame)?;

    'game: loop {
        let mut progressed = false;
        for (pid, (_, strategy)) in seat_ids.iter().zip(seats) {
            if store.state().page == Page::Finished {
                break 'game;
            }
            if store.state().page != Page::Map
                || store.dispatch(Command::SelectPlayer { player_id: pid.clone() }).is_err()
            {
                continue;
            }
            progressed |= play_turn(&mut store, &clock, *strategy, pid, step_ms, &mut bot_rng)?;
            if matches!(store.state().page, Page::Zone(_) | Page::Temple) {
                store.dispatch(Command::ReturnToMap)?;
            }
        }
        if !progressed {
            break;
        }
    }

    if store.state().page == Page::Map {
        store.dispatch(Command::EndGame)?;
    }

    let state = store.state();
    let name_of = |pid: &str| -> String {
        seat_ids
            .iter()
            .position(|id| id == pid)
            .map(|i| seats[i].0.to_string())
            .unwrap_or_default()
    };
    Ok(GameOutcome {
        winner: state
            .game_winner
            .as_deref()
            .map(|pid| (name_of(pid), state.winner_time.unwrap_or_default())),
        scores: seat_ids
            .iter()
            .filter_map(|pid| state.player(pid).map(|p| (name_of(pid), p.total_score())))
            .collect(),
    })
}

/// Returns whether any command was accepted.
fn play_turn(
    store: &mut GameStore,
    clock: &ManualClock,
    strategy: &dyn BotStrategy,
    player_id: &str,
    step_ms: Millis,
    rng: &mut dyn RandomSource,
) -> Result<bool, GameError> {
    let mut accepted = false;
    let mut visited = false;
    for _ in 0..MAX_TURN_STEPS {
        let command = strategy.choose_command(store.state(), store.settings(), player_id, store.now(), rng);
        let Some(command) = command else {
            break;
        };
        let applied = store.dispatch(command).is_ok();
        clock.advance(step_ms);
        store.tick()?;
        if !applied {
            break;
        }
        accepted = true;
        match store.state().page {
            Page::Zone(_) | Page::Temple => visited = true,
            Page::Map if visited => break,
            Page::Finished => break,
            _ => {}
        }
    }
    Ok(accepted)
}
