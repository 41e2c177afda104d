//! Criterion benchmarks for card draws, reducer steps and valid-command
//! enumeration.
//!
//! Run with:
//!     cargo bench --bench card_draw

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use sea_turtle_quest::catalog;
use sea_turtle_quest::engine::cards::{draw_card, roll_rarity};
use sea_turtle_quest::engine::models::{Rarity, SessionState, ZoneId};
use sea_turtle_quest::engine::rng::SeededRandom;
use sea_turtle_quest::engine::session::{reduce, valid_commands, Command, Ctx};
use sea_turtle_quest::engine::settings::{GameSettings, RarityWeights};

fn bench_draws(c: &mut Criterion) {
    let weights = RarityWeights::default();
    let mut group = c.benchmark_group("cards");

    group.bench_function("roll_rarity", |b| {
        let mut rng = SeededRandom::from_seed(1);
        b.iter(|| roll_rarity(&mut rng, &weights, &Rarity::ORDER));
    });

    group.bench_function("draw_card", |b| {
        let mut rng = SeededRandom::from_seed(2);
        b.iter(|| draw_card(&mut rng, catalog::cards(), &weights).map(|c| c.rarity));
    });

    group.finish();
}

/// Session on the map with `n` players joined and the first one active.
fn lobby(settings: &GameSettings, n: usize) -> SessionState {
    let mut rng = SeededRandom::from_seed(3);
    let mut state = SessionState::new(settings);
    let mut commands = vec![Command::OpenSetup];
    commands.extend((0..n).map(|i| Command::Join {
        name: format!("bot-{i}"),
        team: settings.team_colors[i % settings.team_colors.len()].clone(),
    }));
    commands.push(Command::StartGame);
    commands.push(Command::SelectPlayer {
        player_id: "p1".into(),
    });
    for cmd in &commands {
        let mut ctx = Ctx {
            settings,
            rng: &mut rng,
            now: 0,
        };
        state = reduce(&state, cmd, &mut ctx).expect("lobby setup").state;
    }
    state
}

fn bench_session(c: &mut Criterion) {
    let settings = GameSettings::team_quest();
    let mut group = c.benchmark_group("session");

    for n in [1usize, 5, 15] {
        let state = lobby(&settings, n);

        group.bench_with_input(BenchmarkId::new("valid_commands", n), &state, |b, s| {
            b.iter(|| valid_commands(s, &settings, "p1", 1_000));
        });

        group.bench_with_input(BenchmarkId::new("enter_zone", n), &state, |b, s| {
            let mut rng = SeededRandom::from_seed(4);
            let cmd = Command::EnterZone { zone: ZoneId::Coral };
            b.iter(|| {
                let mut ctx = Ctx {
                    settings: &settings,
                    rng: &mut rng,
                    now: 1_000,
                };
                reduce(s, &cmd, &mut ctx).map(|t| t.events.len())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_draws, bench_session);
criterion_main!(benches);
