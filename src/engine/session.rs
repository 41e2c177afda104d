//! Session reducer: validates a command against the current state and returns
//! the next state plus the events it produced. The input state is never
//! touched, so a rejected command leaves the session exactly as it was.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::catalog;
use crate::engine::cards::{apply_card, draw_card};
use crate::engine::clock::ClockSignal;
use crate::engine::economy::{answer_reward, apply_reward, consume_chance, restore_chances};
use crate::engine::errors::GameError;
use crate::engine::models::*;
use crate::engine::progress::{mark_zone_complete, next_question, record_answer, temple_eligible};
use crate::engine::rng::RandomSource;
use crate::engine::settings::{GameSettings, TempleMode};

/// Navigation intents and game actions. The periodic `Tick` and the scheduled
/// `AutoReturn` come from the store, everything else from a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Command {
    OpenSetup,
    Join { name: String, team: String },
    StartGame,
    SelectPlayer { player_id: PlayerId },
    ClearActivePlayer,
    EnterZone { zone: ZoneId },
    AnswerQuestion { choice: usize },
    NextQuestion,
    DrawCard,
    ReturnToMap,
    AutoReturn { epoch: u64 },
    EnterTemple,
    SubmitTempleAnswer { choice: usize },
    Pause,
    Resume,
    RestoreChances { player_id: PlayerId, amount: Option<u32> },
    Tick,
    EndGame,
    Reset,
}

/// Inputs a reducer step may consult besides the state itself.
pub struct Ctx<'a> {
    pub settings: &'a GameSettings,
    pub rng: &'a mut dyn RandomSource,
    pub now: Millis,
}

#[derive(Debug, Clone)]
pub struct Transition {
    pub state: SessionState,
    pub events: Vec<GameEvent>,
}

pub fn reduce(state: &SessionState, command: &Command, ctx: &mut Ctx<'_>) -> Result<Transition, GameError> {
    let mut next = state.clone();
    let mut events = Vec::new();

    match command {
        Command::OpenSetup => {
            require_page(&next, |p| p == Page::Home)?;
            navigate(&mut next, Page::Setup, &mut events);
        }
        Command::Join { name, team } => join(&mut next, ctx, name, team, &mut events)?,
        Command::StartGame => {
            require_page(&next, |p| p == Page::Setup)?;
            if next.players.is_empty() {
                return Err(GameError::NoPlayers);
            }
            next.clock.start(ctx.now);
            events.push(GameEvent::GameStarted { at: ctx.now });
            navigate(&mut next, Page::Map, &mut events);
        }
        Command::SelectPlayer { player_id } => {
            require_page(&next, |p| p == Page::Map)?;
            if !next.players.contains_key(player_id) {
                return Err(GameError::PlayerNotFound(player_id.clone()));
            }
            next.active_player = Some(player_id.clone());
            events.push(GameEvent::ActivePlayerChanged {
                player_id: Some(player_id.clone()),
            });
        }
        Command::ClearActivePlayer => {
            require_page(&next, |p| p == Page::Map)?;
            next.active_player = None;
            events.push(GameEvent::ActivePlayerChanged { player_id: None });
        }
        Command::EnterZone { zone } => enter_zone(&mut next, ctx, *zone, &mut events)?,
        Command::AnswerQuestion { choice } => answer_question(&mut next, ctx, *choice, &mut events)?,
        Command::NextQuestion => another_question(&mut next, ctx, &mut events)?,
        Command::DrawCard => draw(&mut next, ctx, &mut events)?,
        Command::ReturnToMap => {
            require_page(&next, |p| matches!(p, Page::Zone(_) | Page::Temple))?;
            leave_to_map(&mut next, &mut events);
        }
        Command::AutoReturn { epoch } => {
            // Stale timers are dropped silently.
            if *epoch == next.nav_epoch && matches!(next.page, Page::Zone(_) | Page::Temple) {
                leave_to_map(&mut next, &mut events);
            }
        }
        Command::EnterTemple => enter_temple(&mut next, ctx, &mut events)?,
        Command::SubmitTempleAnswer { choice } => submit_temple_answer(&mut next, ctx, *choice, &mut events)?,
        Command::Pause => {
            if !ctx.settings.allow_pause {
                return Err(GameError::PauseDisabled);
            }
            if !next.clock.is_started() {
                return Err(GameError::GameNotStarted);
            }
            require_page(&next, |p| p != Page::Finished)?;
            if next.clock.is_expired(ctx.now) {
                return Err(GameError::TimeExpired);
            }
            if !next.clock.pause(ctx.now) {
                return Err(GameError::AlreadyPaused);
            }
            events.push(GameEvent::Paused);
        }
        Command::Resume => {
            let paused_ms = next.clock.resume(ctx.now).ok_or(GameError::NotPaused)?;
            events.push(GameEvent::Resumed { paused_ms });
        }
        Command::RestoreChances { player_id, amount } => {
            let max = ctx.settings.max_action_chances;
            let player = player_mut(&mut next, player_id)?;
            let chances = restore_chances(player, *amount, max);
            player.commit(&ctx.settings.scoring, ctx.now);
            events.push(GameEvent::ChancesRestored {
                player_id: player_id.clone(),
                chances,
            });
        }
        Command::Tick => tick(&mut next, ctx.now, &mut events),
        Command::EndGame => {
            require_page(&next, |p| matches!(p, Page::Map | Page::Zone(_) | Page::Temple))?;
            next.visit = None;
            next.temple = None;
            events.push(GameEvent::GameEnded);
            navigate(&mut next, Page::Finished, &mut events);
        }
        Command::Reset => {
            let epoch = next.nav_epoch + 1;
            next = SessionState::new(ctx.settings);
            next.nav_epoch = epoch;
            events.push(GameEvent::SessionReset);
            events.push(GameEvent::PageChanged { page: Page::Home });
        }
    }

    Ok(Transition { state: next, events })
}

// ------------------------------------------------------------------ //
//  Eligibility predicates
// ------------------------------------------------------------------ //

/// Clock running: started, not expired, not paused.
pub fn ensure_running(state: &SessionState, now: Millis) -> Result<(), GameError> {
    if !state.clock.is_started() {
        return Err(GameError::GameNotStarted);
    }
    if state.clock.is_expired(now) {
        return Err(GameError::TimeExpired);
    }
    if state.clock.is_paused() {
        return Err(GameError::GamePaused);
    }
    Ok(())
}

pub fn check_zone_entry(state: &SessionState, player_id: &str, now: Millis) -> Result<(), GameError> {
    ensure_running(state, now)?;
    require_page(state, |p| p == Page::Map)?;
    let player = player_ref(state, player_id)?;
    if player.is_winner {
        return Err(GameError::AlreadyWon(player.id.clone()));
    }
    if player.action_chances == 0 {
        return Err(GameError::NoActionChances(player.id.clone()));
    }
    Ok(())
}

pub fn check_temple_entry(
    state: &SessionState,
    settings: &GameSettings,
    player_id: &str,
    now: Millis,
) -> Result<(), GameError> {
    ensure_running(state, now)?;
    require_page(state, |p| p == Page::Map)?;
    let player = player_ref(state, player_id)?;
    if player.is_winner {
        return Err(GameError::AlreadyWon(player.id.clone()));
    }
    if !temple_eligible(player, settings) {
        return Err(GameError::TempleLocked(player.id.clone()));
    }
    Ok(())
}

/// Question awaiting an answer in the current zone visit.
pub fn current_question(state: &SessionState) -> Option<&'static Question> {
    let visit = state.visit.as_ref()?;
    if visit.outcome.is_some() {
        return None;
    }
    catalog::questions(visit.zone).get(visit.question?)
}

/// Puzzle awaiting an answer in the current temple run.
pub fn current_puzzle(state: &SessionState) -> Option<&'static Question> {
    let run = state.temple.as_ref()?;
    if run.outcome.is_some() {
        return None;
    }
    catalog::temple_puzzles().get(run.puzzle)
}

/// Every command `player_id` could issue right now that would be accepted.
pub fn valid_commands(state: &SessionState, settings: &GameSettings, player_id: &str, now: Millis) -> Vec<Command> {
    let Some(player) = state.player(player_id) else {
        return vec![];
    };
    let running = ensure_running(state, now).is_ok();
    let mut commands = Vec::new();

    match state.page {
        Page::Map => {
            if state.active_player.as_deref() != Some(player_id) {
                commands.push(Command::SelectPlayer {
                    player_id: player_id.to_string(),
                });
                return commands;
            }
            if check_zone_entry(state, player_id, now).is_ok() {
                commands.extend(ZoneId::ALL.iter().map(|zone| Command::EnterZone { zone: *zone }));
            }
            if check_temple_entry(state, settings, player_id, now).is_ok() {
                commands.push(Command::EnterTemple);
            }
        }
        Page::Zone(zone) => {
            let Some(visit) = state.visit.as_ref().filter(|v| v.player_id == player_id) else {
                return commands;
            };
            let can_act = running && player.action_chances > 0;
            match (&visit.outcome, zone.is_question_zone()) {
                (None, true) => {
                    if let (true, Some(q)) = (can_act, current_question(state)) {
                        commands.extend((0..q.options.len()).map(|choice| Command::AnswerQuestion { choice }));
                    }
                }
                (None, false) => {
                    if can_act {
                        commands.push(Command::DrawCard);
                    }
                }
                (Some(_), true) => {
                    if can_act && !settings.single_question_visits {
                        commands.push(Command::NextQuestion);
                    }
                }
                (Some(_), false) => {}
            }
            commands.push(Command::ReturnToMap);
        }
        Page::Temple => {
            let Some(run) = state.temple.as_ref().filter(|r| r.player_id == player_id) else {
                return commands;
            };
            if running && run.outcome.is_none() {
                if let Some(puzzle) = current_puzzle(state) {
                    commands.extend(
                        (0..puzzle.options.len()).map(|choice| Command::SubmitTempleAnswer { choice }),
                    );
                }
            }
            commands.push(Command::ReturnToMap);
        }
        Page::Home | Page::Setup | Page::Finished => {}
    }
    commands
}

// ------------------------------------------------------------------ //
//  Helpers
// ------------------------------------------------------------------ //

fn require_page(state: &SessionState, allowed: impl Fn(Page) -> bool) -> Result<(), GameError> {
    if allowed(state.page) {
        Ok(())
    } else {
        Err(GameError::InvalidPage(state.page))
    }
}

fn navigate(state: &mut SessionState, page: Page, events: &mut Vec<GameEvent>) {
    state.page = page;
    state.nav_epoch += 1;
    events.push(GameEvent::PageChanged { page });
}

fn leave_to_map(state: &mut SessionState, events: &mut Vec<GameEvent>) {
    state.visit = None;
    state.temple = None;
    navigate(state, Page::Map, events);
}

fn schedule_return(state: &SessionState, settings: &GameSettings, events: &mut Vec<GameEvent>) {
    events.push(GameEvent::ReturnScheduled {
        epoch: state.nav_epoch,
        delay_ms: settings.auto_return_delay_ms,
    });
}

fn player_ref<'s>(state: &'s SessionState, player_id: &str) -> Result<&'s Player, GameError> {
    state
        .players
        .get(player_id)
        .ok_or_else(|| GameError::PlayerNotFound(player_id.to_string()))
}

fn player_mut<'s>(state: &'s mut SessionState, player_id: &str) -> Result<&'s mut Player, GameError> {
    state
        .players
        .get_mut(player_id)
        .ok_or_else(|| GameError::PlayerNotFound(player_id.to_string()))
}

fn active_id(state: &SessionState) -> Result<PlayerId, GameError> {
    let pid = state.active_player.clone().ok_or(GameError::NoActivePlayer)?;
    player_ref(state, &pid)?;
    Ok(pid)
}

fn current_zone(state: &SessionState) -> Result<ZoneId, GameError> {
    match state.page {
        Page::Zone(zone) => Ok(zone),
        page => Err(GameError::InvalidPage(page)),
    }
}

// ------------------------------------------------------------------ //
//  Lobby
// ------------------------------------------------------------------ //

fn join(
    state: &mut SessionState,
    ctx: &mut Ctx<'_>,
    name: &str,
    team: &str,
    events: &mut Vec<GameEvent>,
) -> Result<(), GameError> {
    require_page(state, |p| matches!(p, Page::Setup | Page::Map))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(GameError::EmptyName);
    }
    if state.players.values().any(|p| p.name.eq_ignore_ascii_case(name)) {
        return Err(GameError::DuplicatePlayerName(name.to_string()));
    }
    if !ctx.settings.team_colors.iter().any(|c| c == team) {
        return Err(GameError::UnknownTeam(team.to_string()));
    }
    let max = ctx.settings.max_players_per_team;
    let members = state.players.values().filter(|p| p.team == team).count();
    if members >= max as usize {
        return Err(GameError::TeamFull {
            team: team.to_string(),
            max,
        });
    }

    let id = format!("p{}", state.next_player_seq);
    state.next_player_seq += 1;
    let player = Player::new(id.clone(), name.to_string(), team.to_string(), ctx.settings, ctx.now);
    state.players.insert(id.clone(), player);
    events.push(GameEvent::PlayerJoined {
        player_id: id,
        team: team.to_string(),
    });
    Ok(())
}

// ------------------------------------------------------------------ //
//  Zones
// ------------------------------------------------------------------ //

fn enter_zone(
    state: &mut SessionState,
    ctx: &mut Ctx<'_>,
    zone: ZoneId,
    events: &mut Vec<GameEvent>,
) -> Result<(), GameError> {
    let pid = active_id(state)?;
    check_zone_entry(state, &pid, ctx.now)?;

    navigate(state, Page::Zone(zone), events);
    state.visit = Some(ZoneVisit {
        player_id: pid.clone(),
        zone,
        question: None,
        outcome: None,
        questions_asked: 0,
    });
    if zone.is_question_zone() {
        present_question(state, ctx, &pid, zone, events)?;
    }
    Ok(())
}

fn present_question(
    state: &mut SessionState,
    ctx: &mut Ctx<'_>,
    player_id: &str,
    zone: ZoneId,
    events: &mut Vec<GameEvent>,
) -> Result<(), GameError> {
    let pool = catalog::questions(zone);
    let player = player_mut(state, player_id)?;
    let index = next_question(player, zone, pool.len(), ctx.rng).ok_or(GameError::EmptyCatalog)?;
    player.commit(&ctx.settings.scoring, ctx.now);

    if let Some(visit) = state.visit.as_mut() {
        visit.question = Some(index);
        visit.outcome = None;
        visit.questions_asked += 1;
    }
    events.push(GameEvent::QuestionPresented {
        player_id: player_id.to_string(),
        zone,
        index,
    });
    Ok(())
}

fn answer_question(
    state: &mut SessionState,
    ctx: &mut Ctx<'_>,
    choice: usize,
    events: &mut Vec<GameEvent>,
) -> Result<(), GameError> {
    let zone = current_zone(state)?;
    ensure_running(state, ctx.now)?;
    let visit = state.visit.as_ref().ok_or(GameError::NoQuestionPresented)?;
    let index = visit.question.ok_or(GameError::NoQuestionPresented)?;
    if visit.outcome.is_some() {
        return Err(GameError::AlreadyAnswered);
    }
    let pid = visit.player_id.clone();
    let question = catalog::questions(zone)
        .get(index)
        .ok_or(GameError::EmptyCatalog)?;
    if choice >= question.options.len() {
        return Err(GameError::InvalidChoice(choice));
    }

    let settings = ctx.settings;
    let player = player_mut(state, &pid)?;
    consume_chance(player)?;
    let correct = question.is_correct(choice);
    let reward = if correct {
        answer_reward(zone, question.difficulty, settings, ctx.rng)
    } else {
        RewardDelta::default()
    };
    apply_reward(player, &reward);
    let completed = record_answer(player, zone, correct, settings.zone_completion_threshold);
    player.commit(&settings.scoring, ctx.now);

    events.push(GameEvent::QuestionAnswered {
        player_id: pid.clone(),
        zone,
        correct,
        reward,
    });
    if completed {
        events.push(GameEvent::ZoneCompleted { player_id: pid, zone });
    }
    if let Some(visit) = state.visit.as_mut() {
        visit.outcome = Some(VisitOutcome::Answered {
            choice,
            correct,
            reward,
        });
    }
    schedule_return(state, settings, events);
    Ok(())
}

fn another_question(state: &mut SessionState, ctx: &mut Ctx<'_>, events: &mut Vec<GameEvent>) -> Result<(), GameError> {
    let zone = current_zone(state)?;
    if !zone.is_question_zone() {
        return Err(GameError::WrongZoneKind(zone));
    }
    if ctx.settings.single_question_visits {
        return Err(GameError::VisitOver);
    }
    ensure_running(state, ctx.now)?;
    let visit = state.visit.as_ref().ok_or(GameError::NoQuestionPresented)?;
    if visit.outcome.is_none() {
        return Err(GameError::AnswerPending);
    }
    let pid = visit.player_id.clone();
    let player = player_ref(state, &pid)?;
    if player.action_chances == 0 {
        return Err(GameError::NoActionChances(pid));
    }

    // Same page, new screen: invalidates the pending auto-return.
    state.nav_epoch += 1;
    present_question(state, ctx, &pid, zone, events)
}

fn draw(state: &mut SessionState, ctx: &mut Ctx<'_>, events: &mut Vec<GameEvent>) -> Result<(), GameError> {
    let zone = current_zone(state)?;
    if zone.is_question_zone() {
        return Err(GameError::WrongZoneKind(zone));
    }
    ensure_running(state, ctx.now)?;
    let visit = state.visit.as_ref().ok_or(GameError::InvalidPage(state.page))?;
    if visit.outcome.is_some() {
        return Err(GameError::AlreadyDrawn);
    }
    let pid = visit.player_id.clone();

    let settings = ctx.settings;
    let player = player_mut(state, &pid)?;
    consume_chance(player)?;
    let template = draw_card(ctx.rng, catalog::cards(), &settings.rarity_weights)?;
    let card = apply_card(player, template, settings.scoring.card_bonus, ctx.now);
    let completed = mark_zone_complete(player, zone);
    player.commit(&settings.scoring, ctx.now);

    events.push(GameEvent::CardDrawn {
        player_id: pid.clone(),
        card: card.clone(),
    });
    if completed {
        events.push(GameEvent::ZoneCompleted { player_id: pid, zone });
    }
    if let Some(visit) = state.visit.as_mut() {
        visit.outcome = Some(VisitOutcome::Drew { card });
    }
    schedule_return(state, settings, events);
    Ok(())
}

// ------------------------------------------------------------------ //
//  Temple
// ------------------------------------------------------------------ //

fn pick_puzzle(asked: &BTreeSet<usize>, rng: &mut dyn RandomSource) -> Result<usize, GameError> {
    let pool_len = catalog::temple_puzzles().len();
    if pool_len == 0 {
        return Err(GameError::EmptyCatalog);
    }
    let mut candidates: Vec<usize> = (0..pool_len).filter(|i| !asked.contains(i)).collect();
    if candidates.is_empty() {
        candidates = (0..pool_len).collect();
    }
    Ok(candidates[rng.below(candidates.len())])
}

fn enter_temple(state: &mut SessionState, ctx: &mut Ctx<'_>, events: &mut Vec<GameEvent>) -> Result<(), GameError> {
    let pid = active_id(state)?;
    check_temple_entry(state, ctx.settings, &pid, ctx.now)?;
    let puzzle = pick_puzzle(&BTreeSet::new(), ctx.rng)?;

    navigate(state, Page::Temple, events);
    state.temple = Some(TempleRun {
        player_id: pid.clone(),
        puzzle,
        streak: 0,
        asked: BTreeSet::new(),
        outcome: None,
    });
    events.push(GameEvent::TempleEntered { player_id: pid });
    Ok(())
}

fn submit_temple_answer(
    state: &mut SessionState,
    ctx: &mut Ctx<'_>,
    choice: usize,
    events: &mut Vec<GameEvent>,
) -> Result<(), GameError> {
    require_page(state, |p| p == Page::Temple)?;
    ensure_running(state, ctx.now)?;
    let run = state.temple.as_ref().ok_or(GameError::InvalidPage(state.page))?;
    if run.outcome.is_some() {
        return Err(GameError::VisitOver);
    }
    let puzzle = catalog::temple_puzzles()
        .get(run.puzzle)
        .ok_or(GameError::EmptyCatalog)?;
    if choice >= puzzle.options.len() {
        return Err(GameError::InvalidChoice(choice));
    }
    let correct = puzzle.is_correct(choice);
    let pid = run.player_id.clone();
    let current = run.puzzle;
    let previous_streak = run.streak;
    let mut asked = run.asked.clone();

    player_mut(state, &pid)?.commit(&ctx.settings.scoring, ctx.now);

    match ctx.settings.temple_mode {
        TempleMode::Gauntlet { required_streak } => {
            asked.insert(current);
            let streak = if correct { previous_streak + 1 } else { 0 };
            if correct && streak >= required_streak {
                if let Some(run) = state.temple.as_mut() {
                    run.streak = streak;
                    run.asked = asked;
                }
                return crown(state, ctx, &pid, events);
            }
            if !correct {
                // Restart from zero, avoiding only the puzzle just missed.
                asked = BTreeSet::from([current]);
                events.push(GameEvent::TempleFailed { player_id: pid.clone() });
            } else {
                events.push(GameEvent::TempleProgress {
                    player_id: pid.clone(),
                    streak,
                });
            }
            let puzzle = pick_puzzle(&asked, ctx.rng)?;
            if let Some(run) = state.temple.as_mut() {
                run.streak = streak;
                run.asked = asked;
                run.puzzle = puzzle;
            }
            Ok(())
        }
        TempleMode::SingleShot => {
            if correct {
                return crown(state, ctx, &pid, events);
            }
            if let Some(run) = state.temple.as_mut() {
                run.outcome = Some(TempleOutcome::Failed);
            }
            events.push(GameEvent::TempleFailed { player_id: pid });
            schedule_return(state, ctx.settings, events);
            Ok(())
        }
    }
}

/// Mark `player_id` as a winner. Only the first winner becomes the game winner.
fn crown(state: &mut SessionState, ctx: &mut Ctx<'_>, player_id: &str, events: &mut Vec<GameEvent>) -> Result<(), GameError> {
    let elapsed = state.clock.elapsed(ctx.now);
    let player = player_mut(state, player_id)?;
    player.is_winner = true;
    player.win_time = Some(elapsed);
    player.commit(&ctx.settings.scoring, ctx.now);

    let first = state.game_winner.is_none();
    if first {
        state.game_winner = Some(player_id.to_string());
        state.winner_time = Some(elapsed);
    }
    if let Some(run) = state.temple.as_mut() {
        run.outcome = Some(TempleOutcome::Won);
    }
    events.push(GameEvent::PlayerWon {
        player_id: player_id.to_string(),
        elapsed_ms: elapsed,
        first,
    });
    schedule_return(state, ctx.settings, events);
    Ok(())
}

// ------------------------------------------------------------------ //
//  Clock
// ------------------------------------------------------------------ //

fn tick(state: &mut SessionState, now: Millis, events: &mut Vec<GameEvent>) {
    if state.page == Page::Finished {
        return;
    }
    for signal in state.clock.poll(now) {
        match signal {
            ClockSignal::Warning { remaining_ms } => events.push(GameEvent::TimeWarning { remaining_ms }),
            ClockSignal::Expired => {
                events.push(GameEvent::TimeUp);
                state.visit = None;
                state.temple = None;
                navigate(state, Page::Finished, events);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::rng::{ScriptedRandom, SeededRandom};
    use proptest::prelude::*;

    const MINUTE: Millis = 60_000;

    struct Harness {
        settings: GameSettings,
        rng: Box<dyn RandomSource>,
        state: SessionState,
        now: Millis,
    }

    impl Harness {
        fn new(settings: GameSettings) -> Self {
            let state = SessionState::new(&settings);
            Self {
                settings,
                rng: Box::new(SeededRandom::from_seed(42)),
                state,
                now: 1_000,
            }
        }

        fn apply(&mut self, command: Command) -> Result<Vec<GameEvent>, GameError> {
            let mut ctx = Ctx {
                settings: &self.settings,
                rng: self.rng.as_mut(),
                now: self.now,
            };
            let t = reduce(&self.state, &command, &mut ctx)?;
            self.state = t.state;
            Ok(t.events)
        }

        /// Lobby with the given players, game started, first player active.
        fn started(settings: GameSettings, players: &[(&str, &str)]) -> Self {
            let mut h = Self::new(settings);
            h.apply(Command::OpenSetup).unwrap();
            for (name, team) in players {
                h.apply(Command::Join {
                    name: name.to_string(),
                    team: team.to_string(),
                })
                .unwrap();
            }
            h.apply(Command::StartGame).unwrap();
            h.apply(Command::SelectPlayer { player_id: "p1".into() }).unwrap();
            h
        }

        fn player(&self, id: &str) -> &Player {
            &self.state.players[id]
        }

        fn answer_current(&mut self, correctly: bool) -> Vec<GameEvent> {
            let q = current_question(&self.state).expect("question presented");
            let choice = if correctly { q.answer } else { (q.answer + 1) % q.options.len() };
            self.apply(Command::AnswerQuestion { choice }).unwrap()
        }
    }

    #[test]
    fn test_page_flow() {
        let mut h = Harness::new(GameSettings::team_quest());
        assert_eq!(h.apply(Command::StartGame), Err(GameError::InvalidPage(Page::Home)));
        h.apply(Command::OpenSetup).unwrap();
        assert_eq!(h.apply(Command::StartGame), Err(GameError::NoPlayers));
        h.apply(Command::Join { name: "Tilly".into(), team: "red".into() }).unwrap();
        h.apply(Command::StartGame).unwrap();
        assert_eq!(h.state.page, Page::Map);
        assert!(h.state.needs_player_pick());
        assert_eq!(
            h.apply(Command::EnterZone { zone: ZoneId::Coral }),
            Err(GameError::NoActivePlayer)
        );
    }

    #[test]
    fn test_team_capacity_and_names() {
        let mut h = Harness::new(GameSettings::team_quest());
        h.apply(Command::OpenSetup).unwrap();
        for name in ["A", "B", "C"] {
            h.apply(Command::Join { name: name.into(), team: "blue".into() }).unwrap();
        }
        assert_eq!(
            h.apply(Command::Join { name: "D".into(), team: "blue".into() }),
            Err(GameError::TeamFull { team: "blue".into(), max: 3 })
        );
        assert_eq!(
            h.apply(Command::Join { name: "a".into(), team: "red".into() }),
            Err(GameError::DuplicatePlayerName("a".into()))
        );
        assert_eq!(
            h.apply(Command::Join { name: "E".into(), team: "black".into() }),
            Err(GameError::UnknownTeam("black".into()))
        );
        assert_eq!(
            h.apply(Command::Join { name: "  ".into(), team: "red".into() }),
            Err(GameError::EmptyName)
        );
    }

    #[test]
    fn test_wrong_answer_costs_chance_and_is_recorded() {
        let mut h = Harness::started(GameSettings::team_quest(), &[("Tilly", "red")]);
        h.apply(Command::EnterZone { zone: ZoneId::Kelp }).unwrap();
        let index = h.state.visit.as_ref().unwrap().question.unwrap();
        let before = h.player("p1").action_chances;

        h.answer_current(false);
        let p = h.player("p1");
        assert_eq!(p.action_chances, before - 1);
        assert_eq!((p.coins, p.shells, p.total_score()), (0, 0, 0));
        assert!(p.answered_questions[&ZoneId::Kelp].contains(&index));
        assert_eq!(h.apply(Command::AnswerQuestion { choice: 0 }), Err(GameError::AlreadyAnswered));
    }

    #[test]
    fn test_leaving_unanswered_does_not_reroll() {
        let mut h = Harness::started(GameSettings::team_quest(), &[("Tilly", "red")]);
        let pool = catalog::questions(ZoneId::Coral).len();
        let mut seen = BTreeSet::new();
        for visit in 0..pool {
            h.apply(Command::EnterZone { zone: ZoneId::Coral }).unwrap();
            let index = h.state.visit.as_ref().unwrap().question.unwrap();
            assert!(seen.insert(index), "index {index} shown again on visit {visit}");
            h.apply(Command::ReturnToMap).unwrap();
        }
        assert_eq!(seen.len(), pool);
        assert_eq!(h.player("p1").action_chances, 15);

        // The next visit starts a fresh cycle.
        h.apply(Command::EnterZone { zone: ZoneId::Coral }).unwrap();
        assert_eq!(h.player("p1").answered_questions[&ZoneId::Coral].len(), 1);
    }

    #[test]
    fn test_three_correct_answers_complete_zone() {
        let mut h = Harness::started(GameSettings::team_quest(), &[("Tilly", "red")]);
        h.apply(Command::EnterZone { zone: ZoneId::Volcano }).unwrap();
        h.answer_current(true);
        h.apply(Command::NextQuestion).unwrap();
        h.answer_current(true);
        h.apply(Command::NextQuestion).unwrap();
        let events = h.answer_current(true);
        assert!(events.contains(&GameEvent::ZoneCompleted {
            player_id: "p1".into(),
            zone: ZoneId::Volcano
        }));
        let p = h.player("p1");
        assert!(p.completed_zones.contains(&ZoneId::Volcano));
        assert_eq!(p.total_score(), p.coins * 2 + p.shells * 5 + 10);
    }

    #[test]
    fn test_single_question_visit() {
        let mut h = Harness::started(GameSettings::classic(), &[("Tilly", "red")]);
        h.apply(Command::EnterZone { zone: ZoneId::Coral }).unwrap();
        h.answer_current(true);
        assert_eq!(h.apply(Command::NextQuestion), Err(GameError::VisitOver));
        // Classic zones complete on a single correct answer.
        assert!(h.player("p1").completed_zones.contains(&ZoneId::Coral));
    }

    #[test]
    fn test_card_draw_marks_zone_and_one_per_visit() {
        let mut h = Harness::started(GameSettings::team_quest(), &[("Tilly", "red")]);
        h.apply(Command::EnterZone { zone: ZoneId::Cave }).unwrap();
        assert_eq!(h.apply(Command::AnswerQuestion { choice: 0 }), Err(GameError::NoQuestionPresented));
        h.apply(Command::DrawCard).unwrap();
        assert_eq!(h.apply(Command::DrawCard), Err(GameError::AlreadyDrawn));
        let p = h.player("p1");
        assert_eq!(p.collection.len(), 1);
        assert_eq!(p.bonus_points, 15);
        assert!(p.completed_zones.contains(&ZoneId::Cave));
    }

    #[test]
    fn test_stale_auto_return_is_noop() {
        let mut h = Harness::started(GameSettings::team_quest(), &[("Tilly", "red")]);
        h.apply(Command::EnterZone { zone: ZoneId::Coral }).unwrap();
        let events = h.answer_current(true);
        let epoch = events
            .iter()
            .find_map(|e| match e {
                GameEvent::ReturnScheduled { epoch, .. } => Some(*epoch),
                _ => None,
            })
            .unwrap();

        // Moving on to another question invalidates the scheduled return.
        h.apply(Command::NextQuestion).unwrap();
        let events = h.apply(Command::AutoReturn { epoch }).unwrap();
        assert!(events.is_empty());
        assert_eq!(h.state.page, Page::Zone(ZoneId::Coral));

        h.answer_current(false);
        let fresh = h.state.nav_epoch;
        h.apply(Command::AutoReturn { epoch: fresh }).unwrap();
        assert_eq!(h.state.page, Page::Map);
    }

    #[test]
    fn test_entry_gates() {
        let mut h = Harness::started(GameSettings::team_quest(), &[("Tilly", "red")]);
        h.state.players.get_mut("p1").unwrap().action_chances = 0;
        assert_eq!(
            h.apply(Command::EnterZone { zone: ZoneId::Kelp }),
            Err(GameError::NoActionChances("p1".into()))
        );
        assert_eq!(h.apply(Command::EnterTemple), Err(GameError::TempleLocked("p1".into())));

        h.state.players.get_mut("p1").unwrap().action_chances = 5;
        h.apply(Command::Pause).unwrap();
        assert_eq!(h.apply(Command::EnterZone { zone: ZoneId::Kelp }), Err(GameError::GamePaused));
        h.apply(Command::Resume).unwrap();
        h.apply(Command::EnterZone { zone: ZoneId::Kelp }).unwrap();
    }

    #[test]
    fn test_pause_disabled_in_classic() {
        let mut h = Harness::started(GameSettings::classic(), &[("Tilly", "red")]);
        assert_eq!(h.apply(Command::Pause), Err(GameError::PauseDisabled));
        assert_eq!(h.apply(Command::Resume), Err(GameError::NotPaused));
    }

    #[test]
    fn test_expiry_moves_to_finished_and_blocks_actions() {
        let mut h = Harness::started(GameSettings::team_quest(), &[("Tilly", "red")]);
        h.now += 30 * MINUTE;
        // Blocked even before the tick observes it.
        assert_eq!(h.apply(Command::EnterZone { zone: ZoneId::Kelp }), Err(GameError::TimeExpired));
        let events = h.apply(Command::Tick).unwrap();
        assert!(events.contains(&GameEvent::TimeUp));
        assert_eq!(h.state.page, Page::Finished);
        assert_eq!(h.apply(Command::EnterTemple), Err(GameError::TimeExpired));
        assert!(h.apply(Command::Tick).unwrap().is_empty());
    }

    #[test]
    fn test_gauntlet_wrong_answer_restarts() {
        let mut settings = GameSettings::team_quest();
        settings.temple_coins = 0;
        settings.temple_shells = 0;
        let mut h = Harness::started(settings, &[("Tilly", "red")]);
        h.apply(Command::EnterTemple).unwrap();

        let answer = |h: &mut Harness, correctly: bool| {
            let q = current_puzzle(&h.state).unwrap();
            let choice = if correctly { q.answer } else { (q.answer + 1) % q.options.len() };
            h.apply(Command::SubmitTempleAnswer { choice }).unwrap()
        };

        answer(&mut h, true);
        answer(&mut h, true);
        assert_eq!(h.state.temple.as_ref().unwrap().streak, 2);
        answer(&mut h, false);
        assert_eq!(h.state.temple.as_ref().unwrap().streak, 0);
        assert!(!h.player("p1").is_winner);

        answer(&mut h, true);
        answer(&mut h, true);
        let events = answer(&mut h, true);
        assert!(matches!(events[0], GameEvent::PlayerWon { first: true, .. }));
        assert!(h.player("p1").is_winner);
        assert_eq!(h.state.game_winner.as_deref(), Some("p1"));
    }

    #[test]
    fn test_single_shot_temple_failure_ends_run() {
        let mut settings = GameSettings::classic();
        settings.temple_coins = 0;
        settings.temple_shells = 0;
        let mut h = Harness::started(settings, &[("Tilly", "red")]);
        h.rng = Box::new(ScriptedRandom::new(vec![0.5], vec![0]));
        h.apply(Command::EnterTemple).unwrap();
        let q = current_puzzle(&h.state).unwrap();
        let wrong = (q.answer + 1) % q.options.len();
        h.apply(Command::SubmitTempleAnswer { choice: wrong }).unwrap();
        assert_eq!(h.state.temple.as_ref().unwrap().outcome, Some(TempleOutcome::Failed));
        assert_eq!(h.apply(Command::SubmitTempleAnswer { choice: q.answer }), Err(GameError::VisitOver));
    }

    #[test]
    fn test_winner_cannot_reenter() {
        let mut settings = GameSettings::team_quest();
        settings.temple_coins = 0;
        settings.temple_shells = 0;
        let mut h = Harness::started(settings, &[("Tilly", "red")]);
        h.state.players.get_mut("p1").unwrap().is_winner = true;
        assert_eq!(h.apply(Command::EnterTemple), Err(GameError::AlreadyWon("p1".into())));
        assert_eq!(
            h.apply(Command::EnterZone { zone: ZoneId::Coral }),
            Err(GameError::AlreadyWon("p1".into()))
        );
    }

    #[test]
    fn test_valid_commands_on_map() {
        let h = Harness::started(GameSettings::team_quest(), &[("Tilly", "red"), ("Kai", "blue")]);
        let cmds = valid_commands(&h.state, &h.settings, "p1", h.now);
        assert_eq!(cmds.len(), ZoneId::ALL.len());
        assert_eq!(
            valid_commands(&h.state, &h.settings, "p2", h.now),
            vec![Command::SelectPlayer { player_id: "p2".into() }]
        );
        assert!(valid_commands(&h.state, &h.settings, "ghost", h.now).is_empty());
    }

    #[test]
    fn test_reset_returns_home() {
        let mut h = Harness::started(GameSettings::team_quest(), &[("Tilly", "red")]);
        let epoch = h.state.nav_epoch;
        h.apply(Command::Reset).unwrap();
        assert_eq!(h.state.page, Page::Home);
        assert!(h.state.players.is_empty());
        assert!(h.state.nav_epoch > epoch);
    }

    #[test]
    fn test_rejected_command_leaves_state_untouched() {
        let h = Harness::started(GameSettings::team_quest(), &[("Tilly", "red")]);
        let mut rng = SeededRandom::from_seed(1);
        let mut ctx = Ctx {
            settings: &h.settings,
            rng: &mut rng,
            now: h.now,
        };
        let before = serde_json::to_value(&h.state).unwrap();
        assert!(reduce(&h.state, &Command::DrawCard, &mut ctx).is_err());
        assert_eq!(serde_json::to_value(&h.state).unwrap(), before);
    }

    fn arb_command() -> impl Strategy<Value = Command> {
        let player = (1u32..=2).prop_map(|n| format!("p{n}"));
        prop_oneof![
            prop_oneof![
                player.clone().prop_map(|player_id| Command::SelectPlayer { player_id }),
                prop::sample::select(ZoneId::ALL.to_vec()).prop_map(|zone| Command::EnterZone { zone }),
                (0usize..4).prop_map(|choice| Command::AnswerQuestion { choice }),
                Just(Command::NextQuestion),
                Just(Command::DrawCard),
                Just(Command::ReturnToMap),
            ],
            prop_oneof![
                Just(Command::EnterTemple),
                (0usize..4).prop_map(|choice| Command::SubmitTempleAnswer { choice }),
                (player, prop::option::of(0u32..20))
                    .prop_map(|(player_id, amount)| Command::RestoreChances { player_id, amount }),
                Just(Command::Pause),
                Just(Command::Resume),
                Just(Command::Tick),
            ],
        ]
    }

    proptest! {
        #[test]
        fn prop_score_projection_holds_after_every_step(
            seed in any::<u64>(),
            steps in prop::collection::vec((arb_command(), 0u64..30_000), 1..150),
        ) {
            let mut settings = GameSettings::team_quest();
            settings.temple_coins = 4;
            settings.temple_shells = 2;
            let mut h = Harness::started(settings, &[("Tilly", "red"), ("Kai", "blue")]);
            h.rng = Box::new(SeededRandom::from_seed(seed));

            for (command, advance) in steps {
                h.now += advance;
                if h.apply(command).is_err() {
                    continue;
                }
                for p in h.state.players.values() {
                    prop_assert_eq!(
                        p.total_score(),
                        p.coins * 2 + p.shells * 5 + p.completed_zones.len() as u32 * 10
                    );
                }
            }
        }
    }
}
