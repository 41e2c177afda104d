//! Bot strategy trait and implementations.

use crate::engine::models::{Page, Player, Question, SessionState, ZoneId};
use crate::engine::rng::RandomSource;
use crate::engine::session::{current_puzzle, current_question, valid_commands, Command};
use crate::engine::settings::GameSettings;

/// Picks the next command for `player_id`. `None` ends the bot's turn.
pub trait BotStrategy: Send + Sync {
    fn name(&self) -> &str;

    fn choose_command(
        &self,
        state: &SessionState,
        settings: &GameSettings,
        player_id: &str,
        now: u64,
        rng: &mut dyn RandomSource,
    ) -> Option<Command>;
}

/// Answer `question`, getting it right with probability `accuracy`.
fn pick_answer(question: &Question, accuracy: f64, rng: &mut dyn RandomSource) -> usize {
    if rng.chance(accuracy) || question.options.len() < 2 {
        return question.answer;
    }
    let wrong: Vec<usize> = (0..question.options.len()).filter(|i| *i != question.answer).collect();
    wrong[rng.below(wrong.len())]
}

/// Answers or draws when something is pending, otherwise `None`.
fn resolve_pending(
    state: &SessionState,
    valid: &[Command],
    accuracy: f64,
    rng: &mut dyn RandomSource,
) -> Option<Command> {
    if let Some(puzzle) = current_puzzle(state) {
        if valid.iter().any(|c| matches!(c, Command::SubmitTempleAnswer { .. })) {
            return Some(Command::SubmitTempleAnswer {
                choice: pick_answer(puzzle, accuracy, rng),
            });
        }
    }
    if let Some(question) = current_question(state) {
        if valid.iter().any(|c| matches!(c, Command::AnswerQuestion { .. })) {
            return Some(Command::AnswerQuestion {
                choice: pick_answer(question, accuracy, rng),
            });
        }
    }
    valid.iter().find(|c| **c == Command::DrawCard).cloned()
}

/// Wanders between zones at random.
pub struct RandomStrategy {
    pub accuracy: f64,
}

impl BotStrategy for RandomStrategy {
    fn name(&self) -> &str {
        "random"
    }

    fn choose_command(
        &self,
        state: &SessionState,
        settings: &GameSettings,
        player_id: &str,
        now: u64,
        rng: &mut dyn RandomSource,
    ) -> Option<Command> {
        let valid = valid_commands(state, settings, player_id, now);
        if valid.is_empty() {
            return None;
        }
        if let Some(cmd) = resolve_pending(state, &valid, self.accuracy, rng) {
            return Some(cmd);
        }
        match state.page {
            Page::Map => {
                if valid.contains(&Command::EnterTemple) {
                    return Some(Command::EnterTemple);
                }
                Some(valid[rng.below(valid.len())].clone())
            }
            _ => {
                if valid.contains(&Command::NextQuestion) && rng.chance(0.5) {
                    return Some(Command::NextQuestion);
                }
                valid.iter().find(|c| **c == Command::ReturnToMap).cloned()
            }
        }
    }
}

/// Heads for whichever currency the temple still needs and keeps answering
/// while a visit allows it.
pub struct GreedyStrategy {
    pub accuracy: f64,
}

impl GreedyStrategy {
    fn target_zone(player: &Player, settings: &GameSettings) -> ZoneId {
        let coin_gap = settings.temple_coins.saturating_sub(player.coins);
        let shell_gap = settings.temple_shells.saturating_sub(player.shells);
        if shell_gap == 0 && coin_gap == 0 {
            return ZoneId::Shipwreck;
        }
        // Shells are scarcer per answer; weight the gap accordingly.
        if shell_gap * 2 >= coin_gap {
            ZoneId::Coral
        } else if player.zone_progress.get(&ZoneId::Volcano) <= player.zone_progress.get(&ZoneId::Kelp) {
            ZoneId::Volcano
        } else {
            ZoneId::Kelp
        }
    }
}

impl BotStrategy for GreedyStrategy {
    fn name(&self) -> &str {
        "greedy"
    }

    fn choose_command(
        &self,
        state: &SessionState,
        settings: &GameSettings,
        player_id: &str,
        now: u64,
        rng: &mut dyn RandomSource,
    ) -> Option<Command> {
        let valid = valid_commands(state, settings, player_id, now);
        if valid.is_empty() {
            return None;
        }
        if let Some(cmd) = resolve_pending(state, &valid, self.accuracy, rng) {
            return Some(cmd);
        }
        let player = state.player(player_id)?;
        match state.page {
            Page::Map => {
                if valid.contains(&Command::EnterTemple) {
                    return Some(Command::EnterTemple);
                }
                let zone = Self::target_zone(player, settings);
                let enter = Command::EnterZone { zone };
                if valid.contains(&enter) {
                    Some(enter)
                } else {
                    valid.into_iter().find(|c| matches!(c, Command::SelectPlayer { .. }))
                }
            }
            Page::Zone(_) => {
                let still_needed = Self::target_zone(player, settings);
                let here = state.visit.as_ref().map(|v| v.zone);
                if valid.contains(&Command::NextQuestion) && here == Some(still_needed) {
                    return Some(Command::NextQuestion);
                }
                Some(Command::ReturnToMap)
            }
            _ => valid.into_iter().find(|c| *c == Command::ReturnToMap),
        }
    }
}
