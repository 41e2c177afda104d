//! Reward arithmetic: answer payouts, card effects and the derived score.

use crate::engine::errors::GameError;
use crate::engine::models::{CardTemplate, CardType, Currency, Difficulty, Player, RewardDelta, ZoneId, ZoneKind};
use crate::engine::rng::RandomSource;
use crate::engine::settings::{GameSettings, RewardModel, ScoringSettings};

/// Total score as a pure projection of current resources. Never accumulated.
pub fn project_score(coins: u32, shells: u32, completed_zones: usize, scoring: &ScoringSettings) -> u32 {
    let zones = u32::try_from(completed_zones).unwrap_or(u32::MAX);
    coins
        .saturating_mul(scoring.coin_weight)
        .saturating_add(shells.saturating_mul(scoring.shell_weight))
        .saturating_add(zones.saturating_mul(scoring.zone_weight))
}

/// Reward for a correct answer. The flat-coin model rolls its bonus coin here.
pub fn answer_reward(
    zone: ZoneId,
    difficulty: Difficulty,
    settings: &GameSettings,
    rng: &mut dyn RandomSource,
) -> RewardDelta {
    let score_bonus = settings.scoring.difficulty_bonus.get(difficulty);
    match settings.reward_model {
        RewardModel::ZoneCurrency { shells, coins } => match zone.kind() {
            ZoneKind::Question {
                currency: Currency::Shells,
            } => RewardDelta {
                shells: shells.get(difficulty),
                score_bonus,
                ..RewardDelta::default()
            },
            ZoneKind::Question {
                currency: Currency::Coins,
            } => RewardDelta {
                coins: coins.get(difficulty),
                score_bonus,
                ..RewardDelta::default()
            },
            ZoneKind::Card => RewardDelta::default(),
        },
        RewardModel::FlatCoins { coins, bonus_chance } => {
            let extra = u32::from(rng.chance(bonus_chance));
            RewardDelta {
                coins: coins.get(difficulty) + extra,
                score_bonus,
                ..RewardDelta::default()
            }
        }
    }
}

/// Numeric effect of a card, before the flat card bonus.
pub fn card_effect(card: &CardTemplate) -> RewardDelta {
    let amount = card.amount;
    match card.card_type {
        CardType::Coins => RewardDelta {
            coins: amount,
            ..RewardDelta::default()
        },
        CardType::Shells => RewardDelta {
            shells: amount,
            ..RewardDelta::default()
        },
        CardType::Bonus => RewardDelta {
            coins: amount,
            shells: amount,
            ..RewardDelta::default()
        },
        CardType::Action => RewardDelta {
            action_chances: amount,
            ..RewardDelta::default()
        },
        CardType::Skip => RewardDelta::default(),
    }
}

/// Adds a delta to the counters. Action chances may exceed the configured max.
pub fn apply_reward(player: &mut Player, delta: &RewardDelta) {
    player.coins = player.coins.saturating_add(delta.coins);
    player.shells = player.shells.saturating_add(delta.shells);
    player.action_chances = player.action_chances.saturating_add(delta.action_chances);
    player.bonus_points = player.bonus_points.saturating_add(delta.score_bonus);
}

pub fn consume_chance(player: &mut Player) -> Result<(), GameError> {
    if player.action_chances == 0 {
        return Err(GameError::NoActionChances(player.id.clone()));
    }
    player.action_chances -= 1;
    Ok(())
}

/// Manual restore: adds up to `amount` (all the way to `max` when `None`), never
/// above `max` and never below the current count. Returns the new count.
pub fn restore_chances(player: &mut Player, amount: Option<u32>, max: u32) -> u32 {
    let target = match amount {
        Some(n) => player.action_chances.saturating_add(n).min(max),
        None => max,
    };
    player.action_chances = player.action_chances.max(target);
    player.action_chances
}
