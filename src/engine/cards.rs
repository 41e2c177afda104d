//! Weighted card draws: pick a rarity by inverse CDF, then a card uniformly
//! within that rarity.

use crate::engine::economy::{apply_reward, card_effect};
use crate::engine::errors::GameError;
use crate::engine::models::{CardTemplate, CollectedCard, Millis, Player, Rarity, RewardDelta};
use crate::engine::rng::RandomSource;
use crate::engine::settings::RarityWeights;

/// Walk rarities in declared order, accumulating weight until the running sum
/// reaches the roll. A roll landing exactly on a boundary stays in the lower tier.
/// Rarities missing from `available` are skipped entirely.
pub fn roll_rarity(
    rng: &mut dyn RandomSource,
    weights: &RarityWeights,
    available: &[Rarity],
) -> Option<Rarity> {
    let tiers: Vec<(Rarity, u32)> = Rarity::ORDER
        .iter()
        .filter(|r| available.contains(*r))
        .map(|r| (*r, weights.weight(*r)))
        .filter(|(_, w)| *w > 0)
        .collect();
    let total: u32 = tiers.iter().map(|(_, w)| w).sum();
    if total == 0 {
        return None;
    }

    let roll = rng.next_f64() * f64::from(total);
    let mut cumulative = 0.0;
    for (rarity, weight) in &tiers {
        cumulative += f64::from(*weight);
        if roll <= cumulative {
            return Some(*rarity);
        }
    }
    // Only reachable through float rounding at the very top of the range.
    tiers.last().map(|(r, _)| *r)
}

pub fn draw_card<'a>(
    rng: &mut dyn RandomSource,
    catalog: &'a [CardTemplate],
    weights: &RarityWeights,
) -> Result<&'a CardTemplate, GameError> {
    let available: Vec<Rarity> = Rarity::ORDER
        .iter()
        .copied()
        .filter(|r| catalog.iter().any(|c| c.rarity == *r))
        .collect();
    let rarity = roll_rarity(rng, weights, &available).ok_or(GameError::EmptyCatalog)?;
    let pool: Vec<&CardTemplate> = catalog.iter().filter(|c| c.rarity == rarity).collect();
    Ok(pool[rng.below(pool.len())])
}

/// Apply a drawn card's effect plus the flat card bonus and append it to the
/// player's collection. Duplicates are kept.
pub fn apply_card(player: &mut Player, card: &CardTemplate, card_bonus: u32, now: Millis) -> CollectedCard {
    let delta = RewardDelta {
        score_bonus: card_bonus,
        ..card_effect(card)
    };
    apply_reward(player, &delta);
    let collected = CollectedCard::from_template(card, now);
    player.collection.push(collected.clone());
    collected
}
