//! Reward card catalog, drawn from in the cave and shipwreck zones.

use once_cell::sync::Lazy;

use crate::engine::models::{CardTemplate, CardType, Rarity};

use CardType::{Action, Bonus, Coins, Shells, Skip};
use Rarity::{Common, Epic, Legendary, Rare};

fn card(card_id: &str, name: &str, rarity: Rarity, card_type: CardType, amount: u32) -> CardTemplate {
    CardTemplate {
        card_id: card_id.into(),
        name: name.into(),
        rarity,
        card_type,
        amount,
    }
}

pub static CARD_CATALOG: Lazy<Vec<CardTemplate>> = Lazy::new(|| {
    vec![
        // Common
        card("sand_dollar", "Sand Dollar", Common, Coins, 2),
        card("tide_pool_shells", "Tide Pool Shells", Common, Shells, 1),
        card("drifting_bottle", "Drifting Bottle", Common, Skip, 0),
        card("gull_feather", "Gull Feather", Common, Coins, 1),
        // Rare
        card("pirate_purse", "Pirate Purse", Rare, Coins, 4),
        card("conch_bundle", "Conch Bundle", Rare, Shells, 2),
        card("current_rider", "Current Rider", Rare, Action, 1),
        // Epic
        card("sunken_chest", "Sunken Chest", Epic, Bonus, 3),
        card("whale_song", "Whale Song", Epic, Action, 2),
        card("nautilus_hoard", "Nautilus Hoard", Epic, Shells, 4),
        // Legendary
        card("pearl_crown", "Pearl Crown", Legendary, Bonus, 6),
        card("elder_turtle_blessing", "Elder Turtle's Blessing", Legendary, Action, 4),
    ]
});
