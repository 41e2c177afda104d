//! Static content tables: zone question banks, reward cards, temple puzzles.

pub mod cards;
pub mod questions;
pub mod temple;

use crate::engine::models::{CardTemplate, Question, ZoneId};

/// Question bank for a zone. Card zones have none.
pub fn questions(zone: ZoneId) -> &'static [Question] {
    match zone {
        ZoneId::Coral => questions::CORAL.as_slice(),
        ZoneId::Volcano => questions::VOLCANO.as_slice(),
        ZoneId::Kelp => questions::KELP.as_slice(),
        ZoneId::Cave | ZoneId::Shipwreck => &[],
    }
}

pub fn cards() -> &'static [CardTemplate] {
    cards::CARD_CATALOG.as_slice()
}

pub fn temple_puzzles() -> &'static [Question] {
    temple::TEMPLE_PUZZLES.as_slice()
}
