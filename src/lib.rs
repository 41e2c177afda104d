//! Session-local state machine and reward economy for Sea Turtle Quest.
//!
//! `engine` holds the rules (economy, progress, card draws, clock, ranking,
//! reducer, store, bots) and `catalog` holds the static content tables.

pub mod catalog;
pub mod engine;
