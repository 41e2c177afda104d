pub mod arena;
pub mod audio;
pub mod bot_profiles;
pub mod bot_strategy;
pub mod cards;
pub mod clock;
pub mod economy;
pub mod errors;
pub mod models;
pub mod progress;
pub mod ranking;
pub mod rng;
pub mod session;
pub mod settings;
pub mod store;
pub mod views;
