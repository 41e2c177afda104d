//! Puzzle bank for the temple challenge.

use once_cell::sync::Lazy;

use super::questions::q;
use crate::engine::models::Difficulty::Hard;
use crate::engine::models::Question;

pub static TEMPLE_PUZZLES: Lazy<Vec<Question>> = Lazy::new(|| {
    vec![
        q(
            "How do hatchling sea turtles find the ocean after leaving the nest?",
            &["By smell", "By the brightest horizon", "By following adults", "By sound of waves only"],
            1,
            Hard,
        ),
        q(
            "What decides whether a sea turtle egg hatches male or female?",
            &["Nest temperature", "Moon phase", "Egg size", "Mother's age"],
            0,
            Hard,
        ),
        q(
            "Which sea turtle species is the largest?",
            &["Green", "Hawksbill", "Leatherback", "Loggerhead"],
            2,
            Hard,
        ),
        q(
            "Roughly how many years can a sea turtle take to reach maturity?",
            &["2 to 3", "5 to 7", "10 to 50", "Over 100"],
            2,
            Hard,
        ),
        q(
            "Female sea turtles usually return to nest where?",
            &["Any warm beach", "The beach where they hatched", "Coral islands only", "River mouths"],
            1,
            Hard,
        ),
        q(
            "What helps sea turtles navigate across whole oceans?",
            &["Earth's magnetic field", "Star patterns", "Water color", "Fish schools"],
            0,
            Hard,
        ),
        q(
            "Which turtle feeds mainly on sponges on coral reefs?",
            &["Olive ridley", "Hawksbill", "Flatback", "Kemp's ridley"],
            1,
            Hard,
        ),
    ]
});
