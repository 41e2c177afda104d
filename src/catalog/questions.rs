//! Ocean trivia banks for the three question zones.

use once_cell::sync::Lazy;

use crate::engine::models::Difficulty::{self, Easy, Hard, Medium};
use crate::engine::models::Question;

pub(crate) fn q(prompt: &str, options: &[&str], answer: usize, difficulty: Difficulty) -> Question {
    Question {
        prompt: prompt.into(),
        options: options.iter().map(|o| o.to_string()).collect(),
        answer,
        difficulty,
    }
}

pub static CORAL: Lazy<Vec<Question>> = Lazy::new(|| {
    vec![
        q(
            "What kind of animal builds a coral reef?",
            &["Fish", "Tiny polyps", "Sea snails", "Crabs"],
            1,
            Easy,
        ),
        q(
            "Which algae lives inside coral and gives it color?",
            &["Kelp", "Zooxanthellae", "Sargassum", "Diatoms"],
            1,
            Medium,
        ),
        q(
            "What is coral bleaching mostly caused by?",
            &["Warm water", "Cold currents", "Too many fish", "Low tide"],
            0,
            Medium,
        ),
        q(
            "Which is the largest coral reef system on Earth?",
            &["Belize Barrier Reef", "Red Sea Reef", "Great Barrier Reef", "Florida Reef"],
            2,
            Easy,
        ),
        q(
            "Roughly what share of marine species depend on reefs?",
            &["1%", "5%", "25%", "75%"],
            2,
            Hard,
        ),
        q(
            "Clownfish shelter among the tentacles of which animal?",
            &["Jellyfish", "Sea anemone", "Octopus", "Sea star"],
            1,
            Easy,
        ),
        q(
            "Hard corals build their skeletons from what mineral?",
            &["Silica", "Calcium carbonate", "Iron oxide", "Sodium chloride"],
            1,
            Hard,
        ),
        q(
            "What do parrotfish turn coral into as they feed?",
            &["Sand", "Pearls", "Seaweed", "Bubbles"],
            0,
            Medium,
        ),
    ]
});

pub static VOLCANO: Lazy<Vec<Question>> = Lazy::new(|| {
    vec![
        q(
            "What are undersea hot springs called?",
            &["Geysers", "Hydrothermal vents", "Tide pools", "Blowholes"],
            1,
            Easy,
        ),
        q(
            "Vent communities get energy from what instead of sunlight?",
            &["Moonlight", "Chemosynthesis", "Photosynthesis", "Lightning"],
            1,
            Hard,
        ),
        q(
            "Which giant worm lives beside deep-sea vents?",
            &["Tube worm", "Earthworm", "Bristle worm", "Flatworm"],
            0,
            Medium,
        ),
        q(
            "What hardens into new seafloor at mid-ocean ridges?",
            &["Sand", "Ice", "Lava", "Coral"],
            2,
            Easy,
        ),
        q(
            "Which island chain formed over an oceanic hotspot?",
            &["Hawaii", "Britain", "Madagascar", "Greenland"],
            0,
            Medium,
        ),
        q(
            "What are dark-smoke vent chimneys called?",
            &["White smokers", "Black smokers", "Fumaroles", "Calderas"],
            1,
            Hard,
        ),
        q(
            "Most of Earth's volcanic activity happens where?",
            &["On mountains", "Under the ocean", "In deserts", "Near the poles"],
            1,
            Medium,
        ),
    ]
});

pub static KELP: Lazy<Vec<Question>> = Lazy::new(|| {
    vec![
        q(
            "Kelp is a type of what?",
            &["Coral", "Algae", "Fungus", "Sponge"],
            1,
            Easy,
        ),
        q(
            "Which furry mammal protects kelp forests by eating urchins?",
            &["Sea otter", "Seal", "Beaver", "Walrus"],
            0,
            Easy,
        ),
        q(
            "What keeps giant kelp fronds floating toward the surface?",
            &["Gas-filled bladders", "Oil droplets", "Fish nibbling", "Tides"],
            0,
            Medium,
        ),
        q(
            "How fast can giant kelp grow in a single day?",
            &["1 cm", "5 cm", "Up to 60 cm", "2 meters"],
            2,
            Hard,
        ),
        q(
            "What anchors kelp to the rocky seafloor?",
            &["Roots", "A holdfast", "Suction cups", "Sand"],
            1,
            Medium,
        ),
        q(
            "Kelp forests grow best in water that is what?",
            &["Cold and nutrient-rich", "Warm and clear", "Fresh", "Very deep"],
            0,
            Medium,
        ),
        q(
            "Which grazer can turn a kelp forest into an urchin barren?",
            &["Sea urchins", "Sea turtles", "Dolphins", "Pelicans"],
            0,
            Hard,
        ),
    ]
});
