//! Named bot profiles: a strategy plus how often the bot knows the answer.
//! Loaded from TOML at runtime for the arena and autoplay binaries.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::engine::bot_strategy::{BotStrategy, GreedyStrategy, RandomStrategy};
use crate::engine::settings::SettingsError;

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BotProfile {
    pub description: Option<String>,
    #[serde(default = "default_strategy_type")]
    pub strategy_type: String,
    /// Probability of answering a question correctly.
    pub accuracy: Option<f64>,
}

fn default_strategy_type() -> String {
    "greedy".into()
}

const DEFAULT_ACCURACY: f64 = 0.7;

/// Top-level TOML file structure.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct BotProfilesFile {
    #[serde(default)]
    pub profiles: HashMap<String, BotProfile>,
}

impl BotProfile {
    pub fn effective_accuracy(&self) -> f64 {
        self.accuracy.unwrap_or(DEFAULT_ACCURACY).clamp(0.0, 1.0)
    }

    /// Unknown strategy types fall back to random play.
    pub fn build(&self) -> Box<dyn BotStrategy> {
        let accuracy = self.effective_accuracy();
        match self.strategy_type.as_str() {
            "greedy" => Box::new(GreedyStrategy { accuracy }),
            "random" => Box::new(RandomStrategy { accuracy }),
            other => {
                tracing::warn!(strategy_type = other, "unknown strategy type, using random");
                Box::new(RandomStrategy { accuracy })
            }
        }
    }
}

impl BotProfilesFile {
    /// Profiles the binaries use when no file is found.
    pub fn builtin() -> Self {
        let profile = |strategy: &str, accuracy: f64, description: &str| BotProfile {
            description: Some(description.to_string()),
            strategy_type: strategy.to_string(),
            accuracy: Some(accuracy),
        };
        let profiles = HashMap::from([
            ("novice".to_string(), profile("random", 0.5, "Guesses a lot, wanders")),
            ("explorer".to_string(), profile("random", 0.8, "Knows the sea, wanders")),
            ("scholar".to_string(), profile("greedy", 0.8, "Beelines for the temple")),
            ("sage".to_string(), profile("greedy", 0.95, "Rarely wrong, beelines")),
        ]);
        Self { profiles }
    }

    pub fn get(&self, name: &str) -> Option<&BotProfile> {
        self.profiles.get(name)
    }
}

/// Load profiles from a TOML file at the given path.
pub fn load_profiles(path: &Path) -> Result<BotProfilesFile, SettingsError> {
    let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| SettingsError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Try to load profiles from well-known paths, returning the built-ins if none found.
pub fn load_default_profiles() -> BotProfilesFile {
    let candidates = [
        "bot_profiles.toml",
        "../bot_profiles.toml",
        "/etc/sea-turtle-quest/bot_profiles.toml",
    ];
    for path in &candidates {
        let p = Path::new(path);
        if p.exists() {
            match load_profiles(p) {
                Ok(profiles) => {
                    tracing::info!(path = %p.display(), count = profiles.profiles.len(), "loaded bot profiles");
                    return profiles;
                }
                Err(e) => {
                    tracing::warn!(path = %p.display(), error = %e, "failed to load bot profiles");
                }
            }
        }
    }
    tracing::info!("no bot_profiles.toml found, using built-in profiles");
    BotProfilesFile::builtin()
}
