//! Game configuration: one settings struct covering both game variants.
//! Loaded from TOML at runtime, layered over a named preset.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::models::{Difficulty, Millis, Rarity};

/// Per-difficulty amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyTable {
    pub easy: u32,
    pub medium: u32,
    pub hard: u32,
}

impl DifficultyTable {
    pub const fn new(easy: u32, medium: u32, hard: u32) -> Self {
        Self { easy, medium, hard }
    }

    pub fn get(&self, difficulty: Difficulty) -> u32 {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringSettings {
    pub coin_weight: u32,
    pub shell_weight: u32,
    pub zone_weight: u32,
    /// Flat bonus per correct answer, recorded in `Player::bonus_points`.
    pub difficulty_bonus: DifficultyTable,
    /// Flat bonus per card draw, recorded in `Player::bonus_points`.
    pub card_bonus: u32,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            coin_weight: 2,
            shell_weight: 5,
            zone_weight: 10,
            difficulty_bonus: DifficultyTable::new(10, 15, 20),
            card_bonus: 15,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RarityWeights {
    pub common: u32,
    pub rare: u32,
    pub epic: u32,
    pub legendary: u32,
}

impl Default for RarityWeights {
    fn default() -> Self {
        Self {
            common: 50,
            rare: 30,
            epic: 15,
            legendary: 5,
        }
    }
}

impl RarityWeights {
    pub fn weight(&self, rarity: Rarity) -> u32 {
        match rarity {
            Rarity::Common => self.common,
            Rarity::Rare => self.rare,
            Rarity::Epic => self.epic,
            Rarity::Legendary => self.legendary,
        }
    }

    pub fn total(&self) -> u32 {
        Rarity::ORDER.iter().map(|r| self.weight(*r)).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum TempleMode {
    /// Consecutive correct answers required; a miss restarts the run.
    Gauntlet { required_streak: u32 },
    /// One puzzle, one attempt per visit.
    SingleShot,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "model")]
pub enum RewardModel {
    /// Pays in the zone's own currency.
    ZoneCurrency {
        shells: DifficultyTable,
        coins: DifficultyTable,
    },
    /// Pays coins everywhere, with a chance of one extra coin.
    FlatCoins {
        coins: DifficultyTable,
        bonus_chance: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSettings {
    pub team_colors: Vec<String>,
    pub max_players_per_team: u32,
    pub max_action_chances: u32,
    /// Correct answers needed to complete a question zone.
    pub zone_completion_threshold: u32,
    /// When set, a zone visit ends after one question.
    pub single_question_visits: bool,
    pub temple_coins: u32,
    pub temple_shells: u32,
    pub temple_mode: TempleMode,
    pub reward_model: RewardModel,
    pub scoring: ScoringSettings,
    pub rarity_weights: RarityWeights,
    pub time_limit_minutes: u32,
    pub warning_threshold_ms: Millis,
    pub auto_return_delay_ms: Millis,
    pub allow_pause: bool,
    pub leaderboard_size: usize,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self::team_quest()
    }
}

impl GameSettings {
    /// Team variant: five colors of up to three players, three-question zones,
    /// a three-answer temple gauntlet, pause support.
    pub fn team_quest() -> Self {
        Self {
            team_colors: ["red", "blue", "green", "yellow", "purple"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            max_players_per_team: 3,
            max_action_chances: 15,
            zone_completion_threshold: 3,
            single_question_visits: false,
            temple_coins: 15,
            temple_shells: 10,
            temple_mode: TempleMode::Gauntlet { required_streak: 3 },
            reward_model: RewardModel::ZoneCurrency {
                shells: DifficultyTable::new(1, 2, 3),
                coins: DifficultyTable::new(2, 3, 4),
            },
            scoring: ScoringSettings::default(),
            rarity_weights: RarityWeights::default(),
            time_limit_minutes: 30,
            warning_threshold_ms: 300_000,
            auto_return_delay_ms: 3_000,
            allow_pause: true,
            leaderboard_size: 8,
        }
    }

    /// Individual variant: fifteen single-player colors, one question per
    /// visit, single-shot temple, flat coin rewards, no pause.
    pub fn classic() -> Self {
        Self {
            team_colors: [
                "red", "orange", "amber", "yellow", "lime", "green", "emerald", "teal", "cyan",
                "sky", "blue", "indigo", "violet", "purple", "pink",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
            max_players_per_team: 1,
            max_action_chances: 10,
            zone_completion_threshold: 1,
            single_question_visits: true,
            temple_coins: 10,
            temple_shells: 2,
            temple_mode: TempleMode::SingleShot,
            reward_model: RewardModel::FlatCoins {
                coins: DifficultyTable::new(1, 2, 3),
                bonus_chance: 0.3,
            },
            scoring: ScoringSettings {
                difficulty_bonus: DifficultyTable::new(0, 0, 0),
                card_bonus: 0,
                ..ScoringSettings::default()
            },
            rarity_weights: RarityWeights::default(),
            time_limit_minutes: 20,
            warning_threshold_ms: 300_000,
            auto_return_delay_ms: 3_000,
            allow_pause: false,
            leaderboard_size: 8,
        }
    }

    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "team_quest" => Some(Self::team_quest()),
            "classic" => Some(Self::classic()),
            _ => None,
        }
    }

    pub fn time_limit_ms(&self) -> Millis {
        Millis::from(self.time_limit_minutes) * 60_000
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.team_colors.is_empty() {
            return Err(SettingsError::Invalid("team_colors must not be empty".into()));
        }
        if self.max_players_per_team == 0 {
            return Err(SettingsError::Invalid("max_players_per_team must be positive".into()));
        }
        if self.max_action_chances == 0 {
            return Err(SettingsError::Invalid("max_action_chances must be positive".into()));
        }
        if self.zone_completion_threshold == 0 {
            return Err(SettingsError::Invalid(
                "zone_completion_threshold must be positive".into(),
            ));
        }
        if self.rarity_weights.total() == 0 {
            return Err(SettingsError::Invalid("rarity weights sum to zero".into()));
        }
        if let TempleMode::Gauntlet { required_streak: 0 } = self.temple_mode {
            return Err(SettingsError::Invalid("required_streak must be positive".into()));
        }
        if let RewardModel::FlatCoins { bonus_chance, .. } = self.reward_model {
            if !(0.0..=1.0).contains(&bonus_chance) {
                return Err(SettingsError::Invalid(format!(
                    "bonus_chance {bonus_chance} outside [0, 1]"
                )));
            }
        }
        if self.time_limit_minutes == 0 {
            return Err(SettingsError::Invalid("time_limit_minutes must be positive".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("unknown preset '{0}'")]
    UnknownPreset(String),
    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// Top-level TOML file structure. Every field overrides the preset when present.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SettingsFile {
    pub preset: Option<String>,
    pub team_colors: Option<Vec<String>>,
    pub max_players_per_team: Option<u32>,
    pub max_action_chances: Option<u32>,
    pub zone_completion_threshold: Option<u32>,
    pub single_question_visits: Option<bool>,
    pub temple_coins: Option<u32>,
    pub temple_shells: Option<u32>,
    pub temple_mode: Option<TempleMode>,
    pub reward_model: Option<RewardModel>,
    pub scoring: Option<ScoringSettings>,
    pub rarity_weights: Option<RarityWeights>,
    pub time_limit_minutes: Option<u32>,
    pub warning_threshold_ms: Option<Millis>,
    pub auto_return_delay_ms: Option<Millis>,
    pub allow_pause: Option<bool>,
    pub leaderboard_size: Option<usize>,
}

impl SettingsFile {
    /// Resolve against the named preset (default `team_quest`) and validate.
    pub fn into_settings(self) -> Result<GameSettings, SettingsError> {
        let preset = self.preset.as_deref().unwrap_or("team_quest");
        let d = GameSettings::preset(preset)
            .ok_or_else(|| SettingsError::UnknownPreset(preset.to_string()))?;
        let settings = GameSettings {
            team_colors: self.team_colors.unwrap_or(d.team_colors),
            max_players_per_team: self.max_players_per_team.unwrap_or(d.max_players_per_team),
            max_action_chances: self.max_action_chances.unwrap_or(d.max_action_chances),
            zone_completion_threshold: self
                .zone_completion_threshold
                .unwrap_or(d.zone_completion_threshold),
            single_question_visits: self
                .single_question_visits
                .unwrap_or(d.single_question_visits),
            temple_coins: self.temple_coins.unwrap_or(d.temple_coins),
            temple_shells: self.temple_shells.unwrap_or(d.temple_shells),
            temple_mode: self.temple_mode.unwrap_or(d.temple_mode),
            reward_model: self.reward_model.unwrap_or(d.reward_model),
            scoring: self.scoring.unwrap_or(d.scoring),
            rarity_weights: self.rarity_weights.unwrap_or(d.rarity_weights),
            time_limit_minutes: self.time_limit_minutes.unwrap_or(d.time_limit_minutes),
            warning_threshold_ms: self.warning_threshold_ms.unwrap_or(d.warning_threshold_ms),
            auto_return_delay_ms: self.auto_return_delay_ms.unwrap_or(d.auto_return_delay_ms),
            allow_pause: self.allow_pause.unwrap_or(d.allow_pause),
            leaderboard_size: self.leaderboard_size.unwrap_or(d.leaderboard_size),
        };
        settings.validate()?;
        Ok(settings)
    }
}

/// Load settings from a TOML file at the given path.
pub fn load_settings(path: &Path) -> Result<GameSettings, SettingsError> {
    let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let file: SettingsFile = toml::from_str(&content).map_err(|source| SettingsError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    file.into_settings()
}

/// Try well-known paths, falling back to the `team_quest` preset.
pub fn load_default_settings() -> GameSettings {
    let candidates = [
        "sea_turtle_quest.toml",
        "../sea_turtle_quest.toml",
        "/etc/sea-turtle-quest/settings.toml",
    ];
    for path in &candidates {
        let p = Path::new(path);
        if p.exists() {
            match load_settings(p) {
                Ok(settings) => {
                    tracing::info!(path = %p.display(), "loaded game settings");
                    return settings;
                }
                Err(e) => {
                    tracing::warn!(path = %p.display(), error = %e, "failed to load game settings");
                }
            }
        }
    }
    tracing::info!("no settings file found, using team_quest preset");
    GameSettings::team_quest()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_presets_validate() {
        GameSettings::team_quest().validate().unwrap();
        GameSettings::classic().validate().unwrap();
        assert_eq!(GameSettings::classic().team_colors.len(), 15);
        assert_eq!(GameSettings::team_quest().time_limit_ms(), 30 * 60_000);
    }

    #[test]
    fn test_default_weights_sum_to_hundred() {
        assert_eq!(RarityWeights::default().total(), 100);
    }

    #[test]
    fn test_load_overrides_preset() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
preset = "classic"
max_action_chances = 4
temple_coins = 7

[temple_mode]
mode = "gauntlet"
required_streak = 2

[scoring]
card_bonus = 5
"#
        )
        .unwrap();

        let settings = load_settings(file.path()).unwrap();
        assert_eq!(settings.max_action_chances, 4);
        assert_eq!(settings.temple_coins, 7);
        assert_eq!(settings.temple_mode, TempleMode::Gauntlet { required_streak: 2 });
        // Untouched fields come from the preset; omitted scoring keys from defaults.
        assert_eq!(settings.max_players_per_team, 1);
        assert_eq!(settings.scoring.card_bonus, 5);
        assert_eq!(settings.scoring.coin_weight, 2);
    }

    #[test]
    fn test_unknown_preset_rejected() {
        let file = SettingsFile {
            preset: Some("deep_sea".into()),
            ..Default::default()
        };
        assert!(matches!(file.into_settings(), Err(SettingsError::UnknownPreset(_))));
    }

    #[test]
    fn test_invalid_bonus_chance_rejected() {
        let file: SettingsFile = toml::from_str(
            r#"
[reward_model]
model = "flat_coins"
bonus_chance = 1.5
coins = { easy = 1, medium = 2, hard = 3 }
"#,
        )
        .unwrap();
        assert!(matches!(file.into_settings(), Err(SettingsError::Invalid(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_settings(Path::new("/nonexistent/sea_turtle_quest.toml")).unwrap_err();
        assert!(matches!(err, SettingsError::Io { .. }));
    }
}
