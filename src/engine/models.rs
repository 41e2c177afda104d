//! Core engine data types: players, session state, zone visits and events.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::engine::clock::GameClock;
use crate::engine::economy;
use crate::engine::settings::{GameSettings, ScoringSettings};

pub type PlayerId = String;

/// Milliseconds, either wall-clock (`TimeSource`) or elapsed game time.
pub type Millis = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    Coins,
    Shells,
}

/// What a zone offers when entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ZoneKind {
    /// Trivia questions paying out in the given currency.
    Question { currency: Currency },
    /// A single weighted card draw per visit.
    Card,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneId {
    Coral,
    Volcano,
    Kelp,
    Cave,
    Shipwreck,
}

impl ZoneId {
    pub const ALL: [ZoneId; 5] = [
        ZoneId::Coral,
        ZoneId::Volcano,
        ZoneId::Kelp,
        ZoneId::Cave,
        ZoneId::Shipwreck,
    ];

    pub fn kind(self) -> ZoneKind {
        match self {
            ZoneId::Coral => ZoneKind::Question {
                currency: Currency::Shells,
            },
            ZoneId::Volcano | ZoneId::Kelp => ZoneKind::Question {
                currency: Currency::Coins,
            },
            ZoneId::Cave | ZoneId::Shipwreck => ZoneKind::Card,
        }
    }

    pub fn is_question_zone(self) -> bool {
        matches!(self.kind(), ZoneKind::Question { .. })
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ZoneId::Coral => "Coral Reef",
            ZoneId::Volcano => "Volcano Vents",
            ZoneId::Kelp => "Kelp Forest",
            ZoneId::Cave => "Crystal Cave",
            ZoneId::Shipwreck => "Sunken Shipwreck",
        }
    }
}

/// A multiple-choice trivia question. Also used for temple puzzles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub prompt: String,
    pub options: Vec<String>,
    pub answer: usize,
    pub difficulty: Difficulty,
}

impl Question {
    pub fn is_correct(&self, choice: usize) -> bool {
        choice == self.answer
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    /// Declared walk order for weighted selection.
    pub const ORDER: [Rarity; 4] = [Rarity::Common, Rarity::Rare, Rarity::Epic, Rarity::Legendary];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    Coins,
    Shells,
    /// Adds `amount` to both coins and shells.
    Bonus,
    /// Adds `amount` action chances, not capped by the configured max.
    Action,
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardTemplate {
    pub card_id: String,
    pub name: String,
    pub rarity: Rarity,
    pub card_type: CardType,
    pub amount: u32,
}

/// A card as held by a player: a copy of its template plus when it was drawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectedCard {
    pub card_id: String,
    pub name: String,
    pub rarity: Rarity,
    pub card_type: CardType,
    pub amount: u32,
    pub drawn_at: Millis,
}

impl CollectedCard {
    pub fn from_template(template: &CardTemplate, drawn_at: Millis) -> Self {
        Self {
            card_id: template.card_id.clone(),
            name: template.name.clone(),
            rarity: template.rarity,
            card_type: template.card_type,
            amount: template.amount,
            drawn_at,
        }
    }
}

/// Resource change produced by an answer or a card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardDelta {
    pub coins: u32,
    pub shells: u32,
    pub action_chances: u32,
    pub score_bonus: u32,
}

impl RewardDelta {
    pub fn is_empty(&self) -> bool {
        *self == RewardDelta::default()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub team: String,
    pub coins: u32,
    pub shells: u32,
    pub action_chances: u32,
    pub completed_zones: BTreeSet<ZoneId>,
    /// Correct answers recorded per zone.
    pub zone_progress: BTreeMap<ZoneId, u32>,
    /// Question indices already shown per zone, cleared once the pool runs dry.
    pub answered_questions: BTreeMap<ZoneId, BTreeSet<usize>>,
    /// Flat bonuses from answers and cards, tracked beside the projected score.
    pub bonus_points: u32,
    pub collection: Vec<CollectedCard>,
    pub is_winner: bool,
    /// Elapsed game time at which the temple was cleared.
    pub win_time: Option<Millis>,
    pub last_active: Millis,
    total_score: u32,
}

impl Player {
    pub fn new(id: PlayerId, name: String, team: String, settings: &GameSettings, now: Millis) -> Self {
        let mut player = Self {
            id,
            name,
            team,
            coins: 0,
            shells: 0,
            action_chances: settings.max_action_chances,
            completed_zones: BTreeSet::new(),
            zone_progress: BTreeMap::new(),
            answered_questions: BTreeMap::new(),
            bonus_points: 0,
            collection: Vec::new(),
            is_winner: false,
            win_time: None,
            last_active: now,
            total_score: 0,
        };
        player.commit(&settings.scoring, now);
        player
    }

    /// Derived from coins, shells and completed zones; see [`economy::project_score`].
    pub fn total_score(&self) -> u32 {
        self.total_score
    }

    /// Must follow every mutation: re-projects the score and stamps activity.
    pub fn commit(&mut self, scoring: &ScoringSettings, now: Millis) {
        self.total_score = economy::project_score(
            self.coins,
            self.shells,
            self.completed_zones.len(),
            scoring,
        );
        self.last_active = now;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "page", content = "zone")]
pub enum Page {
    Home,
    Setup,
    Map,
    Zone(ZoneId),
    Temple,
    Finished,
}

/// Coarse phase derived from the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    Setup,
    Playing,
    Temple,
    Finished,
}

impl Page {
    pub fn phase(self) -> GamePhase {
        match self {
            Page::Home | Page::Setup => GamePhase::Setup,
            Page::Map | Page::Zone(_) => GamePhase::Playing,
            Page::Temple => GamePhase::Temple,
            Page::Finished => GamePhase::Finished,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "result")]
pub enum VisitOutcome {
    Answered { choice: usize, correct: bool, reward: RewardDelta },
    Drew { card: CollectedCard },
}

/// The active player's current stay in a zone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneVisit {
    pub player_id: PlayerId,
    pub zone: ZoneId,
    pub question: Option<usize>,
    pub outcome: Option<VisitOutcome>,
    pub questions_asked: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TempleOutcome {
    Won,
    Failed,
}

/// Progress through the temple challenge for the active player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TempleRun {
    pub player_id: PlayerId,
    pub puzzle: usize,
    pub streak: u32,
    pub asked: BTreeSet<usize>,
    pub outcome: Option<TempleOutcome>,
}

/// The single shared session container. Reducers return new copies of it.
#[derive(Debug, Clone, Serialize)]
pub struct SessionState {
    pub page: Page,
    pub players: BTreeMap<PlayerId, Player>,
    pub active_player: Option<PlayerId>,
    /// First player to clear the temple. Never overwritten.
    pub game_winner: Option<PlayerId>,
    pub winner_time: Option<Millis>,
    pub clock: GameClock,
    pub visit: Option<ZoneVisit>,
    pub temple: Option<TempleRun>,
    /// Bumped on every screen change; scheduled returns carry the epoch they were issued in.
    pub nav_epoch: u64,
    pub next_player_seq: u32,
}

impl SessionState {
    pub fn new(settings: &GameSettings) -> Self {
        Self {
            page: Page::Home,
            players: BTreeMap::new(),
            active_player: None,
            game_winner: None,
            winner_time: None,
            clock: GameClock::new(settings.time_limit_ms(), settings.warning_threshold_ms),
            visit: None,
            temple: None,
            nav_epoch: 0,
            next_player_seq: 1,
        }
    }

    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.get(player_id)
    }

    pub fn active(&self) -> Option<&Player> {
        self.active_player.as_deref().and_then(|pid| self.players.get(pid))
    }

    /// Player-picker sub-state of the map.
    pub fn needs_player_pick(&self) -> bool {
        self.page == Page::Map && self.active().is_none()
    }
}

/// Everything a reducer step reports to the outside world.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum GameEvent {
    PlayerJoined { player_id: PlayerId, team: String },
    GameStarted { at: Millis },
    PageChanged { page: Page },
    ActivePlayerChanged { player_id: Option<PlayerId> },
    QuestionPresented { player_id: PlayerId, zone: ZoneId, index: usize },
    QuestionAnswered { player_id: PlayerId, zone: ZoneId, correct: bool, reward: RewardDelta },
    ZoneCompleted { player_id: PlayerId, zone: ZoneId },
    CardDrawn { player_id: PlayerId, card: CollectedCard },
    ChancesRestored { player_id: PlayerId, chances: u32 },
    TempleEntered { player_id: PlayerId },
    TempleProgress { player_id: PlayerId, streak: u32 },
    TempleFailed { player_id: PlayerId },
    PlayerWon { player_id: PlayerId, elapsed_ms: Millis, first: bool },
    Paused,
    Resumed { paused_ms: Millis },
    TimeWarning { remaining_ms: Millis },
    TimeUp,
    ReturnScheduled { epoch: u64, delay_ms: Millis },
    GameEnded,
    SessionReset,
}
