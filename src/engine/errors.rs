//! Reasons a command is rejected. A rejected command leaves the session untouched.

use thiserror::Error;

use crate::engine::models::{Page, PlayerId, ZoneId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("player {0} not found")]
    PlayerNotFound(PlayerId),
    #[error("player name must not be empty")]
    EmptyName,
    #[error("player name '{0}' already taken")]
    DuplicatePlayerName(String),
    #[error("unknown team color '{0}'")]
    UnknownTeam(String),
    #[error("team '{team}' already has {max} players")]
    TeamFull { team: String, max: u32 },
    #[error("cannot start a game with no players")]
    NoPlayers,
    #[error("command not available on page {0:?}")]
    InvalidPage(Page),
    #[error("no active player selected")]
    NoActivePlayer,
    #[error("player {0} has no action chances left")]
    NoActionChances(PlayerId),
    #[error("game time has expired")]
    TimeExpired,
    #[error("game is paused")]
    GamePaused,
    #[error("game has not started")]
    GameNotStarted,
    #[error("pausing is disabled for this game")]
    PauseDisabled,
    #[error("game is already paused")]
    AlreadyPaused,
    #[error("game is not paused")]
    NotPaused,
    #[error("player {0} has already won")]
    AlreadyWon(PlayerId),
    #[error("player {0} does not meet the temple requirements")]
    TempleLocked(PlayerId),
    #[error("no question is awaiting an answer")]
    NoQuestionPresented,
    #[error("this question was already answered")]
    AlreadyAnswered,
    #[error("answer the current question first")]
    AnswerPending,
    #[error("choice {0} is out of range")]
    InvalidChoice(usize),
    #[error("zone {0:?} does not support this action")]
    WrongZoneKind(ZoneId),
    #[error("a card was already drawn this visit")]
    AlreadyDrawn,
    #[error("visit is over, return to the map")]
    VisitOver,
    #[error("catalog is empty")]
    EmptyCatalog,
}
