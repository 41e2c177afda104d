//! Named audio cues. The engine only asks a sink to play a cue; what the sink
//! does with it is up to the host.

use std::sync::Mutex;

use serde::Serialize;

use crate::engine::models::{GameEvent, Rarity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioCue {
    Success,
    Error,
    Click,
    Reward,
    Common,
    Rare,
    Epic,
    Legendary,
    Victory,
    Warning,
    TimeUp,
}

impl AudioCue {
    pub fn tag(self) -> &'static str {
        match self {
            AudioCue::Success => "success",
            AudioCue::Error => "error",
            AudioCue::Click => "click",
            AudioCue::Reward => "reward",
            AudioCue::Common => "common",
            AudioCue::Rare => "rare",
            AudioCue::Epic => "epic",
            AudioCue::Legendary => "legendary",
            AudioCue::Victory => "victory",
            AudioCue::Warning => "warning",
            AudioCue::TimeUp => "timeup",
        }
    }

    pub fn for_rarity(rarity: Rarity) -> Self {
        match rarity {
            Rarity::Common => AudioCue::Common,
            Rarity::Rare => AudioCue::Rare,
            Rarity::Epic => AudioCue::Epic,
            Rarity::Legendary => AudioCue::Legendary,
        }
    }
}

pub trait CueSink: Send {
    fn play(&self, cue: AudioCue);
}

/// Default sink: cues only show up in the debug log.
#[derive(Debug, Default)]
pub struct TracingCueSink;

impl CueSink for TracingCueSink {
    fn play(&self, cue: AudioCue) {
        tracing::debug!(cue = cue.tag(), "audio cue");
    }
}

/// Keeps every cue it was asked to play.
#[derive(Debug, Default)]
pub struct RecordingCueSink {
    played: Mutex<Vec<AudioCue>>,
}

impl RecordingCueSink {
    pub fn played(&self) -> Vec<AudioCue> {
        self.played.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl CueSink for RecordingCueSink {
    fn play(&self, cue: AudioCue) {
        if let Ok(mut played) = self.played.lock() {
            played.push(cue);
        }
    }
}

impl<T: CueSink + Sync> CueSink for std::sync::Arc<T> {
    fn play(&self, cue: AudioCue) {
        (**self).play(cue);
    }
}

/// Cue for an event, if it has one.
pub fn cue_for(event: &GameEvent) -> Option<AudioCue> {
    match event {
        GameEvent::QuestionAnswered { correct: true, reward, .. } if !reward.is_empty() => Some(AudioCue::Reward),
        GameEvent::QuestionAnswered { correct: true, .. } => Some(AudioCue::Success),
        GameEvent::QuestionAnswered { correct: false, .. } | GameEvent::TempleFailed { .. } => Some(AudioCue::Error),
        GameEvent::CardDrawn { card, .. } => Some(AudioCue::for_rarity(card.rarity)),
        GameEvent::TempleProgress { .. } => Some(AudioCue::Success),
        GameEvent::PlayerWon { .. } => Some(AudioCue::Victory),
        GameEvent::TimeWarning { .. } => Some(AudioCue::Warning),
        GameEvent::TimeUp => Some(AudioCue::TimeUp),
        GameEvent::PageChanged { .. } | GameEvent::ActivePlayerChanged { .. } => Some(AudioCue::Click),
        _ => None,
    }
}
