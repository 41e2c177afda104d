//! Read-only snapshots handed to the rendering side.

use serde::Serialize;

use crate::engine::models::{
    CollectedCard, GamePhase, Millis, Page, PlayerId, SessionState, ZoneId,
};
use crate::engine::progress::temple_eligible;
use crate::engine::ranking::{leaderboard, rank_players, LeaderboardEntry};
use crate::engine::settings::GameSettings;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub team: String,
    pub coins: u32,
    pub shells: u32,
    pub action_chances: u32,
    pub total_score: u32,
    pub bonus_points: u32,
    pub completed_zones: Vec<ZoneId>,
    pub cards: Vec<CollectedCard>,
    pub temple_eligible: bool,
    pub is_winner: bool,
    pub win_time: Option<Millis>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub page: Page,
    pub phase: GamePhase,
    pub active_player: Option<PlayerId>,
    pub needs_player_pick: bool,
    pub remaining_ms: Millis,
    pub paused: bool,
    pub expired: bool,
    pub game_winner: Option<PlayerId>,
    pub winner_time: Option<Millis>,
    /// Players in ranking order.
    pub players: Vec<PlayerView>,
    pub leaderboard: Vec<LeaderboardEntry>,
}

impl SessionView {
    pub fn build(state: &SessionState, settings: &GameSettings, now: Millis) -> Self {
        let players = rank_players(state.players.values())
            .into_iter()
            .map(|p| PlayerView {
                id: p.id.clone(),
                name: p.name.clone(),
                team: p.team.clone(),
                coins: p.coins,
                shells: p.shells,
                action_chances: p.action_chances,
                total_score: p.total_score(),
                bonus_points: p.bonus_points,
                completed_zones: p.completed_zones.iter().copied().collect(),
                cards: p.collection.clone(),
                temple_eligible: temple_eligible(p, settings),
                is_winner: p.is_winner,
                win_time: p.win_time,
            })
            .collect();

        Self {
            page: state.page,
            phase: state.page.phase(),
            active_player: state.active_player.clone(),
            needs_player_pick: state.needs_player_pick(),
            remaining_ms: state.clock.remaining(now),
            paused: state.clock.is_paused(),
            expired: state.clock.is_expired(now),
            game_winner: state.game_winner.clone(),
            winner_time: state.winner_time,
            players,
            leaderboard: leaderboard(state, Some(settings.leaderboard_size)),
        }
    }

    pub fn player(&self, player_id: &str) -> Option<&PlayerView> {
        self.players.iter().find(|p| p.id == player_id)
    }
}
