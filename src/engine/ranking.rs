//! Leaderboard ordering.
//!
//! Winners first, by earliest win time then highest score. Everyone else by
//! highest score then least recent activity. Player id is the last tie-break so
//! the order is total.

use std::cmp::Ordering;

use serde::Serialize;

use crate::engine::models::{Millis, Player, PlayerId, SessionState};

pub fn compare_players(a: &Player, b: &Player) -> Ordering {
    match (a.is_winner, b.is_winner) {
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        _ => {}
    }
    let primary = if a.is_winner {
        // A winner without a recorded time sorts after every timed winner.
        let ta = a.win_time.unwrap_or(Millis::MAX);
        let tb = b.win_time.unwrap_or(Millis::MAX);
        ta.cmp(&tb)
            .then_with(|| b.total_score().cmp(&a.total_score()))
    } else {
        b.total_score()
            .cmp(&a.total_score())
            .then_with(|| a.last_active.cmp(&b.last_active))
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

/// Full ranking of every player.
pub fn rank_players<'a, I>(players: I) -> Vec<&'a Player>
where
    I: IntoIterator<Item = &'a Player>,
{
    let mut ranked: Vec<&Player> = players.into_iter().collect();
    ranked.sort_by(|a, b| compare_players(a, b));
    ranked
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub player_id: PlayerId,
    pub name: String,
    pub team: String,
    pub total_score: u32,
    pub is_winner: bool,
    pub win_time: Option<Millis>,
}

/// Ranked entries, truncated to `limit` when given.
pub fn leaderboard(state: &SessionState, limit: Option<usize>) -> Vec<LeaderboardEntry> {
    rank_players(state.players.values())
        .into_iter()
        .take(limit.unwrap_or(usize::MAX))
        .enumerate()
        .map(|(i, p)| LeaderboardEntry {
            rank: i + 1,
            player_id: p.id.clone(),
            name: p.name.clone(),
            team: p.team.clone(),
            total_score: p.total_score(),
            is_winner: p.is_winner,
            win_time: p.win_time,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::settings::GameSettings;
    use proptest::prelude::*;

    fn player(id: &str, coins: u32, last_active: Millis, win_time: Option<Millis>) -> Player {
        let settings = GameSettings::team_quest();
        let mut p = Player::new(id.into(), id.into(), "red".into(), &settings, 0);
        p.coins = coins;
        p.is_winner = win_time.is_some();
        p.win_time = win_time;
        p.commit(&settings.scoring, last_active);
        p
    }

    fn ids(ranked: &[&Player]) -> Vec<String> {
        ranked.iter().map(|p| p.id.clone()).collect()
    }

    #[test]
    fn test_winner_beats_higher_score() {
        let rich = player("rich", 100, 5, None);
        let winner = player("winner", 1, 5, Some(90_000));
        assert_eq!(ids(&rank_players([&rich, &winner])), vec!["winner", "rich"]);
    }

    #[test]
    fn test_winners_by_time_then_score() {
        let late = player("late", 50, 0, Some(20_000));
        let early = player("early", 1, 0, Some(10_000));
        let early_rich = player("early_rich", 9, 0, Some(10_000));
        assert_eq!(
            ids(&rank_players([&late, &early, &early_rich])),
            vec!["early_rich", "early", "late"]
        );
    }

    #[test]
    fn test_non_winners_by_score_then_activity() {
        let a = player("a", 5, 300, None);
        let b = player("b", 5, 100, None);
        let c = player("c", 8, 900, None);
        assert_eq!(ids(&rank_players([&a, &b, &c])), vec!["c", "b", "a"]);
    }

    fn arb_player() -> impl Strategy<Value = Player> {
        (0u32..4, 0u32..3, 0u64..3, prop::option::of(0u64..3), "[a-d]")
            .prop_map(|(coins, shells, active, win, id)| {
                let settings = GameSettings::team_quest();
                let mut p = Player::new(id.clone(), id, "red".into(), &settings, 0);
                p.coins = coins;
                p.shells = shells;
                p.is_winner = win.is_some();
                p.win_time = win;
                p.commit(&settings.scoring, active);
                p
            })
    }

    proptest! {
        #[test]
        fn prop_comparator_is_total_order(a in arb_player(), b in arb_player(), c in arb_player()) {
            // Antisymmetry
            prop_assert_eq!(compare_players(&a, &b), compare_players(&b, &a).reverse());
            // Transitivity
            if compare_players(&a, &b) != Ordering::Greater && compare_players(&b, &c) != Ordering::Greater {
                prop_assert_ne!(compare_players(&a, &c), Ordering::Greater);
            }
        }
    }
}
