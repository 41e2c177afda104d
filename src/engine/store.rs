//! Owns the single session, its injected collaborators and the pending
//! auto-return timers. Callers only ever see snapshots.

use std::sync::Arc;

use crate::engine::audio::{cue_for, AudioCue, CueSink, TracingCueSink};
use crate::engine::clock::{SystemClock, TimeSource};
use crate::engine::errors::GameError;
use crate::engine::models::{GameEvent, Millis, SessionState};
use crate::engine::rng::{RandomSource, SeededRandom};
use crate::engine::session::{reduce, valid_commands, Command, Ctx};
use crate::engine::settings::GameSettings;
use crate::engine::views::SessionView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingReturn {
    due: Millis,
    epoch: u64,
}

pub struct GameStore {
    settings: Arc<GameSettings>,
    state: Arc<SessionState>,
    rng: Box<dyn RandomSource>,
    time: Arc<dyn TimeSource>,
    cues: Box<dyn CueSink>,
    pending: Vec<PendingReturn>,
}

impl GameStore {
    pub fn new(
        settings: GameSettings,
        rng: Box<dyn RandomSource>,
        time: Arc<dyn TimeSource>,
        cues: Box<dyn CueSink>,
    ) -> Self {
        let state = Arc::new(SessionState::new(&settings));
        Self {
            settings: Arc::new(settings),
            state,
            rng,
            time,
            cues,
            pending: Vec::new(),
        }
    }

    /// Seeded store on the wall clock with the logging cue sink.
    pub fn with_seed(settings: GameSettings, seed: u64) -> Self {
        Self::new(
            settings,
            Box::new(SeededRandom::from_seed(seed)),
            Arc::new(SystemClock),
            Box::new(TracingCueSink),
        )
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Cheap shared handle to the current state.
    pub fn snapshot(&self) -> Arc<SessionState> {
        Arc::clone(&self.state)
    }

    pub fn now(&self) -> Millis {
        self.time.now_ms()
    }

    pub fn view(&self) -> SessionView {
        SessionView::build(&self.state, &self.settings, self.now())
    }

    pub fn valid_commands(&self, player_id: &str) -> Vec<Command> {
        valid_commands(&self.state, &self.settings, player_id, self.now())
    }

    /// Apply one command. On error the state is left as it was and the error
    /// cue is played for user-facing commands.
    pub fn dispatch(&mut self, command: Command) -> Result<Vec<GameEvent>, GameError> {
        let now = self.now();
        let mut ctx = Ctx {
            settings: &self.settings,
            rng: self.rng.as_mut(),
            now,
        };
        let transition = match reduce(&self.state, &command, &mut ctx) {
            Ok(t) => t,
            Err(err) => {
                tracing::debug!(?command, %err, "command rejected");
                if !matches!(command, Command::Tick | Command::AutoReturn { .. }) {
                    self.cues.play(AudioCue::Error);
                }
                return Err(err);
            }
        };

        tracing::debug!(?command, events = transition.events.len(), "command applied");
        self.state = Arc::new(transition.state);
        if matches!(command, Command::Reset) {
            self.pending.clear();
        }
        for event in &transition.events {
            self.observe(event, now);
        }
        Ok(transition.events)
    }

    /// Fire due auto-returns, then advance the clock. Called periodically by the host.
    pub fn tick(&mut self) -> Result<Vec<GameEvent>, GameError> {
        let now = self.now();
        let (due, later): (Vec<_>, Vec<_>) = self.pending.drain(..).partition(|p| p.due <= now);
        self.pending = later;

        let mut events = Vec::new();
        for pending in due {
            events.extend(self.dispatch(Command::AutoReturn { epoch: pending.epoch })?);
        }
        events.extend(self.dispatch(Command::Tick)?);
        Ok(events)
    }

    /// Number of auto-returns not yet fired.
    pub fn pending_returns(&self) -> usize {
        self.pending.len()
    }

    fn observe(&mut self, event: &GameEvent, now: Millis) {
        match event {
            GameEvent::ReturnScheduled { epoch, delay_ms } => self.pending.push(PendingReturn {
                due: now + delay_ms,
                epoch: *epoch,
            }),
            GameEvent::PlayerWon {
                player_id,
                elapsed_ms,
                first,
            } => tracing::info!(player = %player_id, elapsed_ms, first, "temple cleared"),
            GameEvent::TimeWarning { remaining_ms } => tracing::info!(remaining_ms, "time running low"),
            GameEvent::TimeUp => tracing::info!("time is up"),
            GameEvent::GameStarted { at } => tracing::info!(at, players = self.state.players.len(), "game started"),
            _ => {}
        }
        if let Some(cue) = cue_for(event) {
            self.cues.play(cue);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::audio::RecordingCueSink;
    use crate::engine::clock::ManualClock;
    use crate::engine::models::{Page, ZoneId};
    use crate::engine::session::current_question;

    fn store() -> (GameStore, ManualClock, Arc<RecordingCueSink>) {
        let clock = ManualClock::starting_at(10_000);
        let cues = Arc::new(RecordingCueSink::default());
        let store = GameStore::new(
            GameSettings::team_quest(),
            Box::new(SeededRandom::from_seed(5)),
            Arc::new(clock.clone()),
            Box::new(Arc::clone(&cues)),
        );
        (store, clock, cues)
    }

    fn start(store: &mut GameStore) {
        store.dispatch(Command::OpenSetup).unwrap();
        store
            .dispatch(Command::Join {
                name: "Tilly".into(),
                team: "red".into(),
            })
            .unwrap();
        store.dispatch(Command::StartGame).unwrap();
        store
            .dispatch(Command::SelectPlayer {
                player_id: "p1".into(),
            })
            .unwrap();
    }

    #[test]
    fn test_auto_return_fires_after_delay() {
        let (mut store, clock, _) = store();
        start(&mut store);
        store.dispatch(Command::EnterZone { zone: ZoneId::Kelp }).unwrap();
        let choice = current_question(store.state()).unwrap().answer;
        store.dispatch(Command::AnswerQuestion { choice }).unwrap();
        assert_eq!(store.pending_returns(), 1);

        clock.advance(1_000);
        store.tick().unwrap();
        assert_eq!(store.state().page, Page::Zone(ZoneId::Kelp));

        clock.advance(2_000);
        store.tick().unwrap();
        assert_eq!(store.state().page, Page::Map);
        assert_eq!(store.pending_returns(), 0);
    }

    #[test]
    fn test_manual_return_makes_timer_stale() {
        let (mut store, clock, _) = store();
        start(&mut store);
        store.dispatch(Command::EnterZone { zone: ZoneId::Cave }).unwrap();
        store.dispatch(Command::DrawCard).unwrap();
        store.dispatch(Command::ReturnToMap).unwrap();
        store.dispatch(Command::EnterZone { zone: ZoneId::Coral }).unwrap();

        clock.advance(5_000);
        store.tick().unwrap();
        // The old timer must not pull the player out of the new visit.
        assert_eq!(store.state().page, Page::Zone(ZoneId::Coral));
    }

    #[test]
    fn test_rejection_keeps_state_and_plays_error() {
        let (mut store, _, cues) = store();
        let before = store.snapshot();
        let err = store.dispatch(Command::StartGame).unwrap_err();
        assert_eq!(err, GameError::InvalidPage(Page::Home));
        assert!(Arc::ptr_eq(&before, &store.snapshot()));
        assert_eq!(cues.played(), vec![AudioCue::Error]);
    }

    #[test]
    fn test_warning_cue_fires_once() {
        let (mut store, clock, cues) = store();
        start(&mut store);
        clock.advance(25 * 60_000 + 1);
        store.tick().unwrap();
        store.tick().unwrap();
        let warnings = cues.played().into_iter().filter(|c| *c == AudioCue::Warning).count();
        assert_eq!(warnings, 1);
    }
}
