//! Session Driver
//!
//! Owns a [`MatchEngine`] on a single task so commands, clock ticks, and
//! mismatch flip-backs are applied one at a time. Observers get a fresh
//! [`SessionSnapshot`] over a watch channel after every step.

use std::future::pending;
use std::pin::Pin;

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant, Interval, MissedTickBehavior, Sleep};
use tracing::{debug, info};

use crate::game::deck::CardId;
use crate::game::engine::MatchEngine;
use crate::game::events::SessionEvent;
use crate::game::level::LevelId;
use crate::game::progress::{MedalCountsChanged, ProgressStore};
use crate::game::state::{FlipBack, SelectOutcome, SessionSnapshot};

/// Commands accepted by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    /// Start a level.
    StartLevel(LevelId),
    /// Turn a card face up.
    SelectCard(CardId),
    /// Restart the current level.
    ReplayCurrentLevel,
    /// Move on after a successful round.
    AdvanceToNextLevel,
    /// Abandon the round.
    BackToLevelSelection,
    /// Stop the driver.
    Shutdown,
}

/// Driver errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DriverError {
    /// The driver task has stopped.
    #[error("Session driver stopped")]
    Closed,
}

struct Request {
    command: SessionCommand,
    reply: oneshot::Sender<SessionSnapshot>,
}

struct PendingFlip {
    sleep: Pin<Box<Sleep>>,
    flip: FlipBack,
}

enum Step {
    Request(Option<Request>),
    Tick,
    FlipBack(FlipBack),
}

/// Handle to a running driver.
pub struct SessionHandle {
    requests: mpsc::Sender<Request>,
    snapshots: watch::Receiver<SessionSnapshot>,
    events: broadcast::Sender<SessionEvent>,
    progress: ProgressStore,
    task: JoinHandle<MatchEngine>,
}

impl SessionHandle {
    async fn send(&self, command: SessionCommand) -> Result<SessionSnapshot, DriverError> {
        let (reply, rx) = oneshot::channel();
        self.requests
            .send(Request { command, reply })
            .await
            .map_err(|_| DriverError::Closed)?;
        rx.await.map_err(|_| DriverError::Closed)
    }

    /// Start `level_id`.
    pub async fn start_level(&self, level_id: LevelId) -> Result<SessionSnapshot, DriverError> {
        self.send(SessionCommand::StartLevel(level_id)).await
    }

    /// Select `card_id`.
    pub async fn select_card(&self, card_id: CardId) -> Result<SessionSnapshot, DriverError> {
        self.send(SessionCommand::SelectCard(card_id)).await
    }

    /// Replay the current level.
    pub async fn replay_current_level(&self) -> Result<SessionSnapshot, DriverError> {
        self.send(SessionCommand::ReplayCurrentLevel).await
    }

    /// Advance to the next level.
    pub async fn advance_to_next_level(&self) -> Result<SessionSnapshot, DriverError> {
        self.send(SessionCommand::AdvanceToNextLevel).await
    }

    /// Return to level selection.
    pub async fn back_to_level_selection(&self) -> Result<SessionSnapshot, DriverError> {
        self.send(SessionCommand::BackToLevelSelection).await
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Watch receiver for snapshots.
    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// Subscribe to session events.
    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Subscribe to medal-counter change notifications.
    pub fn subscribe_medal_changes(&self) -> broadcast::Receiver<MedalCountsChanged> {
        self.progress.subscribe()
    }

    /// Stop the driver and take back the engine.
    pub async fn shutdown(self) -> Result<MatchEngine, DriverError> {
        // Already-stopped drivers still hand the engine back through the join
        let _ = self.send(SessionCommand::Shutdown).await;
        self.task.await.map_err(|_| DriverError::Closed)
    }
}

/// The single-task event loop around an engine.
pub struct SessionDriver {
    engine: MatchEngine,
    requests: mpsc::Receiver<Request>,
    snapshots: watch::Sender<SessionSnapshot>,
    events: broadcast::Sender<SessionEvent>,
    ticker: Option<Interval>,
    ticker_generation: Option<u64>,
    pending_flip: Option<PendingFlip>,
}

impl SessionDriver {
    /// Spawn a driver for `engine` on the current runtime.
    pub fn spawn(engine: MatchEngine) -> SessionHandle {
        let (request_tx, requests) = mpsc::channel(64);
        let (snapshots, snapshot_rx) = watch::channel(engine.snapshot());
        let (events, _) = broadcast::channel(256);
        let progress = engine.progress().clone();

        let driver = SessionDriver {
            engine,
            requests,
            snapshots,
            events: events.clone(),
            ticker: None,
            ticker_generation: None,
            pending_flip: None,
        };
        let task = tokio::spawn(driver.run());

        SessionHandle {
            requests: request_tx,
            snapshots: snapshot_rx,
            events,
            progress,
            task,
        }
    }

    async fn run(mut self) -> MatchEngine {
        info!("Session driver started");

        loop {
            let step = tokio::select! {
                request = self.requests.recv() => Step::Request(request),
                _ = next_tick(self.ticker.as_mut()) => Step::Tick,
                flip = next_flip(&mut self.pending_flip) => Step::FlipBack(flip),
            };

            match step {
                Step::Request(None) => break,
                Step::Request(Some(Request { command: SessionCommand::Shutdown, reply })) => {
                    let _ = reply.send(self.engine.snapshot());
                    break;
                }
                Step::Request(Some(Request { command, reply })) => {
                    self.apply(command);
                    let snapshot = self.publish();
                    // Caller may have gone away
                    let _ = reply.send(snapshot);
                }
                Step::Tick => {
                    self.engine.tick();
                    self.publish();
                }
                Step::FlipBack(flip) => {
                    self.pending_flip = None;
                    self.engine.resolve_mismatch(flip);
                    self.publish();
                }
            }
        }

        // Tear down timers with the loop
        self.ticker = None;
        self.pending_flip = None;
        info!("Session driver stopped");
        self.engine
    }

    fn apply(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::StartLevel(level_id) => {
                self.engine.start_level(level_id);
            }
            SessionCommand::SelectCard(card_id) => {
                if let SelectOutcome::Mismatched(flip) = self.engine.select_card(card_id) {
                    self.pending_flip = Some(PendingFlip {
                        sleep: Box::pin(sleep(self.engine.config().mismatch_delay)),
                        flip,
                    });
                }
            }
            SessionCommand::ReplayCurrentLevel => {
                self.engine.replay_current_level();
            }
            SessionCommand::AdvanceToNextLevel => {
                self.engine.advance_to_next_level();
            }
            SessionCommand::BackToLevelSelection => {
                self.engine.back_to_level_selection();
            }
            SessionCommand::Shutdown => {}
        }
    }

    /// Reconcile timers with engine state, forward events, publish a snapshot.
    fn publish(&mut self) -> SessionSnapshot {
        self.sync_ticker();

        for event in self.engine.take_events() {
            debug!(generation = event.generation, "Session event: {:?}", event.data);
            // No subscribers is fine
            let _ = self.events.send(event);
        }

        let snapshot = self.engine.snapshot();
        self.snapshots.send_replace(snapshot.clone());
        snapshot
    }

    /// The clock runs only while playing and restarts with every new round.
    fn sync_ticker(&mut self) {
        if !self.engine.state().is_playing() {
            self.ticker = None;
            self.ticker_generation = None;
            return;
        }

        let generation = self.engine.generation();
        if self.ticker_generation == Some(generation) {
            return;
        }

        let period = self.engine.config().tick_interval;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        self.ticker = Some(ticker);
        self.ticker_generation = Some(generation);
    }
}

async fn next_tick(ticker: Option<&mut Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => pending::<()>().await,
    }
}

async fn next_flip(flip: &mut Option<PendingFlip>) -> FlipBack {
    match flip {
        Some(pending_flip) => {
            pending_flip.sleep.as_mut().await;
            pending_flip.flip
        }
        None => pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::core::store::MemoryStore;
    use crate::game::engine::{EngineConfig, ROUND_TIME_SECS};
    use crate::game::medal::MedalTier;
    use crate::game::state::GameState;

    fn spawn_driver(store: &MemoryStore) -> SessionHandle {
        let config = EngineConfig {
            seed: Some(77),
            ..Default::default()
        };
        SessionDriver::spawn(MatchEngine::new(store.shared(), config))
    }

    fn mismatch(snapshot: &SessionSnapshot) -> (CardId, CardId) {
        let a = &snapshot.cards[0];
        let b = snapshot.cards.iter().find(|c| c.content != a.content).unwrap();
        (a.id, b.id)
    }

    fn pairs(snapshot: &SessionSnapshot) -> Vec<(CardId, CardId)> {
        let mut out = Vec::new();
        for (i, a) in snapshot.cards.iter().enumerate() {
            if let Some(b) = snapshot.cards[i + 1..].iter().find(|b| b.content == a.content) {
                out.push((a.id, b.id));
            }
        }
        out
    }

    #[tokio::test(start_paused = true)]
    async fn test_clock_runs_out() {
        let store = MemoryStore::new();
        let handle = spawn_driver(&store);

        let snapshot = handle.start_level(1).await.unwrap();
        assert_eq!(snapshot.game_state, GameState::Playing);

        let mut watch = handle.watch();
        let done = watch
            .wait_for(|s| s.game_state.completion().is_some())
            .await
            .unwrap()
            .clone();

        assert_eq!(done.game_state, GameState::Completed { success: false });
        assert_eq!(done.earned_medal, MedalTier::None);
        assert_eq!(done.time_remaining, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_stop_after_leaving_playing() {
        let store = MemoryStore::new();
        let handle = spawn_driver(&store);

        handle.start_level(1).await.unwrap();
        tokio::time::sleep(Duration::from_millis(3500)).await;
        let snapshot = handle.back_to_level_selection().await.unwrap();
        assert_eq!(snapshot.game_state, GameState::LevelSelection);

        tokio::time::sleep(Duration::from_secs(10)).await;
        let snapshot = handle.snapshot();
        assert_eq!(snapshot.time_remaining, ROUND_TIME_SECS);
        assert_eq!(snapshot.game_state, GameState::LevelSelection);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mismatch_flips_back_after_delay() {
        let store = MemoryStore::new();
        let handle = spawn_driver(&store);

        let snapshot = handle.start_level(1).await.unwrap();
        let (a, b) = mismatch(&snapshot);
        handle.select_card(a).await.unwrap();
        let snapshot = handle.select_card(b).await.unwrap();
        assert!(snapshot.board_locked);

        // Selections are refused while the pair is showing
        let (c, _) = pairs(&snapshot)[0];
        let refused = handle.select_card(c).await.unwrap();
        assert_eq!(refused.cards.iter().filter(|card| card.is_face_up).count(), 2);

        tokio::time::sleep(Duration::from_millis(800)).await;
        let snapshot = handle.snapshot();
        assert!(!snapshot.board_locked);
        assert!(snapshot.cards.iter().all(|card| !card.is_face_up));
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_round_ignores_stale_flip_back() {
        let store = MemoryStore::new();
        let handle = spawn_driver(&store);

        let snapshot = handle.start_level(1).await.unwrap();
        let (a, b) = mismatch(&snapshot);
        handle.select_card(a).await.unwrap();
        handle.select_card(b).await.unwrap();

        let fresh = handle.replay_current_level().await.unwrap();
        let (c, _) = pairs(&fresh)[0];
        handle.select_card(c).await.unwrap();

        tokio::time::sleep(Duration::from_millis(800)).await;
        let snapshot = handle.snapshot();
        assert_eq!(snapshot.generation, fresh.generation);
        assert_eq!(snapshot.cards.iter().filter(|card| card.is_face_up).count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_win_emits_medal_change() {
        let store = MemoryStore::new();
        let handle = spawn_driver(&store);
        let mut medal_changes = handle.subscribe_medal_changes();

        let snapshot = handle.start_level(1).await.unwrap();
        let mut last = snapshot.clone();
        for (a, b) in pairs(&snapshot) {
            handle.select_card(a).await.unwrap();
            last = handle.select_card(b).await.unwrap();
        }

        assert_eq!(last.game_state, GameState::Completed { success: true });
        assert_eq!(last.earned_medal, MedalTier::Diamond);
        assert!(last.next_level_available);
        assert_eq!(medal_changes.recv().await.unwrap(), MedalCountsChanged);

        let advanced = handle.advance_to_next_level().await.unwrap();
        assert_eq!(advanced.current_level, Some(2));
    }

    #[tokio::test]
    async fn test_shutdown_returns_engine() {
        let store = MemoryStore::new();
        let handle = spawn_driver(&store);
        handle.start_level(1).await.unwrap();

        let engine = handle.shutdown().await.unwrap();
        assert_eq!(engine.current_level_number(), Some(1));
    }
}
