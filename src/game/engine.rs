//! Match Session Engine
//!
//! The memory-match state machine. Every command is synchronous and runs to
//! completion; timers live outside (see `runtime::driver`) and call back in
//! through [`MatchEngine::tick`] and [`MatchEngine::resolve_mismatch`].
//!
//! ```text
//!                start_level(unlocked)
//!  LevelSelection ─────────────────────▶ Playing ──all matched──▶ Completed(true)
//!        ▲                                  │  └──time runs out──▶ Completed(false)
//!        └────── back_to_level_selection ───┴──────────────────────────┘
//! ```
//!
//! Invalid commands (locked level, wrong state, face-up card) are ignored
//! without error.

use std::time::Duration;

use tracing::{debug, info};

use crate::core::rng::{derive_round_seed, entropy_seed, DeterministicRng};
use crate::core::store::SharedStore;
use crate::game::deck::{self, Card, CardId, PAIRS_PER_ROUND};
use crate::game::events::{SessionEvent, SessionEventData};
use crate::game::level::{LevelBoard, LevelId, LevelProgress};
use crate::game::medal::{medal_for, MedalTier};
use crate::game::progress::{MedalCounts, MedalCountsChanged, ProgressStore};
use crate::game::state::{FlipBack, GameState, SelectOutcome, SessionSnapshot};

/// Round length in seconds.
pub const ROUND_TIME_SECS: u32 = 40;

/// How long a mismatched pair stays visible.
pub const MISMATCH_DELAY: Duration = Duration::from_millis(700);

/// Configuration for the session engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Countdown length per round (seconds).
    pub total_time_secs: u32,
    /// Symbol pairs dealt per round.
    pub pairs_per_round: usize,
    /// Delay before a mismatched pair flips back.
    pub mismatch_delay: Duration,
    /// Clock resolution.
    pub tick_interval: Duration,
    /// Fixed base seed; `None` draws fresh entropy.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            total_time_secs: ROUND_TIME_SECS,
            pairs_per_round: PAIRS_PER_ROUND,
            mismatch_delay: MISMATCH_DELAY,
            tick_interval: Duration::from_secs(1),
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            seed: std::env::var("ROKI_SEED").ok().and_then(|v| v.parse().ok()),
            ..Default::default()
        }
    }
}

/// The memory-match session.
pub struct MatchEngine {
    config: EngineConfig,
    progress: ProgressStore,
    levels: LevelBoard,
    medal_counts: MedalCounts,
    base_seed: u64,

    state: GameState,
    /// Monotonic round id; bumped whenever the board is replaced or cleared.
    generation: u64,
    current_level: Option<usize>,
    cards: Vec<Card>,
    /// Board indices of face-up cards awaiting evaluation.
    pending: Vec<usize>,
    board_locked: bool,
    time_remaining: u32,
    earned_medal: MedalTier,
    last_time_remaining: u32,

    events: Vec<SessionEvent>,
}

impl MatchEngine {
    /// Create an engine, loading progress and counters from `store`.
    pub fn new(store: SharedStore, config: EngineConfig) -> Self {
        let progress = ProgressStore::new(store);
        let levels = progress.load_levels();
        let medal_counts = progress.load_medal_counts();
        let base_seed = config.seed.unwrap_or_else(entropy_seed);
        let time_remaining = config.total_time_secs;

        Self {
            config,
            progress,
            levels,
            medal_counts,
            base_seed,
            state: GameState::LevelSelection,
            generation: 0,
            current_level: None,
            cards: Vec::new(),
            pending: Vec::new(),
            board_locked: false,
            time_remaining,
            earned_medal: MedalTier::None,
            last_time_remaining: 0,
            events: Vec::new(),
        }
    }

    // =========================================================================
    // COMMANDS
    // =========================================================================

    /// Start level `level_id` if it exists and is unlocked.
    ///
    /// Accepted from any state. Returns whether a round started.
    pub fn start_level(&mut self, level_id: LevelId) -> bool {
        let Some(index) = self.levels.index_of(level_id) else {
            debug!("Ignoring start of unknown level {}", level_id);
            return false;
        };
        if !self.levels.is_unlocked(level_id) {
            debug!("Ignoring start of locked level {}", level_id);
            return false;
        }

        self.generation += 1;
        let seed = derive_round_seed(self.base_seed, level_id, self.generation);
        let mut rng = DeterministicRng::new(seed);

        self.current_level = Some(index);
        self.cards = deck::deal(&mut rng, self.config.pairs_per_round);
        self.time_remaining = self.config.total_time_secs;
        self.earned_medal = MedalTier::None;
        self.last_time_remaining = 0;
        self.pending.clear();
        self.board_locked = false;
        self.state = GameState::Playing;

        info!(
            "Level {} started (generation {}, seed {})",
            level_id,
            self.generation,
            hex::encode(seed.to_be_bytes())
        );
        self.push_event(SessionEventData::LevelStarted { level_id, seed });
        true
    }

    /// Turn card `card_id` face up.
    pub fn select_card(&mut self, card_id: CardId) -> SelectOutcome {
        if !self.state.is_playing() || self.board_locked {
            return SelectOutcome::Ignored;
        }
        let Some(index) = self.cards.iter().position(|c| c.id == card_id) else {
            return SelectOutcome::Ignored;
        };
        if !self.cards[index].is_selectable() {
            return SelectOutcome::Ignored;
        }

        self.cards[index].is_face_up = true;
        self.pending.push(index);
        self.push_event(SessionEventData::CardFlipped { card_id });

        if self.pending.len() < 2 {
            return SelectOutcome::Flipped;
        }
        self.evaluate_pair()
    }

    /// Advance the clock by one second.
    ///
    /// Returns false when not playing (the tick is dropped).
    pub fn tick(&mut self) -> bool {
        if !self.state.is_playing() {
            return false;
        }

        if self.time_remaining == 0 {
            self.complete_level(false);
            return true;
        }

        self.time_remaining -= 1;
        self.push_event(SessionEventData::TimeTick {
            remaining: self.time_remaining,
        });

        if self.time_remaining == 0 {
            self.complete_level(false);
        }
        true
    }

    /// Apply a scheduled flip-back. Stale tokens are ignored.
    pub fn resolve_mismatch(&mut self, flip: FlipBack) -> bool {
        if flip.generation != self.generation {
            debug!(
                "Dropping stale flip-back from generation {} (now {})",
                flip.generation, self.generation
            );
            return false;
        }

        let [first, second] = flip.indices;
        let (Some(a), Some(b)) = (self.cards.get(first), self.cards.get(second)) else {
            return false;
        };
        let (first_id, second_id) = (a.id, b.id);

        for index in flip.indices {
            self.cards[index].is_face_up = false;
        }
        self.pending.clear();
        // A round that ended while the pair was showing stays locked
        if self.state.is_playing() {
            self.board_locked = false;
        }

        self.push_event(SessionEventData::PairHidden {
            first: first_id,
            second: second_id,
        });
        true
    }

    /// Restart the current level, or return to selection if there is none.
    pub fn replay_current_level(&mut self) -> bool {
        let Some(level_id) = self.current_level_number() else {
            self.back_to_level_selection();
            return false;
        };
        self.start_level(level_id)
    }

    /// Start the next level after a successful round.
    pub fn advance_to_next_level(&mut self) -> bool {
        if self.state != (GameState::Completed { success: true }) {
            return false;
        }
        let Some(index) = self.current_level else {
            return false;
        };
        let Some(next) = self.levels.at(index + 1).filter(|l| l.is_unlocked) else {
            return false;
        };
        let next_id = next.id;
        self.start_level(next_id)
    }

    /// Abandon any round and show the level list.
    pub fn back_to_level_selection(&mut self) {
        // Invalidate any pending flip-back for the discarded board
        self.generation += 1;
        self.state = GameState::LevelSelection;
        self.cards.clear();
        self.current_level = None;
        self.pending.clear();
        self.time_remaining = self.config.total_time_secs;
        self.earned_medal = MedalTier::None;
        self.last_time_remaining = 0;
        self.board_locked = false;

        self.push_event(SessionEventData::ReturnedToSelection);
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current game state.
    pub fn state(&self) -> GameState {
        self.state
    }

    /// Current round generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Cards on the board.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// All level records.
    pub fn levels(&self) -> &[LevelProgress] {
        self.levels.levels()
    }

    /// Medal counters.
    pub fn medal_counts(&self) -> &MedalCounts {
        &self.medal_counts
    }

    /// Seconds left on the clock.
    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    /// Seconds left when the last round ended.
    pub fn last_time_remaining(&self) -> u32 {
        self.last_time_remaining
    }

    /// Medal from the last round.
    pub fn earned_medal(&self) -> MedalTier {
        self.earned_medal
    }

    /// Whether selections are currently refused.
    pub fn is_board_locked(&self) -> bool {
        self.board_locked
    }

    /// Id of the level being played or just finished.
    pub fn current_level_number(&self) -> Option<LevelId> {
        self.current_level.and_then(|i| self.levels.at(i)).map(|l| l.id)
    }

    /// Whether the level after the current one is unlocked.
    pub fn next_level_is_available(&self) -> bool {
        self.current_level
            .is_some_and(|i| self.levels.next_is_unlocked(i))
    }

    /// Whether the last round ended in success.
    pub fn last_completion_was_success(&self) -> bool {
        self.state.completion().unwrap_or(false)
    }

    /// Persistence handle shared with observers.
    pub fn progress(&self) -> &ProgressStore {
        &self.progress
    }

    /// Subscribe to medal-counter change notifications.
    pub fn subscribe_medal_changes(&self) -> tokio::sync::broadcast::Receiver<MedalCountsChanged> {
        self.progress.subscribe()
    }

    /// Drain recorded events.
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Build an observer snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            game_state: self.state,
            cards: self.cards.clone(),
            time_remaining: self.time_remaining,
            last_time_remaining: self.last_time_remaining,
            earned_medal: self.earned_medal,
            board_locked: self.board_locked,
            current_level: self.current_level_number(),
            next_level_available: self.next_level_is_available(),
            levels: self.levels.levels().to_vec(),
            generation: self.generation,
        }
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn push_event(&mut self, data: SessionEventData) {
        self.events.push(SessionEvent::new(self.generation, data));
    }

    fn evaluate_pair(&mut self) -> SelectOutcome {
        let (first, second) = (self.pending[0], self.pending[1]);
        let (first_id, second_id) = (self.cards[first].id, self.cards[second].id);

        if self.cards[first].content == self.cards[second].content {
            self.cards[first].is_matched = true;
            self.cards[second].is_matched = true;
            self.pending.clear();
            self.push_event(SessionEventData::PairMatched {
                first: first_id,
                second: second_id,
            });
            let completed = self.check_for_completion();
            return SelectOutcome::Matched { completed };
        }

        self.board_locked = true;
        self.push_event(SessionEventData::PairMismatched {
            first: first_id,
            second: second_id,
        });
        SelectOutcome::Mismatched(FlipBack {
            generation: self.generation,
            indices: [first, second],
        })
    }

    fn check_for_completion(&mut self) -> bool {
        if self.cards.iter().all(|c| c.is_matched) {
            self.complete_level(true);
            return true;
        }
        false
    }

    fn complete_level(&mut self, success: bool) {
        if !self.state.is_playing() {
            return;
        }

        self.board_locked = true;
        self.last_time_remaining = self.time_remaining;

        let mut unlocked = None;
        let mut medal_upgraded = false;
        if success {
            self.earned_medal = medal_for(self.time_remaining);
            if let Some(index) = self.current_level {
                let outcome = self.levels.record_success(index, self.earned_medal);
                unlocked = outcome.unlocked;
                medal_upgraded = outcome.medal_upgraded;
                self.progress.save_levels(&self.levels);
            }
            if self.medal_counts.increment(self.earned_medal) {
                self.progress.save_medal_counts(&self.medal_counts);
            }
        } else {
            self.earned_medal = MedalTier::None;
        }

        self.state = GameState::Completed { success };

        let level_id = self.current_level_number().unwrap_or_default();
        info!(
            "Level {} completed: success={} remaining={}s medal={}",
            level_id, success, self.last_time_remaining, self.earned_medal
        );
        self.push_event(SessionEventData::LevelCompleted {
            level_id,
            success,
            remaining: self.last_time_remaining,
            medal: self.earned_medal,
            medal_upgraded,
            unlocked,
        });
    }
}

// =============================================================================
// TESTS
// =============================================================================
