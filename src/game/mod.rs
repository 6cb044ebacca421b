//! Game Logic Module
//!
//! The memory-match session engine. Synchronous and deterministic for a
//! given seed; timers are driven from `runtime`.
//!
//! ## Module Structure
//!
//! - `medal`: Medal tiers and the remaining-time breakpoints
//! - `level`: Level records, unlock and upgrade rules
//! - `deck`: Cards and deck dealing
//! - `state`: Game state, flip-back tokens, snapshots
//! - `events`: Session events for logging and observers
//! - `engine`: The state machine
//! - `progress`: Durable level progress and medal counters
//! - `achievements`: Medal-count summary observer
//! - `wallet`: Coin balance and quiz tally

pub mod medal;
pub mod level;
pub mod deck;
pub mod state;
pub mod events;
pub mod engine;
pub mod progress;
pub mod achievements;
pub mod wallet;

// Re-export key types
pub use medal::{MedalTier, medal_for};
pub use level::{LevelBoard, LevelId, LevelProgress, LEVEL_COUNT};
pub use deck::{Card, CardId};
pub use state::{GameState, FlipBack, SelectOutcome, SessionSnapshot};
pub use events::{SessionEvent, SessionEventData};
pub use engine::{MatchEngine, EngineConfig};
pub use progress::{MedalCounts, MedalCountsChanged, ProgressStore};
pub use achievements::AchievementsSummary;
pub use wallet::{CoinWallet, QuizTally};
