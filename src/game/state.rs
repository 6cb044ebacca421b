//! Game State Definitions

use serde::Serialize;

use crate::game::deck::Card;
use crate::game::level::{LevelId, LevelProgress};
use crate::game::medal::MedalTier;

/// Which screen of the session the player is on.
///
/// Exactly one is active; only `Playing` accepts card selections and ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[derive(Default)]
pub enum GameState {
    /// Choosing a level
    #[default]
    LevelSelection,
    /// Round in progress
    Playing,
    /// Round over
    Completed {
        /// Whether every pair was found in time
        success: bool,
    },
}

impl GameState {
    /// Round in progress.
    pub fn is_playing(&self) -> bool {
        matches!(self, GameState::Playing)
    }

    /// Outcome of the finished round, if any.
    pub fn completion(&self) -> Option<bool> {
        match self {
            GameState::Completed { success } => Some(*success),
            GameState::LevelSelection | GameState::Playing => None,
        }
    }
}

/// Deferred action that turns a mismatched pair back down.
///
/// Bound to the round generation that produced it; once a new round starts
/// (or the session returns to selection) the token is stale and applying it
/// does nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlipBack {
    /// Round generation that scheduled the flip.
    pub generation: u64,
    /// Board indices of the mismatched pair.
    pub indices: [usize; 2],
}

/// Result of a card selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectOutcome {
    /// Selection rejected (wrong state, locked board, unknown or face-up card).
    Ignored,
    /// First card of a pair turned up.
    Flipped,
    /// Pair matched.
    Matched {
        /// This match finished the board.
        completed: bool,
    },
    /// Pair mismatched; schedule the flip-back.
    Mismatched(FlipBack),
}

/// Immutable view of a session, published to observers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// Current game state.
    pub game_state: GameState,
    /// Cards on the board (empty outside a round).
    pub cards: Vec<Card>,
    /// Seconds left on the clock.
    pub time_remaining: u32,
    /// Seconds left when the last round ended.
    pub last_time_remaining: u32,
    /// Medal from the last round.
    pub earned_medal: MedalTier,
    /// Board refuses selections.
    pub board_locked: bool,
    /// Level being played or just finished.
    pub current_level: Option<LevelId>,
    /// Whether the following level can be started.
    pub next_level_available: bool,
    /// All level records.
    pub levels: Vec<LevelProgress>,
    /// Round generation.
    pub generation: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_accessor() {
        assert_eq!(GameState::LevelSelection.completion(), None);
        assert_eq!(GameState::Playing.completion(), None);
        assert_eq!(GameState::Completed { success: false }.completion(), Some(false));
        assert!(GameState::Playing.is_playing());
        assert_eq!(GameState::default(), GameState::LevelSelection);
    }
}
