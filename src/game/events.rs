//! Session Events
//!
//! Every state change the engine makes is also recorded as an event. The
//! driver drains them after each command for logging and observers.

use serde::Serialize;

use crate::game::deck::CardId;
use crate::game::level::LevelId;
use crate::game::medal::MedalTier;

/// Session event data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum SessionEventData {
    /// A round began
    LevelStarted {
        /// Level being played
        level_id: LevelId,
        /// Seed the deck was dealt from
        seed: u64,
    },

    /// A card was turned face up
    CardFlipped {
        /// Flipped card
        card_id: CardId,
    },

    /// Two face-up cards matched
    PairMatched {
        /// First card of the pair
        first: CardId,
        /// Second card of the pair
        second: CardId,
    },

    /// Two face-up cards differ; the board is locked until they are hidden
    PairMismatched {
        /// First card of the pair
        first: CardId,
        /// Second card of the pair
        second: CardId,
    },

    /// A mismatched pair was turned back down
    PairHidden {
        /// First card of the pair
        first: CardId,
        /// Second card of the pair
        second: CardId,
    },

    /// One second elapsed
    TimeTick {
        /// Seconds left
        remaining: u32,
    },

    /// The round ended
    LevelCompleted {
        /// Level that ended
        level_id: LevelId,
        /// All pairs matched in time
        success: bool,
        /// Seconds left at the end
        remaining: u32,
        /// Medal earned (none on failure)
        medal: MedalTier,
        /// The medal beat the level's previous best
        medal_upgraded: bool,
        /// Level newly unlocked by this round
        unlocked: Option<LevelId>,
    },

    /// Back on the level list
    ReturnedToSelection,
}

/// An event tagged with the round generation it belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SessionEvent {
    /// Round generation when the event occurred
    pub generation: u64,

    /// Event data
    pub data: SessionEventData,
}

impl SessionEvent {
    /// Create a new event.
    pub fn new(generation: u64, data: SessionEventData) -> Self {
        Self { generation, data }
    }

    /// Whether this event ends a round.
    pub fn is_completion(&self) -> bool {
        matches!(self.data, SessionEventData::LevelCompleted { .. })
    }
}
