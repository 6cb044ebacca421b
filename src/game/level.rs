//! Level Progress
//!
//! The ten durable level records and the rules for unlocking and medal
//! upgrades. Persisted as a JSON list of exactly [`LEVEL_COUNT`] records.

use serde::{Serialize, Deserialize};

use crate::core::codec::CodecError;
use crate::game::medal::MedalTier;

/// Number of levels in the game.
pub const LEVEL_COUNT: usize = 10;

/// Level identifier (1-based).
pub type LevelId = u8;

/// Progress record for one level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelProgress {
    /// Level id, 1..=10.
    pub id: LevelId,
    /// Whether the level can be started.
    pub is_unlocked: bool,
    /// Best medal ever earned on this level.
    pub best_medal: MedalTier,
}

impl LevelProgress {
    /// Fresh record: only level 1 starts unlocked.
    pub fn fresh(id: LevelId) -> Self {
        Self {
            id,
            is_unlocked: id == 1,
            best_medal: MedalTier::None,
        }
    }
}

/// What changed when a level was cleared.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SuccessOutcome {
    /// Best medal was raised.
    pub medal_upgraded: bool,
    /// Id of the level unlocked by this success, if any.
    pub unlocked: Option<LevelId>,
}

/// Ordered set of all level records.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelBoard {
    levels: Vec<LevelProgress>,
}

impl Default for LevelBoard {
    fn default() -> Self {
        Self {
            levels: (1..=LEVEL_COUNT as LevelId).map(LevelProgress::fresh).collect(),
        }
    }
}

impl LevelBoard {
    /// Accept a decoded list only if it has exactly [`LEVEL_COUNT`] entries.
    pub fn from_stored(levels: Vec<LevelProgress>) -> Result<Self, CodecError> {
        if levels.len() != LEVEL_COUNT {
            return Err(CodecError::Shape(format!(
                "expected {} levels, found {}",
                LEVEL_COUNT,
                levels.len()
            )));
        }
        Ok(Self { levels })
    }

    /// All records in order.
    pub fn levels(&self) -> &[LevelProgress] {
        &self.levels
    }

    /// Position of level `id`.
    pub fn index_of(&self, id: LevelId) -> Option<usize> {
        self.levels.iter().position(|l| l.id == id)
    }

    /// Record at `index`.
    pub fn at(&self, index: usize) -> Option<&LevelProgress> {
        self.levels.get(index)
    }

    /// Record for level `id`.
    pub fn get(&self, id: LevelId) -> Option<&LevelProgress> {
        self.levels.iter().find(|l| l.id == id)
    }

    /// Whether level `id` exists and is unlocked.
    pub fn is_unlocked(&self, id: LevelId) -> bool {
        self.get(id).is_some_and(|l| l.is_unlocked)
    }

    /// Ids of every unlocked level.
    pub fn unlocked_ids(&self) -> Vec<LevelId> {
        self.levels.iter().filter(|l| l.is_unlocked).map(|l| l.id).collect()
    }

    /// Whether the level after `index` exists and is unlocked.
    pub fn next_is_unlocked(&self, index: usize) -> bool {
        self.levels.get(index + 1).is_some_and(|l| l.is_unlocked)
    }

    /// Apply a successful clear of the level at `index`.
    ///
    /// The best medal only moves up; the following level is unlocked if
    /// there is one.
    pub fn record_success(&mut self, index: usize, medal: MedalTier) -> SuccessOutcome {
        let mut outcome = SuccessOutcome::default();

        let Some(level) = self.levels.get_mut(index) else {
            return outcome;
        };
        if medal > level.best_medal {
            level.best_medal = medal;
            outcome.medal_upgraded = true;
        }

        if let Some(next) = self.levels.get_mut(index + 1) {
            if !next.is_unlocked {
                next.is_unlocked = true;
                outcome.unlocked = Some(next.id);
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_only_first_unlocked() {
        let board = LevelBoard::default();
        assert_eq!(board.levels().len(), LEVEL_COUNT);
        assert_eq!(board.unlocked_ids(), vec![1]);
        assert!(board.levels().iter().all(|l| l.best_medal == MedalTier::None));
    }

    #[test]
    fn test_success_unlocks_next() {
        let mut board = LevelBoard::default();
        let outcome = board.record_success(0, MedalTier::Gold);

        assert!(outcome.medal_upgraded);
        assert_eq!(outcome.unlocked, Some(2));
        assert_eq!(board.unlocked_ids(), vec![1, 2]);
    }

    #[test]
    fn test_last_level_unlocks_nothing() {
        let mut board = LevelBoard::default();
        let outcome = board.record_success(LEVEL_COUNT - 1, MedalTier::Bronze);
        assert_eq!(outcome.unlocked, None);
    }

    #[test]
    fn test_wrong_shape_rejected() {
        let short: Vec<_> = (1..=9).map(LevelProgress::fresh).collect();
        assert!(matches!(LevelBoard::from_stored(short), Err(CodecError::Shape(_))));
    }

    #[test]
    fn test_persisted_field_names() {
        let json = serde_json::to_string(&LevelProgress::fresh(1)).unwrap();
        assert_eq!(json, r#"{"id":1,"isUnlocked":true,"bestMedal":"none"}"#);
    }

    proptest! {
        #[test]
        fn best_medal_never_decreases(ranks in proptest::collection::vec(0usize..5, 1..30)) {
            let mut board = LevelBoard::default();
            let mut best = MedalTier::None;
            for r in ranks {
                let medal = MedalTier::ALL[r];
                board.record_success(0, medal);
                let now = board.at(0).unwrap().best_medal;
                prop_assert!(now >= best);
                best = now;
            }
        }
    }
}
