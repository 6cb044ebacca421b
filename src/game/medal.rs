//! Medal Tiers
//!
//! Reward tier earned from the seconds left on the clock when a level is
//! cleared. Variants are declared in rank order so the derived `Ord` is the
//! rank order.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Deserialize};

/// Remaining seconds needed for each earnable tier.
pub const DIAMOND_THRESHOLD: u32 = 25;
/// Remaining seconds needed for gold.
pub const GOLD_THRESHOLD: u32 = 20;
/// Remaining seconds needed for silver.
pub const SILVER_THRESHOLD: u32 = 15;
/// Remaining seconds needed for bronze.
pub const BRONZE_THRESHOLD: u32 = 10;

/// Medal tier (rank 0-4).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
#[derive(Default)]
pub enum MedalTier {
    /// No medal
    #[default]
    None = 0,
    /// Rank 1
    Bronze = 1,
    /// Rank 2
    Silver = 2,
    /// Rank 3
    Gold = 3,
    /// Rank 4
    Diamond = 4,
}

impl MedalTier {
    /// Every tier, lowest first.
    pub const ALL: [MedalTier; 5] = [
        MedalTier::None,
        MedalTier::Bronze,
        MedalTier::Silver,
        MedalTier::Gold,
        MedalTier::Diamond,
    ];

    /// Tiers that can actually be earned and counted.
    pub const EARNABLE: [MedalTier; 4] = [
        MedalTier::Bronze,
        MedalTier::Silver,
        MedalTier::Gold,
        MedalTier::Diamond,
    ];

    /// Map remaining seconds at completion to a tier.
    pub fn for_remaining(remaining_secs: u32) -> Self {
        match remaining_secs {
            s if s >= DIAMOND_THRESHOLD => MedalTier::Diamond,
            s if s >= GOLD_THRESHOLD => MedalTier::Gold,
            s if s >= SILVER_THRESHOLD => MedalTier::Silver,
            s if s >= BRONZE_THRESHOLD => MedalTier::Bronze,
            _ => MedalTier::None,
        }
    }

    /// Numeric rank.
    pub fn rank(self) -> u8 {
        self as u8
    }

    /// True for every tier except `None`.
    pub fn is_earned(self) -> bool {
        self != MedalTier::None
    }

    /// Persisted key name.
    pub fn name(self) -> &'static str {
        match self {
            MedalTier::None => "none",
            MedalTier::Bronze => "bronze",
            MedalTier::Silver => "silver",
            MedalTier::Gold => "gold",
            MedalTier::Diamond => "diamond",
        }
    }

    /// Label shown to players.
    pub fn display_name(self) -> &'static str {
        match self {
            MedalTier::None => "No medal",
            MedalTier::Bronze => "Bronze",
            MedalTier::Silver => "Silver",
            MedalTier::Gold => "Gold",
            MedalTier::Diamond => "Brilliant",
        }
    }

    /// Image asset, if the tier has one.
    pub fn asset_name(self) -> Option<&'static str> {
        match self {
            MedalTier::None => None,
            MedalTier::Bronze => Some("bronzeMedal"),
            MedalTier::Silver => Some("silverMedal"),
            MedalTier::Gold => Some("goldMedal"),
            MedalTier::Diamond => Some("diamondMedal"),
        }
    }
}

impl fmt::Display for MedalTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown medal name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown medal tier: {0}")]
pub struct UnknownMedal(pub String);

impl FromStr for MedalTier {
    type Err = UnknownMedal;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MedalTier::ALL
            .into_iter()
            .find(|tier| tier.name() == s)
            .ok_or_else(|| UnknownMedal(s.to_string()))
    }
}

/// Tier earned for `remaining_secs` left on the clock.
pub fn medal_for(remaining_secs: u32) -> MedalTier {
    MedalTier::for_remaining(remaining_secs)
}
