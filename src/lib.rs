//! # MegaRoki
//!
//! Session and progress engine for the MegaRoki memory-match game, plus the
//! aggregator behind its themed artwork gallery.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         MEGAROKI                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/             - Primitives                              │
//! │  ├── rng.rs        - Seeded Xorshift128+ for deck dealing    │
//! │  ├── store.rs      - Key-value persistence (memory, files)   │
//! │  └── codec.rs      - JSON blobs over the store               │
//! │                                                              │
//! │  game/             - Rules (synchronous)                     │
//! │  ├── medal.rs      - Medal tiers and time breakpoints        │
//! │  ├── level.rs      - Level unlocks and best medals           │
//! │  ├── deck.rs       - Cards and dealing                       │
//! │  ├── engine.rs     - Round state machine                     │
//! │  ├── progress.rs   - Durable progress, change notifications  │
//! │  ├── achievements.rs - Medal summary observer                │
//! │  └── wallet.rs     - Coins and quiz tally                    │
//! │                                                              │
//! │  runtime/          - Async (wall-clock timers)               │
//! │  └── driver.rs     - Countdown and flip-back actor           │
//! │                                                              │
//! │  gallery/          - Networked (collection API)              │
//! │  ├── source.rs     - Search and detail lookups               │
//! │  ├── merge.rs      - Dedup and reordering                    │
//! │  └── aggregator.rs - Two-phase concurrent load               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism
//!
//! With a fixed seed, `game/` deals identical decks and reaches identical
//! states for identical command sequences. Time only enters through
//! [`MatchEngine::tick`] and [`MatchEngine::resolve_mismatch`], which the
//! runtime driver calls on its timers.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod gallery;
pub mod game;
pub mod runtime;

// Re-export commonly used types
pub use core::rng::DeterministicRng;
pub use core::store::{FileStore, KeyValueStore, MemoryStore, SharedStore};
pub use game::engine::{EngineConfig, MatchEngine};
pub use game::medal::MedalTier;
pub use game::state::{GameState, SessionSnapshot};
pub use gallery::{GalleryAggregator, GalleryConfig, HttpCollection};
pub use runtime::driver::{SessionDriver, SessionHandle};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
