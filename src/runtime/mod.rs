//! Runtime Layer
//!
//! Async drivers around the synchronous engines. This layer is
//! **non-deterministic** (wall-clock timers); all game rules live in `game/`.

pub mod driver;

pub use driver::{SessionDriver, SessionHandle, SessionCommand, DriverError};
