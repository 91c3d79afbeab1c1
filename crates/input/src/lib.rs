//! Input state consumed by game logic.
//!
//! # Invariants
//! - Device callbacks only record raw state; derived values (pointer delta)
//!   change only when [`InputState::sample`] runs.
//! - Game logic reads input, never writes it.

pub mod state;

pub use state::{InputState, Key, MouseButton};
