//! Kernel: the fixed-timestep game loop and the contracts it drives.
//!
//! # Invariants
//! - Simulation advances only in constant-size steps; all elapsed wall time is
//!   eventually consumed in whole intervals (unless a catch-up clamp is set).
//! - Exactly one frame is rendered per loop iteration, after zero or more updates.
//! - Cleanup runs exactly once, whether the loop ends normally or with an error.

pub mod clock;
pub mod config;
pub mod engine;
pub mod logic;
pub mod timestep;
pub mod window;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Config, ConfigError, EngineConfig, WindowConfig};
pub use engine::{EngineError, ExecutionMode, GameEngine, LoopState, RunStats, launch};
pub use logic::GameLogic;
pub use timestep::FixedTimestep;
pub use window::{HeadlessWindow, Surface, Window};
