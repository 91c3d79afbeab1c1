//! Shared types used across the cadence crates.

mod types;

pub use types::{BoxError, ItemId, Viewport};
