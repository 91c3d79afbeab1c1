use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error type crossing crate boundaries through user callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Unique identifier for an item placed in a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub Uuid);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

/// Framebuffer dimensions in physical pixels.
///
/// Either dimension may be zero while a window is minimized or mid-resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when nothing can be drawn into this viewport.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width over height, with both clamped to at least one pixel.
    pub fn aspect_ratio(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }
}

impl From<(u32, u32)> for Viewport {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}
