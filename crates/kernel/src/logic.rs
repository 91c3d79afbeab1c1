use cadence_common::BoxError;
use cadence_input::InputState;

use crate::window::Window;

/// Game-specific behaviour driven by the scheduler.
///
/// All methods run on the loop thread, one after another, never concurrently.
pub trait GameLogic<W: Window> {
    /// One-time setup: create GPU resources and build the scene.
    fn init(&mut self, window: &mut W) -> Result<(), BoxError>;

    /// React to input sampled at the start of this loop iteration.
    fn input(&mut self, window: &W);

    /// Advance the simulation by exactly `interval` seconds.
    ///
    /// `input.display_vec()` holds pointer movement no earlier update has seen.
    fn update(&mut self, interval: f32, input: &InputState) -> Result<(), BoxError>;

    /// Draw one frame. The scheduler presents it afterwards.
    fn render(&mut self, window: &mut W) -> Result<(), BoxError>;

    /// Release owned resources. Called once, after the loop has stopped.
    fn cleanup(&mut self);
}
