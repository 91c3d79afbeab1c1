use cadence_common::{BoxError, Viewport};
use cadence_input::InputState;

/// Drawable area the frame renderer reads each frame.
pub trait Surface {
    /// Current framebuffer size.
    fn size(&self) -> Viewport;

    /// Report whether the size changed since the last call, clearing the flag.
    fn take_resized(&mut self) -> bool;
}

/// A window as the scheduler sees it.
pub trait Window: Surface {
    fn should_close(&self) -> bool;

    /// When true the display paces frames itself and the scheduler does not sleep.
    fn vsync_enabled(&self) -> bool;

    /// Show the completed frame and pump pending window events.
    fn present(&mut self) -> Result<(), BoxError>;

    fn input(&self) -> &InputState;

    fn input_mut(&mut self) -> &mut InputState;
}

/// Window with no display attached.
///
/// Resizes and close requests are driven programmatically, which makes it
/// suitable for headless runs and tests.
#[derive(Debug, Clone)]
pub struct HeadlessWindow {
    size: Viewport,
    resized: bool,
    vsync: bool,
    close_requested: bool,
    close_after: Option<u64>,
    frames_presented: u64,
    input: InputState,
}

impl HeadlessWindow {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: Viewport::new(width, height),
            resized: false,
            vsync: true,
            close_requested: false,
            close_after: None,
            frames_presented: 0,
            input: InputState::default(),
        }
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    /// Report `should_close` once this many frames have been presented.
    pub fn close_after_frames(mut self, frames: u64) -> Self {
        self.close_after = Some(frames);
        self
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.size = Viewport::new(width, height);
        self.resized = true;
    }

    pub fn request_close(&mut self) {
        self.close_requested = true;
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// Peek at the resize flag without consuming it.
    pub fn is_resized(&self) -> bool {
        self.resized
    }
}

impl Surface for HeadlessWindow {
    fn size(&self) -> Viewport {
        self.size
    }

    fn take_resized(&mut self) -> bool {
        std::mem::take(&mut self.resized)
    }
}

impl Window for HeadlessWindow {
    fn should_close(&self) -> bool {
        self.close_requested
            || self
                .close_after
                .is_some_and(|frames| self.frames_presented >= frames)
    }

    fn vsync_enabled(&self) -> bool {
        self.vsync
    }

    fn present(&mut self) -> Result<(), BoxError> {
        self.frames_presented += 1;
        Ok(())
    }

    fn input(&self) -> &InputState {
        &self.input
    }

    fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }
}
