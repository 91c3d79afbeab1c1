use glam::{DVec2, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Keys the engine understands. Platform layers map their key codes onto these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    W,
    A,
    S,
    D,
    Z,
    X,
    Space,
    LeftShift,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Keyboard and pointer state for one window.
///
/// Raw device events are recorded through the `on_*` methods as they arrive.
/// Once per loop iteration the scheduler calls [`sample`](Self::sample), which
/// adds cursor movement since the previous sample to a pending delta. Before
/// each fixed update the scheduler calls [`begin_update`](Self::begin_update),
/// which hands the pending delta to that update as the display vector. Every
/// movement therefore reaches exactly one update, however many frames or
/// updates it spans.
#[derive(Debug, Clone)]
pub struct InputState {
    keys_held: HashSet<Key>,
    buttons_held: HashSet<MouseButton>,
    /// Cursor position at the previous sample, `None` until the first sample.
    previous: Option<DVec2>,
    current: DVec2,
    in_window: bool,
    /// Movement sampled but not yet handed to an update.
    pending: Vec2,
    display_vec: Vec2,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            keys_held: HashSet::new(),
            buttons_held: HashSet::new(),
            previous: None,
            current: DVec2::ZERO,
            in_window: false,
            pending: Vec2::ZERO,
            display_vec: Vec2::ZERO,
        }
    }
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_key(&mut self, key: Key, pressed: bool) {
        if pressed {
            self.keys_held.insert(key);
        } else {
            self.keys_held.remove(&key);
        }
    }

    pub fn on_button(&mut self, button: MouseButton, pressed: bool) {
        if pressed {
            self.buttons_held.insert(button);
        } else {
            self.buttons_held.remove(&button);
        }
    }

    pub fn on_cursor_moved(&mut self, x: f64, y: f64) {
        self.current = DVec2::new(x, y);
    }

    pub fn on_cursor_entered(&mut self, entered: bool) {
        self.in_window = entered;
    }

    /// Add cursor movement since the last sample to the pending delta.
    ///
    /// Horizontal movement lands in `y` (yaw) and vertical movement in `x`
    /// (pitch), so the vector can be added straight onto a camera rotation.
    pub fn sample(&mut self) {
        if let Some(previous) = self.previous {
            if self.in_window && previous.x > 0.0 && previous.y > 0.0 {
                let delta = self.current - previous;
                self.pending += Vec2::new(delta.y as f32, delta.x as f32);
            }
        }
        self.previous = Some(self.current);
    }

    /// Move the pending delta into the display vector for the next update.
    pub fn begin_update(&mut self) {
        self.display_vec = std::mem::take(&mut self.pending);
    }

    /// Movement sampled since the last update began.
    pub fn pending_movement(&self) -> Vec2 {
        self.pending
    }

    pub fn is_key_pressed(&self, key: Key) -> bool {
        self.keys_held.contains(&key)
    }

    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.buttons_held.contains(&button)
    }

    pub fn is_left_button_pressed(&self) -> bool {
        self.is_button_pressed(MouseButton::Left)
    }

    pub fn is_right_button_pressed(&self) -> bool {
        self.is_button_pressed(MouseButton::Right)
    }

    /// Pointer movement handed to the current update.
    pub fn display_vec(&self) -> Vec2 {
        self.display_vec
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_press_and_release() {
        let mut input = InputState::new();
        input.on_key(Key::W, true);
        assert!(input.is_key_pressed(Key::W));
        input.on_key(Key::W, false);
        assert!(!input.is_key_pressed(Key::W));
    }

    #[test]
    fn first_sample_has_no_movement() {
        let mut input = InputState::new();
        input.on_cursor_entered(true);
        input.on_cursor_moved(100.0, 100.0);
        input.sample();
        input.begin_update();
        assert_eq!(input.display_vec(), Vec2::ZERO);
    }

    #[test]
    fn sample_swaps_axes_into_rotation_order() {
        let mut input = InputState::new();
        input.on_cursor_entered(true);
        input.on_cursor_moved(100.0, 100.0);
        input.sample();
        input.on_cursor_moved(110.0, 95.0);
        input.sample();
        input.begin_update();
        assert_eq!(input.display_vec(), Vec2::new(-5.0, 10.0));

        // Already handed out.
        input.begin_update();
        assert_eq!(input.display_vec(), Vec2::ZERO);
    }

    #[test]
    fn movement_accumulates_until_an_update_takes_it() {
        let mut input = InputState::new();
        input.on_cursor_entered(true);
        input.on_cursor_moved(100.0, 100.0);
        input.sample();
        for x in [110.0, 120.0, 130.0] {
            input.on_cursor_moved(x, 100.0);
            input.sample();
        }
        assert_eq!(input.pending_movement(), Vec2::new(0.0, 30.0));

        input.begin_update();
        assert_eq!(input.display_vec(), Vec2::new(0.0, 30.0));
        assert_eq!(input.pending_movement(), Vec2::ZERO);
    }

    #[test]
    fn cursor_outside_window_produces_no_movement() {
        let mut input = InputState::new();
        input.on_cursor_moved(50.0, 50.0);
        input.sample();
        input.on_cursor_moved(80.0, 80.0);
        input.sample();
        assert_eq!(input.pending_movement(), Vec2::ZERO);
    }

    #[test]
    fn right_button_tracking() {
        let mut input = InputState::new();
        input.on_button(MouseButton::Right, true);
        assert!(input.is_right_button_pressed());
        assert!(!input.is_left_button_pressed());
        input.on_button(MouseButton::Right, false);
        assert!(!input.is_right_button_pressed());
    }
}
