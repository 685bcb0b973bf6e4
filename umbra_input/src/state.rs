// Copyright 2025 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keyboard and mouse button state sampled once per update tick.

use hashbrown::HashSet;
use umbra_scene::MouseButton;

/// Platform key code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(pub u32);

/// Held keys and buttons, plus what changed since the last [`InputState::end_tick`].
///
/// ```
/// use umbra_input::{InputState, Key};
///
/// let mut state = InputState::new();
/// state.key_down(Key(32));
/// assert!(state.is_key_pressed(Key(32)));
/// state.end_tick();
/// assert!(state.is_key_held(Key(32)));
/// assert!(!state.is_key_pressed(Key(32)));
/// ```
#[derive(Clone, Debug, Default)]
pub struct InputState {
    held_keys: HashSet<Key>,
    pressed_keys: HashSet<Key>,
    released_keys: HashSet<Key>,
    held_buttons: HashSet<MouseButton>,
    pressed_buttons: HashSet<MouseButton>,
    released_buttons: HashSet<MouseButton>,
}

impl InputState {
    /// Nothing held.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key press. Repeats while held are ignored.
    pub fn key_down(&mut self, key: Key) {
        if self.held_keys.insert(key) {
            self.pressed_keys.insert(key);
        }
    }

    /// Record a key release.
    pub fn key_up(&mut self, key: Key) {
        if self.held_keys.remove(&key) {
            self.released_keys.insert(key);
        }
    }

    /// Record a button press.
    pub fn button_down(&mut self, button: MouseButton) {
        if self.held_buttons.insert(button) {
            self.pressed_buttons.insert(button);
        }
    }

    /// Record a button release.
    pub fn button_up(&mut self, button: MouseButton) {
        if self.held_buttons.remove(&button) {
            self.released_buttons.insert(button);
        }
    }

    /// Whether `key` is down.
    pub fn is_key_held(&self, key: Key) -> bool {
        self.held_keys.contains(&key)
    }

    /// Whether `key` went down this tick.
    pub fn is_key_pressed(&self, key: Key) -> bool {
        self.pressed_keys.contains(&key)
    }

    /// Whether `key` went up this tick.
    pub fn is_key_released(&self, key: Key) -> bool {
        self.released_keys.contains(&key)
    }

    /// Whether `button` is down.
    pub fn is_button_held(&self, button: MouseButton) -> bool {
        self.held_buttons.contains(&button)
    }

    /// Whether `button` went down this tick.
    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.pressed_buttons.contains(&button)
    }

    /// Whether `button` went up this tick.
    pub fn is_button_released(&self, button: MouseButton) -> bool {
        self.released_buttons.contains(&button)
    }

    /// Forget per-tick transitions; held state is kept.
    pub fn end_tick(&mut self) {
        self.pressed_keys.clear();
        self.released_keys.clear();
        self.pressed_buttons.clear();
        self.released_buttons.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeat_does_not_re_press() {
        let mut state = InputState::new();
        state.key_down(Key(1));
        state.end_tick();
        state.key_down(Key(1));
        assert!(!state.is_key_pressed(Key(1)));
        assert!(state.is_key_held(Key(1)));
    }

    #[test]
    fn press_and_release_in_one_tick() {
        let mut state = InputState::new();
        state.button_down(MouseButton::Left);
        state.button_up(MouseButton::Left);
        assert!(state.is_button_pressed(MouseButton::Left));
        assert!(state.is_button_released(MouseButton::Left));
        assert!(!state.is_button_held(MouseButton::Left));
        state.end_tick();
        assert!(!state.is_button_released(MouseButton::Left));
    }

    #[test]
    fn release_without_press_is_ignored() {
        let mut state = InputState::new();
        state.key_up(Key(9));
        assert!(!state.is_key_released(Key(9)));
    }
}
