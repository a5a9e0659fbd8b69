//! Keyboard state with "last known" semantics.
//!
//! A key reads as pressed from its down event until its up event. Reading the
//! state never clears it, so holding a key keeps the boat moving every tick.

use std::collections::HashMap;

use winit::keyboard::KeyCode;

/// One raw key transition from the windowing layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub key: KeyCode,
    pub pressed: bool,
}

/// Last known pressed state per key
#[derive(Debug, Default, Clone)]
pub struct InputState {
    keys: HashMap<KeyCode, bool>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key transition
    pub fn apply(&mut self, input: KeyInput) {
        self.keys.insert(input.key, input.pressed);
    }

    /// Whether `key` was last seen pressed; unseen keys are released
    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.keys.get(&key).copied().unwrap_or(false)
    }

    /// Whether any of `keys` is held
    pub fn any_pressed(&self, keys: &[KeyCode]) -> bool {
        keys.iter().any(|&key| self.is_pressed(key))
    }

    /// Map the held keys onto boat steering intents
    pub fn boat_intents(&self) -> BoatIntents {
        BoatIntents {
            forward: self.any_pressed(&[KeyCode::KeyW, KeyCode::ArrowUp]),
            back: self.any_pressed(&[KeyCode::KeyS, KeyCode::ArrowDown]),
            left: self.any_pressed(&[KeyCode::KeyA, KeyCode::ArrowLeft]),
            right: self.any_pressed(&[KeyCode::KeyD, KeyCode::ArrowRight]),
        }
    }
}

/// Discrete steering intents for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoatIntents {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
}
