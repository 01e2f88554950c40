//! Held-key state for free movement

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Movement directions driven by the keyboard
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveKey {
    /// Move forward (W)
    Forward,
    /// Move backward (S)
    Backward,
    /// Strafe left (A)
    Left,
    /// Strafe right (D)
    Right,
}

impl MoveKey {
    /// Map a physical key code (`KeyW`, `KeyA`, ...) to a movement key
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "KeyW" => Some(MoveKey::Forward),
            "KeyS" => Some(MoveKey::Backward),
            "KeyA" => Some(MoveKey::Left),
            "KeyD" => Some(MoveKey::Right),
            _ => None,
        }
    }
}

/// Where keyboard focus currently is
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Focus {
    /// The viewport or page body
    #[default]
    Viewport,
    /// A text input or text area; key presses belong to it
    TextField,
}

/// Set of currently held movement keys
#[derive(Clone, Debug, Default)]
pub struct InputState {
    held: FxHashSet<MoveKey>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key press
    ///
    /// Returns `true` if the code is a movement key and was recorded.
    pub fn key_down(&mut self, code: &str, focus: Focus) -> bool {
        if focus == Focus::TextField {
            return false;
        }
        match MoveKey::from_code(code) {
            Some(key) => {
                self.held.insert(key);
                true
            }
            None => false,
        }
    }

    pub fn key_up(&mut self, code: &str) {
        if let Some(key) = MoveKey::from_code(code) {
            self.held.remove(&key);
        }
    }

    /// Window lost focus: nothing is held anymore
    pub fn blur(&mut self) {
        self.clear();
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }

    pub fn is_held(&self, key: MoveKey) -> bool {
        self.held.contains(&key)
    }

    pub fn any_held(&self) -> bool {
        !self.held.is_empty()
    }

    /// Net movement as `(forward, right)`, each in `-1..=1`
    ///
    /// Opposite keys cancel out.
    pub fn axes(&self) -> (f32, f32) {
        let mut forward = 0.0;
        let mut right = 0.0;
        if self.is_held(MoveKey::Forward) {
            forward += 1.0;
        }
        if self.is_held(MoveKey::Backward) {
            forward -= 1.0;
        }
        if self.is_held(MoveKey::Right) {
            right += 1.0;
        }
        if self.is_held(MoveKey::Left) {
            right -= 1.0;
        }
        (forward, right)
    }
}
