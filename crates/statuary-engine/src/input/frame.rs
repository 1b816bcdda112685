use std::collections::{HashMap, HashSet};

use super::types::{InputEvent, Key};

/// Per-frame input deltas.
///
/// `InputState` provides the current state (held keys, pointer position).
/// `InputFrame` provides events, transition sets and accumulated motion for the
/// current frame.
#[derive(Debug, Default)]
pub struct InputFrame {
    /// Raw events in arrival order.
    pub events: Vec<InputEvent>,

    /// Keys pressed this frame.
    pub keys_pressed: HashSet<Key>,

    /// Press-down transitions per key this frame. Repeats are not counted.
    pub press_counts: HashMap<Key, u32>,

    /// Keys released this frame.
    pub keys_released: HashSet<Key>,

    /// Accumulated relative pointer motion in pixels (+x right, +y down).
    pub pointer_delta: (f32, f32),

    /// Accumulated vertical scroll in lines (positive = away from the user).
    pub scroll_delta: f32,
}

impl InputFrame {
    pub fn clear(&mut self) {
        self.events.clear();
        self.keys_pressed.clear();
        self.press_counts.clear();
        self.keys_released.clear();
        self.pointer_delta = (0.0, 0.0);
        self.scroll_delta = 0.0;
    }

    /// Number of times `key` went down this frame.
    pub fn presses(&self, key: Key) -> u32 {
        self.press_counts.get(&key).copied().unwrap_or(0)
    }

    pub fn push_event(&mut self, ev: InputEvent) {
        self.events.push(ev);
    }
}
