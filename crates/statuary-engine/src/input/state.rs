use std::collections::HashSet;

use super::frame::InputFrame;
use super::types::{InputEvent, Key, KeyState};

/// Current input state for a single window.
///
/// Holds "is down" information and current pointer position.
/// Per-frame transitions are recorded into an `InputFrame`.
#[derive(Debug, Default)]
pub struct InputState {
    /// Whether the window is focused.
    pub focused: bool,

    /// Pointer position in logical pixels.
    pub pointer_pos: Option<(f32, f32)>,

    /// Set of currently held keys.
    pub keys_down: HashSet<Key>,
}

impl InputState {
    /// Applies a platform-agnostic input event to the current state and writes deltas to `frame`.
    pub fn apply_event(&mut self, frame: &mut InputFrame, ev: InputEvent) {
        match &ev {
            InputEvent::Focused(f) => {
                self.focused = *f;
                if !*f {
                    // On focus loss, clear held keys so nothing stays stuck.
                    self.keys_down.clear();
                }
            }

            InputEvent::PointerMoved { x, y } => {
                self.pointer_pos = Some((*x, *y));
            }

            InputEvent::PointerDelta { dx, dy } => {
                frame.pointer_delta.0 += *dx;
                frame.pointer_delta.1 += *dy;
            }

            InputEvent::PointerLeft => {
                self.pointer_pos = None;
            }

            InputEvent::Key { key, state, .. } => match state {
                KeyState::Pressed => {
                    // Repeats hit an already-held key and produce no transition.
                    if self.keys_down.insert(*key) {
                        frame.keys_pressed.insert(*key);
                        *frame.press_counts.entry(*key).or_default() += 1;
                    }
                }
                KeyState::Released => {
                    if self.keys_down.remove(key) {
                        frame.keys_released.insert(*key);
                    }
                }
            },

            InputEvent::MouseWheel { delta } => {
                frame.scroll_delta += delta.lines_y();
            }
        }

        frame.push_event(ev);
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    /// True if `key` is held now or went down at any point this frame.
    ///
    /// A press and release inside a single frame still counts as "down" so
    /// level-sampling consumers do not miss quick taps.
    pub fn key_active(&self, frame: &InputFrame, key: Key) -> bool {
        self.key_down(key) || frame.keys_pressed.contains(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::MouseWheelDelta;

    fn key(key: Key, state: KeyState, repeat: bool) -> InputEvent {
        InputEvent::Key { key, state, repeat }
    }

    #[test]
    fn press_records_transition_once() {
        let mut st = InputState::default();
        let mut fr = InputFrame::default();

        st.apply_event(&mut fr, key(Key::Q, KeyState::Pressed, false));
        st.apply_event(&mut fr, key(Key::Q, KeyState::Pressed, true));

        assert!(st.key_down(Key::Q));
        assert_eq!(fr.keys_pressed.len(), 1);
        assert_eq!(fr.presses(Key::Q), 1);
        assert_eq!(fr.events.len(), 2);
    }

    #[test]
    fn release_without_press_is_ignored() {
        let mut st = InputState::default();
        let mut fr = InputFrame::default();

        st.apply_event(&mut fr, key(Key::E, KeyState::Released, false));
        assert!(fr.keys_released.is_empty());
    }

    #[test]
    fn tap_within_frame_is_active() {
        let mut st = InputState::default();
        let mut fr = InputFrame::default();

        st.apply_event(&mut fr, key(Key::E, KeyState::Pressed, false));
        st.apply_event(&mut fr, key(Key::E, KeyState::Released, false));

        assert!(!st.key_down(Key::E));
        assert!(st.key_active(&fr, Key::E));

        fr.clear();
        assert!(!st.key_active(&fr, Key::E));
    }

    #[test]
    fn focus_loss_clears_held_keys() {
        let mut st = InputState::default();
        let mut fr = InputFrame::default();

        st.apply_event(&mut fr, key(Key::W, KeyState::Pressed, false));
        st.apply_event(&mut fr, InputEvent::Focused(false));
        assert!(!st.key_down(Key::W));
    }

    #[test]
    fn motion_and_scroll_accumulate() {
        let mut st = InputState::default();
        let mut fr = InputFrame::default();

        st.apply_event(&mut fr, InputEvent::PointerDelta { dx: 2.0, dy: -1.0 });
        st.apply_event(&mut fr, InputEvent::PointerDelta { dx: 3.0, dy: 4.0 });
        st.apply_event(&mut fr, InputEvent::MouseWheel { delta: MouseWheelDelta::Line { x: 0.0, y: 1.0 } });
        st.apply_event(&mut fr, InputEvent::MouseWheel { delta: MouseWheelDelta::Pixel { x: 0.0, y: 40.0 } });

        assert_eq!(fr.pointer_delta, (5.0, 3.0));
        assert_eq!(fr.scroll_delta, 3.0);

        fr.clear();
        assert_eq!(fr.pointer_delta, (0.0, 0.0));
        assert_eq!(fr.scroll_delta, 0.0);
    }
}
