/// Boolean flipped once per key press.
///
/// Fed with the number of press-down transitions a key made during the frame,
/// so taps shorter than a frame are never lost.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Toggle {
    on: bool,
}

impl Toggle {
    pub const fn new(on: bool) -> Self {
        Self { on }
    }

    /// Applies `presses` transitions. Returns true if the state changed.
    pub fn press(&mut self, presses: u32) -> bool {
        let flipped = presses % 2 == 1;
        if flipped {
            self.on = !self.on;
        }
        flipped
    }

    #[inline]
    pub fn is_on(&self) -> bool {
        self.on
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{InputEvent, InputFrame, InputState, Key, KeyState};

    fn tap(st: &mut InputState, fr: &mut InputFrame, key: Key) {
        for state in [KeyState::Pressed, KeyState::Released] {
            st.apply_event(fr, InputEvent::Key { key, state, repeat: false });
        }
    }

    #[test]
    fn holding_does_not_flip_again() {
        let mut t = Toggle::new(false);
        assert!(t.press(1));
        for _ in 0..10 {
            assert!(!t.press(0));
        }
        assert!(t.is_on());
    }

    #[test]
    fn press_parity() {
        let mut t = Toggle::default();
        for presses in 1..=6 {
            t.press(1);
            assert_eq!(t.is_on(), presses % 2 == 1);
        }
        assert!(!t.press(2));
        assert!(!t.is_on());
    }

    #[test]
    fn taps_in_consecutive_frames_cancel() {
        let mut st = InputState::default();
        let mut fr = InputFrame::default();
        let mut t = Toggle::default();

        for _ in 0..2 {
            tap(&mut st, &mut fr, Key::Q);
            t.press(fr.presses(Key::Q));
            fr.clear();
        }
        assert!(!t.is_on());
    }

    #[test]
    fn two_taps_in_one_frame_cancel() {
        let mut st = InputState::default();
        let mut fr = InputFrame::default();
        let mut t = Toggle::default();

        tap(&mut st, &mut fr, Key::E);
        tap(&mut st, &mut fr, Key::E);
        assert_eq!(fr.presses(Key::E), 2);
        assert!(!t.press(fr.presses(Key::E)));
        assert!(!t.is_on());
    }
}
