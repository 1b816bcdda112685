use glam::Vec3;
use statuary_engine::camera::{CameraMovement, FlyCamera};
use statuary_engine::core::AppControl;
use statuary_engine::input::{InputFrame, InputState, Key, Toggle};
use statuary_engine::render::Effect;

/// Camera start position.
pub const CAMERA_START: Vec3 = Vec3::new(0.0, 1.0, 12.0);

/// Input gathered once per frame: held keys as levels, toggle keys as
/// press counts.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct FrameInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    /// Pointer motion in pixels, +y down.
    pub look: (f32, f32),
    /// Scroll in lines, +y away from the user.
    pub scroll: f32,
    pub spotlight_presses: u32,
    pub effect_presses: u32,
    pub quit: bool,
}

impl FrameInput {
    pub fn sample(input: &InputState, frame: &InputFrame) -> Self {
        let active = |key| input.key_active(frame, key);
        Self {
            forward: active(Key::W),
            backward: active(Key::S),
            left: active(Key::A),
            right: active(Key::D),
            look: frame.pointer_delta,
            scroll: frame.scroll_delta,
            spotlight_presses: frame.presses(Key::Q),
            effect_presses: frame.presses(Key::E),
            quit: active(Key::Escape),
        }
    }
}

/// Everything the demo mutates between frames.
#[derive(Debug, Clone)]
pub struct AppState {
    pub camera: FlyCamera,
    spotlight: Toggle,
    greyscale: Toggle,
    movement_scale: f32,
    viewport: (u32, u32),
    offscreen_size: (u32, u32),
}

impl AppState {
    /// `size` is both the initial viewport and the fixed offscreen resolution.
    pub fn new(size: (u32, u32), movement_scale: f32) -> Self {
        Self {
            camera: FlyCamera::new(CAMERA_START),
            spotlight: Toggle::new(false),
            greyscale: Toggle::new(false),
            movement_scale,
            viewport: size,
            offscreen_size: size,
        }
    }

    /// Applies one frame of input.
    pub fn update(&mut self, input: &FrameInput, dt: f32) -> AppControl {
        if input.quit {
            return AppControl::Exit;
        }

        let distance = self.movement_scale * dt;
        let moves = [
            (input.forward, CameraMovement::Forward),
            (input.backward, CameraMovement::Backward),
            (input.left, CameraMovement::Left),
            (input.right, CameraMovement::Right),
        ];
        for (held, dir) in moves {
            if held {
                self.camera.process_keyboard(dir, distance);
            }
        }

        let (dx, dy) = input.look;
        if dx != 0.0 || dy != 0.0 {
            self.camera.process_mouse_movement(dx, -dy, true);
        }
        if input.scroll != 0.0 {
            self.camera.process_mouse_scroll(input.scroll);
        }

        if self.spotlight.press(input.spotlight_presses) {
            log::debug!("spotlight {}", if self.spotlight.is_on() { "on" } else { "off" });
        }
        if self.greyscale.press(input.effect_presses) {
            log::debug!("effect: {:?}", self.effect());
        }

        AppControl::Continue
    }

    /// Follows a window resize. The offscreen resolution stays fixed.
    pub fn on_resize(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    /// width / height of the offscreen target.
    pub fn aspect(&self) -> f32 {
        self.offscreen_size.0.max(1) as f32 / self.offscreen_size.1.max(1) as f32
    }

    pub fn spotlight_active(&self) -> bool {
        self.spotlight.is_on()
    }

    pub fn effect(&self) -> Effect {
        Effect::from_enabled(self.greyscale.is_on())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statuary_engine::input::{InputEvent, KeyState};

    fn state() -> AppState {
        AppState::new((800, 600), 5.0)
    }

    fn key_event(key: Key, state: KeyState) -> InputEvent {
        InputEvent::Key { key, state, repeat: false }
    }

    // ── movement ──────────────────────────────────────────────────────────

    #[test]
    fn w_for_one_second_moves_five_units() {
        let mut s = state();
        let front = s.camera.front();
        let input = FrameInput { forward: true, ..Default::default() };
        assert_eq!(s.update(&input, 1.0), AppControl::Continue);

        let moved = s.camera.position() - CAMERA_START;
        assert!((moved - front * 5.0).length() < 1e-5);
        assert!(!s.spotlight_active());
        assert_eq!(s.effect(), Effect::PassThrough);
    }

    #[test]
    fn look_inverts_pointer_y() {
        let mut s = state();
        let input = FrameInput { look: (0.0, -100.0), ..Default::default() };
        s.update(&input, 0.016);
        // Pointer moved up: pitch goes up by 100 * 0.1 degrees.
        assert!((s.camera.pitch() - 10.0).abs() < 1e-4);
    }

    #[test]
    fn scroll_zooms_in() {
        let mut s = state();
        s.update(&FrameInput { scroll: 5.0, ..Default::default() }, 0.016);
        assert_eq!(s.camera.zoom(), 40.0);
    }

    #[test]
    fn escape_exits() {
        let mut s = state();
        let input = FrameInput { quit: true, ..Default::default() };
        assert_eq!(s.update(&input, 0.016), AppControl::Exit);
    }

    // ── toggles ───────────────────────────────────────────────────────────

    #[test]
    fn holding_q_toggles_once() {
        let mut input = InputState::default();
        let mut frame = InputFrame::default();
        let mut s = state();

        input.apply_event(&mut frame, key_event(Key::Q, KeyState::Pressed));
        s.update(&FrameInput::sample(&input, &frame), 0.016);
        frame.clear();

        // Auto-repeat while held.
        for _ in 0..3 {
            input.apply_event(&mut frame, InputEvent::Key { key: Key::Q, state: KeyState::Pressed, repeat: true });
            s.update(&FrameInput::sample(&input, &frame), 0.016);
            frame.clear();
        }
        assert!(s.spotlight_active());

        input.apply_event(&mut frame, key_event(Key::Q, KeyState::Released));
        input.apply_event(&mut frame, key_event(Key::Q, KeyState::Pressed));
        s.update(&FrameInput::sample(&input, &frame), 0.016);
        assert!(!s.spotlight_active());
    }

    #[test]
    fn q_taps_in_consecutive_frames_both_count() {
        let mut input = InputState::default();
        let mut frame = InputFrame::default();
        let mut s = state();

        for _ in 0..2 {
            input.apply_event(&mut frame, key_event(Key::Q, KeyState::Pressed));
            input.apply_event(&mut frame, key_event(Key::Q, KeyState::Released));
            s.update(&FrameInput::sample(&input, &frame), 0.25);
            frame.clear();
        }
        assert!(!s.spotlight_active());
    }

    #[test]
    fn e_toggle_parity() {
        let mut s = state();
        for n in 1..=6 {
            s.update(&FrameInput { effect_presses: 1, ..Default::default() }, 0.016);
            s.update(&FrameInput::default(), 0.016);
            let expected = if n % 2 == 1 { Effect::Greyscale } else { Effect::PassThrough };
            assert_eq!(s.effect(), expected, "after {n} presses");
        }
        s.update(&FrameInput { effect_presses: 3, ..Default::default() }, 0.016);
        assert_eq!(s.effect(), Effect::Greyscale);
    }

    // ── resize ────────────────────────────────────────────────────────────

    #[test]
    fn resize_updates_viewport_only() {
        let mut s = state();
        s.on_resize(1280, 720);
        assert_eq!(s.viewport(), (1280, 720));
        assert_eq!(s.offscreen_size, (800, 600));
        assert!((s.aspect() - 800.0 / 600.0).abs() < 1e-6);
    }

    // ── sampling ──────────────────────────────────────────────────────────

    #[test]
    fn sample_reads_keys_and_deltas() {
        let mut input = InputState::default();
        let mut frame = InputFrame::default();
        for key in [Key::W, Key::Q] {
            input.apply_event(&mut frame, InputEvent::Key { key, state: KeyState::Pressed, repeat: false });
        }
        input.apply_event(&mut frame, InputEvent::PointerDelta { dx: 3.0, dy: -2.0 });

        let f = FrameInput::sample(&input, &frame);
        assert!(f.forward);
        assert_eq!((f.spotlight_presses, f.effect_presses), (1, 0));
        assert!(!f.backward && !f.quit);
        assert_eq!(f.look, (3.0, -2.0));
    }
}
