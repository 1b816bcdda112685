use glam::{Mat4, Vec3};

/// Direction of a keyboard-driven camera step.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
}

/// Euler-angle fly camera (yaw/pitch, no roll).
///
/// Angles are stored in degrees. `front`, `right` and `up` are recomputed
/// whenever yaw or pitch change.
#[derive(Debug, Clone)]
pub struct FlyCamera {
    position: Vec3,
    front: Vec3,
    up: Vec3,
    right: Vec3,
    world_up: Vec3,

    yaw: f32,
    pitch: f32,

    pub movement_speed: f32,
    pub mouse_sensitivity: f32,
    zoom: f32,
}

impl FlyCamera {
    pub const DEFAULT_YAW: f32 = -90.0;
    pub const DEFAULT_PITCH: f32 = 0.0;
    pub const DEFAULT_SPEED: f32 = 1.0;
    pub const DEFAULT_SENSITIVITY: f32 = 0.1;
    pub const DEFAULT_ZOOM: f32 = 45.0;

    pub const PITCH_LIMIT: f32 = 89.0;
    pub const MIN_ZOOM: f32 = 1.0;
    pub const MAX_ZOOM: f32 = 45.0;

    pub const NEAR: f32 = 0.1;
    pub const FAR: f32 = 100.0;

    /// Camera at `position` looking down -Z.
    pub fn new(position: Vec3) -> Self {
        let mut cam = Self {
            position,
            front: Vec3::NEG_Z,
            up: Vec3::Y,
            right: Vec3::X,
            world_up: Vec3::Y,
            yaw: Self::DEFAULT_YAW,
            pitch: Self::DEFAULT_PITCH,
            movement_speed: Self::DEFAULT_SPEED,
            mouse_sensitivity: Self::DEFAULT_SENSITIVITY,
            zoom: Self::DEFAULT_ZOOM,
        };
        cam.update_vectors();
        cam
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Vertical field of view in degrees.
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Moves `movement_speed * distance` units along the camera basis.
    ///
    /// Callers pass a frame-time-scaled distance.
    pub fn process_keyboard(&mut self, direction: CameraMovement, distance: f32) {
        let velocity = self.movement_speed * distance;
        match direction {
            CameraMovement::Forward => self.position += self.front * velocity,
            CameraMovement::Backward => self.position -= self.front * velocity,
            CameraMovement::Left => self.position -= self.right * velocity,
            CameraMovement::Right => self.position += self.right * velocity,
        }
    }

    /// Applies a look delta. Positive `dy` pitches up.
    pub fn process_mouse_movement(&mut self, dx: f32, dy: f32, constrain_pitch: bool) {
        self.yaw += dx * self.mouse_sensitivity;
        self.pitch += dy * self.mouse_sensitivity;

        if constrain_pitch {
            self.pitch = self.pitch.clamp(-Self::PITCH_LIMIT, Self::PITCH_LIMIT);
        }

        self.update_vectors();
    }

    /// Narrows the field of view for positive `dy` (scroll up).
    pub fn process_mouse_scroll(&mut self, dy: f32) {
        self.zoom = (self.zoom - dy).clamp(Self::MIN_ZOOM, Self::MAX_ZOOM);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    /// Perspective projection for the given aspect ratio (width / height).
    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.zoom.to_radians(), aspect, Self::NEAR, Self::FAR)
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        let front = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos());

        self.front = front.normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < 1e-5
    }

    // ── construction ──────────────────────────────────────────────────────

    #[test]
    fn new_looks_down_negative_z() {
        let cam = FlyCamera::new(Vec3::new(0.0, 1.0, 12.0));
        assert!(approx(cam.front(), Vec3::NEG_Z));
        assert!(approx(cam.right(), Vec3::X));
        assert_eq!(cam.zoom(), 45.0);
    }

    // ── keyboard ──────────────────────────────────────────────────────────

    #[test]
    fn forward_moves_along_front() {
        let mut cam = FlyCamera::new(Vec3::ZERO);
        cam.process_keyboard(CameraMovement::Forward, 5.0);
        assert!(approx(cam.position(), Vec3::new(0.0, 0.0, -5.0)));
    }

    #[test]
    fn left_and_right_cancel() {
        let mut cam = FlyCamera::new(Vec3::new(1.0, 2.0, 3.0));
        cam.process_keyboard(CameraMovement::Left, 0.5);
        cam.process_keyboard(CameraMovement::Right, 0.5);
        assert!(approx(cam.position(), Vec3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn speed_scales_distance() {
        let mut cam = FlyCamera::new(Vec3::ZERO);
        cam.movement_speed = 2.0;
        cam.process_keyboard(CameraMovement::Backward, 1.0);
        assert!(approx(cam.position(), Vec3::new(0.0, 0.0, 2.0)));
    }

    // ── mouse ─────────────────────────────────────────────────────────────

    #[test]
    fn pitch_is_clamped() {
        let mut cam = FlyCamera::new(Vec3::ZERO);
        cam.process_mouse_movement(0.0, 10_000.0, true);
        assert_eq!(cam.pitch(), 89.0);
        cam.process_mouse_movement(0.0, -20_000.0, true);
        assert_eq!(cam.pitch(), -89.0);
    }

    #[test]
    fn yaw_uses_sensitivity() {
        let mut cam = FlyCamera::new(Vec3::ZERO);
        cam.process_mouse_movement(900.0, 0.0, true);
        // -90 + 90 = 0 degrees: looking down +X.
        assert!((cam.yaw() - 0.0).abs() < 1e-4);
        assert!(approx(cam.front(), Vec3::X));
    }

    #[test]
    fn scroll_clamps_zoom() {
        let mut cam = FlyCamera::new(Vec3::ZERO);
        cam.process_mouse_scroll(100.0);
        assert_eq!(cam.zoom(), 1.0);
        cam.process_mouse_scroll(-100.0);
        assert_eq!(cam.zoom(), 45.0);
    }

    // ── matrices ──────────────────────────────────────────────────────────

    #[test]
    fn view_maps_position_to_origin() {
        let cam = FlyCamera::new(Vec3::new(0.0, 1.0, 12.0));
        let p = cam.view_matrix().transform_point3(cam.position());
        assert!(approx(p, Vec3::ZERO));
    }

    #[test]
    fn projection_matches_zoom() {
        let cam = FlyCamera::new(Vec3::ZERO);
        let expected = Mat4::perspective_rh(45f32.to_radians(), 800.0 / 600.0, 0.1, 100.0);
        assert_eq!(cam.projection(800.0 / 600.0), expected);
    }
}
