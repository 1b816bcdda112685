//! Point lights, their markers, and the overhead spotlight.

use glam::{Mat4, Vec3};
use statuary_engine::scene::{point_light_field, spot_light_field, UniformSet};

/// World offsets of the eight light markers around the statue.
pub const MARKER_OFFSETS: [Vec3; 8] = [
    Vec3::new(0.0, -4.32, -7.0),
    Vec3::new(0.0, -4.32, 7.0),
    Vec3::new(-7.0, -4.32, 0.0),
    Vec3::new(7.0, -4.32, 0.0),
    Vec3::new(4.5, -4.32, 4.5),
    Vec3::new(-4.5, -4.32, 4.5),
    Vec3::new(4.5, -4.32, -4.5),
    Vec3::new(-4.5, -4.32, -4.5),
];

const MARKER_SCALE: f32 = 0.2;
const MARKER_PIVOT: Vec3 = Vec3::new(0.0, 1.32, 0.0);

/// Point in marker model space where its light sits.
const MARKER_LIGHT_ANCHOR: Vec3 = Vec3::new(0.0, 0.2, 0.0);

/// Model matrix of the marker at `offset`.
///
/// The pivot translations cancel; they are kept so the chain matches the
/// marker mesh's authored origin.
pub fn marker_model(offset: Vec3) -> Mat4 {
    Mat4::from_translation(offset)
        * Mat4::from_scale(Vec3::splat(MARKER_SCALE))
        * Mat4::from_translation(MARKER_PIVOT)
        * Mat4::from_translation(-MARKER_PIVOT)
}

/// World position of the light carried by a marker drawn with `model`.
pub fn light_position(model: Mat4) -> Vec3 {
    model.transform_point3(MARKER_LIGHT_ANCHOR)
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl PointLight {
    /// Dim white light with the scene's attenuation.
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ambient: Vec3::splat(0.05),
            diffuse: Vec3::splat(0.8),
            specular: Vec3::ONE,
            constant: 5.0,
            linear: 0.1,
            quadratic: 0.01,
        }
    }

    /// Writes `pointLights[index].*`.
    pub fn write(&self, set: &mut UniformSet, index: usize) {
        let f = |field: &str| point_light_field(index, field);
        set.set_vec3(f("position"), self.position);
        set.set_vec3(f("ambient"), self.ambient);
        set.set_vec3(f("diffuse"), self.diffuse);
        set.set_vec3(f("specular"), self.specular);
        set.set_float(f("constant"), self.constant);
        set.set_float(f("linear"), self.linear);
        set.set_float(f("quadratic"), self.quadratic);
    }
}

/// Downward spotlight above the statue.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SpotLight {
    pub position: Vec3,
    pub direction: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
    /// Cosine of the inner cone angle.
    pub cut_off: f32,
    /// Cosine of the outer cone angle.
    pub outer_cut_off: f32,
}

impl SpotLight {
    /// Inactive spotlights keep their geometry but emit nothing.
    pub fn new(active: bool) -> Self {
        let (ambient, diffuse, specular) = if active {
            (Vec3::ZERO, Vec3::ONE, Vec3::ONE)
        } else {
            (Vec3::ZERO, Vec3::ZERO, Vec3::ZERO)
        };

        Self {
            position: Vec3::new(0.0, 10.0, 0.0),
            direction: Vec3::NEG_Y,
            ambient,
            diffuse,
            specular,
            constant: 1.0,
            linear: 0.01,
            quadratic: 0.001,
            cut_off: 2.5f32.to_radians().cos(),
            outer_cut_off: 22.0f32.to_radians().cos(),
        }
    }

    /// Writes `spotLight.*`.
    pub fn write(&self, set: &mut UniformSet) {
        let f = spot_light_field;
        set.set_vec3(f("position"), self.position);
        set.set_vec3(f("direction"), self.direction);
        set.set_vec3(f("ambient"), self.ambient);
        set.set_vec3(f("diffuse"), self.diffuse);
        set.set_vec3(f("specular"), self.specular);
        set.set_float(f("constant"), self.constant);
        set.set_float(f("linear"), self.linear);
        set.set_float(f("quadratic"), self.quadratic);
        set.set_float(f("cutOff"), self.cut_off);
        set.set_float(f("outerCutOff"), self.outer_cut_off);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < 1e-5
    }

    // ── markers ───────────────────────────────────────────────────────────

    #[test]
    fn light_sits_just_above_each_marker() {
        for offset in MARKER_OFFSETS {
            let p = light_position(marker_model(offset));
            assert!(approx(p, offset + Vec3::new(0.0, 0.04, 0.0)), "{offset} -> {p}");
        }
    }

    #[test]
    fn marker_scale_is_uniform() {
        let m = marker_model(Vec3::ZERO);
        let (scale, _, translation) = m.to_scale_rotation_translation();
        assert!(approx(scale, Vec3::splat(0.2)));
        assert!(approx(translation, Vec3::ZERO));
    }

    // ── point lights ──────────────────────────────────────────────────────

    #[test]
    fn point_light_writes_all_fields() {
        let mut set = UniformSet::new();
        PointLight::at(Vec3::X).write(&mut set, 2);
        assert_eq!(set.len(), 7);
        assert_eq!(set.vec3("pointLights[2].position"), Some(Vec3::X));
        assert_eq!(set.float("pointLights[2].constant"), Some(5.0));
        assert_eq!(set.float("pointLights[2].linear"), Some(0.1));
        assert_eq!(set.float("pointLights[2].quadratic"), Some(0.01));
    }

    // ── spotlight ─────────────────────────────────────────────────────────

    #[test]
    fn spotlight_triples() {
        let on = SpotLight::new(true);
        assert_eq!((on.ambient, on.diffuse, on.specular), (Vec3::ZERO, Vec3::ONE, Vec3::ONE));
        let off = SpotLight::new(false);
        assert_eq!((off.ambient, off.diffuse, off.specular), (Vec3::ZERO, Vec3::ZERO, Vec3::ZERO));
    }

    #[test]
    fn spotlight_cone_cosines() {
        let s = SpotLight::new(false);
        assert!((s.cut_off - 0.999_048).abs() < 1e-5);
        assert!((s.outer_cut_off - 0.927_184).abs() < 1e-5);
        assert!(s.cut_off > s.outer_cut_off);
    }

    #[test]
    fn spotlight_writes_names() {
        let mut set = UniformSet::new();
        SpotLight::new(true).write(&mut set);
        assert_eq!(set.len(), 10);
        assert_eq!(set.vec3("spotLight.direction"), Some(Vec3::NEG_Y));
        assert_eq!(set.float("spotLight.quadratic"), Some(0.001));
    }
}
