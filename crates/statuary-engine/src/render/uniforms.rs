//! GPU uniform blocks and their packing from named [`UniformSet`]s.
//!
//! Every block uses vec4-sized fields so the Rust and WGSL layouts agree
//! without manual padding rules.

use anyhow::{Context, Result};
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::scene::{point_light_field, spot_light_field, UniformSet};

/// Number of point lights the lit shader expects.
pub const POINT_LIGHT_COUNT: usize = 8;

/// Rec. 709 luma weights used by the greyscale effect.
pub const LUMINANCE_WEIGHTS: [f32; 3] = [0.2126, 0.7152, 0.0722];

/// CPU reference of the composite shader's greyscale effect.
pub fn greyscale(rgb: [f32; 3]) -> f32 {
    rgb[0] * LUMINANCE_WEIGHTS[0] + rgb[1] * LUMINANCE_WEIGHTS[1] + rgb[2] * LUMINANCE_WEIGHTS[2]
}

// ── camera ────────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct CameraUniform {
    pub projection: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new(projection: Mat4, view: Mat4) -> Self {
        Self {
            projection: projection.to_cols_array_2d(),
            view: view.to_cols_array_2d(),
        }
    }

    /// Reads `projection` and `view`.
    pub fn from_set(set: &UniformSet) -> Result<Self> {
        Ok(Self::new(mat4(set, "projection")?, mat4(set, "view")?))
    }
}

// ── model ─────────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ModelUniform {
    pub model: [[f32; 4]; 4],
    /// Inverse-transpose of `model`, for normals.
    pub normal: [[f32; 4]; 4],
}

impl ModelUniform {
    pub fn new(model: Mat4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            normal: model.inverse().transpose().to_cols_array_2d(),
        }
    }
}

// ── lights ────────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct PointLightGpu {
    pub position: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    /// constant, linear, quadratic, unused
    pub attenuation: [f32; 4],
}

impl PointLightGpu {
    /// Reads `pointLights[index].*`.
    pub fn from_set(set: &UniformSet, index: usize) -> Result<Self> {
        let f = |field: &str| point_light_field(index, field);
        Ok(Self {
            position: vec4(vec3(set, &f("position"))?),
            ambient: vec4(vec3(set, &f("ambient"))?),
            diffuse: vec4(vec3(set, &f("diffuse"))?),
            specular: vec4(vec3(set, &f("specular"))?),
            attenuation: [
                float(set, &f("constant"))?,
                float(set, &f("linear"))?,
                float(set, &f("quadratic"))?,
                0.0,
            ],
        })
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct SpotLightGpu {
    pub position: [f32; 4],
    pub direction: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    /// constant, linear, quadratic, unused
    pub attenuation: [f32; 4],
    /// cutOff, outerCutOff (cosines), unused, unused
    pub cutoff: [f32; 4],
}

impl SpotLightGpu {
    /// Reads `spotLight.*`.
    pub fn from_set(set: &UniformSet) -> Result<Self> {
        let f = spot_light_field;
        Ok(Self {
            position: vec4(vec3(set, &f("position"))?),
            direction: vec4(vec3(set, &f("direction"))?),
            ambient: vec4(vec3(set, &f("ambient"))?),
            diffuse: vec4(vec3(set, &f("diffuse"))?),
            specular: vec4(vec3(set, &f("specular"))?),
            attenuation: [
                float(set, &f("constant"))?,
                float(set, &f("linear"))?,
                float(set, &f("quadratic"))?,
                0.0,
            ],
            cutoff: [float(set, &f("cutOff"))?, float(set, &f("outerCutOff"))?, 0.0, 0.0],
        })
    }
}

/// Everything the lit shader reads besides the camera and model blocks.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct LightUniforms {
    pub view_pos: [f32; 4],
    /// shininess, unused, unused, unused
    pub material: [f32; 4],
    pub point_lights: [PointLightGpu; POINT_LIGHT_COUNT],
    pub spot_light: SpotLightGpu,
}

impl LightUniforms {
    /// Packs `viewPos`, `material.shininess`, all point lights and the spotlight.
    ///
    /// Fails on the first missing or mistyped name.
    pub fn from_set(set: &UniformSet) -> Result<Self> {
        let mut point_lights = [PointLightGpu::zeroed(); POINT_LIGHT_COUNT];
        for (i, slot) in point_lights.iter_mut().enumerate() {
            *slot = PointLightGpu::from_set(set, i)?;
        }

        Ok(Self {
            view_pos: vec4(vec3(set, "viewPos")?),
            material: [float(set, "material.shininess")?, 0.0, 0.0, 0.0],
            point_lights,
            spot_light: SpotLightGpu::from_set(set)?,
        })
    }
}

// ── composite ─────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Pod, Zeroable)]
pub struct EffectUniform {
    pub effect: i32,
    pub _pad: [i32; 3], // 16-byte alignment
}

impl EffectUniform {
    pub fn new(effect: i32) -> Self {
        Self { effect, _pad: [0; 3] }
    }

    /// Reads `effect`.
    pub fn from_set(set: &UniformSet) -> Result<Self> {
        let effect = set.int("effect").context("missing int uniform `effect`")?;
        Ok(Self::new(effect))
    }
}

// ── lookup helpers ────────────────────────────────────────────────────────

fn mat4(set: &UniformSet, name: &str) -> Result<Mat4> {
    set.mat4(name)
        .with_context(|| format!("missing mat4 uniform `{name}`"))
}

fn vec3(set: &UniformSet, name: &str) -> Result<Vec3> {
    set.vec3(name)
        .with_context(|| format!("missing vec3 uniform `{name}`"))
}

fn float(set: &UniformSet, name: &str) -> Result<f32> {
    set.float(name)
        .with_context(|| format!("missing float uniform `{name}`"))
}

fn vec4(v: Vec3) -> [f32; 4] {
    [v.x, v.y, v.z, 0.0]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_light_set() -> UniformSet {
        let mut set = UniformSet::new();
        for i in 0..POINT_LIGHT_COUNT {
            let f = |field: &str| point_light_field(i, field);
            set.set_vec3(f("position"), Vec3::splat(i as f32));
            set.set_vec3(f("ambient"), Vec3::splat(0.05));
            set.set_vec3(f("diffuse"), Vec3::splat(0.8));
            set.set_vec3(f("specular"), Vec3::ONE);
            set.set_float(f("constant"), 5.0);
            set.set_float(f("linear"), 0.1);
            set.set_float(f("quadratic"), 0.01);
        }
        for (name, v) in [
            ("position", Vec3::new(0.0, 10.0, 0.0)),
            ("direction", Vec3::NEG_Y),
            ("ambient", Vec3::ZERO),
            ("diffuse", Vec3::ONE),
            ("specular", Vec3::ONE),
        ] {
            set.set_vec3(spot_light_field(name), v);
        }
        for (name, v) in [
            ("constant", 1.0),
            ("linear", 0.01),
            ("quadratic", 0.001),
            ("cutOff", 0.9),
            ("outerCutOff", 0.8),
        ] {
            set.set_float(spot_light_field(name), v);
        }
        set.set_vec3("viewPos", Vec3::new(0.0, 1.0, 12.0));
        set.set_float("material.shininess", 128.0);
        set
    }

    // ── layout ────────────────────────────────────────────────────────────

    #[test]
    fn block_sizes_are_vec4_multiples() {
        assert_eq!(std::mem::size_of::<PointLightGpu>(), 80);
        assert_eq!(std::mem::size_of::<SpotLightGpu>(), 112);
        assert_eq!(std::mem::size_of::<LightUniforms>(), 32 + 8 * 80 + 112);
        assert_eq!(std::mem::size_of::<EffectUniform>(), 16);
        assert_eq!(std::mem::size_of::<ModelUniform>(), 128);
    }

    // ── packing ───────────────────────────────────────────────────────────

    #[test]
    fn packs_lights_by_name() {
        let u = LightUniforms::from_set(&full_light_set()).unwrap();
        assert_eq!(u.view_pos, [0.0, 1.0, 12.0, 0.0]);
        assert_eq!(u.material[0], 128.0);
        assert_eq!(u.point_lights[3].position, [3.0, 3.0, 3.0, 0.0]);
        assert_eq!(u.point_lights[7].attenuation, [5.0, 0.1, 0.01, 0.0]);
        assert_eq!(u.spot_light.direction, [0.0, -1.0, 0.0, 0.0]);
        assert_eq!(u.spot_light.cutoff, [0.9, 0.8, 0.0, 0.0]);
    }

    #[test]
    fn missing_name_is_an_error() {
        let mut set = full_light_set();
        set.set_int(point_light_field(5, "linear"), 1);
        let err = LightUniforms::from_set(&set).unwrap_err();
        assert!(err.to_string().contains("pointLights[5].linear"));
    }

    #[test]
    fn effect_from_set() {
        let mut set = UniformSet::new();
        set.set_int("effect", 1);
        assert_eq!(EffectUniform::from_set(&set).unwrap().effect, 1);
        assert!(EffectUniform::from_set(&UniformSet::new()).is_err());
    }

    #[test]
    fn normal_matrix_undoes_nonuniform_scale() {
        let m = Mat4::from_scale(Vec3::new(20.0, 1.0, 20.0));
        let u = ModelUniform::new(m);
        let n = Mat4::from_cols_array_2d(&u.normal);
        let up = n.transform_vector3(Vec3::Y).normalize();
        assert!((up - Vec3::Y).length() < 1e-6);
    }

    // ── greyscale ─────────────────────────────────────────────────────────

    #[test]
    fn greyscale_weights() {
        assert!((greyscale([1.0, 1.0, 1.0]) - 1.0).abs() < 1e-6);
        assert!((greyscale([1.0, 0.0, 0.0]) - 0.2126).abs() < 1e-6);
        assert!((greyscale([0.0, 1.0, 0.0]) - 0.7152).abs() < 1e-6);
        assert!((greyscale([0.0, 0.0, 1.0]) - 0.0722).abs() < 1e-6);
    }
}
