use std::collections::BTreeMap;

use glam::{Mat4, Vec3};

/// A single named shader input.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformValue {
    Mat4(Mat4),
    Vec3(Vec3),
    Float(f32),
    Int(i32),
}

/// Named uniform values for one pass.
///
/// Keys follow the shader-side naming (`pointLights[3].quadratic`,
/// `spotLight.cutOff`, `viewPos`). Renderers pack them into GPU blocks by
/// name, so a set is a complete description of what a pass receives.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct UniformSet {
    values: BTreeMap<String, UniformValue>,
}

impl UniformSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: UniformValue) {
        self.values.insert(name.into(), value);
    }

    pub fn set_mat4(&mut self, name: impl Into<String>, m: Mat4) {
        self.set(name, UniformValue::Mat4(m));
    }

    pub fn set_vec3(&mut self, name: impl Into<String>, v: Vec3) {
        self.set(name, UniformValue::Vec3(v));
    }

    pub fn set_float(&mut self, name: impl Into<String>, f: f32) {
        self.set(name, UniformValue::Float(f));
    }

    pub fn set_int(&mut self, name: impl Into<String>, i: i32) {
        self.set(name, UniformValue::Int(i));
    }

    pub fn get(&self, name: &str) -> Option<UniformValue> {
        self.values.get(name).copied()
    }

    /// Typed lookups return `None` when the name is missing or holds
    /// another type.
    pub fn mat4(&self, name: &str) -> Option<Mat4> {
        match self.get(name)? {
            UniformValue::Mat4(m) => Some(m),
            _ => None,
        }
    }

    pub fn vec3(&self, name: &str) -> Option<Vec3> {
        match self.get(name)? {
            UniformValue::Vec3(v) => Some(v),
            _ => None,
        }
    }

    pub fn float(&self, name: &str) -> Option<f32> {
        match self.get(name)? {
            UniformValue::Float(f) => Some(f),
            _ => None,
        }
    }

    pub fn int(&self, name: &str) -> Option<i32> {
        match self.get(name)? {
            UniformValue::Int(i) => Some(i),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &UniformValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// `pointLights[index].field`
pub fn point_light_field(index: usize, field: &str) -> String {
    format!("pointLights[{index}].{field}")
}

/// `spotLight.field`
pub fn spot_light_field(field: &str) -> String {
    format!("spotLight.{field}")
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── names ─────────────────────────────────────────────────────────────

    #[test]
    fn light_field_names() {
        assert_eq!(point_light_field(3, "quadratic"), "pointLights[3].quadratic");
        assert_eq!(spot_light_field("cutOff"), "spotLight.cutOff");
    }

    // ── typed access ──────────────────────────────────────────────────────

    #[test]
    fn typed_getters_check_type() {
        let mut set = UniformSet::new();
        set.set_float("material.shininess", 128.0);
        set.set_int("effect", 1);

        assert_eq!(set.float("material.shininess"), Some(128.0));
        assert_eq!(set.int("material.shininess"), None);
        assert_eq!(set.int("effect"), Some(1));
        assert_eq!(set.vec3("viewPos"), None);
    }

    #[test]
    fn set_overwrites() {
        let mut set = UniformSet::new();
        set.set_vec3("viewPos", Vec3::ZERO);
        set.set_vec3("viewPos", Vec3::ONE);
        assert_eq!(set.len(), 1);
        assert_eq!(set.vec3("viewPos"), Some(Vec3::ONE));
    }
}
