use glam::Mat4;

use super::{DrawCmd, MeshId};

/// Recorded draw stream for a frame.
///
/// Commands are consumed strictly in insertion order. Nothing is sorted,
/// culled or batched, so transparent commands must be pushed in the order
/// they should blend.
#[derive(Debug, Default, Clone)]
pub struct DrawList {
    items: Vec<DrawCmd>,
}

impl DrawList {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears recorded commands. Keeps allocated capacity for reuse.
    #[inline]
    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[inline]
    pub fn push(&mut self, cmd: DrawCmd) {
        self.items.push(cmd);
    }

    #[inline]
    pub fn push_billboard(&mut self, model: Mat4) {
        self.push(DrawCmd::Billboard { model });
    }

    #[inline]
    pub fn push_light_marker(&mut self, model: Mat4, light: usize) {
        self.push(DrawCmd::LightMarker { model, light });
    }

    #[inline]
    pub fn push_opaque(&mut self, mesh: MeshId, model: Mat4) {
        self.push(DrawCmd::Opaque { mesh, model });
    }

    /// Returns commands in submission order.
    #[inline]
    pub fn items(&self) -> &[DrawCmd] {
        &self.items
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &DrawCmd> {
        self.items.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn t(x: f32) -> Mat4 {
        Mat4::from_translation(Vec3::new(x, 0.0, 0.0))
    }

    // ── ordering ──────────────────────────────────────────────────────────

    #[test]
    fn keeps_submission_order() {
        let mut list = DrawList::new();
        list.push_billboard(t(3.0));
        list.push_billboard(t(1.0));
        list.push_light_marker(t(2.0), 0);
        list.push_opaque(MeshId(0), t(0.0));

        let xs: Vec<f32> = list.iter().map(|c| c.model().w_axis.x).collect();
        assert_eq!(xs, vec![3.0, 1.0, 2.0, 0.0]);
        assert!(matches!(list.items()[2], DrawCmd::LightMarker { light: 0, .. }));
    }

    // ── clear ─────────────────────────────────────────────────────────────

    #[test]
    fn clear_empties_list() {
        let mut list = DrawList::new();
        list.push_billboard(Mat4::IDENTITY);
        assert_eq!(list.len(), 1);
        list.clear();
        assert!(list.is_empty());
    }
}
