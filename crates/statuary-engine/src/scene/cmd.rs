use glam::Mat4;

/// Handle to an opaque mesh registered with the scene renderer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct MeshId(pub usize);

/// Renderer-agnostic draw command stream.
///
/// Each variant selects a pipeline:
/// - `Billboard`: alpha-blended textured quad, drawn in submission order
/// - `LightMarker`: unlit mesh standing in for point light `light`
/// - `Opaque`: mesh shaded by the lit pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Billboard { model: Mat4 },
    LightMarker { model: Mat4, light: usize },
    Opaque { mesh: MeshId, model: Mat4 },
}

impl DrawCmd {
    /// Model matrix of the command.
    #[inline]
    pub fn model(&self) -> Mat4 {
        match self {
            DrawCmd::Billboard { model }
            | DrawCmd::LightMarker { model, .. }
            | DrawCmd::Opaque { model, .. } => *model,
        }
    }
}
