//! GPU rendering subsystem.
//!
//! Renderers consume `scene` draw streams and issue GPU commands via wgpu.
//! Each renderer is responsible for its own GPU resources (pipelines, buffers).
//!
//! Convention:
//! - world space is right-handed, +Y up
//! - scene passes render into an [`OffscreenTarget`]; the [`CompositeRenderer`]
//!   is the only pass that writes the swapchain image

mod composite;
mod ctx;
mod mesh;
mod offscreen;
mod scene_renderer;
mod texture;
mod uniforms;

pub use composite::{CompositeRenderer, Effect};
pub use ctx::{RenderCtx, RenderTarget};
pub use mesh::{Material, Mesh, Model, Vertex};
pub use offscreen::{OffscreenTarget, OFFSCREEN_COLOR_FORMAT, OFFSCREEN_DEPTH_FORMAT};
pub use scene_renderer::SceneRenderer;
pub use texture::Texture;
pub use uniforms::{
    greyscale, CameraUniform, EffectUniform, LightUniforms, ModelUniform, PointLightGpu,
    SpotLightGpu, LUMINANCE_WEIGHTS, POINT_LIGHT_COUNT,
};
