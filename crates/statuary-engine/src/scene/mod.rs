//! Scene (draw stream) types.
//!
//! Responsibilities:
//! - store typed, renderer-agnostic draw commands in submission order
//! - carry named uniform values for the passes that consume them

mod cmd;
mod list;
mod uniforms;

pub use cmd::{DrawCmd, MeshId};
pub use list::DrawList;
pub use uniforms::{point_light_field, spot_light_field, UniformSet, UniformValue};
