//! Statuary engine crate.
//!
//! This crate owns the platform + GPU runtime pieces, the 3D draw-command
//! stream and the renderers that consume it. Scene content lives in the app.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod camera;
pub mod render;
pub mod scene;
