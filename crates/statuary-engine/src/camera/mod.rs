//! View-state helpers.

mod fly;

pub use fly::{CameraMovement, FlyCamera};
