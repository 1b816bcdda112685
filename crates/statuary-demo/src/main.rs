//! statuary: a lit statue, light markers and grass billboards rendered
//! through a multisampled offscreen pass and a post-process composite.
//!
//! Controls: WASD move, mouse look, scroll zoom, Q spotlight, E greyscale,
//! Escape quit.

mod app;
mod config;
mod lights;
mod scene;
mod state;

use std::process::ExitCode;

use statuary_engine::logging::{init_logging, LoggingConfig};
use statuary_engine::window::Runtime;

use crate::app::DemoApp;
use crate::config::DemoConfig;

fn main() -> ExitCode {
    init_logging(LoggingConfig::default());

    let config = DemoConfig::from_env();
    let runtime = config.runtime_config();
    let gpu_init = config.gpu_init();

    match Runtime::run(runtime, gpu_init, DemoApp::new(config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("statuary failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}
