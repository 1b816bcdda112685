use std::ffi::OsString;
use std::path::{Path, PathBuf};

use statuary_engine::device::GpuInit;
use statuary_engine::window::RuntimeConfig;
use winit::dpi::LogicalSize;

/// Environment variable overriding [`DemoConfig::asset_root`].
pub const ASSET_ROOT_ENV: &str = "STATUARY_ASSETS";

/// Demo configuration.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub title: String,
    /// Initial window size in logical pixels.
    pub window_size: (u32, u32),
    /// Directory holding `objects/` and `textures/`.
    pub asset_root: PathBuf,
    /// Requested MSAA sample count for the offscreen target.
    pub msaa_samples: u32,
    /// Movement keys move `movement_scale * dt` units per frame, times the
    /// camera's movement speed.
    pub movement_scale: f32,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            title: "statuary".to_string(),
            window_size: (800, 600),
            asset_root: PathBuf::from("resources"),
            msaa_samples: 4,
            movement_scale: 5.0,
        }
    }
}

impl DemoConfig {
    /// Defaults with the asset root taken from `STATUARY_ASSETS` when set.
    pub fn from_env() -> Self {
        Self::default().with_asset_override(std::env::var_os(ASSET_ROOT_ENV))
    }

    /// Replaces the asset root with a non-empty `root`.
    pub fn with_asset_override(mut self, root: Option<OsString>) -> Self {
        if let Some(root) = root.filter(|r| !r.is_empty()) {
            self.asset_root = PathBuf::from(root);
        }
        self
    }

    /// Resolves a path relative to the asset root.
    pub fn asset(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.asset_root.join(relative)
    }

    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            title: self.title.clone(),
            initial_size: LogicalSize::new(
                f64::from(self.window_size.0),
                f64::from(self.window_size.1),
            ),
            grab_cursor: true,
        }
    }

    /// The scene writes display values directly, so a linear surface is
    /// preferred.
    pub fn gpu_init(&self) -> GpuInit {
        GpuInit {
            prefer_srgb: false,
            ..GpuInit::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── asset root ────────────────────────────────────────────────────────

    #[test]
    fn default_asset_root() {
        let c = DemoConfig::default();
        assert_eq!(c.asset("textures/grass.png"), PathBuf::from("resources/textures/grass.png"));
    }

    #[test]
    fn override_replaces_root() {
        let c = DemoConfig::default().with_asset_override(Some(OsString::from("/srv/assets")));
        assert_eq!(c.asset_root, PathBuf::from("/srv/assets"));
    }

    #[test]
    fn empty_override_is_ignored() {
        let c = DemoConfig::default().with_asset_override(Some(OsString::new()));
        assert_eq!(c.asset_root, PathBuf::from("resources"));
        let c = DemoConfig::default().with_asset_override(None);
        assert_eq!(c.asset_root, PathBuf::from("resources"));
    }

    // ── derived configs ───────────────────────────────────────────────────

    #[test]
    fn runtime_and_gpu_configs() {
        let c = DemoConfig::default();
        let rt = c.runtime_config();
        assert_eq!(rt.initial_size, LogicalSize::new(800.0, 600.0));
        assert!(rt.grab_cursor);
        assert!(!c.gpu_init().prefer_srgb);
    }
}
