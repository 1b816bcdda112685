use anyhow::{Context, Result};
use winit::event::WindowEvent;
use winit::window::WindowId;

use statuary_engine::core::{App, AppControl, FrameCtx};
use statuary_engine::device::Gpu;
use statuary_engine::render::{
    CompositeRenderer, Material, Mesh, Model, OffscreenTarget, SceneRenderer, Texture,
};

use crate::config::DemoConfig;
use crate::scene::{
    build_frame, SceneMeshes, BILLBOARD_INDICES, BILLBOARD_VERTICES, CLEAR_COLOR, FLOOR_INDICES,
    FLOOR_VERTICES,
};
use crate::state::{AppState, FrameInput};

const STATUE_OBJ: &str = "objects/statue/statueAngel.obj";
const MARKER_OBJ: &str = "objects/planet/planet.obj";
const FLOOR_DIFFUSE: &str = "objects/floor/floor_diffuse.png";
const FLOOR_SPECULAR: &str = "objects/floor/floor_specular2.png";
const GRASS: &str = "textures/grass.png";

/// The demo application: owns the scene state and every GPU resource.
///
/// Resources are created in `on_init` once the GPU context exists.
pub struct DemoApp {
    config: DemoConfig,
    loaded: Option<Loaded>,
    render_error_logged: bool,
}

struct Loaded {
    state: AppState,
    meshes: SceneMeshes,
    offscreen: OffscreenTarget,
    scene_renderer: SceneRenderer,
    composite: CompositeRenderer,
}

impl DemoApp {
    pub fn new(config: DemoConfig) -> Self {
        Self {
            config,
            loaded: None,
            render_error_logged: false,
        }
    }

    fn load(&self, gpu: &Gpu<'_>) -> Result<Loaded> {
        let (device, queue) = (gpu.device(), gpu.queue());
        let cfg = &self.config;
        log::info!("loading assets from {}", cfg.asset_root.display());

        let statue = Model::load_obj(device, queue, &cfg.asset(STATUE_OBJ))
            .context("failed to load statue model")?;
        let marker = Model::load_obj(device, queue, &cfg.asset(MARKER_OBJ))
            .context("failed to load light marker model")?;

        let floor = Model::from_parts(
            Mesh::new(device, "floor", &FLOOR_VERTICES, &FLOOR_INDICES, 0),
            Material {
                diffuse: Texture::load(device, queue, &cfg.asset(FLOOR_DIFFUSE))
                    .context("failed to load floor diffuse map")?,
                specular: Texture::load(device, queue, &cfg.asset(FLOOR_SPECULAR))
                    .context("failed to load floor specular map")?,
            },
        );

        let grass = Texture::load(device, queue, &cfg.asset(GRASS))
            .context("failed to load grass texture")?;
        let billboard = Model::from_parts(
            Mesh::new(device, "billboard", &BILLBOARD_VERTICES, &BILLBOARD_INDICES, 0),
            Material {
                diffuse: grass,
                specular: Texture::solid(device, queue, "billboard specular", [0, 0, 0, 255]),
            },
        );

        let size = gpu.size();
        let offscreen = OffscreenTarget::new(gpu, (size.width, size.height), cfg.msaa_samples);

        let mut scene_renderer = SceneRenderer::new(device, billboard, marker);
        scene_renderer.clear_color = CLEAR_COLOR;
        let meshes = SceneMeshes {
            statue: scene_renderer.add_model(device, statue),
            floor: scene_renderer.add_model(device, floor),
        };

        let composite = CompositeRenderer::new(device, &offscreen);
        let state = AppState::new(offscreen.size(), cfg.movement_scale);

        Ok(Loaded {
            state,
            meshes,
            offscreen,
            scene_renderer,
            composite,
        })
    }
}

impl App for DemoApp {
    fn on_init(&mut self, gpu: &Gpu<'_>) -> Result<()> {
        self.loaded = Some(self.load(gpu)?);
        log::info!("scene ready");
        Ok(())
    }

    fn on_window_event(&mut self, _window_id: WindowId, event: &WindowEvent) -> AppControl {
        if let (WindowEvent::Resized(size), Some(loaded)) = (event, self.loaded.as_mut()) {
            loaded.state.on_resize(size.width, size.height);
        }
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let Some(loaded) = self.loaded.as_mut() else {
            return AppControl::Continue;
        };

        // ── Update ────────────────────────────────────────────────────────
        let input = FrameInput::sample(ctx.input, ctx.input_frame);
        if loaded.state.update(&input, ctx.time.dt) == AppControl::Exit {
            log::info!("escape pressed; exiting");
            return AppControl::Exit;
        }

        let frame = build_frame(&loaded.state, &loaded.meshes);
        let viewport = loaded.state.viewport();

        // ── Render ────────────────────────────────────────────────────────
        let offscreen = &loaded.offscreen;
        let scene_renderer = &mut loaded.scene_renderer;
        let composite = &mut loaded.composite;
        let mut result = Ok(());

        let control = ctx.render(|rctx, target| {
            result = scene_renderer
                .render(
                    rctx,
                    &mut *target.encoder,
                    offscreen,
                    &frame.draws,
                    &frame.camera,
                    &frame.lights,
                )
                .context("scene pass")
                .and_then(|()| {
                    composite
                        .render(rctx, target, &frame.composite, viewport)
                        .context("composite pass")
                });
        });

        if let Err(e) = result {
            if !self.render_error_logged {
                log::error!("frame render failed: {e:#}");
                self.render_error_logged = true;
            }
        }

        control
    }
}
