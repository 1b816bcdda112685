//! Fixed scene content and per-frame draw assembly.

use glam::{Mat4, Vec3};
use statuary_engine::render::{Vertex, POINT_LIGHT_COUNT};
use statuary_engine::scene::{DrawList, MeshId, UniformSet};

use crate::lights::{light_position, marker_model, PointLight, SpotLight, MARKER_OFFSETS};
use crate::state::AppState;

/// Grass billboard positions, drawn in this order without depth sorting.
pub const VEGETATION: [Vec3; 5] = [
    Vec3::new(-2.3, -0.75, 0.25),
    Vec3::new(1.2, -0.75, 0.25),
    Vec3::new(-0.5, -0.75, 2.0),
    Vec3::new(-1.6, -0.75, 1.4),
    Vec3::new(0.6, -0.75, 1.4),
];

/// Scene pass clear color.
pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.05,
    g: 0.05,
    b: 0.05,
    a: 1.0,
};

pub const SHININESS: f32 = 128.0;

/// Unit quad in the XZ plane facing +Y; texcoords repeat 10 times.
pub const FLOOR_VERTICES: [Vertex; 4] = [
    Vertex { position: [1.0, 0.0, 1.0], normal: [0.0, 1.0, 0.0], uv: [10.0, 10.0] },
    Vertex { position: [1.0, 0.0, -1.0], normal: [0.0, 1.0, 0.0], uv: [10.0, 0.0] },
    Vertex { position: [-1.0, 0.0, 1.0], normal: [0.0, 1.0, 0.0], uv: [0.0, 10.0] },
    Vertex { position: [-1.0, 0.0, -1.0], normal: [0.0, 1.0, 0.0], uv: [0.0, 0.0] },
];
pub const FLOOR_INDICES: [u32; 6] = [0, 1, 3, 0, 2, 3];

/// Upright unit quad with its left edge on the origin. V runs top to bottom
/// because the grass texture is flipped on load.
pub const BILLBOARD_VERTICES: [Vertex; 6] = [
    Vertex { position: [0.0, 0.5, 0.0], normal: [0.0, 0.0, 1.0], uv: [0.0, 0.0] },
    Vertex { position: [0.0, -0.5, 0.0], normal: [0.0, 0.0, 1.0], uv: [0.0, 1.0] },
    Vertex { position: [1.0, -0.5, 0.0], normal: [0.0, 0.0, 1.0], uv: [1.0, 1.0] },
    Vertex { position: [0.0, 0.5, 0.0], normal: [0.0, 0.0, 1.0], uv: [0.0, 0.0] },
    Vertex { position: [1.0, -0.5, 0.0], normal: [0.0, 0.0, 1.0], uv: [1.0, 1.0] },
    Vertex { position: [1.0, 0.5, 0.0], normal: [0.0, 0.0, 1.0], uv: [1.0, 0.0] },
];
pub const BILLBOARD_INDICES: [u32; 6] = [0, 1, 2, 3, 4, 5];

pub fn billboard_model(position: Vec3) -> Mat4 {
    Mat4::from_scale(Vec3::splat(4.0))
        * Mat4::from_translation(position)
        * Mat4::from_rotation_x(3.14)
}

pub fn statue_model() -> Mat4 {
    Mat4::from_translation(Vec3::new(0.0, -5.0, 0.0)) * Mat4::from_scale(Vec3::splat(0.3))
}

pub fn floor_model() -> Mat4 {
    Mat4::from_translation(Vec3::new(0.0, -5.0, 0.0)) * Mat4::from_scale(Vec3::new(20.0, 1.0, 20.0))
}

/// Handles of the opaque meshes registered with the scene renderer.
#[derive(Debug, Copy, Clone)]
pub struct SceneMeshes {
    pub statue: MeshId,
    pub floor: MeshId,
}

/// One frame's draw commands and the uniform sets of each pass.
#[derive(Debug, Default)]
pub struct FrameScene {
    pub draws: DrawList,
    /// `projection`, `view`
    pub camera: UniformSet,
    /// Point lights, spotlight, `viewPos`, `material.shininess`
    pub lights: UniformSet,
    /// `effect`
    pub composite: UniformSet,
}

/// Assembles the frame: billboards, light markers, statue, floor.
///
/// Each point light is placed from the same matrix its marker is drawn with.
pub fn build_frame(state: &AppState, meshes: &SceneMeshes) -> FrameScene {
    let mut frame = FrameScene::default();

    frame
        .camera
        .set_mat4("projection", state.camera.projection(state.aspect()));
    frame.camera.set_mat4("view", state.camera.view_matrix());

    for position in VEGETATION {
        frame.draws.push_billboard(billboard_model(position));
    }

    for (i, offset) in MARKER_OFFSETS.into_iter().enumerate().take(POINT_LIGHT_COUNT) {
        let model = marker_model(offset);
        frame.draws.push_light_marker(model, i);
        PointLight::at(light_position(model)).write(&mut frame.lights, i);
    }

    SpotLight::new(state.spotlight_active()).write(&mut frame.lights);
    frame.lights.set_vec3("viewPos", state.camera.position());
    frame.lights.set_float("material.shininess", SHININESS);

    frame.draws.push_opaque(meshes.statue, statue_model());
    frame.draws.push_opaque(meshes.floor, floor_model());

    frame.composite.set_int("effect", state.effect().as_uniform());
    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use statuary_engine::render::{greyscale, EffectUniform, LightUniforms};
    use statuary_engine::scene::DrawCmd;

    use crate::state::FrameInput;

    const MESHES: SceneMeshes = SceneMeshes {
        statue: MeshId(0),
        floor: MeshId(1),
    };

    fn state() -> AppState {
        AppState::new((800, 600), 5.0)
    }

    fn press_q(s: &mut AppState) {
        s.update(&FrameInput { spotlight_presses: 1, ..Default::default() }, 0.016);
        s.update(&FrameInput::default(), 0.016);
    }

    fn spot_triple(frame: &FrameScene) -> (Vec3, Vec3, Vec3) {
        let v = |n: &str| frame.lights.vec3(n).unwrap();
        (v("spotLight.ambient"), v("spotLight.diffuse"), v("spotLight.specular"))
    }

    // ── draw order ────────────────────────────────────────────────────────

    #[test]
    fn draws_in_fixed_order() {
        let frame = build_frame(&state(), &MESHES);
        let items = frame.draws.items();
        assert_eq!(items.len(), 5 + 8 + 2);

        for (cmd, pos) in items[..5].iter().zip(VEGETATION) {
            assert_eq!(*cmd, DrawCmd::Billboard { model: billboard_model(pos) });
        }
        for (i, cmd) in items[5..13].iter().enumerate() {
            assert_eq!(*cmd, DrawCmd::LightMarker { model: marker_model(MARKER_OFFSETS[i]), light: i });
        }
        assert_eq!(items[13], DrawCmd::Opaque { mesh: MESHES.statue, model: statue_model() });
        assert_eq!(items[14], DrawCmd::Opaque { mesh: MESHES.floor, model: floor_model() });
    }

    #[test]
    fn lights_follow_marker_matrices() {
        let frame = build_frame(&state(), &MESHES);
        for cmd in frame.draws.iter() {
            if let DrawCmd::LightMarker { model, light } = cmd {
                let name = format!("pointLights[{light}].position");
                assert_eq!(frame.lights.vec3(&name), Some(light_position(*model)));
            }
        }
    }

    // ── uniforms ──────────────────────────────────────────────────────────

    #[test]
    fn light_set_is_complete() {
        let frame = build_frame(&state(), &MESHES);
        let packed = LightUniforms::from_set(&frame.lights).unwrap();
        assert_eq!(packed.material[0], 128.0);
        assert_eq!(packed.view_pos, [0.0, 1.0, 12.0, 0.0]);
        assert_eq!(packed.point_lights[0].attenuation, [5.0, 0.1, 0.01, 0.0]);
    }

    #[test]
    fn camera_projection_uses_offscreen_aspect() {
        let mut s = state();
        s.on_resize(1920, 1080);
        let frame = build_frame(&s, &MESHES);
        let expected = Mat4::perspective_rh(45f32.to_radians(), 800.0 / 600.0, 0.1, 100.0);
        assert_eq!(frame.camera.mat4("projection"), Some(expected));
    }

    // ── spotlight ─────────────────────────────────────────────────────────

    #[test]
    fn q_once_lights_spot_and_again_darkens() {
        let mut s = state();
        assert_eq!(spot_triple(&build_frame(&s, &MESHES)), (Vec3::ZERO, Vec3::ZERO, Vec3::ZERO));

        press_q(&mut s);
        assert_eq!(spot_triple(&build_frame(&s, &MESHES)), (Vec3::ZERO, Vec3::ONE, Vec3::ONE));

        press_q(&mut s);
        assert_eq!(spot_triple(&build_frame(&s, &MESHES)), (Vec3::ZERO, Vec3::ZERO, Vec3::ZERO));
    }

    // ── composite ─────────────────────────────────────────────────────────

    #[test]
    fn e_once_sends_greyscale_effect() {
        let mut s = state();
        assert_eq!(build_frame(&s, &MESHES).composite.int("effect"), Some(0));

        s.update(&FrameInput { effect_presses: 1, ..Default::default() }, 0.016);
        let frame = build_frame(&s, &MESHES);
        let effect = EffectUniform::from_set(&frame.composite).unwrap();
        assert_eq!(effect.effect, 1);

        let pixel = [0.8, 0.4, 0.2];
        let expected = 0.2126 * 0.8 + 0.7152 * 0.4 + 0.0722 * 0.2;
        assert!((greyscale(pixel) - expected).abs() < 1e-6);
    }
}
