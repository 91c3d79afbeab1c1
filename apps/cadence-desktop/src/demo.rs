use cadence_common::BoxError;
use cadence_input::{InputState, Key};
use cadence_kernel::{GameLogic, Window};
use cadence_render::{FrameRenderer, Gpu, GpuMesh, MeshData, TextureImage};
use cadence_render_wgpu::{WgpuGpu, WgpuMesh, scene_shader};
use cadence_scene::{Attenuation, DirectionalLight, Material, PointLight, Scene, SceneItem, SpotLight};
use glam::Vec3;
use std::sync::Arc;

use crate::window::DesktopWindow;

const MOUSE_SENSITIVITY: f32 = 0.2;
const CAMERA_POS_STEP: f32 = 0.5;
const SPOT_CUTOFF_DEGREES: f32 = 140.0;
const SUN_STEP_DEGREES: f32 = 1.1;

/// Camera offset requested by the keys currently held.
///
/// W/S wins over its opposite when both are held, likewise A/D and Z/X.
fn camera_step(input: &InputState) -> Vec3 {
    let axis = |neg: Key, pos: Key| {
        if input.is_key_pressed(neg) {
            -1.0
        } else if input.is_key_pressed(pos) {
            1.0
        } else {
            0.0
        }
    };
    Vec3::new(axis(Key::A, Key::D), axis(Key::Z, Key::X), axis(Key::W, Key::S))
}

/// Light animation: the spot cone sways and the sun crosses the sky.
#[derive(Debug, Clone, PartialEq)]
struct LightCycle {
    sun_angle: f32,
    spot_angle: f32,
    spot_inc: f32,
}

impl Default for LightCycle {
    fn default() -> Self {
        Self {
            sun_angle: -90.0,
            spot_angle: 0.0,
            spot_inc: 1.0,
        }
    }
}

impl LightCycle {
    fn advance(&mut self, spot: &mut SpotLight, sun: &mut DirectionalLight) {
        self.spot_angle += self.spot_inc * 0.05;
        if self.spot_angle > 2.0 {
            self.spot_inc = -1.0;
        } else if self.spot_angle < -2.0 {
            self.spot_inc = 1.0;
        }
        spot.cone_direction.y = self.spot_angle.to_radians().sin();

        self.sun_angle += SUN_STEP_DEGREES;
        let emission = &mut sun.emission;
        if self.sun_angle > 90.0 {
            // Night.
            emission.intensity = 0.0;
            if self.sun_angle >= 360.0 {
                self.sun_angle = -90.0;
            }
        } else if self.sun_angle <= -80.0 || self.sun_angle >= 80.0 {
            let factor = 1.0 - (self.sun_angle.abs() - 80.0) / 10.0;
            emission.intensity = factor;
            emission.color.y = factor.max(0.9);
            emission.color.z = factor.max(0.5);
        } else {
            emission.intensity = 1.0;
            emission.color = Vec3::ONE;
        }

        let radians = self.sun_angle.to_radians();
        sun.direction.x = radians.sin();
        sun.direction.y = radians.cos();
    }
}

/// The point light and the spot light share one source: dark (intensity 0)
/// at (0, 0, 10) with a 0.02 quadratic falloff. The sun does the lighting.
fn demo_lights<M>(scene: &mut Scene<M>) {
    scene.ambient_light = Vec3::splat(0.3);
    let source = PointLight::new(Vec3::ONE, Vec3::new(0.0, 0.0, 10.0), 0.0)
        .with_attenuation(Attenuation::new(0.0, 0.0, 0.02));
    scene.point_light = source;
    scene.spot_light = SpotLight::new(source, Vec3::NEG_Z, SPOT_CUTOFF_DEGREES);
    scene.directional_light = DirectionalLight::new(Vec3::ONE, Vec3::new(-1.0, 0.0, 0.0), 1.0);
}

/// One textured cube under animated lights, with a fly camera.
pub struct DemoGame {
    renderer: FrameRenderer<WgpuGpu>,
    scene: Scene<WgpuMesh>,
    camera_inc: Vec3,
    lights: LightCycle,
}

impl DemoGame {
    pub fn new() -> Self {
        Self {
            renderer: FrameRenderer::new(),
            scene: Scene::new(),
            camera_inc: Vec3::ZERO,
            lights: LightCycle::default(),
        }
    }
}

impl Default for DemoGame {
    fn default() -> Self {
        Self::new()
    }
}

impl GameLogic<DesktopWindow> for DemoGame {
    fn init(&mut self, window: &mut DesktopWindow) -> Result<(), BoxError> {
        let gpu = window.gpu_mut();
        self.renderer.init(gpu, &scene_shader())?;

        let grass = TextureImage::checkerboard(64, 8, [86, 156, 58, 255], [120, 84, 48, 255]);
        let texture = gpu.create_texture(&grass)?;
        let material = Material {
            reflectance: 1.0,
            ..Material::default()
        };
        let mesh = gpu.create_mesh(&MeshData::cube(), material, Some(texture))?;

        let cube = SceneItem::new(Arc::new(mesh))
            .with_position(Vec3::new(1.0, -1.0, 1.0))
            .with_scale(1.5);
        self.scene.add_item(cube);
        demo_lights(&mut self.scene);

        tracing::info!(items = self.scene.len(), "demo scene ready");
        Ok(())
    }

    fn input(&mut self, window: &DesktopWindow) {
        self.camera_inc = camera_step(window.input());
    }

    fn update(&mut self, _interval: f32, input: &InputState) -> Result<(), BoxError> {
        self.scene.camera.move_position(self.camera_inc * CAMERA_POS_STEP);
        if input.is_right_button_pressed() {
            let rotation = input.display_vec() * MOUSE_SENSITIVITY;
            self.scene.camera.move_rotation(Vec3::new(rotation.x, rotation.y, 0.0));
        }
        let scene = &mut self.scene;
        self.lights.advance(&mut scene.spot_light, &mut scene.directional_light);
        Ok(())
    }

    fn render(&mut self, window: &mut DesktopWindow) -> Result<(), BoxError> {
        let (surface, gpu) = window.frame_parts();
        self.renderer.render(surface, gpu, &self.scene)?;
        Ok(())
    }

    fn cleanup(&mut self) {
        // Meshes (and their textures) go before the program.
        for mut mesh in self.scene.teardown() {
            mesh.release();
        }
        self.renderer.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_step_follows_held_keys() {
        let mut input = InputState::new();
        assert_eq!(camera_step(&input), Vec3::ZERO);
        input.on_key(Key::W, true);
        input.on_key(Key::D, true);
        input.on_key(Key::Z, true);
        assert_eq!(camera_step(&input), Vec3::new(1.0, -1.0, -1.0));
    }

    #[test]
    fn demo_lights_share_a_dark_source() {
        let mut scene: Scene<()> = Scene::new();
        demo_lights(&mut scene);
        assert_eq!(scene.point_light, scene.spot_light.point);
        assert_eq!(scene.point_light.emission.intensity, 0.0);
        assert_eq!(scene.point_light.position, Vec3::new(0.0, 0.0, 10.0));
        assert_eq!(scene.point_light.attenuation, Attenuation::new(0.0, 0.0, 0.02));
        assert!((scene.spot_light.cutoff() - 140.0_f32.to_radians().cos()).abs() < 1e-6);
        assert_eq!(scene.directional_light.emission.intensity, 1.0);
    }

    #[test]
    fn forward_wins_over_backward() {
        let mut input = InputState::new();
        input.on_key(Key::W, true);
        input.on_key(Key::S, true);
        assert_eq!(camera_step(&input).z, -1.0);
    }

    #[test]
    fn spot_cone_sways_and_turns_back() {
        let mut cycle = LightCycle::default();
        let mut spot = SpotLight::default();
        let mut sun = DirectionalLight::default();
        let mut steps = 0;
        while cycle.spot_inc > 0.0 && steps < 100 {
            cycle.advance(&mut spot, &mut sun);
            steps += 1;
        }
        assert!((40..=41).contains(&steps));
        assert!(cycle.spot_angle > 2.0);
        assert!(spot.cone_direction.y > 0.0);
    }

    #[test]
    fn sun_is_full_at_noon_and_dark_at_night() {
        let mut spot = SpotLight::default();
        let mut sun = DirectionalLight::default();

        let mut cycle = LightCycle {
            sun_angle: -1.1,
            ..LightCycle::default()
        };
        cycle.advance(&mut spot, &mut sun);
        assert_eq!(sun.emission.intensity, 1.0);
        assert_eq!(sun.emission.color, Vec3::ONE);
        assert!(sun.direction.x.abs() < 1e-5);
        assert!((sun.direction.y - 1.0).abs() < 1e-5);

        let mut cycle = LightCycle {
            sun_angle: 100.0,
            ..LightCycle::default()
        };
        cycle.advance(&mut spot, &mut sun);
        assert_eq!(sun.emission.intensity, 0.0);
    }

    #[test]
    fn sun_wraps_after_a_full_turn() {
        let mut spot = SpotLight::default();
        let mut sun = DirectionalLight::default();
        let mut cycle = LightCycle {
            sun_angle: 359.5,
            ..LightCycle::default()
        };
        cycle.advance(&mut spot, &mut sun);
        assert_eq!(cycle.sun_angle, -90.0);
        assert!((sun.direction.x + 1.0).abs() < 1e-5);
    }

    #[test]
    fn dawn_ramps_intensity() {
        let mut spot = SpotLight::default();
        let mut sun = DirectionalLight::default();
        let mut cycle = LightCycle::default();
        cycle.advance(&mut spot, &mut sun);
        // -88.9 degrees: factor 1 - 8.9 / 10.
        assert!((sun.emission.intensity - 0.11).abs() < 1e-3);
        assert_eq!(sun.emission.color.y, 0.9);
        assert_eq!(sun.emission.color.z, 0.5);
    }
}
