//! World space to clip space.
//!
//! Matrices are column-major and right-handed, with OpenGL clip depth
//! (`[-w, w]`). Backends with `[0, w]` depth remap in the vertex stage.

use cadence_scene::{Camera, DirectionalLight, Light, PointLight, SceneItem, SpotLight};
use glam::{Mat4, Vec3, Vec4Swizzles};

/// Perspective projection. A zero-sized viewport is treated as 1x1 pixels.
pub fn projection_matrix(fov_radians: f32, width: u32, height: u32, z_near: f32, z_far: f32) -> Mat4 {
    let aspect = width.max(1) as f32 / height.max(1) as f32;
    Mat4::perspective_rh_gl(fov_radians, aspect, z_near, z_far)
}

/// Inverse of the camera's placement: pitch about X, then yaw about Y, then
/// the negated position. Roll is not applied.
pub fn view_matrix(camera: &Camera) -> Mat4 {
    let rotation = camera.rotation;
    Mat4::from_rotation_x(rotation.x.to_radians())
        * Mat4::from_rotation_y(rotation.y.to_radians())
        * Mat4::from_translation(-camera.position)
}

/// Translate, then rotate about X, Y and Z (degrees), then scale uniformly.
pub fn model_matrix(position: Vec3, rotation: Vec3, scale: f32) -> Mat4 {
    Mat4::from_translation(position)
        * Mat4::from_rotation_x(rotation.x.to_radians())
        * Mat4::from_rotation_y(rotation.y.to_radians())
        * Mat4::from_rotation_z(rotation.z.to_radians())
        * Mat4::from_scale(Vec3::splat(scale))
}

pub fn item_model_matrix<M>(item: &SceneItem<M>) -> Mat4 {
    model_matrix(item.position, item.rotation, item.scale)
}

pub fn model_view_matrix<M>(item: &SceneItem<M>, view: &Mat4) -> Mat4 {
    *view * item_model_matrix(item)
}

/// Copy of `light` with its position in view space.
pub fn point_light_in_view_space(light: &PointLight, view: &Mat4) -> PointLight {
    PointLight {
        position: view.transform_point3(light.position),
        ..*light
    }
}

/// Copy of `light` with its position and cone direction in view space.
pub fn spot_light_in_view_space(light: &SpotLight, view: &Mat4) -> SpotLight {
    let mut spot = *light;
    spot.point = point_light_in_view_space(&light.point, view);
    spot.cone_direction = (*view * light.cone_direction.extend(0.0)).xyz();
    spot
}

/// Copy of `light` with its direction rotated into view space. Camera
/// translation has no effect on the result.
pub fn directional_light_in_view_space(light: &DirectionalLight, view: &Mat4) -> DirectionalLight {
    DirectionalLight {
        direction: (*view * light.direction.extend(0.0)).xyz(),
        ..*light
    }
}

pub fn light_in_view_space(light: &Light, view: &Mat4) -> Light {
    match light {
        Light::Point(p) => Light::Point(point_light_in_view_space(p, view)),
        Light::Spot(s) => Light::Spot(spot_light_in_view_space(s, view)),
        Light::Directional(d) => Light::Directional(directional_light_in_view_space(d, view)),
    }
}

/// Keeps the most recent projection and view matrices of a frame.
#[derive(Debug, Clone)]
pub struct Transformation {
    projection: Mat4,
    view: Mat4,
}

impl Default for Transformation {
    fn default() -> Self {
        Self {
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
        }
    }
}

impl Transformation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_projection(
        &mut self,
        fov_radians: f32,
        width: u32,
        height: u32,
        z_near: f32,
        z_far: f32,
    ) -> Mat4 {
        self.projection = projection_matrix(fov_radians, width, height, z_near, z_far);
        self.projection
    }

    pub fn update_view(&mut self, camera: &Camera) -> Mat4 {
        self.view = view_matrix(camera);
        self.view
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_scene::{Attenuation, Emission};
    use glam::Vec4;
    use std::sync::Arc;

    const EPS: f32 = 1e-4;

    fn cameras() -> Vec<Camera> {
        vec![
            Camera::default(),
            Camera::new(Vec3::new(3.0, -2.0, 7.5), Vec3::ZERO),
            Camera::new(Vec3::new(-1.0, 4.0, 2.0), Vec3::new(30.0, -45.0, 0.0)),
            Camera::new(Vec3::new(100.0, 0.5, -20.0), Vec3::new(-89.0, 270.0, 15.0)),
        ]
    }

    fn inside_clip_volume(clip: Vec4) -> bool {
        clip.w > 0.0 && clip.x.abs() <= clip.w && clip.y.abs() <= clip.w && clip.z.abs() <= clip.w
    }

    #[test]
    fn view_maps_camera_position_to_origin() {
        for camera in cameras() {
            let view = view_matrix(&camera);
            let origin = view.transform_point3(camera.position);
            assert!(origin.abs_diff_eq(Vec3::ZERO, EPS), "{camera:?} -> {origin}");
        }
    }

    #[test]
    fn unrotated_camera_faces_negative_z() {
        let camera = Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        let ahead = view_matrix(&camera).transform_point3(Vec3::ZERO);
        assert!(ahead.abs_diff_eq(Vec3::new(0.0, 0.0, -5.0), EPS));
    }

    #[test]
    fn pitch_is_applied_after_yaw() {
        let camera = Camera::new(Vec3::ZERO, Vec3::new(90.0, 90.0, 0.0));
        let view = view_matrix(&camera);
        let expected = Mat4::from_rotation_x(90f32.to_radians()) * Mat4::from_rotation_y(90f32.to_radians());
        assert!(view.abs_diff_eq(expected, EPS));
        let swapped = Mat4::from_rotation_y(90f32.to_radians()) * Mat4::from_rotation_x(90f32.to_radians());
        assert!(!view.abs_diff_eq(swapped, EPS));
    }

    #[test]
    fn identity_item_model_view_equals_view() {
        let item = SceneItem::new(Arc::new(()));
        for camera in cameras() {
            let view = view_matrix(&camera);
            assert!(model_view_matrix(&item, &view).abs_diff_eq(view, EPS));
        }
    }

    #[test]
    fn model_matrix_scales_then_translates() {
        let m = model_matrix(Vec3::new(1.0, -1.0, 1.0), Vec3::ZERO, 1.5);
        let p = m.transform_point3(Vec3::ONE);
        assert!(p.abs_diff_eq(Vec3::new(2.5, 0.5, 2.5), EPS));
    }

    #[test]
    fn model_rotation_uses_degrees() {
        let m = model_matrix(Vec3::ZERO, Vec3::new(0.0, 90.0, 0.0), 1.0);
        let p = m.transform_point3(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::NEG_Z, EPS));
    }

    #[test]
    fn projection_keeps_points_ahead_and_rejects_points_behind() {
        let proj = projection_matrix(60f32.to_radians(), 800, 600, 0.01, 1000.0);
        let view = view_matrix(&Camera::default());
        let ahead = proj * view * Vec4::new(0.0, 0.0, -5.0, 1.0);
        let behind = proj * view * Vec4::new(0.0, 0.0, 5.0, 1.0);
        assert!(inside_clip_volume(ahead), "{ahead}");
        assert!(!inside_clip_volume(behind), "{behind}");
    }

    #[test]
    fn projection_survives_zero_viewport() {
        let proj = projection_matrix(60f32.to_radians(), 0, 0, 0.01, 1000.0);
        assert!(proj.is_finite());
    }

    #[test]
    fn directional_light_ignores_camera_translation() {
        let light = DirectionalLight::new(Vec3::ONE, Vec3::new(-1.0, 0.0, 0.0), 1.0);
        let rotation = Vec3::new(20.0, 35.0, 0.0);
        let near = view_matrix(&Camera::new(Vec3::ZERO, rotation));
        let far = view_matrix(&Camera::new(Vec3::new(50.0, -8.0, 12.0), rotation));
        let a = directional_light_in_view_space(&light, &near).direction;
        let b = directional_light_in_view_space(&light, &far).direction;
        assert!(a.abs_diff_eq(b, EPS));

        let turned = view_matrix(&Camera::new(Vec3::ZERO, Vec3::new(0.0, 90.0, 0.0)));
        let c = directional_light_in_view_space(&light, &turned).direction;
        assert!(!a.abs_diff_eq(c, EPS));
    }

    #[test]
    fn point_light_position_moves_into_view_space() {
        let light = PointLight::new(Vec3::ONE, Vec3::new(0.0, 0.0, 1.0), 1.0);
        let view = view_matrix(&Camera::new(Vec3::new(0.0, 0.0, 3.0), Vec3::ZERO));
        let moved = point_light_in_view_space(&light, &view);
        assert!(moved.position.abs_diff_eq(Vec3::new(0.0, 0.0, -2.0), EPS));
        assert_eq!(moved.emission, light.emission);
        assert_eq!(moved.attenuation, light.attenuation);
    }

    #[test]
    fn view_space_transformation_leaves_source_lights_untouched() {
        let point = PointLight {
            emission: Emission::new(Vec3::new(0.2, 0.4, 0.6), 3.0),
            position: Vec3::new(1.0, 2.0, 3.0),
            attenuation: Attenuation::new(0.0, 0.0, 0.02),
        };
        let lights = [
            Light::Point(point),
            Light::Spot(SpotLight::new(point, Vec3::NEG_Z, 140.0)),
            Light::Directional(DirectionalLight::new(Vec3::ONE, Vec3::NEG_X, 1.0)),
        ];
        let view = view_matrix(&Camera::new(Vec3::new(4.0, 5.0, 6.0), Vec3::new(10.0, 20.0, 0.0)));
        for light in lights {
            let before = light;
            let moved = light_in_view_space(&light, &view);
            assert_eq!(light, before);
            assert_ne!(moved, light);
            assert_eq!(moved.emission(), light.emission());
        }
    }

    #[test]
    fn spot_light_keeps_cutoff_and_rotates_cone() {
        let spot = SpotLight::new(PointLight::default(), Vec3::NEG_Z, 140.0);
        let view = view_matrix(&Camera::new(Vec3::new(9.0, 0.0, 0.0), Vec3::new(0.0, 90.0, 0.0)));
        let moved = spot_light_in_view_space(&spot, &view);
        assert_eq!(moved.cutoff(), spot.cutoff());
        let expected = (view * Vec3::NEG_Z.extend(0.0)).xyz();
        assert!(moved.cone_direction.abs_diff_eq(expected, EPS));
    }

    #[test]
    fn transformation_caches_latest_matrices() {
        let mut t = Transformation::new();
        let camera = Camera::new(Vec3::ONE, Vec3::ZERO);
        let view = t.update_view(&camera);
        let proj = t.update_projection(1.0, 640, 480, 0.1, 100.0);
        assert_eq!(t.view(), view);
        assert_eq!(t.projection(), proj);
    }
}
