use cadence_render::transform::{projection_matrix, view_matrix};
use cadence_render::{FOV_DEGREES, Z_FAR, Z_NEAR};
use cadence_scene::Camera;
use glam::{Vec3, Vec4};
use serde::Serialize;

/// A world-space point carried through view and projection.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Projection {
    pub clip: Vec4,
    /// Normalized device coordinates, `None` when `w` is not positive.
    pub ndc: Option<Vec3>,
    pub visible: bool,
}

pub fn project(point: Vec3, camera: &Camera, width: u32, height: u32) -> Projection {
    let projection = projection_matrix(FOV_DEGREES.to_radians(), width, height, Z_NEAR, Z_FAR);
    let clip = projection * view_matrix(camera) * point.extend(1.0);
    let ndc = (clip.w > 0.0).then(|| clip.truncate() / clip.w);
    let visible = ndc.is_some_and(|n| n.abs().max_element() <= 1.0);
    Projection { clip, ndc, visible }
}
