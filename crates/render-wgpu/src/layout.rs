//! CPU mirror of the WGSL `Uniforms` block and the name table used to resolve
//! uniform locations.
//!
//! Field order and padding follow WGSL uniform layout rules; the struct sizes
//! are checked in tests.

use bytemuck::{Pod, Zeroable};
use cadence_render::UniformValue;
use std::mem::offset_of;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct PointLightBlock {
    color: [f32; 3],
    intensity: f32,
    position: [f32; 3],
    att_constant: f32,
    att_linear: f32,
    att_exponent: f32,
    _pad: [f32; 2],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct SpotLightBlock {
    point: PointLightBlock,
    cone_direction: [f32; 3],
    cutoff: f32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct DirectionalLightBlock {
    color: [f32; 3],
    intensity: f32,
    direction: [f32; 3],
    _pad: f32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct UniformBlock {
    projection: [[f32; 4]; 4],
    model_view: [[f32; 4]; 4],
    ambient_light: [f32; 3],
    specular_power: f32,
    texture_sampler: i32,
    has_texture: i32,
    reflectance: f32,
    _pad0: f32,
    material_ambient: [f32; 4],
    material_diffuse: [f32; 4],
    material_specular: [f32; 4],
    point_light: PointLightBlock,
    spot_light: SpotLightBlock,
    directional_light: DirectionalLightBlock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SlotKind {
    Int,
    Float,
    Vec3,
    Vec4,
    Mat4,
}

impl SlotKind {
    pub(crate) fn name(self) -> &'static str {
        match self {
            SlotKind::Int => "i32",
            SlotKind::Float => "f32",
            SlotKind::Vec3 => "vec3",
            SlotKind::Vec4 => "vec4",
            SlotKind::Mat4 => "mat4x4",
        }
    }
}

/// Byte offset and type of one uniform inside [`UniformBlock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct UniformSlot {
    pub offset: usize,
    pub kind: SlotKind,
}

fn slot(offset: usize, kind: SlotKind) -> Option<UniformSlot> {
    Some(UniformSlot { offset, kind })
}

fn point_light_slot(base: usize, field: &str) -> Option<UniformSlot> {
    use SlotKind::*;
    match field {
        "color" => slot(base + offset_of!(PointLightBlock, color), Vec3),
        "intensity" => slot(base + offset_of!(PointLightBlock, intensity), Float),
        "position" => slot(base + offset_of!(PointLightBlock, position), Vec3),
        "attenuation.constant" => slot(base + offset_of!(PointLightBlock, att_constant), Float),
        "attenuation.linear" => slot(base + offset_of!(PointLightBlock, att_linear), Float),
        "attenuation.exponent" => slot(base + offset_of!(PointLightBlock, att_exponent), Float),
        _ => None,
    }
}

/// Resolve a uniform name the way a linker would. `None` if the shader has
/// no such uniform.
pub(crate) fn lookup(name: &str) -> Option<UniformSlot> {
    use SlotKind::*;
    match name {
        "projection_matrix" => return slot(offset_of!(UniformBlock, projection), Mat4),
        "model_view_matrix" => return slot(offset_of!(UniformBlock, model_view), Mat4),
        "ambient_light" => return slot(offset_of!(UniformBlock, ambient_light), Vec3),
        "specular_power" => return slot(offset_of!(UniformBlock, specular_power), Float),
        "texture_sampler" => return slot(offset_of!(UniformBlock, texture_sampler), Int),
        _ => {}
    }

    if let Some(field) = name.strip_prefix("material.") {
        return match field {
            "ambient" => slot(offset_of!(UniformBlock, material_ambient), Vec4),
            "diffuse" => slot(offset_of!(UniformBlock, material_diffuse), Vec4),
            "specular" => slot(offset_of!(UniformBlock, material_specular), Vec4),
            "has_texture" => slot(offset_of!(UniformBlock, has_texture), Int),
            "reflectance" => slot(offset_of!(UniformBlock, reflectance), Float),
            _ => None,
        };
    }
    if let Some(field) = name.strip_prefix("point_light.") {
        return point_light_slot(offset_of!(UniformBlock, point_light), field);
    }
    if let Some(field) = name.strip_prefix("spot_light.") {
        let base = offset_of!(UniformBlock, spot_light);
        if let Some(inner) = field.strip_prefix("point_light.") {
            return point_light_slot(base + offset_of!(SpotLightBlock, point), inner);
        }
        return match field {
            "cone_direction" => slot(base + offset_of!(SpotLightBlock, cone_direction), Vec3),
            "cutoff" => slot(base + offset_of!(SpotLightBlock, cutoff), Float),
            _ => None,
        };
    }
    if let Some(field) = name.strip_prefix("directional_light.") {
        let base = offset_of!(UniformBlock, directional_light);
        return match field {
            "color" => slot(base + offset_of!(DirectionalLightBlock, color), Vec3),
            "intensity" => slot(base + offset_of!(DirectionalLightBlock, intensity), Float),
            "direction" => slot(base + offset_of!(DirectionalLightBlock, direction), Vec3),
            _ => None,
        };
    }
    None
}

impl UniformBlock {
    /// Store `value` at `slot`. On a type mismatch returns the expected kind.
    pub(crate) fn write(&mut self, slot: UniformSlot, value: UniformValue) -> Result<(), SlotKind> {
        let bytes = bytemuck::bytes_of_mut(self);
        let mut put = |src: &[u8]| bytes[slot.offset..slot.offset + src.len()].copy_from_slice(src);
        match (slot.kind, value) {
            (SlotKind::Int, UniformValue::Int(v)) => put(bytemuck::bytes_of(&v)),
            (SlotKind::Float, UniformValue::Float(v)) => put(bytemuck::bytes_of(&v)),
            (SlotKind::Vec3, UniformValue::Vec3(v)) => put(bytemuck::bytes_of(&v.to_array())),
            (SlotKind::Vec4, UniformValue::Vec4(v)) => put(bytemuck::bytes_of(&v.to_array())),
            (SlotKind::Mat4, UniformValue::Mat4(m)) => put(bytemuck::bytes_of(&m.to_cols_array())),
            (kind, _) => return Err(kind),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Mat4, Vec3};

    #[test]
    fn block_sizes_match_wgsl_layout() {
        assert_eq!(size_of::<PointLightBlock>(), 48);
        assert_eq!(size_of::<SpotLightBlock>(), 64);
        assert_eq!(size_of::<DirectionalLightBlock>(), 32);
        assert_eq!(size_of::<UniformBlock>(), 352);
    }

    #[test]
    fn struct_members_are_sixteen_byte_aligned() {
        assert_eq!(offset_of!(UniformBlock, material_ambient), 160);
        assert_eq!(offset_of!(UniformBlock, point_light), 208);
        assert_eq!(offset_of!(UniformBlock, spot_light), 256);
        assert_eq!(offset_of!(UniformBlock, directional_light), 320);
    }

    #[test]
    fn nested_spot_light_members_resolve() {
        let slot = lookup("spot_light.point_light.attenuation.exponent").unwrap();
        assert_eq!(slot.offset, 256 + 36);
        assert_eq!(slot.kind, SlotKind::Float);
        assert_eq!(lookup("spot_light.cutoff").unwrap().offset, 256 + 60);
    }

    #[test]
    fn unknown_names_do_not_resolve() {
        assert!(lookup("pointLight.color").is_none());
        assert!(lookup("material.shininess").is_none());
        assert!(lookup("spot_light.point_light.direction").is_none());
    }

    #[test]
    fn write_places_values_at_their_offsets() {
        let mut block = UniformBlock::zeroed();
        block
            .write(lookup("point_light.position").unwrap(), Vec3::new(1.0, 2.0, 3.0).into())
            .unwrap();
        block
            .write(lookup("model_view_matrix").unwrap(), Mat4::IDENTITY.into())
            .unwrap();
        assert_eq!(block.point_light.position, [1.0, 2.0, 3.0]);
        assert_eq!(block.model_view, Mat4::IDENTITY.to_cols_array_2d());
    }

    #[test]
    fn write_rejects_mismatched_kind() {
        let mut block = UniformBlock::zeroed();
        let err = block
            .write(lookup("material.has_texture").unwrap(), 1.0_f32.into())
            .unwrap_err();
        assert_eq!(err, SlotKind::Int);
    }
}
