use glam::Vec3;

use crate::error::RenderError;

/// Vertex and index data ready for upload.
///
/// Attributes are tightly packed: 3 floats per position and normal, 2 per
/// texture coordinate. Triangles are counter-clockwise when front-facing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshData {
    pub positions: Vec<f32>,
    pub tex_coords: Vec<f32>,
    pub normals: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Check that attribute arrays agree and every index is in range.
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.positions.is_empty() || self.positions.len() % 3 != 0 {
            return Err(RenderError::InvalidMesh(format!(
                "position array length {} is not a positive multiple of 3",
                self.positions.len()
            )));
        }
        let vertices = self.vertex_count();
        if self.normals.len() != vertices * 3 {
            return Err(RenderError::InvalidMesh(format!(
                "{} normal floats for {vertices} vertices",
                self.normals.len()
            )));
        }
        if self.tex_coords.len() != vertices * 2 {
            return Err(RenderError::InvalidMesh(format!(
                "{} texture coordinate floats for {vertices} vertices",
                self.tex_coords.len()
            )));
        }
        if self.indices.is_empty() || self.indices.len() % 3 != 0 {
            return Err(RenderError::InvalidMesh(format!(
                "index count {} is not a positive multiple of 3",
                self.indices.len()
            )));
        }
        if let Some(bad) = self.indices.iter().find(|&&i| i as usize >= vertices) {
            return Err(RenderError::InvalidMesh(format!(
                "index {bad} out of range for {vertices} vertices"
            )));
        }
        Ok(())
    }

    /// Unit cube centred on the origin, four vertices per face so each face
    /// gets flat normals and a full texture.
    pub fn cube() -> Self {
        // (normal, u axis, v axis); u x v == normal.
        let faces = [
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        ];
        let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];
        let uvs = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];

        let mut mesh = Self::default();
        for (face, (normal, u, v)) in faces.into_iter().enumerate() {
            let base = (face * 4) as u32;
            for ((su, sv), uv) in corners.into_iter().zip(uvs) {
                let p = (normal + u * su + v * sv) * 0.5;
                mesh.positions.extend_from_slice(&p.to_array());
                mesh.normals.extend_from_slice(&normal.to_array());
                mesh.tex_coords.extend_from_slice(&uv);
            }
            mesh.indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        mesh
    }
}

/// RGBA8 pixels, rows top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl TextureImage {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidTexture(format!(
                "empty texture {width}x{height}"
            )));
        }
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(RenderError::InvalidTexture(format!(
                "{width}x{height} RGBA texture needs {expected} bytes, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Square checkerboard of `cells` x `cells` squares alternating `a` and `b`.
    pub fn checkerboard(size: u32, cells: u32, a: [u8; 4], b: [u8; 4]) -> Self {
        let size = size.max(1);
        let cell = (size / cells.max(1)).max(1);
        let mut pixels = Vec::with_capacity(size as usize * size as usize * 4);
        for y in 0..size {
            for x in 0..size {
                let even = (x / cell + y / cell) % 2 == 0;
                pixels.extend_from_slice(if even { &a } else { &b });
            }
        }
        Self {
            width: size,
            height: size,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_is_valid() {
        let cube = MeshData::cube();
        cube.validate().unwrap();
        assert_eq!(cube.vertex_count(), 24);
        assert_eq!(cube.index_count(), 36);
    }

    #[test]
    fn cube_triangles_face_outward() {
        let cube = MeshData::cube();
        let pos = |i: u32| Vec3::from_slice(&cube.positions[i as usize * 3..]);
        let nrm = |i: u32| Vec3::from_slice(&cube.normals[i as usize * 3..]);
        for tri in cube.indices.chunks(3) {
            let (a, b, c) = (pos(tri[0]), pos(tri[1]), pos(tri[2]));
            let winding = (b - a).cross(c - a);
            assert!(winding.dot(nrm(tri[0])) > 0.0);
        }
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mut cube = MeshData::cube();
        cube.indices[5] = 24;
        let err = cube.validate().unwrap_err();
        assert!(err.to_string().contains("index 24"));
    }

    #[test]
    fn mismatched_normals_are_rejected() {
        let mut cube = MeshData::cube();
        cube.normals.pop();
        assert!(matches!(cube.validate(), Err(RenderError::InvalidMesh(_))));
    }

    #[test]
    fn empty_mesh_is_rejected() {
        assert!(MeshData::default().validate().is_err());
    }

    #[test]
    fn texture_size_must_match_pixels() {
        assert!(TextureImage::new(2, 2, vec![0; 16]).is_ok());
        assert!(matches!(
            TextureImage::new(2, 2, vec![0; 15]),
            Err(RenderError::InvalidTexture(_))
        ));
        assert!(TextureImage::new(0, 4, Vec::new()).is_err());
    }

    #[test]
    fn checkerboard_alternates() {
        let white = [255; 4];
        let black = [0, 0, 0, 255];
        let tex = TextureImage::checkerboard(4, 2, white, black);
        assert_eq!(tex.pixels().len(), 64);
        assert_eq!(&tex.pixels()[0..4], &white);
        assert_eq!(&tex.pixels()[8..12], &black);
    }
}
