use glam::Vec4;
use serde::{Deserialize, Serialize};

/// Identifies a texture uploaded by a GPU backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextureId(pub u64);

/// Surface reflectance properties for the Phong model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub ambient: Vec4,
    pub diffuse: Vec4,
    pub specular: Vec4,
    pub reflectance: f32,
    /// Texture sampled in place of the ambient and diffuse colours.
    pub texture: Option<TextureId>,
}

impl Default for Material {
    fn default() -> Self {
        Self::from_colour(Vec4::ONE, 0.0)
    }
}

impl Material {
    /// Untextured material using `colour` for every term.
    pub fn from_colour(colour: Vec4, reflectance: f32) -> Self {
        Self {
            ambient: colour,
            diffuse: colour,
            specular: colour,
            reflectance,
            texture: None,
        }
    }

    /// White material sampling `texture`.
    pub fn textured(texture: TextureId, reflectance: f32) -> Self {
        Self {
            texture: Some(texture),
            ..Self::from_colour(Vec4::ONE, reflectance)
        }
    }

    pub fn has_texture(&self) -> bool {
        self.texture.is_some()
    }
}
