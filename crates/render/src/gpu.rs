use cadence_common::Viewport;
use cadence_scene::{Material, TextureId};

use crate::error::RenderError;
use crate::mesh::{MeshData, TextureImage};
use crate::uniform::ShaderProgram;

/// Source text for one shader program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    pub name: String,
    pub vertex: String,
    pub fragment: String,
}

impl ShaderSource {
    pub fn new(name: impl Into<String>, vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }
}

/// Uploaded texture.
pub trait GpuTexture {
    fn id(&self) -> TextureId;

    /// Free GPU memory. Calling it again does nothing.
    fn release(&mut self);
}

/// Uploaded geometry together with the material it is drawn with.
pub trait GpuMesh {
    fn material(&self) -> &Material;

    fn index_count(&self) -> u32;

    /// Free buffers and the owned texture, if any. Calling it again does nothing.
    fn release(&mut self);

    fn is_released(&self) -> bool;
}

/// Graphics device as seen by the frame renderer.
pub trait Gpu {
    type Program: ShaderProgram;
    type Mesh: GpuMesh;
    type Texture: GpuTexture;

    /// Compile and link a program. No uniforms are resolved yet.
    fn create_program(&mut self, source: &ShaderSource) -> Result<Self::Program, RenderError>;

    fn create_texture(&mut self, image: &TextureImage) -> Result<Self::Texture, RenderError>;

    /// Upload `data`. The mesh takes ownership of `texture`, and the
    /// material's texture reference is set to it.
    fn create_mesh(
        &mut self,
        data: &MeshData,
        material: Material,
        texture: Option<Self::Texture>,
    ) -> Result<Self::Mesh, RenderError>;

    /// Clear colour and depth.
    fn clear(&mut self);

    fn set_viewport(&mut self, viewport: Viewport);

    /// Draw `mesh` with the uniforms currently set on `program`.
    fn draw(&mut self, program: &Self::Program, mesh: &Self::Mesh);
}
