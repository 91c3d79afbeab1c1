use cadence_render::{GpuMesh, GpuTexture, RenderError, ShaderProgram, UniformLocations, UniformValue};
use cadence_scene::{Material, TextureId};
use std::sync::Arc;

use crate::layout::{self, UniformBlock, UniformSlot};

/// Render pipeline plus the CPU copy of its uniform block.
///
/// Uniform writes land in the CPU block; each draw snapshots it.
pub struct WgpuProgram {
    pub(crate) name: String,
    pub(crate) pipeline: Option<Arc<wgpu::RenderPipeline>>,
    locations: UniformLocations<UniformSlot>,
    pub(crate) block: UniformBlock,
    pub(crate) bound: bool,
}

impl WgpuProgram {
    pub(crate) fn new(name: String, pipeline: Option<Arc<wgpu::RenderPipeline>>) -> Self {
        Self {
            locations: UniformLocations::new(name.clone()),
            name,
            pipeline,
            block: bytemuck::Zeroable::zeroed(),
            bound: false,
        }
    }

    pub fn uniform_count(&self) -> usize {
        self.locations.len()
    }
}

impl ShaderProgram for WgpuProgram {
    fn name(&self) -> &str {
        &self.name
    }

    fn create_uniform(&mut self, name: &str) -> Result<(), RenderError> {
        let slot = layout::lookup(name).ok_or_else(|| self.locations.not_found(name))?;
        self.locations.insert(name, slot);
        Ok(())
    }

    fn set_uniform(&mut self, name: &str, value: UniformValue) -> Result<(), RenderError> {
        let slot = self.locations.get(name)?;
        self.block
            .write(slot, value)
            .map_err(|kind| RenderError::UniformType {
                program: self.name.clone(),
                name: name.to_owned(),
                expected: kind.name(),
            })
    }

    fn bind(&mut self) {
        self.bound = true;
    }

    fn unbind(&mut self) {
        self.bound = false;
    }

    fn release(&mut self) {
        if self.pipeline.take().is_some() {
            self.bound = false;
            tracing::debug!(program = %self.name, "program released");
        }
    }
}

/// Uploaded RGBA texture and the bind group sampling it.
pub struct WgpuTexture {
    pub(crate) id: TextureId,
    pub(crate) texture: Option<wgpu::Texture>,
    pub(crate) bind_group: Option<Arc<wgpu::BindGroup>>,
}

impl GpuTexture for WgpuTexture {
    fn id(&self) -> TextureId {
        self.id
    }

    fn release(&mut self) {
        if self.texture.take().is_some() {
            self.bind_group = None;
            tracing::debug!(texture = self.id.0, "texture released");
        }
    }
}

pub(crate) struct MeshBuffers {
    pub vertex: Arc<wgpu::Buffer>,
    pub index: Arc<wgpu::Buffer>,
}

/// Vertex and index buffers with the material they are drawn with.
pub struct WgpuMesh {
    pub(crate) material: Material,
    pub(crate) index_count: u32,
    pub(crate) buffers: Option<MeshBuffers>,
    pub(crate) texture: Option<WgpuTexture>,
}

impl GpuMesh for WgpuMesh {
    fn material(&self) -> &Material {
        &self.material
    }

    fn index_count(&self) -> u32 {
        self.index_count
    }

    fn release(&mut self) {
        if self.buffers.is_none() {
            return;
        }
        if let Some(texture) = &mut self.texture {
            texture.release();
        }
        self.buffers = None;
        tracing::debug!(indices = self.index_count, "mesh released");
    }

    fn is_released(&self) -> bool {
        self.buffers.is_none()
    }
}
