//! Recording GPU backend with no device behind it.
//!
//! Every clear, viewport change and draw is appended to a command log, and
//! each draw snapshots the program's uniform values, so a frame can be
//! inspected after the fact. Used by the CLI and by tests.

use cadence_common::Viewport;
use cadence_scene::{Material, TextureId};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::RenderError;
use crate::gpu::{Gpu, GpuMesh, GpuTexture, ShaderSource};
use crate::mesh::{MeshData, TextureImage};
use crate::uniform::{ShaderProgram, UniformLocations, UniformValue};

#[derive(Debug, Clone, PartialEq)]
pub enum GpuCommand {
    Clear,
    Viewport(Viewport),
    Draw { program: String, mesh: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramCommand {
    Bind,
    Unbind,
}

/// One recorded draw.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub program: String,
    pub mesh: u64,
    pub program_bound: bool,
    pub texture: Option<TextureId>,
    pub index_count: u32,
    pub uniforms: BTreeMap<String, UniformValue>,
}

impl DrawCall {
    pub fn uniform(&self, name: &str) -> Option<UniformValue> {
        self.uniforms.get(name).copied()
    }
}

/// Counts resources created but not yet released.
#[derive(Debug, Clone, Default)]
struct Liveness(Arc<AtomicUsize>);

impl Liveness {
    fn acquire(&self) -> Lease {
        self.0.fetch_add(1, Ordering::Relaxed);
        Lease(self.0.clone())
    }

    fn count(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }
}

/// Held by a live resource; returning it marks the resource released.
#[derive(Debug)]
struct Lease(Arc<AtomicUsize>);

impl Lease {
    fn end(self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

#[derive(Debug, Default)]
pub struct HeadlessGpu {
    commands: Vec<GpuCommand>,
    draws: Vec<DrawCall>,
    /// Uniform names the "linked" programs expose. `None` accepts any name.
    declared: Option<Arc<HashSet<String>>>,
    viewport: Viewport,
    next_id: u64,
    live: Liveness,
}

impl HeadlessGpu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Programs created afterwards only expose `names`; resolving any other
    /// uniform fails the way a missing location does on a real device.
    pub fn with_declared_uniforms<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.declared = Some(Arc::new(names.into_iter().map(Into::into).collect()));
        self
    }

    pub fn commands(&self) -> &[GpuCommand] {
        &self.commands
    }

    pub fn draws(&self) -> &[DrawCall] {
        &self.draws
    }

    /// Drop recorded commands and draws, keeping everything else.
    pub fn clear_log(&mut self) {
        self.commands.clear();
        self.draws.clear();
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Programs, meshes and textures not yet released.
    pub fn live_resources(&self) -> usize {
        self.live.count()
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Debug)]
pub struct HeadlessProgram {
    name: String,
    locations: UniformLocations<usize>,
    values: BTreeMap<String, UniformValue>,
    declared: Option<Arc<HashSet<String>>>,
    bound: bool,
    log: Vec<ProgramCommand>,
    lease: Option<Lease>,
}

impl HeadlessProgram {
    pub fn is_bound(&self) -> bool {
        self.bound
    }

    pub fn log(&self) -> &[ProgramCommand] {
        &self.log
    }

    pub fn value(&self, name: &str) -> Option<UniformValue> {
        self.values.get(name).copied()
    }

    pub fn uniform_count(&self) -> usize {
        self.locations.len()
    }
}

impl ShaderProgram for HeadlessProgram {
    fn name(&self) -> &str {
        &self.name
    }

    fn create_uniform(&mut self, name: &str) -> Result<(), RenderError> {
        if let Some(declared) = &self.declared {
            if !declared.contains(name) {
                return Err(self.locations.not_found(name));
            }
        }
        let location = self.locations.len();
        self.locations.insert(name, location);
        Ok(())
    }

    fn set_uniform(&mut self, name: &str, value: UniformValue) -> Result<(), RenderError> {
        self.locations.get(name)?;
        self.values.insert(name.to_owned(), value);
        Ok(())
    }

    fn bind(&mut self) {
        self.bound = true;
        self.log.push(ProgramCommand::Bind);
    }

    fn unbind(&mut self) {
        self.bound = false;
        self.log.push(ProgramCommand::Unbind);
    }

    fn release(&mut self) {
        if let Some(lease) = self.lease.take() {
            self.bound = false;
            lease.end();
        }
    }
}

#[derive(Debug)]
pub struct HeadlessTexture {
    id: TextureId,
    width: u32,
    height: u32,
    lease: Option<Lease>,
}

impl HeadlessTexture {
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn is_released(&self) -> bool {
        self.lease.is_none()
    }
}

impl GpuTexture for HeadlessTexture {
    fn id(&self) -> TextureId {
        self.id
    }

    fn release(&mut self) {
        if let Some(lease) = self.lease.take() {
            lease.end();
        }
    }
}

#[derive(Debug)]
pub struct HeadlessMesh {
    id: u64,
    material: Material,
    vertex_count: u32,
    index_count: u32,
    texture: Option<HeadlessTexture>,
    lease: Option<Lease>,
}

impl HeadlessMesh {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn texture(&self) -> Option<&HeadlessTexture> {
        self.texture.as_ref()
    }
}

impl GpuMesh for HeadlessMesh {
    fn material(&self) -> &Material {
        &self.material
    }

    fn index_count(&self) -> u32 {
        self.index_count
    }

    fn release(&mut self) {
        let Some(lease) = self.lease.take() else {
            return;
        };
        if let Some(texture) = &mut self.texture {
            texture.release();
        }
        lease.end();
    }

    fn is_released(&self) -> bool {
        self.lease.is_none()
    }
}

impl Gpu for HeadlessGpu {
    type Program = HeadlessProgram;
    type Mesh = HeadlessMesh;
    type Texture = HeadlessTexture;

    fn create_program(&mut self, source: &ShaderSource) -> Result<HeadlessProgram, RenderError> {
        for (stage, text) in [("vertex", &source.vertex), ("fragment", &source.fragment)] {
            if text.trim().is_empty() {
                return Err(RenderError::ShaderCompile {
                    program: source.name.clone(),
                    stage,
                    log: "empty shader source".into(),
                });
            }
        }
        tracing::debug!(program = %source.name, "headless program linked");
        Ok(HeadlessProgram {
            name: source.name.clone(),
            locations: UniformLocations::new(source.name.clone()),
            values: BTreeMap::new(),
            declared: self.declared.clone(),
            bound: false,
            log: Vec::new(),
            lease: Some(self.live.acquire()),
        })
    }

    fn create_texture(&mut self, image: &TextureImage) -> Result<HeadlessTexture, RenderError> {
        Ok(HeadlessTexture {
            id: TextureId(self.next_id()),
            width: image.width(),
            height: image.height(),
            lease: Some(self.live.acquire()),
        })
    }

    fn create_mesh(
        &mut self,
        data: &MeshData,
        mut material: Material,
        texture: Option<HeadlessTexture>,
    ) -> Result<HeadlessMesh, RenderError> {
        if let Err(e) = data.validate() {
            if let Some(mut texture) = texture {
                texture.release();
            }
            return Err(e);
        }
        material.texture = texture.as_ref().map(GpuTexture::id);
        Ok(HeadlessMesh {
            id: self.next_id(),
            material,
            vertex_count: data.vertex_count() as u32,
            index_count: data.index_count() as u32,
            texture,
            lease: Some(self.live.acquire()),
        })
    }

    fn clear(&mut self) {
        self.commands.push(GpuCommand::Clear);
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.commands.push(GpuCommand::Viewport(viewport));
    }

    fn draw(&mut self, program: &HeadlessProgram, mesh: &HeadlessMesh) {
        if mesh.is_released() {
            tracing::warn!(mesh = mesh.id, "draw of released mesh skipped");
            return;
        }
        self.commands.push(GpuCommand::Draw {
            program: program.name.clone(),
            mesh: mesh.id,
        });
        self.draws.push(DrawCall {
            program: program.name.clone(),
            mesh: mesh.id,
            program_bound: program.bound,
            texture: mesh.material.texture,
            index_count: mesh.index_count,
            uniforms: program.values.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_scene::{Scene, SceneItem};

    fn checker() -> TextureImage {
        TextureImage::checkerboard(4, 2, [255; 4], [0; 4])
    }

    #[test]
    fn mesh_release_is_idempotent_and_frees_its_texture() {
        let mut gpu = HeadlessGpu::new();
        let texture = gpu.create_texture(&checker()).unwrap();
        let mut mesh = gpu
            .create_mesh(&MeshData::cube(), Material::default(), Some(texture))
            .unwrap();
        assert_eq!(gpu.live_resources(), 2);

        mesh.release();
        assert!(mesh.is_released());
        assert!(mesh.texture().unwrap().is_released());
        assert_eq!(gpu.live_resources(), 0);

        mesh.release();
        assert_eq!(gpu.live_resources(), 0);
    }

    #[test]
    fn mesh_material_points_at_owned_texture() {
        let mut gpu = HeadlessGpu::new();
        let texture = gpu.create_texture(&checker()).unwrap();
        let id = texture.id();
        let mesh = gpu
            .create_mesh(&MeshData::cube(), Material::default(), Some(texture))
            .unwrap();
        assert_eq!(mesh.material().texture, Some(id));
        assert_eq!(mesh.index_count(), 36);
        assert_eq!(mesh.vertex_count(), 24);
    }

    #[test]
    fn invalid_mesh_releases_the_texture_it_was_given() {
        let mut gpu = HeadlessGpu::new();
        let texture = gpu.create_texture(&checker()).unwrap();
        let err = gpu
            .create_mesh(&MeshData::default(), Material::default(), Some(texture))
            .unwrap_err();
        assert!(matches!(err, RenderError::InvalidMesh(_)));
        assert_eq!(gpu.live_resources(), 0);
    }

    #[test]
    fn shared_mesh_released_once_after_scene_teardown() {
        let mut gpu = HeadlessGpu::new();
        let mesh = std::sync::Arc::new(
            gpu.create_mesh(&MeshData::cube(), Material::default(), None)
                .unwrap(),
        );
        let mut scene = Scene::new();
        scene.add_item(SceneItem::new(mesh.clone()));
        scene.add_item(SceneItem::new(mesh));

        let mut meshes = scene.teardown();
        assert_eq!(meshes.len(), 1);
        for mesh in &mut meshes {
            mesh.release();
        }
        assert_eq!(gpu.live_resources(), 0);
    }

    #[test]
    fn released_mesh_is_not_drawn() {
        let mut gpu = HeadlessGpu::new();
        let program = gpu
            .create_program(&ShaderSource::new("p", "v", "f"))
            .unwrap();
        let mut mesh = gpu
            .create_mesh(&MeshData::cube(), Material::default(), None)
            .unwrap();
        mesh.release();
        gpu.draw(&program, &mesh);
        assert!(gpu.draws().is_empty());
    }

    #[test]
    fn undeclared_uniform_is_not_found() {
        let mut gpu = HeadlessGpu::new().with_declared_uniforms(["a"]);
        let mut program = gpu
            .create_program(&ShaderSource::new("p", "v", "f"))
            .unwrap();
        program.create_uniform("a").unwrap();
        let err = program.create_uniform("b").unwrap_err();
        assert!(matches!(err, RenderError::UniformNotFound { ref name, .. } if name == "b"));
        assert_eq!(program.uniform_count(), 1);
    }

    #[test]
    fn clear_log_keeps_viewport() {
        let mut gpu = HeadlessGpu::new();
        gpu.set_viewport(Viewport::new(3, 4));
        gpu.clear();
        gpu.clear_log();
        assert!(gpu.commands().is_empty());
        assert_eq!(gpu.viewport(), Viewport::new(3, 4));
    }
}
