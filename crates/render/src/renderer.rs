use cadence_kernel::Surface;
use cadence_scene::Scene;

use crate::error::RenderError;
use crate::gpu::{Gpu, GpuMesh, ShaderSource};
use crate::transform::{
    self, Transformation, directional_light_in_view_space, point_light_in_view_space,
    spot_light_in_view_space,
};
use crate::uniform::{
    AMBIENT_LIGHT, DIRECTIONAL_LIGHT, MATERIAL, MODEL_VIEW_MATRIX, POINT_LIGHT, PROJECTION_MATRIX,
    SPECULAR_POWER, SPOT_LIGHT, ShaderProgram, TEXTURE_SAMPLER,
};

pub const FOV_DEGREES: f32 = 60.0;
pub const Z_NEAR: f32 = 0.01;
pub const Z_FAR: f32 = 1000.0;
pub const SPECULAR_EXPONENT: f32 = 10.0;
pub const TEXTURE_UNIT: i32 = 0;

/// Draws a [`Scene`] with a single lit shader program.
///
/// Owns the program from `init` until `cleanup`. Meshes belong to the scene.
pub struct FrameRenderer<G: Gpu> {
    program: Option<G::Program>,
    transformation: Transformation,
    specular_power: f32,
}

impl<G: Gpu> Default for FrameRenderer<G> {
    fn default() -> Self {
        Self {
            program: None,
            transformation: Transformation::new(),
            specular_power: SPECULAR_EXPONENT,
        }
    }
}

impl<G: Gpu> FrameRenderer<G> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.program.is_some()
    }

    pub fn transformation(&self) -> &Transformation {
        &self.transformation
    }

    /// Build the program and resolve every uniform it is fed per frame.
    ///
    /// On failure the half-built program is released and the renderer stays
    /// uninitialized.
    pub fn init(&mut self, gpu: &mut G, source: &ShaderSource) -> Result<(), RenderError> {
        let mut program = gpu.create_program(source)?;
        if let Err(e) = Self::create_uniforms(&mut program) {
            program.release();
            return Err(e);
        }
        tracing::info!(program = %source.name, "frame renderer ready");
        self.program = Some(program);
        Ok(())
    }

    fn create_uniforms(program: &mut G::Program) -> Result<(), RenderError> {
        program.create_uniform(PROJECTION_MATRIX)?;
        program.create_uniform(MODEL_VIEW_MATRIX)?;
        program.create_uniform(TEXTURE_SAMPLER)?;
        program.create_material_uniform(MATERIAL)?;
        program.create_uniform(SPECULAR_POWER)?;
        program.create_uniform(AMBIENT_LIGHT)?;
        program.create_point_light_uniform(POINT_LIGHT)?;
        program.create_spot_light_uniform(SPOT_LIGHT)?;
        program.create_directional_light_uniform(DIRECTIONAL_LIGHT)
    }

    /// Render one frame of `scene` into `surface`'s current viewport.
    ///
    /// Lights are converted to view space on copies; `scene` is only read.
    pub fn render<S>(&mut self, surface: &mut S, gpu: &mut G, scene: &Scene<G::Mesh>) -> Result<(), RenderError>
    where
        S: Surface + ?Sized,
    {
        let program = self.program.as_mut().ok_or(RenderError::NotInitialized)?;

        gpu.clear();
        let size = surface.size();
        if surface.take_resized() {
            tracing::debug!(width = size.width, height = size.height, "viewport updated");
            gpu.set_viewport(size);
        }

        program.bind();

        let projection = self.transformation.update_projection(
            FOV_DEGREES.to_radians(),
            size.width,
            size.height,
            Z_NEAR,
            Z_FAR,
        );
        program.set_uniform(PROJECTION_MATRIX, projection.into())?;

        let view = self.transformation.update_view(&scene.camera);
        program.set_uniform(TEXTURE_SAMPLER, TEXTURE_UNIT.into())?;

        program.set_uniform(AMBIENT_LIGHT, scene.ambient_light.into())?;
        program.set_uniform(SPECULAR_POWER, self.specular_power.into())?;

        let point = point_light_in_view_space(&scene.point_light, &view);
        program.set_point_light(POINT_LIGHT, &point)?;
        let spot = spot_light_in_view_space(&scene.spot_light, &view);
        program.set_spot_light(SPOT_LIGHT, &spot)?;
        let directional = directional_light_in_view_space(&scene.directional_light, &view);
        program.set_directional_light(DIRECTIONAL_LIGHT, &directional)?;

        for item in scene.items() {
            let model_view = transform::model_view_matrix(item, &view);
            program.set_uniform(MODEL_VIEW_MATRIX, model_view.into())?;
            program.set_material(MATERIAL, item.mesh().material())?;
            gpu.draw(program, item.mesh());
        }

        program.unbind();
        Ok(())
    }

    /// Release the program. Safe to call more than once.
    pub fn cleanup(&mut self) {
        if let Some(mut program) = self.program.take() {
            program.release();
            tracing::debug!("frame renderer released");
        }
    }
}
