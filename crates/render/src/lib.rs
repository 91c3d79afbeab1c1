//! Rendering: transform pipeline, GPU collaborator traits and the frame
//! renderer.
//!
//! # Invariants
//! - The renderer never mutates the scene; lights are moved into view space on
//!   copies.
//! - Uniform locations live in a map owned by each program, never in
//!   process-wide state.
//! - Every GPU resource is released at most once; `release` on a released
//!   resource is a no-op.
//!
//! The [`Gpu`] trait is the seam between the renderer and a device. The
//! [`HeadlessGpu`] backend records commands instead of drawing, so frames can
//! be checked without a display.

mod error;
mod gpu;
mod headless;
mod mesh;
mod renderer;
pub mod transform;
pub mod uniform;

pub use error::RenderError;
pub use gpu::{Gpu, GpuMesh, GpuTexture, ShaderSource};
pub use headless::{
    DrawCall, GpuCommand, HeadlessGpu, HeadlessMesh, HeadlessProgram, HeadlessTexture,
    ProgramCommand,
};
pub use mesh::{MeshData, TextureImage};
pub use renderer::{FOV_DEGREES, FrameRenderer, SPECULAR_EXPONENT, TEXTURE_UNIT, Z_FAR, Z_NEAR};
pub use transform::Transformation;
pub use uniform::{ShaderProgram, UniformLocations, UniformValue};
