//! wgpu backend for the cadence frame renderer.
//!
//! Implements [`cadence_render::Gpu`] on top of a wgpu device and a window
//! surface, with a Phong shader covering ambient, point, spot and directional
//! light.
//!
//! # Invariants
//! - Each program owns a CPU copy of its uniform block. A draw snapshots that
//!   block, so uniforms set after a draw never affect it.
//! - Nothing reaches the screen until [`WgpuGpu::present_frame`].
//! - Released programs, meshes and textures hold no GPU objects; drawing them
//!   is skipped.

mod gpu;
mod layout;
mod resources;
mod shaders;

pub use gpu::WgpuGpu;
pub use resources::{WgpuMesh, WgpuProgram, WgpuTexture};
pub use shaders::{SCENE_SHADER, scene_shader};
