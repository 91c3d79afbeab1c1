//! Scene model read by the frame renderer and mutated by game logic.
//!
//! A flat, ordered list of items plus one camera, an ambient term and one
//! light of each kind. Everything here is plain data in world space.
//!
//! # Invariants
//! - Items are drawn in insertion order; removal preserves the order of the rest.
//! - Meshes are shared between items through `Arc`; the scene never releases
//!   GPU state itself, it hands back the meshes it held last on teardown.
//! - A spot light stores the cosine of its cutoff, never the angle.

mod camera;
mod light;
mod material;
mod scene;

pub use camera::Camera;
pub use light::{Attenuation, DirectionalLight, Emission, Light, PointLight, SpotLight};
pub use material::{Material, TextureId};
pub use scene::{Scene, SceneItem};
