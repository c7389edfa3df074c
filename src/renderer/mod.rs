//! WebGPU rendering module
//!
//! Triangle-list geometry built on the CPU from the game state, mapped to
//! NDC around the camera and drawn in a single pass.

pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
pub use scene::build_scene;
