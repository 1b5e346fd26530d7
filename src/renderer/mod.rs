//! Rendering module
//!
//! `shapes` turns simulation state into a [`Frame`] and never mutates it;
//! `pipeline` uploads frames to a WebGPU surface.

pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
pub use shapes::{Frame, invaders_frame, snake_frame};
pub use vertex::Vertex;
