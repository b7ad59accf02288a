//! Renderer side of model loading: texture upload, vertex buffers and
//! per-segment draws on `wgpu`.

pub mod error;
pub mod headless;
pub mod mesh;
pub mod texture;

pub use error::RendererError;
pub use headless::Headless;
pub use mesh::{GpuMesh, Vertex};
pub use texture::{GpuTexture, GpuTextures};
