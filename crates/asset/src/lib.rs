//! Asset loading: OBJ meshes flattened for rendering, plus their diffuse
//! textures.
//!
//! Parsing is done by `tobj` and decoding by `image`; GPU upload goes through
//! the [`texture::TextureUploader`] trait.

pub mod error;
pub mod flatten;
pub mod mesh;
pub mod model;
pub mod obj;
pub mod texcoord;
pub mod texture;

pub use error::{AssetError, AssetResult};
pub use model::{DrawBatch, LoadOptions, LoadedModel, load_model};
