//! Error type shared by every loader in this crate.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to parse OBJ {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("failed to find texture '{name}' (also tried {})", .base_dir.display())]
    ResourceMissing { name: String, base_dir: PathBuf },

    #[error("invalid texture coordinate index (shape {shape}, face {face}, corner {corner})")]
    InvalidTexcoordIndex {
        shape: usize,
        face: usize,
        corner: usize,
    },

    #[error("{kind} index {index} out of bounds (len={len})")]
    IndexOutOfBounds {
        kind: &'static str,
        index: u32,
        len: usize,
    },

    #[error("failed to decode texture {}", .path.display())]
    TextureDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("{0} vertices exceed the u32 index range")]
    TooManyVertices(usize),
}

pub type AssetResult<T> = Result<T, AssetError>;
