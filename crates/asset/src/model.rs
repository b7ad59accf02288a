//! One-call model loading: geometry, texture coordinates and diffuse
//! textures.

use std::{
    ops::Range,
    path::{Path, PathBuf},
};

use crate::{
    error::AssetResult,
    flatten::flatten,
    mesh::{FlatMesh, Material},
    obj::load_indexed,
    texcoord::flatten_texcoords,
    texture::{TextureCache, TextureFilter, TextureHandle, TextureUploader, load_textures},
};

#[derive(Clone, Debug, PartialEq)]
pub struct LoadOptions {
    /// Size of the dominant bounding-box axis after loading.
    pub scale: f32,
    /// Fallback directory for texture files; defaults to the OBJ's directory.
    pub base_dir: Option<PathBuf>,
    pub filter: TextureFilter,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            base_dir: None,
            filter: TextureFilter::default(),
        }
    }
}

/// Everything a render loop needs to draw a loaded OBJ.
#[derive(Clone, Debug, Default)]
pub struct LoadedModel {
    pub mesh: FlatMesh,
    /// 2 floats per vertex, parallel to `mesh.positions`.
    pub texcoords: Vec<f32>,
    pub materials: Vec<Material>,
}

/// One draw call: a vertex range and the material to bind for it.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawBatch<'a> {
    pub vertices: Range<u32>,
    pub material: Option<&'a Material>,
    pub texture: Option<TextureHandle>,
}

impl LoadedModel {
    /// One batch per material segment, in buffer order.
    pub fn draw_batches<'a>(
        &'a self,
        cache: &'a TextureCache,
    ) -> impl Iterator<Item = DrawBatch<'a>> + 'a {
        self.mesh.draw_ranges().map(move |(vertices, id)| {
            let material = id.and_then(|id| self.materials.get(id.index()));
            let texture = material
                .and_then(|m| m.diffuse_texture.as_deref())
                .and_then(|name| cache.get(name))
                .filter(|h| h.is_valid());
            DrawBatch {
                vertices,
                material,
                texture,
            }
        })
    }
}

/// Load `path`, flatten it to `options.scale` and upload its textures.
pub fn load_model<U: TextureUploader + ?Sized>(
    path: impl AsRef<Path>,
    options: &LoadOptions,
    cache: &mut TextureCache,
    uploader: &mut U,
) -> AssetResult<LoadedModel> {
    let path = path.as_ref();
    let (indexed, materials) = load_indexed(path)?;

    let mesh = flatten(&indexed, options.scale)?;
    let texcoords = flatten_texcoords(&indexed)?;

    let base_dir = options
        .base_dir
        .clone()
        .or_else(|| path.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    let added = load_textures(&materials, &base_dir, cache, uploader, options.filter)?;

    log::info!(
        "Loaded {}: {} triangles in {} shapes, {} materials, {} new textures",
        path.display(),
        mesh.triangle_count(),
        mesh.shapes.len(),
        materials.len(),
        added
    );

    Ok(LoadedModel {
        mesh,
        texcoords,
        materials,
    })
}
