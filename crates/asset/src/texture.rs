//! Diffuse texture loading: decode with `image`, upload through a
//! [`TextureUploader`], remember handles in a [`TextureCache`].

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use crate::{
    error::{AssetError, AssetResult},
    mesh::Material,
};

/// Decoded 8-bit image with its source channel count (1 to 4).
#[derive(Clone, Debug)]
pub struct DecodedImage {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub channels: u8,
}

impl DecodedImage {
    pub fn new(width: u32, height: u32, channels: u8, pixels: Vec<u8>) -> Self {
        assert_eq!(
            pixels.len(),
            width as usize * height as usize * channels as usize,
            "Pixel buffer doesn't match {width}x{height}x{channels}"
        );
        Self {
            pixels,
            width,
            height,
            channels,
        }
    }

    /// Decode an image file, keeping its channel count.
    pub fn load<P: AsRef<Path>>(path: P) -> AssetResult<Self> {
        let path = path.as_ref();
        log::info!("Loading texture from {:?}", path);

        let img = image::open(path).map_err(|source| AssetError::TextureDecode {
            path: path.to_path_buf(),
            source,
        })?;

        let (width, height) = (img.width(), img.height());
        let channels = img.color().channel_count();
        let pixels = match channels {
            1 => img.into_luma8().into_raw(),
            2 => img.into_luma_alpha8().into_raw(),
            3 => img.into_rgb8().into_raw(),
            _ => img.into_rgba8().into_raw(),
        };
        let channels = channels.min(4);

        log::info!(
            "Decoded texture {}x{} with {} channels ({} bytes)",
            width,
            height,
            channels,
            pixels.len()
        );

        Ok(Self::new(width, height, channels, pixels))
    }

    /// RGBA8 copy for RGB and RGBA sources; `None` for other channel counts.
    pub fn to_rgba8(&self) -> Option<Vec<u8>> {
        match self.channels {
            4 => Some(self.pixels.clone()),
            3 => Some(
                self.pixels
                    .chunks_exact(3)
                    .flat_map(|px| [px[0], px[1], px[2], 255])
                    .collect(),
            ),
            _ => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        let expected = self.width as usize * self.height as usize * self.channels as usize;
        self.pixels.len() == expected && self.width > 0 && self.height > 0
    }
}

/// Sampling filter, in the usual min/mag + mipmap vocabulary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilterMode {
    Nearest,
    Linear,
    NearestMipmapNearest,
    LinearMipmapNearest,
    NearestMipmapLinear,
    #[default]
    LinearMipmapLinear,
}

impl FilterMode {
    #[inline]
    pub fn is_mipmap(self) -> bool {
        !matches!(self, FilterMode::Nearest | FilterMode::Linear)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextureFilter {
    pub min: FilterMode,
    pub mag: FilterMode,
}

impl TextureFilter {
    pub fn new(min: FilterMode, mag: FilterMode) -> Self {
        Self { min, mag }
    }

    pub fn uniform(mode: FilterMode) -> Self {
        Self::new(mode, mode)
    }

    pub fn wants_mipmaps(&self) -> bool {
        self.min.is_mipmap() || self.mag.is_mipmap()
    }
}

/// Opaque handle to an uploaded texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

impl TextureHandle {
    /// Returned when an image could not be turned into a texture.
    pub const INVALID: Self = Self(u32::MAX);

    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

/// Graphics-API side of texture loading.
///
/// Implementations accept 3- and 4-channel images. Anything else is a soft
/// failure: log it and return [`TextureHandle::INVALID`].
pub trait TextureUploader {
    fn upload(&mut self, label: &str, image: &DecodedImage, filter: TextureFilter)
    -> TextureHandle;
}

/// Keeps decoded RGBA8 images in memory instead of on a GPU.
#[derive(Debug, Default)]
pub struct CpuTextures {
    pub textures: Vec<(String, DecodedImage, TextureFilter)>,
}

impl TextureUploader for CpuTextures {
    fn upload(
        &mut self,
        label: &str,
        image: &DecodedImage,
        filter: TextureFilter,
    ) -> TextureHandle {
        let Some(rgba) = image.to_rgba8() else {
            log::warn!(
                "Unsupported image format: {} components ({})",
                image.channels,
                label
            );
            return TextureHandle::INVALID;
        };
        let handle = TextureHandle(self.textures.len() as u32);
        let image = DecodedImage::new(image.width, image.height, 4, rgba);
        self.textures.push((label.to_owned(), image, filter));
        handle
    }
}

/// Texture file name -> uploaded handle. Owned by the caller so separate
/// loads can share (or isolate) uploads.
#[derive(Clone, Debug, Default)]
pub struct TextureCache {
    handles: HashMap<String, TextureHandle>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<TextureHandle> {
        self.handles.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handles.contains_key(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, handle: TextureHandle) {
        self.handles.insert(name.into(), handle);
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, TextureHandle)> {
        self.handles.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Finds a texture file: `name` as given, then `base_dir/name`.
pub fn resolve_texture_path(name: &str, base_dir: &Path) -> AssetResult<PathBuf> {
    let direct = PathBuf::from(name);
    if direct.is_file() {
        return Ok(direct);
    }
    let joined = base_dir.join(name);
    if joined.is_file() {
        return Ok(joined);
    }
    Err(AssetError::ResourceMissing {
        name: name.to_owned(),
        base_dir: base_dir.to_path_buf(),
    })
}

/// Uploads the diffuse texture of every material not already in `cache`.
///
/// Each file name is uploaded once; unsupported images are cached as
/// [`TextureHandle::INVALID`]. Stops at the first missing or undecodable file.
/// Returns how many names were newly registered.
pub fn load_textures<U: TextureUploader + ?Sized>(
    materials: &[Material],
    base_dir: &Path,
    cache: &mut TextureCache,
    uploader: &mut U,
    filter: TextureFilter,
) -> AssetResult<usize> {
    let mut added = 0;
    for material in materials {
        let Some(name) = material.diffuse_texture.as_deref() else {
            continue;
        };
        if name.is_empty() || cache.contains(name) {
            continue;
        }

        let path = resolve_texture_path(name, base_dir)?;
        let image = DecodedImage::load(&path)?;
        let handle = uploader.upload(name, &image, filter);
        if !handle.is_valid() {
            log::warn!("Texture '{}' could not be uploaded", name);
        }
        cache.insert(name, handle);
        added += 1;
    }
    Ok(added)
}
