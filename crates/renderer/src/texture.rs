//! `wgpu` implementation of the asset crate's texture upload seam.

use asset::texture::{DecodedImage, FilterMode, TextureFilter, TextureHandle, TextureUploader};
use image::{RgbaImage, imageops};
use wgpu::{
    AddressMode, Device, Extent3d, Origin3d, Queue, Sampler, SamplerDescriptor,
    TexelCopyBufferLayout, TexelCopyTextureInfo, Texture, TextureAspect, TextureDescriptor,
    TextureDimension, TextureFormat, TextureUsages, TextureView, TextureViewDescriptor,
};

const FORMAT: TextureFormat = TextureFormat::Rgba8UnormSrgb;

pub struct GpuTexture {
    pub texture: Texture,
    pub view: TextureView,
    pub sampler: Sampler,
}

/// Owns every texture uploaded through it; handles index into `textures`.
pub struct GpuTextures {
    device: Device,
    queue: Queue,
    textures: Vec<GpuTexture>,
}

impl GpuTextures {
    pub fn new(device: &Device, queue: &Queue) -> Self {
        Self {
            device: device.clone(),
            queue: queue.clone(),
            textures: Vec::new(),
        }
    }

    pub fn get(&self, handle: TextureHandle) -> Option<&GpuTexture> {
        self.textures.get(handle.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

impl TextureUploader for GpuTextures {
    fn upload(
        &mut self,
        label: &str,
        image: &DecodedImage,
        filter: TextureFilter,
    ) -> TextureHandle {
        if !image.is_valid() {
            log::warn!("Skipping empty texture {}", label);
            return TextureHandle::INVALID;
        }
        let Some(rgba) = image.to_rgba8() else {
            log::warn!(
                "Unsupported image format: {} components ({})",
                image.channels,
                label
            );
            return TextureHandle::INVALID;
        };

        let levels = if filter.wants_mipmaps() {
            mip_chain(image.width, image.height, rgba)
        } else {
            vec![(image.width, image.height, rgba)]
        };

        let texture = self.device.create_texture(&TextureDescriptor {
            label: Some(label),
            size: Extent3d {
                width: image.width,
                height: image.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: levels.len() as u32,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: FORMAT,
            usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (level, (width, height, data)) in levels.iter().enumerate() {
            self.queue.write_texture(
                TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: level as u32,
                    origin: Origin3d::ZERO,
                    aspect: TextureAspect::All,
                },
                data,
                TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * width),
                    rows_per_image: Some(*height),
                },
                Extent3d {
                    width: *width,
                    height: *height,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&TextureViewDescriptor::default());
        let sampler = self.device.create_sampler(&sampler_descriptor(label, filter));

        let handle = TextureHandle(self.textures.len() as u32);
        log::debug!(
            "Uploaded texture {} as {:?} ({}x{}, {} levels)",
            label,
            handle,
            image.width,
            image.height,
            levels.len()
        );
        self.textures.push(GpuTexture {
            texture,
            view,
            sampler,
        });
        handle
    }
}

/// (minification/magnification, mipmap) filters for one [`FilterMode`].
fn split_filter(mode: FilterMode) -> (wgpu::FilterMode, wgpu::FilterMode) {
    use wgpu::FilterMode::{Linear, Nearest};
    match mode {
        FilterMode::Nearest | FilterMode::NearestMipmapNearest => (Nearest, Nearest),
        FilterMode::Linear | FilterMode::LinearMipmapNearest => (Linear, Nearest),
        FilterMode::NearestMipmapLinear => (Nearest, Linear),
        FilterMode::LinearMipmapLinear => (Linear, Linear),
    }
}

fn sampler_descriptor(label: &str, filter: TextureFilter) -> SamplerDescriptor<'_> {
    let (min_filter, mipmap_filter) = split_filter(filter.min);
    let (mag_filter, _) = split_filter(filter.mag);
    SamplerDescriptor {
        label: Some(label),
        address_mode_u: AddressMode::Repeat,
        address_mode_v: AddressMode::Repeat,
        address_mode_w: AddressMode::Repeat,
        mag_filter,
        min_filter,
        mipmap_filter,
        ..Default::default()
    }
}

/// Full RGBA8 mip chain down to 1x1, level 0 first.
pub fn mip_chain(width: u32, height: u32, rgba: Vec<u8>) -> Vec<(u32, u32, Vec<u8>)> {
    let count = 32 - width.max(height).leading_zeros();
    let mut levels = Vec::with_capacity(count as usize);
    let Some(base) = RgbaImage::from_raw(width, height, rgba) else {
        return levels;
    };

    let mut prev = base;
    for _ in 1..count {
        let w = (prev.width() / 2).max(1);
        let h = (prev.height() / 2).max(1);
        let next = imageops::resize(&prev, w, h, imageops::FilterType::Triangle);
        levels.push((prev.width(), prev.height(), prev.into_raw()));
        prev = next;
    }
    levels.push((prev.width(), prev.height(), prev.into_raw()));
    levels
}
