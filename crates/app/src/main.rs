//! Entry point for flatobj: load an OBJ model, flatten it and upload its
//! textures, then report what a render loop would draw.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use asset::{
    LoadOptions, LoadedModel, load_model,
    texture::{CpuTextures, FilterMode, TextureCache, TextureFilter},
};
use renderer::{GpuMesh, GpuTextures, Headless};

const USAGE: &str = "usage: flatobj <file.obj> [--scale=F] [--base-dir=DIR] \
[--filter=nearest|linear|mipmap] [--gpu-backend=auto|vulkan|dx12|metal|gl] [--no-gpu]";

fn parse_backend_arg(args: &[String]) -> wgpu::Backends {
    // Accept: --gpu-backend=auto|vulkan|dx12|metal|gl
    let mut backends = wgpu::Backends::all();
    for arg in args {
        if let Some(val) = arg.strip_prefix("--gpu-backend=") {
            backends = match val.to_ascii_lowercase().as_str() {
                "auto" => wgpu::Backends::all(),
                "vulkan" | "vk" => wgpu::Backends::VULKAN,
                "dx12" | "d3d12" => wgpu::Backends::DX12,
                "metal" | "mtl" => wgpu::Backends::METAL,
                "gl" | "opengl" | "gles" => wgpu::Backends::GL,
                other => {
                    log::warn!("Unknown backend '{}', falling back to auto.", other);
                    wgpu::Backends::all()
                }
            };
        }
    }
    backends
}

fn parse_scale_arg(args: &[String]) -> f32 {
    let mut scale = 1.0;
    for arg in args {
        if let Some(v) = arg.strip_prefix("--scale=") {
            match v.parse::<f32>() {
                Ok(s) if s.is_finite() && s > 0.0 => scale = s,
                _ => log::warn!("Ignoring invalid scale '{}'", v),
            }
        }
    }
    scale
}

fn parse_base_dir_arg(args: &[String]) -> Option<PathBuf> {
    args.iter()
        .rev()
        .find_map(|arg| arg.strip_prefix("--base-dir="))
        .map(PathBuf::from)
}

fn parse_filter_arg(args: &[String]) -> TextureFilter {
    let mut filter = TextureFilter::default();
    for arg in args {
        if let Some(val) = arg.strip_prefix("--filter=") {
            filter = match val.to_ascii_lowercase().as_str() {
                "nearest" => TextureFilter::uniform(FilterMode::Nearest),
                "linear" => TextureFilter::uniform(FilterMode::Linear),
                "mipmap" | "trilinear" => TextureFilter::default(),
                other => {
                    log::warn!("Unknown filter '{}', using mipmap.", other);
                    TextureFilter::default()
                }
            };
        }
    }
    filter
}

fn parse_no_gpu_arg(args: &[String]) -> bool {
    args.iter().any(|a| a == "--no-gpu")
}

fn parse_path_arg(args: &[String]) -> Option<&Path> {
    args.iter()
        .find(|a| !a.starts_with("--"))
        .map(|a| Path::new(a.as_str()))
}

fn log_summary(model: &LoadedModel, cache: &TextureCache) {
    for shape in &model.mesh.shapes {
        log::info!(
            "shape '{}': vertices {}..{}, {} segments",
            shape.name,
            shape.base_vertex,
            shape.base_vertex + shape.end,
            shape.segments.len()
        );
    }
    for batch in model.draw_batches(cache) {
        log::info!(
            "draw {:?} material={} texture={:?}",
            batch.vertices,
            batch.material.map_or("<none>", |m| m.name.as_str()),
            batch.texture
        );
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(path) = parse_path_arg(&args) else {
        bail!("{USAGE}");
    };
    let options = LoadOptions {
        scale: parse_scale_arg(&args),
        base_dir: parse_base_dir_arg(&args),
        filter: parse_filter_arg(&args),
    };
    log::info!(
        "Loading {} (scale={}, base_dir={:?}, filter={:?})",
        path.display(),
        options.scale,
        options.base_dir,
        options.filter
    );

    let mut cache = TextureCache::new();
    let model = if parse_no_gpu_arg(&args) {
        let mut textures = CpuTextures::default();
        load_model(path, &options, &mut cache, &mut textures)
            .with_context(|| format!("Failed to load {}", path.display()))?
    } else {
        let gpu = Headless::new(parse_backend_arg(&args)).context("GPU init failed")?;
        let mut textures = GpuTextures::new(&gpu.device, &gpu.queue);
        let model = load_model(path, &options, &mut cache, &mut textures)
            .with_context(|| format!("Failed to load {}", path.display()))?;
        let mesh = GpuMesh::upload(&gpu.device, &model, &cache);
        log::info!(
            "Uploaded {} vertices, {} draw batches, {} textures",
            mesh.vertex_count(),
            mesh.batch_count(),
            textures.len()
        );
        model
    };

    log_summary(&model, &cache);
    log::info!("Done.");
    Ok(())
}
