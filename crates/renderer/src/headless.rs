//! Device bootstrap without a window surface.

use wgpu::{
    Adapter, AdapterInfo, Backends, Device, DeviceDescriptor, Features, Instance,
    InstanceDescriptor, Limits, PowerPreference, Queue, RequestAdapterOptions,
};

use crate::error::RendererError;

pub struct Headless {
    pub device: Device,
    pub queue: Queue,
    pub info: AdapterInfo,
}

impl Headless {
    /// Blocking wrapper around [`Headless::new_async`].
    pub fn new(backends: Backends) -> Result<Self, RendererError> {
        pollster::block_on(Self::new_async(backends))
    }

    pub async fn new_async(backends: Backends) -> Result<Self, RendererError> {
        let instance = Instance::new(&InstanceDescriptor {
            backends,
            ..Default::default()
        });

        let adapter: Adapter = instance
            .request_adapter(&RequestAdapterOptions {
                power_preference: PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await?;
        let info = adapter.get_info();
        log::info!("Using adapter {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&DeviceDescriptor {
                label: Some("flatobj device"),
                required_features: Features::empty(),
                required_limits: Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                ..Default::default()
            })
            .await?;

        Ok(Self {
            device,
            queue,
            info,
        })
    }
}
