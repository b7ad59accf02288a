use thiserror::Error;

#[derive(Debug, Error)]
pub enum RendererError {
    #[error("No suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("request_device failed: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}
