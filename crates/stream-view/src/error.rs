use thiserror::Error;

use crate::media::registry::ProducerId;

/// Construction-time and binding failures.
///
/// Nothing in the per-tick presentation path returns these; a tick that
/// cannot draw is skipped instead.
#[derive(Debug, Error)]
pub enum ViewError {
    #[error("no producer registered under {0}")]
    UnknownProducer(ProducerId),

    #[error("frame buffer holds {actual} bytes, expected {expected} for RGBA8")]
    FrameSize { expected: usize, actual: usize },

    #[error("failed to spawn thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}

pub type Result<T, E = ViewError> = std::result::Result<T, E>;
