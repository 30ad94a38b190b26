//! wgpu backing for [`StreamView`](crate::view::StreamView).

pub mod context;
pub mod frame_renderer;
pub mod surface;
pub mod uniforms;

pub use context::GpuContext;
pub use frame_renderer::FrameRenderer;
pub use surface::SurfaceFrame;
pub use uniforms::FrameUniforms;
