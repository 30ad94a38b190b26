use wgpu::{CommandEncoder, SurfaceError, SurfaceTexture, TextureView};

use super::context::GpuContext;
use super::frame_renderer::{FrameRenderer, fits_texture_limits};
use crate::media::types::Extent;
use crate::view::surface::{ClearColor, DisplaySurface, RenderRequest};

/// A backbuffer acquired for one tick.
pub struct SurfaceFrame {
    texture: SurfaceTexture,
    view: TextureView,
}

impl From<ClearColor> for wgpu::Color {
    fn from(c: ClearColor) -> Self {
        wgpu::Color {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

impl DisplaySurface for GpuContext {
    type Drawable = SurfaceFrame;
    type Commands = CommandEncoder;
    type Context = FrameRenderer;

    fn create_context(&self) -> FrameRenderer {
        FrameRenderer::new(&self.device, &self.queue, self.format)
    }

    fn drawable_size(&self) -> Extent {
        Extent::new(self.surface_config.width, self.surface_config.height)
    }

    fn supports_extent(&self, extent: Extent) -> bool {
        fits_texture_limits(extent, &self.device.limits())
    }

    fn current_drawable(&mut self) -> Option<SurfaceFrame> {
        match self.surface.get_current_texture() {
            Ok(texture) => {
                let view = texture
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                Some(SurfaceFrame { texture, view })
            }
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                log::debug!("Surface lost or outdated, reconfiguring");
                self.reconfigure();
                None
            }
            Err(SurfaceError::OutOfMemory) => {
                log::error!("Out of GPU memory");
                None
            }
            Err(e) => {
                log::warn!("Surface error: {e}");
                None
            }
        }
    }

    fn command_buffer(&mut self) -> Option<CommandEncoder> {
        Some(
            self.device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("stream-view-encoder"),
                }),
        )
    }

    fn encode_clear(&mut self, encoder: &mut CommandEncoder, drawable: &SurfaceFrame, color: ClearColor) {
        // Empty pass: the clear load op does all the work.
        let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("clear"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &drawable.view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(color.into()),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
    }

    fn render(
        &mut self,
        context: &FrameRenderer,
        encoder: &mut CommandEncoder,
        drawable: &SurfaceFrame,
        request: RenderRequest<'_>,
    ) {
        context.draw(encoder, &drawable.view, request);
    }

    fn present(&mut self, encoder: CommandEncoder, drawable: SurfaceFrame) {
        self.queue.submit(std::iter::once(encoder.finish()));
        drawable.texture.present();
    }
}
