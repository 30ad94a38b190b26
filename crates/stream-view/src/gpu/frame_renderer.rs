use parking_lot::Mutex;
use wgpu::{
    BindGroup, BindGroupDescriptor, BindGroupEntry, BindGroupLayout, BindGroupLayoutDescriptor,
    BindGroupLayoutEntry, BindingResource, BindingType, BufferBindingType, ColorTargetState,
    CommandEncoder, Device, FragmentState, PipelineCompilationOptions, PipelineLayoutDescriptor,
    PrimitiveState, Queue, RenderPipeline, SamplerBindingType, ShaderStages, TextureFormat,
    TextureSampleType, TextureView, TextureViewDimension, VertexState,
};

use super::uniforms::FrameUniforms;
use crate::media::types::{Extent, Frame, FrameId};
use crate::view::surface::{ColorSpace, RenderRequest};

const FRAME_BLIT_WGSL: &str = include_str!("shaders/frame_blit.wgsl");

/// Texture format a frame is uploaded as.
///
/// sRGB-encoded bytes go into an sRGB texture so sampling linearizes them;
/// linear bytes are sampled as-is.
pub fn frame_texture_format(color_space: ColorSpace) -> TextureFormat {
    match color_space {
        ColorSpace::Srgb => TextureFormat::Rgba8UnormSrgb,
        ColorSpace::Linear => TextureFormat::Rgba8Unorm,
    }
}

/// Whether a frame of `extent` fits in a single 2D texture under `limits`.
pub fn fits_texture_limits(extent: Extent, limits: &wgpu::Limits) -> bool {
    let max = limits.max_texture_dimension_2d;
    extent.width <= max && extent.height <= max
}

struct FrameTexture {
    texture: wgpu::Texture,
    bind_group: BindGroup,
    extent: Extent,
    format: TextureFormat,
    uploaded: Option<FrameId>,
}

impl FrameTexture {
    fn matches(&self, extent: Extent, format: TextureFormat) -> bool {
        self.extent == extent && self.format == format
    }

    fn upload(&mut self, queue: &Queue, frame: &Frame) {
        let Extent { width, height } = self.extent;
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            frame.data(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        self.uploaded = Some(frame.id());
    }
}

/// Rendering context handed to producers on attach.
///
/// Blits a frame onto an already-cleared drawable at the placement the
/// scheduler computed. The frame texture is kept between ticks and only
/// re-uploaded when a new frame arrives.
pub struct FrameRenderer {
    device: Device,
    queue: Queue,
    pipeline: RenderPipeline,
    bind_group_layout: BindGroupLayout,
    sampler: wgpu::Sampler,
    uniform_buffer: wgpu::Buffer,
    cache: Mutex<Option<FrameTexture>>,
}

impl FrameRenderer {
    pub fn new(device: &Device, queue: &Queue, target_format: TextureFormat) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("frame-sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            ..Default::default()
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame-uniforms"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // Bind group layout: texture(0), sampler(1), uniform(2)
        let bind_group_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("frame-blit-bgl"),
            entries: &[
                BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Texture {
                        sample_type: TextureSampleType::Float { filterable: true },
                        view_dimension: TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                BindGroupLayoutEntry {
                    binding: 1,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Sampler(SamplerBindingType::Filtering),
                    count: None,
                },
                BindGroupLayoutEntry {
                    binding: 2,
                    visibility: ShaderStages::VERTEX,
                    ty: BindingType::Buffer {
                        ty: BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: std::num::NonZeroU64::new(
                            std::mem::size_of::<FrameUniforms>() as u64,
                        ),
                    },
                    count: None,
                },
            ],
        });

        let shader_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("frame-blit"),
            source: wgpu::ShaderSource::Wgsl(FRAME_BLIT_WGSL.into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("frame-blit-layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("frame-blit-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: VertexState {
                module: &shader_module,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: PipelineCompilationOptions::default(),
            },
            fragment: Some(FragmentState {
                module: &shader_module,
                entry_point: Some("fs_main"),
                targets: &[Some(ColorTargetState {
                    format: target_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: PipelineCompilationOptions::default(),
            }),
            primitive: PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        log::debug!("Frame renderer created for {target_format:?}");

        Self {
            device: device.clone(),
            queue: queue.clone(),
            pipeline,
            bind_group_layout,
            sampler,
            uniform_buffer,
            cache: Mutex::new(None),
        }
    }

    fn create_texture(&self, extent: Extent, format: TextureFormat) -> FrameTexture {
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("frame-texture"),
            size: wgpu::Extent3d {
                width: extent.width,
                height: extent.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.device.create_bind_group(&BindGroupDescriptor {
            label: Some("frame-blit-bg"),
            layout: &self.bind_group_layout,
            entries: &[
                BindGroupEntry {
                    binding: 0,
                    resource: BindingResource::TextureView(&view),
                },
                BindGroupEntry {
                    binding: 1,
                    resource: BindingResource::Sampler(&self.sampler),
                },
                BindGroupEntry {
                    binding: 2,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
            ],
        });
        log::debug!(
            "Frame texture created: {}x{} {:?}",
            extent.width,
            extent.height,
            format
        );
        FrameTexture {
            texture,
            bind_group,
            extent,
            format,
            uploaded: None,
        }
    }

    /// Encode the blit of `request.frame` onto `target`.
    pub fn draw(&self, encoder: &mut CommandEncoder, target: &TextureView, request: RenderRequest<'_>) {
        let frame = request.frame;
        let extent = frame.extent();
        if !fits_texture_limits(extent, &self.device.limits()) {
            log::warn!(
                "Frame {}x{} exceeds the device texture limit, not drawing",
                extent.width,
                extent.height
            );
            return;
        }
        let format = frame_texture_format(request.color_space);

        let mut cache = self.cache.lock();
        let texture = match cache.take() {
            Some(texture) if texture.matches(extent, format) => texture,
            _ => self.create_texture(extent, format),
        };
        let texture = cache.insert(texture);
        if texture.uploaded != Some(frame.id()) {
            texture.upload(&self.queue, frame);
        }

        let uniforms = FrameUniforms::from_rects(request.geometry.destination(extent), request.bounds);
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("frame-blit"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &texture.bind_group, &[]);
        pass.draw(0..6, 0..1);
    }
}
