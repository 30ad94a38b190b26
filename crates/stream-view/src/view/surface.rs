use serde::{Deserialize, Serialize};

use super::gravity::{Geometry, Rect};
use crate::media::types::{Extent, Frame};

/// RGBA clear color, components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClearColor {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl ClearColor {
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for ClearColor {
    fn default() -> Self {
        Self::BLACK
    }
}

/// How frame bytes are interpreted when sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColorSpace {
    /// Device RGB: bytes are sRGB-encoded.
    #[default]
    Srgb,
    /// Bytes are sampled as linear values.
    Linear,
}

/// Everything the rendering context needs to draw one frame.
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    pub frame: &'a Frame,
    pub geometry: Geometry,
    /// Full drawable bounds; output is clipped to this.
    pub bounds: Rect,
    pub color_space: ColorSpace,
}

/// The platform side of a view: backbuffers, command submission and the
/// per-producer rendering context.
///
/// Any `None` from the acquisition methods means "not ready yet" and makes
/// the current tick a no-op.
pub trait DisplaySurface {
    /// Next presentable backbuffer.
    type Drawable;
    /// Command buffer plus the render-pass target it encodes into.
    type Commands;
    /// Rendering context handed to producers on attach.
    type Context: Send + Sync + 'static;

    /// A fresh rendering context tied to this surface's device.
    fn create_context(&self) -> Self::Context;

    /// Fixed pixel size of the drawable.
    fn drawable_size(&self) -> Extent;

    /// Whether a frame of `extent` can be rendered at all. Frames that
    /// cannot are skipped before a drawable is acquired.
    fn supports_extent(&self, _extent: Extent) -> bool {
        true
    }

    fn current_drawable(&mut self) -> Option<Self::Drawable>;

    fn command_buffer(&mut self) -> Option<Self::Commands>;

    /// Encode an empty pass that clears `drawable` to `color`.
    fn encode_clear(&mut self, commands: &mut Self::Commands, drawable: &Self::Drawable, color: ClearColor);

    fn render(
        &mut self,
        context: &Self::Context,
        commands: &mut Self::Commands,
        drawable: &Self::Drawable,
        request: RenderRequest<'_>,
    );

    /// Schedule `drawable` for presentation and submit `commands`.
    fn present(&mut self, commands: Self::Commands, drawable: Self::Drawable);
}
