use bytemuck::{Pod, Zeroable};

use crate::view::gravity::Rect;

/// Quad placement for the frame blit, in clip space.
/// Must be kept in sync with the WGSL `FrameUniforms` struct.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    pub rect_min: [f32; 2],
    pub rect_max: [f32; 2],
}

impl FrameUniforms {
    /// Map `destination` (surface pixels, bottom-left origin) into clip space
    /// relative to `bounds`. Parts outside `bounds` fall outside [-1, 1] and
    /// are clipped by the rasterizer.
    pub fn from_rects(destination: Rect, bounds: Rect) -> Self {
        let to_clip = |v: f64, origin: f64, size: f64| -> f32 {
            if size <= 0.0 {
                return 0.0;
            }
            ((v - origin) / size * 2.0 - 1.0) as f32
        };
        Self {
            rect_min: [
                to_clip(destination.x, bounds.x, bounds.width),
                to_clip(destination.y, bounds.y, bounds.height),
            ],
            rect_max: [
                to_clip(destination.max_x(), bounds.x, bounds.width),
                to_clip(destination.max_y(), bounds.y, bounds.height),
            ],
        }
    }
}
