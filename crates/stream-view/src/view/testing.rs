//! In-memory `DisplaySurface` that records what a tick asked of it.

use super::gravity::{Geometry, Rect};
use super::surface::{ClearColor, ColorSpace, DisplaySurface, RenderRequest};
use crate::media::types::{Extent, FrameId};

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Clear(ClearColor),
    Render {
        frame: FrameId,
        geometry: Geometry,
        bounds: Rect,
        color_space: ColorSpace,
    },
    Present,
}

#[derive(Debug)]
pub struct RecordingSurface {
    pub size: Extent,
    pub drawable_ready: bool,
    pub commands_ready: bool,
    pub max_dimension: u32,
    pub drawables_acquired: usize,
    pub ops: Vec<Op>,
}

impl RecordingSurface {
    pub fn new(size: Extent) -> Self {
        Self {
            size,
            drawable_ready: true,
            commands_ready: true,
            max_dimension: u32::MAX,
            drawables_acquired: 0,
            ops: Vec::new(),
        }
    }

    pub fn presented(&self) -> usize {
        self.ops.iter().filter(|op| **op == Op::Present).count()
    }

    pub fn rendered_frames(&self) -> Vec<FrameId> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Render { frame, .. } => Some(*frame),
                _ => None,
            })
            .collect()
    }
}

impl DisplaySurface for RecordingSurface {
    type Drawable = ();
    type Commands = ();
    type Context = ();

    fn create_context(&self) -> Self::Context {}

    fn drawable_size(&self) -> Extent {
        self.size
    }

    fn supports_extent(&self, extent: Extent) -> bool {
        extent.width <= self.max_dimension && extent.height <= self.max_dimension
    }

    fn current_drawable(&mut self) -> Option<Self::Drawable> {
        if self.drawable_ready {
            self.drawables_acquired += 1;
        }
        self.drawable_ready.then_some(())
    }

    fn command_buffer(&mut self) -> Option<Self::Commands> {
        self.commands_ready.then_some(())
    }

    fn encode_clear(&mut self, _commands: &mut (), _drawable: &(), color: ClearColor) {
        self.ops.push(Op::Clear(color));
    }

    fn render(&mut self, _context: &(), _commands: &mut (), _drawable: &(), request: RenderRequest<'_>) {
        self.ops.push(Op::Render {
            frame: request.frame.id(),
            geometry: request.geometry,
            bounds: request.bounds,
            color_space: request.color_space,
        });
    }

    fn present(&mut self, _commands: (), _drawable: ()) {
        self.ops.push(Op::Present);
    }
}
