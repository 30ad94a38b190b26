use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ViewError};

/// Pixel dimensions of a frame or drawable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

impl Extent {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Byte length of an RGBA8 image with this extent.
    pub fn rgba_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

/// Process-unique frame identity, used to skip redundant texture uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(u64);

impl FrameId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// An immutable decoded RGBA8 image.
#[derive(Debug, Clone)]
pub struct Frame {
    id: FrameId,
    extent: Extent,
    data: Arc<[u8]>,
}

impl Frame {
    /// Wrap decoded RGBA8 pixels. The buffer must hold exactly
    /// `width * height * 4` bytes.
    pub fn new(extent: Extent, data: Vec<u8>) -> Result<Self> {
        let expected = extent.rgba_len();
        if data.len() != expected {
            return Err(ViewError::FrameSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            id: FrameId::next(),
            extent,
            data: data.into(),
        })
    }

    /// Caller guarantees `data.len() == extent.rgba_len()`.
    pub(crate) fn from_sized(extent: Extent, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), extent.rgba_len());
        Self {
            id: FrameId::next(),
            extent,
            data: data.into(),
        }
    }

    /// A frame filled with one color.
    pub fn solid(extent: Extent, rgba: [u8; 4]) -> Self {
        let data: Vec<u8> = rgba
            .iter()
            .copied()
            .cycle()
            .take(extent.rgba_len())
            .collect();
        Self::from_sized(extent, data)
    }

    pub fn id(&self) -> FrameId {
        self.id
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Which way the producing camera faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CameraPosition {
    Unspecified,
    #[default]
    Back,
    Front,
}

impl CameraPosition {
    fn as_u8(self) -> u8 {
        match self {
            CameraPosition::Unspecified => 0,
            CameraPosition::Back => 1,
            CameraPosition::Front => 2,
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            1 => CameraPosition::Back,
            2 => CameraPosition::Front,
            _ => CameraPosition::Unspecified,
        }
    }
}

/// A `CameraPosition` that can be written from the producer's thread and
/// read from the display thread.
#[derive(Debug)]
pub struct PositionCell(AtomicU8);

impl PositionCell {
    pub fn new(position: CameraPosition) -> Self {
        Self(AtomicU8::new(position.as_u8()))
    }

    pub fn get(&self) -> CameraPosition {
        CameraPosition::from_u8(self.0.load(Ordering::Acquire))
    }

    pub fn set(&self, position: CameraPosition) {
        self.0.store(position.as_u8(), Ordering::Release);
    }
}

impl Default for PositionCell {
    fn default() -> Self {
        Self::new(CameraPosition::default())
    }
}
