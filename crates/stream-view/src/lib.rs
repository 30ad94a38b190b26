//! Single-view video renderer.
//!
//! A [`StreamView`](view::StreamView) shows the newest frame pushed by one
//! attached producer, fitted to its surface by a gravity mode. Frames arrive
//! on producer threads through a [`FrameSink`](view::FrameSink); drawing
//! happens on the owner's display tick.

pub mod error;
pub mod gpu;
pub mod media;
pub mod settings;
pub mod view;

pub use error::{Result, ViewError};
