use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use super::producer::StreamProducer;
use super::types::{CameraPosition, Extent, Frame};

/// Synthetic source settings for the demo producer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatternConfig {
    pub width: u32,
    pub height: u32,
    pub fps: f32,
    #[serde(default)]
    pub position: CameraPosition,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fps: 30.0,
            position: CameraPosition::Back,
        }
    }
}

impl PatternConfig {
    pub fn extent(&self) -> Extent {
        Extent::new(self.width, self.height)
    }

    fn frame_interval(&self) -> Duration {
        Duration::from_secs_f32(1.0 / self.fps.clamp(1.0, 240.0))
    }
}

/// Render one frame of the pattern: a diagonal gradient with a vertical
/// bar sweeping left to right, one pixel column per frame.
pub fn render_pattern(extent: Extent, frame_index: u64) -> Frame {
    let (w, h) = (extent.width as usize, extent.height as usize);
    let mut data = vec![0u8; extent.rgba_len()];
    let bar_x = if w == 0 { 0 } else { (frame_index % w as u64) as usize };
    let bar_half = (w / 64).max(1);

    for y in 0..h {
        for x in 0..w {
            let i = (y * w + x) * 4;
            let on_bar = x.abs_diff(bar_x) < bar_half;
            let px = if on_bar {
                [255, 255, 255, 255]
            } else {
                [
                    (x * 255 / w.max(1)) as u8,
                    (y * 255 / h.max(1)) as u8,
                    ((x + y) * 255 / (w + h).max(1)) as u8,
                    255,
                ]
            };
            data[i..i + 4].copy_from_slice(&px);
        }
    }

    Frame::from_sized(extent, data)
}

/// Background thread feeding [`render_pattern`] frames into a producer at a
/// fixed rate, standing in for a camera or decoder pipeline.
pub struct TestPattern {
    shutdown: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl TestPattern {
    pub fn spawn<C: Send + Sync + 'static>(
        producer: Arc<StreamProducer<C>>,
        config: PatternConfig,
    ) -> std::io::Result<Self> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();

        let handle = std::thread::Builder::new()
            .name("test-pattern".into())
            .spawn(move || pattern_thread(&producer, config, &shutdown_clone))?;

        log::info!(
            "Test pattern started: {}x{} @ {} fps",
            config.width,
            config.height,
            config.fps
        );

        Ok(Self {
            shutdown,
            thread: Some(handle),
        })
    }

    pub fn stop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }

    pub fn is_running(&self) -> bool {
        if self.shutdown.load(Ordering::Relaxed) {
            return false;
        }
        match &self.thread {
            Some(h) => !h.is_finished(),
            None => false,
        }
    }
}

impl Drop for TestPattern {
    fn drop(&mut self) {
        self.stop();
    }
}

fn pattern_thread<C>(producer: &StreamProducer<C>, config: PatternConfig, shutdown: &AtomicBool) {
    let extent = config.extent();
    let interval = config.frame_interval();
    let mut frame_index: u64 = 0;
    let mut next = Instant::now();

    while !shutdown.load(Ordering::Relaxed) {
        // Frames are dropped inside push_frame while the producer is idle or unbound.
        if producer.is_running() {
            producer.push_frame(render_pattern(extent, frame_index));
            frame_index += 1;
        }

        next += interval;
        let now = Instant::now();
        if next > now {
            std::thread::sleep(next - now);
        } else {
            next = now;
        }
    }

    log::info!("Test pattern stopped after {frame_index} frames");
}
