use std::sync::Arc;

use anyhow::Result;
use winit::window::Window;

use stream_view::gpu::{FrameRenderer, GpuContext};
use stream_view::media::{ProducerId, ProducerRegistry, StreamProducer, TestPattern};
use stream_view::settings::ViewSettings;
use stream_view::view::{SkipReason, StreamView, TickOutcome};

pub struct App {
    pub window: Arc<Window>,
    pub view: StreamView<GpuContext>,
    pub registry: Arc<ProducerRegistry<FrameRenderer>>,
    pub camera: Arc<StreamProducer<FrameRenderer>>,
    pub camera_id: ProducerId,
    pub settings: ViewSettings,
    pub quit_requested: bool,
    _pattern: TestPattern,
}

impl App {
    pub fn new(window: Arc<Window>) -> Result<Self> {
        let settings = ViewSettings::load();
        let gpu = GpuContext::new(window.clone())?;

        let registry = Arc::new(ProducerRegistry::new());
        let redraw_window = window.clone();
        let mut view = StreamView::new(
            gpu,
            settings.present_options(),
            registry.clone(),
            move || redraw_window.request_redraw(),
        );

        let camera = Arc::new(StreamProducer::new("test-pattern", settings.pattern.position)?);
        let camera_id = registry.register(camera.clone());
        let pattern = TestPattern::spawn(camera.clone(), settings.pattern)?;

        view.attach(Some(camera_id))?;

        log::info!(
            "Showing {}x{} test pattern at {} fps ({:?})",
            settings.pattern.width,
            settings.pattern.height,
            settings.pattern.fps,
            settings.video_gravity
        );

        Ok(Self {
            window,
            view,
            registry,
            camera,
            camera_id,
            settings,
            quit_requested: false,
            _pattern: pattern,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.view.surface_mut().resize(width, height);
        self.window.request_redraw();
    }

    pub fn render(&mut self) {
        match self.view.tick() {
            TickOutcome::Presented(_) => {}
            // The surface was reconfigured; try again next frame.
            TickOutcome::Skipped(SkipReason::NoDrawable) => self.window.request_redraw(),
            TickOutcome::Skipped(_) => {}
        }
    }

    pub fn cycle_gravity(&mut self) {
        let mode = self.view.options().video_gravity.next();
        self.view.set_video_gravity(mode);
        self.settings.video_gravity = mode;
        self.settings.save();
        log::info!("Video gravity: {mode:?}");
        self.window.request_redraw();
    }

    pub fn toggle_attach(&mut self) -> Result<()> {
        if self.view.current_producer().is_some() {
            self.view.detach();
            log::info!("Detached {}", self.camera_id);
        } else {
            self.view.attach(Some(self.camera_id))?;
            log::info!("Attached {}", self.camera_id);
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        if !self.view.clear() {
            log::debug!("Clear skipped: no drawable");
        }
    }

    pub fn shutdown(&mut self) {
        self.view.detach();
        self.camera.stop_running();
        self.registry.unregister(self.camera_id);
    }
}
