mod app;

use std::sync::Arc;

use anyhow::Result;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{WindowAttributes, WindowId};

use app::App;

#[derive(Default)]
struct StreamViewApp {
    app: Option<App>,
}

impl ApplicationHandler for StreamViewApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.app.is_some() {
            return;
        }

        let attrs = WindowAttributes::default()
            .with_title("Stream View")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        match App::new(window) {
            Ok(app) => {
                self.app = Some(app);
                log::info!("Stream view initialized");
            }
            Err(e) => {
                log::error!("Failed to initialize app: {e}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(app) = self.app.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                app.quit_requested = true;
            }
            WindowEvent::Resized(size) => {
                app.resize(size.width, size.height);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => match key {
                KeyCode::Escape => app.quit_requested = true,
                KeyCode::KeyG => app.cycle_gravity(),
                KeyCode::KeyA => {
                    if let Err(e) = app.toggle_attach() {
                        log::warn!("Attach failed: {e}");
                    }
                }
                KeyCode::KeyC => app.clear(),
                _ => {}
            },
            WindowEvent::RedrawRequested => {
                app.render();
            }
            _ => {}
        }

        if app.quit_requested {
            app.shutdown();
            event_loop.exit();
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let event_loop = EventLoop::new()?;
    // Redraws are driven by the producer's needs-display requests.
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = StreamViewApp::default();
    event_loop.run_app(&mut app)?;

    Ok(())
}
