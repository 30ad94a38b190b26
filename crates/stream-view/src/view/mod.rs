pub mod binding;
pub mod gravity;
pub mod scheduler;
pub mod sink;
pub mod surface;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

pub use binding::SurfaceBinding;
pub use gravity::{Geometry, GravityMode, Rect};
pub use scheduler::{DrawPredicate, PresentOptions, PresentationScheduler, SkipReason, TickOutcome};
pub use sink::FrameSink;
pub use surface::{ClearColor, ColorSpace, DisplaySurface, RenderRequest};

use crate::error::Result;
use crate::media::mailbox::FrameMailbox;
use crate::media::registry::{ProducerId, ProducerRegistry};
use crate::media::types::CameraPosition;

/// A single video view: one surface, at most one attached producer.
///
/// Producers draw into [`sink`](Self::sink) from any thread; the owner calls
/// [`tick`](Self::tick) from its display clock.
pub struct StreamView<S: DisplaySurface> {
    scheduler: PresentationScheduler<S>,
    binding: SurfaceBinding<S::Context>,
}

impl<S: DisplaySurface> StreamView<S> {
    /// `needs_display` is called after every frame a producer delivers.
    pub fn new(
        surface: S,
        options: PresentOptions,
        registry: Arc<ProducerRegistry<S::Context>>,
        needs_display: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        let mailbox = Arc::new(FrameMailbox::new());
        let sink = FrameSink::new(mailbox.clone(), needs_display);
        Self {
            scheduler: PresentationScheduler::new(surface, options, mailbox),
            binding: SurfaceBinding::new(registry, sink),
        }
    }

    /// Attach the producer registered under `id`, or detach with `None`.
    pub fn attach(&mut self, id: Option<ProducerId>) -> Result<()> {
        let surface = self.scheduler.surface();
        self.binding.attach(id, || surface.create_context())
    }

    pub fn detach(&mut self) {
        self.binding.detach();
    }

    pub fn tick(&mut self) -> TickOutcome {
        let context = self.binding.context();
        self.scheduler.tick(context.as_deref())
    }

    pub fn clear(&mut self) -> bool {
        self.scheduler.clear()
    }

    pub fn sink(&self) -> &FrameSink {
        self.binding.sink()
    }

    /// Position of the producer as of its last completed attach.
    pub fn position(&self) -> CameraPosition {
        self.binding.position()
    }

    pub fn current_producer(&self) -> Option<ProducerId> {
        self.binding.current()
    }

    pub fn options(&self) -> PresentOptions {
        self.scheduler.options()
    }

    pub fn set_video_gravity(&mut self, mode: GravityMode) {
        self.scheduler.set_video_gravity(mode);
    }

    pub fn set_clear_color(&mut self, color: ClearColor) {
        self.scheduler.set_clear_color(color);
    }

    pub fn set_color_space(&mut self, color_space: ColorSpace) {
        self.scheduler.set_color_space(color_space);
    }

    pub fn set_predicate(&mut self, predicate: Option<DrawPredicate>) {
        self.scheduler.set_predicate(predicate);
    }

    pub fn surface(&self) -> &S {
        self.scheduler.surface()
    }

    pub fn surface_mut(&mut self) -> &mut S {
        self.scheduler.surface_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::producer::StreamProducer;
    use crate::media::types::{Extent, Frame};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use crate::view::testing::RecordingSurface;

    struct Fixture {
        registry: Arc<ProducerRegistry<()>>,
        view: StreamView<RecordingSurface>,
        redraws: Arc<AtomicUsize>,
    }

    fn fixture() -> Fixture {
        let registry = Arc::new(ProducerRegistry::new());
        let redraws = Arc::new(AtomicUsize::new(0));
        let counter = redraws.clone();
        let view = StreamView::new(
            RecordingSurface::new(Extent::new(1000, 500)),
            PresentOptions::default(),
            registry.clone(),
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
            },
        );
        Fixture {
            registry,
            view,
            redraws,
        }
    }

    fn camera(registry: &ProducerRegistry<()>, position: CameraPosition) -> (ProducerId, Arc<StreamProducer<()>>) {
        let producer = Arc::new(StreamProducer::new("cam", position).unwrap());
        let id = registry.register(producer.clone());
        (id, producer)
    }

    #[test]
    fn attached_producer_frames_reach_the_surface() {
        let mut fx = fixture();
        let (id, producer) = camera(&fx.registry, CameraPosition::Front);

        fx.view.attach(Some(id)).unwrap();
        producer.wait_idle();
        assert_eq!(fx.view.position(), CameraPosition::Front);
        assert_eq!(fx.view.current_producer(), Some(id));

        let frame = Frame::solid(Extent::new(1920, 1080), [1, 2, 3, 255]);
        let frame_id = frame.id();
        assert!(producer.push_frame(frame));
        assert_eq!(fx.redraws.load(Ordering::SeqCst), 1);

        let outcome = fx.view.tick();
        assert!(outcome.is_presented(), "{outcome:?}");
        assert_eq!(fx.view.surface().rendered_frames(), vec![frame_id]);
    }

    #[test]
    fn tick_before_attach_skips() {
        let mut fx = fixture();
        fx.view
            .sink()
            .draw(Frame::solid(Extent::new(4, 4), [0; 4]));
        assert_eq!(fx.view.tick(), TickOutcome::Skipped(SkipReason::NoContext));
    }

    #[test]
    fn detach_after_attach_stops_drawing() {
        let mut fx = fixture();
        let (id, producer) = camera(&fx.registry, CameraPosition::Back);

        fx.view.attach(Some(id)).unwrap();
        producer.wait_idle();
        fx.view.attach(None).unwrap();

        assert!(!producer.is_bound());
        assert!(!producer.push_frame(Frame::solid(Extent::new(4, 4), [0; 4])));
        assert_eq!(fx.view.tick(), TickOutcome::Skipped(SkipReason::NoFrame));
    }

    #[test]
    fn double_attach_starts_twice_with_single_binding() {
        let mut fx = fixture();
        let (id, producer) = camera(&fx.registry, CameraPosition::Back);

        fx.view.attach(Some(id)).unwrap();
        fx.view.attach(Some(id)).unwrap();
        producer.wait_idle();

        assert_eq!(producer.start_count(), 2);
        assert!(producer.is_bound_to(fx.view.sink()));

        assert!(producer.push_frame(Frame::solid(Extent::new(4, 4), [0; 4])));
        assert!(fx.view.tick().is_presented());
        assert_eq!(fx.view.surface().presented(), 1);
    }

    #[test]
    fn unregistering_producer_makes_view_skip() {
        let mut fx = fixture();
        let (id, producer) = camera(&fx.registry, CameraPosition::Back);
        fx.view.attach(Some(id)).unwrap();
        producer.wait_idle();
        assert!(producer.push_frame(Frame::solid(Extent::new(4, 4), [0; 4])));

        fx.registry.unregister(id);
        assert_eq!(fx.view.tick(), TickOutcome::Skipped(SkipReason::NoContext));
    }

    #[test]
    fn gravity_change_applies_on_next_tick() {
        let mut fx = fixture();
        let (id, producer) = camera(&fx.registry, CameraPosition::Back);
        fx.view.attach(Some(id)).unwrap();
        producer.wait_idle();
        assert!(producer.push_frame(Frame::solid(Extent::new(1920, 1080), [0; 4])));

        let TickOutcome::Presented(fit) = fx.view.tick() else {
            panic!("expected present");
        };
        fx.view.set_video_gravity(GravityMode::ResizeAspectFill);
        let TickOutcome::Presented(fill) = fx.view.tick() else {
            panic!("expected present");
        };
        assert!(fill.scale_x > fit.scale_x);
        assert!(fill.translation_y < 0.0);
    }
}
