use std::sync::Arc;

use super::gravity::{Geometry, GravityMode, Rect};
use super::surface::{ClearColor, ColorSpace, DisplaySurface, RenderRequest};
use crate::media::mailbox::FrameMailbox;
use crate::media::types::Frame;

/// Approval hook consulted before each draw. Returning `false` skips the
/// tick; the frame stays current for the next one.
pub type DrawPredicate = Box<dyn Fn(&Frame) -> bool + Send>;

/// Why a tick did not present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoFrame,
    EmptyFrame,
    NoContext,
    NoDrawable,
    NoCommandBuffer,
    /// Frame exceeds what the surface can sample from.
    FrameTooLarge,
    Rejected,
}

/// Result of one display tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    Presented(Geometry),
    Skipped(SkipReason),
}

impl TickOutcome {
    pub fn is_presented(&self) -> bool {
        matches!(self, TickOutcome::Presented(_))
    }
}

/// Owner-set presentation options.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PresentOptions {
    pub video_gravity: GravityMode,
    pub clear_color: ClearColor,
    pub color_space: ColorSpace,
}

/// Draws the newest frame once per display tick.
///
/// Driven from outside: the owner calls [`tick`](Self::tick) whenever its
/// display clock fires. The scheduler never waits for frames; it polls the
/// mailbox and draws whatever is newest.
pub struct PresentationScheduler<S: DisplaySurface> {
    surface: S,
    options: PresentOptions,
    predicate: Option<DrawPredicate>,
    mailbox: Arc<FrameMailbox>,
    // Display-thread copy of the newest frame.
    display_frame: Option<Arc<Frame>>,
}

impl<S: DisplaySurface> PresentationScheduler<S> {
    pub fn new(surface: S, options: PresentOptions, mailbox: Arc<FrameMailbox>) -> Self {
        Self {
            surface,
            options,
            predicate: None,
            mailbox,
            display_frame: None,
        }
    }

    /// Run one tick against `context`, the attached producer's rendering
    /// context (if any).
    pub fn tick(&mut self, context: Option<&S::Context>) -> TickOutcome {
        let outcome = self.draw(context);
        if let TickOutcome::Skipped(reason) = outcome {
            log::trace!("tick skipped: {reason:?}");
        }
        outcome
    }

    fn draw(&mut self, context: Option<&S::Context>) -> TickOutcome {
        if let Some(latest) = self.mailbox.get() {
            self.display_frame = Some(latest);
        }
        let Some(frame) = self.display_frame.clone() else {
            return TickOutcome::Skipped(SkipReason::NoFrame);
        };
        if frame.extent().is_empty() {
            return TickOutcome::Skipped(SkipReason::EmptyFrame);
        }
        let Some(context) = context else {
            return TickOutcome::Skipped(SkipReason::NoContext);
        };
        if !self.surface.supports_extent(frame.extent()) {
            return TickOutcome::Skipped(SkipReason::FrameTooLarge);
        }
        let Some(drawable) = self.surface.current_drawable() else {
            return TickOutcome::Skipped(SkipReason::NoDrawable);
        };
        let Some(mut commands) = self.surface.command_buffer() else {
            return TickOutcome::Skipped(SkipReason::NoCommandBuffer);
        };
        // Consulted only once everything else is ready; an unpresented
        // drawable is simply dropped.
        if let Some(predicate) = &self.predicate {
            if !predicate(&*frame) {
                return TickOutcome::Skipped(SkipReason::Rejected);
            }
        }

        // Clear first so the drawable is always presented with defined contents.
        self.surface
            .encode_clear(&mut commands, &drawable, self.options.clear_color);

        let target = self.surface.drawable_size();
        let geometry = Geometry::compute(frame.extent(), target, self.options.video_gravity);
        self.surface.render(
            context,
            &mut commands,
            &drawable,
            RenderRequest {
                frame: &frame,
                geometry,
                bounds: Rect::from_extent(target),
                color_space: self.options.color_space,
            },
        );
        self.surface.present(commands, drawable);

        TickOutcome::Presented(geometry)
    }

    /// Present a drawable cleared to the clear color, without drawing a frame.
    pub fn clear(&mut self) -> bool {
        let Some(drawable) = self.surface.current_drawable() else {
            return false;
        };
        let Some(mut commands) = self.surface.command_buffer() else {
            return false;
        };
        self.surface
            .encode_clear(&mut commands, &drawable, self.options.clear_color);
        self.surface.present(commands, drawable);
        true
    }

    pub fn options(&self) -> PresentOptions {
        self.options
    }

    pub fn set_video_gravity(&mut self, mode: GravityMode) {
        self.options.video_gravity = mode;
    }

    pub fn set_clear_color(&mut self, color: ClearColor) {
        self.options.clear_color = color;
    }

    pub fn set_color_space(&mut self, color_space: ColorSpace) {
        self.options.color_space = color_space;
    }

    pub fn set_predicate(&mut self, predicate: Option<DrawPredicate>) {
        self.predicate = predicate;
    }

    pub fn display_frame(&self) -> Option<&Arc<Frame>> {
        self.display_frame.as_ref()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::types::Extent;
    use crate::view::testing::{Op, RecordingSurface};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn scheduler(surface: RecordingSurface) -> (Arc<FrameMailbox>, PresentationScheduler<RecordingSurface>) {
        let mailbox = Arc::new(FrameMailbox::new());
        let s = PresentationScheduler::new(surface, PresentOptions::default(), mailbox.clone());
        (mailbox, s)
    }

    fn frame(w: u32, h: u32) -> Arc<Frame> {
        Arc::new(Frame::solid(Extent::new(w, h), [10, 20, 30, 255]))
    }

    #[test]
    fn skips_without_frame() {
        let (_mb, mut s) = scheduler(RecordingSurface::new(Extent::new(100, 100)));
        assert_eq!(s.tick(Some(&())), TickOutcome::Skipped(SkipReason::NoFrame));
        assert!(s.surface().ops.is_empty());
    }

    #[test]
    fn skips_without_context() {
        let (mb, mut s) = scheduler(RecordingSurface::new(Extent::new(100, 100)));
        mb.set(frame(10, 10));
        assert_eq!(s.tick(None), TickOutcome::Skipped(SkipReason::NoContext));
        assert!(s.surface().ops.is_empty());
    }

    #[test]
    fn skips_without_drawable_or_commands() {
        let mut surface = RecordingSurface::new(Extent::new(100, 100));
        surface.drawable_ready = false;
        let (mb, mut s) = scheduler(surface);
        mb.set(frame(10, 10));
        assert_eq!(s.tick(Some(&())), TickOutcome::Skipped(SkipReason::NoDrawable));

        s.surface_mut().drawable_ready = true;
        s.surface_mut().commands_ready = false;
        assert_eq!(
            s.tick(Some(&())),
            TickOutcome::Skipped(SkipReason::NoCommandBuffer)
        );
        assert!(s.surface().presented() == 0);
    }

    #[test]
    fn zero_extent_frame_is_skipped() {
        let (mb, mut s) = scheduler(RecordingSurface::new(Extent::new(100, 100)));
        mb.set(frame(0, 10));
        assert_eq!(s.tick(Some(&())), TickOutcome::Skipped(SkipReason::EmptyFrame));
    }

    #[test]
    fn presents_clear_render_present_in_order() {
        let (mb, mut s) = scheduler(RecordingSurface::new(Extent::new(1000, 500)));
        s.set_clear_color(ClearColor::new(0.5, 0.0, 0.0, 1.0));
        let f = frame(1920, 1080);
        mb.set(f.clone());

        let outcome = s.tick(Some(&()));
        let TickOutcome::Presented(geometry) = outcome else {
            panic!("expected present, got {outcome:?}");
        };
        assert!((geometry.translation_x - 120.0).abs() < 0.2);

        let ops = &s.surface().ops;
        assert_eq!(ops.len(), 3);
        assert_eq!(ops[0], Op::Clear(ClearColor::new(0.5, 0.0, 0.0, 1.0)));
        match &ops[1] {
            Op::Render {
                frame,
                geometry: g,
                bounds,
                color_space,
            } => {
                assert_eq!(*frame, f.id());
                assert_eq!(g, &geometry);
                assert_eq!(*bounds, Rect::from_extent(Extent::new(1000, 500)));
                assert_eq!(*color_space, ColorSpace::Srgb);
            }
            other => panic!("expected render, got {other:?}"),
        }
        assert_eq!(ops[2], Op::Present);
    }

    #[test]
    fn rejected_frame_is_kept_for_next_tick() {
        let (mb, mut s) = scheduler(RecordingSurface::new(Extent::new(100, 100)));
        let f = frame(10, 10);
        mb.set(f.clone());

        s.set_predicate(Some(Box::new(|_| false)));
        assert_eq!(s.tick(Some(&())), TickOutcome::Skipped(SkipReason::Rejected));
        assert_eq!(s.display_frame().unwrap().id(), f.id());
        assert_eq!(s.surface().presented(), 0);

        s.set_predicate(Some(Box::new(|_| true)));
        assert!(s.tick(Some(&())).is_presented());
        assert_eq!(s.surface().rendered_frames(), vec![f.id()]);
    }

    #[test]
    fn predicate_not_consulted_when_not_ready() {
        let mut surface = RecordingSurface::new(Extent::new(100, 100));
        surface.drawable_ready = false;
        let (mb, mut s) = scheduler(surface);
        mb.set(frame(10, 10));

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        s.set_predicate(Some(Box::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        })));

        assert_eq!(s.tick(Some(&())), TickOutcome::Skipped(SkipReason::NoDrawable));
        s.surface_mut().drawable_ready = true;
        s.surface_mut().commands_ready = false;
        assert_eq!(
            s.tick(Some(&())),
            TickOutcome::Skipped(SkipReason::NoCommandBuffer)
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        s.surface_mut().commands_ready = true;
        assert!(s.tick(Some(&())).is_presented());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn oversized_frame_is_skipped_before_acquiring_drawable() {
        let mut surface = RecordingSurface::new(Extent::new(100, 100));
        surface.max_dimension = 8192;
        let (mb, mut s) = scheduler(surface);
        mb.set(frame(9000, 10));

        assert_eq!(
            s.tick(Some(&())),
            TickOutcome::Skipped(SkipReason::FrameTooLarge)
        );
        assert!(s.surface().ops.is_empty());
        assert_eq!(s.surface().drawables_acquired, 0);

        mb.set(frame(8192, 10));
        assert!(s.tick(Some(&())).is_presented());
    }

    #[test]
    fn burst_before_tick_draws_only_latest() {
        let (mb, mut s) = scheduler(RecordingSurface::new(Extent::new(100, 100)));
        let (f1, f2, f3) = (frame(10, 10), frame(10, 10), frame(10, 10));
        mb.set(f1);
        mb.set(f2);
        mb.set(f3.clone());

        assert!(s.tick(Some(&())).is_presented());
        assert_eq!(s.surface().rendered_frames(), vec![f3.id()]);
    }

    #[test]
    fn unknown_gravity_draws_identity() {
        let (mb, mut s) = scheduler(RecordingSurface::new(Extent::new(100, 100)));
        s.set_video_gravity(GravityMode::Other);
        mb.set(frame(640, 480));
        assert_eq!(s.tick(Some(&())), TickOutcome::Presented(Geometry::identity()));
    }

    #[test]
    fn geometry_tracks_surface_and_frame_size_each_tick() {
        let (mb, mut s) = scheduler(RecordingSurface::new(Extent::new(200, 100)));
        s.set_video_gravity(GravityMode::Resize);
        mb.set(frame(100, 100));
        assert_eq!(
            s.tick(Some(&())),
            TickOutcome::Presented(Geometry {
                scale_x: 2.0,
                scale_y: 1.0,
                translation_x: 0.0,
                translation_y: 0.0
            })
        );

        s.surface_mut().size = Extent::new(100, 400);
        mb.set(frame(50, 100));
        let TickOutcome::Presented(g) = s.tick(Some(&())) else {
            panic!("expected present");
        };
        assert_eq!((g.scale_x, g.scale_y), (2.0, 4.0));
    }

    #[test]
    fn clear_presents_without_frame() {
        let (_mb, mut s) = scheduler(RecordingSurface::new(Extent::new(100, 100)));
        assert!(s.clear());
        assert_eq!(s.surface().ops, vec![Op::Clear(ClearColor::BLACK), Op::Present]);

        s.surface_mut().drawable_ready = false;
        assert!(!s.clear());
    }
}
