use std::any::Any;
use std::cell::Cell;
use std::rc::Rc;

use crate::core::Viewport;
use crate::error::{PlotError, PlotResult};

use super::{DrawTarget, RenderFrame, Surface, SurfaceProvider};

/// Shared allocation counters of a [`RecordingSurfaceProvider`].
#[derive(Debug, Clone, Default)]
pub struct SurfaceCounter {
    created: Rc<Cell<usize>>,
    live: Rc<Cell<usize>>,
}

impl SurfaceCounter {
    #[must_use]
    pub fn created(&self) -> usize {
        self.created.get()
    }

    /// Surfaces allocated and not yet dropped.
    #[must_use]
    pub fn live(&self) -> usize {
        self.live.get()
    }
}

/// Headless surface that keeps the last painted display list.
#[derive(Debug)]
pub struct RecordingSurface {
    viewport: Viewport,
    frame: RenderFrame,
    paint_count: usize,
    counter: SurfaceCounter,
}

impl RecordingSurface {
    #[must_use]
    pub fn frame(&self) -> &RenderFrame {
        &self.frame
    }

    #[must_use]
    pub fn paint_count(&self) -> usize {
        self.paint_count
    }
}

impl Surface for RecordingSurface {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn paint(&mut self, frame: &RenderFrame) -> PlotResult<()> {
        frame.validate()?;
        self.frame = frame.clone();
        self.paint_count += 1;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Drop for RecordingSurface {
    fn drop(&mut self) {
        let live = &self.counter.live;
        live.set(live.get().saturating_sub(1));
    }
}

/// Provider for tests and headless hosts.
#[derive(Debug, Default)]
pub struct RecordingSurfaceProvider {
    counter: SurfaceCounter,
    failing: bool,
}

impl RecordingSurfaceProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider that refuses every request, like a host without a window.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            counter: SurfaceCounter::default(),
            failing: true,
        }
    }

    #[must_use]
    pub fn counter(&self) -> SurfaceCounter {
        self.counter.clone()
    }
}

impl SurfaceProvider for RecordingSurfaceProvider {
    fn create_surface(&mut self, viewport: Viewport) -> PlotResult<Box<dyn Surface>> {
        if self.failing {
            return Err(PlotError::Backend("surface allocation refused".to_owned()));
        }
        if !viewport.is_valid() {
            return Err(PlotError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }

        self.counter.created.set(self.counter.created.get() + 1);
        self.counter.live.set(self.counter.live.get() + 1);
        Ok(Box::new(RecordingSurface {
            viewport,
            frame: RenderFrame::new(viewport),
            paint_count: 0,
            counter: self.counter.clone(),
        }))
    }
}

/// One operation received by a [`RecordingTarget`].
#[derive(Debug, Clone, PartialEq)]
pub enum TargetOp {
    Composite { x: f64, y: f64, frame: RenderFrame },
    Frame(RenderFrame),
}

/// Draw target that records what it was asked to paint.
#[derive(Debug, Default)]
pub struct RecordingTarget {
    pub ops: Vec<TargetOp>,
}

impl RecordingTarget {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.ops.clear();
    }

    /// Frames of composited surfaces, in paint order.
    pub fn composited(&self) -> impl Iterator<Item = &RenderFrame> {
        self.ops.iter().filter_map(|op| match op {
            TargetOp::Composite { frame, .. } => Some(frame),
            TargetOp::Frame(_) => None,
        })
    }
}

impl DrawTarget for RecordingTarget {
    fn composite(&mut self, surface: &dyn Surface, x: f64, y: f64) -> PlotResult<()> {
        let Some(surface) = surface.as_any().downcast_ref::<RecordingSurface>() else {
            return Err(PlotError::Backend(
                "recording target can only composite recording surfaces".to_owned(),
            ));
        };
        self.ops.push(TargetOp::Composite {
            x,
            y,
            frame: surface.frame.clone(),
        });
        Ok(())
    }

    fn draw_frame(&mut self, frame: &RenderFrame) -> PlotResult<()> {
        frame.validate()?;
        self.ops.push(TargetOp::Frame(frame.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{RecordingSurfaceProvider, RecordingTarget, TargetOp};
    use crate::core::Viewport;
    use crate::render::{DrawTarget, RectPrimitive, RenderFrame, Rgba, Surface, SurfaceProvider};

    #[test]
    fn dropping_a_surface_releases_it_once() {
        let mut provider = RecordingSurfaceProvider::new();
        let counter = provider.counter();

        let first = provider.create_surface(Viewport::new(10, 10)).expect("surface");
        let second = provider.create_surface(Viewport::new(10, 10)).expect("surface");
        assert_eq!(counter.live(), 2);

        drop(first);
        drop(second);
        assert_eq!(counter.created(), 2);
        assert_eq!(counter.live(), 0);
    }

    #[test]
    fn failing_provider_and_empty_viewport_are_errors() {
        assert!(
            RecordingSurfaceProvider::failing()
                .create_surface(Viewport::new(10, 10))
                .is_err()
        );
        assert!(
            RecordingSurfaceProvider::new()
                .create_surface(Viewport::new(0, 10))
                .is_err()
        );
    }

    #[test]
    fn target_records_composited_surface_content() {
        let mut provider = RecordingSurfaceProvider::new();
        let mut surface = provider.create_surface(Viewport::new(20, 20)).expect("surface");
        let frame = RenderFrame::new(Viewport::new(20, 20)).with(RectPrimitive::new(
            0.0,
            0.0,
            20.0,
            20.0,
            Rgba::rgb(1.0, 1.0, 1.0),
        ));
        surface.paint(&frame).expect("paint");

        let mut target = RecordingTarget::new();
        target.composite(surface.as_ref(), 5.0, 6.0).expect("composite");
        assert_eq!(
            target.ops,
            vec![TargetOp::Composite {
                x: 5.0,
                y: 6.0,
                frame,
            }]
        );
    }
}
