use std::any::Any;

use crate::core::Viewport;
use crate::error::PlotResult;

use super::RenderFrame;

/// Offscreen drawable owned by the compositor.
///
/// Dropping the box releases the backing resource.
pub trait Surface: Any {
    fn viewport(&self) -> Viewport;

    /// Replaces the whole surface content with `frame` on a transparent base.
    fn paint(&mut self, frame: &RenderFrame) -> PlotResult<()>;

    fn as_any(&self) -> &dyn Any;
}

/// Host hook that allocates surfaces of a requested pixel size.
pub trait SurfaceProvider {
    fn create_surface(&mut self, viewport: Viewport) -> PlotResult<Box<dyn Surface>>;
}

impl<F> SurfaceProvider for F
where
    F: FnMut(Viewport) -> PlotResult<Box<dyn Surface>>,
{
    fn create_surface(&mut self, viewport: Viewport) -> PlotResult<Box<dyn Surface>> {
        self(viewport)
    }
}

/// Destination of a draw call: a window context, an export target, ...
pub trait DrawTarget {
    /// Paints a surface produced by the same backend with its top-left at `(x, y)`.
    fn composite(&mut self, surface: &dyn Surface, x: f64, y: f64) -> PlotResult<()>;

    /// Paints a display list directly; coordinates are already in target space.
    fn draw_frame(&mut self, frame: &RenderFrame) -> PlotResult<()>;
}
