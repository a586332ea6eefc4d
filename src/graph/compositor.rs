use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::core::{Rectangle, Viewport};
use crate::error::{PlotError, PlotResult};
use crate::render::{DrawTarget, LayeredRenderFrame, RenderFrame, Surface, SurfaceProvider};

use super::{Graph, InvalidationLevel};

/// Counters proving which draw paths ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompositorStats {
    pub full_recompositions: u64,
    pub overlay_recompositions: u64,
    pub presents: u64,
    pub surfaces_created: u64,
    pub surfaces_released: u64,
}

/// Double-buffered data surfaces plus one overlay surface.
///
/// Data layers are painted into the back buffer which then becomes the front
/// one; the overlay is repainted on its own. Surfaces are released by
/// dropping them, so `release` is naturally idempotent.
pub(super) struct Compositor {
    buffers: [Option<Box<dyn Surface>>; 2],
    front: usize,
    overlay: Option<Box<dyn Surface>>,
    data_dirty: bool,
    overlay_dirty: bool,
    stats: CompositorStats,
}

impl Compositor {
    pub(super) fn invalidate(&mut self, level: InvalidationLevel) {
        match level {
            InvalidationLevel::Full => {
                self.data_dirty = true;
                self.overlay_dirty = true;
            }
            InvalidationLevel::Overlay => self.overlay_dirty = true,
            InvalidationLevel::Present | InvalidationLevel::None => {}
        }
    }

    pub(super) fn needs_data(&self) -> bool {
        self.data_dirty
    }

    pub(super) fn needs_overlay(&self) -> bool {
        self.overlay_dirty
    }

    pub(super) fn stats(&self) -> CompositorStats {
        self.stats
    }

    pub(super) fn live_surfaces(&self) -> usize {
        self.buffers.iter().filter(|slot| slot.is_some()).count() + usize::from(self.overlay.is_some())
    }

    /// Drops every surface; returns how many were alive.
    pub(super) fn release(&mut self) -> usize {
        let [first, second] = &mut self.buffers;
        let released = [first, second, &mut self.overlay]
            .into_iter()
            .filter_map(Option::take)
            .count();

        if released > 0 {
            self.stats.surfaces_released += released as u64;
            self.data_dirty = true;
            self.overlay_dirty = true;
            debug!(released, "graph surfaces released");
        }
        released
    }

    /// Makes sure all three surfaces exist at `viewport`.
    pub(super) fn ensure_surfaces(
        &mut self,
        provider: &mut dyn SurfaceProvider,
        viewport: Viewport,
    ) -> PlotResult<()> {
        let stale = self
            .buffers
            .iter()
            .chain(std::iter::once(&self.overlay))
            .flatten()
            .any(|surface| surface.viewport() != viewport);
        if stale {
            self.release();
        }

        let [first, second] = &mut self.buffers;
        for (index, slot) in [first, second].into_iter().enumerate() {
            if slot.is_none() {
                *slot = Some(provider.create_surface(viewport)?);
                self.stats.surfaces_created += 1;
                if index == self.front {
                    self.data_dirty = true;
                }
                debug!(width = viewport.width, height = viewport.height, index, "data surface created");
            }
        }

        if self.overlay.is_none() {
            self.overlay = Some(provider.create_surface(viewport)?);
            self.stats.surfaces_created += 1;
            self.overlay_dirty = true;
            debug!(width = viewport.width, height = viewport.height, "overlay surface created");
        }
        Ok(())
    }

    /// Paints `frame` into the back buffer and swaps it to the front.
    pub(super) fn compose_data(&mut self, frame: &RenderFrame) -> PlotResult<()> {
        let back = 1 - self.front;
        let surface = self.buffers[back]
            .as_mut()
            .ok_or_else(|| PlotError::Backend("back buffer missing".to_owned()))?;
        surface.paint(frame)?;

        self.front = back;
        self.data_dirty = false;
        self.stats.full_recompositions += 1;
        trace!(primitives = frame.len(), front = self.front, "data layers recomposed");
        Ok(())
    }

    pub(super) fn compose_overlay(&mut self, frame: &RenderFrame) -> PlotResult<()> {
        let surface = self
            .overlay
            .as_mut()
            .ok_or_else(|| PlotError::Backend("overlay surface missing".to_owned()))?;
        surface.paint(frame)?;

        self.overlay_dirty = false;
        self.stats.overlay_recompositions += 1;
        trace!(primitives = frame.len(), "overlay recomposed");
        Ok(())
    }

    pub(super) fn present(&mut self, target: &mut dyn DrawTarget, x: f64, y: f64) -> PlotResult<()> {
        if let Some(front) = self.buffers[self.front].as_deref() {
            target.composite(front, x, y)?;
        }
        if let Some(overlay) = self.overlay.as_deref() {
            target.composite(overlay, x, y)?;
        }
        self.stats.presents += 1;
        Ok(())
    }

    pub(super) fn front_surface(&self) -> Option<&dyn Surface> {
        self.buffers[self.front].as_deref()
    }

    pub(super) fn overlay_surface(&self) -> Option<&dyn Surface> {
        self.overlay.as_deref()
    }
}

impl Default for Compositor {
    fn default() -> Self {
        Self {
            buffers: [None, None],
            front: 0,
            overlay: None,
            data_dirty: true,
            overlay_dirty: true,
            stats: CompositorStats::default(),
        }
    }
}

impl fmt::Debug for Compositor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compositor")
            .field("live_surfaces", &self.live_surfaces())
            .field("front", &self.front)
            .field("data_dirty", &self.data_dirty)
            .field("overlay_dirty", &self.overlay_dirty)
            .field("stats", &self.stats)
            .finish()
    }
}

impl Graph {
    /// Paints the current state at the graph's own dimensions.
    ///
    /// Recomposes only what is dirty: ruler movement repaints the overlay and
    /// leaves the data buffers untouched. A zero-sized plot or a provider
    /// that cannot allocate surfaces turns this into a no-op.
    pub fn draw(&mut self, target: &mut dyn DrawTarget) -> PlotResult<()> {
        self.process_events();

        let viewport = self.dimensions.viewport();
        if !viewport.is_valid() {
            trace!("draw skipped: plot area is empty");
            return Ok(());
        }

        if let Err(err) = self
            .compositor
            .ensure_surfaces(self.provider.as_mut(), viewport)
        {
            warn!(%err, "surface provider failed; draw skipped");
            self.compositor.release();
            return Ok(());
        }

        if self.compositor.needs_data() {
            let mut layers = LayeredRenderFrame::canonical(viewport);
            self.fill_data_layers(&mut layers);
            self.compositor.compose_data(&layers.flatten_data())?;
        }

        if self.compositor.needs_overlay() {
            let mut layers = LayeredRenderFrame::canonical(viewport);
            self.fill_overlay_layers(&mut layers, true);
            self.compositor.compose_overlay(&layers.flatten_overlay())?;
        }

        self.compositor
            .present(target, self.dimensions.x(), self.dimensions.y())
    }

    /// One-shot render of data, axes and legend into `rect`, bypassing the
    /// compositor. The ruler is never drawn here.
    pub fn draw_to(&mut self, target: &mut dyn DrawTarget, rect: &Rectangle) -> PlotResult<()> {
        self.process_events();

        let viewport = rect.viewport();
        if !viewport.is_valid() {
            trace!("draw_to skipped: target rectangle is empty");
            return Ok(());
        }

        let mut layers = LayeredRenderFrame::canonical(viewport);
        self.fill_data_layers(&mut layers);
        self.fill_overlay_layers(&mut layers, false);

        let mut frame = layers.flatten();
        frame.translate(rect.x(), rect.y());
        target.draw_frame(&frame)
    }

    /// Builds every layer for `viewport` without touching the surfaces.
    pub fn layered_frame(&mut self, viewport: Viewport) -> LayeredRenderFrame {
        self.process_events();
        let mut layers = LayeredRenderFrame::canonical(viewport);
        if viewport.is_valid() {
            self.fill_data_layers(&mut layers);
            self.fill_overlay_layers(&mut layers, true);
        }
        layers
    }

    #[must_use]
    pub fn compositor_stats(&self) -> CompositorStats {
        self.compositor.stats()
    }

    #[must_use]
    pub fn live_surface_count(&self) -> usize {
        self.compositor.live_surfaces()
    }

    /// Front data surface, if one has been composed.
    #[must_use]
    pub fn front_surface(&self) -> Option<&dyn Surface> {
        self.compositor.front_surface()
    }

    #[must_use]
    pub fn overlay_surface(&self) -> Option<&dyn Surface> {
        self.compositor.overlay_surface()
    }
}
