use tracing::{debug, trace, warn};

use crate::core::{DataPoint, Transform};
use crate::render::Rgba;

use super::{Graph, InvalidationLevel, RendererId};

/// Value shown for one renderer under the ruler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RulerHit {
    pub renderer: RendererId,
    /// Data value, snapped to an existing point when snapping is on.
    pub value: DataPoint,
    /// Where `value` lands in plot pixels.
    pub pixel: DataPoint,
    pub interpolated: bool,
    pub color: Rgba,
}

/// What the ruler displays for the current cursor position.
#[derive(Debug, Clone, PartialEq)]
pub enum RulerReadout {
    /// No position set, or the ruler is switched off.
    Hidden,
    /// No renderer could answer; only the cursor's axis position is shown.
    Freestyle { pixel: DataPoint, axis: DataPoint },
    Probed {
        pixel: DataPoint,
        axis: DataPoint,
        hits: Vec<RulerHit>,
    },
}

impl RulerReadout {
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        matches!(self, Self::Hidden)
    }

    #[must_use]
    pub fn is_freestyle(&self) -> bool {
        matches!(self, Self::Freestyle { .. })
    }

    #[must_use]
    pub fn hits(&self) -> &[RulerHit] {
        match self {
            Self::Probed { hits, .. } => hits,
            Self::Hidden | Self::Freestyle { .. } => &[],
        }
    }

    /// Cursor position converted to axis coordinates.
    #[must_use]
    pub fn axis_position(&self) -> Option<DataPoint> {
        match self {
            Self::Hidden => None,
            Self::Freestyle { axis, .. } | Self::Probed { axis, .. } => Some(*axis),
        }
    }
}

impl Graph {
    /// Ruler position in plot pixels.
    #[must_use]
    pub fn ruler(&self) -> Option<DataPoint> {
        self.ruler_position
    }

    /// Moves the ruler; only the overlay is recomposed on the next draw.
    pub fn set_ruler(&mut self, position: Option<DataPoint>) {
        let position = position.filter(|point| point.is_finite());
        if self.ruler_position == position {
            return;
        }
        self.ruler_position = position;
        trace!(?position, "ruler moved");
        self.process_events();
        self.invalidate(InvalidationLevel::Overlay);
    }

    /// Renderer currently holding the ruler.
    #[must_use]
    pub fn ruler_target(&self) -> Option<RendererId> {
        self.renderers.iter().find_map(|(id, renderer)| {
            renderer
                .try_borrow()
                .is_ok_and(|renderer| renderer.has_ruler())
                .then_some(id)
        })
    }

    /// Readout for the current ruler position at the graph's dimensions.
    #[must_use]
    pub fn ruler_readout(&self) -> RulerReadout {
        self.probe_ruler(&self.transform())
    }

    /// Moves the ruler to the next (or previous) ruler-capable renderer,
    /// wrapping around. Returns the new holder.
    pub fn switch_ruler(&mut self, forward: bool) -> Option<RendererId> {
        let capable = self.ruler_capable();
        if capable.is_empty() {
            return None;
        }

        let current = self
            .ruler_target()
            .and_then(|target| capable.iter().position(|id| *id == target));
        let count = capable.len();
        let next = match (current, forward) {
            (Some(index), true) => (index + 1) % count,
            (Some(index), false) => (index + count - 1) % count,
            (None, true) => 0,
            (None, false) => count - 1,
        };

        let target = capable[next];
        self.assign_ruler(Some(target));
        self.process_events();
        Some(target)
    }

    /// Gives the ruler to `id`, or takes it away if `id` already holds it.
    /// Returns whether `id` holds the ruler afterwards.
    pub fn toggle_ruler(&mut self, id: RendererId) -> bool {
        if self.ruler_target() == Some(id) {
            self.assign_ruler(None);
            self.process_events();
            return false;
        }
        if !self.ruler_capable().contains(&id) {
            return false;
        }
        self.assign_ruler(Some(id));
        self.process_events();
        true
    }

    fn ruler_capable(&self) -> Vec<RendererId> {
        self.renderers
            .iter()
            .filter(|(_, renderer)| renderer.try_borrow().is_ok_and(|renderer| renderer.can_rule()))
            .map(|(id, _)| id)
            .collect()
    }

    /// Nearest capable renderer before `index`, else the nearest after it.
    pub(super) fn ruler_successor(&self, index: usize) -> Option<RendererId> {
        let capable_at = |position: usize| {
            let id = self.renderers.id_at(position)?;
            let renderer = self.renderers.get(id)?;
            renderer
                .try_borrow()
                .is_ok_and(|renderer| renderer.can_rule())
                .then_some(id)
        };

        (0..index.min(self.renderers.len()))
            .rev()
            .find_map(capable_at)
            .or_else(|| (index..self.renderers.len()).find_map(capable_at))
    }

    /// Sets the ruler flag on `target` and clears it everywhere else.
    pub(super) fn assign_ruler(&mut self, target: Option<RendererId>) {
        for (id, renderer) in self.renderers.iter() {
            let Ok(mut renderer) = renderer.try_borrow_mut() else {
                warn!(%id, "renderer busy; ruler flag not updated");
                continue;
            };
            renderer.set_has_ruler(Some(id) == target);
        }
        debug!(?target, "ruler assigned");
    }

    /// Keeps at most one holder after a renderer flipped its own flag.
    pub(super) fn on_ruler_changed(&mut self, id: RendererId) -> InvalidationLevel {
        let Some(renderer) = self.renderers.get(id) else {
            return InvalidationLevel::None;
        };
        let holds = renderer
            .try_borrow()
            .is_ok_and(|renderer| renderer.has_ruler());
        if holds {
            for (other, renderer) in self.renderers.iter() {
                if other == id {
                    continue;
                }
                if let Ok(mut renderer) = renderer.try_borrow_mut() {
                    if renderer.has_ruler() {
                        renderer.set_has_ruler(false);
                    }
                }
            }
        }
        InvalidationLevel::Overlay
    }

    pub(super) fn probe_ruler(&self, transform: &Transform) -> RulerReadout {
        let Some(pixel) = self.ruler_position.filter(|_| self.appearance.show_ruler) else {
            return RulerReadout::Hidden;
        };
        let axis = transform.pixel_to_axis(pixel);
        let snap = self.appearance.snap_ruler_to_data;

        let mut hits = Vec::new();
        for (id, renderer) in self.renderers.iter() {
            let Ok(renderer) = renderer.try_borrow() else {
                continue;
            };
            if !renderer.has_ruler() || renderer.is_empty() {
                continue;
            }

            let base = renderer.base();
            let (x_units, y_units) = (base.x_units(), base.y_units());
            let query = x_units.from_pixel(transform.x, pixel.x);
            let probe = renderer.value_at_x(query);
            if probe.extrapolated {
                continue;
            }

            let (value, interpolated) = if snap {
                (renderer.value_closest_to_x(query), false)
            } else {
                (probe.point, probe.interpolated)
            };
            let hit_pixel = DataPoint::new(
                x_units.to_pixel(transform.x, value.x),
                y_units.to_pixel(transform.y, value.y),
            );
            if !hit_pixel.is_finite() {
                continue;
            }

            let color = renderer
                .as_colored()
                .map_or(self.appearance.ruler_color, |colored| colored.color());
            hits.push(RulerHit {
                renderer: id,
                value,
                pixel: hit_pixel,
                interpolated,
                color,
            });
        }

        if hits.is_empty() {
            RulerReadout::Freestyle { pixel, axis }
        } else {
            RulerReadout::Probed { pixel, axis, hits }
        }
    }
}
