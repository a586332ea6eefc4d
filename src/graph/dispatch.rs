use tracing::{trace, warn};

use super::events::GraphEvent;
use super::{Graph, InvalidationLevel};

/// Upper bound on dispatch passes in one cycle. The backlog present on entry
/// is always handled in the first pass; later passes only see feedback
/// queued while handling, which settles after a handful.
const MAX_PASSES_PER_CYCLE: usize = 64;

impl Graph {
    /// Drains queued notifications and applies their consequences.
    ///
    /// Renderer changes are coalesced into one auto-axis recompute per pass.
    /// `request_redraw` fires at most once. Returns the resulting level.
    pub fn process_events(&mut self) -> InvalidationLevel {
        let mut level = InvalidationLevel::None;

        for pass in 1..=MAX_PASSES_PER_CYCLE {
            let batch = self.events.take_all();
            for event in batch {
                trace!(?event, pass, "graph event");
                level = level.max(self.handle_event(event));
            }

            if self.autorange_pending {
                self.autorange_pending = false;
                self.recompute_auto_axes();
            }

            if self.events.is_empty() && !self.autorange_pending {
                break;
            }
            if pass == MAX_PASSES_PER_CYCLE {
                warn!(
                    pending = self.events.len(),
                    "graph events did not settle; the rest waits for the next cycle"
                );
            }
        }

        self.invalidate(level);
        level
    }

    fn handle_event(&mut self, event: GraphEvent) -> InvalidationLevel {
        match event {
            GraphEvent::AxisChanged { axis, external } => {
                if external {
                    self.on_external_axis_write(axis);
                }
                InvalidationLevel::Full
            }
            GraphEvent::RendererChanged(id) | GraphEvent::RendererRangeChanged(id) => {
                if !self.renderers.contains(id) {
                    return InvalidationLevel::None;
                }
                self.autorange_pending = true;
                InvalidationLevel::Full
            }
            GraphEvent::MembershipChanged => {
                self.autorange_pending = true;
                InvalidationLevel::Full
            }
            GraphEvent::RulerChanged(id) => self.on_ruler_changed(id),
            GraphEvent::DimensionsMoved => InvalidationLevel::Present,
            GraphEvent::DimensionsResized => {
                self.compositor.release();
                self.enforce_aspect();
                InvalidationLevel::Full
            }
            GraphEvent::TicksChanged => InvalidationLevel::Full,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use crate::core::DataPoint;
    use crate::graph::{AxisMode, Graph, InvalidationLevel};
    use crate::render::RecordingSurfaceProvider;
    use crate::renderers::{Line, shared};

    #[test]
    fn renderer_updates_coalesce_into_one_redraw() {
        let mut graph = Graph::new(RecordingSurfaceProvider::new());
        let line = shared(Line::new());
        graph.add(line.clone()).expect("add");

        let redraws = Rc::new(Cell::new(0));
        let counter = Rc::clone(&redraws);
        graph.connect_redraw_requested(move || counter.set(counter.get() + 1));

        for x in 0..10 {
            line.borrow_mut()
                .append(DataPoint::new(f64::from(x), f64::from(x * 2)));
        }
        assert!(graph.pending_events() > 0);

        assert_eq!(graph.process_events(), InvalidationLevel::Full);
        assert_eq!(redraws.get(), 1);
        assert_eq!(graph.x_axis().bounds(), (0.0, 9.0));
        assert_eq!(graph.x_axis_mode(), AxisMode::Auto);
        assert_eq!(graph.process_events(), InvalidationLevel::None);
    }

    #[test]
    fn external_write_fixes_the_axis() {
        let mut graph = Graph::new(RecordingSurfaceProvider::new());
        graph.x_axis_mut().update(-3.0, 3.0);
        assert_eq!(graph.x_axis_mode(), AxisMode::Fixed);
        assert_eq!(graph.y_axis_mode(), AxisMode::Auto);
    }
}
