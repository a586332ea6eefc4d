use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use indexmap::IndexSet;

use super::{Axis, RendererId};

/// Notification routed from an observable into the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum GraphEvent {
    /// `external` is false for writes made by the axis controller itself.
    AxisChanged { axis: Axis, external: bool },
    RendererChanged(RendererId),
    RendererRangeChanged(RendererId),
    RulerChanged(RendererId),
    /// A renderer was added or removed.
    MembershipChanged,
    DimensionsMoved,
    DimensionsResized,
    TicksChanged,
}

#[derive(Default)]
struct QueueState {
    events: RefCell<IndexSet<GraphEvent>>,
    wake: RefCell<Option<Box<dyn FnMut()>>>,
    internal_writes: Cell<u32>,
}

/// Mailbox between signal slots and the graph.
///
/// Slots only capture a weak [`EventSender`], so they never keep the graph
/// alive and never touch graph state directly; the graph drains the queue at
/// its API boundaries. An event already waiting in the queue is not queued
/// again, so the backlog is bounded by the number of distinct sources.
#[derive(Clone, Default)]
pub(crate) struct EventQueue {
    state: Rc<QueueState>,
}

impl EventQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn sender(&self) -> EventSender {
        EventSender {
            state: Rc::downgrade(&self.state),
        }
    }

    #[cfg(test)]
    pub(crate) fn pop(&self) -> Option<GraphEvent> {
        self.state.events.borrow_mut().shift_remove_index(0)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.state.events.borrow().is_empty()
    }

    /// Takes the whole backlog in arrival order.
    pub(crate) fn take_all(&self) -> Vec<GraphEvent> {
        self.state.events.borrow_mut().drain(..).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.state.events.borrow().len()
    }

    #[cfg(test)]
    pub(crate) fn clear(&self) {
        self.state.events.borrow_mut().clear();
    }

    pub(crate) fn set_wake(&self, wake: Option<Box<dyn FnMut()>>) {
        *self.state.wake.borrow_mut() = wake;
    }

    /// Runs `write` with axis notifications tagged as controller writes.
    pub(crate) fn internal<R>(&self, write: impl FnOnce() -> R) -> R {
        let depth = &self.state.internal_writes;
        depth.set(depth.get() + 1);
        let result = write();
        depth.set(depth.get().saturating_sub(1));
        result
    }
}

/// Weak producer handle captured by signal slots.
#[derive(Clone)]
pub(crate) struct EventSender {
    state: Weak<QueueState>,
}

impl EventSender {
    /// Queues `event`; a no-op once the graph is gone.
    pub(crate) fn send(&self, event: GraphEvent) {
        let Some(state) = self.state.upgrade() else {
            return;
        };

        let was_empty = {
            let mut events = state.events.borrow_mut();
            let was_empty = events.is_empty();
            events.insert(event);
            was_empty
        };

        if was_empty {
            if let Ok(mut wake) = state.wake.try_borrow_mut() {
                if let Some(wake) = wake.as_mut() {
                    wake();
                }
            }
        }
    }

    /// Queues an axis change, tagging it with the current write origin.
    pub(crate) fn send_axis_changed(&self, axis: Axis) {
        let external = self
            .state
            .upgrade()
            .is_none_or(|state| state.internal_writes.get() == 0);
        self.send(GraphEvent::AxisChanged { axis, external });
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::{EventQueue, GraphEvent};
    use crate::graph::Axis;

    #[test]
    fn internal_scope_tags_axis_events() {
        let queue = EventQueue::new();
        let sender = queue.sender();

        sender.send_axis_changed(Axis::X);
        queue.internal(|| sender.send_axis_changed(Axis::Y));

        assert_eq!(
            queue.pop(),
            Some(GraphEvent::AxisChanged {
                axis: Axis::X,
                external: true
            })
        );
        assert_eq!(
            queue.pop(),
            Some(GraphEvent::AxisChanged {
                axis: Axis::Y,
                external: false
            })
        );
    }

    #[test]
    fn pending_duplicates_are_merged() {
        let queue = EventQueue::new();
        let sender = queue.sender();

        for _ in 0..3 {
            sender.send(GraphEvent::TicksChanged);
            sender.send(GraphEvent::DimensionsMoved);
        }

        assert_eq!(queue.len(), 2);
        assert_eq!(
            queue.take_all(),
            vec![GraphEvent::TicksChanged, GraphEvent::DimensionsMoved]
        );
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn wake_fires_when_queue_becomes_non_empty() {
        let queue = EventQueue::new();
        let wakes = Rc::new(Cell::new(0));
        let counter = Rc::clone(&wakes);
        queue.set_wake(Some(Box::new(move || counter.set(counter.get() + 1))));

        let sender = queue.sender();
        sender.send(GraphEvent::TicksChanged);
        sender.send(GraphEvent::DimensionsMoved);
        assert_eq!(wakes.get(), 1);

        queue.clear();
        sender.send(GraphEvent::TicksChanged);
        assert_eq!(wakes.get(), 2);
    }

    #[test]
    fn sender_outliving_queue_is_inert() {
        let queue = EventQueue::new();
        let sender = queue.sender();
        drop(queue);
        sender.send(GraphEvent::TicksChanged);
    }
}
