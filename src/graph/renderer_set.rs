use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::core::{Changeable, SubscriptionId, ordered, union_bounds};
use crate::error::{PlotError, PlotResult};
use crate::renderers::{Renderer, SharedRenderer, Units};

use super::events::{EventSender, GraphEvent};
use super::Graph;

/// Stable handle of a renderer inside one graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RendererId(u64);

impl RendererId {
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RendererId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "renderer#{}", self.0)
    }
}

struct Subscriptions {
    changed: SubscriptionId,
    x_range: SubscriptionId,
    y_range: SubscriptionId,
    ruler: SubscriptionId,
}

struct RendererEntry {
    renderer: SharedRenderer,
    subscriptions: Subscriptions,
}

/// Renderers in insertion order, which is both paint order and legend order.
#[derive(Default)]
pub(super) struct RendererSet {
    entries: IndexMap<RendererId, RendererEntry>,
    next_id: u64,
}

impl RendererSet {
    pub(super) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(super) fn contains(&self, id: RendererId) -> bool {
        self.entries.contains_key(&id)
    }

    pub(super) fn get(&self, id: RendererId) -> Option<&SharedRenderer> {
        self.entries.get(&id).map(|entry| &entry.renderer)
    }

    pub(super) fn id_at(&self, index: usize) -> Option<RendererId> {
        self.entries.get_index(index).map(|(id, _)| *id)
    }

    pub(super) fn iter(&self) -> impl Iterator<Item = (RendererId, &SharedRenderer)> {
        self.entries.iter().map(|(id, entry)| (*id, &entry.renderer))
    }

    pub(super) fn find<R: Renderer + ?Sized>(&self, renderer: &Rc<RefCell<R>>) -> Option<RendererId> {
        let target = Rc::as_ptr(renderer).cast::<()>();
        self.entries
            .iter()
            .find(|(_, entry)| Rc::as_ptr(&entry.renderer).cast::<()>() == target)
            .map(|(id, _)| *id)
    }

    pub(super) fn insert(
        &mut self,
        renderer: SharedRenderer,
        sender: &EventSender,
    ) -> PlotResult<RendererId> {
        let id = RendererId(self.next_id);
        let subscriptions = subscribe(id, &renderer, sender)?;
        self.next_id += 1;
        self.entries.insert(
            id,
            RendererEntry {
                renderer,
                subscriptions,
            },
        );
        Ok(id)
    }

    /// Removes `id`, returning the index it occupied.
    pub(super) fn remove(&mut self, id: RendererId) -> Option<(usize, SharedRenderer)> {
        let (index, _, entry) = self.entries.shift_remove_full(&id)?;
        unsubscribe(id, &entry);
        Some((index, entry.renderer))
    }

    pub(super) fn disconnect_all(&mut self) {
        for (id, entry) in self.entries.drain(..) {
            unsubscribe(id, &entry);
        }
    }

    /// Union of contributing renderer ranges per axis.
    ///
    /// Empty renderers are skipped, and so is each axis a renderer expresses
    /// in pixel units.
    pub(super) fn data_bounds(&self) -> (Option<(f64, f64)>, Option<(f64, f64)>) {
        let mut x: Option<(f64, f64)> = None;
        let mut y: Option<(f64, f64)> = None;

        for (id, entry) in &self.entries {
            let Ok(renderer) = entry.renderer.try_borrow() else {
                warn!(%id, "renderer busy; excluded from data range");
                continue;
            };
            if renderer.is_empty() {
                continue;
            }

            let base = renderer.base();
            if base.x_units() == Units::Axis {
                x = merge(x, base.x_range().bounds());
            }
            if base.y_units() == Units::Axis {
                y = merge(y, base.y_range().bounds());
            }
        }

        (x, y)
    }
}

fn merge(acc: Option<(f64, f64)>, bounds: (f64, f64)) -> Option<(f64, f64)> {
    if !bounds.0.is_finite() || !bounds.1.is_finite() {
        return acc;
    }
    Some(match acc {
        Some(acc) => union_bounds(acc, bounds),
        None => ordered(bounds),
    })
}

fn subscribe(
    id: RendererId,
    renderer: &SharedRenderer,
    sender: &EventSender,
) -> PlotResult<Subscriptions> {
    let mut renderer = renderer
        .try_borrow_mut()
        .map_err(|_| PlotError::InvalidData(format!("{id}: renderer is borrowed elsewhere")))?;
    let base = renderer.base_mut();

    let events = sender.clone();
    let changed = base
        .notifier_mut()
        .connect(move || events.send(GraphEvent::RendererChanged(id)));
    let events = sender.clone();
    let x_range = base
        .x_range_mut()
        .notifier_mut()
        .connect(move || events.send(GraphEvent::RendererRangeChanged(id)));
    let events = sender.clone();
    let y_range = base
        .y_range_mut()
        .notifier_mut()
        .connect(move || events.send(GraphEvent::RendererRangeChanged(id)));
    let events = sender.clone();
    let ruler = base.connect_ruler_changed(move || events.send(GraphEvent::RulerChanged(id)));

    Ok(Subscriptions {
        changed,
        x_range,
        y_range,
        ruler,
    })
}

fn unsubscribe(id: RendererId, entry: &RendererEntry) {
    let Ok(mut renderer) = entry.renderer.try_borrow_mut() else {
        warn!(%id, "renderer busy; its notifications stay connected but are ignored");
        return;
    };
    let base = renderer.base_mut();
    let subscriptions = &entry.subscriptions;
    base.notifier_mut().disconnect(subscriptions.changed);
    base.x_range_mut().notifier_mut().disconnect(subscriptions.x_range);
    base.y_range_mut().notifier_mut().disconnect(subscriptions.y_range);
    base.disconnect_ruler_changed(subscriptions.ruler);
}

impl Graph {
    /// Adds a renderer on top of the existing ones.
    ///
    /// Adding a renderer that is already part of the graph returns its id.
    /// The first ruler-capable renderer receives the ruler.
    pub fn add(&mut self, renderer: SharedRenderer) -> PlotResult<RendererId> {
        if let Some(id) = self.renderers.find(&renderer) {
            return Ok(id);
        }

        let sender = self.events.sender();
        let id = self.renderers.insert(Rc::clone(&renderer), &sender)?;

        let (kind, can_rule, has_ruler) = match renderer.try_borrow() {
            Ok(renderer) => (renderer.kind(), renderer.can_rule(), renderer.has_ruler()),
            Err(_) => ("unknown", false, false),
        };
        debug!(%id, kind, count = self.renderers.len(), "renderer added");

        if has_ruler || (can_rule && self.ruler_target().is_none()) {
            self.assign_ruler(Some(id));
        }
        self.recolor();

        sender.send(GraphEvent::MembershipChanged);
        self.process_events();
        Ok(id)
    }

    /// Removes a renderer. Unknown ids are ignored and report `false`.
    ///
    /// If the removed renderer held the ruler, the ruler moves to the nearest
    /// ruler-capable renderer before it in paint order. When none precedes
    /// it, the nearest capable renderer after it takes the ruler. With no
    /// capable renderer left, no renderer holds it.
    pub fn remove(&mut self, id: RendererId) -> bool {
        let Some((index, renderer)) = self.renderers.remove(id) else {
            trace!(%id, "remove ignored: renderer not in graph");
            return false;
        };
        debug!(%id, count = self.renderers.len(), "renderer removed");

        let had_ruler = renderer.try_borrow().is_ok_and(|renderer| renderer.has_ruler());
        if had_ruler {
            let successor = self.ruler_successor(index);
            self.assign_ruler(successor);
        }
        self.recolor();

        self.events.sender().send(GraphEvent::MembershipChanged);
        self.process_events();
        true
    }

    /// Removes by handle; see [`Graph::remove`].
    pub fn remove_renderer<R: Renderer + ?Sized>(&mut self, renderer: &Rc<RefCell<R>>) -> bool {
        match self.renderers.find(renderer) {
            Some(id) => self.remove(id),
            None => false,
        }
    }

    pub fn clear_renderers(&mut self) {
        for id in self.renderer_ids() {
            self.remove(id);
        }
    }

    #[must_use]
    pub fn contains(&self, id: RendererId) -> bool {
        self.renderers.contains(id)
    }

    #[must_use]
    pub fn renderer(&self, id: RendererId) -> Option<SharedRenderer> {
        self.renderers.get(id).cloned()
    }

    #[must_use]
    pub fn renderer_id<R: Renderer + ?Sized>(&self, renderer: &Rc<RefCell<R>>) -> Option<RendererId> {
        self.renderers.find(renderer)
    }

    /// Ids in paint order.
    #[must_use]
    pub fn renderer_ids(&self) -> Vec<RendererId> {
        self.renderers.iter().map(|(id, _)| id).collect()
    }

    #[must_use]
    pub fn renderer_count(&self) -> usize {
        self.renderers.len()
    }

    /// Reassigns palette colors in insertion order to every renderer without
    /// an explicit color.
    pub(super) fn recolor(&mut self) {
        if !self.auto_recolor {
            return;
        }

        let mut index = 0_isize;
        for (id, renderer) in self.renderers.iter() {
            let Ok(mut renderer) = renderer.try_borrow_mut() else {
                warn!(%id, "renderer busy; recolor skipped");
                continue;
            };
            if let Some(colored) = renderer.as_colored_mut() {
                if !colored.has_explicit_color() {
                    colored.assign_auto_color(self.color_map.get(index));
                    index += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::RendererSet;
    use crate::core::DataPoint;
    use crate::graph::events::EventQueue;
    use crate::renderers::{Line, SharedRenderer, Units, shared};

    fn line(points: &[(f64, f64)]) -> SharedRenderer {
        shared(Line::new().with_data(points.iter().copied().map(DataPoint::from)))
    }

    #[test]
    fn data_bounds_union_skips_empty_and_pixel_renderers() {
        let queue = EventQueue::new();
        let mut set = RendererSet::default();
        set.insert(line(&[(0.0, 1.0), (10.0, 2.0)]), &queue.sender())
            .expect("insert");
        set.insert(line(&[(5.0, -3.0), (20.0, 0.0)]), &queue.sender())
            .expect("insert");
        set.insert(line(&[]), &queue.sender()).expect("insert");

        let pixel = line(&[(-100.0, -100.0), (500.0, 500.0)]);
        pixel.borrow_mut().base_mut().set_x_units(Units::Pixel);
        set.insert(Rc::clone(&pixel), &queue.sender()).expect("insert");

        let (x, y) = set.data_bounds();
        assert_eq!(x, Some((0.0, 20.0)));
        assert_eq!(y, Some((-100.0, 500.0)));
    }

    #[test]
    fn removal_disconnects_every_subscription() {
        let queue = EventQueue::new();
        let mut set = RendererSet::default();
        let renderer = line(&[(0.0, 0.0), (1.0, 1.0)]);
        let before = renderer.borrow().base().subscriber_count();

        let id = set.insert(Rc::clone(&renderer), &queue.sender()).expect("insert");
        assert_eq!(renderer.borrow().base().subscriber_count(), before + 4);
        assert!(set.remove(id).is_some());
        assert_eq!(renderer.borrow().base().subscriber_count(), before);
        assert!(set.remove(id).is_none());
    }

    #[test]
    fn busy_renderer_cannot_be_inserted() {
        let queue = EventQueue::new();
        let mut set = RendererSet::default();
        let renderer = line(&[]);
        let _borrow = renderer.borrow_mut();
        assert!(set.insert(Rc::clone(&renderer), &queue.sender()).is_err());
        assert_eq!(set.len(), 0);
    }
}
