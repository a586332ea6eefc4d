//! Interactive 2D plot compositor.
//!
//! [`Graph`] owns the visible axis window, the tick generators, the plot
//! dimensions and an ordered set of renderers. It draws through a host
//! supplied [`SurfaceProvider`]: data layers go to a double buffer, ruler and
//! legend chrome to a separate overlay surface so that cursor movement only
//! recomposes the overlay.
//!
//! Observables never call back into the graph directly. Their slots push
//! [`events::GraphEvent`]s into a queue that the graph drains at its API
//! boundaries (every mutating call, [`Graph::draw`] and
//! [`Graph::process_events`]).

mod axis_controller;
mod compositor;
mod dispatch;
mod events;
mod frame_builder;
mod guard;
mod invalidation;
mod labels;
mod navigation;
mod renderer_set;
mod ruler;
mod settings;

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{
    Changeable, ColorMap, DataPoint, Range, Rectangle, Signal, SubscriptionId, Ticks,
};
use crate::render::SurfaceProvider;

use self::axis_controller::AxisController;
use self::compositor::Compositor;
use self::events::{EventQueue, GraphEvent};
use self::renderer_set::RendererSet;

pub use self::axis_controller::AxisMode;
pub use self::compositor::CompositorStats;
pub use self::guard::GraphGuard;
pub use self::invalidation::InvalidationLevel;
pub use self::labels::LabelChip;
pub use self::renderer_set::RendererId;
pub use self::ruler::{RulerHit, RulerReadout};
pub use self::settings::{Appearance, GraphSettings};

/// One of the two plot axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => f.write_str("x"),
            Self::Y => f.write_str("y"),
        }
    }
}

/// Plot compositor facade consumed by widget hosts and exporters.
pub struct Graph {
    x_axis: Range,
    y_axis: Range,
    x_ticks: Ticks,
    y_ticks: Ticks,
    dimensions: Rectangle,
    axes: AxisController,
    renderers: RendererSet,
    appearance: Appearance,
    color_map: ColorMap,
    auto_recolor: bool,
    /// Ruler position in plot pixels.
    ruler_position: Option<DataPoint>,
    compositor: Compositor,
    provider: Box<dyn SurfaceProvider>,
    events: EventQueue,
    redraw_requested: Signal,
    autorange_pending: bool,
}

impl Graph {
    /// Creates a graph with both axes at `[-1, 1]` in `Auto` mode.
    pub fn new(provider: impl SurfaceProvider + 'static) -> Self {
        Self::with_axes(provider, (-1.0, 1.0), (-1.0, 1.0))
    }

    pub fn with_axes(
        provider: impl SurfaceProvider + 'static,
        x_axis: (f64, f64),
        y_axis: (f64, f64),
    ) -> Self {
        let events = EventQueue::new();

        let mut x_axis = Range::new(x_axis.0, x_axis.1);
        let sender = events.sender();
        x_axis.connect_changed(move || sender.send_axis_changed(Axis::X));

        let mut y_axis = Range::new(y_axis.0, y_axis.1);
        let sender = events.sender();
        y_axis.connect_changed(move || sender.send_axis_changed(Axis::Y));

        let mut x_ticks = Ticks::new();
        let sender = events.sender();
        x_ticks.connect_changed(move || sender.send(GraphEvent::TicksChanged));

        let mut y_ticks = Ticks::new();
        let sender = events.sender();
        y_ticks.connect_changed(move || sender.send(GraphEvent::TicksChanged));

        let mut dimensions = Rectangle::default();
        let sender = events.sender();
        dimensions.connect_moved(move || sender.send(GraphEvent::DimensionsMoved));
        let sender = events.sender();
        dimensions.connect_resized(move || sender.send(GraphEvent::DimensionsResized));

        debug!(?x_axis, ?y_axis, "graph created");

        Self {
            x_axis,
            y_axis,
            x_ticks,
            y_ticks,
            dimensions,
            axes: AxisController::default(),
            renderers: RendererSet::default(),
            appearance: Appearance::default(),
            color_map: ColorMap::default(),
            auto_recolor: true,
            ruler_position: None,
            compositor: Compositor::default(),
            provider: Box::new(provider),
            events,
            redraw_requested: Signal::new(),
            autorange_pending: false,
        }
    }

    /// Plot area in host coordinates.
    #[must_use]
    pub fn dimensions(&self) -> &Rectangle {
        &self.dimensions
    }

    /// Guarded mutable access; queued changes are applied when the guard drops.
    pub fn dimensions_mut(&mut self) -> GraphGuard<'_, Rectangle> {
        GraphGuard::new(self, |graph| &graph.dimensions, |graph| &mut graph.dimensions)
    }

    #[must_use]
    pub fn x_ticks(&self) -> &Ticks {
        &self.x_ticks
    }

    pub fn x_ticks_mut(&mut self) -> GraphGuard<'_, Ticks> {
        GraphGuard::new(self, |graph| &graph.x_ticks, |graph| &mut graph.x_ticks)
    }

    #[must_use]
    pub fn y_ticks(&self) -> &Ticks {
        &self.y_ticks
    }

    pub fn y_ticks_mut(&mut self) -> GraphGuard<'_, Ticks> {
        GraphGuard::new(self, |graph| &graph.y_ticks, |graph| &mut graph.y_ticks)
    }

    #[must_use]
    pub fn appearance(&self) -> &Appearance {
        &self.appearance
    }

    pub fn set_appearance(&mut self, appearance: Appearance) {
        if self.appearance == appearance {
            return;
        }
        let ruler_hidden = self.appearance.show_ruler && !appearance.show_ruler;
        self.appearance = appearance;
        if ruler_hidden {
            self.ruler_position = None;
        }
        self.invalidate(InvalidationLevel::Full);
    }

    /// Edits a copy of the appearance and applies it if anything changed.
    pub fn update_appearance(&mut self, edit: impl FnOnce(&mut Appearance)) {
        let mut appearance = self.appearance;
        edit(&mut appearance);
        self.set_appearance(appearance);
    }

    #[must_use]
    pub fn color_map(&self) -> &ColorMap {
        &self.color_map
    }

    pub fn set_color_map(&mut self, color_map: ColorMap) {
        self.color_map = color_map;
        self.recolor();
        self.process_events();
    }

    #[must_use]
    pub fn auto_recolor(&self) -> bool {
        self.auto_recolor
    }

    pub fn set_auto_recolor(&mut self, auto_recolor: bool) {
        if self.auto_recolor != auto_recolor {
            self.auto_recolor = auto_recolor;
            self.recolor();
            self.process_events();
        }
    }

    pub fn connect_redraw_requested(&mut self, slot: impl FnMut() + 'static) -> SubscriptionId {
        self.redraw_requested.connect(slot)
    }

    pub fn disconnect_redraw_requested(&mut self, id: SubscriptionId) -> bool {
        self.redraw_requested.disconnect(id)
    }

    /// Installs a hook invoked when the event queue goes from empty to
    /// non-empty, so hosts can schedule [`Graph::process_events`].
    pub fn set_wake_handler(&mut self, wake: Option<Box<dyn FnMut()>>) {
        self.events.set_wake(wake);
    }

    #[must_use]
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    /// Releases every drawing surface. Safe to call repeatedly; surfaces are
    /// recreated lazily by the next draw.
    pub fn dispose(&mut self) {
        self.compositor.release();
    }
}

impl Drop for Graph {
    fn drop(&mut self) {
        self.compositor.release();
        self.renderers.disconnect_all();
    }
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("x_axis", &self.x_axis)
            .field("y_axis", &self.y_axis)
            .field("dimensions", &self.dimensions)
            .field("axes", &self.axes)
            .field("renderers", &self.renderers.len())
            .field("ruler_position", &self.ruler_position)
            .field("compositor", &self.compositor)
            .finish()
    }
}
