//! Renderer contract consumed by the graph, plus the line and area renderers.
//!
//! A renderer owns its data, publishes its data extent through two observable
//! ranges and paints itself into a display list through a [`RenderContext`].
//! The graph never owns renderer data: it holds [`SharedRenderer`] handles and
//! subscribes to their notifications.

mod area;
mod line;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::{
    AxisScale, Changeable, Color, DataPoint, Notifier, Range, Signal, SubscriptionId, Transform,
};
use crate::error::PlotError;
use crate::render::{Primitive, Rgba};

pub use area::Area;
pub use line::{Line, MarkerStyle};

/// Shared, mutable handle to any renderer.
pub type SharedRenderer = Rc<RefCell<dyn Renderer>>;

/// Wraps a concrete renderer so it can be added to a graph while the caller
/// keeps typed access to it.
pub fn shared<R: Renderer + 'static>(renderer: R) -> Rc<RefCell<R>> {
    Rc::new(RefCell::new(renderer))
}

/// Coordinate space of a renderer's values along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Units {
    /// Values are data coordinates mapped through the axis transform.
    #[default]
    Axis,
    /// Values are pixel offsets from the top-left corner of the plot.
    Pixel,
}

impl Units {
    /// Maps a value along one axis to plot pixels.
    #[must_use]
    pub fn to_pixel(self, scale: AxisScale, value: f64) -> f64 {
        match self {
            Self::Axis => scale.to_pixel(value),
            Self::Pixel => value,
        }
    }

    #[must_use]
    pub fn from_pixel(self, scale: AxisScale, pixel: f64) -> f64 {
        match self {
            Self::Axis => scale.from_pixel(pixel),
            Self::Pixel => pixel,
        }
    }
}

impl FromStr for Units {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "axis" => Ok(Self::Axis),
            "pixel" | "pixels" => Ok(Self::Pixel),
            _ => Err(PlotError::UnsupportedVariant {
                kind: "units",
                value: s.to_owned(),
            }),
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Axis => f.write_str("axis"),
            Self::Pixel => f.write_str("pixel"),
        }
    }
}

/// Answer of [`Renderer::value_at_x`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueProbe {
    pub point: DataPoint,
    /// The value lies between two data points.
    pub interpolated: bool,
    /// The query is outside the data domain; `point` is only a placeholder.
    pub extrapolated: bool,
}

impl ValueProbe {
    #[must_use]
    pub fn exact(point: DataPoint) -> Self {
        Self {
            point,
            interpolated: false,
            extrapolated: false,
        }
    }

    #[must_use]
    pub fn interpolated(point: DataPoint) -> Self {
        Self {
            point,
            interpolated: true,
            extrapolated: false,
        }
    }

    #[must_use]
    pub fn extrapolated(point: DataPoint) -> Self {
        Self {
            point,
            interpolated: false,
            extrapolated: true,
        }
    }
}

/// Output sink and coordinate mapping handed to [`Renderer::render`].
pub struct RenderContext<'a> {
    transform: Transform,
    primitives: &'a mut Vec<Primitive>,
}

impl<'a> RenderContext<'a> {
    pub fn new(transform: Transform, primitives: &'a mut Vec<Primitive>) -> Self {
        Self {
            transform,
            primitives,
        }
    }

    #[must_use]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Maps a value to plot pixels honoring per-axis units.
    #[must_use]
    pub fn to_pixel(&self, point: DataPoint, x_units: Units, y_units: Units) -> (f64, f64) {
        (
            x_units.to_pixel(self.transform.x, point.x),
            y_units.to_pixel(self.transform.y, point.y),
        )
    }

    pub fn push(&mut self, primitive: impl Into<Primitive>) {
        self.primitives.push(primitive.into());
    }
}

/// State shared by every renderer: data extent, units and ruler flag.
///
/// `changed` is the renderer's generic change notification; the ranges notify
/// on their own and `ruler_changed` fires when the ruler flag flips.
pub struct RendererBase {
    x_range: Range,
    y_range: Range,
    x_units: Units,
    y_units: Units,
    has_ruler: bool,
    notifier: Notifier,
    ruler_changed: Signal,
}

impl RendererBase {
    #[must_use]
    pub fn new() -> Self {
        Self {
            x_range: Range::default(),
            y_range: Range::default(),
            x_units: Units::Axis,
            y_units: Units::Axis,
            has_ruler: false,
            notifier: Notifier::new(),
            ruler_changed: Signal::new(),
        }
    }

    #[must_use]
    pub fn x_range(&self) -> &Range {
        &self.x_range
    }

    pub fn x_range_mut(&mut self) -> &mut Range {
        &mut self.x_range
    }

    #[must_use]
    pub fn y_range(&self) -> &Range {
        &self.y_range
    }

    pub fn y_range_mut(&mut self) -> &mut Range {
        &mut self.y_range
    }

    /// Writes both ranges, each emitting at most one notification.
    pub fn update_ranges(&mut self, x: (f64, f64), y: (f64, f64)) {
        self.x_range.freeze();
        self.y_range.freeze();
        self.x_range.update(x.0, x.1);
        self.y_range.update(y.0, y.1);
        self.x_range.thaw();
        self.y_range.thaw();
    }

    #[must_use]
    pub fn x_units(&self) -> Units {
        self.x_units
    }

    pub fn set_x_units(&mut self, units: Units) {
        if self.x_units != units {
            self.x_units = units;
            self.notifier.emit_changed();
        }
    }

    #[must_use]
    pub fn y_units(&self) -> Units {
        self.y_units
    }

    pub fn set_y_units(&mut self, units: Units) {
        if self.y_units != units {
            self.y_units = units;
            self.notifier.emit_changed();
        }
    }

    /// Raw flag; [`Renderer::has_ruler`] also checks capability.
    #[must_use]
    pub fn ruler_flag(&self) -> bool {
        self.has_ruler
    }

    fn set_ruler_flag(&mut self, has_ruler: bool) {
        if self.has_ruler != has_ruler {
            self.has_ruler = has_ruler;
            self.ruler_changed.emit();
        }
    }

    pub fn connect_ruler_changed(&mut self, slot: impl FnMut() + 'static) -> SubscriptionId {
        self.ruler_changed.connect(slot)
    }

    pub fn disconnect_ruler_changed(&mut self, id: SubscriptionId) -> bool {
        self.ruler_changed.disconnect(id)
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.notifier.subscriber_count()
            + self.ruler_changed.len()
            + self.x_range.notifier().subscriber_count()
            + self.y_range.notifier().subscriber_count()
    }
}

impl Changeable for RendererBase {
    fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    fn notifier_mut(&mut self) -> &mut Notifier {
        &mut self.notifier
    }
}

impl Default for RendererBase {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RendererBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererBase")
            .field("x_range", &self.x_range)
            .field("y_range", &self.y_range)
            .field("x_units", &self.x_units)
            .field("y_units", &self.y_units)
            .field("has_ruler", &self.has_ruler)
            .finish()
    }
}

/// Drawable data series.
pub trait Renderer {
    fn base(&self) -> &RendererBase;
    fn base_mut(&mut self) -> &mut RendererBase;

    /// Short type name used in logs.
    fn kind(&self) -> &'static str;

    fn render(&self, context: &mut RenderContext<'_>);

    fn value_at_x(&self, x: f64) -> ValueProbe {
        ValueProbe::extrapolated(DataPoint::new(x, 0.0))
    }

    fn value_closest_to_x(&self, _x: f64) -> DataPoint {
        DataPoint::default()
    }

    /// Whether the ruler can probe this renderer.
    fn can_rule(&self) -> bool {
        false
    }

    /// Renderers without data do not contribute to the data range.
    fn is_empty(&self) -> bool {
        false
    }

    fn has_ruler(&self) -> bool {
        self.can_rule() && self.base().ruler_flag()
    }

    /// Ignored for renderers that cannot rule.
    fn set_has_ruler(&mut self, has_ruler: bool) {
        if self.can_rule() || !has_ruler {
            self.base_mut().set_ruler_flag(has_ruler);
        }
    }

    fn as_labeled(&self) -> Option<&dyn Labeled> {
        None
    }

    fn as_labeled_mut(&mut self) -> Option<&mut dyn Labeled> {
        None
    }

    fn as_colored(&self) -> Option<&dyn Colored> {
        None
    }

    fn as_colored_mut(&mut self) -> Option<&mut dyn Colored> {
        None
    }
}

/// Renderers with a legend label.
pub trait Labeled {
    /// Plain text label, `None` when the label is markup or unset.
    fn label(&self) -> Option<&str>;

    fn label_markup(&self) -> Option<&str>;

    fn set_label(&mut self, label: &str);

    fn set_label_markup(&mut self, markup: &str);
}

/// Renderers with a settable color.
pub trait Colored {
    fn color(&self) -> Rgba;

    /// Sets a user color; auto-recoloring leaves it alone afterwards.
    fn set_color(&mut self, color: Rgba);

    /// Palette assignment, only applied when no user color was set.
    fn assign_auto_color(&mut self, color: Rgba);

    fn has_explicit_color(&self) -> bool;

    /// Forgets the user color so the palette applies again.
    fn clear_explicit_color(&mut self);
}

/// Color storage behind [`Colored`] implementations.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorSlot {
    color: Color,
    explicit: bool,
}

impl ColorSlot {
    #[must_use]
    pub fn new(color: Rgba) -> Self {
        Self {
            color: Color::new(color),
            explicit: false,
        }
    }

    #[must_use]
    pub fn value(&self) -> Rgba {
        self.color.value()
    }

    #[must_use]
    pub fn is_explicit(&self) -> bool {
        self.explicit
    }

    /// Returns whether the stored color changed.
    pub fn set_explicit(&mut self, color: Rgba) -> bool {
        self.explicit = true;
        self.store(color)
    }

    pub fn assign_auto(&mut self, color: Rgba) -> bool {
        if self.explicit {
            return false;
        }
        self.store(color)
    }

    pub fn clear_explicit(&mut self) {
        self.explicit = false;
    }

    fn store(&mut self, color: Rgba) -> bool {
        let changed = self.color.value() != color;
        self.color.set(color);
        changed
    }
}

/// Label text that is either plain or markup.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LabelText {
    pub text: String,
    pub markup: bool,
}

impl LabelText {
    #[must_use]
    pub fn plain(&self) -> Option<&str> {
        (!self.markup).then_some(self.text.as_str())
    }

    #[must_use]
    pub fn markup(&self) -> Option<&str> {
        self.markup.then_some(self.text.as_str())
    }

    /// Returns whether anything changed.
    pub fn set(&mut self, text: &str, markup: bool) -> bool {
        if self.text == text && self.markup == markup {
            return false;
        }
        self.text = text.to_owned();
        self.markup = markup;
        true
    }
}
