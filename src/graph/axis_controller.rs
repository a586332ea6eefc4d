use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::{Range, Viewport, union_bounds, widen_bounds};
use crate::error::{PlotError, PlotResult};

use super::{Axis, Graph, GraphGuard};

/// Margin used by [`Graph::auto_axis`].
const AUTO_AXIS_MARGIN: f64 = 0.1;

/// Relative tolerance before the aspect lock corrects an axis.
const ASPECT_TOLERANCE: f64 = 1e-9;

/// How an axis reacts to renderer data changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AxisMode {
    /// The range is only changed by explicit writes.
    Fixed,
    /// The range tracks the union of renderer ranges plus the axis margin.
    #[default]
    Auto,
    /// Like `Auto`, but the range never shrinks.
    AutoGrow,
}

impl FromStr for AxisMode {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "fixed" => Ok(Self::Fixed),
            "auto" => Ok(Self::Auto),
            "autogrow" => Ok(Self::AutoGrow),
            _ => Err(PlotError::UnsupportedVariant {
                kind: "axis mode",
                value: s.to_owned(),
            }),
        }
    }
}

impl fmt::Display for AxisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed => f.write_str("fixed"),
            Self::Auto => f.write_str("auto"),
            Self::AutoGrow => f.write_str("auto-grow"),
        }
    }
}

/// Per-axis modes and margins plus the aspect lock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct AxisController {
    pub(super) x_mode: AxisMode,
    pub(super) y_mode: AxisMode,
    pub(super) x_margin: f64,
    pub(super) y_margin: f64,
    pub(super) keep_aspect: bool,
    pub(super) aspect: f64,
}

impl AxisController {
    pub(super) fn mode(&self, axis: Axis) -> AxisMode {
        match axis {
            Axis::X => self.x_mode,
            Axis::Y => self.y_mode,
        }
    }

    /// Returns whether the mode changed.
    pub(super) fn set_mode(&mut self, axis: Axis, mode: AxisMode) -> bool {
        let slot = match axis {
            Axis::X => &mut self.x_mode,
            Axis::Y => &mut self.y_mode,
        };
        let changed = *slot != mode;
        *slot = mode;
        changed
    }

    pub(super) fn margin(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x_margin,
            Axis::Y => self.y_margin,
        }
    }
}

impl Default for AxisController {
    fn default() -> Self {
        Self {
            x_mode: AxisMode::Auto,
            y_mode: AxisMode::Auto,
            x_margin: 0.0,
            y_margin: 0.05,
            keep_aspect: false,
            aspect: 1.0,
        }
    }
}

/// Target bounds of an axis in `mode` for the aggregated `data` range.
///
/// The orientation of `current` is preserved so inverted axes stay inverted.
pub(super) fn auto_bounds(
    mode: AxisMode,
    current: (f64, f64),
    data: (f64, f64),
    margin: f64,
) -> Option<(f64, f64)> {
    let fitted = match mode {
        AxisMode::Fixed => return None,
        AxisMode::Auto => widen_bounds(data, margin),
        AxisMode::AutoGrow => union_bounds(current, widen_bounds(data, margin)),
    };
    Some(oriented_like(fitted, current))
}

fn oriented_like(bounds: (f64, f64), reference: (f64, f64)) -> (f64, f64) {
    let (low, high) = if bounds.0 <= bounds.1 {
        bounds
    } else {
        (bounds.1, bounds.0)
    };
    if reference.0 > reference.1 {
        (high, low)
    } else {
        (low, high)
    }
}

/// Axis to widen, and its new bounds, so that
/// `(y_span / height) / (x_span / width)` equals `aspect`.
///
/// Only the axis that is too narrow grows, around its own center.
pub(super) fn aspect_correction(
    x: (f64, f64),
    y: (f64, f64),
    viewport: Viewport,
    aspect: f64,
) -> Option<(Axis, (f64, f64))> {
    if !viewport.is_valid() || !aspect.is_finite() || aspect <= 0.0 {
        return None;
    }

    let width = f64::from(viewport.width);
    let height = f64::from(viewport.height);
    let x_span = (x.1 - x.0).abs();
    let y_span = (y.1 - y.0).abs();
    if !x_span.is_normal() || !y_span.is_normal() {
        return None;
    }

    let x_unit = x_span / width;
    let y_unit = y_span / height;
    let ratio = y_unit / x_unit;
    if ((ratio - aspect) / aspect).abs() <= ASPECT_TOLERANCE {
        return None;
    }

    if ratio < aspect {
        let span = aspect * x_unit * height;
        Some((Axis::Y, grow_to(y, span)))
    } else {
        let span = y_unit / aspect * width;
        Some((Axis::X, grow_to(x, span)))
    }
}

fn grow_to(bounds: (f64, f64), span: f64) -> (f64, f64) {
    let center = (bounds.0 + bounds.1) / 2.0;
    let half = if bounds.0 > bounds.1 {
        -span / 2.0
    } else {
        span / 2.0
    };
    (center - half, center + half)
}

impl Graph {
    #[must_use]
    pub fn x_axis(&self) -> &Range {
        &self.x_axis
    }

    #[must_use]
    pub fn y_axis(&self) -> &Range {
        &self.y_axis
    }

    #[must_use]
    pub fn axis(&self, axis: Axis) -> &Range {
        match axis {
            Axis::X => &self.x_axis,
            Axis::Y => &self.y_axis,
        }
    }

    /// Guarded write access. Writes through the guard count as user writes:
    /// the axis switches to [`AxisMode::Fixed`] when the guard drops.
    pub fn x_axis_mut(&mut self) -> GraphGuard<'_, Range> {
        GraphGuard::new(self, |graph| &graph.x_axis, |graph| &mut graph.x_axis)
    }

    pub fn y_axis_mut(&mut self) -> GraphGuard<'_, Range> {
        GraphGuard::new(self, |graph| &graph.y_axis, |graph| &mut graph.y_axis)
    }

    #[must_use]
    pub fn axis_mode(&self, axis: Axis) -> AxisMode {
        self.axes.mode(axis)
    }

    #[must_use]
    pub fn x_axis_mode(&self) -> AxisMode {
        self.axes.x_mode
    }

    #[must_use]
    pub fn y_axis_mode(&self) -> AxisMode {
        self.axes.y_mode
    }

    pub fn set_axis_mode(&mut self, axis: Axis, mode: AxisMode) {
        if self.axes.set_mode(axis, mode) {
            debug!(%axis, %mode, "axis mode changed");
            if mode != AxisMode::Fixed {
                self.autorange_pending = true;
            }
        }
        self.process_events();
    }

    pub fn set_x_axis_mode(&mut self, mode: AxisMode) {
        self.set_axis_mode(Axis::X, mode);
    }

    pub fn set_y_axis_mode(&mut self, mode: AxisMode) {
        self.set_axis_mode(Axis::Y, mode);
    }

    /// Relative `(x, y)` margins applied by the auto modes.
    #[must_use]
    pub fn auto_margin(&self) -> (f64, f64) {
        (self.axes.x_margin, self.axes.y_margin)
    }

    pub fn set_auto_margin(&mut self, x: f64, y: f64) -> PlotResult<()> {
        for margin in [x, y] {
            if !margin.is_finite() || margin < 0.0 {
                return Err(PlotError::InvalidData(format!(
                    "auto margin must be finite and >= 0, got {margin}"
                )));
            }
        }
        if (self.axes.x_margin, self.axes.y_margin) != (x, y) {
            self.axes.x_margin = x;
            self.axes.y_margin = y;
            self.autorange_pending = true;
        }
        self.process_events();
        Ok(())
    }

    #[must_use]
    pub fn keep_aspect(&self) -> bool {
        self.axes.keep_aspect
    }

    pub fn set_keep_aspect(&mut self, keep_aspect: bool) {
        if self.axes.keep_aspect != keep_aspect {
            self.axes.keep_aspect = keep_aspect;
            self.enforce_aspect();
        }
        self.process_events();
    }

    /// Target ratio of y units per pixel to x units per pixel.
    #[must_use]
    pub fn aspect(&self) -> f64 {
        self.axes.aspect
    }

    pub fn set_aspect(&mut self, aspect: f64) -> PlotResult<()> {
        if !aspect.is_finite() || aspect <= 0.0 {
            return Err(PlotError::InvalidData(format!(
                "aspect must be finite and > 0, got {aspect}"
            )));
        }
        if self.axes.aspect != aspect {
            self.axes.aspect = aspect;
            self.enforce_aspect();
        }
        self.process_events();
        Ok(())
    }

    /// Union of the x ranges of all non-empty axis-unit renderers, `[0, 0]`
    /// when there are none.
    #[must_use]
    pub fn data_x_range(&self) -> (f64, f64) {
        self.renderers.data_bounds().0.unwrap_or((0.0, 0.0))
    }

    #[must_use]
    pub fn data_y_range(&self) -> (f64, f64) {
        self.renderers.data_bounds().1.unwrap_or((0.0, 0.0))
    }

    /// Fits both axes to the data widened by 10 % and returns them to `Auto`.
    pub fn auto_axis(&mut self) {
        self.axes.x_mode = AxisMode::Auto;
        self.axes.y_mode = AxisMode::Auto;

        let (x, y) = self.renderers.data_bounds();
        if let Some(x) = x {
            let target = oriented_like(widen_bounds(x, AUTO_AXIS_MARGIN), self.x_axis.bounds());
            self.write_axis_internal(Axis::X, target);
        }
        if let Some(y) = y {
            let target = oriented_like(widen_bounds(y, AUTO_AXIS_MARGIN), self.y_axis.bounds());
            self.write_axis_internal(Axis::Y, target);
        }
        debug!(x = ?self.x_axis, y = ?self.y_axis, "auto axis applied");

        self.enforce_aspect();
        self.process_events();
    }

    pub(super) fn axis_range_mut(&mut self, axis: Axis) -> &mut Range {
        match axis {
            Axis::X => &mut self.x_axis,
            Axis::Y => &mut self.y_axis,
        }
    }

    /// Writes an axis without downgrading its mode.
    pub(super) fn write_axis_internal(&mut self, axis: Axis, bounds: (f64, f64)) {
        let events = self.events.clone();
        let range = self.axis_range_mut(axis);
        events.internal(|| range.update(bounds.0, bounds.1));
    }

    pub(super) fn on_external_axis_write(&mut self, axis: Axis) {
        if self.axes.set_mode(axis, AxisMode::Fixed) {
            debug!(%axis, "axis written externally; mode set to fixed");
        }
        self.enforce_aspect();
    }

    /// Applies the auto modes to the current aggregated data range.
    ///
    /// Without any contributing renderer the axes are left untouched.
    pub(super) fn recompute_auto_axes(&mut self) {
        let (x_data, y_data) = self.renderers.data_bounds();

        for (axis, data) in [(Axis::X, x_data), (Axis::Y, y_data)] {
            let Some(data) = data else {
                continue;
            };
            let current = self.axis(axis).bounds();
            let mode = self.axes.mode(axis);
            if let Some(target) = auto_bounds(mode, current, data, self.axes.margin(axis)) {
                if target != current {
                    trace!(%axis, %mode, ?target, "auto axis recomputed");
                    self.write_axis_internal(axis, target);
                }
            }
        }

        self.enforce_aspect();
    }

    /// Widens the narrow axis when the aspect lock is on.
    pub(super) fn enforce_aspect(&mut self) {
        if !self.axes.keep_aspect {
            return;
        }
        let correction = aspect_correction(
            self.x_axis.bounds(),
            self.y_axis.bounds(),
            self.dimensions.viewport(),
            self.axes.aspect,
        );
        if let Some((axis, bounds)) = correction {
            trace!(%axis, ?bounds, "aspect lock widened axis");
            self.write_axis_internal(axis, bounds);
        }
    }
}
