use std::f64::consts::FRAC_PI_3;
use std::fmt;
use std::str::FromStr;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::core::{Changeable, DataPoint};
use crate::error::{PlotError, PlotResult};
use crate::render::{CirclePrimitive, LinePrimitive, PathPrimitive, Rgba};

use super::{
    ColorSlot, Colored, LabelText, Labeled, RenderContext, Renderer, RendererBase, ValueProbe,
};

/// Marker drawn at every data point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MarkerStyle {
    #[default]
    None,
    Circle,
    Square,
    Triangle,
    Cross,
    FilledCircle,
    FilledSquare,
    FilledTriangle,
}

impl MarkerStyle {
    pub const ALL: [MarkerStyle; 8] = [
        Self::None,
        Self::Circle,
        Self::Square,
        Self::Triangle,
        Self::Cross,
        Self::FilledCircle,
        Self::FilledSquare,
        Self::FilledTriangle,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Circle => "circle",
            Self::Square => "square",
            Self::Triangle => "triangle",
            Self::Cross => "cross",
            Self::FilledCircle => "filled-circle",
            Self::FilledSquare => "filled-square",
            Self::FilledTriangle => "filled-triangle",
        }
    }

    #[must_use]
    pub const fn is_filled(self) -> bool {
        matches!(
            self,
            Self::FilledCircle | Self::FilledSquare | Self::FilledTriangle
        )
    }
}

impl FromStr for MarkerStyle {
    type Err = PlotError;

    /// Accepts the names in any case, with `-`, `_` or nothing between words.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|ch| !matches!(ch, '-' | '_' | ' '))
            .map(|ch| ch.to_ascii_lowercase())
            .collect();

        Self::ALL
            .into_iter()
            .find(|style| style.name().replace('-', "") == normalized)
            .ok_or_else(|| PlotError::UnsupportedVariant {
                kind: "marker style",
                value: s.to_owned(),
            })
    }
}

impl fmt::Display for MarkerStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Polyline through the data points, with optional markers.
///
/// Data appended out of x order is kept as given for drawing, but a sorted
/// copy is maintained for lookups and the renderer stops accepting the ruler.
#[derive(Debug)]
pub struct Line {
    base: RendererBase,
    data: Vec<DataPoint>,
    sorted: Option<Vec<DataPoint>>,
    color: ColorSlot,
    label: LabelText,
    line_width: f64,
    show_line: bool,
    marker_style: MarkerStyle,
    marker_size: f64,
}

impl Line {
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: RendererBase::new(),
            data: Vec::new(),
            sorted: None,
            color: ColorSlot::new(Rgba::rgb(0.0, 0.0, 0.0)),
            label: LabelText::default(),
            line_width: 1.0,
            show_line: true,
            marker_style: MarkerStyle::None,
            marker_size: 5.0,
        }
    }

    #[must_use]
    pub fn with_data(mut self, data: impl IntoIterator<Item = DataPoint>) -> Self {
        self.set_data(data);
        self
    }

    #[must_use]
    pub fn with_label(mut self, label: &str) -> Self {
        self.set_label(label);
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: Rgba) -> Self {
        self.set_color(color);
        self
    }

    #[must_use]
    pub fn data(&self) -> &[DataPoint] {
        &self.data
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Point by index; negative indices count from the end.
    #[must_use]
    pub fn point(&self, index: isize) -> Option<DataPoint> {
        let index = if index < 0 {
            self.data.len().checked_sub(index.unsigned_abs())?
        } else {
            index as usize
        };
        self.data.get(index).copied()
    }

    /// True while the data is ordered by x.
    #[must_use]
    pub fn is_chronological(&self) -> bool {
        self.sorted.is_none()
    }

    pub fn set_data(&mut self, data: impl IntoIterator<Item = DataPoint>) {
        self.data = data.into_iter().collect();
        self.sorted = if self.data.windows(2).any(|pair| pair[0].x > pair[1].x) {
            Some(sorted_by_x(&self.data))
        } else {
            None
        };
        self.refresh_ranges();
        self.base.emit_changed();
    }

    pub fn clear(&mut self) {
        self.set_data(std::iter::empty());
    }

    pub fn append(&mut self, point: DataPoint) {
        let out_of_order = self.data.last().is_some_and(|last| last.x > point.x);
        self.data.push(point);

        if let Some(sorted) = &mut self.sorted {
            let index = sorted.partition_point(|existing| existing.x <= point.x);
            sorted.insert(index, point);
        } else if out_of_order {
            self.sorted = Some(sorted_by_x(&self.data));
        }

        if self.data.len() == 1 {
            self.base
                .update_ranges((point.x, point.x), (point.y, point.y));
        } else {
            let (x_min, x_max) = self.base.x_range().bounds();
            let (y_min, y_max) = self.base.y_range().bounds();
            self.base.update_ranges(
                (x_min.min(point.x), x_max.max(point.x)),
                (y_min.min(point.y), y_max.max(point.y)),
            );
        }
        self.base.emit_changed();
    }

    #[must_use]
    pub fn line_width(&self) -> f64 {
        self.line_width
    }

    pub fn set_line_width(&mut self, line_width: f64) -> PlotResult<()> {
        if !line_width.is_finite() || line_width <= 0.0 {
            return Err(PlotError::InvalidData(
                "line width must be finite and > 0".to_owned(),
            ));
        }
        if self.line_width != line_width {
            self.line_width = line_width;
            self.base.emit_changed();
        }
        Ok(())
    }

    #[must_use]
    pub fn show_line(&self) -> bool {
        self.show_line
    }

    pub fn set_show_line(&mut self, show_line: bool) {
        if self.show_line != show_line {
            self.show_line = show_line;
            self.base.emit_changed();
        }
    }

    #[must_use]
    pub fn marker_style(&self) -> MarkerStyle {
        self.marker_style
    }

    pub fn set_marker_style(&mut self, marker_style: MarkerStyle) {
        if self.marker_style != marker_style {
            self.marker_style = marker_style;
            self.base.emit_changed();
        }
    }

    #[must_use]
    pub fn marker_size(&self) -> f64 {
        self.marker_size
    }

    pub fn set_marker_size(&mut self, marker_size: f64) -> PlotResult<()> {
        if !marker_size.is_finite() || marker_size < 0.0 {
            return Err(PlotError::InvalidData(
                "marker size must be finite and >= 0".to_owned(),
            ));
        }
        if self.marker_size != marker_size {
            self.marker_size = marker_size;
            self.base.emit_changed();
        }
        Ok(())
    }

    /// Pixel positions of the data, in data order.
    pub(super) fn pixel_points(&self, context: &RenderContext<'_>) -> Vec<(f64, f64)> {
        let (x_units, y_units) = (self.base.x_units(), self.base.y_units());
        self.data
            .iter()
            .map(|point| context.to_pixel(*point, x_units, y_units))
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .collect()
    }

    pub(super) fn render_line_and_markers(&self, context: &mut RenderContext<'_>) {
        let points = self.pixel_points(context);
        let color = self.color.value();

        if self.show_line && points.len() > 1 {
            context.push(PathPrimitive::polyline(
                points.clone(),
                self.line_width,
                color,
            ));
        }

        if self.marker_style != MarkerStyle::None && self.marker_size > 0.0 {
            for (x, y) in points {
                self.render_marker(context, x, y, color);
            }
        }
    }

    fn render_marker(&self, context: &mut RenderContext<'_>, x: f64, y: f64, color: Rgba) {
        let size = (self.marker_size - self.line_width).max(1.0);
        let half = size / 2.0;
        let fill = self.marker_style.is_filled().then_some(color);

        match self.marker_style {
            MarkerStyle::None => {}
            MarkerStyle::Circle | MarkerStyle::FilledCircle => {
                let circle = CirclePrimitive::outlined(x, y, half, self.line_width, color);
                context.push(CirclePrimitive {
                    fill_color: fill,
                    ..circle
                });
            }
            MarkerStyle::Square | MarkerStyle::FilledSquare => {
                let corners = vec![
                    (x - half, y - half),
                    (x + half, y - half),
                    (x + half, y + half),
                    (x - half, y + half),
                ];
                context.push(closed_path(corners, fill, self.line_width, color));
            }
            MarkerStyle::Triangle | MarkerStyle::FilledTriangle => {
                let dx = half * FRAC_PI_3.sin();
                let dy = half * FRAC_PI_3.cos();
                let corners = vec![(x, y - half), (x + dx, y + dy), (x - dx, y + dy)];
                context.push(closed_path(corners, fill, self.line_width, color));
            }
            MarkerStyle::Cross => {
                let half = self.marker_size / 2.0;
                context.push(LinePrimitive::new(
                    x - half,
                    y - half,
                    x + half,
                    y + half,
                    self.line_width,
                    color,
                ));
                context.push(LinePrimitive::new(
                    x + half,
                    y - half,
                    x - half,
                    y + half,
                    self.line_width,
                    color,
                ));
            }
        }
    }

    fn lookup(&self) -> &[DataPoint] {
        self.sorted.as_deref().unwrap_or(&self.data)
    }

    fn refresh_ranges(&mut self) {
        let mut points = self.data.iter();
        let Some(first) = points.next() else {
            self.base.update_ranges((0.0, 0.0), (0.0, 0.0));
            return;
        };

        let (mut x, mut y) = ((first.x, first.x), (first.y, first.y));
        for point in points {
            x = (x.0.min(point.x), x.1.max(point.x));
            y = (y.0.min(point.y), y.1.max(point.y));
        }
        self.base.update_ranges(x, y);
    }
}

fn sorted_by_x(data: &[DataPoint]) -> Vec<DataPoint> {
    let mut sorted = data.to_vec();
    sorted.sort_by_key(|point| OrderedFloat(point.x));
    sorted
}

fn closed_path(
    corners: Vec<(f64, f64)>,
    fill: Option<Rgba>,
    stroke_width: f64,
    color: Rgba,
) -> PathPrimitive {
    let mut path = PathPrimitive::polyline(corners, stroke_width, color);
    path.closed = true;
    path.fill_color = fill;
    path
}

impl Default for Line {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for Line {
    fn base(&self) -> &RendererBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut RendererBase {
        &mut self.base
    }

    fn kind(&self) -> &'static str {
        "line"
    }

    fn render(&self, context: &mut RenderContext<'_>) {
        self.render_line_and_markers(context);
    }

    fn value_at_x(&self, x: f64) -> ValueProbe {
        let data = self.lookup();
        let (Some(first), Some(last)) = (data.first(), data.last()) else {
            return ValueProbe::extrapolated(DataPoint::new(0.0, 0.0));
        };

        let index = data.partition_point(|point| point.x < x);
        if let Some(hit) = data.get(index).filter(|point| point.x == x) {
            return ValueProbe::exact(*hit);
        }
        if index == 0 {
            return ValueProbe::extrapolated(DataPoint::new(x, first.y));
        }
        if index == data.len() {
            return ValueProbe::extrapolated(DataPoint::new(x, last.y));
        }

        let before = data[index - 1];
        let after = data[index];
        let factor = if after.x == before.x {
            1.0
        } else {
            (after.x - x) / (after.x - before.x)
        };
        ValueProbe::interpolated(DataPoint::new(
            x,
            before.y * factor + after.y * (1.0 - factor),
        ))
    }

    fn value_closest_to_x(&self, x: f64) -> DataPoint {
        let data = self.lookup();
        let (Some(first), Some(last)) = (data.first(), data.last()) else {
            return DataPoint::default();
        };

        let index = data.partition_point(|point| point.x < x);
        if index == 0 {
            return *first;
        }
        if index == data.len() {
            return *last;
        }
        if data[index].x == x {
            return data[index];
        }

        [data[index - 1], data[index]]
            .into_iter()
            .min_by_key(|point| OrderedFloat((point.x - x).abs()))
            .unwrap_or(*last)
    }

    fn can_rule(&self) -> bool {
        self.is_chronological()
    }

    fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn as_labeled(&self) -> Option<&dyn Labeled> {
        Some(self)
    }

    fn as_labeled_mut(&mut self) -> Option<&mut dyn Labeled> {
        Some(self)
    }

    fn as_colored(&self) -> Option<&dyn Colored> {
        Some(self)
    }

    fn as_colored_mut(&mut self) -> Option<&mut dyn Colored> {
        Some(self)
    }
}

impl Labeled for Line {
    fn label(&self) -> Option<&str> {
        self.label.plain()
    }

    fn label_markup(&self) -> Option<&str> {
        self.label.markup()
    }

    fn set_label(&mut self, label: &str) {
        if self.label.set(label, false) {
            self.base.emit_changed();
        }
    }

    fn set_label_markup(&mut self, markup: &str) {
        if self.label.set(markup, true) {
            self.base.emit_changed();
        }
    }
}

impl Colored for Line {
    fn color(&self) -> Rgba {
        self.color.value()
    }

    fn set_color(&mut self, color: Rgba) {
        if self.color.set_explicit(color) {
            self.base.emit_changed();
        }
    }

    fn assign_auto_color(&mut self, color: Rgba) {
        if self.color.assign_auto(color) {
            self.base.emit_changed();
        }
    }

    fn has_explicit_color(&self) -> bool {
        self.color.is_explicit()
    }

    fn clear_explicit_color(&mut self) {
        self.color.clear_explicit();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;
    use std::str::FromStr;

    use approx::assert_relative_eq;

    use super::{Line, MarkerStyle};
    use crate::core::{Changeable, DataPoint};
    use crate::renderers::Renderer;

    fn points(raw: &[(f64, f64)]) -> Vec<DataPoint> {
        raw.iter().map(|(x, y)| DataPoint::new(*x, *y)).collect()
    }

    #[test]
    fn value_at_x_interpolates_between_points() {
        let line = Line::new().with_data(points(&[(0.0, 0.0), (2.0, 4.0)]));

        let probe = line.value_at_x(0.5);
        assert!(probe.interpolated);
        assert!(!probe.extrapolated);
        assert_relative_eq!(probe.point.y, 1.0);

        let exact = line.value_at_x(2.0);
        assert!(!exact.interpolated && !exact.extrapolated);
        assert_relative_eq!(exact.point.y, 4.0);
    }

    #[test]
    fn value_outside_data_is_extrapolated() {
        let line = Line::new().with_data(points(&[(0.0, 1.0), (1.0, 3.0)]));
        let probe = line.value_at_x(5.0);
        assert!(probe.extrapolated);
        assert_relative_eq!(probe.point.y, 3.0);

        assert!(Line::new().value_at_x(0.0).extrapolated);
    }

    #[test]
    fn closest_value_snaps_to_nearest_neighbor() {
        let line = Line::new().with_data(points(&[(0.0, 1.0), (1.0, 3.0), (4.0, 5.0)]));
        assert_eq!(line.value_closest_to_x(0.4), DataPoint::new(0.0, 1.0));
        assert_eq!(line.value_closest_to_x(3.0), DataPoint::new(4.0, 5.0));
        assert_eq!(line.value_closest_to_x(-9.0), DataPoint::new(0.0, 1.0));
        assert_eq!(line.value_closest_to_x(9.0), DataPoint::new(4.0, 5.0));
    }

    #[test]
    fn out_of_order_append_disables_ruler() {
        let mut line = Line::new().with_data(points(&[(0.0, 0.0), (2.0, 2.0)]));
        assert!(line.can_rule());

        line.append(DataPoint::new(1.0, 7.0));
        assert!(!line.can_rule());
        assert_eq!(line.base().x_range().bounds(), (0.0, 2.0));
        assert_eq!(line.base().y_range().bounds(), (0.0, 7.0));
        assert_relative_eq!(line.value_at_x(1.0).point.y, 7.0);
    }

    #[test]
    fn setting_data_notifies_once_per_range() {
        let mut line = Line::new();
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        line.base_mut()
            .x_range_mut()
            .connect_changed(move || counter.set(counter.get() + 1));

        line.set_data(points(&[(3.0, 0.0), (5.0, 1.0), (4.0, 2.0)]));
        assert_eq!(hits.get(), 1);
        assert_eq!(line.point(-1), Some(DataPoint::new(4.0, 2.0)));
        assert_eq!(line.point(-4), None);
    }

    #[test]
    fn marker_names_parse_loosely_and_reject_unknowns() {
        assert_eq!(
            MarkerStyle::from_str("Filled_Triangle").expect("known"),
            MarkerStyle::FilledTriangle
        );
        assert_eq!(
            MarkerStyle::from_str("filledcircle").expect("known"),
            MarkerStyle::FilledCircle
        );
        assert!(MarkerStyle::from_str("diamond").is_err());
    }
}
