use crate::core::{Changeable, DataPoint};
use crate::render::{PathPrimitive, Rgba};

use super::{Colored, Labeled, Line, RenderContext, Renderer, RendererBase, ValueProbe};

/// A [`Line`] whose area down to `y = 0` is filled.
///
/// The outline is hidden by default; the fill uses `fill_color` when set and
/// the line color otherwise.
#[derive(Debug)]
pub struct Area {
    line: Line,
    fill_color: Option<Rgba>,
}

impl Area {
    #[must_use]
    pub fn new() -> Self {
        let mut line = Line::new();
        line.set_show_line(false);
        Self {
            line,
            fill_color: None,
        }
    }

    #[must_use]
    pub fn with_data(mut self, data: impl IntoIterator<Item = DataPoint>) -> Self {
        self.line.set_data(data);
        self
    }

    #[must_use]
    pub fn line(&self) -> &Line {
        &self.line
    }

    pub fn line_mut(&mut self) -> &mut Line {
        &mut self.line
    }

    #[must_use]
    pub fn fill_color(&self) -> Option<Rgba> {
        self.fill_color
    }

    pub fn set_fill_color(&mut self, fill_color: Option<Rgba>) {
        if self.fill_color != fill_color {
            self.fill_color = fill_color;
            self.line.base_mut().emit_changed();
        }
    }

    fn baseline_px(&self, context: &RenderContext<'_>) -> f64 {
        let (_, y) = context.to_pixel(
            DataPoint::new(0.0, 0.0),
            self.line.base().x_units(),
            self.line.base().y_units(),
        );
        y
    }
}

impl Default for Area {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for Area {
    fn base(&self) -> &RendererBase {
        self.line.base()
    }

    fn base_mut(&mut self) -> &mut RendererBase {
        self.line.base_mut()
    }

    fn kind(&self) -> &'static str {
        "area"
    }

    fn render(&self, context: &mut RenderContext<'_>) {
        let points = self.line.pixel_points(context);
        if let (Some(first), Some(last)) = (points.first().copied(), points.last().copied()) {
            if points.len() > 1 {
                let baseline = self.baseline_px(context);
                let mut outline = Vec::with_capacity(points.len() + 2);
                outline.push((first.0, baseline));
                outline.extend(points);
                outline.push((last.0, baseline));

                let fill = self.fill_color.unwrap_or_else(|| self.line.color());
                context.push(PathPrimitive::polygon(outline, fill));
            }
        }

        self.line.render_line_and_markers(context);
    }

    fn value_at_x(&self, x: f64) -> ValueProbe {
        self.line.value_at_x(x)
    }

    fn value_closest_to_x(&self, x: f64) -> DataPoint {
        self.line.value_closest_to_x(x)
    }

    fn can_rule(&self) -> bool {
        self.line.can_rule()
    }

    fn is_empty(&self) -> bool {
        Renderer::is_empty(&self.line)
    }

    fn as_labeled(&self) -> Option<&dyn Labeled> {
        Some(&self.line)
    }

    fn as_labeled_mut(&mut self) -> Option<&mut dyn Labeled> {
        Some(&mut self.line)
    }

    fn as_colored(&self) -> Option<&dyn Colored> {
        Some(&self.line)
    }

    fn as_colored_mut(&mut self) -> Option<&mut dyn Colored> {
        Some(&mut self.line)
    }
}

#[cfg(test)]
mod tests {
    use super::Area;
    use crate::core::{DataPoint, Transform, Viewport};
    use crate::render::{Primitive, Rgba};
    use crate::renderers::{RenderContext, Renderer};

    #[test]
    fn fill_polygon_closes_on_zero_baseline() {
        let mut area = Area::new().with_data([DataPoint::new(0.0, 1.0), DataPoint::new(2.0, 2.0)]);
        area.set_fill_color(Some(Rgba::rgba(0.0, 0.0, 1.0, 0.5)));

        let transform = Transform::new((0.0, 2.0), (0.0, 2.0), Viewport::new(100, 100));
        let mut primitives = Vec::new();
        area.render(&mut RenderContext::new(transform, &mut primitives));

        assert_eq!(primitives.len(), 1);
        let Primitive::Path(path) = &primitives[0] else {
            panic!("expected fill polygon");
        };
        assert!(path.closed);
        assert_eq!(path.points.first(), Some(&(0.0, 100.0)));
        assert_eq!(path.points.last(), Some(&(100.0, 100.0)));
        assert_eq!(path.fill_color, Some(Rgba::rgba(0.0, 0.0, 1.0, 0.5)));
    }
}
