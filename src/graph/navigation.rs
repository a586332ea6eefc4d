use tracing::trace;

use crate::core::{Changeable, DataPoint, Rectangle, Transform};
use crate::error::{PlotError, PlotResult};

use super::Graph;

fn ensure_finite(name: &str, values: &[f64]) -> PlotResult<()> {
    if values.iter().all(|value| value.is_finite()) {
        Ok(())
    } else {
        Err(PlotError::InvalidData(format!("{name} must be finite")))
    }
}

impl Graph {
    /// Axis/pixel mapping for the current axes and dimensions.
    #[must_use]
    pub fn transform(&self) -> Transform {
        Transform::new(
            self.x_axis.bounds(),
            self.y_axis.bounds(),
            self.dimensions.viewport(),
        )
    }

    #[must_use]
    pub fn axis_to_pixel(&self, point: DataPoint) -> DataPoint {
        self.transform().axis_to_pixel(point)
    }

    #[must_use]
    pub fn pixel_to_axis(&self, pixel: DataPoint) -> DataPoint {
        self.transform().pixel_to_axis(pixel)
    }

    /// Converts a pixel distance into an axis distance (y grows upwards).
    #[must_use]
    pub fn scale_from_pixel(&self, delta: DataPoint) -> DataPoint {
        self.transform().scale_from_pixel(delta)
    }

    /// Rescales both axes around `anchor` (axis coordinates).
    ///
    /// A factor above one zooms in. A factor that is not positive leaves its
    /// axis alone. Both axes change under one freeze so a single redraw
    /// follows.
    pub fn zoom_at(&mut self, anchor: DataPoint, factor_x: f64, factor_y: f64) -> PlotResult<()> {
        ensure_finite("zoom anchor and factors", &[anchor.x, anchor.y, factor_x, factor_y])?;

        let zoom = |bounds: (f64, f64), center: f64, factor: f64| {
            (
                center - (center - bounds.0) / factor,
                center + (bounds.1 - center) / factor,
            )
        };

        self.x_axis.freeze();
        self.y_axis.freeze();
        if factor_x > 0.0 {
            let (min, max) = zoom(self.x_axis.bounds(), anchor.x, factor_x);
            self.x_axis.update(min, max);
        }
        if factor_y > 0.0 {
            let (min, max) = zoom(self.y_axis.bounds(), anchor.y, factor_y);
            self.y_axis.update(min, max);
        }
        self.x_axis.thaw();
        self.y_axis.thaw();

        trace!(?anchor, factor_x, factor_y, "zoomed");
        self.process_events();
        Ok(())
    }

    /// [`Graph::zoom_at`] anchored at a pixel position.
    pub fn zoom_at_pixel(&mut self, pixel: DataPoint, factor_x: f64, factor_y: f64) -> PlotResult<()> {
        let anchor = self.pixel_to_axis(pixel);
        self.zoom_at(anchor, factor_x, factor_y)
    }

    /// Shifts both axes by an axis-space `delta`.
    pub fn move_by(&mut self, delta: DataPoint) -> PlotResult<()> {
        ensure_finite("move delta", &[delta.x, delta.y])?;

        self.x_axis.freeze();
        self.y_axis.freeze();
        self.x_axis.shift(delta.x);
        self.y_axis.shift(delta.y);
        self.x_axis.thaw();
        self.y_axis.thaw();

        trace!(?delta, "moved");
        self.process_events();
        Ok(())
    }

    /// Drags the content by a pixel `delta`: the point under the cursor
    /// follows the cursor.
    pub fn pan_by_pixels(&mut self, delta: DataPoint) -> PlotResult<()> {
        ensure_finite("pan delta", &[delta.x, delta.y])?;
        let axis_delta = self.scale_from_pixel(delta);
        self.move_by(DataPoint::new(-axis_delta.x, -axis_delta.y))
    }

    /// Shows the axis-space rectangle `rect`: x spans `[x, x + width]` and
    /// y spans `[y, y + height]`.
    pub fn look_at(&mut self, rect: &Rectangle) -> PlotResult<()> {
        ensure_finite(
            "look-at rectangle",
            &[rect.x(), rect.y(), rect.width(), rect.height()],
        )?;
        self.update_axis(
            (rect.x(), rect.x() + rect.width()),
            (rect.y(), rect.y() + rect.height()),
        )
    }

    /// Writes both axes as one user change; both switch to fixed mode.
    pub fn update_axis(&mut self, x: (f64, f64), y: (f64, f64)) -> PlotResult<()> {
        ensure_finite("axis bounds", &[x.0, x.1, y.0, y.1])?;

        self.x_axis.freeze();
        self.y_axis.freeze();
        self.x_axis.update(x.0, x.1);
        self.y_axis.update(y.0, y.1);
        self.x_axis.thaw();
        self.y_axis.thaw();

        self.process_events();
        Ok(())
    }
}
