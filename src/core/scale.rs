use super::range::DEGENERATE_SPAN;
use super::types::{DataPoint, Viewport};

/// Linear mapping between one axis range and a pixel extent.
///
/// Never fails: a degenerate axis span is treated as one unit and a zero
/// pixel extent as one pixel, so callers can convert at any time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisScale {
    min: f64,
    max: f64,
    pixels: f64,
    flipped: bool,
}

impl AxisScale {
    #[must_use]
    pub fn new(bounds: (f64, f64), pixels: f64) -> Self {
        Self {
            min: bounds.0,
            max: bounds.1,
            pixels,
            flipped: false,
        }
    }

    /// Maps `max` to pixel zero, as screen Y grows downwards.
    #[must_use]
    pub fn flipped(mut self) -> Self {
        self.flipped = true;
        self
    }

    #[must_use]
    pub fn bounds(self) -> (f64, f64) {
        (self.min, self.max)
    }

    fn span(self) -> f64 {
        let span = self.max - self.min;
        if span.abs() < DEGENERATE_SPAN {
            1.0
        } else {
            span
        }
    }

    fn extent(self) -> f64 {
        if self.pixels.is_finite() && self.pixels > 0.0 {
            self.pixels
        } else {
            1.0
        }
    }

    /// Pixels per axis unit.
    #[must_use]
    pub fn pixels_per_unit(self) -> f64 {
        self.extent() / self.span()
    }

    #[must_use]
    pub fn to_pixel(self, value: f64) -> f64 {
        if self.flipped {
            -(value - self.max) * self.pixels_per_unit()
        } else {
            (value - self.min) * self.pixels_per_unit()
        }
    }

    #[must_use]
    pub fn from_pixel(self, pixel: f64) -> f64 {
        if self.flipped {
            self.max - pixel / self.pixels_per_unit()
        } else {
            self.min + pixel / self.pixels_per_unit()
        }
    }

    /// Axis distance covered by `pixels`, sign following screen direction.
    #[must_use]
    pub fn delta_from_pixels(self, pixels: f64) -> f64 {
        let delta = pixels / self.pixels_per_unit();
        if self.flipped { -delta } else { delta }
    }
}

/// Axis ↔ pixel transform for a whole plot area.
///
/// Pixel coordinates are relative to the top-left corner of the plot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub x: AxisScale,
    pub y: AxisScale,
}

impl Transform {
    #[must_use]
    pub fn new(x_bounds: (f64, f64), y_bounds: (f64, f64), viewport: Viewport) -> Self {
        Self {
            x: AxisScale::new(x_bounds, f64::from(viewport.width)),
            y: AxisScale::new(y_bounds, f64::from(viewport.height)).flipped(),
        }
    }

    #[must_use]
    pub fn axis_to_pixel(&self, point: DataPoint) -> DataPoint {
        DataPoint::new(self.x.to_pixel(point.x), self.y.to_pixel(point.y))
    }

    #[must_use]
    pub fn pixel_to_axis(&self, pixel: DataPoint) -> DataPoint {
        DataPoint::new(self.x.from_pixel(pixel.x), self.y.from_pixel(pixel.y))
    }

    /// Converts a pixel displacement into an axis displacement.
    #[must_use]
    pub fn scale_from_pixel(&self, delta: DataPoint) -> DataPoint {
        DataPoint::new(
            self.x.delta_from_pixels(delta.x),
            self.y.delta_from_pixels(delta.y),
        )
    }

    /// Pixels per axis unit along each axis.
    #[must_use]
    pub fn scale(&self) -> DataPoint {
        DataPoint::new(self.x.pixels_per_unit(), self.y.pixels_per_unit())
    }
}
