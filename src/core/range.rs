use std::fmt;

use super::changeable::{Changeable, Notifier};

/// Spans below this are treated as degenerate (zero width).
pub const DEGENERATE_SPAN: f64 = 1e-9;

/// Observable `[min, max]` interval.
///
/// No ordering is enforced: `min > max` is how inverted axes are expressed,
/// so consumers must not assume `span() >= 0`.
pub struct Range {
    min: f64,
    max: f64,
    notifier: Notifier,
}

impl Range {
    #[must_use]
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            notifier: Notifier::new(),
        }
    }

    #[must_use]
    pub fn min(&self) -> f64 {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> f64 {
        self.max
    }

    #[must_use]
    pub fn bounds(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    #[must_use]
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn set_min(&mut self, min: f64) {
        if self.min != min {
            self.min = min;
            self.notifier.emit_changed();
        }
    }

    pub fn set_max(&mut self, max: f64) {
        if self.max != max {
            self.max = max;
            self.notifier.emit_changed();
        }
    }

    /// Writes both ends with a single notification.
    pub fn update(&mut self, min: f64, max: f64) {
        if self.min == min && self.max == max {
            return;
        }
        self.min = min;
        self.max = max;
        self.notifier.emit_changed();
    }

    pub fn update_from(&mut self, other: &Range) {
        self.update(other.min, other.max);
    }

    pub fn shift(&mut self, delta: f64) {
        self.update(self.min + delta, self.max + delta);
    }

    /// Grows the range by `size`, half on each side.
    pub fn expand(&mut self, size: f64) {
        self.update(self.min - size / 2.0, self.max + size / 2.0);
    }

    #[must_use]
    pub fn widened(&self, scale: f64) -> (f64, f64) {
        widen_bounds(self.bounds(), scale)
    }

    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        let (low, high) = ordered(self.bounds());
        value >= low && value <= high
    }

    #[must_use]
    pub fn is_inverted(&self) -> bool {
        self.min > self.max
    }
}

impl Changeable for Range {
    fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    fn notifier_mut(&mut self) -> &mut Notifier {
        &mut self.notifier
    }
}

impl Default for Range {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Copies the value only; subscribers stay with the original.
impl Clone for Range {
    fn clone(&self) -> Self {
        Self::new(self.min, self.max)
    }
}

impl PartialEq for Range {
    fn eq(&self, other: &Self) -> bool {
        self.min == other.min && self.max == other.max
    }
}

impl fmt::Debug for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Range")
            .field("min", &self.min)
            .field("max", &self.max)
            .finish()
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// Returns `(low, high)` regardless of orientation.
#[must_use]
pub fn ordered(bounds: (f64, f64)) -> (f64, f64) {
    if bounds.0 <= bounds.1 {
        bounds
    } else {
        (bounds.1, bounds.0)
    }
}

/// Widens by `scale * span` on both sides.
///
/// Degenerate spans are widened by `scale` itself, or by one unit when
/// `scale` is zero, so the result is never zero-width.
#[must_use]
pub fn widen_bounds(bounds: (f64, f64), scale: f64) -> (f64, f64) {
    let (min, max) = bounds;
    let span = max - min;
    if span.abs() < DEGENERATE_SPAN {
        let margin = if scale > 0.0 { scale } else { 1.0 };
        return (min - margin, max + margin);
    }

    let delta = span * scale;
    (min - delta, max + delta)
}

/// Smallest ordered interval containing both inputs.
#[must_use]
pub fn union_bounds(left: (f64, f64), right: (f64, f64)) -> (f64, f64) {
    let left = ordered(left);
    let right = ordered(right);
    (left.0.min(right.0), left.1.max(right.1))
}

#[cfg(test)]
mod tests {
    use super::{Range, union_bounds, widen_bounds};

    #[test]
    fn widen_uses_unit_margin_for_flat_ranges() {
        assert_eq!(widen_bounds((3.0, 3.0), 0.0), (2.0, 4.0));
        assert_eq!(widen_bounds((3.0, 3.0), 0.5), (2.5, 3.5));
        assert_eq!(widen_bounds((0.0, 10.0), 0.1), (-1.0, 11.0));
    }

    #[test]
    fn union_orders_inverted_inputs() {
        assert_eq!(union_bounds((10.0, 0.0), (5.0, 20.0)), (0.0, 20.0));
    }

    #[test]
    fn inverted_range_is_tolerated() {
        let range = Range::new(1.0, -1.0);
        assert!(range.is_inverted());
        assert_eq!(range.span(), -2.0);
        assert!(range.contains(0.5));
    }
}
