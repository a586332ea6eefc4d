use std::fmt;

use super::changeable::{Changeable, Notifier};
use super::types::DataPoint;

/// Observable 2D point, used for cursor/ruler positions and margins.
pub struct Point {
    x: f64,
    y: f64,
    notifier: Notifier,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            notifier: Notifier::new(),
        }
    }

    #[must_use]
    pub fn x(&self) -> f64 {
        self.x
    }

    #[must_use]
    pub fn y(&self) -> f64 {
        self.y
    }

    #[must_use]
    pub fn value(&self) -> DataPoint {
        DataPoint::new(self.x, self.y)
    }

    pub fn set_x(&mut self, x: f64) {
        if self.x != x {
            self.x = x;
            self.notifier.emit_changed();
        }
    }

    pub fn set_y(&mut self, y: f64) {
        if self.y != y {
            self.y = y;
            self.notifier.emit_changed();
        }
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        if self.x == x && self.y == y {
            return;
        }
        self.x = x;
        self.y = y;
        self.notifier.emit_changed();
    }

    pub fn update(&mut self, value: DataPoint) {
        self.move_to(value.x, value.y);
    }
}

impl Changeable for Point {
    fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    fn notifier_mut(&mut self) -> &mut Notifier {
        &mut self.notifier
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl Clone for Point {
    fn clone(&self) -> Self {
        Self::new(self.x, self.y)
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y
    }
}

impl From<DataPoint> for Point {
    fn from(value: DataPoint) -> Self {
        Self::new(value.x, value.y)
    }
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Point")
            .field("x", &self.x)
            .field("y", &self.y)
            .finish()
    }
}
