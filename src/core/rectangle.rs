use std::fmt;

use super::signal::{Signal, SubscriptionId};
use super::types::{DataPoint, Viewport};

/// Observable rectangle with separate move and resize notifications.
///
/// Moving only needs a reposition on the next draw while resizing forces the
/// backing surfaces to be reallocated, hence the two signals.
pub struct Rectangle {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    moved: Signal,
    resized: Signal,
}

impl Rectangle {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            moved: Signal::new(),
            resized: Signal::new(),
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
    pub fn width(&self) -> f64 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }

    #[must_use]
    pub fn origin(&self) -> DataPoint {
        DataPoint::new(self.x, self.y)
    }

    /// Integer pixel size used for surface allocation.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        Viewport::new(to_pixels(self.width), to_pixels(self.height))
    }

    pub fn connect_moved(&mut self, slot: impl FnMut() + 'static) -> SubscriptionId {
        self.moved.connect(slot)
    }

    pub fn connect_resized(&mut self, slot: impl FnMut() + 'static) -> SubscriptionId {
        self.resized.connect(slot)
    }

    pub fn disconnect(&mut self, id: SubscriptionId) -> bool {
        self.moved.disconnect(id) | self.resized.disconnect(id)
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        if self.x == x && self.y == y {
            return;
        }
        self.x = x;
        self.y = y;
        self.moved.emit();
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        if self.width == width && self.height == height {
            return;
        }
        self.width = width;
        self.height = height;
        self.resized.emit();
    }

    pub fn update(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.move_to(x, y);
        self.resize(width, height);
    }

    pub fn set_x(&mut self, x: f64) {
        self.move_to(x, self.y);
    }

    pub fn set_y(&mut self, y: f64) {
        self.move_to(self.x, y);
    }

    pub fn set_width(&mut self, width: f64) {
        self.resize(width, self.height);
    }

    pub fn set_height(&mut self, height: f64) {
        self.resize(self.width, height);
    }

    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}

fn to_pixels(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.round() as u32
    } else {
        0
    }
}

impl Default for Rectangle {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }
}

impl Clone for Rectangle {
    fn clone(&self) -> Self {
        Self::new(self.x, self.y, self.width, self.height)
    }
}

impl PartialEq for Rectangle {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x
            && self.y == other.y
            && self.width == other.width
            && self.height == other.height
    }
}

impl fmt::Debug for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rectangle")
            .field("x", &self.x)
            .field("y", &self.y)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}
