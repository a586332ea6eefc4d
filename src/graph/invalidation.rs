use serde::{Deserialize, Serialize};
use tracing::trace;

use super::Graph;

/// Ordered repaint classes.
///
/// `Present` re-blits existing surfaces (the plot moved), `Overlay`
/// recomposes ruler and legend chrome only, `Full` recomposes everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum InvalidationLevel {
    #[default]
    None,
    Present,
    Overlay,
    Full,
}

impl InvalidationLevel {
    #[must_use]
    pub const fn max(self, other: Self) -> Self {
        if self as u8 >= other as u8 {
            self
        } else {
            other
        }
    }

    #[must_use]
    pub const fn is_none(self) -> bool {
        matches!(self, Self::None)
    }
}

impl Graph {
    /// Marks compositor state dirty and asks the host for a redraw.
    pub fn invalidate(&mut self, level: InvalidationLevel) {
        if level.is_none() {
            return;
        }
        trace!(?level, "graph invalidated");
        self.compositor.invalidate(level);
        self.redraw_requested.emit();
    }
}
