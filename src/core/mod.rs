pub mod changeable;
pub mod color;
pub mod color_map;
pub mod point;
pub mod range;
pub mod rectangle;
pub mod scale;
pub mod signal;
pub mod ticks;
pub mod types;

pub use changeable::{Changeable, Notifier};
pub use color::{Color, ColorFgBg, format_hex, parse_hex};
pub use color_map::ColorMap;
pub use point::Point;
pub use range::{Range, ordered, union_bounds, widen_bounds};
pub use rectangle::Rectangle;
pub use scale::{AxisScale, Transform};
pub use signal::{Signal, SubscriptionId};
pub use ticks::{TickLayout, TickOptions, TickValues, Ticks, format_tick, generate_ticks};
pub use types::{DataPoint, Viewport};
