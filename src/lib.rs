//! plot-rs: interactive 2D plotting core.
//!
//! The crate is split into reactive value types and tick generation
//! ([`core`]), a backend-neutral display list with surface contracts
//! ([`render`]), the renderer contract with line and area renderers
//! ([`renderers`]) and the [`Graph`] compositor that ties them together.

pub mod core;
pub mod error;
pub mod graph;
pub mod render;
pub mod renderers;
pub mod telemetry;

pub use error::{PlotError, PlotResult};
pub use graph::{Axis, AxisMode, Graph, GraphSettings};
