mod frame;
mod layer_stack;
mod layered_frame;
mod primitives;
mod recording;
mod surface;
pub mod text;

pub use frame::RenderFrame;
pub use layer_stack::{LayerKind, LayerStack};
pub use layered_frame::{LayerPrimitives, LayeredRenderFrame};
pub use primitives::{
    CirclePrimitive, LinePrimitive, PathPrimitive, Primitive, RectPrimitive, Rgba, TextHAlign,
    TextPrimitive,
};
pub use recording::{
    RecordingSurface, RecordingSurfaceProvider, RecordingTarget, SurfaceCounter, TargetOp,
};
pub use surface::{DrawTarget, Surface, SurfaceProvider};

#[cfg(feature = "cairo-backend")]
mod cairo_backend;
#[cfg(feature = "cairo-backend")]
pub use cairo_backend::{
    CairoRenderStats, CairoSurface, CairoSurfaceProvider, CairoTarget, render_frame_on_context,
};
