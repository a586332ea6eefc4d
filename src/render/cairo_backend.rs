use std::any::Any;
use std::f64::consts::{FRAC_PI_2, PI, TAU};

use cairo::{Context, Format, ImageSurface, Operator};
use pango::FontDescription;
use tracing::debug;

use crate::core::Viewport;
use crate::error::{PlotError, PlotResult};
use crate::render::{
    DrawTarget, Primitive, RectPrimitive, RenderFrame, Rgba, Surface, SurfaceProvider, TextHAlign,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CairoRenderStats {
    pub lines_drawn: usize,
    pub paths_drawn: usize,
    pub rects_drawn: usize,
    pub circles_drawn: usize,
    pub texts_drawn: usize,
}

/// ARGB32 image surface allocated through [`CairoSurfaceProvider`].
#[derive(Debug)]
pub struct CairoSurface {
    surface: ImageSurface,
    viewport: Viewport,
    last_stats: CairoRenderStats,
}

impl CairoSurface {
    pub fn new(viewport: Viewport) -> PlotResult<Self> {
        if !viewport.is_valid() {
            return Err(PlotError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        let width = i32::try_from(viewport.width)
            .map_err(|_| PlotError::Backend("surface width out of range".to_owned()))?;
        let height = i32::try_from(viewport.height)
            .map_err(|_| PlotError::Backend("surface height out of range".to_owned()))?;

        let surface = ImageSurface::create(Format::ARgb32, width, height)
            .map_err(|err| map_backend_error("failed to create cairo surface", err))?;
        Ok(Self {
            surface,
            viewport,
            last_stats: CairoRenderStats::default(),
        })
    }

    #[must_use]
    pub fn image(&self) -> &ImageSurface {
        &self.surface
    }

    #[must_use]
    pub fn last_stats(&self) -> CairoRenderStats {
        self.last_stats
    }
}

impl Surface for CairoSurface {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn paint(&mut self, frame: &RenderFrame) -> PlotResult<()> {
        let context = Context::new(&self.surface)
            .map_err(|err| map_backend_error("failed to create cairo context", err))?;
        context.set_operator(Operator::Clear);
        context
            .paint()
            .map_err(|err| map_backend_error("failed to clear surface", err))?;
        context.set_operator(Operator::Over);

        self.last_stats = render_frame_on_context(&context, frame)?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Allocates [`CairoSurface`]s for the compositor.
#[derive(Debug, Default)]
pub struct CairoSurfaceProvider;

impl SurfaceProvider for CairoSurfaceProvider {
    fn create_surface(&mut self, viewport: Viewport) -> PlotResult<Box<dyn Surface>> {
        debug!(
            width = viewport.width,
            height = viewport.height,
            "allocating cairo surface"
        );
        Ok(Box::new(CairoSurface::new(viewport)?))
    }
}

/// Draw target wrapping an external Cairo context (a widget draw callback,
/// a PDF/SVG export surface, ...).
pub struct CairoTarget<'a> {
    context: &'a Context,
}

impl<'a> CairoTarget<'a> {
    #[must_use]
    pub fn new(context: &'a Context) -> Self {
        Self { context }
    }
}

impl DrawTarget for CairoTarget<'_> {
    fn composite(&mut self, surface: &dyn Surface, x: f64, y: f64) -> PlotResult<()> {
        let Some(surface) = surface.as_any().downcast_ref::<CairoSurface>() else {
            return Err(PlotError::Backend(
                "cairo target can only composite cairo surfaces".to_owned(),
            ));
        };

        self.context
            .save()
            .map_err(|err| map_backend_error("failed to save context", err))?;
        let result = self
            .context
            .set_source_surface(&surface.surface, x, y)
            .and_then(|()| self.context.paint());
        self.context
            .restore()
            .map_err(|err| map_backend_error("failed to restore context", err))?;
        result.map_err(|err| map_backend_error("failed to composite surface", err))
    }

    fn draw_frame(&mut self, frame: &RenderFrame) -> PlotResult<()> {
        render_frame_on_context(self.context, frame).map(|_| ())
    }
}

/// Paints `frame` on `context` in display-list order.
pub fn render_frame_on_context(
    context: &Context,
    frame: &RenderFrame,
) -> PlotResult<CairoRenderStats> {
    frame.validate()?;
    let mut stats = CairoRenderStats::default();

    for primitive in &frame.primitives {
        match primitive {
            Primitive::Line(line) => {
                apply_color(context, line.color);
                context.set_line_width(line.stroke_width);
                context.move_to(line.x1, line.y1);
                context.line_to(line.x2, line.y2);
                context
                    .stroke()
                    .map_err(|err| map_backend_error("failed to stroke line", err))?;
                stats.lines_drawn += 1;
            }
            Primitive::Path(path) => {
                let mut points = path.points.iter();
                if let Some((x, y)) = points.next() {
                    context.move_to(*x, *y);
                }
                for (x, y) in points {
                    context.line_to(*x, *y);
                }
                if path.closed {
                    context.close_path();
                }
                fill_and_stroke(
                    context,
                    path.fill_color,
                    path.stroke_color.map(|color| (path.stroke_width, color)),
                )?;
                stats.paths_drawn += 1;
            }
            Primitive::Rect(rect) => {
                append_rect_path(context, *rect);
                let border = (rect.border_width > 0.0).then_some((rect.border_width, rect.border_color));
                fill_and_stroke(context, Some(rect.fill_color), border)?;
                stats.rects_drawn += 1;
            }
            Primitive::Circle(circle) => {
                context.new_sub_path();
                context.arc(circle.x, circle.y, circle.radius, 0.0, TAU);
                fill_and_stroke(
                    context,
                    circle.fill_color,
                    circle.stroke_color.map(|color| (circle.stroke_width, color)),
                )?;
                stats.circles_drawn += 1;
            }
            Primitive::Text(text) => {
                let layout = pangocairo::functions::create_layout(context);
                let font_description =
                    FontDescription::from_string(&format!("Sans {}px", text.font_size_px));
                layout.set_font_description(Some(&font_description));
                if text.markup {
                    layout.set_markup(&text.text);
                } else {
                    layout.set_text(&text.text);
                }

                let (text_width, _text_height) = layout.pixel_size();
                let x = match text.h_align {
                    TextHAlign::Left => text.x,
                    TextHAlign::Center => text.x - f64::from(text_width) / 2.0,
                    TextHAlign::Right => text.x - f64::from(text_width),
                };

                apply_color(context, text.color);
                context.move_to(x, text.y);
                pangocairo::functions::show_layout(context, &layout);
                stats.texts_drawn += 1;
            }
        }
    }

    Ok(stats)
}

fn fill_and_stroke(
    context: &Context,
    fill: Option<Rgba>,
    stroke: Option<(f64, Rgba)>,
) -> PlotResult<()> {
    match (fill, stroke) {
        (Some(fill), Some((width, color))) => {
            apply_color(context, fill);
            context
                .fill_preserve()
                .map_err(|err| map_backend_error("failed to fill path", err))?;
            apply_color(context, color);
            context.set_line_width(width);
            context
                .stroke()
                .map_err(|err| map_backend_error("failed to stroke path", err))
        }
        (Some(fill), None) => {
            apply_color(context, fill);
            context
                .fill()
                .map_err(|err| map_backend_error("failed to fill path", err))
        }
        (None, Some((width, color))) => {
            apply_color(context, color);
            context.set_line_width(width);
            context
                .stroke()
                .map_err(|err| map_backend_error("failed to stroke path", err))
        }
        (None, None) => {
            context.new_path();
            Ok(())
        }
    }
}

fn apply_color(context: &Context, color: Rgba) {
    context.set_source_rgba(color.red, color.green, color.blue, color.alpha);
}

fn append_rect_path(context: &Context, rect: RectPrimitive) {
    if rect.corner_radius <= 0.0 {
        context.rectangle(rect.x, rect.y, rect.width, rect.height);
        return;
    }

    let radius = rect
        .corner_radius
        .min(rect.width * 0.5)
        .min(rect.height * 0.5);
    let left = rect.x;
    let top = rect.y;
    let right = rect.x + rect.width;
    let bottom = rect.y + rect.height;

    context.new_sub_path();
    context.arc(right - radius, top + radius, radius, -FRAC_PI_2, 0.0);
    context.arc(right - radius, bottom - radius, radius, 0.0, FRAC_PI_2);
    context.arc(left + radius, bottom - radius, radius, FRAC_PI_2, PI);
    context.arc(left + radius, top + radius, radius, PI, PI + FRAC_PI_2);
    context.close_path();
}

fn map_backend_error(prefix: &str, err: cairo::Error) -> PlotError {
    PlotError::Backend(format!("{prefix}: {err}"))
}
