use tracing::warn;

use crate::core::{ColorFgBg, TickLayout, Transform, format_tick};
use crate::render::text::{estimate_text_width_px, text_height_px};
use crate::render::{
    CirclePrimitive, LayerKind, LayeredRenderFrame, LinePrimitive, RectPrimitive, Rgba,
    TextHAlign, TextPrimitive,
};
use crate::renderers::RenderContext;

use super::labels::{CHIP_PADDING, chip_size};
use super::{Graph, RulerReadout};

const RULER_DOT_RADIUS: f64 = 4.0;
const RULER_CHIP_OFFSET: f64 = 6.0;
const TICK_LABEL_GAP: f64 = 2.0;
const TRANSPARENT: Rgba = Rgba::rgba(0.0, 0.0, 0.0, 0.0);

/// Centers a one pixel wide line on a pixel.
fn crisp(value: f64) -> f64 {
    value.floor() + 0.5
}

fn within(value: f64, extent: f64) -> bool {
    value.is_finite() && value >= 0.0 && value <= extent
}

/// Label chip with its top-left corner kept inside `width` x `height`.
struct Chip<'a> {
    text: &'a str,
    markup: bool,
    colors: ColorFgBg,
    border: Option<Rgba>,
}

impl Chip<'_> {
    fn push(
        &self,
        frame: &mut LayeredRenderFrame,
        layer: LayerKind,
        x: f64,
        y: f64,
        font_size_px: f64,
    ) {
        if self.text.is_empty() {
            return;
        }
        let width = f64::from(frame.viewport.width);
        let height = f64::from(frame.viewport.height);
        let (chip_width, chip_height) = chip_size(self.text, self.markup, font_size_px);
        let x = x.min(width - chip_width).max(0.0);
        let y = y.min(height - chip_height).max(0.0);

        let mut background = RectPrimitive::new(x, y, chip_width, chip_height, self.colors.bg);
        if let Some(border) = self.border {
            background = background.with_border(1.0, border);
        }
        frame.push(layer, background);
        frame.push(
            layer,
            TextPrimitive::new(
                self.text,
                x + CHIP_PADDING,
                y + CHIP_PADDING,
                font_size_px,
                self.colors.fg,
                TextHAlign::Left,
            )
            .with_markup(self.markup),
        );
    }
}

impl Graph {
    /// Fills background, grid, series and axis layers for `frame.viewport`.
    pub(super) fn fill_data_layers(&mut self, frame: &mut LayeredRenderFrame) {
        let viewport = frame.viewport;
        let width = f64::from(viewport.width);
        let height = f64::from(viewport.height);
        let transform = Transform::new(self.x_axis.bounds(), self.y_axis.bounds(), viewport);
        let x_layout = self
            .x_ticks
            .update(self.x_axis.bounds(), viewport.width)
            .clone();
        let y_layout = self
            .y_ticks
            .update(self.y_axis.bounds(), viewport.height)
            .clone();
        let look = self.appearance;

        frame.push(
            LayerKind::Background,
            RectPrimitive::new(0.0, 0.0, width, height, look.background_color),
        );

        if look.show_grid {
            for &value in &x_layout.values {
                let x = crisp(transform.x.to_pixel(value));
                if within(x, width) {
                    frame.push(
                        LayerKind::Grid,
                        LinePrimitive::new(x, 0.0, x, height, 1.0, look.grid_color),
                    );
                }
            }
            for &value in &y_layout.values {
                let y = crisp(transform.y.to_pixel(value));
                if within(y, height) {
                    frame.push(
                        LayerKind::Grid,
                        LinePrimitive::new(0.0, y, width, y, 1.0, look.grid_color),
                    );
                }
            }
        }

        let mut series = Vec::new();
        {
            let mut context = RenderContext::new(transform, &mut series);
            for (id, renderer) in self.renderers.iter() {
                match renderer.try_borrow() {
                    Ok(renderer) => renderer.render(&mut context),
                    Err(_) => warn!(%id, "renderer busy; skipped in this frame"),
                }
            }
        }
        frame.extend(LayerKind::Series, series);

        self.fill_axis_layer(frame, &transform, &x_layout, &y_layout);
    }

    fn fill_axis_layer(
        &self,
        frame: &mut LayeredRenderFrame,
        transform: &Transform,
        x_layout: &TickLayout,
        y_layout: &TickLayout,
    ) {
        let width = f64::from(frame.viewport.width);
        let height = f64::from(frame.viewport.height);
        let look = &self.appearance;
        let font_size_px = look.font_size_px;
        let text_height = text_height_px(font_size_px);

        if look.show_axis {
            if self.x_axis.contains(0.0) {
                let x = crisp(transform.x.to_pixel(0.0));
                frame.push(
                    LayerKind::Axis,
                    LinePrimitive::new(x, 0.0, x, height, 1.0, look.axis_color),
                );
            }
            if self.y_axis.contains(0.0) {
                let y = crisp(transform.y.to_pixel(0.0));
                frame.push(
                    LayerKind::Axis,
                    LinePrimitive::new(0.0, y, width, y, 1.0, look.axis_color),
                );
            }
        }

        if look.show_box && width > 1.0 && height > 1.0 {
            frame.push(
                LayerKind::Axis,
                RectPrimitive::new(0.5, 0.5, width - 1.0, height - 1.0, TRANSPARENT)
                    .with_border(1.0, look.axis_color),
            );
        }

        if self.x_ticks.visible() {
            let length = self.x_ticks.length();
            for &value in &x_layout.values {
                let x = crisp(transform.x.to_pixel(value));
                if !within(x, width) {
                    continue;
                }
                if length > 0.0 {
                    frame.push(
                        LayerKind::Axis,
                        LinePrimitive::new(x, height, x, height - length, 1.0, look.axis_color),
                    );
                }
                if self.x_ticks.show_labels() {
                    let text = format_tick(value, x_layout.decimals);
                    let half = estimate_text_width_px(&text, font_size_px) / 2.0;
                    let top = height - length - TICK_LABEL_GAP - text_height;
                    if x - half >= 0.0 && x + half <= width && top >= 0.0 {
                        frame.push(
                            LayerKind::Axis,
                            TextPrimitive::new(
                                text,
                                x,
                                top,
                                font_size_px,
                                look.axis_label.fg,
                                TextHAlign::Center,
                            ),
                        );
                    }
                }
            }
        }

        if self.y_ticks.visible() {
            let length = self.y_ticks.length();
            for &value in &y_layout.values {
                let y = crisp(transform.y.to_pixel(value));
                if !within(y, height) {
                    continue;
                }
                if length > 0.0 {
                    frame.push(
                        LayerKind::Axis,
                        LinePrimitive::new(0.0, y, length, y, 1.0, look.axis_color),
                    );
                }
                if self.y_ticks.show_labels() {
                    let text = format_tick(value, y_layout.decimals);
                    let left = length + TICK_LABEL_GAP;
                    let top = y - text_height / 2.0;
                    let fits = top >= 0.0
                        && top + text_height <= height
                        && left + estimate_text_width_px(&text, font_size_px) <= width;
                    if fits {
                        frame.push(
                            LayerKind::Axis,
                            TextPrimitive::new(
                                text,
                                left,
                                top,
                                font_size_px,
                                look.axis_label.fg,
                                TextHAlign::Left,
                            ),
                        );
                    }
                }
            }
        }

        if look.show_range_labels {
            let decimals = y_layout.decimals + 1;
            let top = format_tick(self.y_axis.max(), decimals);
            let bottom = format_tick(self.y_axis.min(), decimals);
            let chip_height = chip_size(&top, false, font_size_px).1;
            for (text, y) in [(top, 0.0), (bottom, height - chip_height)] {
                let chip_width = chip_size(&text, false, font_size_px).0;
                Chip {
                    text: &text,
                    markup: false,
                    colors: look.axis_label,
                    border: None,
                }
                .push(frame, LayerKind::Axis, width - chip_width, y, font_size_px);
            }
        }
    }

    /// Fills the ruler (optionally) and legend layers for `frame.viewport`.
    pub(super) fn fill_overlay_layers(&self, frame: &mut LayeredRenderFrame, include_ruler: bool) {
        if include_ruler {
            let transform = Transform::new(self.x_axis.bounds(), self.y_axis.bounds(), frame.viewport);
            let readout = self.probe_ruler(&transform);
            self.fill_ruler_layer(frame, &readout);
        }

        let font_size_px = self.appearance.font_size_px;
        for chip in self.label_chips() {
            Chip {
                text: &chip.text,
                markup: chip.markup,
                colors: ColorFgBg::new(chip.color, self.appearance.axis_label.bg),
                border: chip.has_ruler.then_some(chip.color),
            }
            .push(frame, LayerKind::Labels, chip.x, chip.y, font_size_px);
        }
    }

    fn fill_ruler_layer(&self, frame: &mut LayeredRenderFrame, readout: &RulerReadout) {
        let width = f64::from(frame.viewport.width);
        let height = f64::from(frame.viewport.height);
        let look = &self.appearance;
        let font_size_px = look.font_size_px;
        let x_decimals = self.x_ticks.calculated_decimals() + 2;
        let y_decimals = self.y_ticks.calculated_decimals() + 2;

        match readout {
            RulerReadout::Hidden => {}
            RulerReadout::Freestyle { pixel, axis } => {
                if look.show_ruler_axis {
                    let x = crisp(pixel.x);
                    let y = crisp(pixel.y);
                    frame.push(
                        LayerKind::Ruler,
                        LinePrimitive::new(x, 0.0, x, height, 1.0, look.ruler_color),
                    );
                    frame.push(
                        LayerKind::Ruler,
                        LinePrimitive::new(0.0, y, width, y, 1.0, look.ruler_color),
                    );
                    let text = format!(
                        "{}, {}",
                        format_tick(axis.x, x_decimals),
                        format_tick(axis.y, y_decimals)
                    );
                    Chip {
                        text: &text,
                        markup: false,
                        colors: look.ruler_label,
                        border: None,
                    }
                    .push(
                        frame,
                        LayerKind::Ruler,
                        pixel.x + RULER_CHIP_OFFSET,
                        pixel.y + RULER_CHIP_OFFSET,
                        font_size_px,
                    );
                }
            }
            RulerReadout::Probed { pixel, hits, .. } => {
                if look.show_ruler_axis {
                    let x = crisp(pixel.x);
                    frame.push(
                        LayerKind::Ruler,
                        LinePrimitive::new(x, 0.0, x, height, 1.0, look.ruler_color),
                    );
                }
                for hit in hits {
                    frame.push(
                        LayerKind::Ruler,
                        CirclePrimitive::filled(
                            hit.pixel.x,
                            hit.pixel.y,
                            RULER_DOT_RADIUS,
                            hit.color.with_alpha(0.5),
                        )
                        .with_stroke(1.0, look.ruler_color),
                    );

                    let text = format!(
                        "{}, {}",
                        format_tick(hit.value.x, x_decimals),
                        format_tick(hit.value.y, y_decimals)
                    );
                    let chip_height = chip_size(&text, false, font_size_px).1;
                    Chip {
                        text: &text,
                        markup: false,
                        colors: look.ruler_label,
                        border: Some(hit.color),
                    }
                    .push(
                        frame,
                        LayerKind::Ruler,
                        hit.pixel.x + RULER_CHIP_OFFSET,
                        hit.pixel.y - chip_height - RULER_CHIP_OFFSET,
                        font_size_px,
                    );
                }
            }
        }
    }
}
