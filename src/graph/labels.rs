use crate::core::DataPoint;
use crate::render::Rgba;
use crate::render::text::{estimate_text_width_px, strip_markup, text_height_px};

use super::{Graph, RendererId};

/// Top-left corner of the first legend chip, in plot pixels.
const CHIP_ORIGIN: (f64, f64) = (4.0, 4.0);

pub(super) const CHIP_PADDING: f64 = 3.0;

/// Legend chip of one labeled renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelChip {
    pub renderer: RendererId,
    pub text: String,
    pub markup: bool,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: Rgba,
    pub has_ruler: bool,
}

impl LabelChip {
    #[must_use]
    pub fn contains(&self, point: DataPoint) -> bool {
        point.x >= self.x
            && point.x < self.x + self.width
            && point.y >= self.y
            && point.y < self.y + self.height
    }
}

/// Size of a chip holding `text` (markup tags do not count).
pub(super) fn chip_size(text: &str, markup: bool, font_size_px: f64) -> (f64, f64) {
    let width = if markup {
        estimate_text_width_px(&strip_markup(text), font_size_px)
    } else {
        estimate_text_width_px(text, font_size_px)
    };
    (
        width + 2.0 * CHIP_PADDING,
        text_height_px(font_size_px) + 2.0 * CHIP_PADDING,
    )
}

impl Graph {
    /// Legend chips laid out left to right in renderer order, each abutting
    /// the previous one. Empty when labels are hidden.
    #[must_use]
    pub fn label_chips(&self) -> Vec<LabelChip> {
        if !self.appearance.show_labels {
            return Vec::new();
        }

        let font_size_px = self.appearance.font_size_px;
        let (mut x, y) = CHIP_ORIGIN;
        let mut chips = Vec::new();

        for (id, renderer) in self.renderers.iter() {
            let Ok(renderer) = renderer.try_borrow() else {
                continue;
            };
            let Some(labeled) = renderer.as_labeled() else {
                continue;
            };
            let (text, markup) = match (labeled.label(), labeled.label_markup()) {
                (Some(text), _) => (text, false),
                (None, Some(text)) => (text, true),
                (None, None) => continue,
            };
            if text.is_empty() {
                continue;
            }

            let (width, height) = chip_size(text, markup, font_size_px);
            let color = renderer
                .as_colored()
                .map_or(self.appearance.axis_label.fg, |colored| colored.color());
            chips.push(LabelChip {
                renderer: id,
                text: text.to_owned(),
                markup,
                x,
                y,
                width,
                height,
                color,
                has_ruler: renderer.has_ruler(),
            });
            x += width;
        }

        chips
    }

    /// Renderer whose legend chip contains `point` (plot pixels).
    #[must_use]
    pub fn label_hit_test(&self, point: DataPoint) -> Option<RendererId> {
        self.label_chips()
            .into_iter()
            .find(|chip| chip.contains(point))
            .map(|chip| chip.renderer)
    }
}
