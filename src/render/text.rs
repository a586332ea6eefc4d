/// Line height relative to font size.
pub const LINE_HEIGHT_FACTOR: f64 = 1.2;

/// Backend-independent text width estimate.
///
/// Layout (label chips, hit-testing) must not depend on which backend draws,
/// so widths come from fixed per-character factors instead of font metrics.
#[must_use]
pub fn estimate_text_width_px(text: &str, font_size_px: f64) -> f64 {
    let units = text.chars().fold(0.0, |acc, ch| {
        acc + match ch {
            '0'..='9' => 0.62,
            '.' | ',' => 0.34,
            '-' | '+' | '%' => 0.42,
            ' ' => 0.33,
            _ => 0.58,
        }
    });
    (units * font_size_px).max(font_size_px)
}

#[must_use]
pub fn text_height_px(font_size_px: f64) -> f64 {
    font_size_px * LINE_HEIGHT_FACTOR
}

/// Removes Pango-style tags and decodes the basic entities.
#[must_use]
pub fn strip_markup(markup: &str) -> String {
    let mut plain = String::with_capacity(markup.len());
    let mut in_tag = false;
    for ch in markup.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => plain.push(ch),
            _ => {}
        }
    }
    plain
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
