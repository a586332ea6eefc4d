use smallvec::SmallVec;
use tracing::trace;

use crate::error::{PlotError, PlotResult};

use super::changeable::{Changeable, Notifier};
use super::range::{DEGENERATE_SPAN, ordered};

/// Tick positions for one axis; most layouts fit inline.
pub type TickValues = SmallVec<[f64; 16]>;

const MAX_TICKS: usize = 10_000;
const TICK_DENSITY: f64 = 0.3;

/// Tunables that influence step selection.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickOptions {
    /// Upper bound for the decimal count used when choosing the step.
    pub max_decimals: Option<u32>,
    /// Steps below this are raised to it.
    pub min_tick_size: Option<f64>,
    /// Fixed step, overriding the heuristic entirely.
    pub tick_size: Option<f64>,
}

/// Result of one tick computation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TickLayout {
    pub size: f64,
    pub decimals: u32,
    pub values: TickValues,
}

/// Chooses a "nice" step for `span` spread over `pixels`.
///
/// Returns `(step, decimals)`; `decimals` may be negative for steps of ten
/// or more.
#[must_use]
pub fn select_step(span: f64, pixels: u32, options: TickOptions) -> (f64, i32) {
    let ideal_count = TICK_DENSITY * f64::from(pixels).sqrt();
    let delta = span.abs() / ideal_count;
    if !delta.is_finite() || delta <= 0.0 {
        return (options.tick_size.unwrap_or(1.0), 0);
    }

    let max_decimals = options.max_decimals.filter(|max| *max > 0).map(|max| max as i32);
    let mut decimals = -(delta.log10().floor() as i32);
    if let Some(max) = max_decimals {
        decimals = decimals.min(max);
    }

    let magnitude = 10f64.powi(-decimals);
    let normalized = delta / magnitude;

    let mut size = if normalized < 1.5 {
        1.0
    } else if normalized < 3.0 {
        if normalized > 2.25 && max_decimals.is_none_or(|max| decimals + 1 <= max) {
            decimals += 1;
            2.5
        } else {
            2.0
        }
    } else if normalized < 7.5 {
        5.0
    } else {
        10.0
    };
    size *= magnitude;

    if let Some(min) = options.min_tick_size {
        if size < min {
            size = min;
        }
    }
    if let Some(fixed) = options.tick_size {
        size = fixed;
    }

    (size, decimals)
}

/// Computes tick positions covering `bounds`.
///
/// Inverted bounds are treated as their ordered equivalent and zero-width
/// bounds are widened to a unit span around their center. The first value is
/// `<= min` and the last `>= max`. No pixels means no ticks.
#[must_use]
pub fn generate_ticks(bounds: (f64, f64), pixels: u32, options: TickOptions) -> TickLayout {
    let (mut min, mut max) = ordered(bounds);
    if pixels == 0 || !min.is_finite() || !max.is_finite() {
        return TickLayout::default();
    }
    if max - min < DEGENERATE_SPAN {
        let center = (min + max) / 2.0;
        min = center - 0.5;
        max = center + 0.5;
    }

    let (size, decimals) = select_step(max - min, pixels, options);
    let decimals = match options.max_decimals.filter(|max| *max > 0) {
        Some(max) => max,
        None => decimals.max(0) as u32,
    };
    if !size.is_finite() || size <= 0.0 {
        return TickLayout {
            size,
            decimals,
            values: TickValues::new(),
        };
    }

    let start = (min / size).floor() * size;
    let mut values = TickValues::new();
    let mut previous = f64::NAN;
    for index in 0..MAX_TICKS {
        let value = start + index as f64 * size;
        if value == previous {
            break;
        }
        values.push(value);
        if value >= max {
            break;
        }
        previous = value;
    }

    TickLayout {
        size,
        decimals,
        values,
    }
}

/// Formats `value` with a fixed number of decimals, never printing `-0`.
#[must_use]
pub fn format_tick(value: f64, decimals: u32) -> String {
    let text = format!("{:.*}", decimals as usize, value);
    if text.starts_with('-') && text[1..].chars().all(|ch| ch == '0' || ch == '.') {
        text[1..].to_owned()
    } else {
        text
    }
}

/// Observable tick generator for one axis.
///
/// Option setters notify; [`Ticks::update`] only recomputes the cached layout
/// when the bounds or pixel span differ from the previous call.
pub struct Ticks {
    visible: bool,
    show_labels: bool,
    length: f64,
    options: TickOptions,
    layout: TickLayout,
    computed_for: Option<((f64, f64), u32)>,
    notifier: Notifier,
}

impl Ticks {
    #[must_use]
    pub fn new() -> Self {
        Self {
            visible: true,
            show_labels: true,
            length: 5.0,
            options: TickOptions::default(),
            layout: TickLayout::default(),
            computed_for: None,
            notifier: Notifier::new(),
        }
    }

    #[must_use]
    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            self.notifier.emit_changed();
        }
    }

    #[must_use]
    pub fn show_labels(&self) -> bool {
        self.show_labels
    }

    pub fn set_show_labels(&mut self, show_labels: bool) {
        if self.show_labels != show_labels {
            self.show_labels = show_labels;
            self.notifier.emit_changed();
        }
    }

    /// Tick mark length in pixels.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn set_length(&mut self, length: f64) -> PlotResult<()> {
        if !length.is_finite() || length < 0.0 {
            return Err(PlotError::InvalidData(
                "tick length must be finite and >= 0".to_owned(),
            ));
        }
        if self.length != length {
            self.length = length;
            self.notifier.emit_changed();
        }
        Ok(())
    }

    #[must_use]
    pub fn options(&self) -> TickOptions {
        self.options
    }

    pub fn set_max_decimals(&mut self, max_decimals: Option<u32>) {
        self.set_options(TickOptions {
            max_decimals,
            ..self.options
        });
    }

    pub fn set_min_tick_size(&mut self, min_tick_size: Option<f64>) -> PlotResult<()> {
        validate_step("minimum tick size", min_tick_size)?;
        self.set_options(TickOptions {
            min_tick_size,
            ..self.options
        });
        Ok(())
    }

    pub fn set_tick_size(&mut self, tick_size: Option<f64>) -> PlotResult<()> {
        validate_step("tick size", tick_size)?;
        self.set_options(TickOptions {
            tick_size,
            ..self.options
        });
        Ok(())
    }

    fn set_options(&mut self, options: TickOptions) {
        if self.options != options {
            self.options = options;
            self.computed_for = None;
            self.notifier.emit_changed();
        }
    }

    /// Recomputes the layout for `bounds` spread over `pixels`.
    pub fn update(&mut self, bounds: (f64, f64), pixels: u32) -> &TickLayout {
        if self.computed_for != Some((bounds, pixels)) {
            self.layout = generate_ticks(bounds, pixels, self.options);
            self.computed_for = Some((bounds, pixels));
            trace!(
                min = bounds.0,
                max = bounds.1,
                pixels,
                step = self.layout.size,
                count = self.layout.values.len(),
                "ticks recomputed"
            );
        }
        &self.layout
    }

    #[must_use]
    pub fn layout(&self) -> &TickLayout {
        &self.layout
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.layout.values
    }

    #[must_use]
    pub fn calculated_tick_size(&self) -> f64 {
        self.layout.size
    }

    #[must_use]
    pub fn calculated_decimals(&self) -> u32 {
        self.layout.decimals
    }

    #[must_use]
    pub fn format_label(&self, value: f64) -> String {
        format_tick(value, self.layout.decimals)
    }
}

fn validate_step(name: &str, value: Option<f64>) -> PlotResult<()> {
    match value {
        Some(step) if !step.is_finite() || step <= 0.0 => Err(PlotError::InvalidData(format!(
            "{name} must be finite and > 0"
        ))),
        _ => Ok(()),
    }
}

impl Changeable for Ticks {
    fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    fn notifier_mut(&mut self) -> &mut Notifier {
        &mut self.notifier
    }
}

impl Default for Ticks {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Ticks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ticks")
            .field("visible", &self.visible)
            .field("show_labels", &self.show_labels)
            .field("options", &self.options)
            .field("layout", &self.layout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::{TickOptions, format_tick, generate_ticks, select_step};

    #[test]
    fn hundred_over_four_hundred_pixels_steps_by_twenty() {
        let (size, decimals) = select_step(100.0, 400, TickOptions::default());
        assert_relative_eq!(size, 20.0, epsilon = 1e-9);
        assert_eq!(decimals, -1);

        let layout = generate_ticks((0.0, 100.0), 400, TickOptions::default());
        assert_eq!(layout.decimals, 0);
        assert_eq!(layout.values.len(), 6);
        assert_relative_eq!(layout.values[5], 100.0, epsilon = 1e-9);
    }

    #[test]
    fn unit_range_over_hundred_pixels_steps_by_half() {
        let layout = generate_ticks((0.0, 1.0), 100, TickOptions::default());
        assert_relative_eq!(layout.size, 0.5, epsilon = 1e-12);
        assert_eq!(layout.decimals, 1);
        assert_eq!(layout.values.as_slice(), &[0.0, 0.5, 1.0]);
    }

    #[test]
    fn two_and_a_half_needs_a_decimal_budget() {
        // delta = 2.4 falls in the promoted band
        let pixels = 100;
        let span = 2.4 * 0.3 * 10.0;
        let (size, _) = select_step(span, pixels, TickOptions::default());
        assert_relative_eq!(size, 2.5, epsilon = 1e-12);

        let capped = TickOptions {
            max_decimals: Some(0),
            ..TickOptions::default()
        };
        let (size, _) = select_step(span, pixels, capped);
        assert_relative_eq!(size, 2.5, epsilon = 1e-12);

        let (size, _) = select_step(span / 10.0, pixels, TickOptions {
            max_decimals: Some(1),
            ..TickOptions::default()
        });
        assert_relative_eq!(size, 0.2, epsilon = 1e-12);
    }

    #[test]
    fn fixed_and_minimum_sizes_override_heuristic() {
        let options = TickOptions {
            min_tick_size: Some(50.0),
            ..TickOptions::default()
        };
        assert_relative_eq!(select_step(100.0, 400, options).0, 50.0);

        let options = TickOptions {
            tick_size: Some(7.0),
            min_tick_size: Some(50.0),
            ..TickOptions::default()
        };
        assert_relative_eq!(select_step(100.0, 400, options).0, 7.0);
    }

    #[test]
    fn degenerate_inputs_do_not_panic() {
        assert!(generate_ticks((0.0, 1.0), 0, TickOptions::default()).values.is_empty());
        let flat = generate_ticks((3.0, 3.0), 200, TickOptions::default());
        assert!(flat.values[0] <= 3.0);
        assert!(*flat.values.last().unwrap() >= 3.0);

        let inverted = generate_ticks((1.0, -1.0), 200, TickOptions::default());
        assert!(inverted.values[0] <= -1.0);
        assert!(*inverted.values.last().unwrap() >= 1.0);

        assert!(generate_ticks((f64::NAN, 1.0), 200, TickOptions::default()).values.is_empty());
    }

    #[test]
    fn labels_never_show_negative_zero() {
        assert_eq!(format_tick(-0.0001, 2), "0.00");
        assert_eq!(format_tick(-0.5, 1), "-0.5");
        assert_eq!(format_tick(20.0, 0), "20");
    }
}
