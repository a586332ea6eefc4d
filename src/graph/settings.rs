use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{ColorFgBg, format_hex, parse_hex};
use crate::error::{PlotError, PlotResult};
use crate::render::Rgba;

use super::{Axis, AxisMode, Graph};

const LABEL_BACKGROUND: Rgba = Rgba::rgba(1.0, 1.0, 1.0, 0.8);

/// Visual options of a graph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Appearance {
    /// Zero lines of both axes, when inside the visible window.
    pub show_axis: bool,
    /// One pixel border around the plot.
    pub show_box: bool,
    /// Gridlines at every tick.
    pub show_grid: bool,
    /// Legend chips.
    pub show_labels: bool,
    /// Y axis maximum and minimum printed at the right corners.
    pub show_range_labels: bool,
    pub show_ruler: bool,
    /// Ruler line(s) and the axis position readout.
    pub show_ruler_axis: bool,
    pub snap_ruler_to_data: bool,
    pub font_size_px: f64,
    pub background_color: Rgba,
    pub axis_color: Rgba,
    pub grid_color: Rgba,
    pub ruler_color: Rgba,
    pub ruler_label: ColorFgBg,
    pub axis_label: ColorFgBg,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            show_axis: true,
            show_box: false,
            show_grid: false,
            show_labels: true,
            show_range_labels: false,
            show_ruler: true,
            show_ruler_axis: true,
            snap_ruler_to_data: true,
            font_size_px: 11.0,
            background_color: Rgba::rgb(1.0, 1.0, 1.0),
            axis_color: Rgba::rgb(0.0, 0.0, 0.0),
            grid_color: Rgba::gray(0.95),
            ruler_color: Rgba::gray(0.5),
            ruler_label: ColorFgBg::new(Rgba::gray(0.5), LABEL_BACKGROUND),
            axis_label: ColorFgBg::new(Rgba::rgb(0.0, 0.0, 0.0), LABEL_BACKGROUND),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_font_size_px() -> f64 {
    11.0
}

fn default_aspect() -> f64 {
    1.0
}

fn default_axis_mode() -> String {
    AxisMode::Auto.to_string()
}

fn default_x_margin() -> f64 {
    0.0
}

fn default_y_margin() -> f64 {
    0.05
}

fn default_axis_range() -> [f64; 2] {
    [-1.0, 1.0]
}

fn hex(color: Rgba) -> String {
    format_hex(color)
}

fn default_background_color() -> String {
    hex(Appearance::default().background_color)
}

fn default_axis_color() -> String {
    hex(Appearance::default().axis_color)
}

fn default_grid_color() -> String {
    hex(Appearance::default().grid_color)
}

fn default_ruler_color() -> String {
    hex(Appearance::default().ruler_color)
}

fn default_ruler_label_fg() -> String {
    hex(Appearance::default().ruler_label.fg)
}

fn default_ruler_label_bg() -> String {
    hex(Appearance::default().ruler_label.bg)
}

fn default_axis_label_fg() -> String {
    hex(Appearance::default().axis_label.fg)
}

fn default_axis_label_bg() -> String {
    hex(Appearance::default().axis_label.bg)
}

/// Plain-data snapshot of every user visible graph option.
///
/// Colors are hex strings (`#rrggbbaa` when written) and axis modes their
/// display names, so the JSON stays readable and editable by hand. Missing
/// fields take the defaults of a fresh [`Graph`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSettings {
    #[serde(default = "default_true")]
    pub show_axis: bool,
    #[serde(default)]
    pub show_box: bool,
    #[serde(default)]
    pub show_grid: bool,
    #[serde(default = "default_true")]
    pub show_labels: bool,
    #[serde(default)]
    pub show_range_labels: bool,
    #[serde(default = "default_true")]
    pub show_ruler: bool,
    #[serde(default = "default_true")]
    pub show_ruler_axis: bool,
    #[serde(default = "default_true")]
    pub snap_ruler_to_data: bool,
    #[serde(default = "default_true")]
    pub show_x_ticks: bool,
    #[serde(default = "default_true")]
    pub show_y_ticks: bool,
    #[serde(default = "default_true")]
    pub show_x_tick_labels: bool,
    #[serde(default = "default_true")]
    pub show_y_tick_labels: bool,
    #[serde(default)]
    pub keep_aspect: bool,
    #[serde(default = "default_aspect")]
    pub axis_aspect: f64,
    #[serde(default = "default_axis_mode")]
    pub x_axis_mode: String,
    #[serde(default = "default_axis_mode")]
    pub y_axis_mode: String,
    #[serde(default = "default_x_margin")]
    pub x_auto_margin: f64,
    #[serde(default = "default_y_margin")]
    pub y_auto_margin: f64,
    #[serde(default = "default_axis_range")]
    pub x_axis: [f64; 2],
    #[serde(default = "default_axis_range")]
    pub y_axis: [f64; 2],
    #[serde(default = "default_font_size_px")]
    pub font_size_px: f64,
    #[serde(default = "default_background_color")]
    pub background_color: String,
    #[serde(default = "default_axis_color")]
    pub axis_color: String,
    #[serde(default = "default_grid_color")]
    pub grid_color: String,
    #[serde(default = "default_ruler_color")]
    pub ruler_color: String,
    #[serde(default = "default_ruler_label_fg")]
    pub ruler_label_fg: String,
    #[serde(default = "default_ruler_label_bg")]
    pub ruler_label_bg: String,
    #[serde(default = "default_axis_label_fg")]
    pub axis_label_fg: String,
    #[serde(default = "default_axis_label_bg")]
    pub axis_label_bg: String,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            show_axis: true,
            show_box: false,
            show_grid: false,
            show_labels: true,
            show_range_labels: false,
            show_ruler: true,
            show_ruler_axis: true,
            snap_ruler_to_data: true,
            show_x_ticks: true,
            show_y_ticks: true,
            show_x_tick_labels: true,
            show_y_tick_labels: true,
            keep_aspect: false,
            axis_aspect: default_aspect(),
            x_axis_mode: default_axis_mode(),
            y_axis_mode: default_axis_mode(),
            x_auto_margin: default_x_margin(),
            y_auto_margin: default_y_margin(),
            x_axis: default_axis_range(),
            y_axis: default_axis_range(),
            font_size_px: default_font_size_px(),
            background_color: default_background_color(),
            axis_color: default_axis_color(),
            grid_color: default_grid_color(),
            ruler_color: default_ruler_color(),
            ruler_label_fg: default_ruler_label_fg(),
            ruler_label_bg: default_ruler_label_bg(),
            axis_label_fg: default_axis_label_fg(),
            axis_label_bg: default_axis_label_bg(),
        }
    }
}

fn color_field(name: &str, text: &str) -> PlotResult<Rgba> {
    parse_hex(text).map_err(|err| PlotError::Settings(format!("{name}: {err}")))
}

fn finite_field(name: &str, values: &[f64]) -> PlotResult<()> {
    if values.iter().all(|value| value.is_finite()) {
        Ok(())
    } else {
        Err(PlotError::Settings(format!("{name} must be finite")))
    }
}

impl GraphSettings {
    /// Snapshot of the current options of `graph`.
    #[must_use]
    pub fn capture(graph: &Graph) -> Self {
        let look = graph.appearance();
        let (x_auto_margin, y_auto_margin) = graph.auto_margin();
        let (x_min, x_max) = graph.x_axis().bounds();
        let (y_min, y_max) = graph.y_axis().bounds();

        Self {
            show_axis: look.show_axis,
            show_box: look.show_box,
            show_grid: look.show_grid,
            show_labels: look.show_labels,
            show_range_labels: look.show_range_labels,
            show_ruler: look.show_ruler,
            show_ruler_axis: look.show_ruler_axis,
            snap_ruler_to_data: look.snap_ruler_to_data,
            show_x_ticks: graph.x_ticks().visible(),
            show_y_ticks: graph.y_ticks().visible(),
            show_x_tick_labels: graph.x_ticks().show_labels(),
            show_y_tick_labels: graph.y_ticks().show_labels(),
            keep_aspect: graph.keep_aspect(),
            axis_aspect: graph.aspect(),
            x_axis_mode: graph.x_axis_mode().to_string(),
            y_axis_mode: graph.y_axis_mode().to_string(),
            x_auto_margin,
            y_auto_margin,
            x_axis: [x_min, x_max],
            y_axis: [y_min, y_max],
            font_size_px: look.font_size_px,
            background_color: hex(look.background_color),
            axis_color: hex(look.axis_color),
            grid_color: hex(look.grid_color),
            ruler_color: hex(look.ruler_color),
            ruler_label_fg: hex(look.ruler_label.fg),
            ruler_label_bg: hex(look.ruler_label.bg),
            axis_label_fg: hex(look.axis_label.fg),
            axis_label_bg: hex(look.axis_label.bg),
        }
    }

    /// Validated appearance described by these settings.
    pub fn appearance(&self) -> PlotResult<Appearance> {
        if !self.font_size_px.is_finite() || self.font_size_px <= 0.0 {
            return Err(PlotError::Settings(format!(
                "font_size_px must be finite and > 0, got {}",
                self.font_size_px
            )));
        }

        Ok(Appearance {
            show_axis: self.show_axis,
            show_box: self.show_box,
            show_grid: self.show_grid,
            show_labels: self.show_labels,
            show_range_labels: self.show_range_labels,
            show_ruler: self.show_ruler,
            show_ruler_axis: self.show_ruler_axis,
            snap_ruler_to_data: self.snap_ruler_to_data,
            font_size_px: self.font_size_px,
            background_color: color_field("background_color", &self.background_color)?,
            axis_color: color_field("axis_color", &self.axis_color)?,
            grid_color: color_field("grid_color", &self.grid_color)?,
            ruler_color: color_field("ruler_color", &self.ruler_color)?,
            ruler_label: ColorFgBg::new(
                color_field("ruler_label_fg", &self.ruler_label_fg)?,
                color_field("ruler_label_bg", &self.ruler_label_bg)?,
            ),
            axis_label: ColorFgBg::new(
                color_field("axis_label_fg", &self.axis_label_fg)?,
                color_field("axis_label_bg", &self.axis_label_bg)?,
            ),
        })
    }

    /// Applies every option to `graph`.
    ///
    /// All fields are validated before the graph is touched, so a rejected
    /// settings value leaves the graph unchanged. Axis ranges are written
    /// without downgrading the axis modes; axes in an auto mode are then
    /// refitted to the current data.
    pub fn apply(&self, graph: &mut Graph) -> PlotResult<()> {
        let appearance = self.appearance()?;
        let x_mode: AxisMode = self.x_axis_mode.parse()?;
        let y_mode: AxisMode = self.y_axis_mode.parse()?;
        finite_field("x_axis", &self.x_axis)?;
        finite_field("y_axis", &self.y_axis)?;
        if !self.axis_aspect.is_finite() || self.axis_aspect <= 0.0 {
            return Err(PlotError::Settings(format!(
                "axis_aspect must be finite and > 0, got {}",
                self.axis_aspect
            )));
        }
        for margin in [self.x_auto_margin, self.y_auto_margin] {
            if !margin.is_finite() || margin < 0.0 {
                return Err(PlotError::Settings(format!(
                    "auto margin must be finite and >= 0, got {margin}"
                )));
            }
        }

        graph.set_appearance(appearance);
        {
            let mut ticks = graph.x_ticks_mut();
            ticks.set_visible(self.show_x_ticks);
            ticks.set_show_labels(self.show_x_tick_labels);
        }
        {
            let mut ticks = graph.y_ticks_mut();
            ticks.set_visible(self.show_y_ticks);
            ticks.set_show_labels(self.show_y_tick_labels);
        }

        graph.axes.x_mode = x_mode;
        graph.axes.y_mode = y_mode;
        graph.axes.x_margin = self.x_auto_margin;
        graph.axes.y_margin = self.y_auto_margin;
        graph.axes.aspect = self.axis_aspect;
        graph.axes.keep_aspect = self.keep_aspect;
        graph.write_axis_internal(Axis::X, (self.x_axis[0], self.x_axis[1]));
        graph.write_axis_internal(Axis::Y, (self.y_axis[0], self.y_axis[1]));
        graph.autorange_pending = x_mode != AxisMode::Fixed || y_mode != AxisMode::Fixed;
        graph.enforce_aspect();

        debug!(%x_mode, %y_mode, keep_aspect = self.keep_aspect, "graph settings applied");
        graph.process_events();
        Ok(())
    }

    pub fn to_json_pretty(&self) -> PlotResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|err| PlotError::Settings(format!("failed to serialize settings: {err}")))
    }

    pub fn from_json_str(input: &str) -> PlotResult<Self> {
        serde_json::from_str(input)
            .map_err(|err| PlotError::Settings(format!("failed to parse settings json: {err}")))
    }
}
