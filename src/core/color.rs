use std::fmt;
use std::str::FromStr;

use crate::error::{PlotError, PlotResult};
use crate::render::Rgba;

use super::changeable::{Changeable, Notifier};

/// Observable RGBA color.
///
/// Owners keep their own instance and copy values in with [`Color::update`];
/// two owners never alias one color.
pub struct Color {
    value: Rgba,
    notifier: Notifier,
}

impl Color {
    #[must_use]
    pub fn new(value: Rgba) -> Self {
        Self {
            value,
            notifier: Notifier::new(),
        }
    }

    #[must_use]
    pub fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self::new(Rgba::rgba(red, green, blue, alpha))
    }

    pub fn from_hex(text: &str) -> PlotResult<Self> {
        parse_hex(text).map(Self::new)
    }

    #[must_use]
    pub fn value(&self) -> Rgba {
        self.value
    }

    #[must_use]
    pub fn red(&self) -> f64 {
        self.value.red
    }

    #[must_use]
    pub fn green(&self) -> f64 {
        self.value.green
    }

    #[must_use]
    pub fn blue(&self) -> f64 {
        self.value.blue
    }

    #[must_use]
    pub fn alpha(&self) -> f64 {
        self.value.alpha
    }

    pub fn set(&mut self, value: Rgba) {
        if self.value != value {
            self.value = value;
            self.notifier.emit_changed();
        }
    }

    pub fn set_red(&mut self, red: f64) {
        self.set(Rgba { red, ..self.value });
    }

    pub fn set_green(&mut self, green: f64) {
        self.set(Rgba {
            green,
            ..self.value
        });
    }

    pub fn set_blue(&mut self, blue: f64) {
        self.set(Rgba { blue, ..self.value });
    }

    pub fn set_alpha(&mut self, alpha: f64) {
        self.set(Rgba {
            alpha,
            ..self.value
        });
    }

    pub fn update(&mut self, other: &Color) {
        self.set(other.value);
    }

    #[must_use]
    pub fn to_hex(&self) -> String {
        format_hex(self.value)
    }
}

impl Changeable for Color {
    fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    fn notifier_mut(&mut self) -> &mut Notifier {
        &mut self.notifier
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::new(Rgba::rgb(0.0, 0.0, 0.0))
    }
}

impl Clone for Color {
    fn clone(&self) -> Self {
        Self::new(self.value)
    }
}

impl PartialEq for Color {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl From<Rgba> for Color {
    fn from(value: Rgba) -> Self {
        Self::new(value)
    }
}

impl FromStr for Color {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Color").field(&self.to_hex()).finish()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Foreground/background pair used for label chips.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorFgBg {
    pub fg: Rgba,
    pub bg: Rgba,
}

impl ColorFgBg {
    #[must_use]
    pub const fn new(fg: Rgba, bg: Rgba) -> Self {
        Self { fg, bg }
    }
}

/// Parses `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa`; the `#` is optional.
pub fn parse_hex(text: &str) -> PlotResult<Rgba> {
    let digits = text.trim();
    let digits = digits.strip_prefix('#').unwrap_or(digits);
    if !digits.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return Err(invalid_hex(text));
    }

    let channels: Vec<u8> = match digits.len() {
        3 | 4 => digits
            .chars()
            .map(|ch| {
                let nibble = ch.to_digit(16).unwrap_or(0) as u8;
                nibble * 17
            })
            .collect(),
        6 | 8 => (0..digits.len())
            .step_by(2)
            .map(|start| u8::from_str_radix(&digits[start..start + 2], 16))
            .collect::<Result<_, _>>()
            .map_err(|_| invalid_hex(text))?,
        _ => return Err(invalid_hex(text)),
    };

    let channel = |index: usize| f64::from(channels.get(index).copied().unwrap_or(255)) / 255.0;
    Ok(Rgba::rgba(channel(0), channel(1), channel(2), channel(3)))
}

/// Formats as `#rrggbbaa`.
#[must_use]
pub fn format_hex(color: Rgba) -> String {
    let byte = |value: f64| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!(
        "#{:02x}{:02x}{:02x}{:02x}",
        byte(color.red),
        byte(color.green),
        byte(color.blue),
        byte(color.alpha)
    )
}

fn invalid_hex(text: &str) -> PlotError {
    PlotError::InvalidData(format!("`{text}` is not a hex color"))
}
