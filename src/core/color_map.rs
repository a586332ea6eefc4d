use crate::error::{PlotError, PlotResult};
use crate::render::Rgba;

const DEFAULT_PALETTE: [Rgba; 9] = [
    Rgba::rgb(0.1647, 0.3431, 0.5863),
    Rgba::rgb(0.3784, 0.7137, 0.0549),
    Rgba::rgb(0.7216, 0.0, 0.0),
    Rgba::rgb(0.4098, 0.2608, 0.4412),
    Rgba::rgb(0.8490, 0.7294, 0.0),
    Rgba::rgb(0.8843, 0.4176, 0.0),
    Rgba::rgb(0.6588, 0.4196, 0.0373),
    Rgba::rgb(0.7784, 0.7922, 0.7627),
    Rgba::rgb(0.2569, 0.2725, 0.2686),
];

/// Fixed palette indexed cyclically.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMap {
    colors: Vec<Rgba>,
}

impl ColorMap {
    pub fn new(colors: Vec<Rgba>) -> PlotResult<Self> {
        if colors.is_empty() {
            return Err(PlotError::InvalidData(
                "color map needs at least one color".to_owned(),
            ));
        }
        for color in &colors {
            color.validate()?;
        }
        Ok(Self { colors })
    }

    /// Wraps in both directions: `-1` is the last color.
    #[must_use]
    pub fn get(&self, index: isize) -> Rgba {
        let len = self.colors.len() as isize;
        self.colors[index.rem_euclid(len) as usize]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    #[must_use]
    pub fn colors(&self) -> &[Rgba] {
        &self.colors
    }
}

impl Default for ColorMap {
    fn default() -> Self {
        Self {
            colors: DEFAULT_PALETTE.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ColorMap;

    #[test]
    fn indices_wrap_both_ways() {
        let map = ColorMap::default();
        assert_eq!(map.len(), 9);
        assert_eq!(map.get(9), map.get(0));
        assert_eq!(map.get(-1), map.get(8));
        assert_eq!(map.get(-10), map.get(8));
    }

    #[test]
    fn empty_palette_is_rejected() {
        assert!(ColorMap::new(Vec::new()).is_err());
    }
}
