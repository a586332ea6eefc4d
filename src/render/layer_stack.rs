use serde::{Deserialize, Serialize};

/// Paint layers of one graph, bottom to top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerKind {
    Background,
    Grid,
    Series,
    Axis,
    Ruler,
    Labels,
}

impl LayerKind {
    /// Overlay layers change with the cursor and are composited on a
    /// separate surface from the data layers.
    #[must_use]
    pub const fn is_overlay(self) -> bool {
        matches!(self, Self::Ruler | Self::Labels)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerStack {
    pub layers: Vec<LayerKind>,
}

impl LayerStack {
    #[must_use]
    pub fn canonical() -> Self {
        Self {
            layers: vec![
                LayerKind::Background,
                LayerKind::Grid,
                LayerKind::Series,
                LayerKind::Axis,
                LayerKind::Ruler,
                LayerKind::Labels,
            ],
        }
    }
}

impl Default for LayerStack {
    fn default() -> Self {
        Self::canonical()
    }
}

#[cfg(test)]
mod tests {
    use super::{LayerKind, LayerStack};

    #[test]
    fn overlay_layers_sit_above_data_layers() {
        let stack = LayerStack::canonical();
        let first_overlay = stack
            .layers
            .iter()
            .position(|kind| kind.is_overlay())
            .expect("overlay layer");

        assert_eq!(stack.layers[first_overlay - 1], LayerKind::Axis);
        assert!(stack.layers[first_overlay..].iter().all(|kind| kind.is_overlay()));
        assert_eq!(stack.layers.len() - first_overlay, 2);
    }
}
