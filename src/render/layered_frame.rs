use crate::core::Viewport;

use super::{LayerKind, LayerStack, Primitive, RenderFrame};

#[derive(Debug, Clone, PartialEq)]
pub struct LayerPrimitives {
    pub kind: LayerKind,
    pub primitives: Vec<Primitive>,
}

/// Display list split by paint layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LayeredRenderFrame {
    pub viewport: Viewport,
    pub layers: Vec<LayerPrimitives>,
}

impl LayeredRenderFrame {
    #[must_use]
    pub fn from_stack(viewport: Viewport, stack: &LayerStack) -> Self {
        let layers = stack
            .layers
            .iter()
            .map(|kind| LayerPrimitives {
                kind: *kind,
                primitives: Vec::new(),
            })
            .collect();
        Self { viewport, layers }
    }

    #[must_use]
    pub fn canonical(viewport: Viewport) -> Self {
        Self::from_stack(viewport, &LayerStack::canonical())
    }

    /// Pushes onto `kind`; primitives for a layer missing from the stack are dropped.
    pub fn push(&mut self, kind: LayerKind, primitive: impl Into<Primitive>) {
        if let Some(layer) = self.layer_mut(kind) {
            layer.primitives.push(primitive.into());
        }
    }

    pub fn extend(&mut self, kind: LayerKind, primitives: impl IntoIterator<Item = Primitive>) {
        if let Some(layer) = self.layer_mut(kind) {
            layer.primitives.extend(primitives);
        }
    }

    #[must_use]
    pub fn layer(&self, kind: LayerKind) -> Option<&LayerPrimitives> {
        self.layers.iter().find(|layer| layer.kind == kind)
    }

    #[must_use]
    pub fn flatten(&self) -> RenderFrame {
        self.flatten_where(|_| true)
    }

    #[must_use]
    pub fn flatten_data(&self) -> RenderFrame {
        self.flatten_where(|kind| !kind.is_overlay())
    }

    #[must_use]
    pub fn flatten_overlay(&self) -> RenderFrame {
        self.flatten_where(LayerKind::is_overlay)
    }

    fn flatten_where(&self, include: impl Fn(LayerKind) -> bool) -> RenderFrame {
        let mut frame = RenderFrame::new(self.viewport);
        for layer in &self.layers {
            if include(layer.kind) {
                frame.extend(layer.primitives.iter().cloned());
            }
        }
        frame
    }

    fn layer_mut(&mut self, kind: LayerKind) -> Option<&mut LayerPrimitives> {
        self.layers.iter_mut().find(|layer| layer.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::LayeredRenderFrame;
    use crate::core::Viewport;
    use crate::render::{LayerKind, LinePrimitive, Primitive, Rgba};

    #[test]
    fn flatten_follows_layer_order_not_push_order() {
        let mut layered = LayeredRenderFrame::canonical(Viewport::new(100, 50));

        layered.push(
            LayerKind::Series,
            LinePrimitive::new(0.0, 2.0, 5.0, 3.0, 1.0, Rgba::rgb(0.8, 0.2, 0.2)),
        );
        layered.push(
            LayerKind::Grid,
            LinePrimitive::new(0.0, 1.0, 5.0, 1.0, 1.0, Rgba::gray(0.95)),
        );
        layered.push(
            LayerKind::Ruler,
            LinePrimitive::new(3.0, 0.0, 3.0, 50.0, 1.0, Rgba::gray(0.5)),
        );

        let flattened = layered.flatten();
        let ys: Vec<f64> = flattened
            .primitives
            .iter()
            .filter_map(|primitive| match primitive {
                Primitive::Line(line) => Some(line.y1),
                _ => None,
            })
            .collect();
        assert_eq!(ys, vec![1.0, 2.0, 0.0]);

        assert_eq!(layered.flatten_data().len(), 2);
        assert_eq!(layered.flatten_overlay().len(), 1);
    }
}
