//! Layout Compositor - single left-to-right strip

use crate::model::Layer;

/// Gap between neighbouring artboards.
pub const ARTBOARD_SPACING: f64 = 1.0;

/// Running cursor for placing artboards along the strip.
#[derive(Debug, Clone, Copy, Default)]
pub struct StripLayout {
    cursor: f64,
}

impl StripLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move an artboard to the cursor and advance past it. Anything that
    /// is not an artboard keeps the position copying gave it.
    pub fn place(&mut self, layer: &mut Layer) -> bool {
        if !layer.is_artboard() {
            return false;
        }
        layer.frame.x = self.cursor;
        layer.frame.y = 0.0;
        self.cursor += layer.frame.width + ARTBOARD_SPACING;
        true
    }

    /// Total strip width consumed so far, including the trailing gap.
    pub fn extent(&self) -> f64 {
        self.cursor
    }
}

/// Lay out `layers` in order. Returns how many were repositioned.
pub fn lay_out<'a>(layers: impl IntoIterator<Item = &'a mut Layer>) -> usize {
    let mut strip = StripLayout::new();
    let mut placed = 0;
    for layer in layers {
        if strip.place(layer) {
            placed += 1;
        }
    }
    tracing::debug!(placed, width = strip.extent(), "Laid out artboards");
    placed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LayerKind, Rect};

    #[test]
    fn test_strip_positions() {
        let mut layers = vec![
            Layer::artboard("a", Rect::new(0.0, 0.0, 50.0, 80.0)),
            Layer::artboard("b", Rect::new(100.0, 40.0, 50.0, 20.0)),
            Layer::artboard("c", Rect::new(-300.0, 900.0, 10.0, 10.0)),
        ];

        assert_eq!(lay_out(layers.iter_mut()), 3);

        let xs: Vec<_> = layers.iter().map(|l| l.frame.x).collect();
        assert_eq!(xs, vec![0.0, 51.0, 102.0]);
        assert!(layers.iter().all(|l| l.frame.y == 0.0));
    }

    #[test]
    fn test_non_artboards_left_in_place() {
        let mut layers = vec![
            Layer::new("detached", LayerKind::Group, Rect::new(7.0, 9.0, 30.0, 30.0)),
            Layer::artboard("a", Rect::new(100.0, 100.0, 50.0, 50.0)),
        ];

        assert_eq!(lay_out(layers.iter_mut()), 1);
        assert_eq!(layers[0].frame, Rect::new(7.0, 9.0, 30.0, 30.0));
        assert_eq!(layers[1].frame, Rect::new(0.0, 0.0, 50.0, 50.0));
    }

    #[test]
    fn test_empty() {
        assert_eq!(lay_out(Vec::<Layer>::new().iter_mut()), 0);
    }
}
