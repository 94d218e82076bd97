//! Document Model - Pages, Layers, Artboards
//!
//! Layer classes are a closed set. Every component matches on `LayerKind`
//! exhaustively instead of asking a layer what class it belongs to.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type LayerId = String;
pub type PageId = String;
pub type SymbolId = String;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Same size, anchored at the origin.
    pub fn bounds(&self) -> Self {
        Self::new(0.0, 0.0, self.width, self.height)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Finite position and a finite, non-negative size.
    pub fn is_well_formed(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width >= 0.0
            && self.height >= 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    #[serde(default = "default_alpha")]
    pub alpha: f64,
}

fn default_alpha() -> f64 { 1.0 }

impl Color {
    pub const WHITE: Color = Color { red: 1.0, green: 1.0, blue: 1.0, alpha: 1.0 };
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Background {
    pub color: Color,
    #[serde(default = "default_true")]
    pub include_in_export: bool,
}

fn default_true() -> bool { true }

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LayerKind {
    Artboard,
    /// Definition of a reusable component.
    #[serde(rename_all = "camelCase")]
    ComponentMaster { symbol_id: SymbolId },
    /// Linked instance of a component definition.
    #[serde(rename_all = "camelCase")]
    ComponentInstance { symbol_id: SymbolId },
    Group,
    Shape {
        #[serde(default)]
        fill: Option<Color>,
    },
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    pub kind: LayerKind,
    pub frame: Rect,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<Background>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<LayerId>,
    #[serde(default)]
    pub children: Vec<Layer>,
}

impl Layer {
    pub fn new(name: impl Into<String>, kind: LayerKind, frame: Rect) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            kind,
            frame,
            background: None,
            source_id: None,
            children: vec![],
        }
    }

    pub fn artboard(name: impl Into<String>, frame: Rect) -> Self {
        Self::new(name, LayerKind::Artboard, frame)
    }

    pub fn with_children(mut self, children: Vec<Layer>) -> Self {
        self.children = children;
        self
    }

    pub fn with_background(mut self, background: Background) -> Self {
        self.background = Some(background);
        self
    }

    pub fn is_artboard(&self) -> bool {
        matches!(self.kind, LayerKind::Artboard)
    }

    /// Artboards and component masters can both stand alone as an exported surface.
    pub fn is_artboard_shaped(&self) -> bool {
        match self.kind {
            LayerKind::Artboard | LayerKind::ComponentMaster { .. } => true,
            LayerKind::ComponentInstance { .. }
            | LayerKind::Group
            | LayerKind::Shape { .. }
            | LayerKind::Other => false,
        }
    }

    pub fn is_symbol_instance(&self) -> bool {
        matches!(self.kind, LayerKind::ComponentInstance { .. })
    }

    /// Independent copy with a fresh identity. The original is untouched.
    pub fn duplicate(&self) -> Self {
        let mut copy = self.clone();
        copy.source_id = Some(self.source_id.clone().unwrap_or_else(|| self.id.clone()));
        copy.id = new_id();
        copy
    }

    /// Depth-first search of this layer and its descendants.
    pub fn find(&self, id: &str) -> Option<&Layer> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    /// Number of nodes in this subtree matching `predicate`.
    pub fn count_where(&self, predicate: &impl Fn(&Layer) -> bool) -> usize {
        let own = usize::from(predicate(self));
        own + self.children.iter().map(|c| c.count_where(predicate)).sum::<usize>()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: PageId,
    pub name: String,
    #[serde(default)]
    pub layers: Vec<Layer>,
}

impl Page {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            layers: vec![],
        }
    }

    pub fn with_layers(mut self, layers: Vec<Layer>) -> Self {
        self.layers = layers;
        self
    }

    /// Top-level artboard-shaped layers in layer-list order.
    pub fn artboards(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter().filter(|l| l.is_artboard_shaped())
    }

    pub fn find_layer(&self, id: &str) -> Option<&Layer> {
        self.layers.iter().find_map(|layer| layer.find(id))
    }
}

pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_gets_fresh_id() {
        let original = Layer::artboard("Home", Rect::new(0.0, 0.0, 10.0, 10.0));
        let copy = original.duplicate();
        assert_ne!(copy.id, original.id);
        assert_eq!(copy.source_id.as_deref(), Some(original.id.as_str()));

        let second = copy.duplicate();
        assert_eq!(second.source_id.as_deref(), Some(original.id.as_str()));
    }

    #[test]
    fn test_rect_well_formed() {
        assert!(Rect::new(-10.0, 5.0, 0.0, 20.0).is_well_formed());
        assert!(!Rect::new(0.0, 0.0, -1.0, 20.0).is_well_formed());
        assert!(!Rect::new(0.0, 0.0, 10.0, f64::NAN).is_well_formed());
        assert!(!Rect::new(f64::INFINITY, 0.0, 10.0, 10.0).is_well_formed());
    }

    #[test]
    fn test_page_artboards_skip_loose_layers() {
        let page = Page::new("Page 1").with_layers(vec![
            Layer::artboard("A", Rect::default()),
            Layer::new("loose", LayerKind::Group, Rect::default()),
            Layer::new("Button", LayerKind::ComponentMaster { symbol_id: "btn".into() }, Rect::default()),
        ]);
        let names: Vec<_> = page.artboards().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["A", "Button"]);
    }

    #[test]
    fn test_layer_kind_json_shape() {
        let json = r#"{"id":"1","name":"i","kind":{"type":"componentInstance","symbolId":"s"},"frame":{"x":0,"y":0,"width":1,"height":1}}"#;
        let layer: Layer = serde_json::from_str(json).unwrap();
        assert_eq!(layer.kind, LayerKind::ComponentInstance { symbol_id: "s".into() });
        assert!(layer.children.is_empty());
    }
}
