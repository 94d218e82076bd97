//! Reference Detacher
//!
//! Replaces every component instance in a copied layer tree with an
//! editable group holding the component's resolved content, including
//! instances nested inside other instances.

use thiserror::Error;

use crate::host::SymbolLibrary;
use crate::model::{new_id, Layer, LayerKind, SymbolId};

/// Instances expanded inside other instances beyond this count are treated
/// as a component that contains itself. Plain tree depth is not limited.
pub const MAX_DETACH_DEPTH: usize = 64;

#[derive(Debug, Error)]
pub enum DetachError {
    #[error("Layer '{layer}' references unknown symbol {symbol_id}")]
    UnknownSymbol { layer: String, symbol_id: SymbolId },

    #[error("Layer '{layer}' nests symbols deeper than {max} levels")]
    DepthExceeded { layer: String, max: usize },
}

/// Flatten `root` in place. Returns the number of instances detached.
///
/// Uses an explicit worklist, so arbitrarily deep trees do not grow the
/// call stack.
pub fn detach_symbols(root: &mut Layer, library: &dyn SymbolLibrary) -> Result<usize, DetachError> {
    let mut detached = 0;
    // Each entry carries how many instance expansions enclose it.
    let mut worklist: Vec<(&mut Layer, usize)> = vec![(root, 0)];

    while let Some((node, mut expansions)) = worklist.pop() {
        if let LayerKind::ComponentInstance { symbol_id } = &node.kind {
            if expansions >= MAX_DETACH_DEPTH {
                return Err(DetachError::DepthExceeded {
                    layer: node.name.clone(),
                    max: MAX_DETACH_DEPTH,
                });
            }
            let group = detach_by_replacing_with_group(node, symbol_id, library)?;
            *node = group;
            detached += 1;
            expansions += 1;
        }

        for child in node.children.iter_mut() {
            worklist.push((child, expansions));
        }
    }

    Ok(detached)
}

fn detach_by_replacing_with_group(
    instance: &Layer,
    symbol_id: &SymbolId,
    library: &dyn SymbolLibrary,
) -> Result<Layer, DetachError> {
    let master = library.master(symbol_id).ok_or_else(|| DetachError::UnknownSymbol {
        layer: instance.name.clone(),
        symbol_id: symbol_id.clone(),
    })?;

    Ok(Layer {
        id: new_id(),
        name: instance.name.clone(),
        kind: LayerKind::Group,
        frame: instance.frame,
        background: None,
        source_id: Some(instance.id.clone()),
        children: master.children.iter().map(fresh_tree).collect(),
    })
}

// Resolved content is shared by every instance of a symbol; each copy needs its own ids.
fn fresh_tree(layer: &Layer) -> Layer {
    let mut copy = layer.duplicate();
    copy.children = layer.children.iter().map(fresh_tree).collect();
    copy
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Rect;
    use std::collections::HashMap;

    struct Library(HashMap<SymbolId, Layer>);

    impl SymbolLibrary for Library {
        fn master(&self, symbol_id: &SymbolId) -> Option<&Layer> {
            self.0.get(symbol_id)
        }
    }

    fn master(symbol_id: &str, children: Vec<Layer>) -> Layer {
        Layer::new(symbol_id, LayerKind::ComponentMaster { symbol_id: symbol_id.into() }, Rect::new(0.0, 0.0, 20.0, 20.0))
            .with_children(children)
    }

    fn instance(symbol_id: &str) -> Layer {
        Layer::new(
            format!("{symbol_id} instance"),
            LayerKind::ComponentInstance { symbol_id: symbol_id.into() },
            Rect::new(5.0, 5.0, 20.0, 20.0),
        )
    }

    fn shape(name: &str) -> Layer {
        Layer::new(name, LayerKind::Shape { fill: None }, Rect::new(0.0, 0.0, 4.0, 4.0))
    }

    fn library(masters: Vec<Layer>) -> Library {
        Library(
            masters
                .into_iter()
                .map(|m| match &m.kind {
                    LayerKind::ComponentMaster { symbol_id } => (symbol_id.clone(), m.clone()),
                    _ => unreachable!(),
                })
                .collect(),
        )
    }

    #[test]
    fn test_instance_becomes_group() {
        let lib = library(vec![master("icon", vec![shape("glyph")])]);
        let mut root = instance("icon");
        let original_id = root.id.clone();

        let count = detach_symbols(&mut root, &lib).unwrap();

        assert_eq!(count, 1);
        assert_eq!(root.kind, LayerKind::Group);
        assert_eq!(root.frame, Rect::new(5.0, 5.0, 20.0, 20.0));
        assert_eq!(root.source_id, Some(original_id));
        assert_eq!(root.children[0].name, "glyph");
    }

    #[test]
    fn test_nested_instances_flattened() {
        let lib = library(vec![
            master("leaf", vec![shape("dot")]),
            master("middle", vec![instance("leaf"), shape("bar")]),
            master("outer", vec![Layer::new("g", LayerKind::Group, Rect::default()).with_children(vec![instance("middle")])]),
        ]);
        let mut board = Layer::artboard("Board", Rect::new(0.0, 0.0, 100.0, 100.0))
            .with_children(vec![instance("outer"), instance("leaf")]);

        let count = detach_symbols(&mut board, &lib).unwrap();

        assert_eq!(count, 4);
        assert_eq!(board.count_where(&|l| l.is_symbol_instance()), 0);
        assert_eq!(board.count_where(&|l| l.name == "dot"), 2);
    }

    #[test]
    fn test_shared_content_gets_distinct_ids() {
        let lib = library(vec![master("icon", vec![shape("glyph")])]);
        let mut board = Layer::artboard("Board", Rect::default()).with_children(vec![instance("icon"), instance("icon")]);

        detach_symbols(&mut board, &lib).unwrap();

        let first = &board.children[0].children[0];
        let second = &board.children[1].children[0];
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_unknown_symbol() {
        let lib = library(vec![]);
        let mut root = instance("missing");
        let err = detach_symbols(&mut root, &lib).unwrap_err();
        assert!(matches!(err, DetachError::UnknownSymbol { .. }));
    }

    #[test]
    fn test_self_containing_symbol_hits_depth_guard() {
        let lib = library(vec![master("loop", vec![instance("loop")])]);
        let mut root = instance("loop");
        let err = detach_symbols(&mut root, &lib).unwrap_err();
        assert!(matches!(err, DetachError::DepthExceeded { max: MAX_DETACH_DEPTH, .. }));
    }

    #[test]
    fn test_deep_plain_tree_is_not_a_cycle() {
        let lib = library(vec![]);
        let mut board = Layer::artboard("Board", Rect::default());
        let mut tip = &mut board;
        for level in 0..(MAX_DETACH_DEPTH * 2) {
            tip.children.push(Layer::new(format!("g{level}"), LayerKind::Group, Rect::default()));
            tip = &mut tip.children[0];
        }

        assert_eq!(detach_symbols(&mut board, &lib).unwrap(), 0);
    }

    #[test]
    fn test_instance_below_deep_groups_is_detached() {
        let lib = library(vec![master("icon", vec![shape("glyph")])]);
        let mut board = Layer::artboard("Board", Rect::default());
        let mut tip = &mut board;
        for level in 0..(MAX_DETACH_DEPTH + 10) {
            tip.children.push(Layer::new(format!("g{level}"), LayerKind::Group, Rect::default()));
            tip = &mut tip.children[0];
        }
        tip.children.push(instance("icon"));

        assert_eq!(detach_symbols(&mut board, &lib).unwrap(), 1);
        assert_eq!(board.count_where(&|l| l.is_symbol_instance()), 0);
    }

    #[test]
    fn test_plain_tree_untouched() {
        let lib = library(vec![]);
        let mut board = Layer::artboard("Board", Rect::default()).with_children(vec![shape("a"), shape("b")]);
        let before = board.clone();
        assert_eq!(detach_symbols(&mut board, &lib).unwrap(), 0);
        assert_eq!(board, before);
    }
}
