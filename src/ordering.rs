//! Filter/Sort Engine
//!
//! Filtering always runs before sorting. Positional orderings are total:
//! a primary key, an explicit tie-break, then the stable input order.

use std::cmp::Ordering;

use crate::config::{ExportConfig, OrderingPolicy};
use crate::model::Layer;

/// Filter then order `artboards` according to `config`. Empty in, empty out.
pub fn filter_sort<'a>(artboards: &'a [Layer], config: &ExportConfig) -> Vec<&'a Layer> {
    let mut kept: Vec<&Layer> = artboards
        .iter()
        .filter(|a| !config.excludes(&a.name))
        .collect();

    let excluded = artboards.len() - kept.len();
    if excluded > 0 {
        tracing::debug!(excluded, prefix = %config.prefix, "Excluded artboards by prefix");
    }

    apply_ordering(&mut kept, config.ordering);
    kept
}

pub fn apply_ordering(artboards: &mut [&Layer], policy: OrderingPolicy) {
    match policy {
        OrderingPolicy::LeftRightTopBottom => artboards.sort_by(|a, b| left_right_top_bottom(a, b)),
        OrderingPolicy::TopBottomLeftRight => artboards.sort_by(|a, b| top_bottom_left_right(a, b)),
        OrderingPolicy::LayerList | OrderingPolicy::Selection => {}
        OrderingPolicy::LayerListReversed => artboards.reverse(),
    }
    tracing::debug!(policy = %policy, count = artboards.len(), "Applied ordering");
}

/// Horizontal position ascending, then vertical.
pub fn left_right_top_bottom(a: &Layer, b: &Layer) -> Ordering {
    a.frame.x.total_cmp(&b.frame.x)
        .then_with(|| a.frame.y.total_cmp(&b.frame.y))
}

/// Vertical position ascending, then horizontal.
pub fn top_bottom_left_right(a: &Layer, b: &Layer) -> Ordering {
    a.frame.y.total_cmp(&b.frame.y)
        .then_with(|| a.frame.x.total_cmp(&b.frame.x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Rect;

    fn board(name: &str, x: f64, y: f64) -> Layer {
        Layer::artboard(name, Rect::new(x, y, 50.0, 50.0))
    }

    fn names(layers: &[&Layer]) -> Vec<String> {
        layers.iter().map(|l| l.name.clone()).collect()
    }

    fn config(ordering: OrderingPolicy) -> ExportConfig {
        ExportConfig { ordering, ..Default::default() }
    }

    #[test]
    fn test_left_right_top_bottom_tie_break() {
        let boards = vec![board("c", 100.0, 0.0), board("b", 0.0, 200.0), board("a", 0.0, 10.0)];
        let sorted = filter_sort(&boards, &config(OrderingPolicy::LeftRightTopBottom));
        assert_eq!(names(&sorted), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_top_bottom_left_right_tie_break() {
        let boards = vec![board("c", 0.0, 100.0), board("b", 300.0, 0.0), board("a", 20.0, 0.0)];
        let sorted = filter_sort(&boards, &config(OrderingPolicy::TopBottomLeftRight));
        assert_eq!(names(&sorted), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_list_orders_ignore_position() {
        let boards = vec![board("first", 500.0, 0.0), board("second", 0.0, 0.0)];
        assert_eq!(names(&filter_sort(&boards, &config(OrderingPolicy::LayerList))), vec!["first", "second"]);
        assert_eq!(names(&filter_sort(&boards, &config(OrderingPolicy::Selection))), vec!["first", "second"]);
        assert_eq!(
            names(&filter_sort(&boards, &config(OrderingPolicy::LayerListReversed))),
            vec!["second", "first"]
        );
    }

    #[test]
    fn test_prefix_filter() {
        let boards = vec![board("-draft", 0.0, 0.0), board("final", 10.0, 0.0)];
        let sorted = filter_sort(&boards, &ExportConfig::default());
        assert_eq!(names(&sorted), vec!["final"]);

        let keep_all = ExportConfig { exclude_with_prefix: false, ..Default::default() };
        assert_eq!(filter_sort(&boards, &keep_all).len(), 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(filter_sort(&[], &ExportConfig::default()).is_empty());
    }
}
