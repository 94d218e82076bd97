//! Property Tests - ordering, sanitizing and layout hold for arbitrary input

use proptest::prelude::*;

use pdfexport_core::{
    config::{ExportConfig, OrderingPolicy},
    layout::lay_out,
    model::{Layer, Rect},
    ordering::filter_sort,
    sanitize::{sanitize, DISALLOWED_CHARS},
};

fn artboard() -> impl Strategy<Value = Layer> {
    ("[-a-z]{0,6}", -50i32..50, -50i32..50, 0u16..400).prop_map(|(name, x, y, w)| {
        Layer::artboard(name, Rect::new(f64::from(x) * 10.0, f64::from(y) * 10.0, f64::from(w), 100.0))
    })
}

proptest! {
    #[test]
    fn excluded_prefix_never_survives(boards in prop::collection::vec(artboard(), 0..20)) {
        let config = ExportConfig::default();
        let kept = filter_sort(&boards, &config);
        prop_assert!(kept.iter().all(|a| !a.name.starts_with(&config.prefix)));
    }

    #[test]
    fn left_right_top_bottom_is_sorted(boards in prop::collection::vec(artboard(), 0..20)) {
        let config = ExportConfig {
            exclude_with_prefix: false,
            ordering: OrderingPolicy::LeftRightTopBottom,
            ..Default::default()
        };
        let sorted = filter_sort(&boards, &config);
        prop_assert_eq!(sorted.len(), boards.len());
        for pair in sorted.windows(2) {
            let (a, b) = (&pair[0].frame, &pair[1].frame);
            prop_assert!(a.x < b.x || (a.x == b.x && a.y <= b.y));
        }
    }

    #[test]
    fn top_bottom_left_right_is_sorted(boards in prop::collection::vec(artboard(), 0..20)) {
        let config = ExportConfig {
            exclude_with_prefix: false,
            ordering: OrderingPolicy::TopBottomLeftRight,
            ..Default::default()
        };
        let sorted = filter_sort(&boards, &config);
        for pair in sorted.windows(2) {
            let (a, b) = (&pair[0].frame, &pair[1].frame);
            prop_assert!(a.y < b.y || (a.y == b.y && a.x <= b.x));
        }
    }

    #[test]
    fn sanitize_is_idempotent_and_clean(name in ".{0,40}") {
        let once = sanitize(&name);
        prop_assert_eq!(sanitize(&once), once.clone());
        prop_assert!(!once.chars().any(|c| DISALLOWED_CHARS.contains(c)));
    }

    #[test]
    fn laid_out_artboards_never_overlap(boards in prop::collection::vec(artboard(), 0..20)) {
        let mut laid_out = boards.clone();
        lay_out(laid_out.iter_mut());

        let names: Vec<_> = laid_out.iter().map(|l| l.name.clone()).collect();
        let original: Vec<_> = boards.iter().map(|l| l.name.clone()).collect();
        prop_assert_eq!(names, original);

        for pair in laid_out.windows(2) {
            prop_assert!(pair[0].frame.right() < pair[1].frame.x);
            prop_assert_eq!(pair[1].frame.y, 0.0);
        }
    }
}
