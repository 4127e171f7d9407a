//! Property tests for list-pipeline invariants.
//!
//! Uses proptest to verify:
//! 1. Pagination loses nothing: the pages concatenate back to the input
//! 2. The page strip is ordered, bounded and always shows current, first and last
//! 3. Sorting is stable, idempotent and puts missing values last
//! 4. Missing-value classification for strings

use proptest::prelude::*;
use serde_json::{json, Value};
use tradegrid_core::missing::is_missing;
use tradegrid_core::paginate::{visible_pages, PageItem, Paginator};
use tradegrid_core::sort::{sorted, SortDirection, SortRegistry, SortSpec};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_volume() -> impl Strategy<Value = Value> {
    prop_oneof![
        3 => (0i64..8).prop_map(|v| json!(v)),
        1 => Just(Value::Null),
        1 => Just(json!("N/A")),
        1 => Just(json!("  ")),
    ]
}

fn arb_rows() -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec(arb_volume(), 0..60).prop_map(|volumes| {
        volumes
            .into_iter()
            .enumerate()
            .map(|(seq, volume)| json!({"seq": seq, "volume": volume}))
            .collect()
    })
}

fn arb_direction() -> impl Strategy<Value = SortDirection> {
    prop_oneof![Just(SortDirection::Asc), Just(SortDirection::Desc)]
}

fn volume_of(row: &Value) -> Option<i64> {
    row["volume"].as_i64()
}

fn seq_of(row: &Value) -> u64 {
    row["seq"].as_u64().unwrap()
}

// ── 1. Pagination ────────────────────────────────────────────────────

proptest! {
    #[test]
    fn pages_concatenate_to_input(total in 0usize..300, per_page in 1usize..40) {
        let items: Vec<usize> = (0..total).collect();
        let mut pager = Paginator::new(total, per_page).unwrap();
        let mut seen = Vec::new();
        loop {
            let page = pager.slice(&items);
            prop_assert!(page.len() <= per_page);
            seen.extend_from_slice(page);
            if !pager.next() {
                break;
            }
        }
        prop_assert_eq!(seen, items);
    }

    #[test]
    fn current_page_is_always_clamped(total in 0usize..300, per_page in 1usize..40, requested in 0usize..100) {
        let pager = Paginator::new(total, per_page).unwrap().with_current_page(requested);
        prop_assert!(pager.current_page() >= 1);
        prop_assert!(pager.current_page() <= pager.total_pages().max(1));
    }
}

// ── 2. Page strip ────────────────────────────────────────────────────

proptest! {
    #[test]
    fn strip_is_well_formed(total in 1usize..200, max in 1usize..12, current_seed in 0usize..200) {
        let current = current_seed % total + 1;
        let strip = visible_pages(current, total, max);

        let pages: Vec<usize> = strip
            .iter()
            .filter_map(|item| match item {
                PageItem::Page(n) => Some(*n),
                PageItem::Ellipsis => None,
            })
            .collect();

        prop_assert!(pages.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(pages.contains(&current));
        prop_assert_eq!(pages.first().copied(), Some(1));
        prop_assert_eq!(pages.last().copied(), Some(total));
        prop_assert!(pages.len() >= max.min(total));
        prop_assert!(pages.len() <= max + 2);

        // An ellipsis always stands for at least one hidden page.
        for (i, item) in strip.iter().enumerate() {
            if *item == PageItem::Ellipsis {
                let (PageItem::Page(before), PageItem::Page(after)) = (strip[i - 1], strip[i + 1]) else {
                    panic!("ellipsis must sit between page numbers");
                };
                prop_assert!(after - before > 1);
            }
        }
    }
}

// ── 3. Sorting ───────────────────────────────────────────────────────

proptest! {
    #[test]
    fn sort_is_stable_with_missing_last(rows in arb_rows(), direction in arb_direction()) {
        let registry = SortRegistry::standard();
        let spec = SortSpec::new("volume", direction);
        let out = sorted(&rows, &spec, &registry);
        prop_assert_eq!(out.len(), rows.len());

        let first_missing = out.iter().position(|r| volume_of(r).is_none()).unwrap_or(out.len());
        prop_assert!(out[first_missing..].iter().all(|r| volume_of(r).is_none()));

        for pair in out[..first_missing].windows(2) {
            let (a, b) = (volume_of(&pair[0]).unwrap(), volume_of(&pair[1]).unwrap());
            match direction {
                SortDirection::Asc => prop_assert!(a <= b),
                SortDirection::Desc => prop_assert!(a >= b),
            }
            if a == b {
                prop_assert!(seq_of(&pair[0]) < seq_of(&pair[1]));
            }
        }
        for pair in out[first_missing..].windows(2) {
            prop_assert!(seq_of(&pair[0]) < seq_of(&pair[1]));
        }
    }

    #[test]
    fn sort_is_idempotent(rows in arb_rows(), direction in arb_direction()) {
        let registry = SortRegistry::standard();
        let spec = SortSpec::new("volume", direction);
        let once = sorted(&rows, &spec, &registry);
        let twice = sorted(&once, &spec, &registry);
        prop_assert_eq!(once, twice);
    }
}

// ── 4. Missing values ────────────────────────────────────────────────

proptest! {
    #[test]
    fn string_missingness(s in "[ a-zA-Z/0-9]{0,6}") {
        let expected = s.trim().is_empty() || s == "N/A" || s == "n/a";
        prop_assert_eq!(is_missing(&json!(s)), expected);
        prop_assert_eq!(is_missing(s.as_str()), expected);
    }

    #[test]
    fn numbers_are_never_missing(n in any::<i64>()) {
        prop_assert!(!is_missing(&json!(n)));
    }
}
