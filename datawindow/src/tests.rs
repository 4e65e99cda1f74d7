use crate::table::{
    ColumnDef, SortDirection, TableState, grid_item_range, grid_row_count, sort_order_by,
    sorted_order,
};
use crate::*;

use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        // Deterministic, dependency-free PRNG for tests.
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 11
    }

    fn gen_range(&mut self, start: u64, end_exclusive: u64) -> u64 {
        debug_assert!(start < end_exclusive);
        start + (self.next_u64() % (end_exclusive - start))
    }

    fn gen_usize(&mut self, start: usize, end_exclusive: usize) -> usize {
        self.gen_range(start as u64, end_exclusive as u64) as usize
    }

    fn gen_bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

fn key(s: &str) -> ItemKey {
    Arc::from(s)
}

fn keys(ks: &[&str]) -> KeySet {
    ks.iter().map(|k| key(k)).collect()
}

fn order_of(ks: &[Option<&str>]) -> Vec<Option<ItemKey>> {
    ks.iter().map(|k| k.map(key)).collect()
}

fn letters(ks: &[&'static str]) -> Dataset<&'static str> {
    Dataset::from_normalized(&Normalizer::new(|s: &&'static str| *s), ks.iter().copied())
}

#[derive(Clone, Debug, PartialEq)]
struct User {
    id: u32,
    name: String,
}

#[derive(Clone, Debug, PartialEq)]
struct Row {
    label: String,
}

fn users(start: u32, n: u32) -> Vec<User> {
    (start..start + n)
        .map(|id| User {
            id,
            name: alloc::format!("user-{id}"),
        })
        .collect()
}

fn user_rows() -> Normalizer<User, Row> {
    Normalizer::with_mapper(
        |u: &User| u.id,
        |u: User| Row {
            label: u.name.to_uppercase(),
        },
    )
}

// --- geometry ---

#[test]
fn fixed_size_start_index_and_total() {
    let g = Geometry::new(GeometryOptions::fixed(100, 10).with_overscan(2));
    assert_eq!(g.total_size(), 1_000);

    let items = g.virtual_items(55, 30);
    let indexes: Vec<usize> = items.iter().map(|it| it.index).collect();
    // visible 5..=8, plus two overscan items each side
    assert_eq!(indexes, (3..=10).collect::<Vec<_>>());
    assert_eq!(items[0].start, 30);
    assert!(items.iter().all(|it| it.size == 10));
}

#[test]
fn empty_collection_renders_nothing() {
    let g = Geometry::new(GeometryOptions::new(0, |_| 10));
    assert!(g.virtual_items(0, 100).is_empty());
    assert_eq!(g.total_size(), 0);
    assert_eq!(g.index_at_offset(0), None);
}

#[test]
fn overscrolled_offset_clamps_to_last_item() {
    let g = Geometry::new(GeometryOptions::fixed(10, 10).with_overscan(1));
    let items = g.virtual_items(10_000, 50);
    let indexes: Vec<usize> = items.iter().map(|it| it.index).collect();
    assert_eq!(indexes, [8, 9]);

    let g = Geometry::new(GeometryOptions::new(10, |_| 10).with_overscan(0));
    let items = g.virtual_items(10_000, 50);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].index, 9);
}

#[test]
fn measurements_replace_estimates() {
    let mut g = Geometry::new(GeometryOptions::new(10, |_| 10).with_overscan(0));
    assert_eq!(g.total_size(), 100);

    g.measure(0, 30);
    assert!(g.is_measured(0));
    assert!(!g.is_measured(1));
    assert_eq!(g.total_size(), 30 + 9 * 10);

    let items = g.virtual_items(25, 10);
    assert_eq!(items.len(), 2);
    assert_eq!((items[0].index, items[0].start, items[0].size), (0, 0, 30));
    assert!(items[0].measured);
    assert_eq!((items[1].index, items[1].start, items[1].end()), (1, 30, 40));
    assert!(!items[1].measured);
}

#[test]
fn total_size_uses_first_estimate_for_unmeasured_items() {
    let mut g = Geometry::new(GeometryOptions::new(4, |i| if i == 0 { 20 } else { 5 }));
    g.measure(1, 7);
    assert_eq!(g.total_size(), 7 + 3 * 20);
}

#[test]
fn remeasuring_same_size_keeps_total_cache() {
    let mut g = Geometry::new(GeometryOptions::new(20, |_| 10));
    g.measure(5, 40);
    let generation = g.cache_generation();
    let total = g.total_size();

    g.measure(5, 40);
    assert_eq!(g.cache_generation(), generation);
    assert_eq!(g.total_size(), total);

    g.measure(5, 41);
    assert_eq!(g.cache_generation(), generation + 1);
    assert_eq!(g.total_size(), total + 1);
}

#[test]
fn measuring_out_of_range_is_ignored() {
    let mut g = Geometry::new(GeometryOptions::new(3, |_| 10));
    let generation = g.cache_generation();
    g.measure(3, 99);
    assert_eq!(g.cache_generation(), generation);
    assert_eq!(g.total_size(), 30);
}

#[test]
fn set_options_swaps_count_and_keeps_surviving_measurements() {
    let mut g = Geometry::new(GeometryOptions::new(5, |_| 10));
    g.measure(1, 50);
    g.measure(4, 50);
    let generation = g.cache_generation();

    g.update_options(|o| o.count = 3);
    assert!(g.cache_generation() > generation);
    assert!(g.is_measured(1));
    assert!(!g.is_measured(4));
    assert_eq!(g.total_size(), 50 + 2 * 10);

    g.set_count(6);
    assert_eq!(g.total_size(), 50 + 5 * 10);

    g.set_options(GeometryOptions::fixed(6, 4));
    assert!(g.is_fixed_size());
    assert_eq!(g.total_size(), 24);
    assert_eq!(g.item_start(5), Some(20));
}

#[test]
fn reset_measurements_restores_estimates() {
    let mut g = Geometry::new(GeometryOptions::new(4, |_| 10));
    g.measure_many([(0, 1), (1, 2), (9, 3)]);
    assert_eq!(g.total_size(), 1 + 2 + 2 * 10);
    g.reset_measurements();
    assert!(!g.is_measured(0));
    assert_eq!(g.total_size(), 40);
}

#[test]
fn on_change_fires_and_batches() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut g = Geometry::new(GeometryOptions::new(10, |_| 10).with_on_change(Some({
        let calls = Arc::clone(&calls);
        move |_: &Geometry| {
            calls.fetch_add(1, Ordering::Relaxed);
        }
    })));

    g.measure(0, 11);
    assert_eq!(calls.load(Ordering::Relaxed), 1);

    // unchanged size: no transition
    g.measure(0, 11);
    assert_eq!(calls.load(Ordering::Relaxed), 1);

    g.batch_update(|g| {
        g.measure(1, 12);
        g.measure(2, 13);
        g.set_count(20);
    });
    assert_eq!(calls.load(Ordering::Relaxed), 2);
}

#[test]
fn offset_lookups_match_item_bounds() {
    let mut g = Geometry::new(GeometryOptions::new(5, |_| 10));
    g.measure(2, 25);
    assert_eq!(g.item_start(3), Some(45));
    assert_eq!(g.item_size(2), Some(25));
    assert_eq!(g.index_at_offset(44), Some(2));
    assert_eq!(g.index_at_offset(45), Some(3));
    assert_eq!(g.index_at_offset(10_000), Some(4));
    assert_eq!(g.item_start(5), None);
    assert_eq!(g.total_size(), 65);
    assert_eq!(g.clamp_scroll_offset(1_000, 20), 45);
}

#[test]
fn property_virtual_items_are_contiguous_and_cover_viewport() {
    let mut rng = Lcg::new(0x5eed);
    for _ in 0..400 {
        let count = rng.gen_usize(0, 200);
        let overscan = rng.gen_usize(0, 6);
        let fixed = rng.gen_bool();

        let mut g = if fixed {
            Geometry::new(GeometryOptions::fixed(count, 7).with_overscan(overscan))
        } else {
            Geometry::new(GeometryOptions::new(count, |_| 10).with_overscan(overscan))
        };
        let mut sizes: Vec<u32> = (0..count).map(|_| if fixed { 7 } else { 10 }).collect();
        if !fixed {
            for _ in 0..count / 2 {
                let i = rng.gen_usize(0, count);
                let size = rng.gen_range(1, 50) as u32;
                g.measure(i, size);
                sizes[i] = size;
            }
        }
        let total: u64 = sizes.iter().map(|&s| s as u64).sum();
        assert_eq!(g.total_size(), total);

        let scroll = rng.gen_range(0, total + 100);
        let viewport = rng.gen_range(0, 300) as u32;
        let items = g.virtual_items(scroll, viewport);

        if count == 0 {
            assert!(items.is_empty());
            continue;
        }
        assert!(!items.is_empty());
        assert!(items.windows(2).all(|w| w[1].index == w[0].index + 1));
        assert!(items.windows(2).all(|w| w[1].start == w[0].end()));
        assert!(items.last().unwrap().index < count);

        let first = &items[0];
        let expected_start: u64 = sizes[..first.index].iter().map(|&s| s as u64).sum();
        assert_eq!(first.start, expected_start);

        let visible = g.visible_range(scroll, viewport);
        assert_eq!(first.index, visible.start_index.saturating_sub(overscan));
        assert_eq!(
            items.last().unwrap().index + 1,
            (visible.end_index + overscan).min(count)
        );
        if scroll < total {
            let at = items.iter().find(|it| it.index == visible.start_index).unwrap();
            assert!(at.start <= scroll && scroll < at.end());
        }
        let covered = items.iter().find(|it| it.index + 1 == visible.end_index).unwrap();
        assert!(covered.end() >= scroll.saturating_add(viewport as u64).min(total));
    }
}

// --- range math ---

#[test]
fn find_gaps_reports_maximal_missing_runs() {
    let order = order_of(&[Some("a"), None, None, Some("d"), None]);
    assert_eq!(
        find_gaps(0, 6, &order),
        [Range::new(1, 2), Range::new(4, 3)]
    );
    assert!(find_gaps(3, 3, &order).is_empty());
}

#[test]
fn find_gaps_extremes() {
    let full = order_of(&[Some("a"), Some("b"), Some("c"), Some("d")]);
    assert!(find_gaps(1, 3, &full).is_empty());
    assert_eq!(find_gaps(10, 19, &[]), [Range::new(10, 10)]);
    assert!(find_gaps(5, 4, &[]).is_empty());
}

#[test]
fn merge_ranges_coalesces_overlap_and_touch() {
    let merged = merge_ranges(&[
        Range::new(105, 15),
        Range::new(100, 10),
        Range::new(120, 5),
        Range::new(200, 1),
        Range::new(300, 0),
    ]);
    assert_eq!(merged, [Range::new(100, 25), Range::new(200, 1)]);
    assert!(merge_ranges(&[]).is_empty());
}

#[test]
fn property_merge_ranges_is_a_fixed_point() {
    let mut rng = Lcg::new(42);
    for _ in 0..200 {
        let ranges: Vec<Range> = (0..rng.gen_usize(0, 12))
            .map(|_| Range::new(rng.gen_usize(0, 100), rng.gen_usize(1, 20)))
            .collect();
        let merged = merge_ranges(&ranges);
        assert_eq!(merge_ranges(&merged), merged);
        assert!(merged.windows(2).all(|w| w[0].end() < w[1].start));
        for r in &ranges {
            for i in r.start..r.end() {
                assert!(merged.iter().any(|m| m.contains(i)));
            }
        }
    }
}

#[test]
fn align_to_pages_rounds_outward_and_clamps() {
    assert_eq!(
        align_to_pages(Range::new(95, 81), 50, None),
        Some(Range::new(50, 150))
    );
    assert_eq!(
        align_to_pages(Range::new(95, 81), 50, Some(160)),
        Some(Range::new(50, 110))
    );
    assert_eq!(align_to_pages(Range::new(170, 5), 50, Some(150)), None);
}

#[test]
fn plan_fetch_issues_one_page_aligned_request() {
    let visible = VirtualRange {
        start_index: 120,
        end_index: 151,
    };
    let ranges = plan_fetch(visible, Some(10_000), &[], 50);
    assert_eq!(ranges.len(), 1);
    assert!(ranges[0].start <= 95 && ranges[0].end() >= 176);
    assert_eq!(ranges[0].start % 50, 0);
    assert_eq!(ranges[0].length % 50, 0);
}

#[test]
fn plan_fetch_rounds_prefetch_up_for_odd_pages() {
    // need [62 - 13, 62 + 13] = [49, 75]
    let ranges = plan_fetch(
        VirtualRange {
            start_index: 62,
            end_index: 63,
        },
        Some(1_000),
        &[],
        25,
    );
    assert_eq!(ranges, [Range::new(25, 75)]);
}

#[test]
fn plan_fetch_bootstraps_and_clamps() {
    assert_eq!(
        plan_fetch(VirtualRange::default(), None, &[], 50),
        [Range::new(0, 50)]
    );
    assert!(plan_fetch(VirtualRange::default(), Some(10), &[], 50).is_empty());
    assert_eq!(
        plan_fetch(
            VirtualRange {
                start_index: 0,
                end_index: 10
            },
            Some(30),
            &[],
            50
        ),
        [Range::new(0, 30)]
    );
    assert!(
        plan_fetch(
            VirtualRange {
                start_index: 0,
                end_index: 10
            },
            Some(0),
            &[],
            50
        )
        .is_empty()
    );
}

#[test]
fn plan_fetch_skips_loaded_pages_and_merges_shared_pages() {
    let order: Vec<Option<ItemKey>> = (0..200)
        .map(|i: usize| (i < 110 || i == 112).then(|| key(&i.to_string())))
        .collect();

    // need [95, 129]: gaps [110, 111] and [113, 129] land in overlapping pages
    let ranges = plan_fetch(
        VirtualRange {
            start_index: 105,
            end_index: 120,
        },
        Some(1_000),
        &order,
        20,
    );
    assert_eq!(ranges, [Range::new(100, 40)]);

    let full: Vec<Option<ItemKey>> = (0..100).map(|i| Some(key(&i.to_string()))).collect();
    assert!(
        plan_fetch(
            VirtualRange {
                start_index: 10,
                end_index: 20
            },
            Some(100),
            &full,
            50
        )
        .is_empty()
    );
}

// --- dataset / merge ---

#[test]
fn empty_dataset_has_unknown_total() {
    let ds: Dataset<u32> = Dataset::new();
    assert!(ds.is_empty());
    assert_eq!(ds.total_count(), None);
    assert!(ds.pending_ranges().is_empty());
    assert!(ds.items().is_empty());
}

#[test]
fn merging_fresh_items_into_empty_dataset() {
    let normalizer = user_rows();
    let raw = users(0, 25);
    let ds = merge_items(&Dataset::new(), raw.clone(), 0, &normalizer, None, None);

    assert_eq!(ds.len(), 25);
    assert_eq!(ds.total_count(), None);
    for (i, u) in raw.into_iter().enumerate() {
        let item = ds.item_at(i).unwrap();
        assert_eq!(item.key.as_ref(), u.id.to_string());
        assert_eq!(
            *item.data,
            Row {
                label: u.name.to_uppercase()
            }
        );
        assert!(!item.selected && !item.is_skeleton);
    }
}

#[test]
fn short_page_infers_total_count() {
    let normalizer = user_rows();
    let ds = merge_items(&Dataset::new(), users(80, 7), 80, &normalizer, None, Some(20));
    assert_eq!(ds.total_count(), Some(87));
    assert_eq!(ds.len(), 87);
    assert!(!ds.is_loaded(79));
    assert!(ds.is_loaded(86));
    assert_eq!(ds.loaded_len(), 7);
}

#[test]
fn explicit_total_wins_and_trims_order() {
    let normalizer = user_rows();
    let ds = merge_items(&Dataset::new(), users(0, 10), 0, &normalizer, Some(6), Some(10));
    assert_eq!(ds.total_count(), Some(6));
    assert_eq!(ds.len(), 6);

    // A known total is never grown by a late, overlong page.
    let ds = merge_items(&ds, users(4, 10), 4, &normalizer, None, Some(10));
    assert_eq!(ds.total_count(), Some(6));
    assert_eq!(ds.len(), 6);
    assert!(ds.order().iter().all(|k| k.is_some()));
}

#[test]
fn merge_is_copy_on_write_and_keeps_ui_state() {
    let normalizer = user_rows();
    let first = merge_items(&Dataset::new(), users(0, 5), 0, &normalizer, None, None);
    let first = first
        .with_layout(
            "2",
            ItemLayout {
                estimated_height: None,
                measured_height: Some(64),
            },
        )
        .unwrap();
    let mut selection = Selection::new(SelectionMode::Single);
    let first = selection.activate(&first, "2", Modifiers::NONE).unwrap().dataset;

    let mut renamed = users(0, 5);
    renamed[2].name = "renamed".into();
    let second = merge_items(&first, renamed, 0, &normalizer, Some(5), None);

    assert!(second.generation() > first.generation());
    assert!(!second.ptr_eq(&first));
    assert_eq!(first.item("2").unwrap().data.label, "USER-2");
    assert_eq!(first.total_count(), None);

    let item = second.item("2").unwrap();
    assert_eq!(item.data.label, "RENAMED");
    assert!(item.selected);
    assert_eq!(item.layout.unwrap().measured_height, Some(64));
}

#[test]
fn colliding_keys_overwrite_silently() {
    let normalizer = Normalizer::new(|s: &(u32, &'static str)| s.0);
    let ds = merge_items(
        &Dataset::new(),
        [(1, "first"), (1, "second")],
        0,
        &normalizer,
        None,
        None,
    );
    assert_eq!(ds.items().len(), 1);
    assert_eq!(ds.item("1").unwrap().data.1, "second");
    assert_eq!(ds.key_at(0), ds.key_at(1));
}

#[test]
fn selected_keys_reports_items_displaced_from_order() {
    let mut selection = Selection::new(SelectionMode::Multi);
    let ds = letters(&["a", "b"]);
    let ds = selection.activate(&ds, "a", Modifiers::NONE).unwrap().dataset;

    let ds = merge_items(
        &ds,
        ["c"],
        0,
        &Normalizer::new(|s: &&'static str| *s),
        None,
        None,
    );
    assert_eq!(ds.position_of("a"), None);
    assert_eq!(ds.key_at(0).map(|k| k.as_ref()), Some("c"));
    assert_eq!(ds.selected_keys(), keys(&["a"]));
}

#[test]
fn from_items_keys_by_position() {
    let ds = Dataset::from_items(["x", "y", "z"]);
    assert_eq!(ds.total_count(), Some(3));
    assert_eq!(ds.key_at(1).map(|k| k.as_ref()), Some("1"));
    assert_eq!(*ds.item_at(2).unwrap().data, "z");
    assert_eq!(ds.position_of("2"), Some(2));
}

#[test]
fn skeleton_rows_are_placeholders() {
    let item: NormalizedItem<String> = skeleton_item(7);
    assert_eq!(item.key.as_ref(), "skeleton-7");
    assert!(item.is_skeleton);
    assert_eq!(
        item.layout.unwrap().estimated_height,
        Some(SKELETON_ESTIMATED_HEIGHT)
    );
}

#[test]
fn pending_ranges_snapshot() {
    let ds: Dataset<u8> = Dataset::new();
    let next = ds.with_pending_ranges(alloc::vec![Range::new(0, 50)]);
    assert!(ds.pending_ranges().is_empty());
    assert_eq!(next.pending_ranges(), [Range::new(0, 50)]);
    assert_eq!(next.generation(), ds.generation() + 1);
}

// --- selection ---

#[test]
fn selection_click_shift_ctrl_sequence() {
    let emitted = Arc::new(AtomicUsize::new(0));
    let mut selection = Selection::new(SelectionMode::Multi).with_on_change(Some({
        let emitted = Arc::clone(&emitted);
        move |_: &KeySet| {
            emitted.fetch_add(1, Ordering::Relaxed);
        }
    }));
    let ds = letters(&["a", "b", "c", "d", "e", "f"]);

    let change = selection.activate(&ds, "b", Modifiers::NONE).unwrap();
    assert_eq!(change.selected, keys(&["b"]));

    let change = selection
        .activate(&change.dataset, "e", Modifiers::SHIFT)
        .unwrap();
    assert_eq!(change.selected, keys(&["b", "c", "d", "e"]));
    assert_eq!(selection.anchor().map(|k| k.as_ref()), Some("b"));

    let change = selection
        .activate(&change.dataset, "a", Modifiers::CTRL)
        .unwrap();
    assert_eq!(change.selected, keys(&["a", "b", "c", "d", "e"]));

    let change = selection
        .activate(&change.dataset, "c", Modifiers::NONE)
        .unwrap();
    assert_eq!(change.selected, keys(&["c"]));
    assert_eq!(change.dataset.selected_keys(), keys(&["c"]));

    assert_eq!(emitted.load(Ordering::Relaxed), 4);
    // the input snapshot is never modified
    assert!(ds.selected_keys().is_empty());
}

#[test]
fn apply_defers_notification_to_caller() {
    let emitted = Arc::new(AtomicUsize::new(0));
    let mut selection = Selection::new(SelectionMode::Multi).with_on_change(Some({
        let emitted = Arc::clone(&emitted);
        move |selected: &KeySet| {
            emitted.fetch_add(selected.len(), Ordering::Relaxed);
        }
    }));
    let ds = letters(&["a", "b", "c"]);

    let change = selection.apply(&ds, "a", Modifiers::NONE).unwrap();
    let change = selection
        .apply(&change.dataset, "c", Modifiers::SHIFT)
        .unwrap();
    assert_eq!(change.selected, keys(&["a", "b", "c"]));
    assert_eq!(selection.anchor().map(|k| k.as_ref()), Some("a"));
    assert_eq!(emitted.load(Ordering::Relaxed), 0);

    selection.notify(&change.selected);
    assert_eq!(emitted.load(Ordering::Relaxed), 3);

    let cleared = selection.apply_clear(&change.dataset);
    assert!(cleared.selected.is_empty());
    assert!(selection.anchor().is_none());
    assert_eq!(emitted.load(Ordering::Relaxed), 3);
}

#[test]
fn shift_click_never_deselects_and_keeps_anchor() {
    let mut selection = Selection::new(SelectionMode::Multi);
    let ds = letters(&["a", "b", "c", "d", "e", "f"]);

    let ds = selection.activate(&ds, "c", Modifiers::NONE).unwrap().dataset;
    let ds = selection.activate(&ds, "e", Modifiers::SHIFT).unwrap().dataset;
    let change = selection.activate(&ds, "a", Modifiers::SHIFT).unwrap();
    assert_eq!(change.selected, keys(&["a", "b", "c", "d", "e"]));
    assert_eq!(selection.anchor().map(|k| k.as_ref()), Some("c"));
}

#[test]
fn ctrl_click_toggles_and_meta_matches_ctrl() {
    let mut selection = Selection::new(SelectionMode::Multi);
    let ds = letters(&["a", "b", "c"]);

    let ds = selection.activate(&ds, "a", Modifiers::CTRL).unwrap().dataset;
    let ds = selection.activate(&ds, "b", Modifiers::META).unwrap().dataset;
    assert_eq!(ds.selected_keys(), keys(&["a", "b"]));

    let change = selection.activate(&ds, "a", Modifiers::CTRL).unwrap();
    assert_eq!(change.selected, keys(&["b"]));
    assert_eq!(selection.anchor().map(|k| k.as_ref()), Some("a"));
}

#[test]
fn shift_click_without_anchor_acts_as_plain_click() {
    let mut selection = Selection::new(SelectionMode::Multi);
    let ds = letters(&["a", "b", "c"]);
    let change = selection.activate(&ds, "c", Modifiers::SHIFT).unwrap();
    assert_eq!(change.selected, keys(&["c"]));
    assert_eq!(selection.anchor().map(|k| k.as_ref()), Some("c"));
}

#[test]
fn single_mode_ignores_modifiers_and_none_mode_is_inert() {
    let ds = letters(&["a", "b", "c"]);

    let mut single = Selection::new(SelectionMode::Single);
    let ds1 = single.activate(&ds, "a", Modifiers::NONE).unwrap().dataset;
    let change = single.activate(&ds1, "c", Modifiers::CTRL).unwrap();
    assert_eq!(change.selected, keys(&["c"]));
    let change = single.activate(&change.dataset, "a", Modifiers::SHIFT).unwrap();
    assert_eq!(change.selected, keys(&["a"]));

    let mut none = Selection::new(SelectionMode::None);
    assert!(none.activate(&ds, "a", Modifiers::NONE).is_none());
    assert!(none.anchor().is_none());
}

#[test]
fn activating_unknown_key_is_a_no_op() {
    let mut selection = Selection::new(SelectionMode::Multi);
    let ds = letters(&["a"]);
    assert!(selection.activate(&ds, "zzz", Modifiers::NONE).is_none());
}

#[test]
fn clear_and_set_mode_reset_state() {
    let mut selection = Selection::new(SelectionMode::Multi);
    let ds = letters(&["a", "b"]);
    let ds = selection.activate(&ds, "a", Modifiers::NONE).unwrap().dataset;
    let change = selection.clear(&ds);
    assert!(change.selected.is_empty());
    assert!(selection.anchor().is_none());

    selection.activate(&change.dataset, "b", Modifiers::NONE).unwrap();
    selection.set_mode(SelectionMode::Single);
    assert!(selection.anchor().is_none());
}

// --- table / grid ---

#[test]
fn table_sort_toggles_and_orders_in_memory_rows() {
    let columns = [
        ColumnDef::new("name", "Name", |u: &User| u.name.clone()),
        ColumnDef::new("id", "Id", |u: &User| u.id).with_width(80),
    ];
    let mut state = TableState::new(&columns);
    assert_eq!(state.column("name").unwrap().width, 150);
    assert_eq!(state.column("id").unwrap().width, 80);

    let ds = Dataset::from_items([
        User {
            id: 1,
            name: "carol".into(),
        },
        User {
            id: 2,
            name: "alice".into(),
        },
        User {
            id: 3,
            name: "bob".into(),
        },
    ]);
    assert_eq!(sorted_order(&ds, &columns, &state.sort), ds.order());

    state.toggle_sort("name");
    assert_eq!(state.sort.direction, Some(SortDirection::Asc));
    let asc = sorted_order(&ds, &columns, &state.sort);
    assert_eq!(asc, order_of(&[Some("1"), Some("2"), Some("0")]));

    state.toggle_sort("name");
    assert_eq!(state.sort.direction, Some(SortDirection::Desc));
    let desc = sorted_order(&ds, &columns, &state.sort);
    assert_eq!(desc, order_of(&[Some("0"), Some("2"), Some("1")]));

    state.toggle_sort("id");
    assert_eq!(state.sort.direction, Some(SortDirection::Asc));

    let by_id_desc = sort_order_by(&ds, |a, b| b.id.cmp(&a.id));
    assert_eq!(by_id_desc, order_of(&[Some("2"), Some("1"), Some("0")]));
}

#[test]
fn column_resize_respects_bounds() {
    let columns =
        [ColumnDef::new("n", "N", |v: &u32| *v).with_width_bounds(Some(40), Some(200))];
    let mut state = TableState::new(&columns);
    state.resize(&columns, "n", 10);
    assert_eq!(state.column("n").unwrap().width, 40);
    state.resize(&columns, "n", 500);
    assert_eq!(state.column("n").unwrap().width, 200);
    state.resize(&columns, "missing", 90);
    assert_eq!(state.columns.len(), 1);
}

#[test]
fn grid_rows_map_to_item_ranges() {
    assert_eq!(grid_row_count(10, 3), 4);
    assert_eq!(grid_row_count(0, 3), 0);
    assert_eq!(grid_item_range(2, 4, 3), (6, 14));
}
