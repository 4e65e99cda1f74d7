//! Pure range arithmetic over sparse order sequences: gap detection, range coalescing and page
//! alignment.

use alloc::vec::Vec;

use crate::{ItemKey, Range, VirtualRange};

/// Returns the maximal runs of missing keys inside the inclusive range
/// `[needed_start, needed_end]`, sorted by start.
///
/// Indexes past the end of `order` count as missing.
pub fn find_gaps(needed_start: usize, needed_end: usize, order: &[Option<ItemKey>]) -> Vec<Range> {
    let mut gaps = Vec::new();
    if needed_end < needed_start {
        return gaps;
    }

    let mut open: Option<usize> = None;
    for i in needed_start..=needed_end {
        let loaded = matches!(order.get(i), Some(Some(_)));
        match (loaded, open) {
            (false, None) => open = Some(i),
            (true, Some(start)) => {
                gaps.push(Range::new(start, i - start));
                open = None;
            }
            _ => {}
        }
    }
    if let Some(start) = open {
        gaps.push(Range::new(start, needed_end - start + 1));
    }
    gaps
}

/// Coalesces overlapping or touching ranges into the minimal non-overlapping cover.
///
/// The output is sorted by start, and merging it again returns it unchanged.
pub fn merge_ranges(ranges: &[Range]) -> Vec<Range> {
    let mut sorted: Vec<Range> = ranges.iter().copied().filter(|r| !r.is_empty()).collect();
    sorted.sort_by_key(|r| r.start);

    let mut merged: Vec<Range> = Vec::with_capacity(sorted.len());
    for next in sorted {
        match merged.last_mut() {
            Some(current) if next.start <= current.end() => {
                let end = current.end().max(next.end());
                current.length = end - current.start;
            }
            _ => merged.push(next),
        }
    }
    merged
}

/// Rounds `range` outward to page boundaries, clamped to `total` when known.
///
/// Returns `None` when nothing is left to fetch after clamping.
pub fn align_to_pages(range: Range, page_size: usize, total: Option<usize>) -> Option<Range> {
    let page = page_size.max(1);
    let start = range.start / page * page;
    let mut end = range.end().div_ceil(page).saturating_mul(page);
    if let Some(total) = total {
        end = end.min(total);
    }
    (end > start).then(|| Range::new(start, end - start))
}

/// Plans the requests needed to cover `visible` plus half a page (rounded up) of prefetch on
/// each side.
///
/// - With a known total the needed range is clamped to `[0, total - 1]`.
/// - With an unknown total and nothing visible, the first page is requested (bootstrap).
///
/// Returned ranges are page-aligned, merged and non-empty.
pub fn plan_fetch(
    visible: VirtualRange,
    total: Option<usize>,
    order: &[Option<ItemKey>],
    page_size: usize,
) -> Vec<Range> {
    let page = page_size.max(1);
    let prefetch = page.div_ceil(2);

    let need = visible
        .last_index()
        .map(|last| (visible.start_index.saturating_sub(prefetch), last.saturating_add(prefetch)));
    let need = match (need, total) {
        (Some((start, end)), Some(total)) => {
            let end = end.min(total.saturating_sub(1));
            (total > 0 && start <= end).then_some((start, end))
        }
        (Some(need), None) => Some(need),
        (None, None) => Some((0, page - 1)),
        (None, Some(_)) => None,
    };
    let Some((start, end)) = need else {
        return Vec::new();
    };

    let gaps = find_gaps(start, end, order);
    if gaps.is_empty() {
        return gaps;
    }

    let aligned: Vec<Range> = merge_ranges(&gaps)
        .into_iter()
        .filter_map(|gap| align_to_pages(gap, page, total))
        .collect();
    merge_ranges(&aligned)
}
