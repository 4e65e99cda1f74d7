use alloc::vec::Vec;
use core::cell::Cell;
use core::cmp;

use crate::fenwick::Fenwick;
use crate::{GeometryOptions, VirtualItem, VirtualRange};

/// Maps a scroll offset and viewport extent onto the item indexes that must be rendered.
///
/// The engine holds no UI objects and no scroll state: callers pass the current scroll offset
/// and viewport extent to each query, and feed back authoritative sizes through
/// [`Geometry::measure`] once rows are laid out.
///
/// Two layout modes exist:
/// - fixed size (`options.fixed_size`): every lookup is O(1).
/// - variable size: estimates are replaced by measurements as they arrive, and offset → index
///   lookups go through a Fenwick prefix-sum index (O(log n)).
#[derive(Clone, Debug)]
pub struct Geometry {
    options: GeometryOptions,

    sizes: Vec<u32>, // estimate or measurement per index
    measured: Vec<bool>,
    measured_count: usize,
    measured_sum: u64,
    sums: Fenwick,

    total_cache: Cell<Option<u64>>,
    cache_generation: u64,

    notify_depth: Cell<usize>,
    notify_pending: Cell<bool>,
}

impl Geometry {
    pub fn new(options: GeometryOptions) -> Self {
        vdebug!(
            count = options.count,
            fixed_size = ?options.fixed_size,
            overscan = options.overscan,
            "Geometry::new"
        );
        let mut g = Self {
            options,
            sizes: Vec::new(),
            measured: Vec::new(),
            measured_count: 0,
            measured_sum: 0,
            sums: Fenwick::default(),
            total_cache: Cell::new(None),
            cache_generation: 0,
            notify_depth: Cell::new(0),
            notify_pending: Cell::new(false),
        };
        g.rebuild(false);
        g
    }

    pub fn options(&self) -> &GeometryOptions {
        &self.options
    }

    /// Replaces the options (count, estimate, fixed size, overscan) and invalidates caches.
    ///
    /// Measurements for indexes that still exist are kept.
    pub fn set_options(&mut self, options: GeometryOptions) {
        self.options = options;
        vtrace!(
            count = self.options.count,
            fixed_size = ?self.options.fixed_size,
            "Geometry::set_options"
        );
        self.rebuild(true);
        self.invalidate();
        self.notify();
    }

    /// Clones the current options, applies `f`, then delegates to `set_options`.
    pub fn update_options(&mut self, f: impl FnOnce(&mut GeometryOptions)) {
        let mut next = self.options.clone();
        f(&mut next);
        self.set_options(next);
    }

    pub fn set_count(&mut self, count: usize) {
        if self.options.count == count {
            return;
        }
        self.update_options(|o| o.count = count);
    }

    pub fn set_on_change(&mut self, on_change: Option<impl Fn(&Geometry) + Send + Sync + 'static>) {
        self.options.on_change = on_change.map(|f| alloc::sync::Arc::new(f) as _);
    }

    pub fn count(&self) -> usize {
        self.options.count
    }

    pub fn overscan(&self) -> usize {
        self.options.overscan
    }

    pub fn is_fixed_size(&self) -> bool {
        self.options.fixed_size().is_some()
    }

    /// Incremented every time the cached total extent is invalidated.
    pub fn cache_generation(&self) -> u64 {
        self.cache_generation
    }

    fn notify_now(&self) {
        if let Some(cb) = &self.options.on_change {
            cb(self);
        }
    }

    fn notify(&self) {
        if self.notify_depth.get() > 0 {
            self.notify_pending.set(true);
            return;
        }
        self.notify_now();
    }

    /// Batches multiple updates into a single `on_change` notification.
    ///
    /// Typical use is applying every row measurement of a frame at once.
    pub fn batch_update(&mut self, f: impl FnOnce(&mut Self)) {
        let depth = self.notify_depth.get();
        self.notify_depth.set(depth.saturating_add(1));

        f(self);

        let next = self.notify_depth.get().saturating_sub(1);
        self.notify_depth.set(next);

        if next == 0 && self.notify_pending.replace(false) {
            self.notify_now();
        }
    }

    /// Records an authoritative size for `index`.
    ///
    /// Re-measuring with the size already on record is a no-op: the total extent cache and
    /// its generation counter are left untouched and no notification fires.
    pub fn measure(&mut self, index: usize, size: u32) {
        if !self.set_measured(index, size) {
            return;
        }
        vtrace!(index, size, "Geometry::measure");
        self.invalidate();
        self.notify();
    }

    pub fn measure_many(&mut self, measurements: impl IntoIterator<Item = (usize, u32)>) {
        let mut changed = false;
        for (index, size) in measurements {
            changed |= self.set_measured(index, size);
        }
        if changed {
            self.invalidate();
            self.notify();
        }
    }

    fn set_measured(&mut self, index: usize, size: u32) -> bool {
        if index >= self.options.count {
            return false;
        }
        let cur = self.sizes[index];
        if self.measured[index] {
            if cur == size {
                return false;
            }
            self.measured_sum = self.measured_sum - cur as u64 + size as u64;
        } else {
            self.measured[index] = true;
            self.measured_count += 1;
            self.measured_sum += size as u64;
        }
        self.sizes[index] = size;
        if !self.is_fixed_size() {
            self.sums.add(index, size as i64 - cur as i64);
        }
        true
    }

    /// Drops every measurement and falls back to estimates.
    pub fn reset_measurements(&mut self) {
        self.rebuild(false);
        self.invalidate();
        self.notify();
    }

    pub fn is_measured(&self, index: usize) -> bool {
        self.measured.get(index).copied().unwrap_or(false)
    }

    /// Pixel extent of the whole collection.
    ///
    /// Fixed size: `count * fixed_size`. Otherwise `sum(measured) + unmeasured * estimate(0)`,
    /// cached until a measurement or option change invalidates it.
    pub fn total_size(&self) -> u64 {
        if let Some(fixed) = self.options.fixed_size() {
            return self.options.count as u64 * fixed as u64;
        }
        if let Some(total) = self.total_cache.get() {
            return total;
        }
        let unmeasured = self.options.count.saturating_sub(self.measured_count) as u64;
        let estimate = if self.options.count == 0 {
            0
        } else {
            (self.options.estimate_size)(0) as u64
        };
        let total = self
            .measured_sum
            .saturating_add(unmeasured.saturating_mul(estimate));
        self.total_cache.set(Some(total));
        total
    }

    pub fn max_scroll_offset(&self, viewport_size: u32) -> u64 {
        self.total_size().saturating_sub(viewport_size as u64)
    }

    pub fn clamp_scroll_offset(&self, offset: u64, viewport_size: u32) -> u64 {
        offset.min(self.max_scroll_offset(viewport_size))
    }

    /// Indexes intersecting the viewport, without overscan.
    pub fn visible_range(&self, scroll_offset: u64, viewport_size: u32) -> VirtualRange {
        let count = self.options.count;
        if count == 0 {
            return VirtualRange::default();
        }
        let first = self.index_at_offset_inner(scroll_offset);
        let last_offset = scroll_offset
            .saturating_add(viewport_size as u64)
            .saturating_sub(1)
            .max(scroll_offset);
        let last = self.index_at_offset_inner(last_offset).max(first);
        VirtualRange {
            start_index: first,
            end_index: last + 1,
        }
    }

    /// Visible range expanded by `overscan` items on each side, clamped to `[0, count)`.
    pub fn virtual_range(&self, scroll_offset: u64, viewport_size: u32) -> VirtualRange {
        let mut range = self.visible_range(scroll_offset, viewport_size);
        if range.is_empty() {
            return range;
        }
        let overscan = self.options.overscan;
        range.start_index = range.start_index.saturating_sub(overscan);
        range.end_index = cmp::min(self.options.count, range.end_index.saturating_add(overscan));
        range
    }

    pub fn for_each_virtual_item(
        &self,
        scroll_offset: u64,
        viewport_size: u32,
        mut f: impl FnMut(VirtualItem),
    ) {
        let range = self.virtual_range(scroll_offset, viewport_size);
        if range.is_empty() {
            return;
        }
        let mut start = self.start_of(range.start_index);
        for index in range.start_index..range.end_index {
            let item = VirtualItem {
                index,
                start,
                size: self.size_of(index),
                measured: self.is_measured(index),
            };
            start = item.end();
            f(item);
        }
    }

    /// The items to render for the given viewport: contiguous, ascending, gap-free.
    pub fn virtual_items(&self, scroll_offset: u64, viewport_size: u32) -> Vec<VirtualItem> {
        let mut out = Vec::with_capacity(self.virtual_range(scroll_offset, viewport_size).len());
        self.for_each_virtual_item(scroll_offset, viewport_size, |it| out.push(it));
        out
    }

    /// Index of the item containing `offset`, clamped to the last item.
    pub fn index_at_offset(&self, offset: u64) -> Option<usize> {
        if self.options.count == 0 {
            return None;
        }
        Some(self.index_at_offset_inner(offset))
    }

    pub fn item_start(&self, index: usize) -> Option<u64> {
        (index < self.options.count).then(|| self.start_of(index))
    }

    pub fn item_size(&self, index: usize) -> Option<u32> {
        (index < self.options.count).then(|| self.size_of(index))
    }

    pub fn virtual_item(&self, index: usize) -> Option<VirtualItem> {
        (index < self.options.count).then(|| VirtualItem {
            index,
            start: self.start_of(index),
            size: self.size_of(index),
            measured: self.is_measured(index),
        })
    }

    fn index_at_offset_inner(&self, offset: u64) -> usize {
        let last = self.options.count.saturating_sub(1);
        let index = match self.options.fixed_size() {
            Some(fixed) => usize::try_from(offset / fixed as u64).unwrap_or(usize::MAX),
            None => self.sums.lower_bound(offset),
        };
        index.min(last)
    }

    fn start_of(&self, index: usize) -> u64 {
        match self.options.fixed_size() {
            Some(fixed) => index as u64 * fixed as u64,
            None => self.sums.prefix_sum(index),
        }
    }

    fn size_of(&self, index: usize) -> u32 {
        match self.options.fixed_size() {
            Some(fixed) => fixed,
            None => self.sizes[index],
        }
    }

    fn invalidate(&mut self) {
        self.total_cache.set(None);
        self.cache_generation = self.cache_generation.wrapping_add(1);
    }

    fn rebuild(&mut self, keep_measurements: bool) {
        let count = self.options.count;
        vdebug!(count, keep_measurements, "Geometry::rebuild");

        let prev_sizes = core::mem::take(&mut self.sizes);
        let prev_measured = core::mem::take(&mut self.measured);
        self.sizes.reserve_exact(count);
        self.measured.reserve_exact(count);
        self.measured_count = 0;
        self.measured_sum = 0;

        for i in 0..count {
            let kept = keep_measurements && prev_measured.get(i).copied().unwrap_or(false);
            if kept {
                let size = prev_sizes[i];
                self.sizes.push(size);
                self.measured.push(true);
                self.measured_count += 1;
                self.measured_sum += size as u64;
            } else {
                self.sizes.push((self.options.estimate_size)(i));
                self.measured.push(false);
            }
        }

        self.sums = if self.is_fixed_size() {
            Fenwick::default()
        } else {
            Fenwick::from_sizes(&self.sizes)
        };
        debug_assert!(self.is_fixed_size() || self.sums.len() == count);
    }
}
