use datawindow::table::{
    ColumnDef, TableState, grid_item_range, grid_row_count, sorted_order,
};
use datawindow::{
    Dataset, Geometry, GeometryOptions, ItemKey, ItemLayout, KeySet, Modifiers, NormalizedItem,
    Selection, VirtualRange,
};
use tokio::task::JoinHandle;

use crate::{KeyAnchor, WindowManager, apply_anchor, capture_first_visible_anchor};

/// Rows assumed past the loaded prefix while the total count is unknown, so the user can
/// scroll into not-yet-fetched territory.
pub const SPECULATIVE_TAIL: usize = 100;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DisplayMode {
    #[default]
    List,
    /// Items laid out `columns` per virtual row.
    Grid { columns: usize },
    Table,
}

/// One item to render. `item` is `None` for a hole that is still being fetched; render a
/// skeleton there.
#[derive(Clone, Debug)]
pub struct ViewItem<T> {
    pub index: usize,
    pub start: u64,
    pub size: u32,
    pub item: Option<NormalizedItem<T>>,
}

/// A framework-neutral controller tying [`Geometry`], a [`WindowManager`] and a [`Selection`]
/// together.
///
/// This type does not hold any UI objects. Adapters drive it by calling:
/// - `on_viewport(scroll_offset, viewport_size)` when the viewport scrolls or resizes
/// - `measure(index, size)` when a rendered row reports its size
/// - `click(key, modifiers)` on row activation
///
/// and render `visible_items()` inside a scroll container of `total_extent()`.
pub struct WindowController<T, R = T> {
    geometry: Geometry,
    manager: WindowManager<T, R>,
    selection: Selection,
    mode: DisplayMode,
    columns: Vec<ColumnDef<T>>,
    table: TableState,
    sorted: Option<Vec<Option<ItemKey>>>,
    scroll_offset: u64,
    viewport_size: u32,
    synced_generation: Option<u64>,
}

impl<T, R> std::fmt::Debug for WindowController<T, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowController")
            .field("geometry", &self.geometry)
            .field("manager", &self.manager)
            .field("selection", &self.selection)
            .field("mode", &self.mode)
            .field("table", &self.table)
            .field("scroll_offset", &self.scroll_offset)
            .field("viewport_size", &self.viewport_size)
            .finish_non_exhaustive()
    }
}

impl<T, R> WindowController<T, R>
where
    T: Send + Sync + 'static,
    R: Send + 'static,
{
    /// `options.count` is ignored; the count follows the dataset.
    pub fn new(options: GeometryOptions, manager: WindowManager<T, R>, selection: Selection) -> Self {
        let mut c = Self {
            geometry: Geometry::new(options.with_count(0)),
            manager,
            selection,
            mode: DisplayMode::List,
            columns: Vec::new(),
            table: TableState::default(),
            sorted: None,
            scroll_offset: 0,
            viewport_size: 0,
            synced_generation: None,
        };
        c.sync();
        c
    }

    pub fn with_mode(mut self, mode: DisplayMode) -> Self {
        self.set_mode(mode);
        self
    }

    pub fn with_columns(mut self, columns: Vec<ColumnDef<T>>) -> Self {
        self.table = TableState::new(&columns);
        self.columns = columns;
        self.sorted = None;
        self
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn geometry_mut(&mut self) -> &mut Geometry {
        &mut self.geometry
    }

    pub fn manager(&self) -> &WindowManager<T, R> {
        &self.manager
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    pub fn columns(&self) -> &[ColumnDef<T>] {
        &self.columns
    }

    pub fn table_state(&self) -> &TableState {
        &self.table
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: DisplayMode) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        // Row geometry changes meaning between list and grid.
        self.geometry.reset_measurements();
        self.synced_generation = None;
        self.sync();
    }

    pub fn scroll_offset(&self) -> u64 {
        self.scroll_offset
    }

    pub fn viewport_size(&self) -> u32 {
        self.viewport_size
    }

    pub fn dataset(&self) -> Dataset<T> {
        self.manager.dataset()
    }

    pub fn is_loading(&self) -> bool {
        self.manager.is_loading()
    }

    /// Records the viewport and fetches what it (plus prefetch) is missing.
    pub fn on_viewport(&mut self, scroll_offset: u64, viewport_size: u32) -> Vec<JoinHandle<()>> {
        self.scroll_offset = scroll_offset;
        self.viewport_size = viewport_size;
        self.sync();
        let visible = self.visible_item_range();
        self.manager.on_visible_range(visible)
    }

    /// Re-runs the fetch pass for the current viewport.
    pub fn retry(&mut self) -> Vec<JoinHandle<()>> {
        self.sync();
        let visible = self.visible_item_range();
        self.manager.retry(visible)
    }

    /// Extent of the scroll container.
    pub fn total_extent(&mut self) -> u64 {
        self.sync();
        self.geometry.total_size()
    }

    /// The items to render for the current viewport, overscan included.
    ///
    /// In grid mode every item of a virtual row shares the row's `start` and `size`.
    pub fn visible_items(&mut self) -> Vec<ViewItem<T>> {
        self.sync();
        let dataset = self.manager.dataset();
        let rows = self
            .geometry
            .virtual_items(self.scroll_offset, self.viewport_size);

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let (first, last) = match self.mode {
                DisplayMode::Grid { columns } => grid_item_range(row.index, row.index, columns),
                DisplayMode::List | DisplayMode::Table => (row.index, row.index),
            };
            for index in first..=last {
                if dataset.total_count().is_some_and(|total| index >= total) {
                    break;
                }
                out.push(ViewItem {
                    index,
                    start: row.start,
                    size: row.size,
                    item: self.item_for(&dataset, index),
                });
            }
        }
        out
    }

    /// Applies a row activation and returns the new selected-key set, if anything changed.
    ///
    /// The selection's `on_change` runs after the snapshot is published, so it may read the
    /// manager.
    pub fn click(&mut self, key: &str, modifiers: Modifiers) -> Option<KeySet> {
        let mut selected = None;
        let selection = &mut self.selection;
        self.manager.update_dataset(|dataset| {
            match selection.apply(dataset, key, modifiers) {
                Some(change) => {
                    selected = Some(change.selected);
                    change.dataset
                }
                None => dataset.clone(),
            }
        });
        if let Some(selected) = &selected {
            self.selection.notify(selected);
        }
        selected
    }

    pub fn clear_selection(&mut self) -> KeySet {
        let mut selected = KeySet::default();
        let selection = &mut self.selection;
        self.manager.update_dataset(|dataset| {
            let change = selection.apply_clear(dataset);
            selected = change.selected;
            change.dataset
        });
        self.selection.notify(&selected);
        selected
    }

    /// Records a rendered row's size and, in list/table mode, the item's measured height.
    pub fn measure(&mut self, index: usize, size: u32) {
        self.geometry.measure(index, size);
        if matches!(self.mode, DisplayMode::Grid { .. }) {
            return;
        }
        let Some(key) = self.key_at(&self.manager.dataset(), index) else {
            return;
        };
        self.manager.update_dataset(|dataset| {
            let layout = dataset.item(&key).and_then(|item| item.layout);
            if layout.is_some_and(|l| l.measured_height == Some(size)) {
                return dataset.clone();
            }
            let layout = ItemLayout {
                measured_height: Some(size),
                ..layout.unwrap_or_default()
            };
            dataset
                .with_layout(&key, layout)
                .unwrap_or_else(|| dataset.clone())
        });
    }

    /// Sorts by `column_id` (toggling asc/desc).
    ///
    /// Only fully loaded collections are re-sorted; a remote window holds a slice of the
    /// server's ordering. Returns whether the sort was applied.
    pub fn sort_by(&mut self, column_id: &str) -> bool {
        if !self
            .columns
            .iter()
            .any(|c| c.id == column_id && c.sortable)
        {
            return false;
        }
        let dataset = self.manager.dataset();
        let fully_loaded = dataset
            .total_count()
            .is_some_and(|total| dataset.loaded_len() == total);
        if !fully_loaded {
            awarn!(column_id, "sorting is only available for fully loaded collections");
            return false;
        }
        self.table.toggle_sort(column_id);
        self.sorted = Some(sorted_order(&dataset, &self.columns, &self.table.sort));
        true
    }

    pub fn resize_column(&mut self, column_id: &str, width: u32) {
        self.table.resize(&self.columns, column_id, width);
    }

    /// Captures the first visible item so the view can be restored after a prepend.
    pub fn capture_anchor(&mut self) -> Option<KeyAnchor> {
        self.sync();
        let dataset = self.manager.dataset();
        capture_first_visible_anchor(
            &self.geometry,
            &dataset,
            self.scroll_offset,
            self.viewport_size,
        )
    }

    /// Scrolls back to a captured anchor. Returns the applied offset.
    pub fn restore_anchor(&mut self, anchor: &KeyAnchor) -> Option<u64> {
        self.sync();
        let dataset = self.manager.dataset();
        let offset = apply_anchor(&self.geometry, &dataset, anchor, self.viewport_size)?;
        self.scroll_offset = offset;
        Some(offset)
    }

    fn key_at(&self, dataset: &Dataset<T>, index: usize) -> Option<ItemKey> {
        match &self.sorted {
            Some(order) => order.get(index)?.clone(),
            None => dataset.key_at(index).cloned(),
        }
    }

    fn item_for(&self, dataset: &Dataset<T>, index: usize) -> Option<NormalizedItem<T>> {
        let key = self.key_at(dataset, index)?;
        dataset.item(&key).cloned()
    }

    /// Visible rows mapped to item indexes.
    fn visible_item_range(&self) -> VirtualRange {
        let rows = self
            .geometry
            .visible_range(self.scroll_offset, self.viewport_size);
        match (self.mode, rows.last_index()) {
            (DisplayMode::Grid { columns }, Some(last_row)) => {
                let (first, last) = grid_item_range(rows.start_index, last_row, columns);
                VirtualRange {
                    start_index: first,
                    end_index: last + 1,
                }
            }
            _ => rows,
        }
    }

    /// Follows the latest snapshot: count (with a speculative tail while the total is
    /// unknown) and, when a sort is active, the sorted order.
    fn sync(&mut self) {
        let dataset = self.manager.dataset();
        if self.synced_generation == Some(dataset.generation()) {
            return;
        }
        self.synced_generation = Some(dataset.generation());

        let items = match dataset.total_count() {
            Some(total) => total,
            None => dataset.len() + SPECULATIVE_TAIL,
        };
        let count = match self.mode {
            DisplayMode::Grid { columns } => grid_row_count(items, columns),
            DisplayMode::List | DisplayMode::Table => items,
        };
        if self.geometry.count() != count {
            atrace!(count, items, "WindowController::sync");
            self.geometry.set_count(count);
        }

        if self.sorted.is_some() {
            self.sorted = Some(sorted_order(&dataset, &self.columns, &self.table.sort));
        }
    }
}
