//! Column descriptors and client-side sorting for table views.
//!
//! Sorting only applies to fully materialized, in-memory collections. A remote window holds an
//! arbitrary slice of the full ordering, so re-sorting it locally would be inconsistent.

use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cmp::Ordering;

use crate::{Dataset, ItemKey};

pub const DEFAULT_COLUMN_WIDTH: u32 = 150;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColumnAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Describes one column: how to read a cell from an item and how it may be laid out.
pub struct ColumnDef<T> {
    pub id: String,
    pub label: String,
    pub accessor: Arc<dyn Fn(&T) -> String + Send + Sync>,
    pub width: Option<u32>,
    pub min_width: Option<u32>,
    pub max_width: Option<u32>,
    pub resizable: bool,
    pub sortable: bool,
    pub align: ColumnAlign,
}

impl<T> Clone for ColumnDef<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            label: self.label.clone(),
            accessor: Arc::clone(&self.accessor),
            width: self.width,
            min_width: self.min_width,
            max_width: self.max_width,
            resizable: self.resizable,
            sortable: self.sortable,
            align: self.align,
        }
    }
}

impl<T> core::fmt::Debug for ColumnDef<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ColumnDef")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("width", &self.width)
            .field("sortable", &self.sortable)
            .finish_non_exhaustive()
    }
}

impl<T: 'static> ColumnDef<T> {
    pub fn new<V: ToString + 'static>(
        id: impl Into<String>,
        label: impl Into<String>,
        accessor: impl Fn(&T) -> V + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            accessor: Arc::new(move |item: &T| accessor(item).to_string()),
            width: None,
            min_width: None,
            max_width: None,
            resizable: true,
            sortable: true,
            align: ColumnAlign::Left,
        }
    }
}

impl<T> ColumnDef<T> {
    pub fn with_width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_width_bounds(mut self, min_width: Option<u32>, max_width: Option<u32>) -> Self {
        self.min_width = min_width;
        self.max_width = max_width;
        self
    }

    pub fn with_sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    pub fn with_resizable(mut self, resizable: bool) -> Self {
        self.resizable = resizable;
        self
    }

    pub fn with_align(mut self, align: ColumnAlign) -> Self {
        self.align = align;
        self
    }

    /// The cell's display value for `item`.
    pub fn cell_value(&self, item: &T) -> String {
        (self.accessor)(item)
    }

    fn clamp_width(&self, width: u32) -> u32 {
        let width = self.min_width.map_or(width, |min| width.max(min));
        self.max_width.map_or(width, |max| width.min(max))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnState {
    pub width: u32,
    pub is_resizing: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SortState {
    pub column_id: Option<String>,
    pub direction: Option<SortDirection>,
}

/// Column widths plus the active sort, in column definition order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableState {
    pub columns: Vec<(String, ColumnState)>,
    pub sort: SortState,
}

impl TableState {
    pub fn new<T>(defs: &[ColumnDef<T>]) -> Self {
        Self {
            columns: defs
                .iter()
                .map(|def| {
                    let width = def.clamp_width(def.width.unwrap_or(DEFAULT_COLUMN_WIDTH));
                    (
                        def.id.clone(),
                        ColumnState {
                            width,
                            is_resizing: false,
                        },
                    )
                })
                .collect(),
            sort: SortState::default(),
        }
    }

    pub fn column(&self, id: &str) -> Option<&ColumnState> {
        self.columns.iter().find(|(c, _)| c == id).map(|(_, s)| s)
    }

    /// Sorting the column that is already ascending flips it to descending; any other column
    /// starts ascending.
    pub fn toggle_sort(&mut self, column_id: &str) {
        let direction = if self.sort.column_id.as_deref() == Some(column_id)
            && self.sort.direction == Some(SortDirection::Asc)
        {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        self.sort = SortState {
            column_id: Some(column_id.into()),
            direction: Some(direction),
        };
    }

    /// Records a new width for a column, honoring the column's bounds. Unknown ids are ignored.
    pub fn resize<T>(&mut self, defs: &[ColumnDef<T>], column_id: &str, width: u32) {
        let Some(def) = defs.iter().find(|d| d.id == column_id) else {
            return;
        };
        if let Some((_, state)) = self.columns.iter_mut().find(|(c, _)| c == column_id) {
            *state = ColumnState {
                width: def.clamp_width(width),
                is_resizing: false,
            };
        }
    }
}

/// The dataset's order re-sorted with `cmp` over item data. Holes sort last.
pub fn sort_order_by<T>(
    dataset: &Dataset<T>,
    mut cmp: impl FnMut(&T, &T) -> Ordering,
) -> Vec<Option<ItemKey>> {
    let mut order = dataset.order().to_vec();
    order.sort_by(|a, b| {
        let a = a.as_deref().and_then(|k| dataset.item(k));
        let b = b.as_deref().and_then(|k| dataset.item(k));
        match (a, b) {
            (Some(a), Some(b)) => cmp(&*a.data, &*b.data),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
    order
}

/// The dataset's order sorted by the table's active column, compared on cell strings.
///
/// Returns the order unchanged when no sort is active or the column is unknown.
pub fn sorted_order<T>(
    dataset: &Dataset<T>,
    columns: &[ColumnDef<T>],
    sort: &SortState,
) -> Vec<Option<ItemKey>> {
    let (Some(column_id), Some(direction)) = (sort.column_id.as_deref(), sort.direction) else {
        return dataset.order().to_vec();
    };
    let Some(column) = columns.iter().find(|c| c.id == column_id) else {
        return dataset.order().to_vec();
    };
    sort_order_by(dataset, |a, b| {
        let ord = column.cell_value(a).cmp(&column.cell_value(b));
        match direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    })
}

/// Number of virtual rows needed to lay `total` items out `columns` per row.
pub fn grid_row_count(total: usize, columns: usize) -> usize {
    total.div_ceil(columns.max(1))
}

/// Item indexes covered by the virtual rows `[first_row, last_row]`, as an inclusive pair.
pub fn grid_item_range(first_row: usize, last_row: usize, columns: usize) -> (usize, usize) {
    let columns = columns.max(1);
    (
        first_row * columns,
        (last_row + 1).saturating_mul(columns).saturating_sub(1),
    )
}
