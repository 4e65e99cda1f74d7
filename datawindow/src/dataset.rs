use alloc::format;
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::key::{KeyMap, KeySet, key_map_with_capacity};
use crate::{ItemKey, Range};

/// Height used for skeleton rows before anything is known about them.
pub const SKELETON_ESTIMATED_HEIGHT: u32 = 50;

/// Layout hints carried alongside an item for variable-height rendering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemLayout {
    pub estimated_height: Option<u32>,
    pub measured_height: Option<u32>,
}

/// A source record in its UI shape, plus the UI state attached to it.
///
/// Items are never patched: selection or layout changes produce a new value that replaces the
/// old one in the next [`Dataset`] snapshot. `data` is shared, so replacement is cheap.
#[derive(Debug)]
pub struct NormalizedItem<T> {
    pub key: ItemKey,
    pub data: Arc<T>,
    pub selected: bool,
    pub is_skeleton: bool,
    pub layout: Option<ItemLayout>,
}

impl<T> Clone for NormalizedItem<T> {
    fn clone(&self) -> Self {
        Self {
            key: Arc::clone(&self.key),
            data: Arc::clone(&self.data),
            selected: self.selected,
            is_skeleton: self.is_skeleton,
            layout: self.layout,
        }
    }
}

impl<T> NormalizedItem<T> {
    pub fn new(key: impl Into<ItemKey>, data: T) -> Self {
        Self {
            key: key.into(),
            data: Arc::new(data),
            selected: false,
            is_skeleton: false,
            layout: None,
        }
    }

    pub fn with_selected(&self, selected: bool) -> Self {
        Self {
            selected,
            ..self.clone()
        }
    }

    pub fn with_layout(&self, layout: Option<ItemLayout>) -> Self {
        Self {
            layout,
            ..self.clone()
        }
    }
}

/// A placeholder row for an index whose item has not been loaded yet.
pub fn skeleton_item<T: Default>(index: usize) -> NormalizedItem<T> {
    NormalizedItem {
        key: Arc::from(format!("skeleton-{index}")),
        data: Arc::new(T::default()),
        selected: false,
        is_skeleton: true,
        layout: Some(ItemLayout {
            estimated_height: Some(SKELETON_ESTIMATED_HEIGHT),
            measured_height: None,
        }),
    }
}

/// An immutable snapshot of the loaded window over an ordered, possibly sparse collection.
///
/// `order[i]` holds the key at position `i`, or `None` for a hole that still has to be
/// fetched. Every key present in `order` resolves in `items`.
///
/// Snapshots are never mutated: every change builds a new `Dataset` (sharing unchanged storage
/// through `Arc`) with a higher [`Dataset::generation`]. Holders of an older snapshot keep
/// observing exactly what they had.
#[derive(Debug)]
pub struct Dataset<T> {
    items: Arc<KeyMap<NormalizedItem<T>>>,
    order: Arc<Vec<Option<ItemKey>>>,
    total_count: Option<usize>,
    pending_ranges: Arc<Vec<Range>>,
    generation: u64,
}

impl<T> Clone for Dataset<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
            order: Arc::clone(&self.order),
            total_count: self.total_count,
            pending_ranges: Arc::clone(&self.pending_ranges),
            generation: self.generation,
        }
    }
}

impl<T> Default for Dataset<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Dataset<T> {
    /// An empty dataset with an unknown total count.
    pub fn new() -> Self {
        Self {
            items: Arc::new(KeyMap::default()),
            order: Arc::new(Vec::new()),
            total_count: None,
            pending_ranges: Arc::new(Vec::new()),
            generation: 0,
        }
    }

    /// A fully loaded in-memory collection keyed by position (`"0"`, `"1"`, ...).
    pub fn from_items(data: impl IntoIterator<Item = T>) -> Self {
        let data = data.into_iter();
        let mut items = key_map_with_capacity(data.size_hint().0);
        let mut order = Vec::with_capacity(data.size_hint().0);
        for (i, d) in data.enumerate() {
            let key: ItemKey = Arc::from(format!("{i}"));
            order.push(Some(Arc::clone(&key)));
            items.insert(Arc::clone(&key), NormalizedItem::new(key, d));
        }
        let total = order.len();
        Self {
            items: Arc::new(items),
            order: Arc::new(order),
            total_count: Some(total),
            pending_ranges: Arc::new(Vec::new()),
            generation: 0,
        }
    }

    pub(crate) fn from_parts(
        prev: &Self,
        items: Arc<KeyMap<NormalizedItem<T>>>,
        order: Arc<Vec<Option<ItemKey>>>,
        total_count: Option<usize>,
    ) -> Self {
        Self {
            items,
            order,
            total_count,
            pending_ranges: Arc::clone(&prev.pending_ranges),
            generation: prev.generation.wrapping_add(1),
        }
    }

    pub fn items(&self) -> &KeyMap<NormalizedItem<T>> {
        &self.items
    }

    pub fn order(&self) -> &[Option<ItemKey>] {
        &self.order
    }

    pub fn total_count(&self) -> Option<usize> {
        self.total_count
    }

    pub fn pending_ranges(&self) -> &[Range] {
        &self.pending_ranges
    }

    /// Increases with every derived snapshot.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// `true` when both snapshots share the same storage, i.e. nothing changed in between.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.items, &other.items)
            && Arc::ptr_eq(&self.order, &other.order)
            && self.total_count == other.total_count
    }

    /// Length of the order sequence, holes included.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Number of positions whose item is loaded.
    pub fn loaded_len(&self) -> usize {
        self.order.iter().filter(|k| k.is_some()).count()
    }

    pub fn is_loaded(&self, index: usize) -> bool {
        matches!(self.order.get(index), Some(Some(_)))
    }

    pub fn key_at(&self, index: usize) -> Option<&ItemKey> {
        self.order.get(index)?.as_ref()
    }

    pub fn item(&self, key: &str) -> Option<&NormalizedItem<T>> {
        self.items.get(key)
    }

    pub fn item_at(&self, index: usize) -> Option<&NormalizedItem<T>> {
        self.items.get(self.key_at(index)?)
    }

    /// Position of `key` in the order sequence (linear scan).
    pub fn position_of(&self, key: &str) -> Option<usize> {
        self.order
            .iter()
            .position(|k| k.as_deref() == Some(key))
    }

    /// Keys of every selected item in the store.
    ///
    /// The store is not pruned to `order`: an item whose slot was taken by a colliding key, or
    /// that sits past a shrunk total, is still reported while it stays selected.
    pub fn selected_keys(&self) -> KeySet {
        self.items
            .values()
            .filter(|item| item.selected)
            .map(|item| Arc::clone(&item.key))
            .collect()
    }

    /// A new snapshot recording the ranges currently being fetched.
    pub fn with_pending_ranges(&self, ranges: Vec<Range>) -> Self {
        Self {
            pending_ranges: Arc::new(ranges),
            generation: self.generation.wrapping_add(1),
            ..self.clone()
        }
    }

    /// A new snapshot where the item under `key` carries `layout`.
    ///
    /// Returns `None` when the key is unknown.
    pub fn with_layout(&self, key: &str, layout: ItemLayout) -> Option<Self> {
        let item = self.items.get(key)?.with_layout(Some(layout));
        let mut items = (*self.items).clone();
        items.insert(Arc::clone(&item.key), item);
        Some(Self::from_parts(
            self,
            Arc::new(items),
            Arc::clone(&self.order),
            self.total_count,
        ))
    }

    /// A new snapshot where each `(key, selected)` pair is applied. Unknown keys are ignored.
    pub(crate) fn with_selection(&self, updates: impl IntoIterator<Item = (ItemKey, bool)>) -> Self {
        let mut items = (*self.items).clone();
        for (key, selected) in updates {
            let Some(item) = items.get(&key) else {
                continue;
            };
            if item.selected != selected {
                let next = item.with_selected(selected);
                items.insert(key, next);
            }
        }
        Self::from_parts(
            self,
            Arc::new(items),
            Arc::clone(&self.order),
            self.total_count,
        )
    }
}
