use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::key::KeySet;
use crate::{Dataset, ItemKey};

/// Receives the full selected-key set after every selection transition.
pub type OnSelectionChange = Arc<dyn Fn(&KeySet) + Send + Sync>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SelectionMode {
    None,
    #[default]
    Single,
    Multi,
}

/// Keyboard modifiers held during an activation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    /// Cmd on macOS; treated like `ctrl`.
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        meta: false,
    };
    pub const SHIFT: Self = Self {
        shift: true,
        ctrl: false,
        meta: false,
    };
    pub const CTRL: Self = Self {
        shift: false,
        ctrl: true,
        meta: false,
    };
    pub const META: Self = Self {
        shift: false,
        ctrl: false,
        meta: true,
    };

    fn toggles(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Result of a selection transition.
#[derive(Debug)]
pub struct SelectionChange<T> {
    pub dataset: Dataset<T>,
    pub selected: KeySet,
}

/// Turns click, toggle-click and range-click gestures into selection state on a [`Dataset`].
///
/// The anchor (`last_key`) is the last item activated with a plain or toggle click; range
/// clicks extend from it without moving it and never deselect anything.
#[derive(Clone, Default)]
pub struct Selection {
    mode: SelectionMode,
    last_key: Option<ItemKey>,
    on_change: Option<OnSelectionChange>,
}

impl core::fmt::Debug for Selection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Selection")
            .field("mode", &self.mode)
            .field("last_key", &self.last_key)
            .finish_non_exhaustive()
    }
}

impl Selection {
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            mode,
            last_key: None,
            on_change: None,
        }
    }

    pub fn with_on_change(mut self, on_change: Option<impl Fn(&KeySet) + Send + Sync + 'static>) -> Self {
        self.on_change = on_change.map(|f| Arc::new(f) as _);
        self
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Changes the mode and forgets the anchor.
    pub fn set_mode(&mut self, mode: SelectionMode) {
        self.mode = mode;
        self.last_key = None;
    }

    pub fn anchor(&self) -> Option<&ItemKey> {
        self.last_key.as_ref()
    }

    /// Applies an activation of `key` with `modifiers` to `dataset` and notifies `on_change`.
    ///
    /// Returns `None` when nothing changes: mode is `None`, the key is not loaded, or a range
    /// click targets a key outside the order sequence.
    pub fn activate<T>(
        &mut self,
        dataset: &Dataset<T>,
        key: &str,
        modifiers: Modifiers,
    ) -> Option<SelectionChange<T>> {
        let change = self.apply(dataset, key, modifiers)?;
        self.notify(&change.selected);
        Some(change)
    }

    /// Like [`Selection::activate`], but leaves notifying to the caller.
    ///
    /// Use this when the next snapshot is computed under a lock that `on_change` observers may
    /// need, and call [`Selection::notify`] once it is released.
    pub fn apply<T>(
        &mut self,
        dataset: &Dataset<T>,
        key: &str,
        modifiers: Modifiers,
    ) -> Option<SelectionChange<T>> {
        if self.mode == SelectionMode::None {
            return None;
        }
        let target = Arc::clone(&dataset.item(key)?.key);
        let multi = self.mode == SelectionMode::Multi;

        let next = if multi && modifiers.shift && self.anchor_position(dataset).is_some() {
            self.extend_to(dataset, &target)?
        } else if multi && modifiers.toggles() {
            let selected = dataset.item(key).is_some_and(|it| it.selected);
            self.last_key = Some(Arc::clone(&target));
            dataset.with_selection([(target, !selected)])
        } else {
            let mut updates: Vec<(ItemKey, bool)> = dataset
                .items()
                .values()
                .filter(|it| it.selected && it.key != target)
                .map(|it| (Arc::clone(&it.key), false))
                .collect();
            updates.push((Arc::clone(&target), true));
            self.last_key = Some(target);
            dataset.with_selection(updates)
        };

        vtrace!(key, mode = ?self.mode, "Selection::apply");
        Some(Self::change(next))
    }

    /// Deselects everything, forgets the anchor and notifies `on_change`.
    pub fn clear<T>(&mut self, dataset: &Dataset<T>) -> SelectionChange<T> {
        let change = self.apply_clear(dataset);
        self.notify(&change.selected);
        change
    }

    /// Like [`Selection::clear`], without notifying.
    pub fn apply_clear<T>(&mut self, dataset: &Dataset<T>) -> SelectionChange<T> {
        self.last_key = None;
        let updates: Vec<(ItemKey, bool)> = dataset
            .items()
            .values()
            .filter(|it| it.selected)
            .map(|it| (Arc::clone(&it.key), false))
            .collect();
        Self::change(dataset.with_selection(updates))
    }

    /// Hands `selected` to the `on_change` callback, if any.
    pub fn notify(&self, selected: &KeySet) {
        if let Some(cb) = &self.on_change {
            cb(selected);
        }
    }

    fn anchor_position<T>(&self, dataset: &Dataset<T>) -> Option<usize> {
        dataset.position_of(self.last_key.as_deref()?)
    }

    fn extend_to<T>(&self, dataset: &Dataset<T>, target: &str) -> Option<Dataset<T>> {
        let from = self.anchor_position(dataset)?;
        let to = dataset.position_of(target)?;
        let (low, high) = if from <= to { (from, to) } else { (to, from) };
        let updates: Vec<(ItemKey, bool)> = dataset.order()[low..=high]
            .iter()
            .flatten()
            .map(|k| (Arc::clone(k), true))
            .collect();
        Some(dataset.with_selection(updates))
    }

    fn change<T>(dataset: Dataset<T>) -> SelectionChange<T> {
        let selected = dataset.selected_keys();
        SelectionChange { dataset, selected }
    }
}
