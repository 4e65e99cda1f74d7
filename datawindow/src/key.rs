#[cfg(not(feature = "std"))]
use alloc::collections::{BTreeMap, BTreeSet};
#[cfg(feature = "std")]
use std::collections::{HashMap, HashSet};

use crate::ItemKey;

/// Key → value map used by dataset snapshots.
///
/// Hash-based with `std`, ordered otherwise.
#[cfg(feature = "std")]
pub type KeyMap<V> = HashMap<ItemKey, V>;
#[cfg(not(feature = "std"))]
pub type KeyMap<V> = BTreeMap<ItemKey, V>;

/// The set emitted by selection transitions.
#[cfg(feature = "std")]
pub type KeySet = HashSet<ItemKey>;
#[cfg(not(feature = "std"))]
pub type KeySet = BTreeSet<ItemKey>;

pub(crate) fn key_map_with_capacity<V>(_capacity: usize) -> KeyMap<V> {
    #[cfg(feature = "std")]
    {
        HashMap::with_capacity(_capacity)
    }
    #[cfg(not(feature = "std"))]
    {
        BTreeMap::new()
    }
}
