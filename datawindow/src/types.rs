use alloc::string::String;
use alloc::sync::Arc;

/// Stable identity of an item. Cheap to clone so key sequences can be copied per snapshot.
pub type ItemKey = Arc<str>;

/// A half-open index interval `[start, start + length)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Range {
    pub start: usize,
    pub length: usize,
}

impl Range {
    pub fn new(start: usize, length: usize) -> Self {
        Self { start, length }
    }

    /// Builds the range covering the inclusive interval `[first, last]`.
    pub fn inclusive(first: usize, last: usize) -> Self {
        Self {
            start: first,
            length: last.saturating_sub(first).saturating_add(1),
        }
    }

    /// Exclusive end index.
    pub fn end(&self) -> usize {
        self.start.saturating_add(self.length)
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index < self.end()
    }

    /// The key used to suppress duplicate in-flight requests.
    pub fn dedup_key(&self) -> String {
        alloc::format!("{}-{}", self.start, self.length)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VirtualRange {
    pub start_index: usize,
    pub end_index: usize, // exclusive
}

impl VirtualRange {
    pub fn is_empty(&self) -> bool {
        self.start_index >= self.end_index
    }

    pub fn len(&self) -> usize {
        self.end_index.saturating_sub(self.start_index)
    }

    /// Last index in the range, if any.
    pub fn last_index(&self) -> Option<usize> {
        if self.is_empty() {
            None
        } else {
            Some(self.end_index - 1)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VirtualItem {
    pub index: usize,
    /// Pixel offset of the item's leading edge.
    pub start: u64,
    pub size: u32,
    /// Whether `size` comes from a measurement rather than an estimate.
    pub measured: bool,
}

impl VirtualItem {
    pub fn end(&self) -> u64 {
        self.start.saturating_add(self.size as u64)
    }
}

/// Metadata accompanying a fetch response.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FetchMeta {
    pub total_count: Option<usize>,
    pub cursor: Option<String>,
    pub has_more_forward: Option<bool>,
    pub has_more_backward: Option<bool>,
}

impl FetchMeta {
    pub fn with_total_count(total_count: usize) -> Self {
        Self {
            total_count: Some(total_count),
            ..Self::default()
        }
    }
}
