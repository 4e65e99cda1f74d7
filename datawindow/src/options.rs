use alloc::sync::Arc;

use crate::geometry::Geometry;

/// A callback fired after a geometry state transition (measurement, option swap).
pub type OnChangeCallback = Arc<dyn Fn(&Geometry) + Send + Sync>;

/// Per-index size estimate used until an item is measured.
pub type EstimateSize = Arc<dyn Fn(usize) -> u32 + Send + Sync>;

pub const DEFAULT_ESTIMATE_SIZE: u32 = 50;
pub const DEFAULT_OVERSCAN: usize = 5;

/// Configuration for [`crate::Geometry`].
///
/// Cheap to clone: closures live in `Arc`s so adapters can tweak a field and hand the options
/// back through `Geometry::set_options` without reallocating them.
pub struct GeometryOptions {
    pub count: usize,
    pub estimate_size: EstimateSize,
    /// When set, every item has exactly this size and measurements are ignored for layout.
    pub fixed_size: Option<u32>,
    /// Items rendered beyond each edge of the viewport.
    pub overscan: usize,
    pub on_change: Option<OnChangeCallback>,
}

impl Clone for GeometryOptions {
    fn clone(&self) -> Self {
        Self {
            count: self.count,
            estimate_size: Arc::clone(&self.estimate_size),
            fixed_size: self.fixed_size,
            overscan: self.overscan,
            on_change: self.on_change.clone(),
        }
    }
}

impl Default for GeometryOptions {
    fn default() -> Self {
        Self::new(0, |_| DEFAULT_ESTIMATE_SIZE)
    }
}

impl GeometryOptions {
    /// Variable-size options. `estimate_size(i)` is used for item `i` until it is measured.
    pub fn new(count: usize, estimate_size: impl Fn(usize) -> u32 + Send + Sync + 'static) -> Self {
        Self {
            count,
            estimate_size: Arc::new(estimate_size),
            fixed_size: None,
            overscan: DEFAULT_OVERSCAN,
            on_change: None,
        }
    }

    /// Fixed-size options: offset → index lookups and the total extent are O(1).
    pub fn fixed(count: usize, size: u32) -> Self {
        Self {
            fixed_size: Some(size),
            ..Self::new(count, move |_| size)
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    pub fn with_estimate_size(
        mut self,
        estimate_size: impl Fn(usize) -> u32 + Send + Sync + 'static,
    ) -> Self {
        self.estimate_size = Arc::new(estimate_size);
        self
    }

    pub fn with_fixed_size(mut self, fixed_size: Option<u32>) -> Self {
        self.fixed_size = fixed_size.filter(|&s| s > 0);
        self
    }

    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    pub fn with_on_change(
        mut self,
        on_change: Option<impl Fn(&Geometry) + Send + Sync + 'static>,
    ) -> Self {
        self.on_change = on_change.map(|f| Arc::new(f) as _);
        self
    }

    pub(crate) fn fixed_size(&self) -> Option<u32> {
        self.fixed_size.filter(|&s| s > 0)
    }
}

impl core::fmt::Debug for GeometryOptions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GeometryOptions")
            .field("count", &self.count)
            .field("fixed_size", &self.fixed_size)
            .field("overscan", &self.overscan)
            .finish_non_exhaustive()
    }
}
