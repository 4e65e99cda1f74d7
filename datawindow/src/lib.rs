//! A headless data windowing engine.
//!
//! For async fetch orchestration, data sources and scroll anchoring, see the
//! `datawindow-adapter` crate.
//!
//! This crate holds the synchronous core needed to show huge, lazily loaded collections:
//! - [`Geometry`]: scroll offset + viewport extent → the item indexes to render, with
//!   estimated or measured per-item sizes.
//! - [`Dataset`]: an immutable, sparse snapshot of loaded items keyed by stable identity.
//! - [`range`]: gap detection, range coalescing and page alignment for fetch planning.
//! - [`merge_items`]: normalizes a fetched page and merges it into a new snapshot.
//! - [`Selection`]: click / toggle-click / range-click selection over a snapshot.
//! - [`table`]: column descriptors, in-memory sorting and grid row mapping.
//!
//! It is UI-agnostic. A TUI/GUI layer is expected to provide the viewport extent, the scroll
//! offset and (optionally) row measurements, and to render what the engine returns.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod dataset;
mod fenwick;
mod geometry;
mod key;
mod normalize;
mod options;
pub mod range;
mod selection;
pub mod table;
mod types;

#[cfg(test)]
mod tests;

pub use dataset::{Dataset, ItemLayout, NormalizedItem, SKELETON_ESTIMATED_HEIGHT, skeleton_item};
pub use geometry::Geometry;
pub use key::{KeyMap, KeySet};
pub use normalize::{KeyExtractor, Mapper, Normalize, Normalized, Normalizer, merge_items};
pub use options::{
    DEFAULT_ESTIMATE_SIZE, DEFAULT_OVERSCAN, EstimateSize, GeometryOptions, OnChangeCallback,
};
pub use range::{align_to_pages, find_gaps, merge_ranges, plan_fetch};
pub use selection::{Modifiers, OnSelectionChange, Selection, SelectionChange, SelectionMode};
pub use types::{FetchMeta, ItemKey, Range, VirtualItem, VirtualRange};
