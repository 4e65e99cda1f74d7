//! Async fetch orchestration, data sources and scroll anchoring for the `datawindow` crate.
//!
//! The `datawindow` crate is synchronous and UI-agnostic. This crate adds the parts that need
//! a runtime or a transport:
//!
//! - [`DataSource`]: the async page-fetch contract, with [`MemorySource`] and (feature `rest`)
//!   [`RestDataSource`] implementations.
//! - [`WindowManager`]: turns visible-range changes into deduplicated, page-aligned fetches
//!   running on tokio, merges completed pages and publishes snapshots plus a debounced loading
//!   flag.
//! - Scroll anchoring: [`BottomAnchor`] for chat-style views and [`KeyAnchor`] for keeping the
//!   first visible item in place across prepends.
//! - [`WindowController`]: a framework-neutral controller wiring geometry, the window manager
//!   and selection together.
//!
//! This crate is intentionally framework-agnostic (no ratatui/egui bindings).
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod anchor;
mod controller;
mod error;
mod manager;
mod memory;
#[cfg(feature = "rest")]
mod rest;
mod source;


pub use anchor::{
    BottomAnchor, DEFAULT_BOTTOM_THRESHOLD, KeyAnchor, apply_anchor, capture_first_visible_anchor,
};
pub use controller::{DisplayMode, SPECULATIVE_TAIL, ViewItem, WindowController};
pub use error::{BoxError, FetchError};
pub use manager::{DEFAULT_LOADING_DEBOUNCE, DEFAULT_PAGE_SIZE, WindowManager, WindowOptions};
pub use memory::MemorySource;
#[cfg(feature = "rest")]
pub use rest::{DEFAULT_TOTAL_COUNT_FIELD, RestDataSource, RestPage, parse_page};
pub use source::{DataSource, FetchResult};
