use core::fmt;

use datawindow::{Dataset, Geometry, ItemKey};

pub const DEFAULT_BOTTOM_THRESHOLD: u64 = 100;

/// Keeps a chat-style view pinned to its bottom edge while content grows.
///
/// If the viewport was within `threshold` of the bottom before the content extent changed, the
/// new offset is the new bottom. Otherwise the offset shifts by the extent delta, which keeps
/// the reader in place when history is loaded above.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BottomAnchor {
    threshold: u64,
    was_at_bottom: bool,
    prev_extent: u64,
}

impl Default for BottomAnchor {
    fn default() -> Self {
        Self::new()
    }
}

impl BottomAnchor {
    pub fn new() -> Self {
        Self {
            threshold: DEFAULT_BOTTOM_THRESHOLD,
            was_at_bottom: true,
            prev_extent: 0,
        }
    }

    pub fn with_threshold(mut self, threshold: u64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn is_at_bottom(&self) -> bool {
        self.was_at_bottom
    }

    /// Call on every user scroll.
    pub fn on_scroll(&mut self, scroll_offset: u64, viewport_size: u32, content_extent: u64) {
        self.was_at_bottom = self.near_bottom(scroll_offset, viewport_size, content_extent);
    }

    /// Call after the content extent was re-measured.
    ///
    /// Returns the scroll offset to apply, or `None` when nothing has to move (first layout or
    /// unchanged extent).
    pub fn on_content_resize(
        &mut self,
        content_extent: u64,
        scroll_offset: u64,
        viewport_size: u32,
    ) -> Option<u64> {
        let prev = self.prev_extent;
        let max_offset = content_extent.saturating_sub(viewport_size as u64);

        let next = (content_extent != prev && prev > 0).then(|| {
            if self.was_at_bottom {
                max_offset
            } else {
                let delta = content_extent as i128 - prev as i128;
                let delta = delta.clamp(i64::MIN as i128, i64::MAX as i128) as i64;
                scroll_offset.saturating_add_signed(delta).min(max_offset)
            }
        });

        self.prev_extent = content_extent;
        let applied = next.unwrap_or(scroll_offset);
        self.was_at_bottom = self.near_bottom(applied, viewport_size, content_extent);
        next
    }

    fn near_bottom(&self, scroll_offset: u64, viewport_size: u32, content_extent: u64) -> bool {
        let distance =
            content_extent.saturating_sub(scroll_offset.saturating_add(viewport_size as u64));
        distance < self.threshold
    }
}

/// Identity of the item at the top of the viewport, plus how far it is scrolled past.
///
/// Survives changes that move items to new indexes, such as prepending older rows.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyAnchor {
    pub key: ItemKey,
    /// The distance from the anchor item's start to the viewport's scroll offset.
    pub offset_in_viewport: u64,
}

impl fmt::Debug for KeyAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyAnchor")
            .field("key", &self.key)
            .field("offset_in_viewport", &self.offset_in_viewport)
            .finish()
    }
}

/// Captures an anchor on the first loaded item in the viewport.
///
/// Returns `None` if the viewport is empty or shows only holes.
pub fn capture_first_visible_anchor<T>(
    geometry: &Geometry,
    dataset: &Dataset<T>,
    scroll_offset: u64,
    viewport_size: u32,
) -> Option<KeyAnchor> {
    let visible = geometry.visible_range(scroll_offset, viewport_size);
    let (index, key) = (visible.start_index..visible.end_index)
        .find_map(|i| dataset.key_at(i).map(|k| (i, k)))?;
    let start = geometry.item_start(index)?;
    Some(KeyAnchor {
        key: ItemKey::clone(key),
        offset_in_viewport: scroll_offset.saturating_sub(start),
    })
}

/// The scroll offset that puts `anchor` back where it was, against the *current* dataset and
/// geometry (count already synced).
///
/// Returns `None` when the key is no longer in the order sequence.
pub fn apply_anchor<T>(
    geometry: &Geometry,
    dataset: &Dataset<T>,
    anchor: &KeyAnchor,
    viewport_size: u32,
) -> Option<u64> {
    let index = dataset.position_of(&anchor.key)?;
    let start = geometry.item_start(index)?;
    let target = start.saturating_add(anchor.offset_in_viewport);
    Some(geometry.clamp_scroll_offset(target, viewport_size))
}
