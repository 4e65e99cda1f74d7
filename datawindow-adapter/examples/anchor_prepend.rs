use datawindow::{Dataset, Geometry, GeometryOptions, Normalizer};
use datawindow_adapter::{BottomAnchor, apply_anchor, capture_first_visible_anchor};

fn main() {
    // Example: preserve visual scroll position across "prepend" (chat/timeline load older messages).
    //
    // The adapter flow is typically:
    // 1) capture an anchor (key + offset_in_viewport) before data changes
    // 2) apply data changes and sync the geometry count
    // 3) apply the anchor to get the scroll offset that keeps the same item in the same place
    let keyed = Normalizer::new(|id: &u32| *id);
    let before = Dataset::from_normalized(&keyed, 1_000..1_100u32);
    let g = Geometry::new(GeometryOptions::fixed(before.len(), 10));
    let (scroll, viewport) = (505, 100);

    let Some(anchor) = capture_first_visible_anchor(&g, &before, scroll, viewport) else {
        eprintln!("nothing visible");
        return;
    };
    println!("before prepend: off={scroll} anchor={anchor:?}");

    // Prepend 10 older messages; old items shift by +10 indexes.
    let after = Dataset::from_normalized(&keyed, (2_000..2_010u32).chain(1_000..1_100));
    let g = Geometry::new(GeometryOptions::fixed(after.len(), 10));
    let restored = apply_anchor(&g, &after, &anchor, viewport);
    println!("after prepend: off={restored:?}");

    // Bottom pinning for a live chat: follow new messages only while the reader is at the end.
    let mut bottom = BottomAnchor::new();
    let extent = g.total_size();
    bottom.on_content_resize(extent, extent - viewport as u64, viewport);
    let followed = bottom.on_content_resize(extent + 30, extent - viewport as u64, viewport);
    println!("new message while at bottom: off={followed:?}");
}
