// Example: a window manager fetching pages from a slow source while the viewport scrolls.
//
// Run with `RUST_LOG=datawindow_adapter=trace` to see the fetch loop.
use std::time::Duration;

use datawindow::{GeometryOptions, Modifiers, Normalizer, Selection, SelectionMode};
use datawindow_adapter::{MemorySource, WindowController, WindowManager, WindowOptions};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug)]
struct Message {
    id: u32,
    body: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let messages: Vec<Message> = (0..10_000)
        .map(|id| Message {
            id,
            body: format!("message #{id}"),
        })
        .collect();
    let source = MemorySource::new(messages, Normalizer::new(|m: &Message| m.id))
        .with_total_count(false)
        .with_latency(Duration::from_millis(30));
    let manager = WindowManager::new(source, WindowOptions::default());

    let mut c = WindowController::new(
        GeometryOptions::fixed(0, 20).with_overscan(2),
        manager,
        Selection::new(SelectionMode::Multi),
    );

    for scroll in [0, 400, 4_000, 40_000] {
        let handles = c.on_viewport(scroll, 200);
        println!(
            "scroll={scroll} requests={} loading={}",
            handles.len(),
            c.is_loading()
        );
        for handle in handles {
            if let Err(err) = handle.await {
                eprintln!("fetch task failed: {err}");
            }
        }

        let items = c.visible_items();
        let loaded = items.iter().filter(|v| v.item.is_some()).count();
        println!(
            "  extent={} items={} loaded={} total={:?}",
            c.total_extent(),
            items.len(),
            loaded,
            c.dataset().total_count()
        );
    }

    c.manager().wait_idle().await;
    if let Some(first) = c.visible_items().into_iter().find_map(|v| v.item) {
        let selected = c.click(&first.key, Modifiers::NONE);
        println!("clicked {:?} -> {:?}", first.data.body, selected);
    }
}
