// Example: a million-row window with sparse data, fetch planning and a merged page.
use datawindow::{
    Dataset, Geometry, GeometryOptions, Normalizer, merge_items, plan_fetch,
};

#[derive(Clone, Debug)]
struct Row {
    id: u64,
    title: String,
}

fn main() {
    let mut g = Geometry::new(GeometryOptions::new(1_000_000, |_| 24).with_overscan(3));
    let (scroll, viewport) = (2_880, 240);

    let visible = g.visible_range(scroll, viewport);
    println!("total_size={}", g.total_size());
    println!("visible_range={visible:?}");

    // Nothing loaded yet: plan what to fetch for this viewport.
    let dataset: Dataset<Row> = Dataset::new();
    let ranges = plan_fetch(visible, Some(1_000_000), dataset.order(), 50);
    println!("requests={ranges:?}");

    // Pretend the server answered the first request.
    let normalizer = Normalizer::new(|r: &Row| r.id);
    let range = ranges[0];
    let page: Vec<Row> = (range.start..range.end())
        .map(|i| Row {
            id: i as u64,
            title: format!("row {i}"),
        })
        .collect();
    let dataset = merge_items(&dataset, page, range.start, &normalizer, Some(1_000_000), None);
    println!(
        "loaded={} generation={}",
        dataset.loaded_len(),
        dataset.generation()
    );

    // Rows report their real heights once rendered.
    g.measure(visible.start_index, 48);
    for it in g.virtual_items(scroll, viewport) {
        let title = dataset
            .item_at(it.index)
            .map_or("<loading>", |item| item.data.title.as_str());
        println!("{:>6} @ {:>6} ({:>2}px) {title}", it.index, it.start, it.size);
    }
}
