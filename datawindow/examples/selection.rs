// Example: click, shift-click and ctrl-click over a snapshot.
use datawindow::{Dataset, KeySet, Modifiers, Normalizer, Selection, SelectionMode};

fn main() {
    let files = ["a.rs", "b.rs", "c.rs", "d.rs", "e.rs", "f.rs"];
    let dataset = Dataset::from_normalized(&Normalizer::new(|f: &&'static str| *f), files);

    let mut selection = Selection::new(SelectionMode::Multi).with_on_change(Some(|keys: &KeySet| {
        let mut keys: Vec<&str> = keys.iter().map(|k| &**k).collect();
        keys.sort_unstable();
        println!("selected={keys:?}");
    }));

    let mut ds = dataset;
    for (key, modifiers) in [
        ("b.rs", Modifiers::NONE),
        ("e.rs", Modifiers::SHIFT),
        ("a.rs", Modifiers::CTRL),
        ("c.rs", Modifiers::NONE),
    ] {
        if let Some(change) = selection.activate(&ds, key, modifiers) {
            ds = change.dataset;
        }
    }
    println!("anchor={:?}", selection.anchor());
}
