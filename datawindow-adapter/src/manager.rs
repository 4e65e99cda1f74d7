use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use datawindow::{Dataset, Range, VirtualRange, merge_items, plan_fetch};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};

use crate::{DataSource, FetchError, FetchResult};

pub const DEFAULT_PAGE_SIZE: usize = 50;
pub const DEFAULT_LOADING_DEBOUNCE: Duration = Duration::from_millis(50);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WindowOptions {
    /// Requests are aligned to multiples of this; half of it (rounded up) is prefetched on each
    /// side of the visible range.
    pub page_size: usize,
    /// How long the loading flag stays up after the last in-flight request settles.
    pub loading_debounce: Duration,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            loading_debounce: DEFAULT_LOADING_DEBOUNCE,
        }
    }
}

impl WindowOptions {
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_loading_debounce(mut self, loading_debounce: Duration) -> Self {
        self.loading_debounce = loading_debounce;
        self
    }
}

struct Shared<T> {
    dataset: Dataset<T>,
    in_flight: HashMap<String, Range>,
    // Bumped whenever a request starts; lets a pending debounce notice new work.
    epoch: u64,
}

impl<T> Shared<T> {
    fn pending_ranges(&self) -> Vec<Range> {
        let mut ranges: Vec<Range> = self.in_flight.values().copied().collect();
        ranges.sort_by_key(|r| r.start);
        ranges
    }
}

/// Orchestrates fetching for the sparse window held in a [`Dataset`].
///
/// Every visible-range change plans the missing, page-aligned ranges, drops those already in
/// flight, and spawns one tokio task per remaining range. Completed pages are merged into the
/// latest snapshot (not the one seen at dispatch), so concurrent pages never lose each other.
///
/// Snapshots are published through a `watch` channel while the snapshot lock is held, so the
/// channel always ends on the latest snapshot. Do not hold a `borrow()` of a subscription across
/// calls into the manager. The loading flag goes up when a request starts and comes down
/// `loading_debounce` after the last one settles.
///
/// Fetch tasks run on the runtime the manager was built in, or the one given to
/// [`WindowManager::with_runtime`], so the manager can be driven from a plain UI thread.
pub struct WindowManager<T, R = T> {
    source: Option<Arc<dyn DataSource<Raw = R, Item = T>>>,
    options: WindowOptions,
    runtime: Option<Handle>,
    shared: Arc<Mutex<Shared<T>>>,
    dataset_tx: Arc<watch::Sender<Dataset<T>>>,
    loading_tx: Arc<watch::Sender<bool>>,
}

impl<T, R> Clone for WindowManager<T, R> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            options: self.options.clone(),
            runtime: self.runtime.clone(),
            shared: Arc::clone(&self.shared),
            dataset_tx: Arc::clone(&self.dataset_tx),
            loading_tx: Arc::clone(&self.loading_tx),
        }
    }
}

impl<T, R> std::fmt::Debug for WindowManager<T, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shared = self.shared.lock();
        f.debug_struct("WindowManager")
            .field("remote", &self.source.is_some())
            .field("options", &self.options)
            .field("len", &shared.dataset.len())
            .field("total_count", &shared.dataset.total_count())
            .field("in_flight", &shared.in_flight.len())
            .finish_non_exhaustive()
    }
}

impl<T> WindowManager<T, T> {
    /// A manager over a fully materialized collection. Visible-range changes are no-ops.
    pub fn in_memory(dataset: Dataset<T>) -> Self {
        Self::build(None, WindowOptions::default(), dataset)
    }
}

impl<T, R> WindowManager<T, R> {
    pub fn new(source: impl DataSource<Raw = R, Item = T> + 'static, options: WindowOptions) -> Self {
        Self::from_source(Arc::new(source), options)
    }

    pub fn from_source(
        source: Arc<dyn DataSource<Raw = R, Item = T>>,
        options: WindowOptions,
    ) -> Self {
        Self::build(Some(source), options, Dataset::new())
    }

    fn build(
        source: Option<Arc<dyn DataSource<Raw = R, Item = T>>>,
        options: WindowOptions,
        dataset: Dataset<T>,
    ) -> Self {
        let (dataset_tx, _) = watch::channel(dataset.clone());
        let (loading_tx, _) = watch::channel(false);
        Self {
            source,
            options,
            runtime: Handle::try_current().ok(),
            shared: Arc::new(Mutex::new(Shared {
                dataset,
                in_flight: HashMap::new(),
                epoch: 0,
            })),
            dataset_tx: Arc::new(dataset_tx),
            loading_tx: Arc::new(loading_tx),
        }
    }

    /// Spawns fetch tasks on `runtime` instead of the runtime current at construction.
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn options(&self) -> &WindowOptions {
        &self.options
    }

    pub fn is_remote(&self) -> bool {
        self.source.is_some()
    }

    /// The latest snapshot.
    pub fn dataset(&self) -> Dataset<T> {
        self.shared.lock().dataset.clone()
    }

    /// Receives every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Dataset<T>> {
        self.dataset_tx.subscribe()
    }

    /// Receives the debounced loading flag.
    pub fn loading(&self) -> watch::Receiver<bool> {
        self.loading_tx.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        *self.loading_tx.borrow()
    }

    /// Ranges currently being fetched, sorted by start.
    pub fn in_flight(&self) -> Vec<Range> {
        self.shared.lock().pending_ranges()
    }

    /// Replaces the snapshot with `f(latest)` and publishes it, unless `f` hands back the same
    /// storage.
    ///
    /// This is the write path for changes made outside the fetch loop, such as selection. `f`
    /// runs under the snapshot lock and must not call back into this manager or its clones.
    pub fn update_dataset(&self, f: impl FnOnce(&Dataset<T>) -> Dataset<T>) -> Dataset<T> {
        let mut shared = self.shared.lock();
        let next = f(&shared.dataset);
        if next.ptr_eq(&shared.dataset) {
            return next;
        }
        self.publish(&mut shared, next.clone());
        next
    }

    fn publish(&self, shared: &mut Shared<T>, next: Dataset<T>) {
        shared.dataset = next.clone();
        self.dataset_tx.send_replace(next);
    }

    /// Waits until the debounced loading flag is down.
    pub async fn wait_idle(&self) {
        let mut rx = self.loading_tx.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = rx.wait_for(|loading| !*loading).await;
    }

    fn set_loading(&self, loading: bool) {
        self.loading_tx.send_if_modified(|current| {
            let changed = *current != loading;
            *current = loading;
            changed
        });
    }
}

impl<T, R> WindowManager<T, R>
where
    T: Send + Sync + 'static,
    R: Send + 'static,
{
    /// Fetches whatever `visible` (plus prefetch) still misses.
    ///
    /// Returns one handle per spawned request; each resolves once its page is merged (or its
    /// failure logged). Callers may ignore them.
    ///
    /// Without a tokio runtime to spawn on, nothing is requested and a warning is logged.
    pub fn on_visible_range(&self, visible: VirtualRange) -> Vec<JoinHandle<()>> {
        let Some(source) = &self.source else {
            return Vec::new();
        };
        let Some(runtime) = self.runtime.clone().or_else(|| Handle::try_current().ok()) else {
            awarn!(
                start = visible.start_index,
                end = visible.end_index,
                "no tokio runtime to fetch on; skipping"
            );
            return Vec::new();
        };

        let ranges = {
            let mut shared = self.shared.lock();
            let planned = plan_fetch(
                visible,
                shared.dataset.total_count(),
                shared.dataset.order(),
                self.options.page_size,
            );

            let mut ranges = Vec::with_capacity(planned.len());
            for range in planned {
                let key = range.dedup_key();
                if shared.in_flight.contains_key(&key) {
                    atrace!(%key, "request already in flight");
                    continue;
                }
                shared.in_flight.insert(key.clone(), range);
                ranges.push((key, range));
            }
            if ranges.is_empty() {
                return Vec::new();
            }

            shared.epoch = shared.epoch.wrapping_add(1);
            let next = shared.dataset.with_pending_ranges(shared.pending_ranges());
            self.publish(&mut shared, next);
            ranges
        };

        adebug!(
            start = visible.start_index,
            end = visible.end_index,
            requests = ranges.len(),
            "WindowManager::on_visible_range"
        );
        self.set_loading(true);

        ranges
            .into_iter()
            .map(|(key, range)| {
                let fetch = {
                    let source = Arc::clone(source);
                    runtime.spawn(async move { source.fetch(range).await })
                };
                let this = self.clone();
                runtime.spawn(async move {
                    let outcome = fetch.await;
                    this.settle(key, range, outcome).await;
                })
            })
            .collect()
    }

    /// Re-runs the fetch pass, picking up gaps left by failed requests.
    pub fn retry(&self, visible: VirtualRange) -> Vec<JoinHandle<()>> {
        self.on_visible_range(visible)
    }

    async fn settle(
        &self,
        key: String,
        range: Range,
        outcome: Result<FetchResult<R>, JoinError>,
    ) {
        let FetchResult { items, meta, error } =
            outcome.unwrap_or_else(|err| FetchResult::failed(FetchError::from(err)));

        let (snapshot, idle, epoch) = {
            let mut shared = self.shared.lock();
            shared.in_flight.remove(&key);

            let merged = match (&self.source, error) {
                (_, Some(error)) => {
                    awarn!(%key, %error, "fetch failed; leaving gap");
                    None
                }
                (Some(source), None) => {
                    let total = meta.and_then(|m| m.total_count);
                    Some(merge_items(
                        &shared.dataset,
                        items,
                        range.start,
                        source.as_ref(),
                        total,
                        Some(range.length),
                    ))
                }
                (None, None) => None,
            };
            let base = merged.as_ref().unwrap_or(&shared.dataset);
            let next = base.with_pending_ranges(shared.pending_ranges());
            self.publish(&mut shared, next.clone());
            (next, shared.in_flight.is_empty(), shared.epoch)
        };

        atrace!(
            %key,
            len = snapshot.len(),
            total = ?snapshot.total_count(),
            "WindowManager::settle"
        );

        if idle {
            self.settle_loading(epoch).await;
        }
    }

    async fn settle_loading(&self, epoch: u64) {
        if !self.options.loading_debounce.is_zero() {
            tokio::time::sleep(self.options.loading_debounce).await;
        }
        let still_idle = {
            let shared = self.shared.lock();
            shared.in_flight.is_empty() && shared.epoch == epoch
        };
        if still_idle {
            self.set_loading(false);
        }
    }
}
