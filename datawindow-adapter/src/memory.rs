use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use datawindow::{FetchMeta, Normalize, Normalized, Normalizer, Range};

use crate::{DataSource, FetchResult};

/// Serves slices of an in-process `Vec`, optionally after a simulated latency.
pub struct MemorySource<TIn, TOut = TIn> {
    rows: Arc<Vec<TIn>>,
    normalizer: Normalizer<TIn, TOut>,
    report_total: bool,
    latency: Duration,
}

impl<TIn, TOut> Clone for MemorySource<TIn, TOut> {
    fn clone(&self) -> Self {
        Self {
            rows: Arc::clone(&self.rows),
            normalizer: self.normalizer.clone(),
            report_total: self.report_total,
            latency: self.latency,
        }
    }
}

impl<TIn, TOut> std::fmt::Debug for MemorySource<TIn, TOut> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySource")
            .field("rows", &self.rows.len())
            .field("report_total", &self.report_total)
            .field("latency", &self.latency)
            .finish_non_exhaustive()
    }
}

impl<TIn, TOut> MemorySource<TIn, TOut> {
    /// Reports the total count with every page.
    pub fn new(rows: Vec<TIn>, normalizer: Normalizer<TIn, TOut>) -> Self {
        Self {
            rows: Arc::new(rows),
            normalizer,
            report_total: true,
            latency: Duration::ZERO,
        }
    }

    /// When disabled, the total can only be inferred from a short page.
    pub fn with_total_count(mut self, report_total: bool) -> Self {
        self.report_total = report_total;
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<TIn, TOut> Normalize for MemorySource<TIn, TOut> {
    type Raw = TIn;
    type Item = TOut;

    fn normalize(&self, raw: TIn) -> Normalized<TOut> {
        self.normalizer.normalize(raw)
    }
}

#[async_trait]
impl<TIn, TOut> DataSource for MemorySource<TIn, TOut>
where
    TIn: Clone + Send + Sync + 'static,
    TOut: Send + Sync + 'static,
{
    async fn fetch(&self, range: Range) -> FetchResult<TIn> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let start = range.start.min(self.rows.len());
        let end = range.end().min(self.rows.len());
        let result = FetchResult::ok(self.rows[start..end].to_vec());
        if self.report_total {
            result.with_meta(FetchMeta::with_total_count(self.rows.len()))
        } else {
            result
        }
    }
}
